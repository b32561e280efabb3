//! Human-readable renderings of usage numbers.

const MS_PER_MINUTE: i64 = 60_000;
const MINUTES_PER_HOUR: i64 = 60;
const HOURS_PER_DAY: i64 = 24;

const TEASPOONS_PER_GALLON: f64 = 768.0;
const TABLESPOONS_PER_GALLON: f64 = 16.0;
const CUPS_PER_GALLON: f64 = 16.0;
const GALLONS_PER_BATHTUB: f64 = 128.0;
const GALLONS_PER_POOL: f64 = 660.0;

/// Everyday comparison for an amount of water in gallons.
pub fn water_comparison(gallons: f64) -> String {
    if gallons < 0.01 {
        "Less than a teaspoon of water".to_string()
    } else if gallons < 0.1 {
        format!("{} teaspoons of water", (gallons * TEASPOONS_PER_GALLON).round())
    } else if gallons < 1.0 {
        format!(
            "{} tablespoons of water",
            (gallons * TABLESPOONS_PER_GALLON).round()
        )
    } else if gallons < 8.0 {
        format!("{:.1} cups of water", gallons * CUPS_PER_GALLON)
    } else if gallons < 128.0 {
        format!("{} water bottles (16.9 oz)", gallons.round())
    } else if gallons < 500.0 {
        format!("{:.1} bathtubs of water", gallons / GALLONS_PER_BATHTUB)
    } else {
        format!(
            "{:.1} swimming pools of water",
            gallons / GALLONS_PER_POOL
        )
    }
}

/// "Just now", "5 minutes ago", "1 hour ago", ...
pub fn time_ago(then_ms: i64, now_ms: i64) -> String {
    let minutes = (now_ms - then_ms).max(0) / MS_PER_MINUTE;
    if minutes < 1 {
        return "Just now".to_string();
    }
    if minutes < MINUTES_PER_HOUR {
        return plural(minutes, "minute");
    }
    let hours = minutes / MINUTES_PER_HOUR;
    if hours < HOURS_PER_DAY {
        return plural(hours, "hour");
    }
    plural(hours / HOURS_PER_DAY, "day")
}

fn plural(count: i64, unit: &str) -> String {
    if count == 1 {
        format!("1 {unit} ago")
    } else {
        format!("{count} {unit}s ago")
    }
}

pub fn format_water(gallons: f64) -> String {
    format!("{gallons:.3} gal")
}

pub fn format_energy(kwh: f64) -> String {
    format!("{kwh:.4} kWh")
}

/// Format bytes as human-readable string (e.g., "1.5 MB", "256 KB").
pub fn format_bytes(bytes: u64) -> String {
    bytesize::ByteSize::b(bytes).display().si().to_string()
}
