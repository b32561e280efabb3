use std::fmt::Write;

use color_eyre::eyre::Result;
use droplet_protocol::UsageData;

use crate::commands::load_usage;
use crate::config::UserConfig;
use crate::data::display::{format_energy, format_water, time_ago, water_comparison};

const RULE_WIDTH: usize = 48;

pub fn run(config: &UserConfig) -> Result<()> {
    let data = load_usage(config)?;
    let now = chrono::Utc::now().timestamp_millis();
    print!("{}", render(&data, now));
    Ok(())
}

pub fn render(data: &UsageData, now_ms: i64) -> String {
    // An unseeded store has no session start yet.
    let session_start = if data.session_start > 0 {
        data.session_start
    } else {
        now_ms
    };

    let mut out = String::new();
    let _ = writeln!(out, "Water:          {}", format_water(data.total_water));
    let _ = writeln!(out, "Energy:         {}", format_energy(data.total_energy));
    let _ = writeln!(out, "That's about:   {}", water_comparison(data.total_water));
    let _ = writeln!(out, "Tracking since: {}", time_ago(session_start, now_ms));
    let _ = writeln!(out);
    let _ = writeln!(out, "Sites");
    let _ = writeln!(out, "{}", "-".repeat(RULE_WIDTH));

    let sites = data.sites_by_water();
    if sites.is_empty() {
        let _ = writeln!(out, "Start browsing to see your water usage!");
        return out;
    }

    for site in sites {
        let visits = if site.visit_count == 1 {
            "1 visit".to_string()
        } else {
            format!("{} visits", site.visit_count)
        };
        let _ = writeln!(
            out,
            "{:<20} {:>12}  {} \u{2022} {}",
            site.display_name,
            format_water(site.water),
            visits,
            format_energy(site.energy)
        );
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use droplet_protocol::SiteAggregate;

    const NOW: i64 = 1_704_067_200_000;

    fn site(domain: &str, name: &str, water: f64, visits: u64) -> SiteAggregate {
        SiteAggregate {
            energy: water / 2.0,
            water,
            visit_count: visits,
            ..SiteAggregate::new(domain, name)
        }
    }

    #[test]
    fn test_empty_state() {
        let output = render(&UsageData::empty(NOW - 120_000), NOW);
        assert!(output.contains("Water:          0.000 gal"));
        assert!(output.contains("Energy:         0.0000 kWh"));
        assert!(output.contains("Less than a teaspoon of water"));
        assert!(output.contains("Tracking since: 2 minutes ago"));
        assert!(output.contains("Start browsing to see your water usage!"));
    }

    #[test]
    fn test_unseeded_start_reads_as_now() {
        let output = render(&UsageData::empty(0), NOW);
        assert!(output.contains("Tracking since: Just now"));
    }

    #[test]
    fn test_sites_sorted_by_water() {
        let mut data = UsageData::empty(NOW);
        data.site_data
            .insert("reddit.com".into(), site("reddit.com", "Reddit", 0.0001, 3));
        data.site_data
            .insert("netflix.com".into(), site("netflix.com", "Netflix", 0.003, 1));
        data.total_water = 0.0031;
        data.total_energy = 0.00155;

        let output = render(&data, NOW);
        let netflix = output.find("Netflix").unwrap();
        let reddit = output.find("Reddit").unwrap();
        assert!(netflix < reddit);
        assert!(output.contains("1 visit \u{2022} 0.0015 kWh"));
        assert!(output.contains("3 visits"));
        assert!(!output.contains("Start browsing"));
    }
}
