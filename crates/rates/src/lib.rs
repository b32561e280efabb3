//! Heuristic energy rates for browsing activity.
//!
//! Maps a hostname to a [`RateRecord`] describing how much energy one unit of
//! activity on that site costs. All numbers are static estimates.

mod builtin;
mod classify;
mod types;

pub use builtin::{DEFAULT_RATE, RATE_TABLE, WATER_GALLONS_PER_KWH};
pub use classify::{classify, extract_domain, match_entry, normalize_host};
pub use types::{AccrualUnit, RateRecord};

/// Water in gallons corresponding to `energy_kwh`.
pub fn water_for_energy(energy_kwh: f64) -> f64 {
    energy_kwh * WATER_GALLONS_PER_KWH
}
