//! Core rate types.
//!
//! - `AccrualUnit` - the quantity a rate is priced per
//! - `RateRecord` - energy cost of one unit for a class of sites

use std::fmt;

use serde::{Deserialize, Serialize};

/// The discrete quantity a rate is priced per.
///
/// Only `Minute` is duration based. Every other unit charges its flat
/// per-unit cost once per recorded event, whatever the duration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccrualUnit {
    Query,
    Search,
    Minute,
    Action,
    Visit,
}

impl AccrualUnit {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccrualUnit::Query => "query",
            AccrualUnit::Search => "search",
            AccrualUnit::Minute => "minute",
            AccrualUnit::Action => "action",
            AccrualUnit::Visit => "visit",
        }
    }

    pub fn is_duration_based(&self) -> bool {
        matches!(self, AccrualUnit::Minute)
    }
}

impl fmt::Display for AccrualUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Heuristic energy cost for one class of sites.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RateRecord {
    /// kWh charged per `unit`.
    pub energy_per_unit: f64,
    pub unit: AccrualUnit,
    pub display_name: &'static str,
}

impl RateRecord {
    pub const fn new(energy_per_unit: f64, unit: AccrualUnit, display_name: &'static str) -> Self {
        Self {
            energy_per_unit,
            unit,
            display_name,
        }
    }

    /// Energy in kWh charged for one event covering `units` of usage.
    ///
    /// Duration-based rates scale with `units`; all others charge one flat
    /// unit, so a zero-duration visit still costs `energy_per_unit`.
    pub fn energy_for(&self, units: f64) -> f64 {
        if self.unit.is_duration_based() {
            self.energy_per_unit * units
        } else {
            self.energy_per_unit
        }
    }
}
