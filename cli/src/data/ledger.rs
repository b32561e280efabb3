//! Persisted usage totals.
//!
//! Every mutation reads the keys it touches, merges in memory and writes them
//! back in one `set`. The daemon drives the ledger from a single task, so
//! there is never more than one read-modify-write in flight.

use std::collections::{BTreeMap, HashMap};

use droplet_protocol::{SiteAggregate, UsageData};
use droplet_rates::{classify, water_for_energy, RateRecord};
use serde_json::{json, Map, Value};
use tracing::warn;

use crate::data::store::{KeyValueStore, Result};

pub mod keys {
    pub const TOTAL_ENERGY: &str = "totalEnergy";
    pub const TOTAL_WATER: &str = "totalWater";
    pub const SITE_DATA: &str = "siteData";
    pub const SESSION_START: &str = "sessionStart";
    /// Reserved; seeded on first run and otherwise left alone.
    pub const DAILY_DATA: &str = "dailyData";
}

/// Energy and water added by one recorded event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Accrual {
    /// kWh
    pub energy: f64,
    /// gallons
    pub water: f64,
}

impl Accrual {
    fn from_energy(energy: f64) -> Self {
        Self {
            energy,
            water: water_for_energy(energy),
        }
    }

    fn for_rate(rate: &RateRecord, units: f64) -> Self {
        Self::from_energy(rate.energy_for(units))
    }
}

pub struct UsageLedger<S> {
    store: S,
}

impl<S: KeyValueStore> UsageLedger<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    #[cfg(test)]
    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    /// Seeds every key with empty defaults when no energy has been recorded
    /// yet. Returns whether seeding happened.
    pub fn initialize(&mut self, now_ms: i64) -> Result<bool> {
        let values = self.store.get(&[keys::TOTAL_ENERGY])?;
        let recorded = read_f64(&values, keys::TOTAL_ENERGY);
        if recorded != 0.0 {
            return Ok(false);
        }

        self.store.set(vec![
            (keys::TOTAL_ENERGY, json!(0.0)),
            (keys::TOTAL_WATER, json!(0.0)),
            (keys::SITE_DATA, json!({})),
            (keys::SESSION_START, json!(now_ms)),
            (keys::DAILY_DATA, json!([])),
        ])?;
        Ok(true)
    }

    /// Charges a completed navigation: one full unit of energy whatever the
    /// rate's unit, one visit, no duration.
    pub fn record_visit(&mut self, domain: &str) -> Result<Accrual> {
        let rate = classify(domain);
        let accrual = Accrual::from_energy(rate.energy_per_unit);
        self.merge(domain, rate, accrual, 0.0, true)?;
        Ok(accrual)
    }

    /// Charges one usage event against `domain` and counts it as a visit.
    ///
    /// Duration-based rates charge `energy_per_unit * duration_units`; every
    /// other rate charges one flat unit, even for a zero duration.
    pub fn record_usage(&mut self, domain: &str, duration_units: f64) -> Result<Accrual> {
        let rate = classify(domain);
        let accrual = Accrual::for_rate(rate, duration_units);
        self.merge(domain, rate, accrual, duration_units, true)?;
        Ok(accrual)
    }

    /// Charges elapsed time against `domain` without counting a visit.
    ///
    /// Returns `None`, and writes nothing, for rates that are not priced per
    /// minute.
    pub fn accrue_duration(&mut self, domain: &str, minutes: f64) -> Result<Option<Accrual>> {
        let rate = classify(domain);
        if !rate.unit.is_duration_based() {
            return Ok(None);
        }
        let accrual = Accrual::for_rate(rate, minutes);
        self.merge(domain, rate, accrual, minutes, false)?;
        Ok(Some(accrual))
    }

    fn merge(
        &mut self,
        domain: &str,
        rate: &RateRecord,
        accrual: Accrual,
        units: f64,
        count_visit: bool,
    ) -> Result<()> {
        let values = self
            .store
            .get(&[keys::TOTAL_ENERGY, keys::TOTAL_WATER, keys::SITE_DATA])?;

        let total_energy = read_f64(&values, keys::TOTAL_ENERGY) + accrual.energy;
        let total_water = read_f64(&values, keys::TOTAL_WATER) + accrual.water;

        // Only this domain's entry is decoded and rewritten; every other
        // entry goes back exactly as it was read.
        let mut sites = read_site_map(&values);
        let mut site = sites
            .get(domain)
            .and_then(|value| decode_site(domain, value))
            .unwrap_or_else(|| SiteAggregate::new(domain, rate.display_name));
        site.energy += accrual.energy;
        site.water += accrual.water;
        if count_visit {
            site.visit_count += 1;
        }
        if rate.unit.is_duration_based() {
            site.accumulated_units += units;
        }
        sites.insert(domain.to_string(), serde_json::to_value(&site)?);

        self.store.set(vec![
            (keys::TOTAL_ENERGY, json!(total_energy)),
            (keys::TOTAL_WATER, json!(total_water)),
            (keys::SITE_DATA, Value::Object(sites)),
        ])
    }

    /// Zeroes the totals, drops every site and restarts the session clock.
    pub fn reset_all(&mut self, now_ms: i64) -> Result<()> {
        self.store.set(vec![
            (keys::TOTAL_ENERGY, json!(0.0)),
            (keys::TOTAL_WATER, json!(0.0)),
            (keys::SITE_DATA, json!({})),
            (keys::SESSION_START, json!(now_ms)),
        ])
    }

    pub fn get_data(&self) -> Result<UsageData> {
        let values = self.store.get(&[
            keys::TOTAL_ENERGY,
            keys::TOTAL_WATER,
            keys::SITE_DATA,
            keys::SESSION_START,
        ])?;

        Ok(UsageData {
            total_energy: read_f64(&values, keys::TOTAL_ENERGY),
            total_water: read_f64(&values, keys::TOTAL_WATER),
            site_data: read_sites(&values),
            session_start: values
                .get(keys::SESSION_START)
                .and_then(Value::as_i64)
                .unwrap_or(0),
        })
    }
}

fn read_f64(values: &HashMap<String, Value>, key: &str) -> f64 {
    values.get(key).and_then(Value::as_f64).unwrap_or(0.0)
}

/// Raw site map from storage. Anything but a JSON object reads as empty.
fn read_site_map(values: &HashMap<String, Value>) -> Map<String, Value> {
    match values.get(keys::SITE_DATA) {
        Some(Value::Object(map)) => map.clone(),
        _ => Map::new(),
    }
}

/// Decodes one site record. Records written without a `domain` field take it
/// from their key.
fn decode_site(domain: &str, value: &Value) -> Option<SiteAggregate> {
    match serde_json::from_value::<SiteAggregate>(value.clone()) {
        Ok(mut site) => {
            if site.domain.is_empty() {
                site.domain = domain.to_string();
            }
            Some(site)
        }
        Err(e) => {
            warn!(domain, error = %e, "Skipping malformed site record");
            None
        }
    }
}

/// Decoded site records; malformed ones are left out.
fn read_sites(values: &HashMap<String, Value>) -> BTreeMap<String, SiteAggregate> {
    read_site_map(values)
        .iter()
        .filter_map(|(domain, value)| {
            decode_site(domain, value).map(|site| (domain.clone(), site))
        })
        .collect()
}
