//! Per-tab usage accounting.
//!
//! Each tab moves between two states: no session, or an active session
//! holding its domain and a start time. Navigation and activation start a
//! session, the periodic tick advances the start time of the focused tab,
//! and removal ends it. Tabs in the background keep their session but are
//! never charged for the time they sit unselected.

use droplet_protocol::{TabId, UsageData};
use droplet_rates::{extract_domain, normalize_host};
use tracing::{debug, trace};

use crate::data::ledger::{Accrual, UsageLedger};
use crate::data::sessions::SessionRegistry;
use crate::data::store::{KeyValueStore, Result};
use crate::data::tabs::TabHost;

const TOP_LEVEL_FRAME: i64 = 0;
const MINUTES_PER_TICK: f64 = 1.0;

pub struct UsageAccumulator<S> {
    sessions: SessionRegistry,
    ledger: UsageLedger<S>,
}

impl<S: KeyValueStore> UsageAccumulator<S> {
    pub fn new(ledger: UsageLedger<S>) -> Self {
        Self {
            sessions: SessionRegistry::new(),
            ledger,
        }
    }

    pub fn sessions(&self) -> &SessionRegistry {
        &self.sessions
    }

    pub fn ledger(&self) -> &UsageLedger<S> {
        &self.ledger
    }

    #[cfg(test)]
    pub fn ledger_mut(&mut self) -> &mut UsageLedger<S> {
        &mut self.ledger
    }

    /// A top-level navigation finished: restart the tab's session on the new
    /// domain and charge one visit.
    ///
    /// Sub-frame navigations and URLs without a domain are dropped. The
    /// session is replaced before the ledger write, so a storage failure only
    /// loses the visit.
    pub fn on_navigation_completed(
        &mut self,
        tab_id: TabId,
        frame_id: i64,
        url: &str,
        now_ms: i64,
    ) -> Result<Option<Accrual>> {
        if frame_id != TOP_LEVEL_FRAME {
            trace!(tab_id, frame_id, "Ignoring sub-frame navigation");
            return Ok(None);
        }

        let Some(domain) = extract_domain(url) else {
            debug!(tab_id, url, "Dropping navigation without a domain");
            return Ok(None);
        };

        self.sessions.start(tab_id, domain.clone(), now_ms);
        let accrual = self.ledger.record_visit(&domain)?;
        debug!(
            tab_id,
            domain = %domain,
            energy = accrual.energy,
            "Recorded visit"
        );
        Ok(Some(accrual))
    }

    /// A tab became active: reset its timer baseline. Nothing is charged.
    ///
    /// Returns whether a session was started.
    pub fn on_tab_activated<H: TabHost>(&mut self, tab_id: TabId, host: &H, now_ms: i64) -> bool {
        let Some(domain) = host.tab_url(tab_id).and_then(|url| extract_domain(&url)) else {
            debug!(tab_id, "Activated tab has no resolvable domain");
            return false;
        };

        debug!(tab_id, domain = %domain, "Tab activated");
        self.sessions.start(tab_id, domain, now_ms);
        true
    }

    /// Charges the focused tab for one whole minute once at least a minute
    /// has passed since its baseline, then moves the baseline to `now_ms`.
    ///
    /// Any fraction past the whole minute is dropped. Only per-minute rates
    /// are charged; other domains just have their baseline advanced, since
    /// their cost was already taken by the visit.
    pub fn on_periodic_tick<H: TabHost>(&mut self, host: &H, now_ms: i64) -> Result<Option<Accrual>> {
        let Some(tab_id) = host.focused_active_tab() else {
            return Ok(None);
        };
        let Some(session) = self.sessions.get_mut(tab_id) else {
            return Ok(None);
        };

        if session.elapsed_minutes(now_ms) < MINUTES_PER_TICK {
            return Ok(None);
        }

        session.start_time = now_ms;
        let domain = session.domain.clone();

        let accrual = self.ledger.accrue_duration(&domain, MINUTES_PER_TICK)?;
        if let Some(accrual) = accrual {
            debug!(
                tab_id,
                domain = %domain,
                energy = accrual.energy,
                "Accrued one minute"
            );
        }
        Ok(accrual)
    }

    /// The tab was closed: forget its session.
    pub fn on_tab_removed(&mut self, tab_id: TabId) -> bool {
        let removed = self.sessions.remove(tab_id).is_some();
        if removed {
            debug!(tab_id, "Session ended");
        }
        removed
    }

    /// Charges usage reported directly for a domain, outside any tab.
    ///
    /// The domain is normalized like a navigation host. Blank domains and
    /// durations that are negative or not finite are dropped.
    pub fn record_usage(&mut self, domain: &str, duration_units: f64) -> Result<Option<Accrual>> {
        let domain = normalize_host(domain);
        if domain.is_empty() || !duration_units.is_finite() || duration_units < 0.0 {
            debug!(domain = %domain, duration_units, "Dropping usage report");
            return Ok(None);
        }

        let accrual = self.ledger.record_usage(&domain, duration_units)?;
        debug!(
            domain = %domain,
            duration_units,
            energy = accrual.energy,
            "Recorded usage"
        );
        Ok(Some(accrual))
    }

    /// Clears persisted totals. Active sessions keep their baselines.
    pub fn reset_all(&mut self, now_ms: i64) -> Result<()> {
        self.ledger.reset_all(now_ms)
    }

    pub fn get_data(&self) -> Result<UsageData> {
        self.ledger.get_data()
    }
}
