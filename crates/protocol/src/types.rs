use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::version::{MIN_SUPPORTED_VERSION, PROTOCOL_VERSION};

pub type TabId = i64;

/// Tab lifecycle notifications forwarded by the browser host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TabEvent {
    /// A navigation finished loading. Only `frame_id == 0` (the top-level
    /// frame) is accounted.
    NavigationCompleted {
        tab_id: TabId,
        frame_id: i64,
        url: String,
    },
    /// A tab became the active tab of the focused window. The host may
    /// include the tab's URL; otherwise it is resolved from earlier events.
    Activated {
        tab_id: TabId,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        url: Option<String>,
    },
    /// A tab's URL changed without a completed navigation.
    Updated { tab_id: TabId, url: String },
    Removed { tab_id: TabId },
}

impl TabEvent {
    pub fn tab_id(&self) -> TabId {
        match self {
            TabEvent::NavigationCompleted { tab_id, .. }
            | TabEvent::Activated { tab_id, .. }
            | TabEvent::Updated { tab_id, .. }
            | TabEvent::Removed { tab_id } => *tab_id,
        }
    }
}

/// Accumulated usage for one domain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SiteAggregate {
    #[serde(default)]
    pub domain: String,
    #[serde(rename = "name")]
    pub display_name: String,
    /// kWh
    pub energy: f64,
    /// gallons
    pub water: f64,
    #[serde(rename = "visits")]
    pub visit_count: u64,
    /// Whole minutes accrued on duration-based sites.
    #[serde(rename = "duration")]
    pub accumulated_units: f64,
}

impl SiteAggregate {
    pub fn new(domain: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            domain: domain.into(),
            display_name: display_name.into(),
            energy: 0.0,
            water: 0.0,
            visit_count: 0,
            accumulated_units: 0.0,
        }
    }
}

/// Everything the usage view needs, as returned by `GetData`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageData {
    pub total_energy: f64,
    pub total_water: f64,
    #[serde(default)]
    pub site_data: BTreeMap<String, SiteAggregate>,
    /// Unix epoch milliseconds.
    pub session_start: i64,
}

impl UsageData {
    pub fn empty(session_start: i64) -> Self {
        Self {
            total_energy: 0.0,
            total_water: 0.0,
            site_data: BTreeMap::new(),
            session_start,
        }
    }

    /// Sites ordered by water usage, heaviest first.
    pub fn sites_by_water(&self) -> Vec<&SiteAggregate> {
        let mut sites: Vec<&SiteAggregate> = self.site_data.values().collect();
        sites.sort_by(|a, b| b.water.total_cmp(&a.water));
        sites
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DaemonStatus {
    pub running: bool,
    pub uptime_secs: u64,
    pub version: String,
    pub tracked_tabs: usize,
    pub tracking_enabled: bool,
    pub database_size_bytes: u64,
    pub protocol_version: u32,
    pub min_supported_version: u32,
}

impl Default for DaemonStatus {
    fn default() -> Self {
        Self {
            running: false,
            uptime_secs: 0,
            version: String::new(),
            tracked_tabs: 0,
            tracking_enabled: false,
            database_size_bytes: 0,
            protocol_version: PROTOCOL_VERSION,
            min_supported_version: MIN_SUPPORTED_VERSION,
        }
    }
}
