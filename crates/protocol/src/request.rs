use serde::{Deserialize, Serialize};

use crate::types::TabEvent;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DaemonRequest {
    GetStatus,
    GetData,
    ResetData,
    Tab(TabEvent),
    /// Usage reported for a domain outside any tab, in the domain's
    /// accrual unit.
    RecordUsage { domain: String, duration: f64 },
    Shutdown,
}

impl DaemonRequest {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn from_json(s: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(s)
    }
}
