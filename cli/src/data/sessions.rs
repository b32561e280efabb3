use std::collections::HashMap;

use droplet_protocol::TabId;

const MS_PER_MINUTE: f64 = 60_000.0;

/// A tab's current domain and the baseline its elapsed time is measured from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveSession {
    pub tab_id: TabId,
    pub domain: String,
    /// Unix epoch milliseconds.
    pub start_time: i64,
}

impl ActiveSession {
    pub fn elapsed_minutes(&self, now_ms: i64) -> f64 {
        (now_ms - self.start_time) as f64 / MS_PER_MINUTE
    }
}

/// In-memory map of tabs to their active sessions.
///
/// Starts empty with the process and is only changed by the tab event
/// handlers; nothing here is persisted.
#[derive(Debug, Default)]
pub struct SessionRegistry {
    sessions: HashMap<TabId, ActiveSession>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a fresh session for `tab_id`, replacing any existing one.
    pub fn start(&mut self, tab_id: TabId, domain: String, now_ms: i64) {
        self.sessions.insert(
            tab_id,
            ActiveSession {
                tab_id,
                domain,
                start_time: now_ms,
            },
        );
    }

    #[cfg(test)]
    pub fn get(&self, tab_id: TabId) -> Option<&ActiveSession> {
        self.sessions.get(&tab_id)
    }

    pub fn get_mut(&mut self, tab_id: TabId) -> Option<&mut ActiveSession> {
        self.sessions.get_mut(&tab_id)
    }

    pub fn remove(&mut self, tab_id: TabId) -> Option<ActiveSession> {
        self.sessions.remove(&tab_id)
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    #[allow(dead_code)]
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
