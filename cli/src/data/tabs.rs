use std::collections::HashMap;

use droplet_protocol::{TabEvent, TabId};

/// Out-of-band view of the browser's tabs.
pub trait TabHost {
    /// Current URL of a tab, if the host knows it.
    fn tab_url(&self, tab_id: TabId) -> Option<String>;

    /// Active tab of the focused window.
    fn focused_active_tab(&self) -> Option<TabId>;
}

/// Tab URLs and the active tab, rebuilt from the host's tab events.
#[derive(Debug, Default)]
pub struct TabDirectory {
    urls: HashMap<TabId, String>,
    active: Option<TabId>,
}

impl TabDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn apply(&mut self, event: &TabEvent) {
        match event {
            TabEvent::NavigationCompleted {
                tab_id,
                frame_id,
                url,
            } => {
                if *frame_id == 0 {
                    self.urls.insert(*tab_id, url.clone());
                }
            }
            TabEvent::Activated { tab_id, url } => {
                if let Some(url) = url {
                    self.urls.insert(*tab_id, url.clone());
                }
                self.active = Some(*tab_id);
            }
            TabEvent::Updated { tab_id, url } => {
                self.urls.insert(*tab_id, url.clone());
            }
            TabEvent::Removed { tab_id } => {
                self.urls.remove(tab_id);
                if self.active == Some(*tab_id) {
                    self.active = None;
                }
            }
        }
    }
}

impl TabHost for TabDirectory {
    fn tab_url(&self, tab_id: TabId) -> Option<String> {
        self.urls.get(&tab_id).cloned()
    }

    fn focused_active_tab(&self) -> Option<TabId> {
        self.active
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tracks_urls_and_active_tab() {
        let mut directory = TabDirectory::new();
        directory.apply(&TabEvent::NavigationCompleted {
            tab_id: 1,
            frame_id: 0,
            url: "https://youtube.com/".to_string(),
        });
        directory.apply(&TabEvent::Activated {
            tab_id: 1,
            url: None,
        });

        assert_eq!(directory.tab_url(1).as_deref(), Some("https://youtube.com/"));
        assert_eq!(directory.focused_active_tab(), Some(1));
    }

    #[test]
    fn test_subframe_navigation_keeps_url() {
        let mut directory = TabDirectory::new();
        directory.apply(&TabEvent::Updated {
            tab_id: 1,
            url: "https://youtube.com/".to_string(),
        });
        directory.apply(&TabEvent::NavigationCompleted {
            tab_id: 1,
            frame_id: 4,
            url: "https://ads.example/".to_string(),
        });

        assert_eq!(directory.tab_url(1).as_deref(), Some("https://youtube.com/"));
    }

    #[test]
    fn test_removing_active_tab_clears_focus() {
        let mut directory = TabDirectory::new();
        directory.apply(&TabEvent::Activated {
            tab_id: 3,
            url: Some("https://reddit.com/".to_string()),
        });
        directory.apply(&TabEvent::Removed { tab_id: 3 });

        assert!(directory.tab_url(3).is_none());
        assert!(directory.focused_active_tab().is_none());
    }
}
