use clap::Subcommand;
use droplet_protocol::{TabEvent, TabId};

#[derive(Debug, Subcommand)]
pub enum TabCommands {
    /// A navigation finished loading
    Navigated {
        tab_id: TabId,
        url: String,

        /// Frame the navigation happened in; 0 is the top-level frame
        #[arg(long, default_value_t = 0)]
        frame_id: i64,
    },

    /// A tab became the active tab of the focused window
    Activated {
        tab_id: TabId,
        url: Option<String>,
    },

    /// A tab's URL changed
    Updated { tab_id: TabId, url: String },

    /// A tab was closed
    Removed { tab_id: TabId },
}

impl From<TabCommands> for TabEvent {
    fn from(command: TabCommands) -> Self {
        match command {
            TabCommands::Navigated {
                tab_id,
                url,
                frame_id,
            } => TabEvent::NavigationCompleted {
                tab_id,
                frame_id,
                url,
            },
            TabCommands::Activated { tab_id, url } => TabEvent::Activated { tab_id, url },
            TabCommands::Updated { tab_id, url } => TabEvent::Updated { tab_id, url },
            TabCommands::Removed { tab_id } => TabEvent::Removed { tab_id },
        }
    }
}
