pub mod classify;
pub mod config;
pub mod daemon;
pub mod export;
pub mod logs;
pub mod record;
pub mod reset;
pub mod summary;
pub mod tab;

use color_eyre::eyre::Result;
use droplet_protocol::UsageData;
use tracing::debug;

use crate::config::UserConfig;
use crate::daemon::{is_daemon_running, DaemonClient};
use crate::data::{UsageLedger, UsageStore};

/// Reads usage from the daemon when it is up, otherwise straight from the
/// database file.
pub fn load_usage(config: &UserConfig) -> Result<UsageData> {
    if is_daemon_running() {
        let mut client = DaemonClient::connect_with_version_check()?;
        return Ok(client.get_data()?);
    }

    debug!("Daemon not running, reading usage store directly");
    let ledger = UsageLedger::new(UsageStore::open_configured(config)?);
    Ok(ledger.get_data()?)
}
