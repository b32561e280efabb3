use color_eyre::eyre::{eyre, Result};
use tracing::info;

use crate::config::UserConfig;
use crate::daemon::{is_daemon_running, DaemonClient};
use crate::data::{UsageLedger, UsageStore};

pub fn run(config: &UserConfig, yes: bool) -> Result<()> {
    if !yes {
        print!("Reset all usage data? This cannot be undone. [y/N] ");
        std::io::Write::flush(&mut std::io::stdout())?;

        let mut input = String::new();
        std::io::stdin().read_line(&mut input)?;

        if !input.trim().eq_ignore_ascii_case("y") {
            println!("Cancelled.");
            return Ok(());
        }
    }

    if is_daemon_running() {
        let mut client = DaemonClient::connect_with_version_check()?;
        if !client.reset_data()? {
            return Err(eyre!("Daemon could not reset usage data"));
        }
    } else {
        let mut ledger = UsageLedger::new(UsageStore::open_configured(config)?);
        ledger.reset_all(chrono::Utc::now().timestamp_millis())?;
    }

    info!("Usage data reset");
    println!("Usage data reset.");
    Ok(())
}
