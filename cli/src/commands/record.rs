use color_eyre::eyre::{eyre, Result};
use droplet_rates::normalize_host;
use tracing::info;

use crate::config::UserConfig;
use crate::daemon::{is_daemon_running, DaemonClient};
use crate::data::{UsageAccumulator, UsageLedger, UsageStore};

pub fn run(config: &UserConfig, domain: &str, duration: f64) -> Result<()> {
    let domain = normalize_host(domain);
    if domain.is_empty() {
        return Err(eyre!("Domain must not be empty"));
    }
    if !duration.is_finite() || duration < 0.0 {
        return Err(eyre!("Duration must be a non-negative number, got {duration}"));
    }

    if is_daemon_running() {
        let mut client = DaemonClient::connect_with_version_check()?;
        client.record_usage(&domain, duration)?;
    } else {
        let now_ms = chrono::Utc::now().timestamp_millis();
        let mut ledger = UsageLedger::new(UsageStore::open_configured(config)?);
        ledger.initialize(now_ms)?;
        UsageAccumulator::new(ledger).record_usage(&domain, duration)?;
    }

    info!(domain = %domain, duration, "Usage recorded");
    println!("Recorded usage for {domain}.");
    Ok(())
}
