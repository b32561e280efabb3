use color_eyre::eyre::{eyre, Result};
use droplet_protocol::TabEvent;
use tracing::debug;

use crate::cli::TabCommands;
use crate::daemon::{is_daemon_running, DaemonClient};

pub fn run(command: TabCommands) -> Result<()> {
    if !is_daemon_running() {
        return Err(eyre!(
            "Daemon is not running. Start it with: droplet daemon start"
        ));
    }

    let event = TabEvent::from(command);
    debug!(event = ?event, "Forwarding tab event");

    let mut client = DaemonClient::connect_with_version_check()?;
    client.send_tab_event(event)?;
    Ok(())
}
