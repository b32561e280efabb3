use std::time::Duration;

use color_eyre::eyre::Result;

use crate::cli::DaemonCommands;
use crate::config::LogLevel;
use crate::daemon::{is_daemon_running, run_daemon, socket_path, DaemonClient};
use crate::data::display::format_bytes;
use crate::logging::{self, LogMode};

pub fn run(
    command: DaemonCommands,
    log_level: LogLevel,
    log_level_override: Option<LogLevel>,
) -> Result<()> {
    match command {
        DaemonCommands::Start { foreground } => start(foreground, log_level, log_level_override)?,
        DaemonCommands::Stop => stop()?,
        DaemonCommands::Restart => {
            stop()?;
            for _ in 0..10 {
                if !is_daemon_running() {
                    break;
                }
                std::thread::sleep(Duration::from_millis(100));
            }
            start(false, log_level, log_level_override)?;
        }
        DaemonCommands::Status => status()?,
    }

    Ok(())
}

fn start(
    foreground: bool,
    log_level: LogLevel,
    log_level_override: Option<LogLevel>,
) -> Result<()> {
    if is_daemon_running() {
        println!("Daemon is already running.");
        return Ok(());
    }

    if foreground {
        let _guard = logging::init(log_level, LogMode::Both, log_level_override);
        println!("Starting daemon in foreground...");
        println!("Press Ctrl+C to stop.");
        run_daemon(true, log_level, log_level_override)
            .map_err(|e| color_eyre::eyre::eyre!("{}", e))?;
        return Ok(());
    }

    println!("Starting daemon...");
    run_daemon(false, log_level, log_level_override)
        .map_err(|e| color_eyre::eyre::eyre!("{}", e))?;
    std::thread::sleep(Duration::from_millis(500));

    let mut started = false;
    for _ in 0..3 {
        if is_daemon_running() {
            started = true;
            break;
        }
        std::thread::sleep(Duration::from_millis(200));
    }

    if started {
        println!("Daemon started successfully.");
        println!("Socket: {:?}", socket_path());
    } else {
        println!("Daemon may have failed to start. Check logs:");
        println!("  droplet logs");
    }
    Ok(())
}

fn stop() -> Result<()> {
    if !is_daemon_running() {
        println!("Daemon is not running.");
        return Ok(());
    }

    match DaemonClient::connect() {
        Ok(mut client) => {
            client
                .shutdown()
                .map_err(|e| color_eyre::eyre::eyre!("{}", e))?;
            println!("Daemon stopped.");
        }
        Err(e) => {
            eprintln!("Failed to connect to daemon: {}", e);
            std::process::exit(1);
        }
    }
    Ok(())
}

fn status() -> Result<()> {
    println!("Daemon Status");
    println!("{}", "-".repeat(40));

    if !is_daemon_running() {
        println!("Running:      no");
        return Ok(());
    }

    match DaemonClient::connect() {
        Ok(mut client) => {
            let status = client
                .get_status()
                .map_err(|e| color_eyre::eyre::eyre!("{}", e))?;
            println!("Running:      yes");
            println!("Version:      {}", status.version);
            println!("Protocol:     v{}", status.protocol_version);
            println!("Uptime:       {} seconds", status.uptime_secs);
            println!(
                "Tracking:     {}",
                if status.tracking_enabled { "on" } else { "off" }
            );
            println!("Tabs:         {}", status.tracked_tabs);
            println!("Database:     {}", format_bytes(status.database_size_bytes));
        }
        Err(e) => {
            eprintln!("Failed to connect to daemon: {}", e);
            std::process::exit(1);
        }
    }
    Ok(())
}
