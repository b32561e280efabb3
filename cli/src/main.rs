mod cli;
mod commands;
mod config;
mod daemon;
mod data;
mod logging;

use clap::Parser;
use color_eyre::eyre::Result;

use cli::{Cli, Commands};
use config::{ensure_dirs, LogLevel, UserConfig};
use logging::LogMode;

fn main() -> Result<()> {
    color_eyre::install()?;
    let _ = ensure_dirs();

    let cli = Cli::parse();
    let config = UserConfig::load();
    let log_level_override = cli.log_level.as_deref().map(LogLevel::from_str);

    match cli.command {
        Some(Commands::Daemon { command }) => {
            commands::daemon::run(command, config.log_level, log_level_override)
        }
        Some(Commands::Summary) | None => {
            let _guard = logging::init(config.log_level, LogMode::Stderr, log_level_override);
            commands::summary::run(&config)
        }
        Some(Commands::Export { output }) => {
            let _guard = logging::init(config.log_level, LogMode::Stderr, log_level_override);
            commands::export::run(&config, output)
        }
        Some(Commands::Reset { yes }) => {
            let _guard = logging::init(config.log_level, LogMode::Stderr, log_level_override);
            commands::reset::run(&config, yes)
        }
        Some(Commands::Record { domain, duration }) => {
            let _guard = logging::init(config.log_level, LogMode::Stderr, log_level_override);
            commands::record::run(&config, &domain, duration)
        }
        Some(Commands::Tab { command }) => {
            let _guard = logging::init(config.log_level, LogMode::Stderr, log_level_override);
            commands::tab::run(command)
        }
        Some(Commands::Classify { target }) => {
            let _guard = logging::init(config.log_level, LogMode::Stderr, log_level_override);
            commands::classify::run(&target)
        }
        Some(Commands::Config { path, reset, edit }) => {
            let _guard = logging::init(config.log_level, LogMode::Stderr, log_level_override);
            commands::config::run(path, reset, edit)
        }
        Some(Commands::Logs { lines, follow }) => commands::logs::run(lines, follow),
    }
}
