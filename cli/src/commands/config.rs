use color_eyre::eyre::Result;

use crate::config::{config_path, data_dir, UserConfig};

pub fn run(path: bool, reset: bool, edit: bool) -> Result<()> {
    let config_file = config_path();

    if path {
        println!("{}", config_file.display());
        return Ok(());
    }

    if reset {
        UserConfig::default().save()?;
        println!("Config reset to defaults at: {}", config_file.display());
        return Ok(());
    }

    if edit {
        let editor = std::env::var("EDITOR").unwrap_or_else(|_| "nano".to_string());

        if !config_file.exists() {
            UserConfig::default().save()?;
        }

        std::process::Command::new(editor)
            .arg(&config_file)
            .status()?;

        return Ok(());
    }

    let config = UserConfig::load();
    let database = config
        .database_path()
        .unwrap_or_else(|| data_dir().join("usage.db"));

    println!("Config file: {}", config_file.display());
    println!("Database:    {}", database.display());
    println!();
    println!("{}", toml::to_string_pretty(&config)?);

    Ok(())
}
