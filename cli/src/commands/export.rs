use std::path::{Path, PathBuf};

use color_eyre::eyre::Result;
use droplet_protocol::UsageData;
use tracing::info;

use crate::commands::load_usage;
use crate::config::UserConfig;

pub fn run(config: &UserConfig, output: Option<PathBuf>) -> Result<()> {
    let data = load_usage(config)?;
    let path =
        output.unwrap_or_else(|| default_file_name(chrono::Utc::now().timestamp_millis()));

    write_export(&data, &path)?;
    info!(path = ?path, sites = data.site_data.len(), "Exported usage data");
    println!("Exported usage data to {}", path.display());
    Ok(())
}

pub fn default_file_name(now_ms: i64) -> PathBuf {
    PathBuf::from(format!("water-usage-{now_ms}.json"))
}

fn write_export(data: &UsageData, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(data)?;
    std::fs::write(path, json)?;
    Ok(())
}
