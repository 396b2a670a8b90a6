use anyhow::{Context, Result};
use std::path::Path;

use cadenza_library::{logfile, Config, LogFileInfo, SettingsFile};

/// Delete the debug log file.
pub fn clear(config: &Config) -> Result<()> {
    let removed = logfile::clear(&config.log_file)
        .with_context(|| format!("Failed to delete {}", config.log_file.display()))?;

    if removed {
        println!("✓ Deleted {}", config.log_file.display());
    } else {
        println!("No log file at {}", config.log_file.display());
    }
    Ok(())
}

pub fn show_info(config: &Config) {
    print_info(&LogFileInfo::from_config(config));
}

pub(crate) fn print_info(info: &LogFileInfo) {
    println!("Log file:");
    println!("  name: {}", info.name);
    println!("  directory: {}", info.directory.display());
    println!("  timestamps: {}", info.timestamps);
    println!("  enabled: {}", info.enabled);
    match info.size {
        Some(bytes) => println!("  size: {bytes} bytes"),
        None => println!("  size: (no file yet)"),
    }
}

/// Persist the `debug_log` switch.
pub fn set_enabled(config_path: &Path, enabled: bool) -> Result<()> {
    let mut settings = SettingsFile::open(config_path)?;
    settings.set("debug_log", enabled);
    settings.save()?;

    let state = if enabled { "on" } else { "off" };
    println!("✓ Debug logging is {state}");
    Ok(())
}
