use anyhow::Result;
use std::path::Path;

use cadenza_library::config::expand_path;
use cadenza_library::{Config, LogFileInfo, SettingsFile};

/// Store a default directory under `key`.
///
/// The path is stored absolute. It does not have to exist yet; commands
/// check that when they run.
pub fn set_dir(config_path: &Path, key: &str, raw: &str) -> Result<()> {
    let dir = expand_path(raw)?;
    if !dir.is_dir() {
        log::warn!("{} does not exist (yet)", dir.display());
    }

    let mut settings = SettingsFile::open(config_path)?;
    settings.set(key, dir.to_string_lossy().as_ref());
    settings.save()?;

    println!("✓ Updated {key} = {}", dir.display());
    println!("  in {}", settings.path().display());
    Ok(())
}

/// Print every setting followed by the log file summary.
pub fn show_settings(config: &Config, config_path: &Path) -> Result<()> {
    println!("Current Configuration");
    println!("=====================\n");

    println!("Config file: {}", config_path.display());
    let exists = config_path.exists();
    println!("File exists: {}\n", if exists { "yes" } else { "no (using defaults)" });

    println!("Settings:");
    for (key, value) in config.entries()? {
        println!("  {key}: {value}");
    }

    println!();
    super::logfile::print_info(&LogFileInfo::from_config(config));

    println!("\nPriority: CLI args > ENV vars (CADENZA_*) > Config file > Defaults");
    Ok(())
}
