use anyhow::Result;
use std::path::Path;

use cadenza_library::{config, SettingsFile};

/// Show the config file path.
pub fn show_path(config_path: &Path) -> Result<()> {
    println!("{}", config_path.display());
    Ok(())
}

/// Show example configuration.
pub fn show_example() -> Result<()> {
    print!("{}", config::example_config());
    Ok(())
}

/// Initialize config file with defaults.
pub fn init_config(config_path: &Path) -> Result<()> {
    let created = config::ensure_config_file_at(config_path)?;

    if created {
        println!("✓ Created config file: {}", config_path.display());
        println!("\nEdit this file to configure cadenza.");
    } else {
        println!("Config file already exists: {}", config_path.display());
    }

    Ok(())
}

/// Set a config value.
pub fn set_config(config_path: &Path, key: &str, value: &str) -> Result<()> {
    let mut settings = SettingsFile::open(config_path)?;
    settings.set_from_str(key, value)?;
    settings.save()?;

    println!("✓ Updated {key}");
    println!("  in {}", config_path.display());
    Ok(())
}

/// Remove a config value.
pub fn unset_config(config_path: &Path, key: &str) -> Result<()> {
    let mut settings = SettingsFile::open(config_path)?;
    if settings.remove(key) {
        settings.save()?;
        println!("✓ Removed {key} from {}", config_path.display());
    } else {
        println!("{key} is not set in {}", config_path.display());
    }
    Ok(())
}
