use anyhow::{anyhow, Context, Result};
use cadenza_library::Config;

/// Install the global logger.
///
/// With `debug_log` on, everything from debug up goes to the log file.
/// Otherwise records at `log_level` and above go to stderr.
pub fn init(config: &Config) -> Result<()> {
    let builder = if config.debug_log {
        if let Some(parent) = config.log_file.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create log directory {}", parent.display()))?;
        }
        twyg::OptsBuilder::new()
            .coloured(false)
            .output(twyg::Output::File(config.log_file.clone()))
            .level(twyg::LogLevel::Debug)
    } else {
        twyg::OptsBuilder::new()
            .coloured(true)
            .output(twyg::Output::Stderr)
            .level(parse_level(&config.log_level)?)
    };

    let opts = builder
        .report_caller(false)
        .build()
        .map_err(|e| anyhow!("Invalid logging options: {e:?}"))?;
    twyg::setup(opts).map_err(|e| anyhow!("Failed to set up logging: {e:?}"))?;

    Ok(())
}

fn parse_level(level: &str) -> Result<twyg::LogLevel> {
    match level.trim().to_lowercase().as_str() {
        "trace" => Ok(twyg::LogLevel::Trace),
        "debug" => Ok(twyg::LogLevel::Debug),
        "info" => Ok(twyg::LogLevel::Info),
        "warn" | "warning" => Ok(twyg::LogLevel::Warn),
        "error" => Ok(twyg::LogLevel::Error),
        other => anyhow::bail!(
            "Unknown log_level '{other}': expected trace, debug, info, warn or error"
        ),
    }
}
