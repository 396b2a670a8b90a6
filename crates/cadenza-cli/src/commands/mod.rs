pub mod artwork;
pub mod config;
pub mod logfile;
pub mod organize;
pub mod retag;
pub mod settings;
pub mod uploads;

use anyhow::Result;
use std::path::PathBuf;

use cadenza_library::config::resolve_dir;
use cadenza_library::{BatchReport, Config, Scanner};

use crate::SourceArgs;

/// Resolve the source directory and list the files in it.
pub(crate) fn source_files(config: &Config, args: &SourceArgs) -> Result<(PathBuf, Vec<PathBuf>)> {
    let source = resolve_dir(args.source.as_deref(), config.source.as_deref(), "source")?;
    let files = Scanner::new(&source).with_depth(args.depth)?.files();

    if files.is_empty() {
        println!("No MP3 files found in {}", source.display());
    }

    Ok((source, files))
}

/// Print a batch summary followed by every skipped file.
pub(crate) fn print_report(report: &BatchReport) {
    let mark = if report.is_clean() { "✓" } else { "!" };
    println!("{mark} {report}");
    for skipped in &report.skipped {
        println!("  ✗ {}: {}", skipped.path.display(), skipped.reason);
    }
}
