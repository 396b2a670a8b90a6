use anyhow::Result;
use std::path::{Path, PathBuf};

use cadenza_library::config::resolve_dir;
use cadenza_library::{
    parse_threshold, recent_uploads, CollisionPolicy, Config, Organizer, Transfer,
};

use crate::{progress, CollisionArg};

/// List or copy files modified after `since`.
pub fn run_uploads(
    config: &Config,
    since: &str,
    root: Option<&Path>,
    copy_to: Option<&Path>,
    on_collision: Option<CollisionArg>,
) -> Result<()> {
    let threshold = parse_threshold(since)?;
    let root = resolve_dir(root, config.destination.as_deref(), "library")?;
    let uploads = recent_uploads(&root, threshold);

    if uploads.is_empty() {
        println!(
            "No files in {} modified after {}",
            root.display(),
            threshold.format("%Y-%m-%d")
        );
        return Ok(());
    }

    match copy_to {
        None => {
            println!(
                "{} file(s) in {} modified after {}:",
                uploads.len(),
                root.display(),
                threshold.format("%Y-%m-%d")
            );
            for upload in &uploads {
                println!(
                    "  {}  {}",
                    upload.modified.format("%Y-%m-%d %H:%M"),
                    upload.relative_to(&root).display()
                );
            }
        }
        Some(target) => {
            let target = resolve_dir(Some(target), None, "copy-to")?;
            let policy = on_collision
                .map(CollisionPolicy::from)
                .unwrap_or(config.on_collision);
            let files: Vec<PathBuf> = uploads.into_iter().map(|upload| upload.path).collect();

            let organizer = Organizer::new(target, Transfer::Copy, policy);
            let report = organizer.organize(&files, &mut progress::Bar::default());
            super::print_report(&report);
        }
    }

    Ok(())
}
