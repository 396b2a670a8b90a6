use anyhow::{Context, Result};

use cadenza_library::{ArtworkEmbedder, Config, DiscogsClient};

use crate::{progress, SourceArgs};

/// Embed Discogs artwork into the files under the source.
pub fn run_art(config: &Config, args: &SourceArgs) -> Result<()> {
    let client = DiscogsClient::from_config(config).context("Cannot use Discogs")?;
    let (source, files) = super::source_files(config, args)?;
    let rules = config.naming_rules()?;

    log::info!(
        "Fetching artwork for {} file(s) in {}",
        files.len(),
        source.display()
    );
    let mut embedder = ArtworkEmbedder::new(&rules, client);
    let report = embedder.embed(&files, &mut progress::Bar::default());
    super::print_report(&report);
    println!("  {} catalog lookup(s)", embedder.lookups());

    Ok(())
}
