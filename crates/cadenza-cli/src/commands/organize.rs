use anyhow::{Context, Result};

use cadenza_library::config::resolve_dir;
use cadenza_library::{
    run_all as run_pipeline, ArtworkEmbedder, CollisionPolicy, Config, DiscogsClient, Organizer,
    Retagger, Transfer,
};

use crate::{progress, DestArgs, SourceArgs};

fn organizer(config: &Config, args: &DestArgs, mode: Transfer) -> Result<Organizer> {
    let dest = resolve_dir(
        args.dest.as_deref(),
        config.destination.as_deref(),
        "destination",
    )?;
    let on_collision = args
        .on_collision
        .map(CollisionPolicy::from)
        .unwrap_or(config.on_collision);

    Ok(Organizer::new(dest, mode, on_collision))
}

/// Copy or move the files under the source into the library.
pub fn run_transfer(
    config: &Config,
    source: &SourceArgs,
    dest: &DestArgs,
    mode: Transfer,
) -> Result<()> {
    let organizer = organizer(config, dest, mode)?;
    let (_, files) = super::source_files(config, source)?;

    log::info!(
        "Placing {} file(s) into {}",
        files.len(),
        organizer.destination().display()
    );
    let report = organizer.organize(&files, &mut progress::Bar::default());
    super::print_report(&report);

    Ok(())
}

/// Tag, illustrate and copy the files under the source.
pub fn run_all(config: &Config, source: &SourceArgs, dest: &DestArgs) -> Result<()> {
    let client = DiscogsClient::from_config(config).context("Cannot use Discogs")?;
    let organizer = organizer(config, dest, Transfer::Copy)?;
    let (source_dir, files) = super::source_files(config, source)?;
    let rules = config.naming_rules()?;

    let mut retagger = Retagger::new(&rules);
    if config.quarantine_invalid {
        retagger = retagger.quarantine_into(&source_dir);
    }
    let mut embedder = ArtworkEmbedder::new(&rules, client);

    let mut bar = progress::Bar::default();
    for report in run_pipeline(&files, &retagger, &mut embedder, &organizer, &mut bar) {
        super::print_report(&report);
    }

    Ok(())
}
