use anyhow::Result;

use cadenza_library::{Config, Retagger};

use crate::{progress, SourceArgs};

/// Set artist and title tags from file names.
pub fn run_id3(config: &Config, args: &SourceArgs) -> Result<()> {
    let (source, files) = super::source_files(config, args)?;
    let rules = config.naming_rules()?;

    let mut retagger = Retagger::new(&rules);
    if config.quarantine_invalid {
        retagger = retagger.quarantine_into(&source);
    }

    log::info!("Tagging {} file(s) in {}", files.len(), source.display());
    let report = retagger.retag(&files, &mut progress::Bar::default());
    super::print_report(&report);

    Ok(())
}
