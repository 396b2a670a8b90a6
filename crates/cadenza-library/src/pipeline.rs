use std::path::PathBuf;

use crate::artwork::ArtworkEmbedder;
use crate::catalog::ArtworkCatalog;
use crate::organize::Organizer;
use crate::report::{BatchReport, Progress};
use crate::retag::Retagger;

/// Run id3, then art, then the library transfer.
///
/// Each stage only sees the files the previous stage accepted, at the
/// paths it left them. Returns one report per stage, in order. `progress`
/// is started and finished once per stage.
pub fn run_all<C: ArtworkCatalog>(
    files: &[PathBuf],
    retagger: &Retagger<'_>,
    embedder: &mut ArtworkEmbedder<'_, C>,
    organizer: &Organizer,
    progress: &mut dyn Progress,
) -> Vec<BatchReport> {
    let tagged = retagger.retag(files, progress);
    log::info!("{tagged}");

    let with_art = embedder.embed(&tagged.done, progress);
    log::info!("{with_art}");

    let placed = organizer.organize(&with_art.done, progress);
    log::info!("{placed}");

    vec![tagged, with_art, placed]
}
