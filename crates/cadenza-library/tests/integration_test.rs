//! Integration tests for the library operations.
//!
//! These tests use a fake artwork catalog and small synthetic MP3 files, so
//! no network access or real audio is required.

use std::cell::Cell;
use std::fs;
use std::path::{Path, PathBuf};

use cadenza_core::{Artwork, NamingPatterns, NamingRules};
use cadenza_library::pipeline::run_all;
use cadenza_library::tags::read_track;
use cadenza_library::{
    parse_threshold, recent_uploads, ArtworkCatalog, ArtworkEmbedder, CatalogResult,
    CollisionPolicy, NoProgress, Organizer, Progress, Retagger, Scanner, Transfer,
};
use tempfile::TempDir;

const FRAME_HEADER: [u8; 4] = [0xFF, 0xFB, 0x90, 0x44];
const FRAME_LEN: usize = 417;

fn write_silent_mp3(path: &Path) {
    let mut data = Vec::with_capacity(FRAME_LEN * 20);
    for _ in 0..20 {
        data.extend_from_slice(&FRAME_HEADER);
        data.resize(data.len() + FRAME_LEN - FRAME_HEADER.len(), 0);
    }
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, data).unwrap();
}

/// Hands out a distinct JPEG per lookup and counts lookups.
#[derive(Default)]
struct FakeCatalog {
    lookups: Cell<u8>,
}

impl ArtworkCatalog for FakeCatalog {
    fn name(&self) -> &str {
        "fake"
    }

    fn find_artwork(&self, artist: &str) -> CatalogResult<Option<Artwork>> {
        if artist.eq_ignore_ascii_case("nobody") {
            return Ok(None);
        }
        let n = self.lookups.get() + 1;
        self.lookups.set(n);
        Ok(Some(Artwork::new(
            vec![0xFF, 0xD8, 0xFF, 0xE0, n, 0xFF, 0xD9],
            Some("image/jpeg"),
            None,
        )))
    }
}

fn rules() -> NamingRules {
    NamingRules::new(&NamingPatterns::default()).unwrap()
}

struct Workspace {
    _temp_dir: TempDir,
    source: PathBuf,
    dest: PathBuf,
}

fn workspace(names: &[&str]) -> Workspace {
    let temp_dir = TempDir::new().unwrap();
    let source = temp_dir.path().join("downloads");
    let dest = temp_dir.path().join("library");
    fs::create_dir_all(&dest).unwrap();
    for name in names {
        write_silent_mp3(&source.join(name));
    }
    Workspace {
        _temp_dir: temp_dir,
        source,
        dest,
    }
}

#[test]
fn test_id3_is_idempotent() {
    let ws = workspace(&["Artist feat. Guest - Song.mp3", "Solo - Tune.mp3"]);
    let rules = rules();
    let retagger = Retagger::new(&rules).quarantine_into(&ws.source);

    let files = Scanner::new(&ws.source).files();
    let first = retagger.retag(&files, &mut NoProgress);
    assert_eq!(first.done.len(), 2);
    assert_eq!(first.renamed, 1);
    let snapshot = tag_state(&first.done);

    let files = Scanner::new(&ws.source).files();
    let second = retagger.retag(&files, &mut NoProgress);
    assert_eq!(second.done, first.done);
    assert_eq!(second.renamed, 0);
    assert_eq!(tag_state(&second.done), snapshot);
    assert_eq!(
        snapshot[0],
        (Some("Artist ft. Guest".to_string()), Some("Song".to_string()))
    );
}

/// Artist and title of each file, as read back from its tags.
fn tag_state(files: &[PathBuf]) -> Vec<(Option<String>, Option<String>)> {
    files
        .iter()
        .map(|path| {
            let track = read_track(path).unwrap();
            (track.artist, track.title)
        })
        .collect()
}

/// Counts files per operation.
#[derive(Default)]
struct StageCounts {
    stages: Vec<(String, usize, usize)>,
}

impl Progress for StageCounts {
    fn start(&mut self, operation: &str, total: usize) {
        self.stages.push((operation.to_string(), total, 0));
    }

    fn advance(&mut self, _path: &Path) {
        if let Some(stage) = self.stages.last_mut() {
            stage.2 += 1;
        }
    }
}

#[test]
fn test_all_pipeline() {
    let ws = workspace(&[
        "Nina Simone - Sinnerman.mp3",
        "Nina Simone feat. Guest - Feeling Good.mp3",
        "Nobody - Unknown Song.mp3",
        "garbage.mp3",
    ]);
    let rules = rules();
    let retagger = Retagger::new(&rules).quarantine_into(&ws.source);
    let catalog = FakeCatalog::default();
    let mut embedder = ArtworkEmbedder::new(&rules, &catalog);
    let organizer = Organizer::new(ws.dest.clone(), Transfer::Copy, CollisionPolicy::Skip);

    let files = Scanner::new(&ws.source).files();
    let mut progress = StageCounts::default();
    let reports = run_all(&files, &retagger, &mut embedder, &organizer, &mut progress);

    assert_eq!(reports.len(), 3);
    assert_eq!(reports[0].done.len(), 3);
    assert_eq!(reports[0].quarantined, 1);
    assert_eq!(reports[1].done.len(), 2);
    assert_eq!(reports[1].skipped.len(), 1);
    assert_eq!(reports[2].done.len(), 2);
    assert_eq!(catalog.lookups.get(), 1);
    assert_eq!(
        progress.stages,
        vec![
            ("id3".to_string(), 4, 4),
            ("art".to_string(), 3, 3),
            ("copy".to_string(), 2, 2),
        ]
    );

    let artist_dir = ws.dest.join("Nina Simone");
    let first = read_track(&artist_dir.join("Nina Simone - Sinnerman.mp3")).unwrap();
    let featured = read_track(&ws.dest.join("Nina Simone ft. Guest").join(
        "Nina Simone ft. Guest - Feeling Good.mp3",
    ))
    .unwrap();
    assert_eq!(
        first.artwork.unwrap().data,
        featured.artwork.unwrap().data
    );

    assert!(!ws.dest.join("Nobody").exists());
    assert!(ws.source.join("_invalid").join("garbage.mp3").exists());
    assert!(ws.source.join("Nina Simone - Sinnerman.mp3").exists());
}

#[test]
fn test_move_into_library() {
    let ws = workspace(&["Artist - One.mp3", "Artist - Two.mp3"]);
    let rules = rules();
    let files = Scanner::new(&ws.source).files();
    let tagged = Retagger::new(&rules).retag(&files, &mut NoProgress);

    let organizer = Organizer::new(ws.dest.clone(), Transfer::Move, CollisionPolicy::Skip);
    let moved = organizer.organize(&tagged.done, &mut NoProgress);

    assert!(moved.is_clean());
    assert!(Scanner::new(&ws.source).files().is_empty());
    assert_eq!(Scanner::new(ws.dest.join("Artist")).files().len(), 2);
}

#[test]
fn test_second_copy_collides() {
    let ws = workspace(&["Artist - One.mp3"]);
    let rules = rules();
    let files = Scanner::new(&ws.source).files();
    let tagged = Retagger::new(&rules).retag(&files, &mut NoProgress);

    let organizer = Organizer::new(ws.dest.clone(), Transfer::Copy, CollisionPolicy::Skip);
    assert!(organizer.organize(&tagged.done, &mut NoProgress).is_clean());

    let again = organizer.organize(&tagged.done, &mut NoProgress);
    assert!(again.done.is_empty());
    assert_eq!(again.skipped.len(), 1);
}

#[test]
fn test_uploads_after_copy() {
    let ws = workspace(&["Artist - One.mp3"]);
    let rules = rules();
    let files = Scanner::new(&ws.source).files();
    let tagged = Retagger::new(&rules).retag(&files, &mut NoProgress);
    Organizer::new(ws.dest.clone(), Transfer::Copy, CollisionPolicy::Skip)
        .organize(&tagged.done, &mut NoProgress);

    let long_ago = parse_threshold("01/01/00").unwrap();
    let uploads = recent_uploads(&ws.dest, long_ago);
    assert_eq!(uploads.len(), 1);
    assert_eq!(
        uploads[0].relative_to(&ws.dest),
        Path::new("Artist/Artist - One.mp3")
    );

    let far_future = parse_threshold("2999-01-01").unwrap();
    assert!(recent_uploads(&ws.dest, far_future).is_empty());
}
