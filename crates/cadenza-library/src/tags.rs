//! Reading and writing ID3v2 tags.

use std::path::Path;

use lofty::config::WriteOptions;
use lofty::picture::{MimeType, Picture, PictureType};
use lofty::prelude::*;
use lofty::tag::{Tag, TagType};

use cadenza_core::{Artwork, ImageFormat, Track};

use crate::error::TrackResult;
use crate::scan::modified_time;

/// Read a track's artist, title and front cover.
///
/// A file without any tag yields a track with empty fields.
pub fn read_track(path: &Path) -> TrackResult<Track> {
    let tagged_file = lofty::read_from_path(path)?;
    let mut track = Track::new(path.to_path_buf(), modified_time(path)?);

    let tag = tagged_file
        .tag(TagType::Id3v2)
        .or_else(|| tagged_file.primary_tag())
        .or_else(|| tagged_file.first_tag());

    if let Some(tag) = tag {
        track.artist = tag.artist().map(|s| s.to_string());
        track.title = tag.title().map(|s| s.to_string());
        track.artwork = tag
            .pictures()
            .iter()
            .find(|picture| picture.pic_type() == PictureType::CoverFront)
            .map(|picture| {
                Artwork::new(
                    picture.data().to_vec(),
                    picture.mime_type().map(MimeType::as_str),
                    None,
                )
            });
    }

    Ok(track)
}

/// Set the artist and title frames, creating an ID3v2 tag if needed.
pub fn write_names(path: &Path, artist: &str, title: &str) -> TrackResult<()> {
    edit_id3v2(path, |tag| {
        tag.set_artist(artist.to_string());
        tag.set_title(title.to_string());
    })
}

/// Make `artwork` the front cover, replacing any previous one.
pub fn embed_artwork(path: &Path, artwork: &Artwork) -> TrackResult<()> {
    let mut builder = Picture::unchecked(artwork.data.clone()).pic_type(PictureType::CoverFront);
    if let Some(mime) = picture_mime(artwork.format) {
        builder = builder.mime_type(mime);
    }
    let picture = builder.build();

    edit_id3v2(path, |tag| {
        tag.remove_picture_type(PictureType::CoverFront);
        tag.push_picture(picture);
    })
}

fn picture_mime(format: ImageFormat) -> Option<MimeType> {
    match format {
        ImageFormat::Jpeg => Some(MimeType::Jpeg),
        ImageFormat::Png => Some(MimeType::Png),
        ImageFormat::Gif => Some(MimeType::Gif),
        ImageFormat::Bmp => Some(MimeType::Bmp),
        ImageFormat::Unknown => None,
    }
}

fn edit_id3v2(path: &Path, edit: impl FnOnce(&mut Tag)) -> TrackResult<()> {
    let mut tagged_file = lofty::read_from_path(path)?;

    if tagged_file.tag(TagType::Id3v2).is_none() {
        tagged_file.insert_tag(Tag::new(TagType::Id3v2));
    }

    if let Some(tag) = tagged_file.tag_mut(TagType::Id3v2) {
        edit(tag);
        tag.save_to_path(path, WriteOptions::default())?;
    }

    Ok(())
}

#[cfg(test)]
pub(crate) mod fixtures {
    use std::path::Path;

    /// Header of a 128 kbit/s, 44.1 kHz MPEG-1 Layer III frame.
    const FRAME_HEADER: [u8; 4] = [0xFF, 0xFB, 0x90, 0x44];
    const FRAME_LEN: usize = 417;

    /// Write a tiny but well-formed MP3 with no tags.
    pub fn write_silent_mp3(path: &Path) {
        let mut data = Vec::with_capacity(FRAME_LEN * 20);
        for _ in 0..20 {
            data.extend_from_slice(&FRAME_HEADER);
            data.resize(data.len() + FRAME_LEN - FRAME_HEADER.len(), 0);
        }
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(path, data).unwrap();
    }

    /// A minimal JPEG-looking payload.
    pub fn jpeg_bytes(seed: u8) -> Vec<u8> {
        vec![0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, b'J', b'F', b'I', b'F', seed, 0xFF, 0xD9]
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::{jpeg_bytes, write_silent_mp3};
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_read_untagged_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("A - B.mp3");
        write_silent_mp3(&path);

        let track = read_track(&path).unwrap();
        assert!(track.artist.is_none());
        assert!(track.title.is_none());
        assert!(track.artwork.is_none());
    }

    #[test]
    fn test_write_names() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("A - B.mp3");
        write_silent_mp3(&path);

        write_names(&path, "Nina Simone", "Sinnerman").unwrap();

        let track = read_track(&path).unwrap();
        assert_eq!(track.artist.as_deref(), Some("Nina Simone"));
        assert_eq!(track.title.as_deref(), Some("Sinnerman"));
    }

    #[test]
    fn test_write_names_twice_is_stable() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("A - B.mp3");
        write_silent_mp3(&path);
        let cover = Artwork::new(jpeg_bytes(7), Some("image/jpeg"), None);

        write_names(&path, "Artist", "Title").unwrap();
        embed_artwork(&path, &cover).unwrap();
        let first = read_track(&path).unwrap();
        write_names(&path, "Artist", "Title").unwrap();
        let second = read_track(&path).unwrap();

        // Frame order may differ between writes, the tag contents may not.
        assert_eq!(second.artist.as_deref(), Some("Artist"));
        assert_eq!(second.title.as_deref(), Some("Title"));
        assert_eq!(first.artist, second.artist);
        assert_eq!(first.title, second.title);
        assert_eq!(
            first.artwork.map(|a| a.data),
            second.artwork.map(|a| a.data)
        );
    }

    #[test]
    fn test_embed_artwork_replaces_cover() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("A - B.mp3");
        write_silent_mp3(&path);
        write_names(&path, "Artist", "Title").unwrap();

        let old = Artwork::new(jpeg_bytes(1), Some("image/jpeg"), None);
        let new = Artwork::new(jpeg_bytes(2), Some("image/jpeg"), None);
        embed_artwork(&path, &old).unwrap();
        embed_artwork(&path, &new).unwrap();

        let track = read_track(&path).unwrap();
        let cover = track.artwork.unwrap();
        assert_eq!(cover.data, new.data);
        assert_eq!(cover.format, ImageFormat::Jpeg);
        assert_eq!(track.artist.as_deref(), Some("Artist"));
    }

    #[test]
    fn test_read_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        assert!(read_track(&temp_dir.path().join("missing.mp3")).is_err());
    }
}
