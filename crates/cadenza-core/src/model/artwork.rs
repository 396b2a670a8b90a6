/// Encoding of a cover image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageFormat {
    Jpeg,
    Png,
    Gif,
    Bmp,
    Unknown,
}

impl ImageFormat {
    /// Detect format from an HTTP `Content-Type` value such as
    /// `image/jpeg; charset=binary`.
    #[must_use]
    pub fn from_content_type(content_type: &str) -> Self {
        let essence = content_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_lowercase();
        match essence.as_str() {
            "image/jpeg" | "image/jpg" => Self::Jpeg,
            "image/png" => Self::Png,
            "image/gif" => Self::Gif,
            "image/bmp" => Self::Bmp,
            _ => Self::Unknown,
        }
    }

    /// Detect format from a file extension or the last path segment of a URL.
    #[must_use]
    pub fn from_extension(ext: &str) -> Self {
        match ext.to_lowercase().as_str() {
            "jpg" | "jpeg" => Self::Jpeg,
            "png" => Self::Png,
            "gif" => Self::Gif,
            "bmp" => Self::Bmp,
            _ => Self::Unknown,
        }
    }

    /// Detect format from a URL, ignoring any query string.
    #[must_use]
    pub fn from_url(url: &str) -> Self {
        let path = url.split(['?', '#']).next().unwrap_or_default();
        path.rsplit_once('.')
            .map(|(_, ext)| Self::from_extension(ext))
            .unwrap_or(Self::Unknown)
    }

    /// Detect format from the magic bytes at the start of the image.
    #[must_use]
    pub fn sniff(data: &[u8]) -> Self {
        match data {
            [0xFF, 0xD8, 0xFF, ..] => Self::Jpeg,
            [0x89, b'P', b'N', b'G', ..] => Self::Png,
            [b'G', b'I', b'F', b'8', ..] => Self::Gif,
            [b'B', b'M', ..] => Self::Bmp,
            _ => Self::Unknown,
        }
    }

    /// The MIME type written into the picture frame, if known.
    #[must_use]
    pub const fn mime_type(self) -> Option<&'static str> {
        match self {
            Self::Jpeg => Some("image/jpeg"),
            Self::Png => Some("image/png"),
            Self::Gif => Some("image/gif"),
            Self::Bmp => Some("image/bmp"),
            Self::Unknown => None,
        }
    }
}

/// Cover art fetched for an artist and embedded into their tracks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artwork {
    pub format: ImageFormat,
    pub data: Vec<u8>,
    /// Where the image was downloaded from, when it came from a catalog.
    pub source_url: Option<String>,
}

impl Artwork {
    /// Build artwork from raw bytes, resolving the format from the declared
    /// content type first, then the URL, then the bytes themselves.
    #[must_use]
    pub fn new(data: Vec<u8>, content_type: Option<&str>, source_url: Option<String>) -> Self {
        let declared = content_type
            .map(ImageFormat::from_content_type)
            .unwrap_or(ImageFormat::Unknown);
        let format = match declared {
            ImageFormat::Unknown => match source_url.as_deref().map(ImageFormat::from_url) {
                Some(found) if found != ImageFormat::Unknown => found,
                _ => ImageFormat::sniff(&data),
            },
            known => known,
        };

        Self {
            format,
            data,
            source_url,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}
