pub mod artwork;
pub mod track;

pub use artwork::{Artwork, ImageFormat};
pub use track::Track;
