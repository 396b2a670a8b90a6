//! Core domain model for cadenza.
//!
//! This crate defines the transient track and artwork model and the
//! filename conventions ("Artist - Title.mp3") that the library
//! operations rely on.

#![deny(unsafe_code)]
#![warn(missing_debug_implementations)]

pub mod error;
pub mod model;
pub mod naming;

pub use error::{Error, Result};
pub use model::{Artwork, ImageFormat, Track};
pub use naming::{NameError, NamingPatterns, NamingRules, ParsedName};
