//! Classify vehicle GPS tracks and render them onto maps
pub mod cli;
pub mod config;
mod error;
pub mod gps;
pub mod render;
pub mod services;
pub mod summary;
pub mod track;

pub use error::Error;
pub use gps::{Bounds, Location};
pub use render::{RenderReport, TrackRenderer};
pub use track::{classify, classify_track, load_track, MarkerCategory, Position, TrackPoint};
