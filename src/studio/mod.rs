//! # Studio
//!
//! Session-level facade: a registry of artworks plus the image, frame and video
//! operations a front end calls.

pub mod artifact;
pub mod engine;
pub mod registry;

pub use artifact::{decode_data_uri, Artifact};
pub use engine::{ArtStudio, GeneratedArt};
pub use registry::{SnapshotEntry, SnapshotRegistry};
