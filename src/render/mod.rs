//! # Rendering
//!
//! Turns an [`ArtState`](crate::art::ArtState) into pixels.

pub mod canvas;
pub mod frame;
pub mod renderer;

pub use canvas::{Canvas, SkiaCanvas};
pub use frame::Frame;
pub use renderer::{StaticRenderer, DEFAULT_BEZIER_SEGMENTS};
