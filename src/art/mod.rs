//! # Art Model
//!
//! The deterministic description of an artwork and how it is drawn from a seed.
//!
//! - [`color`] - RGB distance, constrained random draws, blending and hue shifts
//! - [`geometry`] - Pixel coordinates and the padded region they are clamped into
//! - [`params`] - Scalar generation parameters
//! - [`state`] - The [`ArtState`] snapshot and its persisted format
//! - [`generator`] - Seeded generation of new states
//!
//! ## Usage
//!
//! ```rust
//! use flowline::art::{GenerationParams, GeometryGenerator};
//!
//! let generator = GeometryGenerator::new(GenerationParams::default()).unwrap();
//! let generated = generator.generate(Some(42));
//! assert_eq!(generated.state, generator.generate(Some(42)).state);
//! ```

pub mod color;
pub mod generator;
pub mod geometry;
pub mod params;
pub mod seed;
pub mod state;

pub use color::{Color, ColorRole, Palette};
pub use generator::{GeneratedState, GeometryGenerator};
pub use geometry::{Bounds, Point};
pub use params::GenerationParams;
pub use state::{ArtSnapshot, ArtState, ControlPoints, LineOrigin};
