//! # Flowline
//!
//! Procedural curved-line artwork with deterministic, time-addressable animation.
//!
//! An artwork is fully described by an [`ArtState`]: every random choice made while
//! generating it. Any frame of its animation can be computed directly from that state
//! and a time, so frames are reproducible and independent of each other.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use flowline::{
//!     animation::Gyro,
//!     config::AnimationConfig,
//!     studio::ArtStudio,
//!     GenerationParams,
//! };
//!
//! # fn main() -> flowline::Result<()> {
//! let mut studio = ArtStudio::default();
//! let art = studio.generate(GenerationParams::default(), Some(42))?;
//! std::fs::write("art.png", &art.image.data)?;
//!
//! let frame = studio.frame(art.id, &AnimationConfig::default(), 0.5, Gyro::default())?;
//! std::fs::write("frame.png", &frame.data)?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! - [`art`] - Colors, geometry, the art state and its generator
//! - [`render`] - Rasterization onto a [`Canvas`](render::Canvas)
//! - [`animation`] - End-state targets and per-frame interpolation
//! - [`video`] - Frame sequencing and encoding
//! - [`studio`] - Session registry and front-end entry points
//! - [`config`] - Configuration management

pub mod animation;
pub mod art;
pub mod config;
pub mod error;
pub mod render;
pub mod studio;
pub mod video;

// Re-export commonly used types for convenience
pub use crate::{
    animation::{FrameInterpolator, MotionParams},
    art::{ArtState, GenerationParams, GeometryGenerator},
    config::Config,
    error::{FlowlineError, Result},
    render::StaticRenderer,
    studio::ArtStudio,
};
