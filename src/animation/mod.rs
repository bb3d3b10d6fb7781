//! # Animation
//!
//! Deterministic, time-addressable animation of an [`ArtState`](crate::art::ArtState).
//!
//! [`EndStateDeriver`] computes where colors and points move to; [`FrameInterpolator`]
//! turns a source state and a time into the state of that frame.

pub mod end_state;
pub mod interpolator;

pub use end_state::{EndStateDeriver, EndTargets, PALETTE_CYCLE};
pub use interpolator::{AnimatedFrame, FrameInterpolator, Gyro, MotionParams, BASELINE_SPEED};
