//! # Video Module
//!
//! Frame planning, ordered encoding and the `ffmpeg` backed encoder.

pub mod encoder;
pub mod sequencer;
pub mod types;

pub use encoder::{FfmpegEncoder, VideoEncoder};
pub use sequencer::{target_size, time_factor, total_frames, Progress, VideoSequencer};
pub use types::{EncodedVideo, VideoParams, VideoRequest};
