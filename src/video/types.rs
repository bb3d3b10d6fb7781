use serde::{Deserialize, Serialize};

use crate::{
    animation::MotionParams,
    art::params::GenerationParams,
    error::{Result, VideoError},
};

/// Encoder settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VideoParams {
    /// Output frame rate
    pub fps: u32,

    /// Video codec passed to the encoder
    pub codec: String,

    /// Quality setting (0-100, higher is better)
    pub quality: u8,
}

impl Default for VideoParams {
    fn default() -> Self {
        Self {
            fps: 10,
            codec: "libx264".to_string(),
            quality: 80,
        }
    }
}

impl VideoParams {
    pub fn validate(&self) -> Result<()> {
        if self.fps == 0 {
            return Err(VideoError::InvalidParameters {
                details: "fps must be greater than 0".to_string(),
            }
            .into());
        }

        if self.codec.trim().is_empty() {
            return Err(VideoError::InvalidParameters {
                details: "codec must not be empty".to_string(),
            }
            .into());
        }

        if self.quality > 100 {
            return Err(VideoError::InvalidParameters {
                details: format!("quality must be 0-100, got {}", self.quality),
            }
            .into());
        }

        Ok(())
    }
}

/// Everything needed to turn one art state into a video
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoRequest {
    /// Parameters of the source state; `size` and `padding` hold for every frame
    pub start: GenerationParams,

    /// Parameters the animation moves toward
    pub end: GenerationParams,

    pub duration_seconds: f64,

    pub motion: MotionParams,

    pub video: VideoParams,
}

impl VideoRequest {
    /// Request with default motion and encoder settings
    pub fn new(start: GenerationParams, end: GenerationParams, duration_seconds: f64) -> Self {
        Self {
            start,
            end,
            duration_seconds,
            motion: MotionParams::default(),
            video: VideoParams::default(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        self.start.validate()?;
        self.video.validate()?;

        if !self.duration_seconds.is_finite() || self.duration_seconds <= 0.0 {
            return Err(VideoError::InvalidParameters {
                details: format!("duration must be positive, got {}", self.duration_seconds),
            }
            .into());
        }

        if !self.motion.speed.is_finite() || !self.motion.zoom.is_finite() || self.motion.zoom <= 0.0 {
            return Err(VideoError::InvalidParameters {
                details: format!("invalid motion settings: {:?}", self.motion),
            }
            .into());
        }

        Ok(())
    }
}

/// An encoded video held in memory
#[derive(Debug, Clone)]
pub struct EncodedVideo {
    pub data: Vec<u8>,
    pub frame_count: usize,
    /// Width and height of every frame
    pub frame_size: u32,
    pub fps: u32,
}

impl EncodedVideo {
    pub fn duration(&self) -> f64 {
        self.frame_count as f64 / f64::from(self.fps)
    }

    pub fn file_size(&self) -> usize {
        self.data.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_params_are_valid() {
        assert!(VideoParams::default().validate().is_ok());
        let request = VideoRequest::new(GenerationParams::default(), GenerationParams::default(), 2.0);
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_invalid_requests() {
        let params = VideoParams { fps: 0, ..VideoParams::default() };
        assert!(params.validate().is_err());

        let params = VideoParams { quality: 101, ..VideoParams::default() };
        assert!(params.validate().is_err());

        let mut request = VideoRequest::new(GenerationParams::default(), GenerationParams::default(), 0.0);
        assert!(request.validate().is_err());

        request.duration_seconds = 1.0;
        request.motion.zoom = 0.0;
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_encoded_video_duration() {
        let video = EncodedVideo {
            data: vec![0; 4],
            frame_count: 25,
            frame_size: 64,
            fps: 10,
        };
        assert_eq!(video.duration(), 2.5);
        assert_eq!(video.file_size(), 4);
    }
}
