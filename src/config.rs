use std::path::{Path, PathBuf};
use serde::{Deserialize, Serialize};

use crate::{
    animation::MotionParams,
    art::params::GenerationParams,
    error::{ConfigError, Result},
    render::DEFAULT_BEZIER_SEGMENTS,
    video::{encoder::DEFAULT_FFMPEG, VideoParams},
};

/// Main configuration for Flowline
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Parameters of newly generated artworks
    pub generation: GenerationConfig,

    /// Animation targets and motion
    pub animation: AnimationConfig,

    /// Video output settings
    pub video: VideoConfig,

    /// Rasterization settings
    pub render: RenderConfig,
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|_| ConfigError::FileNotFound { path: path.display().to_string() })?;

        let config: Config = toml::from_str(&content)
            .map_err(|_| ConfigError::ParseFailed { path: path.display().to_string() })?;
        Ok(config)
    }

    /// Save configuration to a TOML file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| ConfigError::InvalidValue {
                key: "config".to_string(),
                value: e.to_string()
            })?;

        std::fs::write(path, content)?;
        Ok(())
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        self.generation.validate()?;
        self.animation.validate()?;
        self.video.validate()?;
        self.render.validate()?;
        Ok(())
    }
}

/// Generation configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GenerationConfig {
    #[serde(flatten)]
    pub params: GenerationParams,

    /// Fixed seed; a fresh one is drawn for every artwork when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

impl GenerationConfig {
    fn validate(&self) -> Result<()> {
        self.params.validate()
    }
}

/// Fastest accepted animation speed, 50 times the reference pace
pub const MAX_SPEED: f64 = 1000.0;

/// Animation configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnimationConfig {
    /// Parameters the animation moves toward; `size` and `padding` are ignored
    pub end: GenerationParams,

    pub motion: MotionParams,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            end: GenerationParams {
                amount: 80,
                line_width: 1,
                line_width_variation: 8,
                border_width: 12,
                ..GenerationParams::default()
            },
            motion: MotionParams::default(),
        }
    }
}

impl AnimationConfig {
    fn validate(&self) -> Result<()> {
        let motion = &self.motion;
        if !(0.0..=MAX_SPEED).contains(&motion.speed) {
            return Err(ConfigError::invalid("animation.motion.speed", motion.speed).into());
        }

        if !(0.1..=10.0).contains(&motion.zoom) {
            return Err(ConfigError::invalid("animation.motion.zoom", motion.zoom).into());
        }

        if !motion.zoom_speed.is_finite() || motion.zoom_speed < 0.0 {
            return Err(ConfigError::invalid("animation.motion.zoom_speed", motion.zoom_speed).into());
        }

        Ok(())
    }
}

/// Video configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VideoConfig {
    /// Encoder settings
    #[serde(flatten)]
    pub params: VideoParams,

    /// Length of generated videos in seconds
    pub duration_seconds: f64,

    /// ffmpeg program; a bare name is looked up on the `PATH`
    pub ffmpeg: PathBuf,
}

impl Default for VideoConfig {
    fn default() -> Self {
        Self {
            params: VideoParams::default(),
            duration_seconds: 30.0,
            ffmpeg: PathBuf::from(DEFAULT_FFMPEG),
        }
    }
}

impl VideoConfig {
    fn validate(&self) -> Result<()> {
        self.params.validate()?;

        if !self.duration_seconds.is_finite() || self.duration_seconds <= 0.0 {
            return Err(ConfigError::invalid("video.duration_seconds", self.duration_seconds).into());
        }

        Ok(())
    }
}

/// Rendering configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Straight segments per curve
    pub bezier_segments: usize,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            bezier_segments: DEFAULT_BEZIER_SEGMENTS,
        }
    }
}

impl RenderConfig {
    fn validate(&self) -> Result<()> {
        if self.bezier_segments == 0 || self.bezier_segments > 1000 {
            return Err(ConfigError::invalid("render.bezier_segments", self.bezier_segments).into());
        }
        Ok(())
    }
}
