use std::ops::ControlFlow;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::{
    animation::{FrameInterpolator, Gyro},
    art::{generator::GeometryGenerator, params::GenerationParams, state::ArtState},
    config::{AnimationConfig, Config},
    error::{ConfigError, Result},
    render::StaticRenderer,
    studio::{
        artifact::Artifact,
        registry::{SnapshotEntry, SnapshotRegistry},
    },
    video::{
        encoder::DEFAULT_FFMPEG, EncodedVideo, FfmpegEncoder, Progress, VideoEncoder, VideoParams, VideoRequest,
        VideoSequencer,
    },
};

/// A freshly generated artwork
#[derive(Debug, Clone)]
pub struct GeneratedArt {
    /// Registry id of the stored state
    pub id: u64,
    /// Seed that reproduces the artwork
    pub seed: u64,
    pub image: Artifact,
}

/// Entry point for everything a front end asks of the library
///
/// The studio keeps every artwork of a session in a [`SnapshotRegistry`] so frames and
/// videos can later be requested by id. Each operation is synchronous; video encoding is
/// the only one expected to run long.
#[derive(Debug)]
pub struct ArtStudio {
    registry: SnapshotRegistry,
    renderer: StaticRenderer,
    ffmpeg: PathBuf,
}

impl Default for ArtStudio {
    fn default() -> Self {
        Self::new(StaticRenderer::default())
    }
}

impl ArtStudio {
    pub fn new(renderer: StaticRenderer) -> Self {
        Self {
            registry: SnapshotRegistry::new(),
            renderer,
            ffmpeg: PathBuf::from(DEFAULT_FFMPEG),
        }
    }

    /// Studio rendering with the configured curve resolution and ffmpeg
    pub fn from_config(config: &Config) -> Self {
        Self::new(StaticRenderer::with_segments(config.render.bezier_segments)).with_ffmpeg(&config.video.ffmpeg)
    }

    /// Encode videos with `program` instead of the `ffmpeg` on the `PATH`
    pub fn with_ffmpeg<P: Into<PathBuf>>(mut self, program: P) -> Self {
        self.ffmpeg = program.into();
        self
    }

    pub fn ffmpeg(&self) -> &Path {
        &self.ffmpeg
    }

    pub fn registry(&self) -> &SnapshotRegistry {
        &self.registry
    }

    /// Generate, store and render a new artwork
    pub fn generate(&mut self, params: GenerationParams, seed: Option<u64>) -> Result<GeneratedArt> {
        let generated = GeometryGenerator::new(params)?.generate(seed);
        let image = Artifact::png(self.renderer.render_png(&generated.state, &params)?);

        let id = self.registry.insert(SnapshotEntry {
            state: generated.state,
            params,
            seed: Some(generated.seed),
        });
        info!("🎨 Artwork {} generated from seed {}", id, generated.seed);

        Ok(GeneratedArt {
            id,
            seed: generated.seed,
            image,
        })
    }

    /// Store a persisted snapshot made with `params`
    pub fn import(&mut self, json: &str, params: GenerationParams) -> Result<u64> {
        params.validate()?;
        let state = ArtState::from_json(json, &params)?;
        let id = self.registry.insert(SnapshotEntry {
            state,
            params,
            seed: None,
        });
        info!("📥 Snapshot imported as artwork {}", id);
        Ok(id)
    }

    /// Persisted form of a stored artwork
    pub fn export(&self, id: u64) -> Result<String> {
        self.registry.get(id)?.state.to_json_pretty()
    }

    /// Render a stored artwork as it was generated
    pub fn image(&self, id: u64) -> Result<Artifact> {
        let entry = self.registry.get(id)?;
        Ok(Artifact::png(self.renderer.render_png(&entry.state, &entry.params)?))
    }

    /// Move a stored artwork onto a new canvas size and padding, then render it
    pub fn rescale(&mut self, id: u64, size: u32, padding: u32) -> Result<Artifact> {
        let entry = self.registry.get(id)?;
        let params = GenerationParams {
            size,
            padding,
            ..entry.params
        };
        params.validate()?;

        let state = entry.state.rescale(&entry.params, &params);
        let image = Artifact::png(self.renderer.render_png(&state, &params)?);
        debug!("Artwork {} rescaled from {}px to {}px", id, entry.params.size, size);

        let seed = entry.seed;
        self.registry.replace(id, SnapshotEntry { state, params, seed })?;
        Ok(image)
    }

    /// Render one animation frame of a stored artwork at time `t`
    pub fn frame(&self, id: u64, animation: &AnimationConfig, t: f64, gyro: Gyro) -> Result<Artifact> {
        let entry = self.registry.get(id)?;
        let interpolator = FrameInterpolator::new(entry.params, animation.end, animation.motion);
        let frame = interpolator.interpolate(&entry.state, t, gyro);
        Ok(Artifact::png(self.renderer.render_png(&frame.state, &frame.params)?))
    }

    /// Encode a video of a stored artwork with the configured `ffmpeg`
    ///
    /// A missing `ffmpeg` is reported before any frame is rendered.
    pub fn video<F>(
        &self,
        id: u64,
        animation: &AnimationConfig,
        duration_seconds: f64,
        video: &VideoParams,
        progress: F,
    ) -> Result<EncodedVideo>
    where
        F: FnMut(Progress) -> ControlFlow<()>,
    {
        self.registry.get(id)?;
        let mut encoder = FfmpegEncoder::with_program(&self.ffmpeg);
        if !encoder.is_available() {
            return Err(ConfigError::MissingDependency {
                name: self.ffmpeg.display().to_string(),
            }
            .into());
        }

        self.video_with(id, animation, duration_seconds, video, &mut encoder, progress)
    }

    /// Encode a video of a stored artwork with any encoder
    pub fn video_with<E, F>(
        &self,
        id: u64,
        animation: &AnimationConfig,
        duration_seconds: f64,
        video: &VideoParams,
        encoder: &mut E,
        progress: F,
    ) -> Result<EncodedVideo>
    where
        E: VideoEncoder + ?Sized,
        F: FnMut(Progress) -> ControlFlow<()>,
    {
        let entry = self.registry.get(id)?;
        let request = VideoRequest {
            start: entry.params,
            end: animation.end,
            duration_seconds,
            motion: animation.motion,
            video: video.clone(),
        };

        info!("📹 Rendering video of artwork {}", id);
        VideoSequencer::new(self.renderer).encode(&entry.state, &request, encoder, progress)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        error::StateError,
        render::Frame,
        studio::artifact::{decode_data_uri, PNG_MIME},
        FlowlineError,
    };
    fn params() -> GenerationParams {
        GenerationParams {
            size: 64,
            amount: 8,
            line_width: 1,
            line_width_variation: 2,
            padding: 3,
            border_width: 1,
        }
    }

    fn decode(artifact: &Artifact) -> image::RgbImage {
        image::load_from_memory(&artifact.data).unwrap().to_rgb8()
    }

    #[test]
    fn test_generate_is_reproducible() {
        let mut studio = ArtStudio::default();
        let first = studio.generate(params(), Some(42)).unwrap();
        let second = studio.generate(params(), Some(42)).unwrap();

        assert_ne!(first.id, second.id);
        assert_eq!(first.seed, 42);
        assert_eq!(first.image, second.image);
        assert_eq!(first.image.mime, PNG_MIME);
        assert_eq!(studio.export(first.id).unwrap(), studio.export(second.id).unwrap());

        let (mime, data) = decode_data_uri(&first.image.to_data_uri()).unwrap();
        assert_eq!(mime, "image/png");
        assert_eq!(data, first.image.data);
    }

    #[test]
    fn test_export_import_renders_identically() {
        let mut studio = ArtStudio::default();
        let generated = studio.generate(params(), None).unwrap();
        let json = studio.export(generated.id).unwrap();

        let imported = studio.import(&json, params()).unwrap();
        assert_eq!(studio.image(imported).unwrap(), generated.image);
        assert_eq!(studio.registry().get(imported).unwrap().seed, None);
    }

    #[test]
    fn test_unknown_id() {
        let studio = ArtStudio::default();
        let err = studio.image(99).unwrap_err();
        assert!(matches!(err, FlowlineError::State(StateError::NotFound { id: 99 })));
        assert!(studio.frame(99, &AnimationConfig::default(), 0.5, Gyro::default()).is_err());
    }

    #[test]
    fn test_rescale_replaces_entry() {
        let mut studio = ArtStudio::default();
        let generated = studio.generate(params(), Some(5)).unwrap();

        let image = studio.rescale(generated.id, 128, 6).unwrap();
        assert_eq!(decode(&image).dimensions(), (128, 128));

        let entry = studio.registry().get(generated.id).unwrap();
        assert_eq!(entry.params.size, 128);
        assert_eq!(entry.params.padding, 6);
        assert!(entry.state.points().all(|p| entry.params.bounds().contains(p)));
        assert!(studio.rescale(generated.id, 4, 6).is_err());
    }

    #[test]
    fn test_frame_at_zero_matches_image() {
        let mut studio = ArtStudio::default();
        let generated = studio.generate(params(), Some(9)).unwrap();
        let animation = AnimationConfig {
            end: params(),
            ..AnimationConfig::default()
        };

        let frame = studio.frame(generated.id, &animation, 0.0, Gyro::default()).unwrap();
        let decoded = decode(&frame);
        let original = decode(&generated.image);
        assert_eq!(decoded.dimensions(), original.dimensions());
        // Colors and the border are untouched at t = 0.
        assert_eq!(decoded.get_pixel(0, 0), original.get_pixel(0, 0));
    }

    #[derive(Default)]
    struct CountingEncoder {
        path: Option<PathBuf>,
        frames: usize,
    }

    impl VideoEncoder for CountingEncoder {
        fn open(&mut self, path: &Path, _width: u32, _height: u32, _params: &VideoParams) -> Result<()> {
            self.path = Some(path.to_path_buf());
            Ok(())
        }

        fn append_frame(&mut self, _frame: &Frame) -> Result<()> {
            self.frames += 1;
            Ok(())
        }

        fn close(&mut self) -> Result<()> {
            std::fs::write(self.path.as_ref().unwrap(), b"mp4")?;
            Ok(())
        }
    }

    #[test]
    fn test_video_with_encoder() {
        let mut studio = ArtStudio::default();
        let generated = studio.generate(params(), Some(3)).unwrap();
        let mut encoder = CountingEncoder::default();

        let video = studio
            .video_with(
                generated.id,
                &AnimationConfig::default(),
                0.5,
                &VideoParams::default(),
                &mut encoder,
                |_| ControlFlow::Continue(()),
            )
            .unwrap();

        assert_eq!(encoder.frames, 5);
        assert_eq!(video.frame_count, 5);
        assert_eq!(video.frame_size, 64);
        assert_eq!(Artifact::mp4(video.data).to_data_uri(), "data:video/mp4;base64,bXA0");
    }

    #[test]
    fn test_video_without_ffmpeg() {
        let mut studio = ArtStudio::default().with_ffmpeg("/nonexistent/flowline-ffmpeg");
        let generated = studio.generate(params(), Some(3)).unwrap();
        let mut reported = 0;

        let err = studio
            .video(
                generated.id,
                &AnimationConfig::default(),
                0.5,
                &VideoParams::default(),
                |_| {
                    reported += 1;
                    ControlFlow::Continue(())
                },
            )
            .unwrap_err();

        match err {
            FlowlineError::Config(ConfigError::MissingDependency { name }) => {
                assert_eq!(name, "/nonexistent/flowline-ffmpeg");
            }
            other => panic!("unexpected error: {}", other),
        }
        // Reported before the first frame.
        assert_eq!(reported, 0);
    }

    #[test]
    fn test_studio_uses_configured_ffmpeg() {
        let mut config = Config::default();
        config.video.ffmpeg = PathBuf::from("/opt/ffmpeg/bin/ffmpeg");
        assert_eq!(ArtStudio::from_config(&config).ffmpeg(), Path::new("/opt/ffmpeg/bin/ffmpeg"));
        assert_eq!(ArtStudio::default().ffmpeg(), Path::new("ffmpeg"));
    }
}
