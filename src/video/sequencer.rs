use std::ops::ControlFlow;

use tempfile::TempDir;
use tracing::{debug, info};

use crate::{
    animation::{EndStateDeriver, EndTargets, FrameInterpolator, Gyro},
    art::state::ArtState,
    error::{Result, VideoError},
    render::{Frame, StaticRenderer},
    video::{
        encoder::VideoEncoder,
        types::{EncodedVideo, VideoRequest},
    },
};

/// File name of the video inside the scoped temporary directory
const OUTPUT_FILE: &str = "flowline.mp4";

/// Frame dimensions are kept to multiples of this for the encoder
const MACROBLOCK: u32 = 16;

/// Progress of a running video job, reported after every encoded frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    /// Frames encoded so far
    pub frames_done: usize,
    pub total_frames: usize,
}

impl Progress {
    pub fn fraction(&self) -> f64 {
        if self.total_frames == 0 {
            1.0
        } else {
            self.frames_done as f64 / self.total_frames as f64
        }
    }
}

/// Number of frames of a video: `round(duration * fps)`
pub fn total_frames(duration_seconds: f64, fps: u32) -> usize {
    (duration_seconds * f64::from(fps)).round().max(0.0) as usize
}

/// Animation time of `frame` out of `total`, spanning `[0, 1]` inclusive
pub fn time_factor(frame: usize, total: usize) -> f64 {
    if total <= 1 {
        0.0
    } else {
        frame as f64 / (total - 1) as f64
    }
}

/// Encoded frame size for an image size: the nearest multiple of 16, at least 16
pub fn target_size(size: u32) -> u32 {
    (((size + MACROBLOCK / 2) / MACROBLOCK) * MACROBLOCK).max(MACROBLOCK)
}

/// Renders every frame of an animation and streams it to a [`VideoEncoder`]
#[derive(Debug, Clone, Copy, Default)]
pub struct VideoSequencer {
    renderer: StaticRenderer,
}

impl VideoSequencer {
    pub fn new(renderer: StaticRenderer) -> Self {
        Self { renderer }
    }

    /// Render frame `index` of `total`, resized to `size`
    pub fn render_frame(
        &self,
        state: &ArtState,
        interpolator: &FrameInterpolator,
        targets: &EndTargets,
        index: usize,
        total: usize,
        size: u32,
    ) -> Result<Frame> {
        let t = time_factor(index, total);
        let animated = interpolator.interpolate_towards(state, targets, t, Gyro::default());
        let frame = self.renderer.render(&animated.state, &animated.params)?;
        Ok(frame.resize_to(size))
    }

    /// Encode `state` as described by `request`
    ///
    /// The encoder writes into a temporary directory that is removed once the video is
    /// read back, whether encoding succeeds, fails or is cancelled. `progress` runs after
    /// every encoded frame; returning [`ControlFlow::Break`] stops the job with
    /// [`VideoError::Cancelled`].
    pub fn encode<E, F>(
        &self,
        state: &ArtState,
        request: &VideoRequest,
        encoder: &mut E,
        mut progress: F,
    ) -> Result<EncodedVideo>
    where
        E: VideoEncoder + ?Sized,
        F: FnMut(Progress) -> ControlFlow<()>,
    {
        request.validate()?;

        let total = total_frames(request.duration_seconds, request.video.fps);
        if total == 0 {
            return Err(VideoError::InvalidParameters {
                details: format!(
                    "{}s at {} fps produces no frames",
                    request.duration_seconds, request.video.fps
                ),
            }
            .into());
        }

        let size = target_size(request.start.size);
        info!("🎬 Encoding {} frames at {}x{}", total, size, size);
        info!("   Duration: {:.1}s at {} fps", request.duration_seconds, request.video.fps);
        info!("   Speed: {}, zoom: {}", request.motion.speed, request.motion.zoom);

        let temp_dir = tempfile::Builder::new().prefix("flowline").tempdir()?;
        let path = temp_dir.path().join(OUTPUT_FILE);

        encoder.open(&path, size, size, &request.video)?;
        if let Err(e) = self.write_frames(state, request, encoder, total, size, &mut progress) {
            encoder.abort();
            return Err(e);
        }
        encoder.close()?;

        let data = std::fs::read(&path)?;
        cleanup(temp_dir);

        info!("🎉 Video complete: {} frames, {} bytes", total, data.len());
        Ok(EncodedVideo {
            data,
            frame_count: total,
            frame_size: size,
            fps: request.video.fps,
        })
    }

    fn write_frames<E, F>(
        &self,
        state: &ArtState,
        request: &VideoRequest,
        encoder: &mut E,
        total: usize,
        size: u32,
        progress: &mut F,
    ) -> Result<()>
    where
        E: VideoEncoder + ?Sized,
        F: FnMut(Progress) -> ControlFlow<()>,
    {
        let interpolator = FrameInterpolator::new(request.start, request.end, request.motion);
        let targets = EndStateDeriver::new(&request.start).derive(state);

        for index in 0..total {
            let frame = self.render_frame(state, &interpolator, &targets, index, total, size)?;
            encoder.append_frame(&frame)?;
            debug!("Encoded frame {}/{}", index + 1, total);

            let report = Progress {
                frames_done: index + 1,
                total_frames: total,
            };
            if progress(report).is_break() {
                info!("Video cancelled after {} of {} frames", index + 1, total);
                return Err(VideoError::Cancelled {
                    frames_written: index + 1,
                }
                .into());
            }
        }

        Ok(())
    }
}

fn cleanup(temp_dir: TempDir) {
    let path = temp_dir.path().to_path_buf();
    if let Err(e) = temp_dir.close() {
        tracing::warn!("Failed to remove temporary directory {:?}: {}", path, e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::art::{generator::GeometryGenerator, params::GenerationParams};
    use std::path::{Path, PathBuf};

    /// Encoder double recording every call and writing a stand-in file on close
    #[derive(Default)]
    struct RecordingEncoder {
        path: Option<PathBuf>,
        dimensions: Option<(u32, u32)>,
        frames: Vec<Frame>,
        closed: bool,
        aborted: bool,
        fail_at: Option<usize>,
    }

    impl VideoEncoder for RecordingEncoder {
        fn open(&mut self, path: &Path, width: u32, height: u32, _params: &crate::video::VideoParams) -> Result<()> {
            self.path = Some(path.to_path_buf());
            self.dimensions = Some((width, height));
            Ok(())
        }

        fn append_frame(&mut self, frame: &Frame) -> Result<()> {
            if self.fail_at == Some(self.frames.len()) {
                return Err(VideoError::FrameWriteFailed {
                    frame: self.frames.len(),
                    reason: "disk full".to_string(),
                }
                .into());
            }
            self.frames.push(frame.clone());
            Ok(())
        }

        fn close(&mut self) -> Result<()> {
            self.closed = true;
            let path = self.path.as_ref().unwrap();
            std::fs::write(path, format!("{} frames", self.frames.len()))?;
            Ok(())
        }

        fn abort(&mut self) {
            self.aborted = true;
        }
    }

    fn params() -> GenerationParams {
        GenerationParams {
            size: 100,
            amount: 12,
            line_width: 2,
            line_width_variation: 2,
            padding: 5,
            border_width: 2,
        }
    }

    fn request(duration_seconds: f64) -> VideoRequest {
        let end = GenerationParams {
            amount: 6,
            line_width: 4,
            ..params()
        };
        VideoRequest::new(params(), end, duration_seconds)
    }

    fn state() -> ArtState {
        GeometryGenerator::new(params()).unwrap().generate(Some(11)).state
    }

    #[test]
    fn test_frame_plan() {
        assert_eq!(total_frames(1.0, 10), 10);
        assert_eq!(total_frames(30.0, 10), 300);
        assert_eq!(total_frames(0.25, 10), 3);
        assert_eq!(time_factor(0, 10), 0.0);
        assert_eq!(time_factor(9, 10), 1.0);
        assert_eq!(time_factor(0, 1), 0.0);
    }

    #[test]
    fn test_target_size() {
        assert_eq!(target_size(100), 96);
        assert_eq!(target_size(104), 112);
        assert_eq!(target_size(512), 512);
        assert_eq!(target_size(3), 16);
    }

    #[test]
    fn test_one_second_at_ten_fps() {
        let state = state();
        let mut encoder = RecordingEncoder::default();
        let mut reports = Vec::new();

        let video = VideoSequencer::default()
            .encode(&state, &request(1.0), &mut encoder, |p| {
                reports.push(p.frames_done);
                ControlFlow::Continue(())
            })
            .unwrap();

        assert_eq!(video.frame_count, 10);
        assert_eq!(video.frame_size, 96);
        assert_eq!(video.data, b"10 frames");
        assert_eq!(encoder.dimensions, Some((96, 96)));
        assert_eq!(encoder.frames.len(), 10);
        assert!(encoder.frames.iter().all(|f| f.width() == 96 && f.height() == 96));
        assert_eq!(reports, (1..=10).collect::<Vec<_>>());
        assert!(encoder.closed);

        // The temporary directory is gone once the video is read back.
        assert!(!encoder.path.unwrap().exists());
    }

    #[test]
    fn test_frames_arrive_in_order() {
        let state = state();
        let request = request(0.5);
        let mut encoder = RecordingEncoder::default();
        let sequencer = VideoSequencer::default();
        sequencer
            .encode(&state, &request, &mut encoder, |_| ControlFlow::Continue(()))
            .unwrap();

        let interpolator = FrameInterpolator::new(request.start, request.end, request.motion);
        let targets = EndStateDeriver::new(&request.start).derive(&state);
        for (index, frame) in encoder.frames.iter().enumerate() {
            let expected = sequencer
                .render_frame(&state, &interpolator, &targets, index, 5, 96)
                .unwrap();
            assert_eq!(*frame, expected);
        }
    }

    #[test]
    fn test_write_failure_aborts_and_cleans_up() {
        let state = state();
        let mut encoder = RecordingEncoder {
            fail_at: Some(3),
            ..RecordingEncoder::default()
        };

        let result = VideoSequencer::default().encode(&state, &request(1.0), &mut encoder, |_| {
            ControlFlow::Continue(())
        });

        assert!(matches!(
            result,
            Err(crate::FlowlineError::Video(VideoError::FrameWriteFailed { frame: 3, .. }))
        ));
        assert!(encoder.aborted);
        assert!(!encoder.closed);
        assert!(!encoder.path.unwrap().parent().unwrap().exists());
    }

    #[test]
    fn test_cancel_between_frames() {
        let state = state();
        let mut encoder = RecordingEncoder::default();

        let result = VideoSequencer::default().encode(&state, &request(1.0), &mut encoder, |p| {
            if p.frames_done == 4 {
                ControlFlow::Break(())
            } else {
                ControlFlow::Continue(())
            }
        });

        match result {
            Err(e) => {
                assert!(e.is_recoverable());
                assert!(matches!(
                    e,
                    crate::FlowlineError::Video(VideoError::Cancelled { frames_written: 4 })
                ));
            }
            Ok(_) => panic!("cancelled job produced a video"),
        }
        assert_eq!(encoder.frames.len(), 4);
        assert!(encoder.aborted);
    }

    #[test]
    fn test_zero_frames_rejected() {
        let mut encoder = RecordingEncoder::default();
        let result = VideoSequencer::default().encode(&state(), &request(0.01), &mut encoder, |_| {
            ControlFlow::Continue(())
        });
        assert!(result.is_err());
        assert!(encoder.path.is_none());
    }
}
