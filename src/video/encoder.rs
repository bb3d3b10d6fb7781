use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdin, Command, Stdio};
use std::thread::JoinHandle;

use tracing::{debug, warn};

use crate::{
    error::{Result, VideoError},
    render::Frame,
    video::types::VideoParams,
};

/// Ordered sink of equally sized frames producing a video file
pub trait VideoEncoder {
    /// Start a video of `width` x `height` frames at `path`
    fn open(&mut self, path: &Path, width: u32, height: u32, params: &VideoParams) -> Result<()>;

    /// Append the next frame; frames end up in the video in call order
    fn append_frame(&mut self, frame: &Frame) -> Result<()>;

    /// Finish the container; the file at the opened path is complete afterwards
    fn close(&mut self) -> Result<()>;

    /// Abandon a video after a failure or cancellation
    fn abort(&mut self) {}
}

/// Program run when no other is configured
pub const DEFAULT_FFMPEG: &str = "ffmpeg";

/// Lines of ffmpeg's diagnostics kept in error messages
const STDERR_TAIL_LINES: usize = 8;

/// Encoder driving the system `ffmpeg` binary, streaming raw RGB frames over its stdin
///
/// ffmpeg's stderr is drained on a background thread for the whole run, so a chatty
/// encoder never blocks, and its last lines end up in every error the encoder reports.
#[derive(Debug)]
pub struct FfmpegEncoder {
    program: PathBuf,
    child: Option<Child>,
    stdin: Option<ChildStdin>,
    stderr_drain: Option<JoinHandle<std::io::Result<Vec<u8>>>>,
    width: u32,
    height: u32,
    frames_written: usize,
}

impl Default for FfmpegEncoder {
    fn default() -> Self {
        Self::with_program(DEFAULT_FFMPEG)
    }
}

impl FfmpegEncoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Encoder running `program` instead of the `ffmpeg` on the `PATH`
    pub fn with_program<P: Into<PathBuf>>(program: P) -> Self {
        Self {
            program: program.into(),
            child: None,
            stdin: None,
            stderr_drain: None,
            width: 0,
            height: 0,
            frames_written: 0,
        }
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Whether the configured program can be run
    pub fn is_available(&self) -> bool {
        Command::new(&self.program)
            .arg("-version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map(|status| status.success())
            .unwrap_or(false)
    }

    /// Map a 0-100 quality onto x264's constant rate factor (51 worst, 0 lossless)
    pub fn quality_to_crf(quality: u8) -> u8 {
        let quality = f32::from(quality.min(100));
        51 - ((quality / 100.0) * 51.0) as u8
    }

    pub fn frames_written(&self) -> usize {
        self.frames_written
    }
}

impl VideoEncoder for FfmpegEncoder {
    fn open(&mut self, path: &Path, width: u32, height: u32, params: &VideoParams) -> Result<()> {
        if self.child.is_some() {
            return Err(VideoError::EncodingFailed {
                reason: "encoder is already open".to_string(),
            }
            .into());
        }

        let mut cmd = Command::new(&self.program);
        cmd.stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .args([
                "-y",
                "-loglevel",
                "error",
                "-f",
                "rawvideo",
                "-pix_fmt",
                "rgb24",
                "-s",
                &format!("{}x{}", width, height),
                "-r",
                &params.fps.to_string(),
                "-i",
                "pipe:0",
                "-an",
                "-c:v",
                &params.codec,
                "-pix_fmt",
                "yuv420p",
                "-crf",
                &Self::quality_to_crf(params.quality).to_string(),
                "-movflags",
                "+faststart",
            ])
            .arg(path);

        debug!("Spawning ffmpeg: {:?}", cmd);
        let mut child = cmd.spawn().map_err(|e| VideoError::EncodingFailed {
            reason: format!("Failed to spawn FFmpeg process: {}", e),
        })?;

        let stdin = child.stdin.take().ok_or_else(|| VideoError::EncodingFailed {
            reason: "Failed to open FFmpeg stdin".to_string(),
        })?;
        let mut stderr = child.stderr.take().ok_or_else(|| VideoError::EncodingFailed {
            reason: "Failed to open FFmpeg stderr".to_string(),
        })?;
        let stderr_drain = std::thread::spawn(move || {
            let mut bytes = Vec::new();
            stderr.read_to_end(&mut bytes)?;
            Ok(bytes)
        });

        self.child = Some(child);
        self.stdin = Some(stdin);
        self.stderr_drain = Some(stderr_drain);
        self.width = width;
        self.height = height;
        self.frames_written = 0;
        Ok(())
    }

    fn append_frame(&mut self, frame: &Frame) -> Result<()> {
        let index = self.frames_written;
        if frame.width() != self.width || frame.height() != self.height {
            return Err(VideoError::FrameWriteFailed {
                frame: index,
                reason: format!(
                    "frame is {}x{}, expected {}x{}",
                    frame.width(),
                    frame.height(),
                    self.width,
                    self.height
                ),
            }
            .into());
        }

        let stdin = self.stdin.as_mut().ok_or_else(|| VideoError::FrameWriteFailed {
            frame: index,
            reason: "encoder is not open".to_string(),
        })?;

        if let Err(e) = stdin.write_all(frame.as_rgb_bytes()) {
            // Usually a broken pipe: ffmpeg is gone and its stderr says why.
            let stderr = self.stop();
            return Err(VideoError::FrameWriteFailed {
                frame: index,
                reason: with_stderr(e.to_string(), &stderr),
            }
            .into());
        }

        self.frames_written += 1;
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        drop(self.stdin.take());
        let mut child = self.child.take().ok_or_else(|| VideoError::EncodingFailed {
            reason: "encoder is not open".to_string(),
        })?;

        let status = child.wait();
        let stderr = self.join_stderr();
        let status = status.map_err(|e| VideoError::EncodingFailed {
            reason: with_stderr(format!("FFmpeg execution failed: {}", e), &stderr),
        })?;

        if !status.success() {
            return Err(VideoError::EncodingFailed {
                reason: with_stderr(format!("FFmpeg exited with {}", status), &stderr),
            }
            .into());
        }

        debug!("FFmpeg finished after {} frames", self.frames_written);
        Ok(())
    }

    fn abort(&mut self) {
        let stderr = self.stop();
        if !stderr.is_empty() {
            warn!("FFmpeg aborted: {}", stderr);
        }
    }
}

impl FfmpegEncoder {
    /// Kill the child if it still runs and return the tail of its stderr
    fn stop(&mut self) -> String {
        drop(self.stdin.take());
        if let Some(mut child) = self.child.take() {
            if let Err(e) = child.kill() {
                debug!("FFmpeg already stopped: {}", e);
            }
            if let Err(e) = child.wait() {
                warn!("Failed to reap FFmpeg: {}", e);
            }
        }
        self.join_stderr()
    }

    fn join_stderr(&mut self) -> String {
        match self.stderr_drain.take().map(JoinHandle::join) {
            Some(Ok(Ok(bytes))) => stderr_tail(&bytes),
            Some(Ok(Err(e))) => format!("<stderr unreadable: {}>", e),
            Some(Err(_)) => "<stderr drain thread panicked>".to_string(),
            None => String::new(),
        }
    }
}

/// Last lines of ffmpeg's diagnostics, joined on one line
fn stderr_tail(bytes: &[u8]) -> String {
    let text = String::from_utf8_lossy(bytes);
    let lines: Vec<&str> = text.lines().map(str::trim).filter(|line| !line.is_empty()).collect();
    let start = lines.len().saturating_sub(STDERR_TAIL_LINES);
    lines[start..].join(" | ")
}

fn with_stderr(reason: String, stderr: &str) -> String {
    if stderr.is_empty() {
        reason
    } else {
        format!("{} (ffmpeg: {})", reason, stderr)
    }
}

impl Drop for FfmpegEncoder {
    fn drop(&mut self) {
        self.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quality_to_crf() {
        assert_eq!(FfmpegEncoder::quality_to_crf(0), 51);
        assert_eq!(FfmpegEncoder::quality_to_crf(100), 0);
        assert_eq!(FfmpegEncoder::quality_to_crf(80), 11);
        assert_eq!(FfmpegEncoder::quality_to_crf(255), 0);
    }

    #[test]
    fn test_append_requires_open_encoder() {
        let mut encoder = FfmpegEncoder::new();
        let frame = Frame::new_filled(0, 0, [0, 0, 0]);
        assert!(encoder.append_frame(&frame).is_err());
        assert!(encoder.close().is_err());
        assert_eq!(encoder.frames_written(), 0);
    }

    #[test]
    fn test_stderr_tail_keeps_last_lines() {
        let log: String = (0..20).map(|i| format!("line {}\n\n", i)).collect();
        let tail = stderr_tail(log.as_bytes());
        assert!(tail.starts_with("line 12 |"));
        assert!(tail.ends_with("line 19"));
        assert_eq!(stderr_tail(b""), "");
    }

    #[test]
    fn test_missing_program_is_unavailable() {
        let encoder = FfmpegEncoder::with_program("/nonexistent/flowline-ffmpeg");
        assert!(!encoder.is_available());

        let mut encoder = FfmpegEncoder::with_program("/nonexistent/flowline-ffmpeg");
        let dir = tempfile::tempdir().unwrap();
        let result = encoder.open(&dir.path().join("out.mp4"), 16, 16, &VideoParams::default());
        assert!(matches!(
            result,
            Err(crate::FlowlineError::Video(VideoError::EncodingFailed { .. }))
        ));
    }

    /// `sh` rejects ffmpeg's arguments and exits, so writes hit a closed pipe
    #[cfg(unix)]
    #[test]
    fn test_early_exit_reports_stderr() {
        let dir = tempfile::tempdir().unwrap();
        let mut encoder = FfmpegEncoder::with_program("sh");
        encoder
            .open(&dir.path().join("out.mp4"), 256, 256, &VideoParams::default())
            .unwrap();

        // Each frame is larger than a pipe buffer, so a write blocks until sh is gone.
        let frame = Frame::new_filled(256, 256, [10, 20, 30]);
        let error = (0..8)
            .find_map(|_| encoder.append_frame(&frame).err())
            .expect("writes to an exited process fail");

        match error {
            crate::FlowlineError::Video(VideoError::FrameWriteFailed { frame, reason }) => {
                assert_eq!(frame, 0);
                assert!(reason.contains("(ffmpeg: "), "{}", reason);
                assert!(reason.to_lowercase().contains("option"), "{}", reason);
            }
            other => panic!("unexpected error: {}", other),
        }
        assert!(encoder.close().is_err());
    }
}
