//! Streamer abstraction for raw frame capture.
//!
//! The streamer owns the hardware capture loop. This module provides the
//! trait the pipeline calls into, plus a mock implementation that
//! synthesizes ToF frames for testing.

use super::{FrameSize, RawFrame, ToFRawFrame, VideoRawFrame};
use thiserror::Error;

/// Errors reported by a streamer.
#[derive(Debug, Clone, Error)]
pub enum StreamerError {
    #[error("failed to start streaming: {0}")]
    StartFailed(String),
    #[error("failed to stop streaming: {0}")]
    StopFailed(String),
    #[error("failed to capture frame: {0}")]
    CaptureFailed(String),
    #[error("streamer is not running")]
    NotRunning,
}

/// Trait for streamer implementations.
///
/// `capture` writes into a caller-owned slot. Implementations should reuse
/// the buffers of a frame already present in the slot rather than
/// allocating a new one each time.
pub trait Streamer {
    /// Returns true while the capture loop is running.
    fn is_running(&self) -> bool;

    /// Starts the capture loop.
    fn start(&mut self) -> Result<(), StreamerError>;

    /// Stops the capture loop.
    fn stop(&mut self) -> Result<(), StreamerError>;

    /// Captures one frame into `slot`.
    fn capture(&mut self, slot: &mut Option<RawFrame>) -> Result<(), StreamerError>;
}

/// Mock streamer that generates synthetic ToF frames.
///
/// Every sample in a frame carries the same configured value, which makes
/// the converted output easy to predict. Each collaborator call can be made
/// to fail for exercising error paths.
#[derive(Debug)]
pub struct MockStreamer {
    size: FrameSize,
    phase_word_width: u8,
    amplitude_word_width: u8,
    phase_value: u32,
    amplitude_value: u32,
    running: bool,
    sequence: u64,
    capture_calls: u64,
    emit_video: bool,
    fail_start: bool,
    fail_stop: bool,
    fail_capture: bool,
}

impl MockStreamer {
    pub fn new(size: FrameSize) -> Self {
        Self {
            size,
            phase_word_width: 2,
            amplitude_word_width: 2,
            phase_value: 0,
            amplitude_value: 0,
            running: false,
            sequence: 0,
            capture_calls: 0,
            emit_video: false,
            fail_start: false,
            fail_stop: false,
            fail_capture: false,
        }
    }

    /// Sets the bytes per phase and amplitude sample.
    pub fn with_word_widths(mut self, phase: u8, amplitude: u8) -> Self {
        self.phase_word_width = phase;
        self.amplitude_word_width = amplitude;
        self
    }

    /// Sets the value written to every phase and amplitude sample.
    pub fn with_samples(mut self, phase: u32, amplitude: u32) -> Self {
        self.phase_value = phase;
        self.amplitude_value = amplitude;
        self
    }

    /// Produce non-ToF frames instead of ToF frames.
    pub fn emit_video_frames(&mut self, emit: bool) {
        self.emit_video = emit;
    }

    pub fn fail_start(&mut self, fail: bool) {
        self.fail_start = fail;
    }

    pub fn fail_stop(&mut self, fail: bool) {
        self.fail_stop = fail;
    }

    pub fn fail_capture(&mut self, fail: bool) {
        self.fail_capture = fail;
    }

    /// Changes the sample values for subsequent captures.
    pub fn set_samples(&mut self, phase: u32, amplitude: u32) {
        self.phase_value = phase;
        self.amplitude_value = amplitude;
    }

    /// Number of times `capture` reached the mock.
    pub fn capture_calls(&self) -> u64 {
        self.capture_calls
    }

    fn fill_tof(&self, frame: &mut ToFRawFrame, timestamp: u64) {
        frame.size = self.size;
        frame.id = self.sequence;
        frame.timestamp = timestamp;
        frame.phase_word_width = self.phase_word_width;
        frame.amplitude_word_width = self.amplitude_word_width;

        let count = self.size.pixel_count();
        fill_samples(&mut frame.phase, self.phase_value, self.phase_word_width, count);
        fill_samples(
            &mut frame.amplitude,
            self.amplitude_value,
            self.amplitude_word_width,
            count,
        );
    }
}

impl Streamer for MockStreamer {
    fn is_running(&self) -> bool {
        self.running
    }

    fn start(&mut self) -> Result<(), StreamerError> {
        if self.fail_start {
            return Err(StreamerError::StartFailed("injected failure".into()));
        }
        self.running = true;
        tracing::info!(size = %self.size, "MockStreamer started");
        Ok(())
    }

    fn stop(&mut self) -> Result<(), StreamerError> {
        if self.fail_stop {
            return Err(StreamerError::StopFailed("injected failure".into()));
        }
        self.running = false;
        tracing::info!("MockStreamer stopped");
        Ok(())
    }

    fn capture(&mut self, slot: &mut Option<RawFrame>) -> Result<(), StreamerError> {
        self.capture_calls += 1;

        if !self.running {
            return Err(StreamerError::NotRunning);
        }
        if self.fail_capture {
            return Err(StreamerError::CaptureFailed("injected failure".into()));
        }

        self.sequence += 1;
        let timestamp = chrono::Utc::now().timestamp_micros().max(0) as u64;

        if self.emit_video {
            *slot = Some(RawFrame::Video(VideoRawFrame {
                size: self.size,
                id: self.sequence,
                timestamp,
                data: vec![0u8; self.size.pixel_count()],
            }));
            return Ok(());
        }

        // Reuse the buffers of a previous ToF frame when there is one
        match slot {
            Some(RawFrame::ToF(frame)) => self.fill_tof(frame, timestamp),
            _ => {
                let mut frame = ToFRawFrame::default();
                self.fill_tof(&mut frame, timestamp);
                *slot = Some(RawFrame::ToF(frame));
            }
        }

        Ok(())
    }
}

/// Writes `count` copies of `value` as `width`-byte native-endian words.
///
/// Widths other than 1, 2 or 4 are zero-filled so that malformed frames can
/// still be produced.
fn fill_samples(buf: &mut Vec<u8>, value: u32, width: u8, count: usize) {
    buf.clear();
    buf.reserve(count * width as usize);
    for _ in 0..count {
        match width {
            1 => buf.push(value as u8),
            2 => buf.extend_from_slice(&(value as u16).to_ne_bytes()),
            4 => buf.extend_from_slice(&value.to_ne_bytes()),
            w => buf.extend(std::iter::repeat(0u8).take(w as usize)),
        }
    }
}
