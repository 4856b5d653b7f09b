//! Per-camera pipeline counters.

use crate::capture::FrameSize;

/// Running totals for one camera instance.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PipelineStats {
    /// Raw frames successfully captured.
    pub frames_captured: u64,
    /// Depth frames successfully produced.
    pub frames_converted: u64,
    /// Capture attempts that failed, including not-ready rejections.
    pub capture_failures: u64,
    /// Conversion attempts that failed.
    pub conversion_failures: u64,
    /// Whether the streamer is currently running.
    pub streaming: bool,
    /// Frame size from the last init or start.
    pub frame_size: Option<FrameSize>,
}

impl PipelineStats {
    /// Fraction of conversion attempts that succeeded, if any were made.
    pub fn conversion_success_rate(&self) -> Option<f64> {
        let attempts = self.frames_converted + self.conversion_failures;
        if attempts == 0 {
            return None;
        }
        Some(self.frames_converted as f64 / attempts as f64)
    }
}
