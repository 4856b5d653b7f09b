//! Video mode negotiation.

use super::{HardwareError, ModeControl};
use crate::capture::{FrameRate, FrameSize, VideoMode};

/// Mode negotiation on top of any [`ModeControl`] implementation.
pub trait VideoModeNegotiator: ModeControl {
    /// Queries the maximum supported mode and applies it.
    ///
    /// Frame size is applied before frame rate since hardware may derive
    /// the valid rate range from the selected size. The first failing step
    /// aborts negotiation.
    fn apply_maximum_video_mode(&mut self) -> Result<VideoMode, HardwareError> {
        let mode = self.maximum_video_mode()?;
        self.set_frame_size(mode.frame_size)?;
        self.set_frame_rate(mode.frame_rate)?;

        tracing::debug!(mode = %mode, "Applied maximum video mode");
        Ok(mode)
    }

    /// Reads back the active mode.
    ///
    /// Size and rate are read independently so a caller can tolerate a
    /// missing rate.
    fn current_video_mode(
        &self,
    ) -> (
        Result<FrameSize, HardwareError>,
        Result<FrameRate, HardwareError>,
    ) {
        (self.frame_size(), self.frame_rate())
    }
}

impl<T: ModeControl + ?Sized> VideoModeNegotiator for T {}
