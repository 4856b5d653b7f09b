//! Raw frame capture into a reusable slot.

use super::{RawFrame, Streamer, StreamerError, ToFRawFrame};
use thiserror::Error;

/// Errors that can occur while capturing a raw frame.
#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("pipeline not ready: camera uninitialized or streamer not running")]
    NotReady,
    #[error("no raw frame has been captured")]
    NoFrame,
    #[error("expected a ToF raw frame but the streamer produced a {0} frame")]
    UnexpectedFrameType(&'static str),
    #[error(transparent)]
    Streamer(#[from] StreamerError),
}

/// Pulls raw frames from a streamer.
///
/// The capturer owns a single raw frame slot that the streamer overwrites
/// on every capture. A frame returned by [`FrameCapturer::capture`] is only
/// valid until the next call.
pub struct FrameCapturer<S> {
    streamer: S,
    slot: Option<RawFrame>,
}

impl<S: Streamer> FrameCapturer<S> {
    pub fn new(streamer: S) -> Self {
        Self {
            streamer,
            slot: None,
        }
    }

    /// Captures one ToF raw frame.
    ///
    /// Fails with [`CaptureError::NotReady`] without touching the streamer
    /// when `initialized` is false or the streamer is not running.
    pub fn capture(&mut self, initialized: bool) -> Result<&ToFRawFrame, CaptureError> {
        if !initialized || !self.streamer.is_running() {
            tracing::error!(
                initialized,
                running = self.streamer.is_running(),
                "Capture requested before the pipeline is ready"
            );
            return Err(CaptureError::NotReady);
        }

        if let Err(e) = self.streamer.capture(&mut self.slot) {
            tracing::error!(error = %e, "Streamer capture failed");
            return Err(e.into());
        }

        match self.slot.as_ref() {
            Some(RawFrame::ToF(frame)) => {
                tracing::trace!(id = frame.id, size = %frame.size, "Captured raw frame");
                Ok(frame)
            }
            Some(other) => {
                let kind = other.kind();
                tracing::error!(kind, "Streamer produced a non-ToF raw frame");
                Err(CaptureError::UnexpectedFrameType(kind))
            }
            None => {
                tracing::error!("Streamer reported success but produced no frame");
                Err(CaptureError::NoFrame)
            }
        }
    }

    /// Returns the most recently captured frame, if any.
    pub fn last_frame(&self) -> Option<&RawFrame> {
        self.slot.as_ref()
    }

    pub fn streamer(&self) -> &S {
        &self.streamer
    }

    pub fn streamer_mut(&mut self) -> &mut S {
        &mut self.streamer
    }
}
