//! ToF camera lifecycle.
//!
//! Drives the collaborators through `init`, `start` and `stop`, and exposes
//! capture and conversion once streaming.

use super::PipelineStats;
use crate::capture::{
    CaptureError, DepthFrame, FrameCapturer, RawFrame, Streamer, StreamerError, ToFRawFrame,
    VideoMode,
};
use crate::conversion::{CalibrationProvider, ConversionError, FrameConverter};
use crate::device::{HardwareError, ModeControl, StartParameters, VideoModeNegotiator};
use std::fmt;
use thiserror::Error;

/// Lifecycle state of a camera.
///
/// There is no transition back to `Uninitialized`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CameraState {
    Uninitialized,
    Initialized,
    Started,
    Stopped,
}

impl CameraState {
    #[inline]
    pub fn is_initialized(self) -> bool {
        self != CameraState::Uninitialized
    }
}

impl fmt::Display for CameraState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CameraState::Uninitialized => "uninitialized",
            CameraState::Initialized => "initialized",
            CameraState::Started => "started",
            CameraState::Stopped => "stopped",
        };
        f.write_str(name)
    }
}

/// Errors that can occur during camera operations.
#[derive(Debug, Error)]
pub enum CameraError {
    #[error("could not set maximum video mode: {0}")]
    Initialization(#[source] HardwareError),
    #[error("camera not initialized")]
    NotInitialized,
    #[error("could not read current video mode: {0}")]
    ModeQuery(#[source] HardwareError),
    #[error("could not apply start parameters: {0}")]
    StartParameter(#[source] HardwareError),
    #[error("could not start streamer: {0}")]
    StreamerStart(#[source] StreamerError),
    #[error("could not stop streamer: {0}")]
    StreamerStop(#[source] StreamerError),
    #[error("cannot {operation} a camera that is {state}")]
    InvalidTransition {
        operation: &'static str,
        state: CameraState,
    },
    #[error(transparent)]
    Capture(#[from] CaptureError),
    #[error(transparent)]
    Conversion(#[from] ConversionError),
}

/// A time-of-flight depth camera.
///
/// Owns the hardware control, the streamer (through its capturer) and the
/// converter. Calls are blocking and expected from a single thread; each
/// camera instance is independent.
pub struct ToFCamera<D, S, C> {
    device: D,
    capturer: FrameCapturer<S>,
    converter: FrameConverter<C>,
    state: CameraState,
    stats: PipelineStats,
}

impl<D, S, C> ToFCamera<D, S, C>
where
    D: ModeControl + StartParameters,
    S: Streamer,
    C: CalibrationProvider,
{
    pub fn new(device: D, streamer: S, calibration: C) -> Self {
        Self {
            device,
            capturer: FrameCapturer::new(streamer),
            converter: FrameConverter::new(calibration),
            state: CameraState::Uninitialized,
            stats: PipelineStats::default(),
        }
    }

    /// Negotiates the maximum video mode.
    ///
    /// Valid only once. On failure the camera stays uninitialized.
    pub fn init(&mut self) -> Result<VideoMode, CameraError> {
        if self.state != CameraState::Uninitialized {
            return Err(self.invalid_transition("init"));
        }

        match self.device.apply_maximum_video_mode() {
            Ok(mode) => {
                self.state = CameraState::Initialized;
                self.stats.frame_size = Some(mode.frame_size);
                tracing::info!(mode = %mode, "ToF camera initialized");
                Ok(mode)
            }
            Err(e) => {
                tracing::error!(error = %e, "Could not set maximum video mode");
                Err(CameraError::Initialization(e))
            }
        }
    }

    /// Starts streaming from the initialized or stopped state.
    ///
    /// The active frame size must be readable. An unreadable frame rate is
    /// logged and otherwise ignored, since it only feeds the start message.
    pub fn start(&mut self) -> Result<(), CameraError> {
        match self.state {
            CameraState::Uninitialized => {
                tracing::error!("Cannot start an uninitialized camera");
                return Err(CameraError::NotInitialized);
            }
            CameraState::Started => return Err(self.invalid_transition("start")),
            CameraState::Initialized | CameraState::Stopped => {}
        }

        let size = self.device.frame_size().map_err(|e| {
            tracing::error!(error = %e, "Could not get current frame size");
            CameraError::ModeQuery(e)
        })?;
        let fps = match self.device.frame_rate() {
            Ok(rate) => Some(rate.fps()),
            Err(e) => {
                tracing::warn!(error = %e, "Could not get current frame rate");
                None
            }
        };

        match fps {
            Some(fps) => tracing::info!("Starting with {}@{}fps", size, fps),
            None => tracing::info!("Starting with {}@?fps", size),
        }

        self.device.init_start_parameters().map_err(|e| {
            tracing::error!(error = %e, "Could not initialize start parameters");
            CameraError::StartParameter(e)
        })?;

        self.capturer.streamer_mut().start().map_err(|e| {
            tracing::error!(error = %e, "Could not start streamer");
            CameraError::StreamerStart(e)
        })?;

        self.state = CameraState::Started;
        self.stats.streaming = true;
        self.stats.frame_size = Some(size);
        Ok(())
    }

    /// Stops streaming. On failure the camera remains started.
    pub fn stop(&mut self) -> Result<(), CameraError> {
        match self.state {
            CameraState::Uninitialized => {
                tracing::error!("Cannot stop an uninitialized camera");
                return Err(CameraError::NotInitialized);
            }
            CameraState::Initialized | CameraState::Stopped => {
                return Err(self.invalid_transition("stop"))
            }
            CameraState::Started => {}
        }

        self.capturer.streamer_mut().stop().map_err(|e| {
            tracing::error!(error = %e, "Could not stop streamer");
            CameraError::StreamerStop(e)
        })?;

        self.state = CameraState::Stopped;
        self.stats.streaming = false;
        tracing::info!("ToF camera stopped");
        Ok(())
    }

    /// Captures one raw frame.
    ///
    /// The returned frame is overwritten by the next capture.
    pub fn capture_raw_frame(&mut self) -> Result<&ToFRawFrame, CameraError> {
        let initialized = self.state.is_initialized();
        match self.capturer.capture(initialized) {
            Ok(frame) => {
                self.stats.frames_captured += 1;
                Ok(frame)
            }
            Err(e) => {
                self.stats.capture_failures += 1;
                Err(e.into())
            }
        }
    }

    /// Converts a raw frame into the depth frame held by `slot`.
    pub fn convert<'a>(
        &mut self,
        raw: &RawFrame,
        slot: &'a mut Option<DepthFrame>,
    ) -> Result<&'a DepthFrame, CameraError> {
        let result = self.converter.convert(raw, slot);
        self.record_conversion(result.is_ok());
        result.map_err(CameraError::from)
    }

    /// Converts the most recently captured raw frame in place, without
    /// copying it out of the capture slot.
    pub fn convert_last_raw<'a>(
        &mut self,
        slot: &'a mut Option<DepthFrame>,
    ) -> Result<&'a DepthFrame, CameraError> {
        let Some(raw) = self.capturer.last_frame() else {
            tracing::error!("No raw frame captured yet");
            return Err(CaptureError::NoFrame.into());
        };

        let result = self.converter.convert(raw, slot);
        self.record_conversion(result.is_ok());
        result.map_err(CameraError::from)
    }

    /// Captures a raw frame and converts it into the depth frame held by
    /// `slot`.
    pub fn capture_depth_frame<'a>(
        &mut self,
        slot: &'a mut Option<DepthFrame>,
    ) -> Result<&'a DepthFrame, CameraError> {
        let initialized = self.state.is_initialized();
        let raw = match self.capturer.capture(initialized) {
            Ok(frame) => {
                self.stats.frames_captured += 1;
                frame
            }
            Err(e) => {
                self.stats.capture_failures += 1;
                return Err(e.into());
            }
        };

        let result = self.converter.convert_tof(raw, slot);
        self.record_conversion(result.is_ok());
        result.map_err(CameraError::from)
    }

    /// Reads back the active video mode from the hardware.
    pub fn current_video_mode(&self) -> Result<VideoMode, CameraError> {
        let (size, rate) = self.device.current_video_mode();
        Ok(VideoMode {
            frame_size: size.map_err(CameraError::ModeQuery)?,
            frame_rate: rate.map_err(CameraError::ModeQuery)?,
        })
    }

    pub fn state(&self) -> CameraState {
        self.state
    }

    pub fn is_initialized(&self) -> bool {
        self.state.is_initialized()
    }

    pub fn stats(&self) -> &PipelineStats {
        &self.stats
    }

    pub fn device(&self) -> &D {
        &self.device
    }

    pub fn device_mut(&mut self) -> &mut D {
        &mut self.device
    }

    pub fn streamer(&self) -> &S {
        self.capturer.streamer()
    }

    pub fn streamer_mut(&mut self) -> &mut S {
        self.capturer.streamer_mut()
    }

    pub fn calibration_mut(&mut self) -> &mut C {
        self.converter.calibration_mut()
    }

    fn record_conversion(&mut self, ok: bool) {
        if ok {
            self.stats.frames_converted += 1;
        } else {
            self.stats.conversion_failures += 1;
        }
    }

    fn invalid_transition(&self, operation: &'static str) -> CameraError {
        tracing::error!(operation, state = %self.state, "Invalid camera state transition");
        CameraError::InvalidTransition {
            operation,
            state: self.state,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::{FrameRate, FrameSize, MockStreamer};
    use crate::conversion::StaticCalibration;
    use crate::device::{DeviceCall, MockDevice};

    type MockCamera = ToFCamera<MockDevice, MockStreamer, StaticCalibration>;

    fn camera() -> MockCamera {
        let mode = VideoMode {
            frame_size: FrameSize::new(32, 24),
            frame_rate: FrameRate::new(30, 1),
        };
        ToFCamera::new(
            MockDevice::new(mode),
            MockStreamer::new(mode.frame_size).with_samples(1000, 200),
            StaticCalibration::new(2.0, 0.125),
        )
    }

    #[test]
    fn test_full_lifecycle() {
        let mut camera = camera();
        assert_eq!(camera.state(), CameraState::Uninitialized);

        camera.init().unwrap();
        assert_eq!(camera.state(), CameraState::Initialized);

        camera.start().unwrap();
        assert_eq!(camera.state(), CameraState::Started);
        assert!(camera.streamer().is_running());

        camera.stop().unwrap();
        assert_eq!(camera.state(), CameraState::Stopped);

        camera.start().unwrap();
        assert_eq!(camera.state(), CameraState::Started);
    }

    #[test]
    fn test_init_failures_stay_uninitialized() {
        for call in [
            DeviceCall::MaximumVideoMode,
            DeviceCall::SetFrameSize,
            DeviceCall::SetFrameRate,
        ] {
            let mut camera = camera();
            camera.device_mut().fail_on(call);

            assert!(matches!(camera.init(), Err(CameraError::Initialization(_))));
            assert_eq!(camera.state(), CameraState::Uninitialized);
        }
    }

    #[test]
    fn test_init_twice_rejected() {
        let mut camera = camera();
        camera.init().unwrap();
        assert!(matches!(
            camera.init(),
            Err(CameraError::InvalidTransition {
                operation: "init",
                ..
            })
        ));
    }

    #[test]
    fn test_start_before_init() {
        let mut camera = camera();
        assert!(matches!(camera.start(), Err(CameraError::NotInitialized)));
        assert!(!camera.streamer().is_running());
    }

    #[test]
    fn test_stop_before_init() {
        let mut camera = camera();
        assert!(matches!(camera.stop(), Err(CameraError::NotInitialized)));
    }

    #[test]
    fn test_frame_rate_readback_failure_is_not_fatal() {
        let mut camera = camera();
        camera.init().unwrap();
        camera.device_mut().fail_on(DeviceCall::FrameRate);

        camera.start().unwrap();
        assert_eq!(camera.state(), CameraState::Started);
        assert!(camera.streamer().is_running());
    }

    #[test]
    fn test_frame_size_readback_failure_aborts_start() {
        let mut camera = camera();
        camera.init().unwrap();
        camera.device_mut().fail_on(DeviceCall::FrameSize);

        assert!(matches!(camera.start(), Err(CameraError::ModeQuery(_))));
        assert_eq!(camera.state(), CameraState::Initialized);
        assert!(!camera.streamer().is_running());

        // Nothing after the failed size readback reaches the device
        let calls = camera.device().calls();
        assert_eq!(calls.last(), Some(&DeviceCall::FrameSize));
        assert_eq!(
            calls
                .iter()
                .filter(|c| **c == DeviceCall::FrameRate)
                .count(),
            0
        );
    }

    #[test]
    fn test_start_parameter_failure_aborts_start() {
        let mut camera = camera();
        camera.init().unwrap();
        camera.device_mut().fail_on(DeviceCall::InitStartParameters);

        assert!(matches!(camera.start(), Err(CameraError::StartParameter(_))));
        assert!(!camera.streamer().is_running());
    }

    #[test]
    fn test_streamer_start_failure() {
        let mut camera = camera();
        camera.init().unwrap();
        camera.streamer_mut().fail_start(true);

        assert!(matches!(camera.start(), Err(CameraError::StreamerStart(_))));
        assert_eq!(camera.state(), CameraState::Initialized);
    }

    #[test]
    fn test_streamer_stop_failure_stays_started() {
        let mut camera = camera();
        camera.init().unwrap();
        camera.start().unwrap();
        camera.streamer_mut().fail_stop(true);

        assert!(matches!(camera.stop(), Err(CameraError::StreamerStop(_))));
        assert_eq!(camera.state(), CameraState::Started);
    }

    #[test]
    fn test_capture_requires_running_streamer() {
        let mut camera = camera();
        camera.init().unwrap();

        assert!(matches!(
            camera.capture_raw_frame(),
            Err(CameraError::Capture(CaptureError::NotReady))
        ));
        assert_eq!(camera.streamer().capture_calls(), 0);
        assert_eq!(camera.stats().capture_failures, 1);
    }

    #[test]
    fn test_capture_depth_frame() {
        let mut camera = camera();
        camera.init().unwrap();
        camera.start().unwrap();

        let mut slot = None;
        let frame = camera.capture_depth_frame(&mut slot).unwrap();
        assert_eq!(frame.size, FrameSize::new(32, 24));
        assert!(frame.depth.iter().all(|&d| d == 125.0));
        assert!(frame.amplitude.iter().all(|&a| a == 400.0));

        let stats = camera.stats();
        assert_eq!(stats.frames_captured, 1);
        assert_eq!(stats.frames_converted, 1);
    }

    #[test]
    fn test_capture_then_convert() {
        let mut camera = camera();
        camera.init().unwrap();
        camera.start().unwrap();

        let id = camera.capture_raw_frame().unwrap().id;
        let mut slot = None;
        let frame = camera.convert_last_raw(&mut slot).unwrap();
        assert_eq!(frame.id, id);
        assert!(frame.depth.iter().all(|&d| d == 125.0));
    }

    #[test]
    fn test_convert_last_raw_before_capture() {
        let mut camera = camera();
        camera.init().unwrap();
        camera.start().unwrap();

        let mut slot = None;
        assert!(matches!(
            camera.convert_last_raw(&mut slot),
            Err(CameraError::Capture(CaptureError::NoFrame))
        ));
        assert!(slot.is_none());
    }

    #[test]
    fn test_convert_external_raw_frame() {
        let mut camera = camera();
        camera.init().unwrap();
        camera.start().unwrap();

        let raw = RawFrame::Video(Default::default());
        let mut slot = None;
        assert!(matches!(
            camera.convert(&raw, &mut slot),
            Err(CameraError::Conversion(ConversionError::UnsupportedFrameType("video")))
        ));
        assert_eq!(camera.stats().conversion_failures, 1);
    }

    #[test]
    fn test_missing_amplitude_factor_keeps_prior_frame() {
        let mut camera = camera();
        camera.init().unwrap();
        camera.start().unwrap();

        let mut slot = None;
        camera.capture_depth_frame(&mut slot).unwrap();
        let before = slot.clone();

        camera
            .calibration_mut()
            .set_amplitude_normalizing_factor(None);
        camera.streamer_mut().set_samples(2000, 100);

        assert!(matches!(
            camera.capture_depth_frame(&mut slot),
            Err(CameraError::Conversion(
                ConversionError::CalibrationUnavailable(_)
            ))
        ));
        assert_eq!(slot, before);
        assert_eq!(camera.stats().conversion_failures, 1);
    }

    #[test]
    fn test_current_video_mode() {
        let mut camera = camera();
        assert!(matches!(
            camera.current_video_mode(),
            Err(CameraError::ModeQuery(_))
        ));

        camera.init().unwrap();
        let mode = camera.current_video_mode().unwrap();
        assert_eq!(mode.frame_size, FrameSize::new(32, 24));
        assert_eq!(mode.frame_rate, FrameRate::new(30, 1));
    }
}
