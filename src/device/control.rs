//! Hardware control collaborators.
//!
//! Register-level configuration of the camera is not done here; these
//! traits are the narrow surface the pipeline needs from it.

use crate::capture::{DeviceConfig, FrameRate, FrameSize, VideoMode};
use std::cell::RefCell;
use thiserror::Error;

/// Errors reported by the camera hardware.
#[derive(Debug, Clone, Error)]
pub enum HardwareError {
    #[error("hardware query failed: {0}")]
    Query(String),
    #[error("hardware rejected configuration: {0}")]
    Config(String),
}

/// Video mode query and configuration.
pub trait ModeControl {
    /// Queries the largest frame size and rate the hardware supports.
    fn maximum_video_mode(&self) -> Result<VideoMode, HardwareError>;

    fn set_frame_size(&mut self, size: FrameSize) -> Result<(), HardwareError>;

    fn set_frame_rate(&mut self, rate: FrameRate) -> Result<(), HardwareError>;

    /// Reads back the active frame size.
    fn frame_size(&self) -> Result<FrameSize, HardwareError>;

    /// Reads back the active frame rate.
    fn frame_rate(&self) -> Result<FrameRate, HardwareError>;
}

/// Parameter writes required before streaming can begin.
pub trait StartParameters {
    fn init_start_parameters(&mut self) -> Result<(), HardwareError>;
}

/// Operations recorded by [`MockDevice`], in call order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceCall {
    MaximumVideoMode,
    SetFrameSize,
    SetFrameRate,
    FrameSize,
    FrameRate,
    InitStartParameters,
}

/// Mock device for testing.
///
/// Accepts any mode up to its advertised maximum. Each operation can be
/// made to fail independently.
#[derive(Debug)]
pub struct MockDevice {
    max_mode: VideoMode,
    frame_size: Option<FrameSize>,
    frame_rate: Option<FrameRate>,
    calls: RefCell<Vec<DeviceCall>>,
    failures: Vec<DeviceCall>,
}

impl MockDevice {
    pub fn new(max_mode: VideoMode) -> Self {
        Self {
            max_mode,
            frame_size: None,
            frame_rate: None,
            calls: RefCell::new(Vec::new()),
            failures: Vec::new(),
        }
    }

    /// Builds a device advertising the configured maximum mode.
    pub fn from_config(config: &DeviceConfig) -> Self {
        Self::new(config.maximum_video_mode())
    }

    /// Makes `call` fail from now on.
    pub fn fail_on(&mut self, call: DeviceCall) {
        if !self.failures.contains(&call) {
            self.failures.push(call);
        }
    }

    /// Calls made so far, in order.
    pub fn calls(&self) -> Vec<DeviceCall> {
        self.calls.borrow().clone()
    }

    fn record(&self, call: DeviceCall) -> Result<(), HardwareError> {
        self.calls.borrow_mut().push(call);
        if !self.failures.contains(&call) {
            return Ok(());
        }
        let message = format!("injected failure in {:?}", call);
        match call {
            DeviceCall::MaximumVideoMode | DeviceCall::FrameSize | DeviceCall::FrameRate => {
                Err(HardwareError::Query(message))
            }
            _ => Err(HardwareError::Config(message)),
        }
    }
}

impl ModeControl for MockDevice {
    fn maximum_video_mode(&self) -> Result<VideoMode, HardwareError> {
        self.record(DeviceCall::MaximumVideoMode)?;
        Ok(self.max_mode)
    }

    fn set_frame_size(&mut self, size: FrameSize) -> Result<(), HardwareError> {
        self.record(DeviceCall::SetFrameSize)?;
        let max = self.max_mode.frame_size;
        if size.width == 0 || size.height == 0 || size.width > max.width || size.height > max.height
        {
            return Err(HardwareError::Config(format!(
                "frame size {} outside supported range up to {}",
                size, max
            )));
        }
        self.frame_size = Some(size);
        Ok(())
    }

    fn set_frame_rate(&mut self, rate: FrameRate) -> Result<(), HardwareError> {
        self.record(DeviceCall::SetFrameRate)?;
        let fps = rate.fps();
        if fps <= 0.0 || fps > self.max_mode.frame_rate.fps() {
            return Err(HardwareError::Config(format!(
                "frame rate {}fps outside supported range",
                fps
            )));
        }
        self.frame_rate = Some(rate);
        Ok(())
    }

    fn frame_size(&self) -> Result<FrameSize, HardwareError> {
        self.record(DeviceCall::FrameSize)?;
        self.frame_size
            .ok_or_else(|| HardwareError::Query("frame size not configured".into()))
    }

    fn frame_rate(&self) -> Result<FrameRate, HardwareError> {
        self.record(DeviceCall::FrameRate)?;
        self.frame_rate
            .ok_or_else(|| HardwareError::Query("frame rate not configured".into()))
    }
}

impl StartParameters for MockDevice {
    fn init_start_parameters(&mut self) -> Result<(), HardwareError> {
        self.record(DeviceCall::InitStartParameters)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn device() -> MockDevice {
        MockDevice::new(VideoMode {
            frame_size: FrameSize::new(320, 240),
            frame_rate: FrameRate::new(30, 1),
        })
    }

    #[test]
    fn test_rejects_oversized_frame() {
        let mut device = device();
        assert!(matches!(
            device.set_frame_size(FrameSize::new(640, 480)),
            Err(HardwareError::Config(_))
        ));
        assert!(device.set_frame_size(FrameSize::new(160, 120)).is_ok());
        assert_eq!(device.frame_size().unwrap(), FrameSize::new(160, 120));
    }

    #[test]
    fn test_readback_before_configuration_fails() {
        let device = device();
        assert!(matches!(device.frame_size(), Err(HardwareError::Query(_))));
        assert!(matches!(device.frame_rate(), Err(HardwareError::Query(_))));
    }

    #[test]
    fn test_injected_failure_kinds() {
        let mut device = device();
        device.fail_on(DeviceCall::MaximumVideoMode);
        device.fail_on(DeviceCall::InitStartParameters);

        assert!(matches!(
            device.maximum_video_mode(),
            Err(HardwareError::Query(_))
        ));
        assert!(matches!(
            device.init_start_parameters(),
            Err(HardwareError::Config(_))
        ));
        assert_eq!(
            device.calls(),
            vec![DeviceCall::MaximumVideoMode, DeviceCall::InitStartParameters]
        );
    }
}
