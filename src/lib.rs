//! Time-of-Flight Depth Capture Pipeline
//!
//! Negotiates a video mode with a ToF camera, pulls raw phase/amplitude
//! frames from a streamer and converts them into calibrated floating-point
//! depth and amplitude maps.
//!
//! # Architecture
//!
//! ```text
//! device (mode negotiation) ─┐
//!                            ├─ camera (init → start ⇄ stop)
//! capture (streamer → raw) ──┤
//!                            └─ conversion (raw → depth)
//! ```
//!
//! Register configuration, device discovery, the streaming transport and
//! calibration itself are collaborators behind traits: [`ModeControl`],
//! [`StartParameters`], [`Streamer`] and [`CalibrationProvider`].
//!
//! # Example
//!
//! ```no_run
//! use tof_pipeline::{
//!     capture::{DeviceConfig, MockStreamer},
//!     conversion::StaticCalibration,
//!     device::MockDevice,
//!     ToFCamera,
//! };
//!
//! let config = DeviceConfig::default();
//! let mut camera = ToFCamera::new(
//!     MockDevice::from_config(&config),
//!     MockStreamer::new(config.maximum_video_mode().frame_size).with_samples(1000, 200),
//!     StaticCalibration::new(2.0, 0.125),
//! );
//!
//! camera.init().unwrap();
//! camera.start().unwrap();
//!
//! // The slot is reused across frames to avoid reallocating
//! let mut slot = None;
//! for _ in 0..10 {
//!     let frame = camera.capture_depth_frame(&mut slot).unwrap();
//!     println!("frame {} depth[0] = {}", frame.id, frame.depth[0]);
//! }
//!
//! camera.stop().unwrap();
//! ```

#![warn(rust_2018_idioms)]
#![deny(unsafe_code)]

pub mod camera;
pub mod capture;
pub mod conversion;
pub mod device;
pub mod metrics;

// Re-export commonly used types at crate root
pub use camera::{CameraError, CameraState, PipelineStats, ToFCamera};
pub use capture::{
    DepthFrame, FileConfig, FrameRate, FrameSize, RawFrame, Streamer, ToFRawFrame, VideoMode,
};
pub use conversion::{CalibrationProvider, ConversionError, FrameConverter, StaticCalibration};
pub use device::{HardwareError, ModeControl, StartParameters, VideoModeNegotiator};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
