//! Raw frame capture and frame types.
//!
//! This module defines the frame model shared by the whole pipeline, the
//! [`Streamer`] collaborator that produces raw frames, and the
//! [`FrameCapturer`] that pulls them into a reusable slot.

mod capturer;
mod config;
mod frame;
mod streamer;

pub use capturer::{CaptureError, FrameCapturer};
pub use config::{CalibrationConfig, ConfigError, DeviceConfig, FileConfig, OutputConfig};
pub use frame::{
    DepthFrame, FrameRate, FrameSize, RawFrame, ToFRawFrame, VideoMode, VideoRawFrame, WordWidth,
};
pub use streamer::{MockStreamer, Streamer, StreamerError};
