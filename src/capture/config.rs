//! Pipeline configuration.
//!
//! The device section describes the sensor the mock collaborators emulate.
//! Calibration factors are supplied externally and only range-checked here.

use super::{FrameRate, FrameSize, VideoMode, WordWidth};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Sensor description used to build the device and streamer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceConfig {
    /// Maximum supported frame width in pixels.
    pub max_width: u32,
    /// Maximum supported frame height in pixels.
    pub max_height: u32,
    /// Maximum frame rate numerator.
    pub frame_rate_numerator: u32,
    /// Maximum frame rate denominator.
    pub frame_rate_denominator: u32,
    /// Bytes per phase sample.
    pub phase_word_width: u8,
    /// Bytes per amplitude sample.
    pub amplitude_word_width: u8,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            max_width: 320,
            max_height: 240,
            frame_rate_numerator: 30,
            frame_rate_denominator: 1,
            phase_word_width: 2,
            amplitude_word_width: 2,
        }
    }
}

impl DeviceConfig {
    /// The maximum video mode this device advertises.
    pub fn maximum_video_mode(&self) -> VideoMode {
        VideoMode {
            frame_size: FrameSize::new(self.max_width, self.max_height),
            frame_rate: FrameRate::new(self.frame_rate_numerator, self.frame_rate_denominator),
        }
    }

    /// Validates the configuration parameters.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_width == 0 || self.max_height == 0 {
            return Err(ConfigError::InvalidDimensions);
        }
        if self.frame_rate_numerator == 0 || self.frame_rate_denominator == 0 {
            return Err(ConfigError::InvalidFrameRate);
        }
        if WordWidth::from_bytes(self.phase_word_width).is_none() {
            return Err(ConfigError::InvalidWordWidth(self.phase_word_width));
        }
        if WordWidth::from_bytes(self.amplitude_word_width).is_none() {
            return Err(ConfigError::InvalidWordWidth(self.amplitude_word_width));
        }
        Ok(())
    }
}

/// Externally supplied calibration factors.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalibrationConfig {
    /// Multiplier applied to raw amplitude samples.
    pub amplitude_normalizing_factor: f32,
    /// Multiplier applied to raw phase samples.
    pub depth_scaling_factor: f32,
}

impl Default for CalibrationConfig {
    fn default() -> Self {
        Self {
            amplitude_normalizing_factor: 1.0 / 4096.0,
            depth_scaling_factor: 1.0 / 4096.0,
        }
    }
}

impl CalibrationConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.amplitude_normalizing_factor.is_finite() || !self.depth_scaling_factor.is_finite()
        {
            return Err(ConfigError::InvalidCalibration);
        }
        Ok(())
    }
}

/// Configuration validation errors.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid frame dimensions")]
    InvalidDimensions,
    #[error("invalid frame rate (numerator and denominator must be non-zero)")]
    InvalidFrameRate,
    #[error("invalid word width {0} (must be 1, 2 or 4 bytes)")]
    InvalidWordWidth(u8),
    #[error("calibration factors must be finite")]
    InvalidCalibration,
    #[error("failed to read config file: {0}")]
    FileReadError(String),
    #[error("failed to parse config file: {0}")]
    ParseError(String),
}

/// Full configuration file format.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct FileConfig {
    #[serde(default)]
    pub device: DeviceConfig,
    #[serde(default)]
    pub calibration: CalibrationConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Output configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Run continuously (true) or process fixed number of frames (false).
    pub continuous: bool,
    /// Number of frames to process if not continuous.
    pub frame_count: u32,
    /// Metrics server port (0 to disable).
    pub metrics_port: u16,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            continuous: false,
            frame_count: 30,
            metrics_port: 9090,
        }
    }
}

impl FileConfig {
    /// Loads configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::FileReadError(e.to_string()))?;
        Self::from_toml(&content)
    }

    /// Parses and validates configuration from TOML text.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: FileConfig =
            toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
        config.device.validate()?;
        config.calibration.validate()?;
        Ok(config)
    }
}
