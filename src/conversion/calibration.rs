//! Calibration scale factors.
//!
//! How the factors are derived (modulation frequency, lens model, ...) is
//! the provider's business. The converter only asks for the two
//! multipliers.

use crate::capture::CalibrationConfig;
use thiserror::Error;

/// Errors that can occur while fetching calibration factors.
#[derive(Debug, Clone, Error)]
pub enum CalibrationError {
    #[error("calibration factor unavailable: {0}")]
    Unavailable(String),
}

/// Source of the scale factors applied during conversion.
pub trait CalibrationProvider {
    /// Multiplier converting raw amplitude samples to normalized amplitude.
    fn amplitude_normalizing_factor(&self) -> Result<f32, CalibrationError>;

    /// Multiplier converting raw phase samples to depth.
    fn depth_scaling_factor(&self) -> Result<f32, CalibrationError>;
}

/// Fixed calibration factors, either of which may be missing.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct StaticCalibration {
    amplitude_normalizing_factor: Option<f32>,
    depth_scaling_factor: Option<f32>,
}

impl StaticCalibration {
    pub fn new(amplitude_normalizing_factor: f32, depth_scaling_factor: f32) -> Self {
        Self {
            amplitude_normalizing_factor: Some(amplitude_normalizing_factor),
            depth_scaling_factor: Some(depth_scaling_factor),
        }
    }

    pub fn from_config(config: &CalibrationConfig) -> Self {
        Self::new(
            config.amplitude_normalizing_factor,
            config.depth_scaling_factor,
        )
    }

    pub fn set_amplitude_normalizing_factor(&mut self, factor: Option<f32>) {
        self.amplitude_normalizing_factor = factor;
    }

    pub fn set_depth_scaling_factor(&mut self, factor: Option<f32>) {
        self.depth_scaling_factor = factor;
    }
}

impl CalibrationProvider for StaticCalibration {
    fn amplitude_normalizing_factor(&self) -> Result<f32, CalibrationError> {
        self.amplitude_normalizing_factor
            .ok_or_else(|| CalibrationError::Unavailable("amplitude normalizing factor".into()))
    }

    fn depth_scaling_factor(&self) -> Result<f32, CalibrationError> {
        self.depth_scaling_factor
            .ok_or_else(|| CalibrationError::Unavailable("depth scaling factor".into()))
    }
}
