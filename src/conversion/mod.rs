//! Raw sample to calibrated depth conversion.
//!
//! Raw ToF frames carry phase and amplitude samples as fixed-point words
//! of 1, 2 or 4 bytes. Conversion multiplies every sample by a calibration
//! factor to produce floating-point depth and amplitude maps.

mod calibration;
mod converter;
mod scaling;

pub use calibration::{CalibrationError, CalibrationProvider, StaticCalibration};
pub use converter::{ConversionError, FrameConverter, SampleField};
pub use scaling::scale_samples;
