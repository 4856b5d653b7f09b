//! Raw ToF frame to depth frame conversion.

use super::{scale_samples, CalibrationError, CalibrationProvider};
use crate::capture::{DepthFrame, RawFrame, ToFRawFrame, WordWidth};
use std::fmt;
use thiserror::Error;

/// Which sample buffer of a raw frame an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleField {
    Phase,
    Amplitude,
}

impl fmt::Display for SampleField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SampleField::Phase => f.write_str("phase"),
            SampleField::Amplitude => f.write_str("amplitude"),
        }
    }
}

/// Errors that can occur during conversion.
#[derive(Debug, Clone, Error)]
pub enum ConversionError {
    #[error("cannot convert a {0} raw frame to a depth frame")]
    UnsupportedFrameType(&'static str),
    #[error(transparent)]
    CalibrationUnavailable(#[from] CalibrationError),
    #[error("unsupported {field} word width: {width} bytes")]
    UnsupportedWordWidth { field: SampleField, width: u8 },
    #[error("{field} buffer too short: expected {expected} bytes, got {actual}")]
    TruncatedBuffer {
        field: SampleField,
        expected: usize,
        actual: usize,
    },
}

/// Converts raw ToF frames into calibrated depth frames.
///
/// Output is computed into scratch buffers owned by the converter and
/// swapped into the caller's frame only once both maps are complete, so a
/// failed conversion never modifies the caller's frame. After the first
/// successful conversion the swapped-out buffers become the next scratch
/// space, so steady-state conversion does not allocate.
pub struct FrameConverter<C> {
    calibration: C,
    scratch_depth: Vec<f32>,
    scratch_amplitude: Vec<f32>,
}

impl<C: CalibrationProvider> FrameConverter<C> {
    pub fn new(calibration: C) -> Self {
        Self {
            calibration,
            scratch_depth: Vec::new(),
            scratch_amplitude: Vec::new(),
        }
    }

    /// Converts `raw` into the frame held by `slot`.
    ///
    /// A new [`DepthFrame`] is created if `slot` is empty. Only the ToF
    /// variant can be converted.
    pub fn convert<'a>(
        &mut self,
        raw: &RawFrame,
        slot: &'a mut Option<DepthFrame>,
    ) -> Result<&'a DepthFrame, ConversionError> {
        match raw {
            RawFrame::ToF(frame) => self.convert_tof(frame, slot),
            other => {
                let kind = other.kind();
                tracing::error!(kind, "Expected a ToF raw frame for depth conversion");
                Err(ConversionError::UnsupportedFrameType(kind))
            }
        }
    }

    /// Converts an already narrowed ToF frame into the frame held by `slot`.
    pub fn convert_tof<'a>(
        &mut self,
        raw: &ToFRawFrame,
        slot: &'a mut Option<DepthFrame>,
    ) -> Result<&'a DepthFrame, ConversionError> {
        let amplitude_factor = self
            .calibration
            .amplitude_normalizing_factor()
            .map_err(|e| {
                tracing::error!(error = %e, "Could not get amplitude normalizing factor");
                ConversionError::from(e)
            })?;
        let depth_factor = self.calibration.depth_scaling_factor().map_err(|e| {
            tracing::error!(error = %e, "Could not get depth scaling factor");
            ConversionError::from(e)
        })?;

        let count = raw.pixel_count();
        let phase_width = checked_width(SampleField::Phase, raw.phase_word_width)?;
        let amplitude_width = checked_width(SampleField::Amplitude, raw.amplitude_word_width)?;
        check_length(SampleField::Phase, &raw.phase, phase_width, count)?;
        check_length(SampleField::Amplitude, &raw.amplitude, amplitude_width, count)?;

        self.scratch_depth.resize(count, 0.0);
        self.scratch_amplitude.resize(count, 0.0);
        scale_samples(&mut self.scratch_depth, &raw.phase, phase_width, depth_factor);
        scale_samples(
            &mut self.scratch_amplitude,
            &raw.amplitude,
            amplitude_width,
            amplitude_factor,
        );

        let frame = slot.get_or_insert_with(DepthFrame::default);
        frame.size = raw.size;
        frame.id = raw.id;
        frame.timestamp = raw.timestamp;
        std::mem::swap(&mut frame.depth, &mut self.scratch_depth);
        std::mem::swap(&mut frame.amplitude, &mut self.scratch_amplitude);

        tracing::trace!(id = frame.id, pixels = count, "Converted depth frame");
        Ok(frame)
    }

    pub fn calibration_mut(&mut self) -> &mut C {
        &mut self.calibration
    }
}

fn checked_width(field: SampleField, width: u8) -> Result<WordWidth, ConversionError> {
    WordWidth::from_bytes(width).ok_or_else(|| {
        tracing::error!(
            %field,
            width,
            "Don't know how to convert ToF frame data with this word width"
        );
        ConversionError::UnsupportedWordWidth { field, width }
    })
}

fn check_length(
    field: SampleField,
    buffer: &[u8],
    width: WordWidth,
    count: usize,
) -> Result<(), ConversionError> {
    let expected = count * width.bytes();
    if buffer.len() < expected {
        tracing::error!(
            %field,
            expected,
            actual = buffer.len(),
            "Raw sample buffer shorter than frame dimensions"
        );
        return Err(ConversionError::TruncatedBuffer {
            field,
            expected,
            actual: buffer.len(),
        });
    }
    Ok(())
}
