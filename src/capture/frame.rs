//! Frame types exchanged between the streamer, capturer and converter.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Pixel dimensions of a frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameSize {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl FrameSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Returns the total number of pixels (width * height).
    #[inline]
    pub fn pixel_count(&self) -> usize {
        (self.width as usize) * (self.height as usize)
    }
}

impl fmt::Display for FrameSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Frame rate expressed as a ratio, e.g. 30000/1001.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameRate {
    pub numerator: u32,
    pub denominator: u32,
}

impl FrameRate {
    pub fn new(numerator: u32, denominator: u32) -> Self {
        Self {
            numerator,
            denominator,
        }
    }

    /// Frames per second. A zero denominator yields 0.0.
    pub fn fps(&self) -> f32 {
        if self.denominator == 0 {
            return 0.0;
        }
        self.numerator as f32 / self.denominator as f32
    }
}

impl Default for FrameRate {
    fn default() -> Self {
        Self::new(30, 1)
    }
}

/// A frame size paired with a frame rate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoMode {
    pub frame_size: FrameSize,
    pub frame_rate: FrameRate,
}

impl fmt::Display for VideoMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}fps", self.frame_size, self.frame_rate.fps())
    }
}

/// Bytes per raw sample. Only these widths can be scaled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WordWidth {
    One,
    Two,
    Four,
}

impl WordWidth {
    /// Returns the width in bytes.
    #[inline]
    pub fn bytes(self) -> usize {
        match self {
            WordWidth::One => 1,
            WordWidth::Two => 2,
            WordWidth::Four => 4,
        }
    }

    /// Maps a byte count to a word width, if supported.
    pub fn from_bytes(bytes: u8) -> Option<Self> {
        match bytes {
            1 => Some(WordWidth::One),
            2 => Some(WordWidth::Two),
            4 => Some(WordWidth::Four),
            _ => None,
        }
    }
}

/// Raw time-of-flight frame as delivered by the streamer.
///
/// Word widths are kept exactly as the hardware reported them; they are
/// only validated when the frame is converted.
#[derive(Clone, Default)]
pub struct ToFRawFrame {
    /// Frame dimensions.
    pub size: FrameSize,
    /// Monotonic sequence number.
    pub id: u64,
    /// Capture timestamp in microseconds.
    pub timestamp: u64,
    /// Phase samples, `phase_word_width` bytes each, native byte order.
    pub phase: Vec<u8>,
    /// Bytes per phase sample.
    pub phase_word_width: u8,
    /// Amplitude samples, `amplitude_word_width` bytes each, native byte order.
    pub amplitude: Vec<u8>,
    /// Bytes per amplitude sample.
    pub amplitude_word_width: u8,
}

impl ToFRawFrame {
    /// Returns the total number of pixels (width * height).
    #[inline]
    pub fn pixel_count(&self) -> usize {
        self.size.pixel_count()
    }
}

impl fmt::Debug for ToFRawFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ToFRawFrame")
            .field("size", &self.size)
            .field("id", &self.id)
            .field("timestamp", &self.timestamp)
            .field("phase_bytes", &self.phase.len())
            .field("phase_word_width", &self.phase_word_width)
            .field("amplitude_bytes", &self.amplitude.len())
            .field("amplitude_word_width", &self.amplitude_word_width)
            .finish()
    }
}

/// Raw frame of some non-ToF kind (e.g. a plain video stream).
#[derive(Clone, Default)]
pub struct VideoRawFrame {
    pub size: FrameSize,
    pub id: u64,
    pub timestamp: u64,
    pub data: Vec<u8>,
}

impl fmt::Debug for VideoRawFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VideoRawFrame")
            .field("size", &self.size)
            .field("id", &self.id)
            .field("timestamp", &self.timestamp)
            .field("data_bytes", &self.data.len())
            .finish()
    }
}

/// Any raw frame a streamer can produce.
#[derive(Debug, Clone)]
pub enum RawFrame {
    ToF(ToFRawFrame),
    Video(VideoRawFrame),
}

impl RawFrame {
    /// Short name of the variant, used in diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            RawFrame::ToF(_) => "tof",
            RawFrame::Video(_) => "video",
        }
    }

    pub fn id(&self) -> u64 {
        match self {
            RawFrame::ToF(f) => f.id,
            RawFrame::Video(f) => f.id,
        }
    }

    pub fn as_tof(&self) -> Option<&ToFRawFrame> {
        match self {
            RawFrame::ToF(f) => Some(f),
            _ => None,
        }
    }
}

/// Calibrated depth and amplitude maps.
///
/// `depth` and `amplitude` each hold `size.pixel_count()` values once the
/// frame has been produced by a successful conversion.
#[derive(Clone, Default, PartialEq)]
pub struct DepthFrame {
    pub size: FrameSize,
    pub id: u64,
    pub timestamp: u64,
    pub depth: Vec<f32>,
    pub amplitude: Vec<f32>,
}

impl DepthFrame {
    /// Returns the total number of pixels (width * height).
    #[inline]
    pub fn pixel_count(&self) -> usize {
        self.size.pixel_count()
    }

    /// Checks that both maps match the frame dimensions.
    pub fn is_valid(&self) -> bool {
        let count = self.pixel_count();
        self.depth.len() == count && self.amplitude.len() == count
    }
}

impl fmt::Debug for DepthFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DepthFrame")
            .field("size", &self.size)
            .field("id", &self.id)
            .field("timestamp", &self.timestamp)
            .field("depth_len", &self.depth.len())
            .field("amplitude_len", &self.amplitude.len())
            .finish()
    }
}
