//! Camera hardware control.
//!
//! Traits for the hardware collaborators the pipeline depends on, a mock
//! device, and video mode negotiation built on top of them.

mod control;
mod negotiator;

pub use control::{DeviceCall, HardwareError, MockDevice, ModeControl, StartParameters};
pub use negotiator::VideoModeNegotiator;
