//! Camera lifecycle orchestration.
//!
//! [`ToFCamera`] ties the device, streamer and converter together behind
//! an `init` → `start` ⇄ `stop` state machine.

mod lifecycle;
mod stats;

pub use lifecycle::{CameraError, CameraState, ToFCamera};
pub use stats::PipelineStats;
