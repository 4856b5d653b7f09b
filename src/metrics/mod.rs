//! Prometheus metrics for the capture pipeline.
//!
//! # Metrics Exposed
//!
//! - `tof_pipeline_streaming` - Whether the streamer is running (1/0)
//! - `tof_pipeline_frame_width` / `tof_pipeline_frame_height` - Active frame size
//! - `tof_pipeline_frames_captured_total` - Raw frames captured
//! - `tof_pipeline_frames_converted_total` - Depth frames produced
//! - `tof_pipeline_capture_failures_total` - Failed capture attempts
//! - `tof_pipeline_conversion_failures_total` - Failed conversion attempts
//!
//! The HTTP exporter is only built with the `metrics` feature.

mod collector;
#[cfg(feature = "metrics")]
mod server;

pub use collector::{MetricsError, MetricsRegistry, MetricsSnapshot};
#[cfg(feature = "metrics")]
pub use server::{MetricsServer, MetricsServerConfig, MetricsState};
