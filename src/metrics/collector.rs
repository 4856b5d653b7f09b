//! Metrics collection and registry.

use crate::camera::{PipelineStats, ToFCamera};
use prometheus::{Encoder, IntCounter, IntGauge, Registry, TextEncoder};
use thiserror::Error;

/// Errors that can occur during metrics operations.
#[derive(Debug, Error)]
pub enum MetricsError {
    #[error("prometheus error: {0}")]
    Prometheus(#[from] prometheus::Error),
}

/// A snapshot of pipeline state for metrics update.
#[derive(Debug, Clone, Default)]
pub struct MetricsSnapshot {
    /// Whether the streamer is currently running.
    pub streaming: bool,
    /// Raw frames captured.
    pub frames_captured: u64,
    /// Depth frames produced.
    pub frames_converted: u64,
    /// Failed capture attempts.
    pub capture_failures: u64,
    /// Failed conversion attempts.
    pub conversion_failures: u64,
    /// Current frame width, 0 if unknown.
    pub frame_width: u32,
    /// Current frame height, 0 if unknown.
    pub frame_height: u32,
}

/// Prometheus metrics registry for the capture pipeline.
pub struct MetricsRegistry {
    registry: Registry,

    streaming: IntGauge,
    frame_width: IntGauge,
    frame_height: IntGauge,

    frames_captured_total: IntCounter,
    frames_converted_total: IntCounter,
    capture_failures_total: IntCounter,
    conversion_failures_total: IntCounter,
}

impl MetricsRegistry {
    /// Creates a new metrics registry with all pipeline metrics registered.
    pub fn new() -> Result<Self, MetricsError> {
        let registry = Registry::new();

        let streaming = IntGauge::new(
            "tof_pipeline_streaming",
            "Whether the streamer is running (1=running, 0=stopped)",
        )?;
        let frame_width = IntGauge::new("tof_pipeline_frame_width", "Active frame width in pixels")?;
        let frame_height =
            IntGauge::new("tof_pipeline_frame_height", "Active frame height in pixels")?;

        let frames_captured_total = IntCounter::new(
            "tof_pipeline_frames_captured_total",
            "Total raw frames captured",
        )?;
        let frames_converted_total = IntCounter::new(
            "tof_pipeline_frames_converted_total",
            "Total depth frames produced",
        )?;
        let capture_failures_total = IntCounter::new(
            "tof_pipeline_capture_failures_total",
            "Total failed capture attempts",
        )?;
        let conversion_failures_total = IntCounter::new(
            "tof_pipeline_conversion_failures_total",
            "Total failed conversion attempts",
        )?;

        registry.register(Box::new(streaming.clone()))?;
        registry.register(Box::new(frame_width.clone()))?;
        registry.register(Box::new(frame_height.clone()))?;
        registry.register(Box::new(frames_captured_total.clone()))?;
        registry.register(Box::new(frames_converted_total.clone()))?;
        registry.register(Box::new(capture_failures_total.clone()))?;
        registry.register(Box::new(conversion_failures_total.clone()))?;

        Ok(Self {
            registry,
            streaming,
            frame_width,
            frame_height,
            frames_captured_total,
            frames_converted_total,
            capture_failures_total,
            conversion_failures_total,
        })
    }

    /// Updates all metrics from a snapshot of pipeline state.
    pub fn update(&self, snapshot: &MetricsSnapshot) {
        self.streaming.set(if snapshot.streaming { 1 } else { 0 });
        self.frame_width.set(snapshot.frame_width as i64);
        self.frame_height.set(snapshot.frame_height as i64);

        // Counters only move forward, so add the difference
        advance(&self.frames_captured_total, snapshot.frames_captured);
        advance(&self.frames_converted_total, snapshot.frames_converted);
        advance(&self.capture_failures_total, snapshot.capture_failures);
        advance(&self.conversion_failures_total, snapshot.conversion_failures);
    }

    /// Encodes all metrics in Prometheus text format.
    pub fn encode(&self) -> Result<String, MetricsError> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer)?;
        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }
}

fn advance(counter: &IntCounter, total: u64) {
    let current = counter.get();
    if total > current {
        counter.inc_by(total - current);
    }
}

impl MetricsSnapshot {
    /// Creates a snapshot from pipeline counters.
    pub fn from_stats(stats: &PipelineStats) -> Self {
        let (frame_width, frame_height) = stats
            .frame_size
            .map(|s| (s.width, s.height))
            .unwrap_or((0, 0));

        Self {
            streaming: stats.streaming,
            frames_captured: stats.frames_captured,
            frames_converted: stats.frames_converted,
            capture_failures: stats.capture_failures,
            conversion_failures: stats.conversion_failures,
            frame_width,
            frame_height,
        }
    }

    /// Creates a snapshot from the current state of a camera.
    pub fn from_camera<D, S, C>(camera: &ToFCamera<D, S, C>) -> Self
    where
        D: crate::device::ModeControl + crate::device::StartParameters,
        S: crate::capture::Streamer,
        C: crate::conversion::CalibrationProvider,
    {
        Self::from_stats(camera.stats())
    }
}
