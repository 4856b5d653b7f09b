//! ToF Pipeline CLI
//!
//! Drives the capture-and-convert pipeline against mock hardware and logs
//! per-frame depth statistics.

use clap::Parser;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tof_pipeline::{
    capture::{FileConfig, MockStreamer},
    conversion::StaticCalibration,
    device::MockDevice,
    metrics::{MetricsRegistry, MetricsSnapshot},
    DepthFrame, ToFCamera,
};
use tracing::{info, warn};

#[derive(Debug, Parser)]
#[command(name = "tof-pipeline", version, about = "ToF depth capture pipeline demo")]
struct Args {
    /// TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Number of frames to capture (overrides config).
    #[arg(short, long)]
    frames: Option<u32>,

    /// Capture until interrupted.
    #[arg(long)]
    continuous: bool,

    /// Metrics server port, 0 to disable (requires the `metrics` feature).
    #[arg(long)]
    metrics_port: Option<u16>,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => match FileConfig::from_file(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Failed to load config {}: {}", path.display(), e);
                std::process::exit(1);
            }
        },
        None => FileConfig::default(),
    };
    if let Some(frames) = args.frames {
        config.output.frame_count = frames;
    }
    if args.continuous {
        config.output.continuous = true;
    }
    if let Some(port) = args.metrics_port {
        config.output.metrics_port = port;
    }

    info!("ToF Pipeline v{}", tof_pipeline::VERSION);
    info!("This is a demonstration using mock camera hardware");

    let device = &config.device;
    let size = device.maximum_video_mode().frame_size;
    let streamer = MockStreamer::new(size)
        .with_word_widths(device.phase_word_width, device.amplitude_word_width)
        .with_samples(1000, 200);
    let mut camera = ToFCamera::new(
        MockDevice::from_config(device),
        streamer,
        StaticCalibration::from_config(&config.calibration),
    );

    let registry = match MetricsRegistry::new() {
        Ok(registry) => registry,
        Err(e) => {
            eprintln!("Failed to create metrics registry: {}", e);
            std::process::exit(1);
        }
    };
    let publish = metrics_publisher(registry, config.output.metrics_port);

    if let Err(e) = camera.init() {
        eprintln!("Failed to initialize camera: {}", e);
        std::process::exit(1);
    }
    if let Err(e) = camera.start() {
        eprintln!("Failed to start camera: {}", e);
        std::process::exit(1);
    }

    let running = Arc::new(AtomicBool::new(true));
    {
        let running = Arc::clone(&running);
        if let Err(e) = ctrlc::set_handler(move || running.store(false, Ordering::SeqCst)) {
            warn!("Could not install Ctrl-C handler: {}", e);
        }
    }

    info!("Capturing frames...");

    let mut slot: Option<DepthFrame> = None;
    let mut captured = 0u32;
    while running.load(Ordering::SeqCst)
        && (config.output.continuous || captured < config.output.frame_count)
    {
        // Vary the synthetic scene so successive frames differ
        let phase = 500 + (captured % 64) * 16;
        camera.streamer_mut().set_samples(phase, 200);

        match camera.capture_depth_frame(&mut slot) {
            Ok(frame) => {
                let (depth, amplitude) = means(frame);
                info!(
                    id = frame.id,
                    mean_depth = depth,
                    mean_amplitude = amplitude,
                    "Depth frame"
                );
            }
            Err(e) => warn!("Frame {} failed: {}", captured, e),
        }
        captured += 1;

        publish(MetricsSnapshot::from_camera(&camera));
    }

    if let Err(e) = camera.stop() {
        warn!("Failed to stop camera: {}", e);
    }
    publish(MetricsSnapshot::from_camera(&camera));

    let stats = camera.stats();
    info!(
        "Processed {} frames: {} converted, {} capture failures, {} conversion failures",
        captured, stats.frames_converted, stats.capture_failures, stats.conversion_failures
    );
}

fn means(frame: &DepthFrame) -> (f32, f32) {
    let count = frame.pixel_count().max(1) as f32;
    let depth = frame.depth.iter().sum::<f32>() / count;
    let amplitude = frame.amplitude.iter().sum::<f32>() / count;
    (depth, amplitude)
}

/// Returns a callback that pushes snapshots to the metrics server.
#[cfg(feature = "metrics")]
fn metrics_publisher(registry: MetricsRegistry, port: u16) -> Box<dyn Fn(MetricsSnapshot)> {
    use tof_pipeline::metrics::{MetricsServer, MetricsServerConfig};

    if port == 0 {
        return Box::new(move |snapshot| registry.update(&snapshot));
    }

    let server = MetricsServer::new(MetricsServerConfig::with_port(port), registry);
    let state = server.state();

    std::thread::spawn(move || {
        let runtime = match tokio::runtime::Runtime::new() {
            Ok(runtime) => runtime,
            Err(e) => {
                warn!("Could not start metrics runtime: {}", e);
                return;
            }
        };
        if let Err(e) = runtime.block_on(server.run()) {
            warn!("Metrics server stopped: {}", e);
        }
    });

    Box::new(move |snapshot| state.blocking_write().update(snapshot))
}

/// Returns a callback that records snapshots in the local registry.
#[cfg(not(feature = "metrics"))]
fn metrics_publisher(registry: MetricsRegistry, port: u16) -> Box<dyn Fn(MetricsSnapshot)> {
    if port != 0 {
        tracing::debug!(port, "Metrics server disabled; build with --features metrics");
    }
    Box::new(move |snapshot| registry.update(&snapshot))
}
