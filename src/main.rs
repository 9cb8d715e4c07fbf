//! Camera Capture CLI
//!
//! Command-line interface for listing cameras and taking a single
//! photo through the same session and capture path a page uses.

use std::path::PathBuf;
use std::time::Duration;

use camera_capture::{
    capture::CaptureSink,
    catalog::DeviceCatalog,
    config::FileConfig,
    form::UploadStore,
    metrics::{MetricsRegistry, MetricsSnapshot},
    platform::{MediaPlatform, MockPlatform},
    session::{CameraSession, Facing, PageEvent, StartOutcome},
};
use clap::{Parser, Subcommand, ValueEnum};
use tokio::sync::watch;
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "camera-capture", version, about = "List cameras and capture photos")]
struct Cli {
    /// TOML configuration file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Camera backend.
    #[arg(long, value_enum, default_value_t = Backend::Mock, global = true)]
    backend: Backend,

    #[command(subcommand)]
    command: Command,
}

#[derive(Clone, Copy, ValueEnum)]
enum Backend {
    /// Synthetic cameras.
    Mock,
    /// Operating system cameras (needs the `camera` feature).
    Native,
}

#[derive(Subcommand)]
enum Command {
    /// List available cameras.
    List,
    /// Capture one still.
    Capture {
        /// Camera identifier from `list`.
        #[arg(long)]
        device: Option<String>,
        /// Preferred facing when no device is given (front or back).
        #[arg(long)]
        facing: Option<Facing>,
        /// Write the JPEG to this file.
        #[arg(long)]
        output: Option<PathBuf>,
        /// Print the image as a data URL.
        #[arg(long)]
        data_url: bool,
        /// Store the image in the upload directory under this name.
        #[arg(long)]
        save_as: Option<String>,
        /// Let the camera settle for this long before capturing.
        #[arg(long, default_value_t = 500)]
        warmup_ms: u64,
        /// Print Prometheus metrics when done.
        #[arg(long)]
        metrics: bool,
    },
}

fn main() {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();

    info!("Camera Capture v{}", camera_capture::VERSION);

    let config = match &cli.config {
        Some(path) => match FileConfig::from_file(path) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("Failed to load config: {}", e);
                std::process::exit(1);
            }
        },
        None => FileConfig::default(),
    };

    // Ctrl-C behaves like the page being closed
    let (unload_tx, unload_rx) = watch::channel(false);
    if let Err(e) = ctrlc::set_handler(move || {
        let _ = unload_tx.send(true);
    }) {
        warn!("Failed to install Ctrl-C handler: {}", e);
    }

    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()
    {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("Failed to start runtime: {}", e);
            std::process::exit(1);
        }
    };

    let code = match cli.backend {
        Backend::Mock => runtime.block_on(run(MockPlatform::new(), &config, cli.command, unload_rx)),
        #[cfg(feature = "camera")]
        Backend::Native => runtime.block_on(run(
            camera_capture::platform::NativePlatform::new(),
            &config,
            cli.command,
            unload_rx,
        )),
        #[cfg(not(feature = "camera"))]
        Backend::Native => {
            eprintln!("Native cameras need a build with `--features camera`");
            1
        }
    };

    std::process::exit(code);
}

async fn run<P: MediaPlatform>(
    platform: P,
    config: &FileConfig,
    command: Command,
    unload: watch::Receiver<bool>,
) -> i32 {
    match command {
        Command::List => list(&platform).await,
        Command::Capture {
            device,
            facing,
            output,
            data_url,
            save_as,
            warmup_ms,
            metrics,
        } => {
            let session = CameraSession::new(platform, config.camera.clone());
            let mut sink = CaptureSink::from_config(&config.camera);
            let request = CaptureRequest {
                device,
                facing,
                output,
                data_url,
                save_as,
                warmup: Duration::from_millis(warmup_ms),
            };
            let code = capture(&session, &mut sink, config, request, unload).await;

            if metrics {
                print_metrics(&session, &sink);
            }
            code
        }
    }
}

async fn list<P: MediaPlatform>(platform: &P) -> i32 {
    let mut catalog = DeviceCatalog::new();
    if let Err(e) = catalog.refresh(platform).await {
        eprintln!("{}", e.user_message());
    }

    println!("{}", catalog.status().prompt());
    for device in catalog.devices() {
        let facing = device
            .facing()
            .map(|f| f.to_string())
            .unwrap_or_else(|| "unknown".to_string());
        println!("  {}\t{}\t{}", device.id(), device.display_name(), facing);
    }
    0
}

struct CaptureRequest {
    device: Option<String>,
    facing: Option<Facing>,
    output: Option<PathBuf>,
    data_url: bool,
    save_as: Option<String>,
    warmup: Duration,
}

async fn capture<P: MediaPlatform>(
    session: &CameraSession<P>,
    sink: &mut CaptureSink,
    config: &FileConfig,
    request: CaptureRequest,
    mut unload: watch::Receiver<bool>,
) -> i32 {
    match session.start(request.device.as_deref(), request.facing).await {
        Ok(StartOutcome::Started(active)) => {
            info!(device = %active.device_id, facing = %active.facing, "Camera ready");
        }
        Ok(StartOutcome::Superseded) => return 1,
        Err(e) => {
            eprintln!("{}", e.user_message());
            return 1;
        }
    }

    tokio::select! {
        _ = tokio::time::sleep(request.warmup) => {}
        Ok(()) = unload.changed() => {
            info!("Interrupted before capture");
            let _ = session.handle_page_event(PageEvent::Unload).await;
            return 130;
        }
    }

    let frame = match sink.capture(session) {
        Ok(frame) => frame.clone(),
        Err(e) => {
            eprintln!("{}", e.user_message());
            session.stop();
            return 1;
        }
    };
    let _ = session.handle_page_event(PageEvent::Unload).await;

    let mut code = 0;
    if let Some(path) = &request.output {
        match std::fs::write(path, frame.bytes()) {
            Ok(()) => info!(path = %path.display(), "Wrote still"),
            Err(e) => {
                eprintln!("Failed to write {}: {}", path.display(), e);
                code = 1;
            }
        }
    }
    if let Some(name) = &request.save_as {
        match UploadStore::from_config(&config.upload).save(name, &frame.to_data_url()) {
            Ok(saved) => println!("{}", saved.url),
            Err(e) => {
                eprintln!("{}", e);
                code = 1;
            }
        }
    }
    if request.data_url {
        println!("{}", frame.to_data_url());
    }

    info!(
        "Captured {}x{} ({} bytes, mirrored: {})",
        frame.width(),
        frame.height(),
        frame.bytes().len(),
        frame.is_mirrored()
    );
    code
}

fn print_metrics<P: MediaPlatform>(session: &CameraSession<P>, sink: &CaptureSink) {
    let registry = match MetricsRegistry::new() {
        Ok(r) => r,
        Err(e) => {
            warn!("Metrics unavailable: {}", e);
            return;
        }
    };
    registry.update(&MetricsSnapshot::from_components(session, sink));
    match registry.encode() {
        Ok(text) => print!("{}", text),
        Err(e) => warn!("Failed to encode metrics: {}", e),
    }
}
