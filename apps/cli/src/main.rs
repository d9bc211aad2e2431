use std::path::PathBuf;

use clap::Parser;
use ota_core::artifact::ArtifactSet;
use ota_core::devices::DeviceList;
use ota_core::session::{FleetSession, SessionConfig};
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(author, version, about = "Upload ESP-Miner firmware and web UI to devices over HTTP OTA", long_about = None)]
struct Args {
    /// Device address(es), hostname or IP
    #[arg(value_name = "DEVICE")]
    devices: Vec<String>,

    /// Path to text file containing one device address per line
    #[arg(long)]
    file: Option<PathBuf>,

    /// Build directory containing esp-miner.bin and www.bin (default: build)
    #[arg(long)]
    build_dir: Option<PathBuf>,

    /// Path to a TOML session config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Per-request timeout in seconds
    #[arg(long)]
    timeout_secs: Option<u64>,

    /// Wait between web-interface and firmware uploads, in milliseconds
    #[arg(long)]
    settle_delay_ms: Option<u64>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    let args = Args::parse();

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::builder()
                .with_default_directive(if args.verbose {
                    tracing::Level::DEBUG.into()
                } else {
                    tracing::Level::INFO.into()
                })
                .from_env_lossy(),
        )
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    std::process::exit(run(args));
}

/// Exit codes: 0 all devices updated, 1 input validation failure,
/// 2 at least one device failed its upload sequence.
fn run(args: Args) -> i32 {
    let mut config = match &args.config {
        Some(path) => match SessionConfig::load_from_file(path) {
            Ok(config) => config,
            Err(e) => {
                error!(path = %path.display(), "Failed to load config: {}", e);
                return 1;
            }
        },
        None => SessionConfig::default(),
    };

    // Command-line flags override config-file values.
    if let Some(build_dir) = args.build_dir {
        config.build_dir = build_dir;
    }
    if let Some(timeout) = args.timeout_secs {
        config.request_timeout_secs = timeout;
    }
    if let Some(delay) = args.settle_delay_ms {
        config.settle_delay_ms = delay;
    }

    let devices = match DeviceList::build(&args.devices, args.file.as_deref()) {
        Ok(devices) => devices,
        Err(e) => {
            error!("{}", e);
            return 1;
        }
    };

    let artifacts = match ArtifactSet::locate(&config.build_dir) {
        Ok(artifacts) => artifacts,
        Err(e) => {
            error!("{}", e);
            return 1;
        }
    };

    info!(
        devices = devices.len(),
        build_dir = %config.build_dir.display(),
        "Starting fleet OTA upload"
    );

    let session = match FleetSession::new(config) {
        Ok(session) => session,
        Err(e) => {
            error!("{}", e);
            return 1;
        }
    };

    let report = session.run(&devices, &artifacts);
    if report.all_succeeded() {
        info!("All devices updated");
    } else {
        error!(failed = report.failed_count(), "Some devices failed to update");
    }
    report.exit_code()
}
