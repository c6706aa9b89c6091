//! Photo Kiosk CLI
//!
//! Runs the delivery server and a demonstration capture pass using the
//! mock camera, printing the resulting download QR code to the terminal.

use clap::Parser;
use photo_kiosk::{
    capture::{FileConfig, MockCamera},
    delivery::{
        mint_link, scannable_code_text, DeliveryServer, DeliveryServerConfig, DeliveryState,
        UploadClient,
    },
    encode::StillEncoder,
    metrics::KioskMetrics,
    session::{ContactRecord, KioskSession, TickOutcome},
    store::PhotoStore,
};
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Debug, Parser)]
#[command(name = "photo-kiosk", version, about = "Walk-up photo kiosk pipeline")]
struct Args {
    /// Path to a TOML configuration file.
    #[arg(short, long)]
    config: Option<std::path::PathBuf>,

    /// Override the delivery server port.
    #[arg(long)]
    port: Option<u16>,

    /// Override the countdown length in seconds.
    #[arg(long)]
    countdown: Option<u32>,

    /// Run the delivery server only, without the demonstration capture.
    #[arg(long)]
    serve_only: bool,
}

#[tokio::main]
async fn main() {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let args = Args::parse();

    info!("Photo Kiosk v{}", photo_kiosk::VERSION);

    let mut config = match &args.config {
        Some(path) => match FileConfig::from_file(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Failed to load config: {}", e);
                std::process::exit(1);
            }
        },
        None => FileConfig::default(),
    };
    if let Some(port) = args.port {
        config.delivery.port = port;
    }
    if let Some(countdown) = args.countdown {
        config.session.countdown_start = countdown;
    }
    if let Err(e) = config.validate() {
        eprintln!("Invalid configuration: {}", e);
        std::process::exit(1);
    }

    let store = Arc::new(PhotoStore::new());
    let metrics = match KioskMetrics::new() {
        Ok(metrics) => Arc::new(metrics),
        Err(e) => {
            eprintln!("Failed to set up metrics: {}", e);
            std::process::exit(1);
        }
    };

    let server = DeliveryServer::new(
        DeliveryServerConfig::with_port(config.delivery.port),
        DeliveryState {
            store: store.clone(),
            metrics: metrics.clone(),
            public_origin: config.delivery.public_origin.clone(),
        },
    );
    let server_task = tokio::spawn(server.run());

    if !args.serve_only {
        run_demo(&config, store.clone(), metrics.clone()).await;
    }

    info!("Delivery server running; press Ctrl-C to stop");

    tokio::select! {
        result = server_task => match result {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                eprintln!("Delivery server failed: {}", e);
                std::process::exit(1);
            }
            Err(e) => {
                eprintln!("Delivery server task panicked: {}", e);
                std::process::exit(1);
            }
        },
        _ = tokio::signal::ctrl_c() => {
            info!("Shutting down");
        }
    }
}

/// One full kiosk pass with the mock camera: countdown, capture,
/// optional remote handoff, QR code on stdout.
async fn run_demo(config: &FileConfig, store: Arc<PhotoStore>, metrics: Arc<KioskMetrics>) {
    info!("This is a demonstration pass using mock camera input");

    let contact = ContactRecord {
        name: "Demo Visitor".to_string(),
        phone: "5550000000".to_string(),
        email: "demo@example.com".to_string(),
    };

    let mut session = KioskSession::new(
        MockCamera::new(),
        StillEncoder::new(&config.encoding),
        store.clone(),
        config.session.countdown_start,
        contact,
    );

    if let Err(e) = session.open_camera(&config.capture) {
        warn!("Camera unavailable: {}", e);
        return;
    }

    let count = match session.start() {
        Ok(count) => count,
        Err(e) => {
            warn!("Could not start countdown: {}", e);
            return;
        }
    };
    info!(count, "Countdown running");

    let photo_id = loop {
        tokio::time::sleep(std::time::Duration::from_secs(1)).await;
        match session.tick() {
            Ok(TickOutcome::Counting(remaining)) => info!(remaining, "Countdown"),
            Ok(TickOutcome::Captured(id)) => break id,
            Ok(TickOutcome::Quiet) => return,
            Err(e) => {
                warn!("Capture failed: {}", e);
                return;
            }
        }
    };

    metrics.record_capture();
    metrics.set_held(store.len());

    // Remote handoff is independent of local storage: failure keeps the
    // photo on the kiosk, only the remote link stays dead.
    if let Some(upload_url) = &config.delivery.upload_url {
        if let Some(bytes) = store.get(photo_id) {
            let client = UploadClient::new(upload_url.clone());
            match client.upload(photo_id, &bytes).await {
                Ok(url) => info!(%url, "Remote handoff complete"),
                Err(e) => {
                    metrics.record_upload_failure();
                    warn!("Upload failed, photo kept locally: {}", e);
                }
            }
        }
    }

    let url = mint_link(&config.delivery.public_origin, photo_id);
    match scannable_code_text(&url) {
        Ok(code) => {
            println!("{}", code);
            println!("Scan to download (single use): {}", url);
        }
        Err(e) => warn!("Could not render QR code: {}", e),
    }

    if let Err(e) = session.finish() {
        warn!("Could not finish session: {}", e);
    }
}
