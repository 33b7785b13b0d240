//! AquaMap CLI - Command-line interface
//!
//! Drives a full-city geodata load against an AquaMap backend and prints
//! a per-layer summary. Useful for smoke-testing a backend deployment and
//! for warming its caches.

use std::process;
use std::sync::Arc;

use clap::Parser;

use aquamap::api::{AuthContext, GeodataClient, ReqwestClient};
use aquamap::config::LoaderConfig;
use aquamap::coord::GeoBounds;
use aquamap::error::LoadError;
use aquamap::layer::{LayerGroup, VectorLayerGroup};
use aquamap::logging::{default_log_dir, default_log_file, init_logging};
use aquamap::orchestrator::{LayerGroups, MapLoader};
use aquamap::progress::TracingProgress;
use aquamap::viewport::FixedViewport;

#[derive(Parser)]
#[command(name = "aquamap")]
#[command(about = "Load municipal geodata layers from an AquaMap backend", long_about = None)]
#[command(version = aquamap::VERSION)]
struct Args {
    /// Backend base URL, e.g. https://geodata.example.com
    #[arg(long)]
    base_url: String,

    /// City identifier
    #[arg(long)]
    city: String,

    /// Bearer token for the backend
    #[arg(long, env = "AQUAMAP_TOKEN")]
    token: String,

    /// Start page for the economy layer (values above 1 resume a
    /// previous load and skip the bulk layers)
    #[arg(long, default_value = "1")]
    start_page: u32,

    /// Viewport zoom level used for the post-load tile backfill
    #[arg(long, default_value = "12")]
    zoom: u8,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    let _logging_guard = match init_logging(default_log_dir(), default_log_file()) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialize logging: {}", e);
            process::exit(1);
        }
    };

    if let Err(e) = run(args).await {
        tracing::error!("load failed: {}", e);
        process::exit(1);
    }
}

async fn run(args: Args) -> Result<(), LoadError> {
    let http = ReqwestClient::new()?;
    let client = GeodataClient::new(http, &args.base_url);
    let auth = AuthContext::new(&args.city, &args.token);

    // A whole-world viewport until the load fits it to the data
    let viewport = Arc::new(FixedViewport::new(
        args.zoom,
        GeoBounds::new(-180.0, -85.0, 180.0, 85.0),
    ));

    let network = Arc::new(VectorLayerGroup::new());
    let economy = Arc::new(VectorLayerGroup::new());
    let occurrence = Arc::new(VectorLayerGroup::new());
    let groups = LayerGroups {
        network: Arc::clone(&network) as Arc<dyn LayerGroup>,
        economy: Arc::clone(&economy) as Arc<dyn LayerGroup>,
        occurrence: Arc::clone(&occurrence) as Arc<dyn LayerGroup>,
    };

    let progress = Arc::new(TracingProgress);
    let notifier = Arc::new(TracingProgress);
    let loader = MapLoader::new(
        client,
        auth,
        viewport,
        groups,
        progress,
        notifier,
        LoaderConfig::default(),
    );

    loader.load_map_data(args.start_page).await?;

    let stats = loader.stats();
    println!("Layers loaded:");
    println!("  network:     {} objects", network.len());
    println!("  economy:     {} objects", economy.len());
    println!("  occurrence:  {} objects", occurrence.len());
    println!(
        "Pages: {}  Tiles: {}  Duplicates skipped: {}  Invalid skipped: {}",
        stats.pages_fetched, stats.tiles_fetched, stats.duplicates_skipped, stats.invalid_skipped
    );

    let (next_page, has_more) = loader.economy_position();
    if has_more {
        println!(
            "More economy data available; rerun with --start-page {}",
            next_page
        );
    }

    Ok(())
}
