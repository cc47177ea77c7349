//! Headless FishIT Player: seeds the object store from a fixture, runs the
//! home view model and prints the resulting rows.
#![allow(missing_docs)]

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, anyhow};
use clap::Parser;
use env_logger::{Builder, Target};
use fishit_config::{ConfigSource, PlayerConfig};
use fishit_core::home::{HomeMediaItem, ObjectStoreHomeRepository};
use fishit_core::logging::{LogBuffer, LogBufferLogger};
use fishit_core::store::StoreFixture;
use fishit_core::{HomeState, HomeViewModel, ObjectStore};
use log::LevelFilter;

#[derive(Parser, Debug)]
#[command(name = "fishit-player", about = "FishIT Player home screen")]
struct Args {
    /// Config file (TOML or JSON); overrides FISHIT_CONFIG_PATH discovery
    #[arg(long)]
    config: Option<PathBuf>,
    /// Store snapshot with `media` and `resume_marks` arrays
    #[arg(long)]
    fixture: Option<PathBuf>,
    /// Print the redacted in-memory log after the rows
    #[arg(long)]
    logs: bool,
    /// Seconds to wait for every home row to load
    #[arg(long, default_value_t = 5)]
    timeout_secs: u64,
}

fn console_logger() -> env_logger::Logger {
    let mut builder = Builder::new();
    builder.target(Target::Stderr);
    if std::env::var("RUST_LOG").is_ok() {
        builder.parse_default_env();
    } else {
        builder
            .filter_level(LevelFilter::Warn)
            .filter_module("fishit_player", LevelFilter::Info);
    }
    builder.build()
}

/// Install the buffer and console loggers. Runs before validation so its
/// warnings are visible; an unknown level falls back to debug until
/// validation rejects it.
fn init_logging(config: &PlayerConfig) -> anyhow::Result<Arc<LogBuffer>> {
    let buffer = Arc::new(LogBuffer::new(config.log_buffer.capacity));
    let level = config
        .log_buffer
        .level_filter()
        .unwrap_or(LevelFilter::Debug);
    let console = console_logger();
    let console_level = console.filter();

    LogBufferLogger::new(Arc::clone(&buffer), level)
        .with_inner(Box::new(console), console_level)
        .install()
        .context("failed to install logger")?;
    Ok(buffer)
}

fn load_config(args: &Args) -> anyhow::Result<(PlayerConfig, ConfigSource)> {
    Ok(match &args.config {
        Some(path) => (
            PlayerConfig::load_from_file(path)?,
            ConfigSource::File(path.clone()),
        ),
        None => PlayerConfig::load_from_env()?,
    })
}

fn validate_config(
    config: &PlayerConfig,
    source: &ConfigSource,
) -> anyhow::Result<()> {
    config.validate().map_err(|errors| {
        let reasons: Vec<String> =
            errors.iter().map(ToString::to_string).collect();
        anyhow!("invalid config from {source}: {}", reasons.join("; "))
    })
}

fn load_store(fixture: Option<&PathBuf>) -> anyhow::Result<Arc<ObjectStore>> {
    let store = Arc::new(ObjectStore::new());
    if let Some(path) = fixture {
        let raw = fs::read_to_string(path).with_context(|| {
            format!("failed to read fixture {}", path.display())
        })?;
        let fixture = StoreFixture::from_json(&raw)
            .with_context(|| format!("invalid fixture {}", path.display()))?;
        store.load_fixture(fixture)?;
    } else {
        log::warn!("No --fixture given, home rows will be empty");
    }
    Ok(store)
}

fn print_row(name: &str, items: &[HomeMediaItem]) {
    println!("{name} ({})", items.len());
    for item in items {
        let progress = item
            .progress
            .map(|p| format!(" {:.0}%", p * 100.0))
            .unwrap_or_default();
        let badge = if item.is_new { " [new]" } else { "" };
        println!(
            "  {} via {}{}{}",
            item.title, item.navigation_source, progress, badge
        );
    }
}

fn print_state(state: &HomeState) {
    print_row("Continue Watching", &state.continue_watching);
    print_row("Recently Added", &state.recently_added);
    print_row("Telegram", &state.telegram_media);
    print_row("Live TV", &state.xtream_live);
    print_row("Movies", &state.xtream_vod);
    print_row("Series", &state.xtream_series);
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // .env is optional
    let _ = dotenvy::dotenv();
    let args = Args::parse();

    let (config, source) = load_config(&args)?;
    let buffer = init_logging(&config)?;
    validate_config(&config, &source)?;
    log::info!("Loaded config from {source}");

    let store = load_store(args.fixture.as_ref())?;
    let repository =
        ObjectStoreHomeRepository::new(Arc::clone(&store), config.home.clone());
    let view_model = HomeViewModel::new(&repository);

    let state = tokio::time::timeout(
        Duration::from_secs(args.timeout_secs),
        view_model.loaded(),
    )
    .await
    .context("timed out waiting for home rows")?;

    if state.has_content() {
        print_state(&state);
    } else {
        println!("Nothing to show yet");
    }

    store.close();
    if args.logs {
        println!();
        print!("{}", buffer.export_text());
    }
    Ok(())
}
