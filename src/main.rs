// ------------------------------------------------------------
// Module declarations
// ------------------------------------------------------------
//
// Each module represents a well-defined responsibility:
//
// - config:    Configuration structs loaded from JSON
// - schema:    Typed figure / vote records and row decoding
// - source:    Row backends (hosted PostgREST, in-memory fixture)
// - collector: Exhaustive paginated reads
// - ranking:   Tallies, country index, filtered and sorted views
// - session:   Leaderboard session (load + selection state)
// - render:    Text presentation of the widget
// - input:     Interactive line commands
//
mod collector;
mod config;
mod input;
mod metrics;
mod ranking;
mod render;
mod schema;
mod session;
mod source;
mod util;

// ------------------------------------------------------------
// External dependencies
// ------------------------------------------------------------

use config::Config;
use input::{Command, CommandError, HELP};
use metrics::METRICS;
use session::{Leaderboard, LoadPlan};
use source::{adapter::RowSource, get_source};

use log::{info, warn};
use tokio::io::{AsyncBufReadExt, BufReader};

// ------------------------------------------------------------
// Application entry point
// ------------------------------------------------------------
//
// Responsibilities:
// - Initialize cryptography backend (rustls)
// - Load configuration and logging
// - Load the leaderboard once
// - Apply user commands until stdin closes
//
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Must run before any HTTP client is built.
    util::install_crypto_provider();

    // --------------------------------------------------------
    // Load configuration from disk
    //
    // NOTE:
    // - The config file contains the backend key.
    // - It must not be committed to version control.
    // --------------------------------------------------------
    let path = std::env::args().nth(1).unwrap_or_else(|| "config.json".to_string());
    let config = Config::load(&path)?;

    let default_level = if config.debug_log() { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level)).init();

    let source = get_source(&config.backend)?;
    info!("using {} backend", source.name());

    let plan = LoadPlan::from(&config.collections);
    let mut board = Leaderboard::new();

    reload(&mut board, source.as_ref(), &plan).await;
    println!("{HELP}");

    // --------------------------------------------------------
    // Interaction loop
    //
    // Each command updates the selection and redraws only the
    // parts it invalidates. The ranked view is recomputed
    // synchronously from the loaded snapshot.
    // --------------------------------------------------------
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let command = match Command::parse(&line) {
            Ok(command) => command,
            Err(CommandError::Empty) => continue,
            Err(e) => {
                eprintln!("{e}");
                continue;
            }
        };

        let redraw = match command {
            Command::Category(category) => board.set_category(category),
            Command::Country(country) => board.set_country(country),
            Command::Rank(mode) => board.set_rank_mode(mode),
            Command::Reload => {
                reload(&mut board, source.as_ref(), &plan).await;
                continue;
            }
            Command::Help => {
                println!("{HELP}");
                continue;
            }
            Command::Quit => break,
        };

        print!("{}", render::render(&board, redraw));
    }

    Ok(())
}

/// Runs a full load and draws the whole widget.
async fn reload(board: &mut Leaderboard, source: &dyn RowSource, plan: &LoadPlan) {
    println!("{}", render::LOADING);
    board.load(source, plan).await;

    if let Some(snapshot) = board.snapshot() {
        info!("snapshot taken at {}", snapshot.loaded_at.to_rfc3339());
        if !snapshot.degraded.is_empty() {
            warn!("showing partial data ({} page failures)", snapshot.degraded.len());
        }
        if snapshot.quarantined > 0 {
            warn!("{} rows skipped as invalid", snapshot.quarantined);
        }
    }
    info!("[METRICS] {}", METRICS.summary());

    print!("{}", render::render_all(board));
}
