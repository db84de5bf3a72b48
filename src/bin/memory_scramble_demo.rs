//! Non-HTTP demo binary that drives the board actor end-to-end, without a
//! web server in front of it. Loads a board layout, spawns a handful of
//! tasks playing scripted moves (contention and removal-wakes-all), and
//! prints `look` snapshots as the game progresses.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use memory_scramble::board::BoardActor;
use memory_scramble::config::{BoardArgs, BoardConfig};
use memory_scramble::BoardLayout;

const LOG_TARGET: &str = "bin::memory_scramble_demo";

/// A 3x3 board with one unpaired center card.
const SAMPLE_BOARD: &str = "3x3\n🦄\n🦄\n🍭\n🍭\n🐙\n🐙\n🦀\n🦀\n🎈\n";

#[tokio::main]
async fn main() -> Result<()> {
    load_dotenv();
    let args = BoardArgs::parse();
    init_tracing(args.json)?;
    let config = BoardConfig::from_args(args);

    let layout = load_layout(config.layout_path.as_ref())?;
    let handle = BoardActor::spawn_with_capacity(layout, config.channel_capacity);

    info!(target: LOG_TARGET, "alice takes the first pair");
    handle.flip("alice", 0, 0).await?;
    handle.flip("alice", 0, 1).await?;
    println!("{}\n", handle.look("alice").await?);

    info!(target: LOG_TARGET, "alice's third flip completes her match and becomes the card bob and charlie queue behind");
    // Rule 3's pre-step fires first, removing (0,0)/(0,1); this flip at
    // (1,0) then proceeds as the first card of alice's new turn (🍭), which
    // she holds until her next flip.
    handle.flip("alice", 1, 0).await?;

    let mut waiters = Vec::new();
    for player in ["bob", "charlie"] {
        let handle = handle.clone();
        waiters.push(tokio::spawn(async move { handle.flip(player, 1, 0).await }));
    }
    tokio::time::sleep(Duration::from_millis(10)).await;

    // alice's second flip is a mismatch (🍭 vs 🦀), so it relinquishes (1,0)
    // immediately and wakes bob, the head of the FIFO queue.
    handle.flip("alice", 2, 0).await?;
    waiters.remove(0).await??;
    println!("{}\n", handle.look("alice").await?);

    // bob now holds (1,0) as his own first card; his second flip mismatches
    // too (🍭 vs 🐙), relinquishing (1,0) again and waking charlie.
    handle.flip("bob", 1, 1).await?;
    waiters.remove(0).await??;
    println!("{}\n", handle.look("alice").await?);

    info!(target: LOG_TARGET, "renaming every unicorn to a cookie via map");
    handle
        .map(|value| async move {
            Ok(if value == "🎈" { "🍪".to_string() } else { value })
        })
        .await?;
    println!("{}", handle.look("alice").await?);

    Ok(())
}

fn load_dotenv() {
    let manifest_env = env!("CARGO_MANIFEST_DIR");
    let manifest_env_path = PathBuf::from(manifest_env).join(".env");
    dotenv::from_filename(manifest_env_path).ok();
    dotenv::dotenv().ok();
}

fn init_tracing(json: bool) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = fmt::fmt().with_env_filter(filter).with_target(false);

    if json {
        builder.json().flatten_event(true).init();
    } else {
        builder.compact().init();
    }

    Ok(())
}

fn load_layout(path: Option<&PathBuf>) -> Result<BoardLayout> {
    let text = match path {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read board layout at {}", path.display()))?,
        None => SAMPLE_BOARD.to_string(),
    };
    BoardLayout::parse(&text).context("failed to parse board layout")
}
