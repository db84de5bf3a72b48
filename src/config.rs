//! Ambient configuration for running a board actor outside of a unit test,
//! scaled down to the two knobs a `BoardActor` actually needs: how many
//! in-flight commands its channel buffers, and which layout file to load at
//! startup.

use std::path::PathBuf;

use clap::Parser;

use crate::board::DEFAULT_CHANNEL_CAPACITY;

/// Runtime configuration for [`crate::board::BoardActor::spawn_with_capacity`].
#[derive(Debug, Clone)]
pub struct BoardConfig {
    /// Bound on the actor's `mpsc` channel; a caller beyond this backpressures
    /// rather than growing memory without limit.
    pub channel_capacity: usize,
    /// Path to a board layout file in the `RxC` + row-major symbols format.
    /// `None` means "use the bundled sample board".
    pub layout_path: Option<PathBuf>,
}

impl Default for BoardConfig {
    fn default() -> Self {
        BoardConfig {
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
            layout_path: None,
        }
    }
}

impl BoardConfig {
    pub fn from_args(args: BoardArgs) -> Self {
        BoardConfig {
            channel_capacity: args.channel_capacity,
            layout_path: args.layout,
        }
    }
}

/// CLI surface for the demo binary, using the `#[derive(Parser)]` + `env`
/// fallback convention, scaled down to what a board needs.
#[derive(Debug, Parser)]
#[command(name = "memory_scramble_demo")]
#[command(about = "Run a scripted Memory Scramble game against the board actor", long_about = None)]
pub struct BoardArgs {
    /// Path to a board layout file; defaults to a bundled sample board.
    #[arg(long, env = "MEMORY_SCRAMBLE_BOARD")]
    pub layout: Option<PathBuf>,

    /// Bound on the actor's command channel.
    #[arg(long, env = "MEMORY_SCRAMBLE_CHANNEL_CAPACITY", default_value_t = DEFAULT_CHANNEL_CAPACITY)]
    pub channel_capacity: usize,

    /// Toggle structured (JSON) logs instead of the default compact format.
    #[arg(long, env = "MEMORY_SCRAMBLE_LOG_JSON", default_value_t = false)]
    pub json: bool,
}
