use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::oneshot;

use super::errors::TransformError;
use super::handle::CardTransform;
use super::types::{PlayerId, Position, Symbol};
use super::waiter::FlipOutcome;

/// Everything a [`super::handle::BoardHandle`] can ask the actor to do.
/// The actor processes these one at a time, off a single `mpsc::Receiver`,
/// which is the board's single serial executor.
pub(crate) enum Command {
    Flip {
        player: PlayerId,
        pos: Position,
        reply: oneshot::Sender<FlipOutcome>,
    },
    Look {
        player: PlayerId,
        reply: oneshot::Sender<String>,
    },
    Watch {
        player: PlayerId,
        reply: oneshot::Sender<String>,
    },
    /// Kicks off a `map`: the actor reads the distinct current values
    /// (a synchronous, non-suspending step) and hands the rest of the work
    /// to a supporting task so transforms can run without blocking the
    /// actor's loop.
    Map {
        transform: Arc<dyn CardTransform>,
        reply: oneshot::Sender<Result<(), TransformError>>,
    },
    /// Sent by the supporting task spawned for a `Map` command once every
    /// distinct value's transform has resolved. Re-enters the actor's own
    /// queue so the atomic write-back happens inside the normal serialized
    /// critical section, not inside the spawned task.
    ApplyMapResult {
        result: Result<HashMap<Symbol, Symbol>, TransformError>,
        reply: oneshot::Sender<Result<(), TransformError>>,
    },
}
