use std::collections::HashMap;
use std::sync::Arc;

use futures::future::join_all;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, instrument, trace};

use super::command::Command;
use super::errors::TransformError;
use super::handle::{BoardHandle, CardTransform};
use super::layout::BoardLayout;
use super::state::Board;
use super::types::Symbol;

const LOG_TARGET: &str = "board::actor";

/// Default `mpsc` buffer between a `BoardHandle` and its actor. Sized for a
/// handful of concurrently-issued calls; bounded so a runaway producer
/// backpressures instead of growing memory without limit.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 256;

/// Sole owner of the live `Board`. Spawn with [`BoardActor::spawn`] to get a
/// running task plus a [`BoardHandle`] for talking to it; the task is the
/// board's single serial executor — every `Command` is handled to
/// completion (suspension points excepted) before the next is read off the
/// channel.
pub struct BoardActor {
    board: Board,
    receiver: mpsc::Receiver<Command>,
    self_sender: mpsc::Sender<Command>,
}

impl BoardActor {
    /// Builds a board from `layout`, spawns its actor task, and returns a
    /// handle to it. The task runs until every clone of the returned handle
    /// (and the actor's own internal sender) has been dropped.
    pub fn spawn(layout: BoardLayout) -> BoardHandle {
        Self::spawn_with_capacity(layout, DEFAULT_CHANNEL_CAPACITY)
    }

    pub fn spawn_with_capacity(layout: BoardLayout, capacity: usize) -> BoardHandle {
        let (sender, receiver) = mpsc::channel(capacity);
        let actor = BoardActor {
            board: Board::new(layout),
            receiver,
            self_sender: sender.clone(),
        };
        tokio::spawn(actor.run());
        BoardHandle::new(sender)
    }

    #[instrument(skip(self), level = "info", target = LOG_TARGET)]
    async fn run(mut self) {
        info!(target: LOG_TARGET, "board actor started");
        while let Some(command) = self.receiver.recv().await {
            self.handle_command(command);
        }
        info!(target: LOG_TARGET, "all handles dropped; board actor exiting");
    }

    fn handle_command(&mut self, command: Command) {
        match command {
            Command::Flip { player, pos, reply } => {
                trace!(target: LOG_TARGET, %player, ?pos, "flip");
                let mutated = self.board.flip(player, pos, reply);
                self.board.notify_if_mutated(mutated);
                self.board.check_invariants();
            }
            Command::Look { player, reply } => {
                let snapshot = self.board.look(&player);
                let _ = reply.send(snapshot);
            }
            Command::Watch { player, reply } => {
                self.board.register_listener(player, reply);
            }
            Command::Map { transform, reply } => {
                self.spawn_map(transform, reply);
            }
            Command::ApplyMapResult { result, reply } => match result {
                Ok(mapping) => {
                    debug!(target: LOG_TARGET, distinct = mapping.len(), "applying map result");
                    self.board.apply_map(&mapping);
                    self.board.check_invariants();
                    let _ = reply.send(Ok(()));
                }
                Err(err) => {
                    debug!(target: LOG_TARGET, %err, "map transform failed, board unchanged");
                    let _ = reply.send(Err(err));
                }
            },
        }
    }

    /// Reads the distinct values synchronously (no suspension), then hands
    /// the actual `transform` invocations to a supporting task so the actor
    /// keeps servicing `Flip`/`Look`/`Watch` while they're in flight.
    fn spawn_map(
        &mut self,
        transform: Arc<dyn CardTransform>,
        reply: oneshot::Sender<Result<(), TransformError>>,
    ) {
        let values = self.board.distinct_values();
        debug!(target: LOG_TARGET, distinct = values.len(), "map dispatched");
        let self_sender = self.self_sender.clone();
        tokio::spawn(async move {
            let result = resolve_transforms(values, transform).await;
            let _ = self_sender
                .send(Command::ApplyMapResult { result, reply })
                .await;
        });
    }
}

async fn resolve_transforms(
    values: Vec<Symbol>,
    transform: Arc<dyn CardTransform>,
) -> Result<HashMap<Symbol, Symbol>, TransformError> {
    let futures = values.into_iter().map(|value| {
        let transform = transform.clone();
        async move {
            let replacement = transform.transform(value.clone()).await?;
            Ok::<_, TransformError>((value, replacement))
        }
    });
    let mut mapping = HashMap::new();
    for outcome in join_all(futures).await {
        let (value, replacement) = outcome?;
        mapping.insert(value, replacement);
    }
    Ok(mapping)
}
