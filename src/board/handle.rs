use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{mpsc, oneshot};
use tracing::trace;

use super::command::Command;
use super::errors::{ActorError, FlipError, TransformError};
use super::types::{PlayerId, Symbol};

const LOG_TARGET: &str = "board::handle";
const ACTOR_GONE: &str = "board actor task is gone; a BoardHandle must not outlive it";

/// A named, stateful alternative to a bare transform closure, for callers of
/// `map` who want something more than `Fn(Symbol) -> Fut` — e.g. a transform
/// backed by a dictionary lookup or a remote call. Object-safe so a handle
/// can carry `Arc<dyn CardTransform>` without generics leaking into
/// `BoardHandle` itself.
#[async_trait]
pub trait CardTransform: Send + Sync {
    async fn transform(&self, value: Symbol) -> Result<Symbol, TransformError>;
}

struct FnTransform<F>(F);

#[async_trait]
impl<F, Fut> CardTransform for FnTransform<F>
where
    F: Fn(Symbol) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Symbol, TransformError>> + Send,
{
    async fn transform(&self, value: Symbol) -> Result<Symbol, TransformError> {
        (self.0)(value).await
    }
}

/// Cheaply-cloneable client handle to a running `BoardActor`. Holds only an
/// `mpsc::Sender<Command>`; the live grid, turn state, and waiter queues all
/// live behind the actor and are never reachable from here by reference.
#[derive(Clone)]
pub struct BoardHandle {
    sender: mpsc::Sender<Command>,
}

impl BoardHandle {
    pub(crate) fn new(sender: mpsc::Sender<Command>) -> Self {
        BoardHandle { sender }
    }

    /// Flips the card at `(row, col)` on behalf of `player`: first closes out
    /// any pending previous turn, then performs a first- or second-card
    /// flip. Suspends (without blocking the actor) when contending for a
    /// cell someone else controls.
    pub async fn flip(&self, player: impl Into<PlayerId>, row: usize, col: usize) -> Result<(), FlipError> {
        let (tx, rx) = oneshot::channel();
        self.sender
            .send(Command::Flip {
                player: player.into(),
                pos: (row, col),
                reply: tx,
            })
            .await
            .map_err(|_| FlipError::from(ActorError))?;
        rx.await.map_err(|_| FlipError::from(ActorError))?
    }

    /// Renders `player`'s current view of the board. Never suspends.
    pub async fn look(&self, player: impl Into<PlayerId>) -> Result<String, ActorError> {
        let (tx, rx) = oneshot::channel();
        self.sender
            .send(Command::Look {
                player: player.into(),
                reply: tx,
            })
            .await
            .map_err(|_| ActorError)?;
        rx.await.map_err(|_| ActorError)
    }

    /// Resolves with the next post-mutation `look` snapshot for `player`.
    /// One-shot: once it fires, a new call is needed to watch again.
    pub async fn watch(&self, player: impl Into<PlayerId>) -> Result<String, ActorError> {
        let (tx, rx) = oneshot::channel();
        self.sender
            .send(Command::Watch {
                player: player.into(),
                reply: tx,
            })
            .await
            .map_err(|_| ActorError)?;
        rx.await.map_err(|_| ActorError)
    }

    /// Rewrites every cell's value through `transform`, invoked exactly once
    /// per distinct current value. Convenience wrapper around
    /// [`Self::map_with`] for plain async closures.
    pub async fn map<F, Fut>(&self, transform: F) -> Result<(), TransformError>
    where
        F: Fn(Symbol) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Symbol, TransformError>> + Send + 'static,
    {
        self.map_with(Arc::new(FnTransform(transform))).await
    }

    /// Rewrites every cell's value through a named [`CardTransform`]. See
    /// [`Self::map`] for the closure-based entry point.
    pub async fn map_with(&self, transform: Arc<dyn CardTransform>) -> Result<(), TransformError> {
        trace!(target: LOG_TARGET, "dispatching map");
        let (tx, rx) = oneshot::channel();
        self.sender
            .send(Command::Map { transform, reply: tx })
            .await
            .map_err(|_| TransformError(anyhow::anyhow!(ACTOR_GONE)))?;
        rx.await.map_err(|_| TransformError(anyhow::anyhow!(ACTOR_GONE)))?
    }
}
