use tokio::sync::oneshot;

use super::errors::FlipError;
use super::types::PlayerId;

/// What a suspended or resumed `flip` ultimately resolves to.
pub(crate) type FlipOutcome = Result<(), FlipError>;

/// A first-card flip that contended for a controlled cell (Rule 1-D) and is
/// parked on that cell's FIFO queue. `reply` is the same one-shot sender the
/// caller's original command carried — waking a waiter means firing this
/// sender directly, with no round trip back through the actor's inbox.
pub(crate) struct Waiter {
    pub player: PlayerId,
    pub reply: oneshot::Sender<FlipOutcome>,
}
