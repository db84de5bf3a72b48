//! The Memory Scramble board: a concurrency-safe shared grid of cards.
//!
//! The live state (`state::Board`) is a plain synchronous struct with no
//! interior locking. Safety under concurrent callers comes from
//! [`actor::BoardActor`], a single task that owns the only `Board` value and
//! processes one [`command::Command`] at a time, serving as the board's
//! single serial executor. Callers never see the actor or the `Board`
//! directly; they hold a [`handle::BoardHandle`] instead.

mod actor;
mod cell;
mod command;
mod errors;
mod handle;
mod layout;
mod player;
mod state;
pub mod types;
mod waiter;

pub use actor::{BoardActor, DEFAULT_CHANNEL_CAPACITY};
pub use errors::{ActorError, FlipError, ParseError, TransformError};
pub use handle::{BoardHandle, CardTransform};
pub use layout::BoardLayout;
pub use types::{PlayerId, Position, Symbol};
