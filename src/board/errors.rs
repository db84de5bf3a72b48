use thiserror::Error;

use super::types::{PlayerId, Position};

/// Raised only by [`super::layout::BoardLayout::parse`]; never mutates a live board.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("malformed board header: {header:?}, expected the form RxC")]
    BadHeader { header: String },

    #[error("board dimensions must be positive integers, got {rows}x{cols}")]
    NonPositiveDimension { rows: usize, cols: usize },

    #[error("header declares {expected} cells but {actual} body lines were found")]
    WrongCellCount { expected: usize, actual: usize },

    #[error("cell line {line} is empty")]
    EmptyCellLine { line: usize },
}

/// Failure modes of [`super::handle::BoardHandle::flip`]. Messages deliberately
/// contain the substrings `No card at position` and `controlled by`, which
/// downstream wire-level tests and transports match on.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FlipError {
    #[error("No card at position ({row}, {col})")]
    NoCardHere { row: usize, col: usize },

    #[error("position ({row}, {col}) is controlled by {controller}")]
    CardControlled {
        row: usize,
        col: usize,
        controller: PlayerId,
    },

    /// The actor task is gone (channel closed), not a game-semantic outcome.
    #[error(transparent)]
    ActorGone(#[from] ActorError),
}

impl FlipError {
    pub(crate) fn no_card_here(pos: Position) -> Self {
        FlipError::NoCardHere {
            row: pos.0,
            col: pos.1,
        }
    }

    pub(crate) fn card_controlled(pos: Position, controller: PlayerId) -> Self {
        FlipError::CardControlled {
            row: pos.0,
            col: pos.1,
            controller,
        }
    }
}

/// Raised when the closure/trait passed to `map` fails. `map` aborts before
/// the atomic write-back; no cells change.
#[derive(Debug, Error)]
#[error("card transform failed: {0}")]
pub struct TransformError(#[from] pub anyhow::Error);

/// Surfaces when a [`super::handle::BoardHandle`] call can't reach its actor
/// task. Reports "the board is gone", not a game-semantic failure. The actor
/// is designed to run for as long as any handle is alive, so this should
/// only ever fire if the actor task itself panicked.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("board actor is no longer running")]
pub struct ActorError;
