use super::types::Position;

/// A player's in-progress turn: the at-most-two positions flipped so far and
/// whether they matched. Lazily created on first reference, never destroyed
/// during a session.
#[derive(Debug, Clone, Default)]
pub(crate) struct PlayerTurn {
    pub first: Option<Position>,
    pub second: Option<Position>,
    pub matched: bool,
}
