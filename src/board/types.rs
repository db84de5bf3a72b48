//! Small opaque identifiers shared across the board modules.

/// A card's face value. Compared by exact string equality.
pub type Symbol = String;

/// Identity of a player issuing flip/look/watch/map calls against a board.
///
/// The board never authenticates players; any string the transport hands us
/// is accepted and lazily given turn-tracking state.
pub type PlayerId = String;

/// A (row, col) grid coordinate, always used row-major and positionally
/// rather than as a named struct.
pub type Position = (usize, usize);
