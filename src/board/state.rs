use std::collections::{HashMap, HashSet, VecDeque};

use tokio::sync::oneshot;
use tracing::{debug, trace};

use super::cell::Cell;
use super::errors::FlipError;
use super::layout::BoardLayout;
use super::player::PlayerTurn;
use super::types::{PlayerId, Position, Symbol};
use super::waiter::{FlipOutcome, Waiter};

const LOG_TARGET: &str = "board::state";

/// The live grid, turn tracker, waiter registry, and listener registry.
/// Plain synchronous state with no interior locking — concurrency safety
/// comes from the actor that owns the only `Board` value (see
/// `board::actor`), not from anything in here.
pub(crate) struct Board {
    rows: usize,
    cols: usize,
    cells: Vec<Cell>,
    turns: HashMap<PlayerId, PlayerTurn>,
    waiters: HashMap<Position, VecDeque<Waiter>>,
    listeners: Vec<(PlayerId, oneshot::Sender<String>)>,
}

impl Board {
    pub fn new(layout: BoardLayout) -> Self {
        let cells = layout.symbols.into_iter().map(Cell::new).collect();
        Board {
            rows: layout.rows,
            cols: layout.cols,
            cells,
            turns: HashMap::new(),
            waiters: HashMap::new(),
            listeners: Vec::new(),
        }
    }

    fn cell_index(&self, pos: Position) -> Option<usize> {
        if pos.0 < self.rows && pos.1 < self.cols {
            Some(pos.0 * self.cols + pos.1)
        } else {
            None
        }
    }

    fn get_turn(&self, player: &PlayerId) -> PlayerTurn {
        self.turns.get(player).cloned().unwrap_or_default()
    }

    fn set_turn(&mut self, player: &PlayerId, turn: PlayerTurn) {
        self.turns.insert(player.clone(), turn);
    }

    // ---- look -----------------------------------------------------------

    pub fn look(&self, player: &PlayerId) -> String {
        let mut lines = Vec::with_capacity(self.cells.len() + 1);
        lines.push(format!("{}x{}", self.rows, self.cols));
        for cell in &self.cells {
            let line = match (&cell.value, cell.face_up, &cell.controller) {
                (None, _, _) => "none".to_string(),
                (Some(_), false, _) => "down".to_string(),
                (Some(symbol), true, Some(controller)) if controller == player => {
                    format!("my {symbol}")
                }
                (Some(symbol), true, _) => format!("up {symbol}"),
            };
            lines.push(line);
        }
        lines.join("\n")
    }

    // ---- watch ------------------------------------------------------------

    pub fn register_listener(&mut self, player: PlayerId, reply: oneshot::Sender<String>) {
        self.listeners.push((player, reply));
    }

    fn fire_listeners(&mut self) {
        if self.listeners.is_empty() {
            return;
        }
        let pending = std::mem::take(&mut self.listeners);
        debug!(target: LOG_TARGET, count = pending.len(), "firing change listeners");
        for (player, reply) in pending {
            let snapshot = self.look(&player);
            let _ = reply.send(snapshot);
        }
    }

    /// Runs `fire_listeners` only when `mutated` is true: a mutation is any
    /// successful or failed flip that altered cell state, or a `map`
    /// write-back.
    pub fn notify_if_mutated(&mut self, mutated: bool) {
        if mutated {
            self.fire_listeners();
        }
    }

    // ---- flip ---------------------------------------------------------

    /// Runs the full per-call pipeline: complete the caller's previous turn
    /// (Rule 3), then perform a first- or second-card flip. Returns whether
    /// any cell, controller, or turn state visibly changed, which callers
    /// use to decide whether to fire change listeners.
    pub fn flip(
        &mut self,
        player: PlayerId,
        pos: Position,
        reply: oneshot::Sender<FlipOutcome>,
    ) -> bool {
        let pre_mutated = self.complete_previous_turn(&player);
        let turn = self.get_turn(&player);
        let flip_mutated = if turn.first.is_none() {
            self.flip_first(player, pos, reply)
        } else {
            self.flip_second(player, pos, reply)
        };
        pre_mutated || flip_mutated
    }

    fn complete_previous_turn(&mut self, player: &PlayerId) -> bool {
        let turn = self.get_turn(player);
        let (first, second) = match (turn.first, turn.second) {
            (Some(f), Some(s)) => (f, s),
            _ => return false,
        };

        if turn.matched {
            let v1 = self.cells[self.cell_index(first).expect("recorded position is valid")]
                .value
                .clone();
            let v2 = self.cells[self.cell_index(second).expect("recorded position is valid")]
                .value
                .clone();
            if v1.is_some() && v1 == v2 {
                trace!(target: LOG_TARGET, ?first, ?second, "removing matched pair");
                self.remove_cell(first);
                self.remove_cell(second);
                self.wake_all_for_removal(first);
                self.wake_all_for_removal(second);
            } else {
                // Defensive: a matched pair should always still hold equal
                // values (map preserves equivalence classes), but if it
                // doesn't we fall back to the no-match cleanup rather than
                // remove cards that no longer actually match.
                self.release_uncontrolled_face_down(first);
                self.release_uncontrolled_face_down(second);
            }
        } else {
            self.release_uncontrolled_face_down(first);
            self.release_uncontrolled_face_down(second);
        }

        self.set_turn(player, PlayerTurn::default());
        true
    }

    fn release_uncontrolled_face_down(&mut self, pos: Position) {
        let idx = self.cell_index(pos).expect("recorded position is valid");
        let cell = &mut self.cells[idx];
        if cell.value.is_some() && cell.face_up && cell.controller.is_none() {
            cell.face_up = false;
        }
    }

    fn remove_cell(&mut self, pos: Position) {
        let idx = self.cell_index(pos).expect("recorded position is valid");
        let cell = &mut self.cells[idx];
        cell.value = None;
        cell.face_up = false;
        cell.controller = None;
    }

    fn flip_first(
        &mut self,
        player: PlayerId,
        pos: Position,
        reply: oneshot::Sender<FlipOutcome>,
    ) -> bool {
        let idx = match self.cell_index(pos) {
            Some(i) if self.cells[i].value.is_some() => i,
            _ => {
                let _ = reply.send(Err(FlipError::no_card_here(pos)));
                return false;
            }
        };

        if self.cells[idx].controller.is_none() {
            self.cells[idx].face_up = true;
            self.cells[idx].controller = Some(player.clone());
            let mut turn = self.get_turn(&player);
            turn.first = Some(pos);
            self.set_turn(&player, turn);
            let _ = reply.send(Ok(()));
            true
        } else {
            trace!(target: LOG_TARGET, ?pos, %player, "first flip contended, enqueuing waiter");
            self.waiters
                .entry(pos)
                .or_default()
                .push_back(Waiter { player, reply });
            false
        }
    }

    fn flip_second(
        &mut self,
        player: PlayerId,
        pos: Position,
        reply: oneshot::Sender<FlipOutcome>,
    ) -> bool {
        let turn = self.get_turn(&player);
        let first_pos = turn
            .first
            .expect("flip_second is only called once a first position is recorded");
        let first_idx = self
            .cell_index(first_pos)
            .expect("recorded position is valid");

        let idx = match self.cell_index(pos) {
            Some(i) if self.cells[i].value.is_some() => i,
            _ => {
                // 2-A: no card here.
                self.relinquish(first_pos);
                self.finish_second(&player, pos, false);
                let _ = reply.send(Err(FlipError::no_card_here(pos)));
                return true;
            }
        };

        if let Some(controller) = self.cells[idx].controller.clone() {
            // 2-B: controlled by someone (possibly the caller). Never
            // suspends — this is what rules out two-card deadlock.
            self.relinquish(first_pos);
            self.finish_second(&player, pos, false);
            let _ = reply.send(Err(FlipError::card_controlled(pos, controller)));
            return true;
        }

        // 2-C/D/E: target is uncontrolled, face-up or face-down.
        self.cells[idx].face_up = true;
        let matched = self.cells[first_idx].value == self.cells[idx].value;
        self.finish_second(&player, pos, matched);

        if matched {
            self.cells[first_idx].controller = Some(player.clone());
            self.cells[idx].controller = Some(player);
        } else {
            self.relinquish(first_pos);
            self.relinquish(pos);
        }
        let _ = reply.send(Ok(()));
        true
    }

    fn finish_second(&mut self, player: &PlayerId, pos: Position, matched: bool) {
        let mut turn = self.get_turn(player);
        turn.second = Some(pos);
        turn.matched = matched;
        self.set_turn(player, turn);
    }

    /// Clears a cell's controller and wakes the head waiter on it, if any.
    fn relinquish(&mut self, pos: Position) {
        let idx = self.cell_index(pos).expect("recorded position is valid");
        self.cells[idx].controller = None;
        self.wake_one(pos);
    }

    /// Resumes exactly the head waiter queued on `pos`, preserving FIFO
    /// fairness. The actor never calls this concurrently with itself, so the
    /// "controlled again" defend branch below can only be reached by a
    /// future change to the wake discipline; it re-enqueues the same waiter
    /// rather than dropping it.
    fn wake_one(&mut self, pos: Position) {
        let waiter = match self.waiters.get_mut(&pos).and_then(VecDeque::pop_front) {
            Some(w) => w,
            None => return,
        };
        let idx = self.cell_index(pos).expect("waiter keys are always valid positions");

        if self.cells[idx].value.is_none() {
            let _ = waiter.reply.send(Err(FlipError::no_card_here(pos)));
            return;
        }

        if self.cells[idx].controller.is_none() {
            trace!(target: LOG_TARGET, ?pos, player = %waiter.player, "waking waiter, granting control");
            self.cells[idx].face_up = true;
            self.cells[idx].controller = Some(waiter.player.clone());
            let mut turn = self.get_turn(&waiter.player);
            turn.first = Some(pos);
            self.set_turn(&waiter.player, turn);
            let _ = waiter.reply.send(Ok(()));
        } else {
            self.waiters.entry(pos).or_default().push_back(waiter);
        }
    }

    /// Wakes every waiter queued on `pos`; used when a cell is removed by a
    /// match, since there is no longer any card to contend for.
    fn wake_all_for_removal(&mut self, pos: Position) {
        if let Some(mut queue) = self.waiters.remove(&pos) {
            while let Some(waiter) = queue.pop_front() {
                let _ = waiter.reply.send(Err(FlipError::no_card_here(pos)));
            }
        }
    }

    // ---- map ------------------------------------------------------------

    pub fn distinct_values(&self) -> Vec<Symbol> {
        let mut seen = HashSet::new();
        let mut out = Vec::new();
        for cell in &self.cells {
            if let Some(value) = &cell.value {
                if seen.insert(value.clone()) {
                    out.push(value.clone());
                }
            }
        }
        out
    }

    /// Performs the single atomic scan-and-replace once every distinct
    /// value has a resolved transform output. Controllers and face-up flags
    /// are preserved; empty cells are skipped.
    pub fn apply_map(&mut self, mapping: &HashMap<Symbol, Symbol>) {
        for cell in &mut self.cells {
            if let Some(value) = &cell.value {
                if let Some(replacement) = mapping.get(value) {
                    cell.value = Some(replacement.clone());
                }
            }
        }
        self.fire_listeners();
    }

    // ---- invariants -------------------------------------------------------

    #[cfg(debug_assertions)]
    pub fn check_invariants(&self) {
        assert!(self.rows >= 1 && self.cols >= 1, "grid must be non-degenerate");
        assert_eq!(self.cells.len(), self.rows * self.cols, "grid size mismatch");

        let mut controlled_count: HashMap<&PlayerId, usize> = HashMap::new();
        for (idx, cell) in self.cells.iter().enumerate() {
            if cell.value.is_none() {
                assert!(
                    !cell.face_up && cell.controller.is_none(),
                    "empty cell must be face-down and uncontrolled"
                );
            }
            if let Some(controller) = &cell.controller {
                assert!(
                    cell.face_up && cell.value.is_some(),
                    "controlled cell must be face-up with a value"
                );
                *controlled_count.entry(controller).or_insert(0) += 1;

                let pos = (idx / self.cols, idx % self.cols);
                let points_here = self
                    .turns
                    .get(controller)
                    .map(|turn| turn.first == Some(pos) || turn.second == Some(pos))
                    .unwrap_or(false);
                assert!(
                    points_here,
                    "cell {pos:?} is controlled by {controller} but their turn tracker doesn't point at it"
                );
            }
        }
        for (player, count) in controlled_count {
            assert!(count <= 2, "player {player} controls more than two cells");
        }

        for turn in self.turns.values() {
            if let Some(pos) = turn.first {
                assert!(self.cell_index(pos).is_some(), "firstPos must be in bounds");
            }
            if let Some(pos) = turn.second {
                assert!(self.cell_index(pos).is_some(), "secondPos must be in bounds");
            }
        }

        for (pos, queue) in &self.waiters {
            if queue.is_empty() {
                continue;
            }
            // A waiter can only still be legitimately pending on a cell that
            // is still in play and held by someone else; anything else means
            // it should have been resolved (taken control, or woken with
            // NoCardHere on removal) already.
            let idx = self
                .cell_index(*pos)
                .expect("waiter keys are always valid positions");
            let cell = &self.cells[idx];
            assert!(
                cell.value.is_some() && cell.controller.is_some(),
                "waiter queued on {pos:?} but the cell isn't controlled, so it should already be resolved"
            );
        }
    }

    #[cfg(not(debug_assertions))]
    pub fn check_invariants(&self) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    fn perfect_board() -> Board {
        // 3x3 with one unpaired center card.
        let layout = BoardLayout::from_symbols(
            3,
            3,
            vec![
                "🦄".into(),
                "🦄".into(),
                "🍭".into(),
                "🍭".into(),
                "🐙".into(),
                "🐙".into(),
                "🦀".into(),
                "🦀".into(),
                "🎈".into(),
            ],
        );
        Board::new(layout)
    }

    fn immediate_flip(board: &mut Board, player: &str, pos: Position) -> FlipOutcome {
        let (tx, mut rx) = oneshot::channel();
        board.flip(player.to_string(), pos, tx);
        rx.try_recv().expect("flip on an uncontrolled/controlled-by-self cell resolves immediately")
    }

    #[test]
    fn first_flip_takes_control_of_an_uncontrolled_cell() {
        let mut board = perfect_board();
        immediate_flip(&mut board, "alice", (0, 0)).unwrap();
        let snapshot = board.look(&"alice".to_string());
        assert!(snapshot.contains("my 🦄"));
        board.check_invariants();
    }

    #[test]
    fn matching_second_flip_keeps_both_cells_controlled() {
        let mut board = perfect_board();
        immediate_flip(&mut board, "alice", (0, 0)).unwrap();
        immediate_flip(&mut board, "alice", (0, 1)).unwrap();
        let turn = board.get_turn(&"alice".to_string());
        assert!(turn.matched);
        board.check_invariants();
    }

    #[test]
    fn mismatched_second_flip_releases_both_cells() {
        let mut board = perfect_board();
        immediate_flip(&mut board, "alice", (0, 0)).unwrap();
        // (0,0) is 🦄, (1,0) is 🍭: no match, but a second-card flip only
        // fails on NoCardHere/CardControlled, so this still succeeds.
        immediate_flip(&mut board, "alice", (1, 0)).unwrap();
        let snapshot = board.look(&"bob".to_string());
        assert!(snapshot.contains("up 🦄"));
        assert!(snapshot.contains("up 🍭"));
        board.check_invariants();
    }

    #[test]
    fn third_flip_completes_previous_mismatched_turn() {
        let mut board = perfect_board();
        immediate_flip(&mut board, "alice", (0, 0)).unwrap();
        immediate_flip(&mut board, "alice", (1, 0)).unwrap();
        immediate_flip(&mut board, "alice", (2, 2)).unwrap();
        let snapshot = board.look(&"bob".to_string());
        // (0,0) and (1,0) should now be face-down again.
        let lines: Vec<&str> = snapshot.lines().collect();
        assert_eq!(lines[1], "down");
        assert_eq!(lines[4], "down");
        board.check_invariants();
    }

    #[test]
    fn second_flip_of_a_controlled_cell_fails_without_suspending() {
        let mut board = perfect_board();
        immediate_flip(&mut board, "alice", (0, 0)).unwrap();
        let err = immediate_flip(&mut board, "alice", (0, 0)).unwrap_err();
        assert!(matches!(err, FlipError::CardControlled { .. }));
        let snapshot = board.look(&"bob".to_string());
        assert!(snapshot.contains("up 🦄"));
        board.check_invariants();
    }

    #[test]
    fn map_renames_a_symbol_everywhere_preserving_pairs() {
        let mut board = perfect_board();
        let mut mapping = HashMap::new();
        mapping.insert("🦄".to_string(), "🍪".to_string());
        board.apply_map(&mapping);
        immediate_flip(&mut board, "bob", (0, 0)).unwrap();
        immediate_flip(&mut board, "bob", (0, 1)).unwrap();
        let turn = board.get_turn(&"bob".to_string());
        assert!(turn.matched);
        board.check_invariants();
    }
}
