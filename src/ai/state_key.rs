use serde::{Deserialize, Serialize};

use crate::game::{Board, GameState, Player, NUM_ACTIONS};

/// Compressed description of a position used to index the value table.
///
/// Features are measured relative to `side` (the learning agent's color).
/// The game-progress fraction is kept as its integer numerator, `stones`,
/// so the key stays hashable; see [`StateKey::progress`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StateKey {
    pub stone_diff: i8,
    pub own_moves: u8,
    pub opp_moves: u8,
    pub own_corners: u8,
    pub opp_corners: u8,
    pub stones: u8,
    pub side: Player,
    pub to_move: Player,
}

impl StateKey {
    pub fn new(board: &Board, side: Player, to_move: Player) -> Self {
        let own = side.to_cell();
        let opp = -own;
        StateKey {
            stone_diff: (board.count(own) as i32 - board.count(opp) as i32) as i8,
            own_moves: board.valid_moves(side).len() as u8,
            opp_moves: board.valid_moves(side.other()).len() as u8,
            own_corners: board.corner_count(own) as u8,
            opp_corners: board.corner_count(opp) as u8,
            stones: board.stone_count() as u8,
            side,
            to_move,
        }
    }

    /// Key for `state` as seen by `side`
    pub fn from_state(state: &GameState, side: Player) -> Self {
        Self::new(state.board(), side, state.current_player())
    }

    /// Fraction of the board covered, in [0, 1]
    pub fn progress(&self) -> f64 {
        self.stones as f64 / NUM_ACTIONS as f64
    }
}
