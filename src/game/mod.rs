//! Core Othello game logic: board and capture rules, players, and the
//! turn-sequencing environment.

mod board;
mod player;
mod state;

pub use board::{
    action_to_coords, coords_to_action, Board, Cell, BOARD_SIZE, CORNERS, NUM_ACTIONS,
};
pub use player::Player;
pub use state::{EnvConfig, GameOutcome, GameState, MoveError, StepInfo, StepResult};
