use log::debug;

use super::board::{action_to_coords, coords_to_action, NUM_ACTIONS};
use super::{Board, Player};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameOutcome {
    Winner(Player),
    Draw,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MoveError {
    #[error("episode has ended, call reset() before stepping again")]
    GameOver,
}

/// Environment settings that shape rewards.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct EnvConfig {
    /// Reward returned for an action outside the legal set. Zero or negative.
    pub illegal_move_penalty: f64,
}

impl Default for EnvConfig {
    fn default() -> Self {
        EnvConfig {
            illegal_move_penalty: 0.0,
        }
    }
}

/// Side-channel data returned with every step.
#[derive(Debug, Clone, PartialEq)]
pub struct StepInfo {
    pub current_player: Player,
    pub legal_actions: Vec<usize>,
    /// Cells flipped by the move, for animation.
    pub flipped: Vec<(usize, usize)>,
    /// True when the action was rejected and nothing changed.
    pub illegal: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StepResult {
    pub observation: [i8; NUM_ACTIONS],
    /// Reward from the perspective of the side that just acted.
    pub reward: f64,
    pub done: bool,
    pub info: StepInfo,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GameState {
    board: Board,
    current_player: Player,
    terminal: bool,
    illegal_move_penalty: f64,
}

impl GameState {
    /// Create initial game state with the given illegal-move penalty
    pub fn new(illegal_move_penalty: f64) -> Self {
        GameState {
            board: Board::new(),
            current_player: Player::Black, // Black starts
            terminal: false,
            illegal_move_penalty,
        }
    }

    /// Create initial game state with no illegal-move penalty
    pub fn initial() -> Self {
        Self::new(0.0)
    }

    pub fn from_config(config: &EnvConfig) -> Self {
        Self::new(config.illegal_move_penalty)
    }

    /// Wrap an arbitrary position. If `to_move` has no legal move the turn
    /// passes to the opponent; if neither side can move the state is terminal.
    pub fn from_board(board: Board, to_move: Player, illegal_move_penalty: f64) -> Self {
        let mut state = GameState {
            board,
            current_player: to_move,
            terminal: false,
            illegal_move_penalty,
        };
        if !board.has_valid_move(to_move) {
            if board.has_valid_move(to_move.other()) {
                state.current_player = to_move.other();
            } else {
                state.terminal = true;
            }
        }
        state
    }

    /// Start a fresh episode, keeping the penalty setting
    pub fn reset(&mut self) -> [i8; NUM_ACTIONS] {
        *self = Self::new(self.illegal_move_penalty);
        self.observation()
    }

    pub fn current_player(&self) -> Player {
        self.current_player
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn illegal_move_penalty(&self) -> f64 {
        self.illegal_move_penalty
    }

    pub fn is_terminal(&self) -> bool {
        self.terminal
    }

    pub fn observation(&self) -> [i8; NUM_ACTIONS] {
        self.board.observation()
    }

    /// Final result, only available once the game is over
    pub fn outcome(&self) -> Option<GameOutcome> {
        if !self.terminal {
            return None;
        }
        let (black, white) = self.board.score();
        Some(match black.cmp(&white) {
            std::cmp::Ordering::Greater => GameOutcome::Winner(Player::Black),
            std::cmp::Ordering::Less => GameOutcome::Winner(Player::White),
            std::cmp::Ordering::Equal => GameOutcome::Draw,
        })
    }

    /// Legal action indices for the side to move, in row-major order
    pub fn legal_actions(&self) -> Vec<usize> {
        if self.terminal {
            return Vec::new();
        }
        self.board
            .valid_moves(self.current_player)
            .into_iter()
            .map(|(row, col)| coords_to_action(row, col))
            .collect()
    }

    /// Play `action` for the side to move.
    ///
    /// Illegal actions leave the state untouched and return the configured
    /// penalty. A legal move hands the turn to the opponent when it can move,
    /// otherwise the mover goes again; when neither side can move the game
    /// ends and the reward is +1/-1/0 for the mover.
    pub fn step(&mut self, action: usize) -> Result<StepResult, MoveError> {
        if self.terminal {
            return Err(MoveError::GameOver);
        }

        let mover = self.current_player;
        let coords = action_to_coords(action)
            .filter(|&(row, col)| self.board.is_valid_move(mover, row, col));

        let Some((row, col)) = coords else {
            debug!("{mover} attempted illegal action {action}, rejected");
            return Ok(StepResult {
                observation: self.observation(),
                reward: self.illegal_move_penalty,
                done: false,
                info: StepInfo {
                    current_player: mover,
                    legal_actions: self.legal_actions(),
                    flipped: Vec::new(),
                    illegal: true,
                },
            });
        };

        let flipped = self.board.apply_move(mover, row, col);
        self.advance_turn(mover);

        let reward = match self.outcome() {
            Some(GameOutcome::Winner(winner)) if winner == mover => 1.0,
            Some(GameOutcome::Winner(_)) => -1.0,
            Some(GameOutcome::Draw) | None => 0.0,
        };

        Ok(StepResult {
            observation: self.observation(),
            reward,
            done: self.terminal,
            info: StepInfo {
                current_player: self.current_player,
                legal_actions: self.legal_actions(),
                flipped,
                illegal: false,
            },
        })
    }

    /// Apply a move and return new state, leaving `self` untouched
    pub fn apply_action(&self, action: usize) -> Result<(GameState, StepResult), MoveError> {
        let mut next = *self;
        let result = next.step(action)?;
        Ok((next, result))
    }

    fn advance_turn(&mut self, mover: Player) {
        let opponent = mover.other();
        if self.board.has_valid_move(opponent) {
            self.current_player = opponent;
        } else if self.board.has_valid_move(mover) {
            debug!("{opponent} has no legal move, {mover} plays again");
            self.current_player = mover;
        } else {
            self.terminal = true;
        }
    }
}

impl Default for GameState {
    fn default() -> Self {
        Self::initial()
    }
}
