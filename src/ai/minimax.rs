use crate::game::{coords_to_action, Board, GameState, Player, CORNERS};

use super::agent::Agent;

/// Bonus (or penalty) per corner held, on top of the raw stone differential.
pub const CORNER_WEIGHT: i32 = 3;

/// Trait for evaluating a board position from a player's perspective.
pub trait Heuristic: Send {
    fn evaluate(&self, board: &Board, player: Player) -> i32;
}

/// Stone differential plus a fixed bonus per owned corner.
pub struct CornerHeuristic;

impl Heuristic for CornerHeuristic {
    fn evaluate(&self, board: &Board, player: Player) -> i32 {
        let own = player.to_cell();
        let opp = -own;
        let material = board.count(own) as i32 - board.count(opp) as i32;
        let corners = CORNERS
            .iter()
            .map(|&(row, col)| match board.get(row, col) {
                c if c == own => CORNER_WEIGHT,
                c if c == opp => -CORNER_WEIGHT,
                _ => 0,
            })
            .sum::<i32>();
        material + corners
    }
}

/// Minimax search settings.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct MinimaxConfig {
    /// Search depth in plies.
    pub depth: usize,
}

impl Default for MinimaxConfig {
    fn default() -> Self {
        MinimaxConfig { depth: 3 }
    }
}

/// Fixed-depth minimax agent without pruning.
///
/// A node where the side to move has no legal move is scored immediately
/// rather than searched through the pass, so positions with forced passes
/// are searched shallower than `depth`.
pub struct MinimaxAgent {
    side: Player,
    depth: usize,
    name: String,
    heuristic: Box<dyn Heuristic>,
}

impl MinimaxAgent {
    pub fn new(side: Player, depth: usize) -> Self {
        Self::with_heuristic(side, depth, Box::new(CornerHeuristic))
    }

    pub fn with_heuristic(side: Player, depth: usize, heuristic: Box<dyn Heuristic>) -> Self {
        MinimaxAgent {
            side,
            depth,
            name: format!("Minimax(depth={depth})"),
            heuristic,
        }
    }

    pub fn side(&self) -> Player {
        self.side
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Static score of `board` for this agent's side
    pub fn evaluate(&self, board: &Board) -> i32 {
        self.heuristic.evaluate(board, self.side)
    }

    /// Returns the minimax value of `board` and the action achieving it.
    /// The first action in row-major order wins ties.
    pub fn search(
        &self,
        board: &Board,
        depth: usize,
        maximizing: bool,
        side_to_move: Player,
    ) -> (i32, Option<usize>) {
        if depth == 0
            || !(board.has_valid_move(Player::Black) || board.has_valid_move(Player::White))
        {
            return (self.evaluate(board), None);
        }

        let moves = board.valid_moves(side_to_move);
        if moves.is_empty() {
            return (self.evaluate(board), None);
        }

        let mut best_value = if maximizing { i32::MIN } else { i32::MAX };
        let mut best_action = None;

        for (row, col) in moves {
            let mut child = *board;
            child.apply_move(side_to_move, row, col);
            let (value, _) = self.search(&child, depth - 1, !maximizing, side_to_move.other());

            let improves = if maximizing {
                value > best_value
            } else {
                value < best_value
            };
            if improves {
                best_value = value;
                best_action = Some(coords_to_action(row, col));
            }
        }

        (best_value, best_action)
    }
}

impl Agent for MinimaxAgent {
    /// Best action for this agent's side. Unlike [`MinimaxAgent::search`],
    /// which yields no action at depth 0, this falls back to the first legal
    /// move so a move is returned whenever one exists.
    fn select_action(&mut self, state: &GameState) -> Option<usize> {
        let board = state.board();
        let (_, action) = self.search(board, self.depth, true, self.side);
        action.or_else(|| {
            board
                .valid_moves(self.side)
                .first()
                .map(|&(row, col)| coords_to_action(row, col))
        })
    }

    fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::RandomAgent;
    use crate::game::{Cell, GameOutcome, BOARD_SIZE};

    // --- Heuristic tests ---

    #[test]
    fn heuristic_initial_board_is_zero() {
        let board = Board::new();
        let h = CornerHeuristic;
        assert_eq!(h.evaluate(&board, Player::Black), 0);
        assert_eq!(h.evaluate(&board, Player::White), 0);
    }

    #[test]
    fn heuristic_corner_bonus() {
        let mut board = Board::new();
        board.set(0, 0, Cell::Black);
        board.set(7, 7, Cell::White);
        board.set(7, 0, Cell::White);
        let h = CornerHeuristic;
        // Black: 3 stones vs 4, one corner vs two.
        assert_eq!(h.evaluate(&board, Player::Black), (3 - 4) + 3 - 6);
        assert_eq!(h.evaluate(&board, Player::White), (4 - 3) + 6 - 3);
    }

    #[test]
    fn evaluate_uses_own_side() {
        let mut board = Board::new();
        board.apply_move(Player::Black, 2, 3);
        assert_eq!(MinimaxAgent::new(Player::Black, 1).evaluate(&board), 3);
        assert_eq!(MinimaxAgent::new(Player::White, 1).evaluate(&board), -3);
    }

    // --- Algorithm tests ---

    #[test]
    fn selects_legal_action() {
        let mut agent = MinimaxAgent::new(Player::Black, 3);
        let state = GameState::initial();
        let legal = state.legal_actions();
        let action = agent.select_action(&state).unwrap();
        assert!(legal.contains(&action), "Action {action} is not legal");
    }

    #[test]
    fn ties_go_to_first_action() {
        // Every opening move flips one stone, so depth 1 scores them equally.
        for _ in 0..5 {
            let mut agent = MinimaxAgent::new(Player::Black, 1);
            assert_eq!(agent.select_action(&GameState::initial()), Some(19));
        }
        let agent = MinimaxAgent::new(Player::Black, 1);
        assert_eq!(agent.search(&Board::new(), 1, true, Player::Black), (3, Some(19)));
    }

    #[test]
    fn minimizing_node_picks_first_lowest() {
        // From Black's view, any White reply in the opening scores -3.
        let agent = MinimaxAgent::new(Player::Black, 1);
        assert_eq!(agent.search(&Board::new(), 1, false, Player::White), (-3, Some(20)));
    }

    #[test]
    fn prefers_corner_capture() {
        let mut board = Board::empty();
        board.set(7, 5, Cell::Black);
        board.set(7, 6, Cell::White);
        board.set(2, 2, Cell::Black);
        board.set(2, 3, Cell::White);
        let state = GameState::from_board(board, Player::Black, 0.0);
        assert_eq!(state.legal_actions(), vec![20, 63]);

        let mut agent = MinimaxAgent::new(Player::Black, 1);
        assert_eq!(agent.select_action(&state), Some(63));
    }

    #[test]
    fn depth_zero_evaluates_root() {
        let agent = MinimaxAgent::new(Player::Black, 0);
        assert_eq!(agent.search(&Board::new(), 0, true, Player::Black), (0, None));

        let mut agent = MinimaxAgent::new(Player::Black, 0);
        assert_eq!(agent.select_action(&GameState::initial()), Some(19));
    }

    #[test]
    fn no_legal_move_returns_none() {
        let mut board = Board::empty();
        for row in 0..BOARD_SIZE {
            for col in 0..BOARD_SIZE {
                board.set(row, col, Cell::White);
            }
        }
        let state = GameState::from_board(board, Player::Black, 0.0);
        let mut agent = MinimaxAgent::new(Player::Black, 3);
        assert_eq!(agent.select_action(&state), None);
    }

    #[test]
    fn search_does_not_mutate_input() {
        let board = Board::new();
        let agent = MinimaxAgent::new(Player::White, 3);
        let _ = agent.search(&board, 3, true, Player::White);
        assert_eq!(board, Board::new());
    }

    // --- Integration tests ---

    #[test]
    fn beats_random_agent() {
        let games_per_color = 10;
        let mut minimax_wins = 0;
        let total = games_per_color * 2;

        for game in 0..total {
            let minimax_side = if game % 2 == 0 { Player::Black } else { Player::White };
            let mut minimax = MinimaxAgent::new(minimax_side, 2);
            let mut random = RandomAgent::with_seed(game as u64);
            let mut state = GameState::initial();

            while !state.is_terminal() {
                let action = if state.current_player() == minimax_side {
                    minimax.select_action(&state)
                } else {
                    random.select_action(&state)
                };
                state.step(action.unwrap()).unwrap();
            }

            if state.outcome() == Some(GameOutcome::Winner(minimax_side)) {
                minimax_wins += 1;
            }
        }

        let win_rate = minimax_wins as f64 / total as f64;
        assert!(
            win_rate > 0.5,
            "Minimax should beat random most of the time, got {:.0}% ({minimax_wins}/{total})",
            win_rate * 100.0
        );
    }

    #[test]
    fn name_includes_depth() {
        let agent = MinimaxAgent::new(Player::Black, 4);
        assert_eq!(agent.name(), "Minimax(depth=4)");
    }
}
