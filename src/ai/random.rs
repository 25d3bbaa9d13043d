use crate::game::GameState;
use rand::Rng;
use rand::rngs::StdRng;
use rand::SeedableRng;

use super::agent::Agent;

/// An agent that selects uniformly at random from legal actions.
pub struct RandomAgent {
    rng: StdRng,
}

impl RandomAgent {
    pub fn new() -> Self {
        RandomAgent {
            rng: StdRng::from_os_rng(),
        }
    }

    /// Reproducible agent: the same seed replays the same choices.
    pub fn with_seed(seed: u64) -> Self {
        RandomAgent {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Default for RandomAgent {
    fn default() -> Self {
        Self::new()
    }
}

impl Agent for RandomAgent {
    fn select_action(&mut self, state: &GameState) -> Option<usize> {
        let actions = state.legal_actions();
        if actions.is_empty() {
            return None;
        }
        let idx = self.rng.random_range(0..actions.len());
        Some(actions[idx])
    }

    fn name(&self) -> &str {
        "Random"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{Board, Cell, Player, BOARD_SIZE};

    #[test]
    fn test_random_agent_selects_legal_action() {
        let mut agent = RandomAgent::new();
        let state = GameState::initial();
        let legal = state.legal_actions();

        for _ in 0..100 {
            let action = agent.select_action(&state).unwrap();
            assert!(legal.contains(&action), "Action {} is not legal", action);
        }
    }

    #[test]
    fn test_random_agent_plays_full_game() {
        let mut agent1 = RandomAgent::new();
        let mut agent2 = RandomAgent::new();
        let mut state = GameState::initial();

        while !state.is_terminal() {
            let action = match state.current_player() {
                Player::Black => agent1.select_action(&state),
                Player::White => agent2.select_action(&state),
            };
            let result = state.step(action.unwrap()).unwrap();
            assert!(!result.info.illegal);
        }

        assert!(state.outcome().is_some());
    }

    #[test]
    fn test_seeded_agents_agree() {
        let mut a = RandomAgent::with_seed(7);
        let mut b = RandomAgent::with_seed(7);
        let mut state_a = GameState::initial();
        let mut state_b = GameState::initial();

        while !state_a.is_terminal() {
            let action_a = a.select_action(&state_a).unwrap();
            let action_b = b.select_action(&state_b).unwrap();
            assert_eq!(action_a, action_b);
            state_a.step(action_a).unwrap();
            state_b.step(action_b).unwrap();
        }
        assert_eq!(state_a, state_b);
    }

    #[test]
    fn test_no_move_returns_none() {
        let mut board = Board::empty();
        for row in 0..BOARD_SIZE {
            for col in 0..BOARD_SIZE {
                board.set(row, col, Cell::White);
            }
        }
        let state = GameState::from_board(board, Player::Black, 0.0);
        let mut agent = RandomAgent::with_seed(1);
        assert_eq!(agent.select_action(&state), None);
    }

    #[test]
    fn test_random_agent_name() {
        let agent = RandomAgent::new();
        assert_eq!(agent.name(), "Random");
    }
}
