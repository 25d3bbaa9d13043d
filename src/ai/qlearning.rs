use rand::Rng;
use rand::rngs::StdRng;
use rand::SeedableRng;

use super::agent::Agent;
use super::state_key::StateKey;
use super::value_table::LearnedValueTable;
use crate::checkpoint::{QLearningHyperparameters, QLearningTrainingState};
use crate::game::{GameState, Player};

/// Q-learning hyperparameters.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct QLearningConfig {
    /// Step size α.
    pub learning_rate: f64,
    /// Discount γ.
    pub gamma: f64,
    /// Initial exploration rate ε.
    pub epsilon: f64,
    /// Multiplicative decay δ applied to ε after every update.
    pub epsilon_decay: f64,
    /// Floor for ε; 0.0 leaves the plain ε·δ schedule.
    pub epsilon_min: f64,
}

impl Default for QLearningConfig {
    fn default() -> Self {
        QLearningConfig {
            learning_rate: 0.1,
            gamma: 0.9,
            epsilon: 0.3,
            epsilon_decay: 0.99995,
            epsilon_min: 0.0,
        }
    }
}

/// Tabular ε-greedy Q-learning agent over compressed [`StateKey`]s.
pub struct QLearningAgent {
    side: Player,
    config: QLearningConfig,
    table: LearnedValueTable,
    epsilon: f64,
    update_count: usize,
    rng: StdRng,
}

impl QLearningAgent {
    pub fn new(side: Player, config: QLearningConfig) -> Self {
        Self::with_table(side, config, LearnedValueTable::new())
    }

    /// Agent starting from a previously learned table
    pub fn with_table(side: Player, config: QLearningConfig, table: LearnedValueTable) -> Self {
        QLearningAgent {
            side,
            epsilon: config.epsilon,
            config,
            table,
            update_count: 0,
            rng: StdRng::from_os_rng(),
        }
    }

    /// Replace the exploration RNG with a seeded one
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    pub fn side(&self) -> Player {
        self.side
    }

    pub fn config(&self) -> &QLearningConfig {
        &self.config
    }

    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }

    pub fn set_epsilon(&mut self, epsilon: f64) {
        self.epsilon = epsilon;
    }

    pub fn update_count(&self) -> usize {
        self.update_count
    }

    pub fn table(&self) -> &LearnedValueTable {
        &self.table
    }

    pub fn into_table(self) -> LearnedValueTable {
        self.table
    }

    /// Key for `state` from this agent's point of view
    pub fn state_key(&self, state: &GameState) -> StateKey {
        StateKey::from_state(state, self.side)
    }

    /// One-step Q-learning update. Returns the TD error.
    ///
    /// `Q[s,a] += α · (r + γ · max_a' Q[s',a'] · (1 - done) − Q[s,a])`
    pub fn update(
        &mut self,
        state_key: &StateKey,
        action: usize,
        reward: f64,
        next_state_key: &StateKey,
        done: bool,
    ) -> f64 {
        let future = if done {
            0.0
        } else {
            self.table.max_value(next_state_key)
        };
        let alpha = self.config.learning_rate;
        let target = reward + self.config.gamma * future;

        let q = self.table.value_mut(state_key, action);
        let td_error = target - *q;
        *q += alpha * td_error;

        self.update_count += 1;
        self.epsilon = (self.epsilon * self.config.epsilon_decay).max(self.config.epsilon_min);
        td_error
    }

    /// Switch to greedy play. Returns the ε to hand back to `exit_eval_mode`.
    pub fn enter_eval_mode(&mut self) -> f64 {
        std::mem::replace(&mut self.epsilon, 0.0)
    }

    pub fn exit_eval_mode(&mut self, saved_epsilon: f64) {
        self.epsilon = saved_epsilon;
    }

    pub fn training_state(&self) -> QLearningTrainingState {
        QLearningTrainingState {
            side: self.side,
            epsilon: self.epsilon,
            update_count: self.update_count,
            learning_rate: self.config.learning_rate,
            gamma: self.config.gamma,
            epsilon_decay: self.config.epsilon_decay,
            epsilon_min: self.config.epsilon_min,
        }
    }

    pub fn restore_training_state(&mut self, state: &QLearningTrainingState) {
        self.side = state.side;
        self.epsilon = state.epsilon;
        self.update_count = state.update_count;
        self.config.learning_rate = state.learning_rate;
        self.config.gamma = state.gamma;
        self.config.epsilon_decay = state.epsilon_decay;
        self.config.epsilon_min = state.epsilon_min;
    }

    pub fn restore_training_state_json(&mut self, json: &str) -> Result<(), serde_json::Error> {
        let state: QLearningTrainingState = serde_json::from_str(json)?;
        self.restore_training_state(&state);
        Ok(())
    }

    pub fn training_state_json(&self) -> String {
        serde_json::to_string_pretty(&self.training_state())
            .expect("Q-learning training state serializes")
    }

    pub fn hyperparameters(&self) -> QLearningHyperparameters {
        QLearningHyperparameters {
            side: self.side,
            learning_rate: self.config.learning_rate,
            gamma: self.config.gamma,
            epsilon: self.epsilon,
            epsilon_start: self.config.epsilon,
            epsilon_decay: self.config.epsilon_decay,
            epsilon_min: self.config.epsilon_min,
        }
    }

    /// Highest-valued legal action, first one on ties
    fn greedy_action(&self, key: &StateKey, legal: &[usize]) -> usize {
        let mut best = legal[0];
        let mut best_value = self.table.get(key, best);
        for &action in &legal[1..] {
            let value = self.table.get(key, action);
            if value > best_value {
                best = action;
                best_value = value;
            }
        }
        best
    }
}

impl Agent for QLearningAgent {
    fn select_action(&mut self, state: &GameState) -> Option<usize> {
        let legal = state.legal_actions();
        if legal.is_empty() {
            return None;
        }

        let key = self.state_key(state);
        if !self.table.contains_state(&key) || self.rng.random_range(0.0..1.0) < self.epsilon {
            let idx = self.rng.random_range(0..legal.len());
            return Some(legal[idx]);
        }

        Some(self.greedy_action(&key, &legal))
    }

    fn name(&self) -> &str {
        "Q-Learning"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{Board, Cell, BOARD_SIZE};

    fn config(learning_rate: f64, gamma: f64, epsilon: f64, epsilon_decay: f64) -> QLearningConfig {
        QLearningConfig {
            learning_rate,
            gamma,
            epsilon,
            epsilon_decay,
            epsilon_min: 0.0,
        }
    }

    #[test]
    fn test_update_rule() {
        let mut agent = QLearningAgent::new(Player::Black, config(0.5, 0.9, 0.5, 0.5));
        let s0 = agent.state_key(&GameState::initial());
        let (after, _) = GameState::initial().apply_action(19).unwrap();
        let s1 = agent.state_key(&after);

        // Unseen next state contributes 0.
        let td = agent.update(&s0, 19, 1.0, &s1, false);
        assert!((td - 1.0).abs() < 1e-12);
        assert!((agent.table().get(&s0, 19) - 0.5).abs() < 1e-12);

        // Terminal transition ignores the future term.
        agent.update(&s1, 20, 1.0, &s0, true);
        assert!((agent.table().get(&s1, 20) - 0.5).abs() < 1e-12);

        // Bootstrapping from s1: 0.5 + 0.5 * (0 + 0.9 * 0.5 - 0.5)
        agent.update(&s0, 19, 0.0, &s1, false);
        assert!((agent.table().get(&s0, 19) - 0.475).abs() < 1e-12);

        assert_eq!(agent.update_count(), 3);
        assert!((agent.epsilon() - 0.0625).abs() < 1e-12);
    }

    #[test]
    fn test_done_ignores_next_state() {
        let mut agent = QLearningAgent::new(Player::Black, config(1.0, 1.0, 0.0, 1.0));
        let s0 = agent.state_key(&GameState::initial());
        let s1 = agent.state_key(&GameState::initial().apply_action(26).unwrap().0);
        agent.table.set(&s1, 20, 10.0);

        agent.update(&s0, 26, -1.0, &s1, true);
        assert_eq!(agent.table().get(&s0, 26), -1.0);

        agent.update(&s0, 26, -1.0, &s1, false);
        assert_eq!(agent.table().get(&s0, 26), 9.0);
    }

    #[test]
    fn test_epsilon_floor() {
        let mut agent = QLearningAgent::new(
            Player::White,
            QLearningConfig {
                epsilon: 0.2,
                epsilon_decay: 0.1,
                epsilon_min: 0.05,
                ..Default::default()
            },
        );
        let key = agent.state_key(&GameState::initial());
        agent.update(&key, 20, 0.0, &key, true);
        assert!((agent.epsilon() - 0.05).abs() < 1e-12);
    }

    #[test]
    fn test_greedy_selects_best_action() {
        let mut agent = QLearningAgent::new(Player::Black, config(0.1, 0.9, 0.0, 1.0));
        let state = GameState::initial();
        let key = agent.state_key(&state);
        agent.table.set(&key, 37, 1.0);
        agent.table.set(&key, 26, -1.0);

        for _ in 0..20 {
            assert_eq!(agent.select_action(&state), Some(37));
        }
    }

    #[test]
    fn test_greedy_tie_breaks_to_first() {
        let mut agent = QLearningAgent::new(Player::Black, config(0.1, 0.9, 0.0, 1.0));
        let state = GameState::initial();
        let key = agent.state_key(&state);
        // Seen state, every legal action at 0.0 except a worse one first.
        agent.table.set(&key, 19, -0.5);
        agent.table.set(&key, 44, 0.0);

        assert_eq!(agent.select_action(&state), Some(26));
    }

    #[test]
    fn test_unseen_state_explores() {
        let mut agent = QLearningAgent::new(Player::Black, config(0.1, 0.9, 0.0, 1.0)).with_seed(3);
        let state = GameState::initial();
        let legal = state.legal_actions();
        for _ in 0..20 {
            let action = agent.select_action(&state).unwrap();
            assert!(legal.contains(&action));
        }
        assert!(agent.table().is_empty(), "selection must not grow the table");
    }

    #[test]
    fn test_no_legal_action_returns_none() {
        let mut board = Board::empty();
        for row in 0..BOARD_SIZE {
            for col in 0..BOARD_SIZE {
                board.set(row, col, Cell::Black);
            }
        }
        let state = GameState::from_board(board, Player::White, 0.0);
        let mut agent = QLearningAgent::new(Player::White, QLearningConfig::default());
        assert_eq!(agent.select_action(&state), None);
    }

    #[test]
    fn test_eval_mode_restores_epsilon() {
        let mut agent = QLearningAgent::new(Player::Black, config(0.1, 0.9, 0.4, 1.0));
        let saved = agent.enter_eval_mode();
        assert_eq!(agent.epsilon(), 0.0);
        agent.exit_eval_mode(saved);
        assert!((agent.epsilon() - 0.4).abs() < 1e-12);
    }

    #[test]
    fn test_training_state_roundtrip() {
        let mut agent = QLearningAgent::new(Player::White, config(0.2, 0.95, 0.8, 0.99));
        agent.set_epsilon(0.42);
        let json = agent.training_state_json();

        let mut restored = QLearningAgent::new(Player::Black, QLearningConfig::default());
        restored.restore_training_state_json(&json).unwrap();
        assert_eq!(restored.side(), Player::White);
        assert!((restored.epsilon() - 0.42).abs() < 1e-12);
        assert!((restored.config().learning_rate - 0.2).abs() < 1e-12);
        assert!((restored.config().gamma - 0.95).abs() < 1e-12);
    }

    #[test]
    fn test_name() {
        let agent = QLearningAgent::new(Player::Black, QLearningConfig::default());
        assert_eq!(agent.name(), "Q-Learning");
    }
}
