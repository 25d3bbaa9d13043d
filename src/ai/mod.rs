mod agent;
pub mod minimax;
pub mod qlearning;
mod random;
pub mod state_key;
pub mod value_table;

pub use agent::Agent;
pub use minimax::{CornerHeuristic, Heuristic, MinimaxAgent, MinimaxConfig};
pub use qlearning::{QLearningAgent, QLearningConfig};
pub use random::RandomAgent;
pub use state_key::StateKey;
pub use value_table::LearnedValueTable;
