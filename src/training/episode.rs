use log::debug;

use crate::ai::{Agent, QLearningAgent, RandomAgent, StateKey};
use crate::error::TrainingError;
use crate::game::{GameOutcome, GameState, Player};
use crate::training::metrics::EpisodeResult;

/// The side facing the learner during training.
pub enum Opponent {
    /// A policy that never learns (random, minimax, a frozen table, ...).
    Fixed(Box<dyn Agent>),
    /// A second Q-learning agent updated alongside the learner.
    Learner(QLearningAgent),
}

impl Opponent {
    pub fn as_learner_mut(&mut self) -> Option<&mut QLearningAgent> {
        match self {
            Opponent::Fixed(_) => None,
            Opponent::Learner(agent) => Some(agent),
        }
    }
}

impl Agent for Opponent {
    fn select_action(&mut self, state: &GameState) -> Option<usize> {
        match self {
            Opponent::Fixed(agent) => agent.select_action(state),
            Opponent::Learner(agent) => agent.select_action(state),
        }
    }

    fn name(&self) -> &str {
        match self {
            Opponent::Fixed(agent) => agent.name(),
            Opponent::Learner(agent) => agent.name(),
        }
    }
}

/// Result of playing a single training episode.
pub struct EpisodeTrace {
    pub result: EpisodeResult,
    /// TD errors of the learner's updates, in order.
    pub td_errors: Vec<f64>,
}

impl EpisodeTrace {
    pub fn mean_abs_td_error(&self) -> f64 {
        if self.td_errors.is_empty() {
            return 0.0;
        }
        self.td_errors.iter().map(|e| e.abs()).sum::<f64>() / self.td_errors.len() as f64
    }
}

/// A finished game between two agents.
#[derive(Debug, Clone)]
pub struct GameRecord {
    pub outcome: GameOutcome,
    /// (black stones, white stones)
    pub score: (usize, usize),
    pub moves: Vec<usize>,
}

impl GameRecord {
    pub fn winner(&self) -> Option<Player> {
        match self.outcome {
            GameOutcome::Winner(p) => Some(p),
            GameOutcome::Draw => None,
        }
    }
}

/// Tally of evaluation games from one agent's point of view.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EvalSummary {
    pub wins: usize,
    pub losses: usize,
    pub draws: usize,
}

impl EvalSummary {
    pub fn games(&self) -> usize {
        self.wins + self.losses + self.draws
    }

    pub fn win_rate(&self) -> f32 {
        match self.games() {
            0 => 0.0,
            n => self.wins as f32 / n as f32,
        }
    }

    pub fn record(&mut self, winner: Option<Player>, side: Player) {
        match winner {
            Some(w) if w == side => self.wins += 1,
            Some(_) => self.losses += 1,
            None => self.draws += 1,
        }
    }
}

fn learning_agent<'a>(
    side: Player,
    learner: &'a mut QLearningAgent,
    opponent: &'a mut Opponent,
) -> Option<&'a mut QLearningAgent> {
    if learner.side() == side {
        Some(learner)
    } else {
        opponent.as_learner_mut()
    }
}

/// Ask `agent` for a move and check it against the legal set.
fn choose(agent: &mut dyn Agent, state: &GameState) -> Result<usize, TrainingError> {
    let legal = state.legal_actions();
    match agent.select_action(state) {
        Some(action) if legal.contains(&action) => Ok(action),
        Some(action) => Err(TrainingError::IllegalAction {
            agent: agent.name().to_string(),
            action,
            legal,
        }),
        None => Err(TrainingError::NoMove {
            agent: agent.name().to_string(),
        }),
    }
}

/// Play one training episode.
///
/// Every learning agent is updated right after each of its moves, using the
/// position it leaves behind as the next state. When a move ends the game,
/// the other side's last transition is also closed out with the negated
/// terminal reward, so both colors see every result.
pub fn play_training_episode(
    learner: &mut QLearningAgent,
    opponent: &mut Opponent,
    illegal_move_penalty: f64,
) -> Result<EpisodeTrace, TrainingError> {
    let learner_side = learner.side();
    let mut state = GameState::new(illegal_move_penalty);
    let mut last_transition: [Option<(StateKey, usize)>; 2] = [None, None];
    let mut td_errors = Vec::new();
    let mut game_length = 0;

    while !state.is_terminal() {
        let mover = state.current_player();
        let key = learning_agent(mover, learner, opponent).map(|agent| agent.state_key(&state));
        let action = if mover == learner_side {
            choose(learner, &state)?
        } else {
            choose(opponent, &state)?
        };

        let result = state.step(action)?;
        game_length += 1;

        if let (Some(key), Some(agent)) = (key, learning_agent(mover, learner, opponent)) {
            let next_key = agent.state_key(&state);
            let td = agent.update(&key, action, result.reward, &next_key, result.done);
            if mover == learner_side {
                td_errors.push(td);
            }
            last_transition[mover as usize] = Some((key, action));
        }

        if result.done {
            let other = mover.other();
            if let (Some((key, action)), Some(agent)) = (
                last_transition[other as usize],
                learning_agent(other, learner, opponent),
            ) {
                let next_key = agent.state_key(&state);
                let td = agent.update(&key, action, -result.reward, &next_key, true);
                if other == learner_side {
                    td_errors.push(td);
                }
            }
        }
    }

    let outcome = state.outcome().ok_or(TrainingError::MissingOutcome)?;
    let winner = match outcome {
        GameOutcome::Winner(p) => Some(p),
        GameOutcome::Draw => None,
    };
    debug!(
        "episode finished after {game_length} moves, score {:?}",
        state.board().score()
    );

    Ok(EpisodeTrace {
        result: EpisodeResult {
            winner,
            game_length,
        },
        td_errors,
    })
}

/// Play a full game and return its record. Forced passes are handled by the
/// environment, so agents are only asked when they have a move.
pub fn play_match(
    black: &mut dyn Agent,
    white: &mut dyn Agent,
    illegal_move_penalty: f64,
) -> Result<GameRecord, TrainingError> {
    let mut state = GameState::new(illegal_move_penalty);
    let mut moves = Vec::new();

    while !state.is_terminal() {
        let action = match state.current_player() {
            Player::Black => choose(black, &state)?,
            Player::White => choose(white, &state)?,
        };
        state.step(action)?;
        moves.push(action);
    }

    Ok(GameRecord {
        outcome: state.outcome().ok_or(TrainingError::MissingOutcome)?,
        score: state.board().score(),
        moves,
    })
}

/// Evaluate `agent` greedily against `opponent` over `games` games.
pub fn evaluate(
    agent: &mut QLearningAgent,
    opponent: &mut dyn Agent,
    games: usize,
) -> Result<EvalSummary, TrainingError> {
    let side = agent.side();
    let saved_epsilon = agent.enter_eval_mode();
    let mut summary = EvalSummary::default();

    let mut outcome = Ok(());
    for _ in 0..games {
        let record = match side {
            Player::Black => play_match(agent, opponent, 0.0),
            Player::White => play_match(opponent, agent, 0.0),
        };
        match record {
            Ok(record) => summary.record(record.winner(), side),
            Err(e) => {
                outcome = Err(e);
                break;
            }
        }
    }

    agent.exit_eval_mode(saved_epsilon);
    outcome.map(|_| summary)
}

/// Win rate of a uniformly random player on `side` against another random
/// player, measured over `games` seeded games.
pub fn random_baseline(side: Player, games: usize, seed: u64) -> Result<f32, TrainingError> {
    let mut summary = EvalSummary::default();
    for game in 0..games {
        let mut black = RandomAgent::with_seed(episode_seed(seed, 2 * game));
        let mut white = RandomAgent::with_seed(episode_seed(seed, 2 * game + 1));
        let record = play_match(&mut black, &mut white, 0.0)?;
        summary.record(record.winner(), side);
    }
    Ok(summary.win_rate())
}

/// Derive a deterministic seed for a given episode index.
pub fn episode_seed(base_seed: u64, episode_index: usize) -> u64 {
    // FNV-1a-inspired mixing for deterministic, well-distributed seeds
    let mut hash = base_seed ^ 0x517cc1b727220a95;
    let index = episode_index as u64;
    hash = hash.wrapping_mul(0x100000001b3);
    hash ^= index;
    hash = hash.wrapping_mul(0x100000001b3);
    hash ^= index >> 32;
    hash
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::{MinimaxAgent, QLearningConfig};

    fn learner(side: Player, seed: u64) -> QLearningAgent {
        QLearningAgent::new(side, QLearningConfig::default()).with_seed(seed)
    }

    /// Always answers with an occupied center square.
    struct CheatingAgent;

    impl Agent for CheatingAgent {
        fn select_action(&mut self, _state: &GameState) -> Option<usize> {
            Some(27)
        }

        fn name(&self) -> &str {
            "Cheater"
        }
    }

    #[test]
    fn test_training_episode_terminates_and_learns() {
        let mut agent = learner(Player::Black, 1);
        let mut opponent = Opponent::Fixed(Box::new(RandomAgent::with_seed(2)));

        let trace = play_training_episode(&mut agent, &mut opponent, 0.0).unwrap();
        assert!(trace.result.game_length > 0);
        assert!(trace.result.game_length <= 60);
        assert!(!trace.td_errors.is_empty());
        assert!(!agent.table().is_empty());
        assert_eq!(agent.update_count(), trace.td_errors.len());
    }

    #[test]
    fn test_self_play_updates_both_tables() {
        let mut agent = learner(Player::Black, 3);
        let mut opponent = Opponent::Learner(learner(Player::White, 4));

        play_training_episode(&mut agent, &mut opponent, 0.0).unwrap();
        let white = opponent.as_learner_mut().unwrap();
        assert!(!agent.table().is_empty());
        assert!(!white.table().is_empty());
        // Whoever did not make the last move still gets a terminal update.
        assert!(agent.update_count() >= 2 && white.update_count() >= 2);
    }

    #[test]
    fn test_learner_as_white() {
        let mut agent = learner(Player::White, 5);
        let mut opponent = Opponent::Fixed(Box::new(MinimaxAgent::new(Player::Black, 1)));
        let trace = play_training_episode(&mut agent, &mut opponent, 0.0).unwrap();
        assert!(!trace.td_errors.is_empty());
    }

    #[test]
    fn test_illegal_agent_is_reported() {
        let mut black = CheatingAgent;
        let mut white = RandomAgent::with_seed(0);
        let err = play_match(&mut black, &mut white, 0.0).unwrap_err();
        assert!(
            matches!(err, TrainingError::IllegalAction { action: 27, .. }),
            "got: {err}"
        );
    }

    #[test]
    fn test_play_match_record() {
        let mut black = RandomAgent::with_seed(10);
        let mut white = RandomAgent::with_seed(11);
        let record = play_match(&mut black, &mut white, 0.0).unwrap();
        assert_eq!(record.score.0 + record.score.1, 4 + record.moves.len());
        match record.outcome {
            GameOutcome::Winner(Player::Black) => assert!(record.score.0 > record.score.1),
            GameOutcome::Winner(Player::White) => assert!(record.score.1 > record.score.0),
            GameOutcome::Draw => assert_eq!(record.score.0, record.score.1),
        }
    }

    #[test]
    fn test_evaluate_counts_every_game() {
        let mut agent = learner(Player::White, 6);
        agent.set_epsilon(0.25);
        let mut random = RandomAgent::with_seed(7);
        let summary = evaluate(&mut agent, &mut random, 6).unwrap();
        assert_eq!(summary.games(), 6);
        assert!((agent.epsilon() - 0.25).abs() < 1e-12, "epsilon must be restored");
    }

    #[test]
    fn test_eval_summary() {
        let mut summary = EvalSummary::default();
        summary.record(Some(Player::Black), Player::Black);
        summary.record(Some(Player::White), Player::Black);
        summary.record(None, Player::Black);
        summary.record(Some(Player::Black), Player::Black);
        assert_eq!(summary, EvalSummary { wins: 2, losses: 1, draws: 1 });
        assert!((summary.win_rate() - 0.5).abs() < 1e-6);
        assert_eq!(EvalSummary::default().win_rate(), 0.0);
    }

    #[test]
    fn test_random_baseline_is_a_rate() {
        let rate = random_baseline(Player::Black, 10, 42).unwrap();
        assert!((0.0..=1.0).contains(&rate));
        assert_eq!(rate, random_baseline(Player::Black, 10, 42).unwrap());
    }

    #[test]
    fn test_episode_seed_deterministic() {
        assert_eq!(episode_seed(42, 100), episode_seed(42, 100));
    }

    #[test]
    fn test_episode_seed_varies() {
        let s1 = episode_seed(42, 0);
        let s2 = episode_seed(42, 1);
        let s3 = episode_seed(42, 2);
        assert_ne!(s1, s2);
        assert_ne!(s2, s3);
        assert_ne!(s1, s3);
        assert_ne!(episode_seed(1, 0), episode_seed(2, 0));
    }
}
