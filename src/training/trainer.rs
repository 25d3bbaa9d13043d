use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use log::{error, info};

use crate::ai::{Agent, MinimaxAgent, MinimaxConfig, QLearningAgent, QLearningConfig, RandomAgent};
use crate::checkpoint::{CheckpointManager, CheckpointManagerConfig, CheckpointMetrics};
use crate::error::TrainingError;
use crate::game::Player;
use crate::training::episode::{episode_seed, evaluate, play_training_episode, EvalSummary, Opponent};
use crate::training::metrics::TrainingMetrics;

/// Who the learner trains against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OpponentKind {
    #[default]
    Random,
    Minimax,
    /// A second Q-learning agent on the other color, learning in parallel.
    SelfPlay,
}

impl OpponentKind {
    /// Build the opponent for a learner playing `learner_side`.
    pub fn build(
        self,
        learner_side: Player,
        minimax: &MinimaxConfig,
        qlearning: &QLearningConfig,
        seed: Option<u64>,
    ) -> Opponent {
        let side = learner_side.other();
        match self {
            OpponentKind::Random => Opponent::Fixed(Box::new(match seed {
                Some(seed) => RandomAgent::with_seed(seed),
                None => RandomAgent::new(),
            })),
            OpponentKind::Minimax => Opponent::Fixed(Box::new(MinimaxAgent::new(side, minimax.depth))),
            OpponentKind::SelfPlay => {
                let agent = QLearningAgent::new(side, qlearning.clone());
                Opponent::Learner(match seed {
                    Some(seed) => agent.with_seed(seed),
                    None => agent,
                })
            }
        }
    }
}

impl fmt::Display for OpponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OpponentKind::Random => "random",
            OpponentKind::Minimax => "minimax",
            OpponentKind::SelfPlay => "self_play",
        };
        f.write_str(name)
    }
}

impl FromStr for OpponentKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('-', "_").as_str() {
            "random" => Ok(OpponentKind::Random),
            "minimax" => Ok(OpponentKind::Minimax),
            "self_play" | "selfplay" | "self" => Ok(OpponentKind::SelfPlay),
            other => Err(format!(
                "unknown opponent '{other}' (expected random, minimax or self_play)"
            )),
        }
    }
}

/// Trainer configuration.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct TrainerConfig {
    pub num_episodes: usize,
    pub log_interval: usize,
    /// Episodes between evaluations against a random player; 0 disables.
    pub eval_interval: usize,
    pub eval_games: usize,
    /// Episodes between checkpoints; 0 disables.
    pub checkpoint_interval: usize,
    pub seed: Option<u64>,
    pub opponent: OpponentKind,
    pub learner_side: Player,
}

impl Default for TrainerConfig {
    fn default() -> Self {
        TrainerConfig {
            num_episodes: 10_000,
            log_interval: 1000,
            eval_interval: 5000,
            eval_games: 100,
            checkpoint_interval: 10_000,
            seed: None,
            opponent: OpponentKind::Random,
            learner_side: Player::Black,
        }
    }
}

/// Summary of a finished training run.
#[derive(Debug, Clone)]
pub struct TrainingReport {
    /// Last episode number played (includes any resume offset).
    pub last_episode: usize,
    pub episodes_played: usize,
    pub final_eval: EvalSummary,
    pub table_states: usize,
    pub last_checkpoint: Option<PathBuf>,
}

/// Episode-loop trainer for Q-learning agents.
pub struct Trainer {
    config: TrainerConfig,
    checkpoint_manager: CheckpointManager,
}

impl Trainer {
    pub fn new(config: TrainerConfig, checkpoint: CheckpointManagerConfig) -> Self {
        Trainer {
            config,
            checkpoint_manager: CheckpointManager::new(checkpoint),
        }
    }

    pub fn config(&self) -> &TrainerConfig {
        &self.config
    }

    pub fn checkpoint_manager(&self) -> &CheckpointManager {
        &self.checkpoint_manager
    }

    /// Run the full training loop from episode 1.
    pub fn train(
        &self,
        learner: &mut QLearningAgent,
        opponent: &mut Opponent,
        illegal_move_penalty: f64,
    ) -> Result<TrainingReport, TrainingError> {
        self.train_from(learner, opponent, illegal_move_penalty, 0)
    }

    /// Run the training loop continuing after `start_episode` episodes
    /// already played (used when resuming from a checkpoint).
    pub fn train_from(
        &self,
        learner: &mut QLearningAgent,
        opponent: &mut Opponent,
        illegal_move_penalty: f64,
        start_episode: usize,
    ) -> Result<TrainingReport, TrainingError> {
        let mut metrics = self.new_metrics();
        let first = start_episode + 1;
        let end_episode = start_episode + self.config.num_episodes;
        let side = learner.side();
        let mut last_checkpoint = None;

        info!(
            "starting Q-learning training as {side} vs {} for {} episodes (episodes {first}..={end_episode})",
            opponent.name(),
            self.config.num_episodes,
        );

        for episode in first..=end_episode {
            let trace = play_training_episode(learner, opponent, illegal_move_penalty)?;
            metrics.record_td_error(trace.mean_abs_td_error());
            metrics.record_episode(trace.result);

            if self.config.log_interval > 0 && episode % self.config.log_interval == 0 {
                let window = self.config.log_interval;
                info!(
                    "episode {episode}/{end_episode} | eps: {:.4} | td: {:.4} | win({window}): {:.1}% | draw: {:.1}% | avg_len: {:.1} | states: {}",
                    learner.epsilon(),
                    metrics.average_td_error(window),
                    metrics.win_rate(side, window) * 100.0,
                    metrics.draw_rate(window) * 100.0,
                    metrics.average_game_length(window),
                    learner.table().num_states(),
                );
            }

            let mut eval = None;
            if self.config.eval_interval > 0 && episode % self.config.eval_interval == 0 {
                let summary = self.evaluate(learner, episode)?;
                info!(
                    "  >> eval vs Random ({} games): {:.1}% win rate ({}W/{}L/{}D)",
                    summary.games(),
                    summary.win_rate() * 100.0,
                    summary.wins,
                    summary.losses,
                    summary.draws,
                );
                eval = Some(summary);
            }

            if self.config.checkpoint_interval > 0 && episode % self.config.checkpoint_interval == 0 {
                let summary = match eval {
                    Some(summary) => summary,
                    None => self.evaluate(learner, episode)?,
                };
                let window = self.config.log_interval.max(1);
                let ckpt_metrics = CheckpointMetrics {
                    win_rate: summary.win_rate(),
                    draw_rate: metrics.draw_rate(window),
                    average_game_length: metrics.average_game_length(window),
                    average_td_error: metrics.average_td_error(window),
                    table_states: learner.table().num_states(),
                    training_steps: learner.update_count(),
                };
                match self
                    .checkpoint_manager
                    .save_checkpoint(learner, &ckpt_metrics, episode)
                {
                    Ok(path) => last_checkpoint = Some(path),
                    Err(e) => error!("checkpoint at episode {episode} failed: {e}"),
                }
            }
        }

        let final_eval = self.evaluate(learner, end_episode + 1)?;
        info!(
            "training complete after {} episodes, final eval vs Random: {:.1}% win rate ({}W/{}L/{}D)",
            metrics.total_episodes(),
            final_eval.win_rate() * 100.0,
            final_eval.wins,
            final_eval.losses,
            final_eval.draws,
        );

        Ok(TrainingReport {
            last_episode: end_episode,
            episodes_played: metrics.total_episodes(),
            final_eval,
            table_states: learner.table().num_states(),
            last_checkpoint,
        })
    }

    /// Rolling metrics sized so every logged window is fully covered.
    fn new_metrics(&self) -> TrainingMetrics {
        TrainingMetrics::with_capacity(self.config.log_interval.max(1))
    }

    /// Evaluate the learner greedily against a random player.
    pub fn evaluate(
        &self,
        learner: &mut QLearningAgent,
        round: usize,
    ) -> Result<EvalSummary, TrainingError> {
        let mut random = match self.config.seed {
            Some(seed) => RandomAgent::with_seed(episode_seed(seed, round)),
            None => RandomAgent::new(),
        };
        evaluate(learner, &mut random, self.config.eval_games)
    }
}
