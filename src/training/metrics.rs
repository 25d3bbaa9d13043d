use std::collections::VecDeque;

use crate::game::Player;

/// Result of a single episode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EpisodeResult {
    pub winner: Option<Player>,
    pub game_length: usize,
}

/// Training metrics tracker with rolling window computations.
pub struct TrainingMetrics {
    episode_results: VecDeque<EpisodeResult>,
    td_errors: VecDeque<f64>,
    capacity: usize,
    total_episodes: usize, // lifetime count, never capped
}

impl TrainingMetrics {
    pub fn with_capacity(capacity: usize) -> Self {
        TrainingMetrics {
            episode_results: VecDeque::with_capacity(capacity),
            td_errors: VecDeque::with_capacity(capacity),
            capacity,
            total_episodes: 0,
        }
    }

    pub fn new() -> Self {
        Self::with_capacity(100)
    }

    pub fn record_episode(&mut self, result: EpisodeResult) {
        self.total_episodes += 1;
        self.episode_results.push_back(result);
        if self.episode_results.len() > self.capacity {
            self.episode_results.pop_front();
        }
    }

    /// Record the mean absolute TD error of one episode's updates.
    pub fn record_td_error(&mut self, td_error: f64) {
        self.td_errors.push_back(td_error.abs());
        if self.td_errors.len() > self.capacity {
            self.td_errors.pop_front();
        }
    }

    fn last_n(&self, last_n: usize) -> impl Iterator<Item = &EpisodeResult> {
        self.episode_results.iter().rev().take(last_n)
    }

    fn window(&self, last_n: usize) -> usize {
        self.episode_results.len().min(last_n)
    }

    /// Win rate for `player` in the last N episodes.
    pub fn win_rate(&self, player: Player, last_n: usize) -> f32 {
        let n = self.window(last_n);
        if n == 0 {
            return 0.0;
        }
        let wins = self
            .last_n(n)
            .filter(|r| r.winner == Some(player))
            .count();
        wins as f32 / n as f32
    }

    /// Draw rate in the last N episodes.
    pub fn draw_rate(&self, last_n: usize) -> f32 {
        let n = self.window(last_n);
        if n == 0 {
            return 0.0;
        }
        let draws = self.last_n(n).filter(|r| r.winner.is_none()).count();
        draws as f32 / n as f32
    }

    /// Average absolute TD error over the last N episodes.
    pub fn average_td_error(&self, last_n: usize) -> f32 {
        let n = self.td_errors.len().min(last_n);
        if n == 0 {
            return 0.0;
        }
        let sum: f64 = self.td_errors.iter().rev().take(n).sum();
        (sum / n as f64) as f32
    }

    /// Average game length (moves played) over the last N episodes.
    pub fn average_game_length(&self, last_n: usize) -> f32 {
        let n = self.window(last_n);
        if n == 0 {
            return 0.0;
        }
        let total: usize = self.last_n(n).map(|r| r.game_length).sum();
        total as f32 / n as f32
    }

    pub fn total_episodes(&self) -> usize {
        self.total_episodes
    }

    /// Number of recent episodes the rolling window keeps.
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for TrainingMetrics {
    fn default() -> Self {
        Self::new()
    }
}
