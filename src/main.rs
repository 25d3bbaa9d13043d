use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use log::LevelFilter;

use othello_rl::ai::{Agent, LearnedValueTable, MinimaxAgent, QLearningAgent, QLearningConfig, RandomAgent};
use othello_rl::config::AppConfig;
use othello_rl::game::{action_to_coords, GameOutcome, GameState, Player};
use othello_rl::training::episode::EvalSummary;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum AgentKind {
    Random,
    Minimax,
    Qlearning,
}

/// Play Othello between two computer agents on the console.
#[derive(Parser)]
#[command(name = "othello", about = "Play Othello between AI agents")]
struct Cli {
    /// Agent playing Black
    #[arg(long, value_enum, default_value = "minimax")]
    black: AgentKind,

    /// Agent playing White
    #[arg(long, value_enum, default_value = "random")]
    white: AgentKind,

    /// Minimax search depth (defaults to the config value)
    #[arg(long)]
    depth: Option<usize>,

    /// Value table used by Q-learning agents
    #[arg(long, default_value = "models/q_table.json")]
    model: PathBuf,

    /// Number of games; boards are printed only for a single game
    #[arg(long, default_value_t = 1)]
    games: usize,

    /// Seed for random agents
    #[arg(long)]
    seed: Option<u64>,

    /// Path to TOML configuration file
    #[arg(long, default_value = "config.toml")]
    config: PathBuf,

    /// Log debug output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let level = if cli.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    };
    simple_logging::log_to_stderr(level);

    let config = AppConfig::load_or_default(&cli.config)
        .with_context(|| format!("loading config from {}", cli.config.display()))?;
    let depth = cli.depth.unwrap_or(config.minimax.depth);
    if cli.games == 0 {
        bail!("--games must be at least 1");
    }

    let mut black = build_agent(cli.black, Player::Black, depth, &cli)?;
    let mut white = build_agent(cli.white, Player::White, depth, &cli)?;
    let show = cli.games == 1;

    let mut tally = EvalSummary::default();
    for _ in 0..cli.games {
        let winner = play(
            black.as_mut(),
            white.as_mut(),
            config.env.illegal_move_penalty,
            show,
        )?;
        tally.record(winner, Player::Black);
    }

    if !show {
        println!(
            "{} (Black) vs {} (White) over {} games",
            black.name(),
            white.name(),
            tally.games()
        );
        println!("  Black wins: {}", tally.wins);
        println!("  White wins: {}", tally.losses);
        println!("  Draws:      {}", tally.draws);
    }
    Ok(())
}

fn build_agent(kind: AgentKind, side: Player, depth: usize, cli: &Cli) -> Result<Box<dyn Agent>> {
    Ok(match kind {
        AgentKind::Random => match cli.seed {
            Some(seed) => Box::new(RandomAgent::with_seed(seed.wrapping_add(side as u64))),
            None => Box::new(RandomAgent::new()),
        },
        AgentKind::Minimax => Box::new(MinimaxAgent::new(side, depth)),
        AgentKind::Qlearning => {
            let table = LearnedValueTable::load(&cli.model)
                .with_context(|| format!("loading value table from {}", cli.model.display()))?;
            let config = QLearningConfig {
                epsilon: 0.0,
                ..Default::default()
            };
            Box::new(QLearningAgent::with_table(side, config, table))
        }
    })
}

fn play<'a>(
    black: &'a mut dyn Agent,
    white: &'a mut dyn Agent,
    illegal_move_penalty: f64,
    show: bool,
) -> Result<Option<Player>> {
    let mut state = GameState::new(illegal_move_penalty);
    if show {
        println!("{}", state.board());
    }

    while !state.is_terminal() {
        let player = state.current_player();
        let agent = match player {
            Player::Black => &mut *black,
            Player::White => &mut *white,
        };
        let Some(action) = agent.select_action(&state) else {
            bail!("{} returned no move for {player} with legal moves available", agent.name());
        };
        let result = state.step(action)?;
        if result.info.illegal {
            bail!("{} played illegal move {action}", agent.name());
        }
        if show {
            let (row, col) = action_to_coords(action).unwrap_or_default();
            println!(
                "{player} ({}) plays ({row}, {col}), flipping {}",
                agent.name(),
                result.info.flipped.len()
            );
            println!("{}", state.board());
            if !result.done && state.current_player() == player {
                println!("{} has no legal move and passes", player.other());
            }
        }
    }

    let (b, w) = state.board().score();
    let outcome = state.outcome().context("finished game has no outcome")?;
    if show {
        match outcome {
            GameOutcome::Winner(p) => println!("{p} wins {b}-{w}"),
            GameOutcome::Draw => println!("Draw {b}-{w}"),
        }
    }
    Ok(match outcome {
        GameOutcome::Winner(p) => Some(p),
        GameOutcome::Draw => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_play_mixed_agents_to_the_end() {
        let mut black = MinimaxAgent::new(Player::Black, 1);
        let mut white = RandomAgent::with_seed(3);
        for _ in 0..3 {
            play(&mut black, &mut white, 0.0, false).unwrap();
        }
    }

    #[test]
    fn test_play_is_reproducible_with_seeded_agents() {
        let first = play(
            &mut RandomAgent::with_seed(8),
            &mut RandomAgent::with_seed(9),
            0.0,
            false,
        )
        .unwrap();
        let second = play(
            &mut RandomAgent::with_seed(8),
            &mut RandomAgent::with_seed(9),
            0.0,
            false,
        )
        .unwrap();
        assert_eq!(first, second);
    }
}
