use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use log::{info, LevelFilter};

use othello_rl::ai::{Agent, LearnedValueTable, MinimaxAgent, QLearningAgent, QLearningConfig, RandomAgent};
use othello_rl::game::Player;
use othello_rl::training::episode::{evaluate, random_baseline};

/// Evaluate a saved Q-table greedily against a fixed opponent.
#[derive(Parser)]
#[command(name = "evaluate", about = "Evaluate a trained Othello Q-table")]
struct Cli {
    /// Saved value tables to evaluate
    #[arg(default_value = "models/q_table.json")]
    models: Vec<PathBuf>,

    /// Number of games per model
    #[arg(long, default_value_t = 200)]
    games: usize,

    /// Side the learned agent plays: black or white
    #[arg(long, default_value = "black")]
    side: Player,

    /// Play against minimax at this depth instead of a random player
    #[arg(long)]
    minimax_depth: Option<usize>,

    /// Seed for the opponent
    #[arg(long)]
    seed: Option<u64>,

    /// Log debug output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let level = if cli.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    simple_logging::log_to_stderr(level);

    for model in &cli.models {
        let table = LearnedValueTable::load(model)
            .with_context(|| format!("loading value table from {}", model.display()))?;
        info!(
            "loaded {} states ({} entries) from {}",
            table.num_states(),
            table.num_entries(),
            model.display()
        );

        let mut agent = QLearningAgent::with_table(
            cli.side,
            QLearningConfig {
                epsilon: 0.0,
                ..Default::default()
            },
            table,
        );
        let mut opponent: Box<dyn Agent> = match (cli.minimax_depth, cli.seed) {
            (Some(depth), _) => Box::new(MinimaxAgent::new(cli.side.other(), depth)),
            (None, Some(seed)) => Box::new(RandomAgent::with_seed(seed)),
            (None, None) => Box::new(RandomAgent::new()),
        };

        let summary = evaluate(&mut agent, opponent.as_mut(), cli.games)
            .with_context(|| format!("evaluating {}", model.display()))?;

        println!("Evaluating model: {}", model.display());
        println!("  {} (Q-learning) wins: {}/{}", cli.side, summary.wins, summary.games());
        println!(
            "  {} ({}) wins: {}/{}",
            cli.side.other(),
            opponent.name(),
            summary.losses,
            summary.games()
        );
        println!("  Draws: {}/{}", summary.draws, summary.games());
        if cli.minimax_depth.is_none() {
            let baseline = random_baseline(cli.side, cli.games, cli.seed.unwrap_or(0))
                .context("measuring random baseline")?;
            println!(
                "  Win rate {:.1}% (random baseline {:.1}%)",
                summary.win_rate() * 100.0,
                baseline * 100.0
            );
        }
        println!("{}", "-".repeat(40));
    }
    Ok(())
}
