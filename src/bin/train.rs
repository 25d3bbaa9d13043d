use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;
use log::{info, LevelFilter};

use othello_rl::ai::QLearningAgent;
use othello_rl::config::AppConfig;
use othello_rl::game::Player;
use othello_rl::training::episode::episode_seed;
use othello_rl::training::trainer::{OpponentKind, Trainer};

/// Train a tabular Q-learning Othello agent.
#[derive(Parser)]
#[command(name = "train", about = "Train a Q-learning Othello agent")]
struct Cli {
    /// Path to TOML configuration file
    #[arg(long, default_value = "config.toml")]
    config: PathBuf,

    /// Override number of training episodes
    #[arg(long)]
    episodes: Option<usize>,

    /// Override the opponent: random, minimax or self_play
    #[arg(long)]
    opponent: Option<OpponentKind>,

    /// Override the side the learner plays: black or white
    #[arg(long)]
    side: Option<Player>,

    /// Override learning rate
    #[arg(long)]
    lr: Option<f64>,

    /// Base seed for reproducible runs
    #[arg(long)]
    seed: Option<u64>,

    /// Where to write the learned value table
    #[arg(long, default_value = "models/q_table.json")]
    output: PathBuf,

    /// Resume training from the latest checkpoint
    #[arg(long)]
    resume: bool,

    /// Print a TOML file with every default setting and exit
    #[arg(long)]
    print_default_config: bool,

    /// Log debug output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.print_default_config {
        print!("{}", AppConfig::default_toml());
        return Ok(());
    }

    let level = if cli.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    simple_logging::log_to_stderr(level);

    // Load configuration
    let mut app_config = AppConfig::load_or_default(&cli.config)
        .with_context(|| format!("loading config from {}", cli.config.display()))?;

    // Apply CLI overrides
    if let Some(episodes) = cli.episodes {
        app_config.training.num_episodes = episodes;
    }
    if let Some(opponent) = cli.opponent {
        app_config.training.opponent = opponent;
    }
    if let Some(side) = cli.side {
        app_config.training.learner_side = side;
    }
    if let Some(lr) = cli.lr {
        app_config.qlearning.learning_rate = lr;
    }
    if cli.seed.is_some() {
        app_config.training.seed = cli.seed;
    }
    app_config.validate().context("invalid configuration")?;

    let training = app_config.training.clone();
    let seed = training.seed;
    let mut learner = QLearningAgent::new(training.learner_side, app_config.qlearning.clone());
    if let Some(seed) = seed {
        learner = learner.with_seed(episode_seed(seed, 0));
    }
    let mut opponent = training.opponent.build(
        training.learner_side,
        &app_config.minimax,
        &app_config.qlearning,
        seed.map(|s| episode_seed(s, 1)),
    );

    let trainer = Trainer::new(training, app_config.checkpoint.clone());

    let start_episode = if cli.resume {
        resume_agent(&mut learner, &trainer, seed)?
    } else {
        0
    };

    let report = trainer
        .train_from(
            &mut learner,
            &mut opponent,
            app_config.env.illegal_move_penalty,
            start_episode,
        )
        .context("training failed")?;

    learner
        .table()
        .save(&cli.output)
        .with_context(|| format!("saving value table to {}", cli.output.display()))?;
    info!(
        "saved {} states ({} entries) to {}",
        learner.table().num_states(),
        learner.table().num_entries(),
        cli.output.display()
    );

    println!(
        "Trained to episode {} | final eval vs Random: {} wins, {} losses, {} draws ({:.1}%)",
        report.last_episode,
        report.final_eval.wins,
        report.final_eval.losses,
        report.final_eval.draws,
        report.final_eval.win_rate() * 100.0
    );
    Ok(())
}

/// Restore the learner from the latest checkpoint. Returns the episode the
/// checkpoint was taken at, or 0 when none is available.
fn resume_agent(
    learner: &mut QLearningAgent,
    trainer: &Trainer,
    seed: Option<u64>,
) -> Result<usize> {
    match trainer.checkpoint_manager().load_latest() {
        Ok(data) => {
            let config = learner.config().clone();
            let mut restored = QLearningAgent::with_table(learner.side(), config, data.table);
            restored
                .restore_training_state_json(&data.training_state_json)
                .context("restoring training state")?;
            if restored.side() != learner.side() {
                bail!(
                    "checkpoint was trained as {} but the learner is configured as {}",
                    restored.side(),
                    learner.side()
                );
            }
            if let Some(seed) = seed {
                restored = restored.with_seed(episode_seed(seed, data.metadata.episode));
            }
            *learner = restored;
            info!("resumed from episode {}", data.metadata.episode);
            Ok(data.metadata.episode)
        }
        Err(e) => {
            info!("no checkpoint found ({e}), starting fresh");
            Ok(0)
        }
    }
}
