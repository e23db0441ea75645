//! Computes the payouts of a clue game described by a JSON configuration.

use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use clue_shapley::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "clue-payout")]
#[command(version, about, long_about = None)]
struct Args {
    /// Game configuration (players, clues, weights)
    #[arg(short, long, default_value = "clues.json")]
    config: PathBuf,

    /// Override the grid size
    #[arg(long)]
    grid_size: Option<usize>,

    /// Override the number of sampled permutations
    #[arg(short, long)]
    samples: Option<usize>,

    /// Override the sampler seed
    #[arg(long)]
    seed: Option<u64>,

    /// Value coalitions by the coins recorded in this ledger instead of by clues
    #[arg(long)]
    ledger: Option<PathBuf>,

    /// Spread the work over all cores
    #[arg(short, long)]
    parallel: bool,

    /// Print the value of every coalition
    #[arg(long)]
    show_values: bool,

    /// Print each agent's compiled region
    #[arg(long)]
    show_regions: bool,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,
}

fn init_tracing(debug: bool) {
    let default = if debug { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt().with_env_filter(filter).with_target(false).init();
}

fn print_payouts(game: &ClueGame, payouts: &ShapleyVector) {
    println!("{:<16} {:>6} {:>8} {:>12}", "Player", "Weight", "Region", "Payout");
    for (agent, payout) in game.agents().iter().zip(payouts.iter()) {
        println!(
            "{:<16} {:>6} {:>8} {:>12.2}",
            agent.name,
            agent.weight,
            agent.region().len(),
            payout
        );
    }
    println!("{:<16} {:>6} {:>8} {:>12.2}", "Total", "", "", payouts.total());
}

/// Exit status for errors caused by bad input (configuration, ledger, arguments).
const EXIT_INVALID_INPUT: i32 = 2;

fn main() {
    let args = Args::parse();
    init_tracing(args.debug);
    if let Err(err) = run(&args) {
        eprintln!("Error: {err:#}");
        let invalid = err
            .downcast_ref::<PayoutError>()
            .is_some_and(PayoutError::is_invalid_input);
        std::process::exit(if invalid { EXIT_INVALID_INPUT } else { 1 });
    }
}

fn run(args: &Args) -> Result<()> {
    let mut config = GameConfig::from_path(&args.config)
        .with_context(|| format!("loading {}", args.config.display()))?;
    if let Some(grid_size) = args.grid_size {
        config.grid_size = grid_size;
    }
    if let Some(samples) = args.samples {
        config.samples = samples;
    }
    if args.seed.is_some() {
        config.seed = args.seed;
    }
    config.validate()?;
    let seed = config.seed.unwrap_or_else(rand::random);
    info!(players = config.players.len(), grid_size = config.grid_size, samples = config.samples, seed, "loaded game");

    let now = Instant::now();
    let game = ClueGame::from_config(&config)?;
    if args.show_regions {
        for agent in game.agents() {
            println!("{} ({}): {}\n{}", agent.name, agent.short_name(), agent.clue, agent.region());
        }
    }

    let estimator = ShapleyEstimator::new(config.samples);
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let payouts = match &args.ledger {
        Some(path) => {
            let ledger = Ledger::from_path(path).with_context(|| format!("loading {}", path.display()))?;
            if let Some(ag) = ledger.max_agent()
                && ag >= game.agent_count()
            {
                return Err(PayoutError::AgentCountMismatch {
                    expected: game.agent_count(),
                    found: ag + 1,
                })
                .with_context(|| format!("ledger {} mentions agent {ag}", path.display()));
            }
            if args.show_values {
                for entry in ledger.entries() {
                    println!("{:<20} {:>8}", entry.members.label(|ag| game[ag].short_name()), entry.coins);
                }
            }
            if args.parallel {
                estimator.estimate_parallel(&ledger, game.agent_count(), &game.weights(), seed)?
            } else {
                game.payouts_from(&ledger, &estimator, &mut rng)?
            }
        }
        None => {
            let resolution = if args.parallel {
                game.resolve_parallel(&estimator, seed)?
            } else {
                game.resolve(&estimator, &mut rng)?
            };
            if args.show_values {
                for (label, value) in resolution.values.labeled(game.agents()) {
                    println!("{label:<20} {value:>8}");
                }
            }
            resolution.payouts
        }
    };

    print_payouts(&game, &payouts);
    info!(elapsed_ms = now.elapsed().as_millis() as u64, "done");
    Ok(())
}
