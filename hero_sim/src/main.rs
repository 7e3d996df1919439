//! hero_sim - run a combat scenario from the command line
//!
//! ```text
//! hero_sim scenarios/duel.toml --seed 7 --rounds 3
//! hero_sim scenarios/duel.toml --json > result.json
//! ```

use clap::Parser;
use hero_core::dice::RngDice;
use hero_core::PowerCatalog;
use hero_sim::{run_scenario, Scenario};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::error::Error;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "hero_sim", version, about = "Run a combat scenario through hero_core")]
struct Args {
    /// Scenario TOML file
    scenario: PathBuf,

    /// Seed for the dice; overrides the scenario's seed
    #[arg(long)]
    seed: Option<u64>,

    /// Rounds to run; overrides the scenario's count
    #[arg(long)]
    rounds: Option<u32>,

    /// Print the full report as JSON
    #[arg(long)]
    json: bool,
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("hero_sim=info,hero_core=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let scenario = Scenario::load(&args.scenario)?;
    let seed = args.seed.or(scenario.seed).unwrap_or_else(rand::random);
    let rounds = args.rounds.unwrap_or(scenario.rounds);
    tracing::info!(scenario = %scenario.name, seed, rounds, "starting");

    let catalog = PowerCatalog::with_defaults();
    let mut dice = RngDice::new(ChaCha8Rng::seed_from_u64(seed));
    let report = run_scenario(&scenario, &catalog, rounds, Some(seed), &mut dice)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        for action in &report.actions {
            println!("[round {}] {}", action.round, action.summary());
        }
        println!();
        for character in &report.characters {
            println!(
                "{}: STUN {}/{}, BODY {}/{}, END {}/{}",
                character.name,
                character.value(hero_core::Characteristic::Stun),
                character.max(hero_core::Characteristic::Stun),
                character.value(hero_core::Characteristic::Body),
                character.max(hero_core::Characteristic::Body),
                character.value(hero_core::Characteristic::End),
                character.max(hero_core::Characteristic::End),
            );
        }
    }
    Ok(())
}
