//! Headless Gridfire match runner.
//!
//! Spawns one thread per scripted participant against a shared
//! [`RoundCoordinator`] and prints the final standings.
//!
//! ```text
//! gridfire --players 4 --rounds 30 --seed 7
//! RUST_LOG=debug gridfire --config match.json
//! ```

mod bot;

use std::path::PathBuf;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::Parser;
use gridfire_core::config::MatchConfig;
use gridfire_core::{EntityId, Match, RoundCoordinator};
use tracing::info;

use bot::{Bot, BotSettings};

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Number of scripted participants
    #[arg(short, long, default_value = "4")]
    players: u64,
    /// Rounds to play
    #[arg(short, long, default_value = "20")]
    rounds: u64,
    /// Master seed; overrides the config file
    #[arg(short, long)]
    seed: Option<u64>,
    /// JSON match configuration
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Milliseconds to wait for a round before evicting stragglers
    #[arg(long, default_value = "2000")]
    round_timeout_ms: u64,
    /// Participant that stops submitting halfway through
    #[arg(long)]
    silent: Option<u64>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    if args.players == 0 {
        bail!("need at least one player");
    }

    let mut config = match &args.config {
        Some(path) => MatchConfig::from_file(path)
            .with_context(|| format!("loading match config {}", path.display()))?,
        None => MatchConfig::default(),
    };
    if let Some(seed) = args.seed {
        config.seed = seed;
    }

    let mut game = Match::new(&config).context("creating match")?;
    let ids: Vec<EntityId> = (1..=args.players).map(EntityId::new).collect();
    for id in &ids {
        let pos = game
            .add_participant(*id, &config.robot)
            .with_context(|| format!("spawning player {id}"))?;
        println!("player {id} spawned at ({}, {})", pos.x, pos.y);
    }
    info!(
        players = args.players,
        rounds = args.rounds,
        seed = config.seed,
        "match starting"
    );

    let coordinator = Arc::new(RoundCoordinator::new(game));
    let handles: Vec<_> = ids
        .iter()
        .map(|id| {
            let settings = BotSettings {
                last_round: args.rounds,
                round_timeout: Duration::from_millis(args.round_timeout_ms),
                silent_from: (args.silent == Some(id.as_u64())).then_some(args.rounds / 2 + 1),
            };
            let bot = Bot::new(*id, config.seed, settings);
            let coordinator = Arc::clone(&coordinator);
            let id = *id;
            thread::Builder::new()
                .name(format!("player-{id}"))
                .spawn(move || bot.run(&coordinator))
                .map(|handle| (id, handle))
        })
        .collect::<Result<_, _>>()
        .context("spawning participant threads")?;

    let mut outcomes = Vec::new();
    for (id, handle) in handles {
        match handle.join() {
            Ok(outcome) => outcomes.push((id, outcome)),
            Err(_) => bail!("participant thread for player {id} panicked"),
        }
    }

    coordinator.with_match(|game| {
        println!("\nafter round {}:", game.round() - 1);
        for (id, outcome) in &outcomes {
            let line = game
                .status_line(*id)
                .unwrap_or_else(|| format!("Player {id}  (left the match)"));
            println!("  {line}  [{outcome:?}]");
        }
        println!("state hash: {:016x}", game.state_hash());
    });
    Ok(())
}
