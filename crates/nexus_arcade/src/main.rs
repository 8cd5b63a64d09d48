//! Nexus Arcade - unified CLI

#![warn(missing_docs)]

mod cli;

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::Parser;
use cli::{Cli, Command};
use nexus_arcade::{
    ArcadeConfig, Leaderboard, LightsView, LocalProfile, MemorySession, ReactionSession,
    ScoreAdapter, StatField, UserRecordStore, UserRepository,
};
use nexus_memory::roster::{CLASSIC_GRID, FULL_GRID, names};
use nexus_memory::{DeckBuilder, MatchResolver, ResolverStatus, TapOutcome};
use nexus_reaction::{LightPhase, PressOutcome};
use nexus_tictactoe::{Game, Outcome, Position};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, instrument};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => ArcadeConfig::from_file(path)?,
        None => ArcadeConfig::default(),
    }
    .with_env_overrides();

    match cli.command {
        Command::Leaderboard { by, limit } => run_leaderboard(&config, by, limit).await,
        Command::Profile { name } => run_profile(&config, name).await,
        Command::Reaction { name, seed } => run_reaction(&config, name, seed).await,
        Command::Memory { name, seed, pairs } => run_memory(&config, name, seed, pairs).await,
        Command::Tictactoe => run_tictactoe().await,
    }
}

fn open_store(config: &ArcadeConfig) -> Result<Arc<dyn UserRecordStore>> {
    let repository = UserRepository::open(config.database_url())
        .with_context(|| format!("Opening database '{}'", config.database_url()))?;
    Ok(Arc::new(repository))
}

fn seeded_rng(seed: Option<u64>) -> ChaCha8Rng {
    match seed {
        Some(seed) => ChaCha8Rng::seed_from_u64(seed),
        None => ChaCha8Rng::from_entropy(),
    }
}

async fn signed_in_adapter(config: &ArcadeConfig, name: Option<String>) -> Result<ScoreAdapter> {
    let scores = ScoreAdapter::new(open_store(config)?);
    if let Some(name) = name {
        match scores.sign_in(&LocalProfile::new(name)).await {
            Some(identity) => println!("Playing as {}", identity.display_name()),
            None => println!("Sign-in failed, playing anonymously"),
        }
    }
    Ok(scores)
}

/// Print the leaderboard for one stat
#[instrument(skip(config))]
async fn run_leaderboard(config: &ArcadeConfig, by: StatField, limit: Option<usize>) -> Result<()> {
    let size = *config.leaderboard_size();
    let leaderboard = Leaderboard::new(open_store(config)?, size);
    let snapshot = leaderboard.fetch_top(by, limit.unwrap_or(size)).await?;

    println!("Top players by {} ({})", by, snapshot.taken_at().format("%Y-%m-%d %H:%M UTC"));
    if snapshot.is_empty() {
        println!("  nobody yet");
    }
    for entry in snapshot.entries() {
        println!("{:>4}. {:<24} {}", entry.rank(), entry.display_name(), entry.value());
    }
    Ok(())
}

/// Sign in and print the stored record
#[instrument(skip(config))]
async fn run_profile(config: &ArcadeConfig, name: String) -> Result<()> {
    let scores = ScoreAdapter::new(open_store(config)?);
    if scores.sign_in(&LocalProfile::new(name)).await.is_none() {
        bail!("Sign-in failed");
    }
    let Some(record) = scores.local_record() else {
        bail!("No record after sign-in");
    };

    println!("{} ({})", record.display_name(), record.user_id());
    println!("  wins       {}", record.wins());
    println!("  losses     {}", record.losses());
    println!("  matches    {}", record.matches());
    println!("  win rate   {:.1}%", record.win_rate());
    match record.best_reaction_ms() {
        Some(ms) => println!("  best react {} ms", ms),
        None => println!("  best react -"),
    }
    println!("  total xp   {}", record.total_xp());
    if !scores.is_synced() {
        println!("  (store unavailable, showing local values)");
    }
    Ok(())
}

fn render_lights(view: LightsView, lights: u8) -> String {
    let bulbs: Vec<&str> = (0..lights)
        .map(|i| if i < view.lit { "●" } else { "○" })
        .collect();
    format!("{}  [{}]", bulbs.join(" "), view.phase)
}

/// Line-mode reaction rounds
#[instrument(skip(config))]
async fn run_reaction(config: &ArcadeConfig, name: Option<String>, seed: Option<u64>) -> Result<()> {
    let scores = signed_in_adapter(config, name).await?;
    let lights = config.reaction().lights;
    let mut session = ReactionSession::new(*config.reaction(), seeded_rng(seed), scores.clone());
    let mut view = session.subscribe();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    if let Some(best) = session.best_ms() {
        println!("Personal best: {} ms", best);
    }
    println!("Enter starts a run. Press Enter again when the lights go out. Ctrl-D quits.");

    loop {
        tokio::select! {
            line = lines.next_line() => {
                if line?.is_none() {
                    break;
                }
                match session.view().phase {
                    LightPhase::Idle | LightPhase::Foul | LightPhase::Result => {
                        session.start();
                    }
                    LightPhase::Counting | LightPhase::Ready => match session.press() {
                        outcome @ PressOutcome::Foul => println!("{} Enter to try again.", outcome),
                        PressOutcome::Reaction(reaction) => {
                            let best = if reaction.personal_best { "  new personal best" } else { "" };
                            println!("{}{}", reaction, best);
                        }
                        PressOutcome::Ignored(_) => {}
                    },
                }
            }
            changed = view.changed() => {
                if changed.is_err() {
                    break;
                }
                let current = *view.borrow_and_update();
                if matches!(current.phase, LightPhase::Counting | LightPhase::Ready) {
                    println!("{}", render_lights(current, lights));
                }
            }
        }
    }

    session.cancel();
    scores.flush().await;
    info!("Reaction session ended");
    Ok(())
}

fn render_deck(resolver: &MatchResolver) -> String {
    resolver
        .deck()
        .cards()
        .chunks(4)
        .enumerate()
        .map(|(row, cards)| {
            cards
                .iter()
                .enumerate()
                .map(|(col, card)| {
                    let label = if resolver.is_face_up(card.instance()) {
                        card.identity().chars().take(9).collect::<String>()
                    } else {
                        "?".to_string()
                    };
                    format!("{:>2}:{:<9}", row * 4 + col + 1, label)
                })
                .collect::<Vec<_>>()
                .join(" ")
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Line-mode memory game
#[instrument(skip(config))]
async fn run_memory(
    config: &ArcadeConfig,
    name: Option<String>,
    seed: Option<u64>,
    pairs: Option<usize>,
) -> Result<()> {
    let scores = signed_in_adapter(config, name).await?;
    let (builder, roster) = match pairs.or(*config.deck_pairs()) {
        Some(pairs) => (DeckBuilder::with_sample(pairs), names(&FULL_GRID)),
        None => (DeckBuilder::new(), names(&CLASSIC_GRID)),
    };
    let roster = roster.into_iter().map(String::from).collect();
    let mut session = MemorySession::new(
        *config.memory(),
        builder,
        roster,
        seeded_rng(seed),
        scores.clone(),
    )?;
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    println!("Enter a card number to flip it. 'r' deals again, Ctrl-D quits.");
    println!("{}", render_deck(&session.snapshot()));

    while let Some(line) = lines.next_line().await? {
        let input = line.trim();
        if input.eq_ignore_ascii_case("r") {
            session.restart()?;
            println!("{}", render_deck(&session.snapshot()));
            continue;
        }
        let snapshot = session.snapshot();
        let Some(card) = input
            .parse::<usize>()
            .ok()
            .and_then(|n| n.checked_sub(1))
            .and_then(|i| snapshot.deck().cards().get(i))
        else {
            println!("No card '{}'", input);
            continue;
        };

        let outcome = session.tap(card.instance());
        println!("{}", render_deck(&session.snapshot()));
        match outcome {
            TapOutcome::Mismatched { hide_after, .. } => {
                println!("No match.");
                tokio::time::sleep(hide_after + Duration::from_millis(20)).await;
                println!("{}", render_deck(&session.snapshot()));
            }
            TapOutcome::Matched { bonus, .. } if bonus > 0 => println!("Match! +{} moves", bonus),
            TapOutcome::Matched { .. } => println!("Match!"),
            TapOutcome::Won { moves } => println!("You won in {} moves. 'r' to play again.", moves),
            TapOutcome::Lost { moves } => println!("Out of moves after {}. 'r' to play again.", moves),
            TapOutcome::Flipped(_) | TapOutcome::Ignored(_) => {}
        }
        let snapshot = session.snapshot();
        if snapshot.status() == ResolverStatus::Playing {
            if let Some(left) = snapshot.remaining_budget() {
                println!("Moves left: {}", left);
            }
        }
    }

    scores.flush().await;
    Ok(())
}

/// Hot-seat tic-tac-toe
#[instrument]
async fn run_tictactoe() -> Result<()> {
    let mut game = Game::new();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    println!("Squares are 1-9, left to right, top to bottom. 'r' resets, Ctrl-D quits.");
    println!("{}", game.board().display());
    println!("{} to move", game.to_move());

    while let Some(line) = lines.next_line().await? {
        let input = line.trim();
        if input.eq_ignore_ascii_case("r") {
            game.reset();
        } else {
            let Some(pos) = Position::from_label_or_number(input) else {
                println!("Unknown square '{}'", input);
                continue;
            };
            if let Err(e) = game.place(pos) {
                println!("{}", e);
                continue;
            }
        }

        println!("{}", game.board().display());
        match game.outcome() {
            Outcome::Winner(player) => println!("{} wins! 'r' to play again.", player),
            Outcome::Draw => println!("Draw. 'r' to play again."),
            Outcome::InProgress => println!("{} to move", game.to_move()),
        }
    }
    Ok(())
}
