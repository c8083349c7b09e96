use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

use aim_core::MatchEvent;
use aim_engine::cli::{Cli, Command};
use aim_engine::{
    drift, BackupFile, ChannelSource, DriftTimer, PlayerInput, Session, Settings, SqliteStore,
    StopHandle,
};

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let code = match run(Cli::parse()).await {
        Ok(()) => 0,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            1
        }
    };
    // The stdin reader may still be parked on a blocking read.
    std::process::exit(code);
}

async fn run(cli: Cli) -> Result<()> {
    let mut settings = Settings::from_env();
    if let Some(url) = cli.database {
        settings.database_url = url;
    }
    if cli.seed.is_some() {
        settings.engine.seed = cli.seed;
    }
    if let Some(dir) = settings.database_dir() {
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("creating data directory {}", dir.display()))?;
    }

    let store = Arc::new(
        SqliteStore::open(&settings.database_url)
            .await
            .with_context(|| format!("opening {}", settings.database_url))?,
    );
    let (event_tx, event_rx) = mpsc::unbounded_channel();
    let mut session = Session::new(store.clone(), settings.engine.clone()).with_events(event_tx);

    match cli.command {
        Command::Play => {
            let (mut input, stop) = stdin_source();
            let printer = tokio::spawn(print_events(event_rx));
            let result = session.play_ranked(&mut input, &stop).await?;
            drop(session);
            let _ = printer.await;
            if result.is_none() {
                println!("Match abandoned, rating unchanged.");
            }
        }
        Command::Practice => {
            let (mut input, stop) = stdin_source();
            let printer = tokio::spawn(print_events(event_rx));
            println!("Press Enter as soon as you see GO. Type q and Enter to stop.");
            session.practice(&mut input, &stop).await?;
            drop(session);
            let _ = printer.await;
        }
        Command::Leaderboard => {
            for row in session.standings().await? {
                let marker = if row.is_player { ">" } else { " " };
                println!(
                    "{}#{:<3} {:<20} {:>5}  {}",
                    marker, row.position, row.name, row.rating, row.tier
                );
            }
        }
        Command::Profile { name: None } => {
            let p = session.profile().await?;
            println!("You: {} ({})", p.rating, p.rank);
            println!("  Games played: {}", p.games_played);
            println!("  Matches won:  {}", p.wins);
            println!("  Matches lost: {}", p.losses);
            println!("  Rounds:       {}", p.rounds_played);
            println!("  Average:      {}", fmt_stat(p.average_reaction_ms));
            println!("  Best:         {}", fmt_stat(p.best_reaction_ms));
        }
        Command::Profile { name: Some(name) } => match session.bot_profile(&name).await? {
            Some(p) => {
                println!("{}: {} ({})", p.name, p.rating, p.rank);
                println!("  Games played: {}", p.games_played);
                println!("  Matches won:  {}", p.wins);
                println!("  Average:      {} ms", p.average_reaction_ms);
            }
            None => println!("No bot named {} on the leaderboard.", name),
        },
        Command::Backup { path, password } => {
            let file = session.backup(&password).await?;
            std::fs::write(&path, file.to_json()?)
                .with_context(|| format!("writing {}", path.display()))?;
            println!("Backup saved to {}. Keep the password safe.", path.display());
        }
        Command::Restore { path, password } => {
            let text = std::fs::read_to_string(&path)
                .with_context(|| format!("reading {}", path.display()))?;
            let file = BackupFile::from_json(&text)?;
            session.restore(&file, &password).await?;
            println!("Restore complete. Rating and leaderboard restored.");
        }
        Command::Drift { once: true } => {
            drift::tick_once(store.as_ref(), &settings.engine).await?;
            println!("Leaderboard drifted once.");
        }
        Command::Drift { once: false } => {
            let timer = DriftTimer::spawn(store.clone(), &settings.engine);
            println!(
                "Drifting every {}s, Ctrl-C to stop.",
                settings.engine.drift_interval_ms / 1000
            );
            tokio::signal::ctrl_c().await?;
            timer.stop();
        }
    }
    Ok(())
}

/// Enter counts as a click; `q` stops at the next round boundary.
fn stdin_source() -> (ChannelSource, StopHandle) {
    let (tx, rx) = mpsc::unbounded_channel();
    let stop = StopHandle::new();
    let reader_stop = stop.clone();
    tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            if line.trim().eq_ignore_ascii_case("q") {
                reader_stop.stop();
                let _ = tx.send(PlayerInput::Miss);
                break;
            }
            let _ = tx.send(PlayerInput::Click);
        }
        reader_stop.stop();
    });
    (ChannelSource::new(rx), stop)
}

async fn print_events(mut rx: mpsc::UnboundedReceiver<MatchEvent>) {
    while let Some(event) = rx.recv().await {
        match event {
            MatchEvent::Queued { opponent } => {
                println!("Queued vs {} (rating {})", opponent.name, opponent.rating)
            }
            MatchEvent::Countdown { remaining: 0 } => println!("GO!"),
            MatchEvent::Countdown { remaining } => println!("{}...", remaining),
            MatchEvent::RoundStarted { round, total, .. } => {
                println!("Round {}/{}: GO! (press Enter)", round, total)
            }
            MatchEvent::RoundFinished { outcome } => println!(
                "Round {}: you {} / bot {} - {} ({:+} -> {})",
                outcome.round,
                fmt_ms(outcome.player_ms),
                fmt_ms(outcome.bot_ms),
                outcome.winner.label(),
                outcome.delta,
                outcome.rating_after
            ),
            MatchEvent::Completed { result } => {
                println!(
                    "Match complete. You won {}/{} rounds.",
                    result.rounds_won,
                    result.rounds.len()
                );
                println!("Rating: {} -> {}", result.rating_before, result.rating_after);
            }
            MatchEvent::Abandoned { rounds_played } => {
                println!("Stopped after {} rounds.", rounds_played)
            }
            MatchEvent::PracticeTarget => println!("GO!"),
            MatchEvent::PracticeHit { reaction_ms } => println!("Hit! Reaction: {} ms", reaction_ms),
            MatchEvent::PracticeMiss => println!("Missed the target, try again."),
            MatchEvent::PracticeEnded { hits, misses } => {
                println!("Practice ended: {} hits, {} misses.", hits, misses)
            }
        }
    }
}

fn fmt_ms(ms: Option<u32>) -> String {
    match ms {
        Some(ms) => format!("{} ms", ms),
        None => "MISS".to_string(),
    }
}

fn fmt_stat(ms: Option<u32>) -> String {
    ms.map_or_else(|| "-".to_string(), |ms| format!("{} ms", ms))
}
