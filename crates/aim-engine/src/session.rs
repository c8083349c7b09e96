use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use rand::rngs::StdRng;
use rand::{RngExt, SeedableRng};
use tokio::sync::mpsc;
use tokio::time::{sleep, timeout, Instant};

use aim_core::opponent::select_opponent;
use aim_core::protocol::{BotProfile, PlayerProfile};
use aim_core::reaction::{sanitize_measured, simulate};
use aim_core::{
    EngineConfig, Leaderboard, MatchEvent, MatchPhase, MatchResult, PlayerStats, RankedMatch,
    Standing,
};

use crate::backup::{self, BackupFile};
use crate::error::EngineError;
use crate::profile;
use crate::store::KeyValueStore;

/// Where the live player's reactions come from.
pub trait ReactionSource: Send {
    /// Present a target and wait for the player. Resolves with the measured
    /// latency in milliseconds, or `None` for an explicit miss. The session
    /// enforces the round deadline around this call.
    fn react(&mut self, round: u32) -> impl Future<Output = Option<f64>> + Send;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerInput {
    Click,
    Miss,
}

/// Measures latency from the moment a target is shown to the next click
/// arriving on the channel.
pub struct ChannelSource {
    rx: mpsc::UnboundedReceiver<PlayerInput>,
}

impl ChannelSource {
    pub fn new(rx: mpsc::UnboundedReceiver<PlayerInput>) -> Self {
        Self { rx }
    }
}

impl ReactionSource for ChannelSource {
    async fn react(&mut self, _round: u32) -> Option<f64> {
        // Clicks from before the target appeared don't count.
        while self.rx.try_recv().is_ok() {}
        let shown = Instant::now();
        match self.rx.recv().await {
            Some(PlayerInput::Click) => Some(shown.elapsed().as_secs_f64() * 1000.0),
            Some(PlayerInput::Miss) | None => None,
        }
    }
}

/// Cooperative stop flag, checked between rounds and between practice targets.
#[derive(Debug, Clone, Default)]
pub struct StopHandle(Arc<AtomicBool>);

impl StopHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stop(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_stopped(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PracticeSummary {
    pub hits: u32,
    pub misses: u32,
    pub best_ms: Option<u32>,
}

pub struct Session<S> {
    store: Arc<S>,
    config: EngineConfig,
    rng: StdRng,
    events: Option<mpsc::UnboundedSender<MatchEvent>>,
}

impl<S: KeyValueStore> Session<S> {
    pub fn new(store: Arc<S>, config: EngineConfig) -> Self {
        let config = config.sanitized();
        let seed = config.seed.unwrap_or_else(|| rand::rng().random());
        Self {
            store,
            config,
            rng: StdRng::seed_from_u64(seed),
            events: None,
        }
    }

    /// Send progress events to `tx`.
    pub fn with_events(mut self, tx: mpsc::UnboundedSender<MatchEvent>) -> Self {
        self.events = Some(tx);
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    fn emit(&self, event: MatchEvent) {
        if let Some(tx) = &self.events {
            let _ = tx.send(event);
        }
    }

    pub async fn rating(&self) -> Result<i32, EngineError> {
        Ok(profile::load_rating(self.store.as_ref()).await?)
    }

    pub async fn stats(&self) -> Result<PlayerStats, EngineError> {
        Ok(profile::load_stats(self.store.as_ref()).await?)
    }

    pub async fn profile(&self) -> Result<PlayerProfile, EngineError> {
        let rating = self.rating().await?;
        let stats = self.stats().await?;
        Ok(PlayerProfile::new(
            rating,
            &stats,
            self.config.grand_champion_threshold,
        ))
    }

    /// The stored population, seeding and persisting one on first use.
    pub async fn leaderboard(&mut self) -> Result<Leaderboard, EngineError> {
        let capacity = self.config.leaderboard_capacity;
        if let Some(board) = profile::load_leaderboard(self.store.as_ref(), capacity).await? {
            return Ok(board);
        }
        let board = Leaderboard::generate(capacity, &mut self.rng);
        profile::save_leaderboard(self.store.as_ref(), &board).await?;
        Ok(board)
    }

    /// Leaderboard merged with the live player for display.
    pub async fn standings(&mut self) -> Result<Vec<Standing>, EngineError> {
        let board = self.leaderboard().await?;
        let rating = self.rating().await?;
        Ok(board.standings(rating, self.config.grand_champion_threshold))
    }

    pub async fn bot_profile(&mut self, name: &str) -> Result<Option<BotProfile>, EngineError> {
        let board = self.leaderboard().await?;
        Ok(board
            .find(name)
            .map(|e| BotProfile::new(e, self.config.grand_champion_threshold)))
    }

    async fn await_reaction<I: ReactionSource>(&self, input: &mut I, round: u32) -> Option<u32> {
        let deadline_ms = self.config.round_deadline_ms;
        match timeout(Duration::from_millis(deadline_ms), input.react(round)).await {
            Ok(Some(ms)) => sanitize_measured(ms, deadline_ms),
            Ok(None) => None,
            Err(_) => {
                log::debug!("round {} timed out", round);
                None
            }
        }
    }

    async fn countdown(&self) {
        for remaining in (1..=self.config.countdown_secs).rev() {
            self.emit(MatchEvent::Countdown { remaining });
            sleep(Duration::from_secs(1)).await;
        }
        self.emit(MatchEvent::Countdown { remaining: 0 });
        sleep(Duration::from_millis(self.config.countdown_go_ms)).await;
    }

    /// Play one ranked match against a freshly selected bot.
    ///
    /// Returns `None` when `stop` fires before the match finishes; the
    /// stored rating and stats are then left exactly as they were.
    pub async fn play_ranked<I: ReactionSource>(
        &mut self,
        input: &mut I,
        stop: &StopHandle,
    ) -> Result<Option<MatchResult>, EngineError> {
        let rating = self.rating().await?;
        let opponent = select_opponent(rating, self.config.opponent_spread, &mut self.rng);
        let mut ranked = RankedMatch::new(&self.config);

        ranked.queue(rating, opponent.clone())?;
        self.emit(MatchEvent::Queued {
            opponent: opponent.clone(),
        });
        ranked.begin_countdown()?;
        self.countdown().await;
        let mut round = ranked.start()?;

        loop {
            if stop.is_stopped() {
                let partial = ranked.abandon();
                self.emit(MatchEvent::Abandoned {
                    rounds_played: partial.len() as u32,
                });
                return Ok(None);
            }

            self.emit(MatchEvent::RoundStarted {
                round,
                total: ranked.total_rounds(),
                deadline_ms: self.config.round_deadline_ms,
            });
            let bot_ms = simulate(opponent.rating, &mut self.rng);
            let player_ms = self.await_reaction(input, round).await;
            let outcome = ranked.play_round(player_ms, bot_ms)?;
            self.emit(MatchEvent::RoundFinished { outcome });

            if ranked.phase() == MatchPhase::Settling {
                break;
            }
            sleep(Duration::from_millis(self.config.inter_round_pause_ms)).await;
            round = ranked.next_round()?;
        }

        let result = ranked.settle()?;
        let store = self.store.as_ref();
        let mut stats = profile::load_stats(store).await?;
        stats.record_match(&result);
        profile::save_progress(store, result.rating_after, &stats).await?;
        self.emit(MatchEvent::Completed {
            result: result.clone(),
        });
        Ok(Some(result))
    }

    /// Endless single-target drills until `stop` fires. Hits feed the
    /// reaction stats; the rating never moves.
    pub async fn practice<I: ReactionSource>(
        &mut self,
        input: &mut I,
        stop: &StopHandle,
    ) -> Result<PracticeSummary, EngineError> {
        let mut summary = PracticeSummary::default();
        while !stop.is_stopped() {
            self.emit(MatchEvent::PracticeTarget);
            let target = summary.hits + summary.misses + 1;
            match self.await_reaction(input, target).await {
                Some(ms) => {
                    let store = self.store.as_ref();
                    let mut stats = profile::load_stats(store).await?;
                    stats.record_reaction(ms);
                    profile::save_stats(store, &stats).await?;
                    summary.hits += 1;
                    summary.best_ms = Some(summary.best_ms.map_or(ms, |b| b.min(ms)));
                    self.emit(MatchEvent::PracticeHit { reaction_ms: ms });
                }
                None => {
                    summary.misses += 1;
                    self.emit(MatchEvent::PracticeMiss);
                }
            }
            sleep(Duration::from_millis(self.config.practice_pause_ms)).await;
        }
        self.emit(MatchEvent::PracticeEnded {
            hits: summary.hits,
            misses: summary.misses,
        });
        log::info!(
            "practice ended: {} hits, {} misses",
            summary.hits,
            summary.misses
        );
        Ok(summary)
    }

    pub async fn backup(&mut self, password: &str) -> Result<BackupFile, EngineError> {
        let capacity = self.config.leaderboard_capacity;
        Ok(backup::create_backup(self.store.as_ref(), password, capacity, &mut self.rng).await?)
    }

    pub async fn restore(&self, file: &BackupFile, password: &str) -> Result<(), EngineError> {
        let capacity = self.config.leaderboard_capacity;
        backup::restore_backup(self.store.as_ref(), file, password, capacity).await?;
        Ok(())
    }
}
