//! Fixed-interval tick scheduler for Phrase Hunt countdowns.
//!
//! A running game needs something outside the room to call `tick()` once
//! per countdown unit. [`TickScheduler`] is that clock: it resolves
//! [`wait_for_tick`](TickScheduler::wait_for_tick) on a fixed cadence,
//! detects when the runtime fell behind, and reports how much time the
//! caller's tick work took relative to the interval.
//!
//! ```ignore
//! let mut scheduler = TickScheduler::new(TickConfig::every(Duration::from_secs(1)));
//! loop {
//!     let info = scheduler.wait_for_tick().await;
//!     let outcome = room.tick(game_id).await;
//!     scheduler.record_tick_end();
//!     if outcome.is_done() { break; }
//! }
//! ```

use std::time::{Duration, Instant};

use rand::Rng;
use tokio::time::{self, Instant as TokioInstant};
use tracing::{debug, trace, warn};

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// What to do when the scheduler wakes up later than planned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TickPolicy {
    /// Resume the cadence from now and report the missed ticks in
    /// [`TickInfo::ticks_skipped`] so the caller can account for them.
    #[default]
    Skip,
    /// Fire missed ticks back to back, up to `max_catchup` of them.
    /// Anything beyond the cap is skipped as with [`TickPolicy::Skip`].
    CatchUp {
        /// Upper bound on consecutive catch-up ticks.
        max_catchup: u32,
    },
}

/// Configuration for a [`TickScheduler`].
#[derive(Debug, Clone)]
pub struct TickConfig {
    /// Time between ticks.
    pub interval: Duration,
    /// Overrun handling policy.
    pub policy: TickPolicy,
    /// Fraction of the interval (0.0–1.0) the caller's tick work may take
    /// before a warning is logged.
    pub budget_warn_threshold: f64,
    /// Random delay (0..jitter) added to the first tick so countdowns
    /// started in the same instant don't all wake together.
    pub initial_jitter: Duration,
}

impl Default for TickConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(1),
            policy: TickPolicy::default(),
            budget_warn_threshold: 0.80,
            initial_jitter: Duration::from_millis(2),
        }
    }
}

impl TickConfig {
    /// Shortest interval the scheduler accepts.
    pub const MIN_INTERVAL: Duration = Duration::from_millis(1);

    /// Config ticking every `interval`, other settings default.
    pub fn every(interval: Duration) -> Self {
        Self {
            interval,
            ..Default::default()
        }
    }

    /// Clamps out-of-range values. Called by [`TickScheduler::new`].
    pub fn validated(mut self) -> Self {
        if self.interval < Self::MIN_INTERVAL {
            warn!(
                interval_us = self.interval.as_micros() as u64,
                "tick interval below minimum, clamping"
            );
            self.interval = Self::MIN_INTERVAL;
        }
        self.budget_warn_threshold = self.budget_warn_threshold.clamp(0.0, 1.0);
        self
    }
}

// ---------------------------------------------------------------------------
// Tick info and stats
// ---------------------------------------------------------------------------

/// Describes one fired tick.
#[derive(Debug, Clone)]
pub struct TickInfo {
    /// Monotonically increasing tick number, starting at 1.
    pub tick: u64,
    /// The configured interval.
    pub dt: Duration,
    /// `true` if this tick fired more than 10% of an interval late.
    pub overrun: bool,
    /// Whole intervals that passed without a tick of their own.
    pub ticks_skipped: u64,
}

/// Running totals kept by the scheduler.
#[derive(Debug, Clone, Default)]
pub struct TickStats {
    pub total_ticks: u64,
    pub total_overruns: u64,
    pub total_skipped: u64,
    /// Longest time between `wait_for_tick` returning and `record_tick_end`.
    pub max_tick_time: Duration,
}

// ---------------------------------------------------------------------------
// Scheduler
// ---------------------------------------------------------------------------

/// Fixed-interval tick scheduler. One per running countdown.
pub struct TickScheduler {
    config: TickConfig,
    tick_count: u64,
    next_tick: TokioInstant,
    tick_start: Option<Instant>,
    stats: TickStats,
}

impl TickScheduler {
    /// Creates a scheduler whose first tick is one interval (plus jitter)
    /// from now.
    pub fn new(config: TickConfig) -> Self {
        let config = config.validated();
        let jitter = if config.initial_jitter.is_zero() {
            Duration::ZERO
        } else {
            let max = config.initial_jitter.as_micros() as u64;
            Duration::from_micros(rand::rng().random_range(0..max.max(1)))
        };
        let next_tick = TokioInstant::now() + config.interval + jitter;

        debug!(
            interval_ms = config.interval.as_secs_f64() * 1000.0,
            policy = ?config.policy,
            "tick scheduler created"
        );

        Self {
            config,
            tick_count: 0,
            next_tick,
            tick_start: None,
            stats: TickStats::default(),
        }
    }

    /// Creates a scheduler ticking every `interval` with default settings.
    pub fn every(interval: Duration) -> Self {
        Self::new(TickConfig::every(interval))
    }

    /// Waits until the next tick is due.
    pub async fn wait_for_tick(&mut self) -> TickInfo {
        let due = self.next_tick;
        let interval = self.config.interval;

        time::sleep_until(due).await;

        let now = TokioInstant::now();
        self.tick_count += 1;
        self.tick_start = Some(Instant::now());

        let late_by = now.saturating_duration_since(due);
        let overrun = late_by > interval / 10;
        let behind = if overrun {
            (late_by.as_nanos() / interval.as_nanos()) as u64
        } else {
            0
        };

        let (next_tick, ticks_skipped) = match self.config.policy {
            TickPolicy::Skip => (now + interval, behind),
            TickPolicy::CatchUp { max_catchup } if behind <= max_catchup as u64 => {
                (due + interval, 0)
            }
            TickPolicy::CatchUp { max_catchup } => {
                (now + interval, behind - max_catchup as u64)
            }
        };
        self.next_tick = next_tick;

        if behind > 0 {
            warn!(
                tick = self.tick_count,
                behind,
                skipped = ticks_skipped,
                late_ms = late_by.as_secs_f64() * 1000.0,
                "tick overrun"
            );
        }
        if overrun {
            self.stats.total_overruns += 1;
        }
        self.stats.total_skipped += ticks_skipped;
        self.stats.total_ticks += 1;

        trace!(tick = self.tick_count, overrun, "tick fired");

        TickInfo {
            tick: self.tick_count,
            dt: interval,
            overrun,
            ticks_skipped,
        }
    }

    /// Records that the caller finished handling the current tick.
    ///
    /// Logs a warning when the work used more than the configured share
    /// of the interval. A call without a preceding tick does nothing.
    pub fn record_tick_end(&mut self) {
        let Some(start) = self.tick_start.take() else {
            return;
        };
        let elapsed = start.elapsed();
        if elapsed > self.stats.max_tick_time {
            self.stats.max_tick_time = elapsed;
        }

        let utilization = elapsed.as_secs_f64() / self.config.interval.as_secs_f64();
        if utilization >= self.config.budget_warn_threshold {
            warn!(
                tick = self.tick_count,
                elapsed_ms = elapsed.as_secs_f64() * 1000.0,
                utilization_pct = format!("{:.1}", utilization * 100.0),
                "tick work is close to the tick interval"
            );
        }
    }

    /// Number of ticks fired so far.
    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    /// The configured interval.
    pub fn interval(&self) -> Duration {
        self.config.interval
    }

    /// Snapshot of the running totals.
    pub fn stats(&self) -> &TickStats {
        &self.stats
    }
}
