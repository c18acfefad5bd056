//! Fixed-rate frame scheduler for the Tilecamp client loop.
//!
//! The client core is frame-driven: one call to `Client::tick` per frame.
//! A browser or game engine host supplies its own frame callback; a
//! headless host uses [`TickScheduler`] instead:
//!
//! ```ignore
//! let mut frames = TickScheduler::new(TickConfig::with_rate(30));
//! loop {
//!     tokio::select! {
//!         _ = shutdown.recv() => break,
//!         _ = frames.wait_for_tick() => {
//!             client.tick();
//!             frames.record_tick_end();
//!         }
//!     }
//! }
//! ```
//!
//! A frame that runs late is never caught up: the next frame is scheduled
//! from the moment the late one fired. Replaying missed frames would only
//! produce empty flushes.

use std::time::{Duration, Instant};

use tokio::time::{self, Instant as TokioInstant};
use tracing::{debug, trace, warn};

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Configuration for the frame scheduler.
#[derive(Debug, Clone, PartialEq)]
pub struct TickConfig {
    /// Frames per second. Must be between 1 and [`Self::MAX_TICK_RATE_HZ`].
    pub tick_rate_hz: u32,
    /// Budget warning threshold (0.0–1.0). Default: 0.80.
    /// A warning is logged when a frame's work exceeds this fraction of
    /// the frame budget.
    pub budget_warn_threshold: f64,
}

impl Default for TickConfig {
    fn default() -> Self {
        Self {
            tick_rate_hz: 60,
            budget_warn_threshold: 0.80,
        }
    }
}

impl TickConfig {
    /// Maximum supported frame rate.
    pub const MAX_TICK_RATE_HZ: u32 = 240;

    /// Create a config for a specific frame rate with default thresholds.
    pub fn with_rate(tick_rate_hz: u32) -> Self {
        Self {
            tick_rate_hz,
            ..Default::default()
        }
    }

    /// Fix any out-of-range values so the config is safe to use.
    ///
    /// Called automatically by [`TickScheduler::new`]. Rules:
    /// - `tick_rate_hz` of 0 falls back to the default rate.
    /// - `tick_rate_hz` capped to [`Self::MAX_TICK_RATE_HZ`].
    /// - `budget_warn_threshold` clamped to `0.0..=1.0`.
    pub fn validated(mut self) -> Self {
        if self.tick_rate_hz == 0 {
            warn!("tick_rate_hz is 0; using the default rate");
            self.tick_rate_hz = Self::default().tick_rate_hz;
        }
        if self.tick_rate_hz > Self::MAX_TICK_RATE_HZ {
            warn!(
                rate = self.tick_rate_hz,
                max = Self::MAX_TICK_RATE_HZ,
                "tick_rate_hz exceeds maximum; clamping"
            );
            self.tick_rate_hz = Self::MAX_TICK_RATE_HZ;
        }
        self.budget_warn_threshold = self.budget_warn_threshold.clamp(0.0, 1.0);
        self
    }

    /// Duration of a single frame.
    pub fn tick_duration(&self) -> Duration {
        Duration::from_secs_f64(1.0 / self.tick_rate_hz.max(1) as f64)
    }
}

// ---------------------------------------------------------------------------
// Tick info
// ---------------------------------------------------------------------------

/// Information about a frame, returned by [`TickScheduler::wait_for_tick`].
#[derive(Debug, Clone, PartialEq)]
pub struct TickInfo {
    /// Frame number, starting at 1.
    pub tick: u64,
    /// Fixed frame length (`1 / tick_rate`).
    pub dt: Duration,
    /// `true` if this frame fired more than 10% late.
    pub overrun: bool,
    /// Whole frames skipped because of the overrun.
    pub ticks_skipped: u64,
}

// ---------------------------------------------------------------------------
// Scheduler
// ---------------------------------------------------------------------------

/// Fixed-rate frame scheduler.
pub struct TickScheduler {
    config: TickConfig,
    tick_duration: Duration,
    tick_count: u64,
    next_tick: TokioInstant,
    /// Wall-clock start of the current frame's work.
    /// Set by `wait_for_tick`, consumed by `record_tick_end`.
    tick_start: Option<Instant>,
    /// Fraction of the budget the last recorded frame used.
    last_utilization: f64,
}

impl TickScheduler {
    /// Create a new scheduler. The first frame fires one frame length
    /// from now.
    pub fn new(config: TickConfig) -> Self {
        let config = config.validated();
        let tick_duration = config.tick_duration();

        debug!(
            rate_hz = config.tick_rate_hz,
            budget_ms = tick_duration.as_secs_f64() * 1000.0,
            "frame scheduler created"
        );

        Self {
            config,
            tick_duration,
            tick_count: 0,
            next_tick: TokioInstant::now() + tick_duration,
            tick_start: None,
            last_utilization: 0.0,
        }
    }

    /// Create a scheduler for a specific frame rate with default settings.
    pub fn with_rate(tick_rate_hz: u32) -> Self {
        Self::new(TickConfig::with_rate(tick_rate_hz))
    }

    /// Wait until the next frame is due.
    pub async fn wait_for_tick(&mut self) -> TickInfo {
        let next = self.next_tick;
        let dur = self.tick_duration;

        time::sleep_until(next).await;

        let now = TokioInstant::now();
        self.tick_count += 1;
        self.tick_start = Some(Instant::now());

        let late_by = now.saturating_duration_since(next);
        let overrun = late_by > dur / 10;
        let mut ticks_skipped = 0u64;

        if overrun {
            ticks_skipped = (late_by.as_nanos() / dur.as_nanos()) as u64;
            if ticks_skipped > 0 {
                warn!(
                    tick = self.tick_count,
                    skipped = ticks_skipped,
                    late_ms = late_by.as_secs_f64() * 1000.0,
                    "frame overrun; skipping ahead"
                );
            }
        }
        // Always schedule from now, not from the missed deadline.
        self.next_tick = now + dur;

        trace!(tick = self.tick_count, overrun, "frame fired");

        TickInfo {
            tick: self.tick_count,
            dt: dur,
            overrun,
            ticks_skipped,
        }
    }

    /// Record that the work for the current frame has finished.
    ///
    /// Returns the fraction of the frame budget it used, or `None` if no
    /// frame was in progress.
    pub fn record_tick_end(&mut self) -> Option<f64> {
        let start = self.tick_start.take()?;
        let elapsed = start.elapsed();
        let utilization = elapsed.as_secs_f64() / self.tick_duration.as_secs_f64();
        self.last_utilization = utilization;

        if utilization >= self.config.budget_warn_threshold {
            warn!(
                tick = self.tick_count,
                elapsed_ms = elapsed.as_secs_f64() * 1000.0,
                budget_ms = self.tick_duration.as_secs_f64() * 1000.0,
                utilization_pct = format!("{:.1}", utilization * 100.0),
                "frame approaching budget limit"
            );
        }
        Some(utilization)
    }

    /// Frames fired so far.
    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    /// The configured frame rate in Hz.
    pub fn tick_rate_hz(&self) -> u32 {
        self.config.tick_rate_hz
    }

    /// The fixed frame length.
    pub fn tick_duration(&self) -> Duration {
        self.tick_duration
    }

    /// Budget fraction used by the last recorded frame.
    pub fn last_utilization(&self) -> f64 {
        self.last_utilization
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validated_zero_rate_uses_default() {
        let cfg = TickConfig::with_rate(0).validated();
        assert_eq!(cfg.tick_rate_hz, 60);
    }

    #[test]
    fn test_validated_clamps_rate_and_threshold() {
        let cfg = TickConfig {
            tick_rate_hz: 1000,
            budget_warn_threshold: 3.0,
        }
        .validated();
        assert_eq!(cfg.tick_rate_hz, TickConfig::MAX_TICK_RATE_HZ);
        assert_eq!(cfg.budget_warn_threshold, 1.0);
    }
}
