//! Animation frame scheduling.
//!
//! A periodic tick, independent of drawing, advances every animated emote's
//! frame position. Durations are 10 ms units; the tick fires every 30 ms and
//! therefore advances by 3 units. The carry loop terminates because decode
//! normalizes every duration to at least [`crate::emote::MIN_FRAME_DURATION`].

use std::sync::Arc;
use std::time::Duration;

use crate::emote::{Emote, EmoteRegistry};

/// Tick units added per timer firing (10 ms units, 30 ms timer).
pub const TICK_DELTA: u32 = 3;

/// Timer period driving [`FrameScheduler::run`].
pub const TICK_PERIOD: Duration = Duration::from_millis(30);

#[derive(Debug, Clone, Copy)]
pub struct SchedulerConfig {
    pub period: Duration,
    pub delta_ticks: u32,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self { period: TICK_PERIOD, delta_ticks: TICK_DELTA }
    }
}

/// Advances animated emotes on an external periodic tick.
#[derive(Debug, Default, Clone, Copy)]
pub struct FrameScheduler {
    config: SchedulerConfig,
}

impl FrameScheduler {
    pub fn new(config: SchedulerConfig) -> Self {
        Self { config }
    }

    /// Advance one emote by `delta_ticks`. Returns true when the current
    /// frame changed.
    ///
    /// The emote's per-resource lock is held for the whole call, so a
    /// concurrent compositor read sees either the old or the new active
    /// frame, never a half-updated pair.
    pub fn advance(&self, emote: &Emote, delta_ticks: u32) -> bool {
        let Some(data) = emote.image.as_ref() else {
            return false;
        };
        if !data.animated() {
            return false;
        }

        data.with_state(|state, frames, durations| {
            let start = state.current;
            state.offset += delta_ticks;
            while state.offset > durations[state.current] {
                state.offset -= durations[state.current];
                state.current = (state.current + 1) % frames.len();
            }
            // Selecting the active frame is the expensive part; skip it when
            // this tick landed inside the same frame.
            if state.current != start {
                state.active = frames[state.current].clone();
                true
            } else {
                false
            }
        })
    }

    /// Advance every animated emote in the registry by one tick's delta.
    /// Returns the number of emotes whose frame changed.
    pub fn tick(&self, registry: &EmoteRegistry) -> usize {
        registry
            .animated()
            .iter()
            .filter(|emote| self.advance(emote, self.config.delta_ticks))
            .count()
    }

    /// Spawn the periodic tick task.
    ///
    /// After each tick that changed at least one frame, `on_frames_changed`
    /// is invoked so the host can run the animated-emote re-composite pass.
    /// The task runs for the lifetime of the returned handle's runtime.
    pub fn run(
        self,
        registry: Arc<EmoteRegistry>,
        mut on_frames_changed: impl FnMut() + Send + 'static,
    ) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(self.config.period);
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
            loop {
                interval.tick().await;
                if self.tick(&registry) > 0 {
                    on_frames_changed();
                }
            }
        })
    }
}
