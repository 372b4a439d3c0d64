use std::cell::Cell;
use std::time::{Duration, Instant};

use crate::animation::timeline::{PhaseKind, Timeline};
use crate::stage::model::Stage;

/// Time source driving preview playback.
pub trait Clock {
    /// Time since playback started.
    fn elapsed(&self) -> Duration;
}

/// Wall-clock time.
#[derive(Clone, Copy, Debug)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn start() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Clock for SystemClock {
    fn elapsed(&self) -> Duration {
        self.origin.elapsed()
    }
}

/// Clock advanced by hand, for tests and frame-stepped previews.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: Cell<Duration>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }
}

impl Clock for ManualClock {
    fn elapsed(&self) -> Duration {
        self.now.get()
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    fn elapsed(&self) -> Duration {
        (**self).elapsed()
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PreviewTick {
    /// Loop iteration, starting at 0.
    pub lap: u64,
    /// Timeline time the stage was seeked to.
    pub time: f64,
    pub phase: Option<PhaseKind>,
}

/// Real-time looping playback of a timeline.
///
/// Holds the stage exclusively for its whole lifetime; a render cannot start on the same stage
/// until the loop is stopped.
pub struct PreviewLoop<'a, C: Clock> {
    stage: &'a mut Stage,
    timeline: &'a Timeline,
    clock: C,
}

impl<'a, C: Clock> PreviewLoop<'a, C> {
    pub fn new(stage: &'a mut Stage, timeline: &'a Timeline, clock: C) -> Self {
        Self {
            stage,
            timeline,
            clock,
        }
    }

    /// Seek the stage to the clock's current position, wrapping at the timeline end.
    pub fn tick(&mut self) -> PreviewTick {
        let total = self.timeline.total_secs();
        let elapsed = self.clock.elapsed().as_secs_f64();
        let (lap, time) = if total > 0.0 {
            ((elapsed / total).floor() as u64, elapsed.rem_euclid(total))
        } else {
            (0, 0.0)
        };
        self.timeline.seek(self.stage, time);
        PreviewTick {
            lap,
            time,
            phase: self.timeline.phase_at(time),
        }
    }

    pub fn stage(&self) -> &Stage {
        &*self.stage
    }

    /// End playback, returning the clock and releasing the stage.
    pub fn stop(self) -> C {
        self.clock
    }
}

impl Timeline {
    /// Start looping preview playback of this timeline on `stage`.
    pub fn play_loop<'a, C: Clock>(
        &'a self,
        stage: &'a mut Stage,
        clock: C,
    ) -> PreviewLoop<'a, C> {
        PreviewLoop::new(stage, self, clock)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/preview.rs"]
mod tests;
