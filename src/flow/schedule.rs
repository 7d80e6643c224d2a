//! Named interval / timeout tasks keyed by what they drive. Entering or
//! leaving a view swaps the task set wholesale; a dropped task cancels its
//! underlying browser timer, so no exit path can leak a running interval.

use gloo_timers::callback::{Interval, Timeout};

/// Identity of a scheduled task. Registering a key replaces any live task
/// under the same key.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TaskKey {
    /// Per-step countdown tick (1s).
    Countdown,
    /// Autonomous relocation of the evading control.
    Relocate,
    /// Flicker visibility phase flip (chained one-shots).
    FlickerPhase,
    /// Confetti burst cadence while celebrating.
    CelebrationBurst,
    /// Stops the burst cadence after the celebration window.
    CelebrationStop,
    /// SUCCESS -> ACTIVE(0) auto-return.
    SuccessReturn,
}

enum Task {
    Repeating(#[allow(dead_code)] Interval),
    Once(#[allow(dead_code)] Timeout),
}

/// Owner of every live timer. Dropping the scheduler (or clearing it)
/// cancels everything it registered.
#[derive(Default)]
pub struct Scheduler {
    tasks: Vec<(TaskKey, Task)>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a repeating task, replacing any task under the same key.
    pub fn every<F>(&mut self, key: TaskKey, ms: u32, callback: F)
    where
        F: FnMut() + 'static,
    {
        self.cancel(key);
        log::debug!("schedule {key:?} every {ms}ms");
        self.tasks.push((key, Task::Repeating(Interval::new(ms, callback))));
    }

    /// Register a one-shot task, replacing any task under the same key.
    pub fn after<F>(&mut self, key: TaskKey, ms: u32, callback: F)
    where
        F: FnOnce() + 'static,
    {
        self.cancel(key);
        log::debug!("schedule {key:?} after {ms}ms");
        self.tasks.push((key, Task::Once(Timeout::new(ms, callback))));
    }

    pub fn cancel(&mut self, key: TaskKey) {
        self.tasks.retain(|(k, _)| *k != key);
    }

    /// Cancel every live task. Called on every view exit and on teardown.
    pub fn cancel_all(&mut self) {
        if !self.tasks.is_empty() {
            log::debug!("cancelling {} scheduled task(s)", self.tasks.len());
        }
        self.tasks.clear();
    }
}
