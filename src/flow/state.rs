//! Flow state machine: one explicit state struct plus pure transition
//! functions. The render layer is a projection of this struct; nothing here
//! touches the browser, so the whole machine tests natively.

use super::steps::{self, EvasionTag, STEPS, TIMER_DURATION_SECS};

/// Mutually exclusive view selector. Exactly one variant holds at a time,
/// which makes the success/final-failure exclusion structural.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum View {
    Intro,
    Active { step: usize },
    Success,
    FinalFailure,
}

/// Evading control placement, expressed as offsets within the buttons area.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ControlPose {
    pub x: f64,
    pub y: f64,
    pub scale: Option<f64>,
    pub opacity: Option<f64>,
}

impl ControlPose {
    pub const fn origin() -> Self {
        Self { x: 0.0, y: 0.0, scale: None, opacity: None }
    }
}

/// Outcome of a negative answer (explicit click or countdown expiry).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NoOutcome {
    /// Moved on to the next question.
    Advanced { step: usize },
    /// The sequence was exhausted; the flow is now in FinalFailure.
    Exhausted,
    /// The event arrived for a view that is no longer active; dropped.
    Ignored,
}

/// All mutable flow state. Created at mount, reset wholesale on restart.
pub struct FlowState {
    pub view: View,
    /// Remaining countdown seconds, always within [0, TIMER_DURATION_SECS].
    pub time_left: u32,
    pub pose: ControlPose,
    /// Current phase of the flicker visibility cycle.
    pub flicker_visible: bool,
}

impl Default for FlowState {
    fn default() -> Self {
        Self::new()
    }
}

impl FlowState {
    pub fn new() -> Self {
        Self {
            view: View::Intro,
            time_left: TIMER_DURATION_SECS,
            pose: ControlPose::origin(),
            flicker_visible: true,
        }
    }

    pub fn active_step(&self) -> Option<usize> {
        match self.view {
            View::Active { step } => Some(step),
            _ => None,
        }
    }

    pub fn active_tag(&self) -> Option<EvasionTag> {
        self.active_step().map(|i| STEPS[i].evasion)
    }

    fn enter_step(&mut self, step: usize) {
        debug_assert!(step < STEPS.len());
        self.view = View::Active { step };
        self.time_left = TIMER_DURATION_SECS;
        self.pose = ControlPose::origin();
        self.flicker_visible = true;
    }

    /// INTRO -> ACTIVE(0) on user acknowledgement. Ignored elsewhere.
    pub fn open(&mut self) -> bool {
        if self.view == View::Intro {
            self.enter_step(0);
            true
        } else {
            false
        }
    }

    /// Negative answer: advance, or fall into FinalFailure when exhausted.
    /// Countdown and pose are reset on every step entry.
    pub fn answer_no(&mut self) -> NoOutcome {
        let Some(step) = self.active_step() else {
            return NoOutcome::Ignored;
        };
        match steps::advance(step) {
            Some(next) => {
                self.enter_step(next);
                NoOutcome::Advanced { step: next }
            }
            None => {
                self.view = View::FinalFailure;
                NoOutcome::Exhausted
            }
        }
    }

    /// One countdown tick. Returns `Some` when the timer expired, in which
    /// case the transition is identical to an explicit negative answer.
    pub fn tick_countdown(&mut self) -> Option<NoOutcome> {
        self.active_step()?;
        if self.time_left > 1 {
            self.time_left -= 1;
            None
        } else {
            Some(self.answer_no())
        }
    }

    /// Accepted affirmative activation. The probability / visibility gating
    /// lives in the evasion layer; this is the post-gate transition.
    pub fn succeed(&mut self) -> bool {
        if self.active_step().is_some() {
            self.view = View::Success;
            true
        } else {
            false
        }
    }

    /// SUCCESS -> ACTIVE(0) after the fixed delay, with a full reset.
    pub fn success_return(&mut self) -> bool {
        if self.view == View::Success {
            self.enter_step(0);
            true
        } else {
            false
        }
    }

    /// FINAL_FAILURE -> INTRO on the explicit restart action.
    pub fn restart(&mut self) -> bool {
        if self.view == View::FinalFailure {
            *self = Self::new();
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn countdown_stays_in_range_and_expires_like_no() {
        let mut s = FlowState::new();
        assert!(s.open());
        for expected in (1..TIMER_DURATION_SECS).rev() {
            assert_eq!(s.tick_countdown(), None);
            assert_eq!(s.time_left, expected);
        }
        // Final tick behaves as an explicit "No" and resets the clock.
        assert_eq!(s.tick_countdown(), Some(NoOutcome::Advanced { step: 1 }));
        assert_eq!(s.time_left, TIMER_DURATION_SECS);
    }

    #[test]
    fn ticks_are_dropped_outside_active() {
        let mut s = FlowState::new();
        assert_eq!(s.tick_countdown(), None);
        assert_eq!(s.view, View::Intro);
    }

    #[test]
    fn succeed_requires_an_active_question() {
        let mut s = FlowState::new();
        assert!(!s.succeed());
        s.view = View::FinalFailure;
        assert!(!s.succeed());
        assert_eq!(s.view, View::FinalFailure);
    }
}
