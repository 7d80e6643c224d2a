//! Static step registry: the five questions, their failure captions, and the
//! evasion behavior the affirmative control uses while each step is active.

/// How the affirmative ("Yes") control resists activation during a step.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EvasionTag {
    /// Fixed, reachable position. The only tag that always accepts a click.
    Neutral,
    /// Jumps to a random spot on a timer and whenever the pointer gets close.
    /// A landed click is still converted into another jump 95% of the time.
    Teleport,
    /// Rendered at reduced scale, wandering on a fast timer. Never activatable.
    ShrinkAndWander,
    /// Visible 1s / hidden 2s on a repeating cycle; relocates every quarter
    /// second while visible. Never activatable.
    Flicker,
    /// Runs from the pointer inside the container; teleports to the opposite
    /// corner if the pointer lands on it. Never activatable.
    Flee,
    /// Fades out (and stops accepting the pointer) when the pointer comes
    /// within range. Reserved: no registry step currently uses it.
    FadeOnApproach,
}

impl EvasionTag {
    /// Tags that can never produce a successful activation, no matter where
    /// or how visible the control is rendered. Only `Neutral` and (rarely)
    /// `Teleport` ever let the flow be won before the final step.
    pub fn blocks_activation(self) -> bool {
        !matches!(self, EvasionTag::Neutral | EvasionTag::Teleport)
    }
}

/// One question in the fixed sequence.
pub struct StepDesc {
    pub id: u8,
    pub prompt: &'static str,
    pub fail_caption: &'static str,
    pub evasion: EvasionTag,
}

/// Per-step countdown, in seconds. Expiry counts as an implicit "No".
pub const TIMER_DURATION_SECS: u32 = 15;

/// The ordered question sequence. Immutable; looked up by index.
pub const STEPS: &[StepDesc] = &[
    StepDesc {
        id: 1,
        prompt: "Since you didn't ask if I wanted to be your Valentine (maybe you forgot), do you still want to ask me?",
        fail_caption: "you hesitated…",
        evasion: EvasionTag::Teleport,
    },
    StepDesc {
        id: 2,
        prompt: "Since you said no, I need to know, do you still love me?",
        fail_caption: "love is a question, apparently…",
        evasion: EvasionTag::Neutral,
    },
    StepDesc {
        id: 3,
        prompt: "Would you pick me in every universe?",
        fail_caption: "the multiverse has spoken…",
        evasion: EvasionTag::ShrinkAndWander,
    },
    StepDesc {
        id: 4,
        prompt: "Am I your person?",
        fail_caption: "guess I'm not your person…",
        evasion: EvasionTag::Flicker,
    },
    StepDesc {
        id: 5,
        prompt: "Would you share your snacks with me?",
        fail_caption: "the ultimate rejection…",
        evasion: EvasionTag::Flee,
    },
];

/// Next step index, or `None` when `current` is the last step (exhausted).
pub fn advance(current: usize) -> Option<usize> {
    let next = current + 1;
    if next < STEPS.len() { Some(next) } else { None }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn advance_walks_every_step_once() {
        let mut idx = 0;
        let mut visited = vec![0];
        while let Some(next) = advance(idx) {
            idx = next;
            visited.push(next);
        }
        assert_eq!(visited, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn advance_signals_exhausted_on_last_step() {
        assert_eq!(advance(STEPS.len() - 1), None);
    }

    #[test]
    fn only_neutral_and_teleport_permit_activation() {
        for step in STEPS {
            let winnable = matches!(step.evasion, EvasionTag::Neutral | EvasionTag::Teleport);
            assert_eq!(step.evasion.blocks_activation(), !winnable);
        }
    }
}
