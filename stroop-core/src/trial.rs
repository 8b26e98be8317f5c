use serde::{Deserialize, Serialize};
use std::fmt;

/// Trial state machine, walked once per trial by the runner
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrialState {
    Fixation,
    Stimulus,
    AwaitResponse,
    Feedback,
    Done,
}

impl TrialState {
    pub fn next(&self) -> Option<Self> {
        use TrialState::*;
        Some(match self {
            Fixation => Stimulus,
            Stimulus => AwaitResponse,
            AwaitResponse => Feedback,
            Feedback => Done,
            Done => return None,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Congruence {
    Congruent,
    Incongruent,
}

impl Congruence {
    pub fn label(&self) -> &'static str {
        match self {
            Congruence::Congruent => "congruent",
            Congruence::Incongruent => "incongruent",
        }
    }
}

impl fmt::Display for Congruence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A single word/ink pairing.
///
/// `word` is a palette color name, `ink` a palette ink identifier. For a
/// congruent trial the ink belongs to the word's own color.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trial {
    pub word: String,
    pub ink: String,
    pub congruence: Congruence,
}

impl Trial {
    pub fn is_congruent(&self) -> bool {
        self.congruence == Congruence::Congruent
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trial_states_run_in_order_and_stop_at_done() {
        let mut state = TrialState::Fixation;
        let mut seen = vec![state];
        while let Some(next) = state.next() {
            state = next;
            seen.push(state);
        }
        assert_eq!(
            seen,
            vec![
                TrialState::Fixation,
                TrialState::Stimulus,
                TrialState::AwaitResponse,
                TrialState::Feedback,
                TrialState::Done,
            ]
        );
    }

    #[test]
    fn congruence_labels() {
        assert_eq!(Congruence::Congruent.to_string(), "congruent");
        assert_eq!(Congruence::Incongruent.to_string(), "incongruent");
    }
}
