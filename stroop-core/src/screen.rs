use crate::color::Rgba;

/// Feedback shown after each response window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedbackKind {
    Correct,
    Incorrect,
    TooSlow,
}

/// Defines what a presenter draws on its next flip
#[derive(Debug, Clone, PartialEq)]
pub enum Screen {
    Blank,
    /// Multi-line instruction or status text.
    Message(String),
    Fixation,
    Stimulus {
        word: String,
        color: Rgba,
    },
    Feedback {
        kind: FeedbackKind,
        text: String,
    },
}

impl Screen {
    pub fn is_stimulus(&self) -> bool {
        matches!(self, Screen::Stimulus { .. })
    }
}
