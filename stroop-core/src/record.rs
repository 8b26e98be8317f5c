use crate::trial::Congruence;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Block {
    Practice,
    Main,
}

impl Block {
    pub fn label(&self) -> &'static str {
        match self {
            Block::Practice => "practice",
            Block::Main => "main",
        }
    }
}

impl fmt::Display for Block {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Participant details captured once at startup
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    pub id: String,
    pub age: u32,
}

/// Recorded outcome of one trial, in presentation order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseRecord {
    pub block: Block,
    pub participant_id: String,
    pub age: u32,
    pub word: String,
    pub ink: String,
    pub trial_type: Congruence,
    pub response_color: Option<String>,
    pub reaction_time_seconds: Option<f64>,
    pub correct: bool,
}

impl ResponseRecord {
    pub fn responded(&self) -> bool {
        self.response_color.is_some()
    }
}
