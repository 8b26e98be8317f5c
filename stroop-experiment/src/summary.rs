use serde::Serialize;
use stroop_core::{Block, Congruence, Participant, ResponseRecord};
use tracing::info;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConditionStats {
    pub trials: usize,
    pub responses: usize,
    pub correct: usize,
    pub accuracy: f64,
    /// Mean RT over correct responses only.
    pub mean_rt_seconds: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BlockSummary {
    pub block: Block,
    pub congruent: ConditionStats,
    pub incongruent: ConditionStats,
    /// Mean incongruent RT minus mean congruent RT.
    pub interference_seconds: Option<f64>,
}

/// Per-block accuracy and reaction-time summary of a session
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionSummary {
    pub participant_id: String,
    pub age: u32,
    pub blocks: Vec<BlockSummary>,
}

impl ConditionStats {
    fn from_records<'a>(records: impl Iterator<Item = &'a ResponseRecord>) -> Self {
        let mut trials = 0;
        let mut responses = 0;
        let mut correct_rts = Vec::new();
        for r in records {
            trials += 1;
            if r.responded() {
                responses += 1;
            }
            if r.correct {
                if let Some(rt) = r.reaction_time_seconds {
                    correct_rts.push(rt);
                }
            }
        }
        let correct = correct_rts.len();
        Self {
            trials,
            responses,
            correct,
            accuracy: if trials > 0 {
                correct as f64 / trials as f64
            } else {
                0.0
            },
            mean_rt_seconds: if correct > 0 {
                Some(correct_rts.iter().sum::<f64>() / correct as f64)
            } else {
                None
            },
        }
    }
}

impl BlockSummary {
    fn from_records(block: Block, records: &[ResponseRecord]) -> Self {
        let of = |congruence: Congruence| {
            ConditionStats::from_records(
                records
                    .iter()
                    .filter(move |r| r.block == block && r.trial_type == congruence),
            )
        };
        let congruent = of(Congruence::Congruent);
        let incongruent = of(Congruence::Incongruent);
        let interference_seconds = match (incongruent.mean_rt_seconds, congruent.mean_rt_seconds) {
            (Some(i), Some(c)) => Some(i - c),
            _ => None,
        };
        Self {
            block,
            congruent,
            incongruent,
            interference_seconds,
        }
    }
}

impl SessionSummary {
    pub fn from_records(participant: &Participant, records: &[ResponseRecord]) -> Self {
        Self {
            participant_id: participant.id.clone(),
            age: participant.age,
            blocks: [Block::Practice, Block::Main]
                .into_iter()
                .map(|block| BlockSummary::from_records(block, records))
                .collect(),
        }
    }

    pub fn block(&self, block: Block) -> Option<&BlockSummary> {
        self.blocks.iter().find(|b| b.block == block)
    }

    pub fn log(&self) {
        for b in &self.blocks {
            info!(
                block = %b.block,
                congruent_accuracy = %format!("{:.1}%", b.congruent.accuracy * 100.0),
                incongruent_accuracy = %format!("{:.1}%", b.incongruent.accuracy * 100.0),
                congruent_rt = ?b.congruent.mean_rt_seconds,
                incongruent_rt = ?b.incongruent.mean_rt_seconds,
                interference = ?b.interference_seconds,
                "block summary"
            );
        }
    }
}
