use crate::record::Block;

/// Defines session phases and behavior
pub trait Phase: Copy + Clone + PartialEq + Send + Sync + std::fmt::Debug + Default {
    fn next(&self) -> Option<Self>;

    /// Block whose trials run during this phase, if any.
    fn block(&self) -> Option<Block> {
        None
    }

    /// Phases that hold a message until any key is pressed.
    fn waits_for_key(&self) -> bool {
        false
    }

    fn is_complete(&self) -> bool {
        false
    }
}

#[derive(Copy, Debug, Clone, PartialEq, Eq, Default)]
pub enum StroopPhase {
    #[default]
    Instructions,
    Practice,
    Transition,
    Main,
    Complete,
}

impl Phase for StroopPhase {
    fn next(&self) -> Option<Self> {
        use StroopPhase::*;
        Some(match self {
            Instructions => Practice,
            Practice => Transition,
            Transition => Main,
            Main => Complete,
            Complete => return None,
        })
    }

    fn block(&self) -> Option<Block> {
        match self {
            StroopPhase::Practice => Some(Block::Practice),
            StroopPhase::Main => Some(Block::Main),
            _ => None,
        }
    }

    fn waits_for_key(&self) -> bool {
        matches!(self, StroopPhase::Instructions | StroopPhase::Transition)
    }

    fn is_complete(&self) -> bool {
        matches!(self, StroopPhase::Complete)
    }
}
