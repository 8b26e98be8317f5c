pub mod color;
pub mod phase;
pub mod record;
pub mod screen;
pub mod trial;

pub use color::{ColorSpec, KeyBinding, Rgba};
pub use phase::{Phase, StroopPhase};
pub use record::{Block, Participant, ResponseRecord};
pub use screen::{FeedbackKind, Screen};
pub use trial::{Congruence, Trial, TrialState};
