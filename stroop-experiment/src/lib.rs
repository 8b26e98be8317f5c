pub mod config;
pub mod error;
pub mod generator;
pub mod io;
pub mod output;
pub mod runner;
pub mod session;
pub mod summary;

pub use config::{StroopConfig, Texts, WindowConfig};
pub use error::{ExperimentError, Result};
pub use generator::generate_trials;
pub use io::{KeyPress, KeySource, ParticipantSource, Presenter};
pub use runner::{TrialRunner, score_response};
pub use session::{Session, SessionPlan, SessionReport};
pub use summary::SessionSummary;
