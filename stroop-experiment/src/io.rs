//! Seams to the presentation & input side of the experiment.
//!
//! The window binary implements these over channels; the tests implement
//! them with scripted fakes.

use crate::error::Result;
use std::time::Duration;
use stroop_core::{Participant, Screen};

/// A key press stamped on the session clock
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyPress {
    pub key: char,
    pub timestamp_ns: u64,
}

pub trait Presenter {
    /// Draws `screen` and flips. Returns the flip time on the session clock.
    fn present(&mut self, screen: &Screen) -> Result<u64>;
}

pub trait KeySource {
    /// Blocks until an accepted key is pressed or `max_wait` runs out.
    ///
    /// `None` for `max_wait` waits indefinitely; `None` for `accept` accepts
    /// any key. A timeout is `Ok(None)`.
    fn wait_for_key(
        &mut self,
        max_wait: Option<Duration>,
        accept: Option<&[char]>,
    ) -> Result<Option<KeyPress>>;

    /// Drops presses that arrived while nobody was waiting.
    fn clear_pending(&mut self);

    /// Surfaces an abort that arrived while nobody was waiting.
    fn check_abort(&mut self) -> Result<()> {
        Ok(())
    }
}

pub trait ParticipantSource {
    /// `Ok(None)` means the operator cancelled.
    fn request_participant(&mut self) -> Result<Option<Participant>>;
}

impl<P: Presenter + ?Sized> Presenter for &mut P {
    fn present(&mut self, screen: &Screen) -> Result<u64> {
        (**self).present(screen)
    }
}

impl<K: KeySource + ?Sized> KeySource for &mut K {
    fn wait_for_key(
        &mut self,
        max_wait: Option<Duration>,
        accept: Option<&[char]>,
    ) -> Result<Option<KeyPress>> {
        (**self).wait_for_key(max_wait, accept)
    }

    fn clear_pending(&mut self) {
        (**self).clear_pending()
    }

    fn check_abort(&mut self) -> Result<()> {
        (**self).check_abort()
    }
}
