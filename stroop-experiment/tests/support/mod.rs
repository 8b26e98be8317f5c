#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::VecDeque;
use std::path::PathBuf;
use std::rc::Rc;
use std::time::Duration;
use stroop_core::{Participant, Screen};
use stroop_experiment::{
    ExperimentError, KeyPress, KeySource, ParticipantSource, Presenter, Result, StroopConfig,
};
use stroop_timing::{ManualTimer, Timer};

pub type SharedScreens = Rc<RefCell<Vec<(u64, Screen)>>>;

/// Records every flip with its time on the manual clock.
pub struct RecordingPresenter {
    pub timer: ManualTimer,
    pub screens: SharedScreens,
}

impl RecordingPresenter {
    pub fn new(timer: &ManualTimer) -> Self {
        Self {
            timer: timer.clone(),
            screens: Rc::default(),
        }
    }
}

impl Presenter for RecordingPresenter {
    fn present(&mut self, screen: &Screen) -> Result<u64> {
        let now = self.timer.now();
        self.screens.borrow_mut().push((now, screen.clone()));
        Ok(now)
    }
}

#[derive(Debug, Clone, Copy)]
pub enum Scripted {
    Press(char, Duration),
    Timeout,
}

/// Replays a fixed script of response-window outcomes.
///
/// Untimed waits (message screens) are answered at once with a space.
pub struct ScriptedKeys {
    pub timer: ManualTimer,
    pub script: VecDeque<Scripted>,
    pub clears: usize,
    /// Escape lands during the input flush with this 1-based count.
    pub abort_on_clear: Option<usize>,
    aborted: bool,
}

impl ScriptedKeys {
    pub fn new(timer: &ManualTimer, script: impl IntoIterator<Item = Scripted>) -> Self {
        Self {
            timer: timer.clone(),
            script: script.into_iter().collect(),
            clears: 0,
            abort_on_clear: None,
            aborted: false,
        }
    }

    fn abort_error() -> ExperimentError {
        ExperimentError::Aborted("escape pressed".to_string())
    }
}

impl KeySource for ScriptedKeys {
    fn wait_for_key(
        &mut self,
        max_wait: Option<Duration>,
        accept: Option<&[char]>,
    ) -> Result<Option<KeyPress>> {
        if self.aborted {
            return Err(Self::abort_error());
        }
        let Some(max_wait) = max_wait else {
            return Ok(Some(KeyPress {
                key: ' ',
                timestamp_ns: self.timer.now(),
            }));
        };
        match self.script.pop_front() {
            Some(Scripted::Press(key, after))
                if after <= max_wait && accept.is_none_or(|keys| keys.contains(&key)) =>
            {
                self.timer.advance(after);
                Ok(Some(KeyPress {
                    key,
                    timestamp_ns: self.timer.now(),
                }))
            }
            _ => {
                self.timer.advance(max_wait);
                Ok(None)
            }
        }
    }

    fn clear_pending(&mut self) {
        self.clears += 1;
        if self.abort_on_clear == Some(self.clears) {
            self.aborted = true;
        }
    }

    fn check_abort(&mut self) -> Result<()> {
        if self.aborted {
            return Err(Self::abort_error());
        }
        Ok(())
    }
}

/// Hands out presses with fixed stamps on the session clock, the way the
/// window thread queues them, whether or not they fall inside the window.
pub struct QueuedKeys {
    pub timer: ManualTimer,
    pub queue: VecDeque<KeyPress>,
}

impl QueuedKeys {
    pub fn new(timer: &ManualTimer, presses: impl IntoIterator<Item = (char, Duration)>) -> Self {
        Self {
            timer: timer.clone(),
            queue: presses
                .into_iter()
                .map(|(key, at)| KeyPress {
                    key,
                    timestamp_ns: at.as_nanos() as u64,
                })
                .collect(),
        }
    }
}

impl KeySource for QueuedKeys {
    fn wait_for_key(
        &mut self,
        max_wait: Option<Duration>,
        _accept: Option<&[char]>,
    ) -> Result<Option<KeyPress>> {
        match self.queue.pop_front() {
            Some(press) => {
                let now = self.timer.now();
                if press.timestamp_ns > now {
                    self.timer.advance(Duration::from_nanos(press.timestamp_ns - now));
                }
                Ok(Some(press))
            }
            None => {
                self.timer.advance(max_wait.unwrap_or_default());
                Ok(None)
            }
        }
    }

    fn clear_pending(&mut self) {
        self.queue.clear();
    }
}

/// Answers every stimulus with the key for its ink, slower on incongruent
/// words.
pub struct InkResponder {
    pub timer: ManualTimer,
    pub config: StroopConfig,
    pub screens: SharedScreens,
    pub congruent_rt: Duration,
    pub incongruent_rt: Duration,
}

impl KeySource for InkResponder {
    fn wait_for_key(
        &mut self,
        max_wait: Option<Duration>,
        _accept: Option<&[char]>,
    ) -> Result<Option<KeyPress>> {
        if max_wait.is_none() {
            return Ok(Some(KeyPress {
                key: ' ',
                timestamp_ns: self.timer.now(),
            }));
        }
        let last = self.screens.borrow().last().map(|(_, s)| s.clone());
        let Some(Screen::Stimulus { word, color }) = last else {
            panic!("response window opened without a stimulus on screen");
        };
        let ink = self
            .config
            .colors
            .iter()
            .find(|c| c.rgba == color)
            .expect("stimulus color is in the palette");
        let key = self
            .config
            .keys
            .iter()
            .find(|b| b.color == ink.name)
            .map(|b| b.key)
            .expect("every color has a key");
        let rt = if ink.name == word {
            self.congruent_rt
        } else {
            self.incongruent_rt
        };
        self.timer.advance(rt);
        Ok(Some(KeyPress {
            key,
            timestamp_ns: self.timer.now(),
        }))
    }

    fn clear_pending(&mut self) {}
}

pub struct FixedDialog(pub Option<Participant>);

impl ParticipantSource for FixedDialog {
    fn request_participant(&mut self) -> Result<Option<Participant>> {
        Ok(self.0.clone())
    }
}

pub fn participant() -> Participant {
    Participant {
        id: "P07".to_string(),
        age: 23,
    }
}

/// Fresh per-test directory under the system temp dir.
pub fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("stroop-{}-{}", name, std::process::id()));
    let _ = std::fs::remove_dir_all(&dir);
    dir
}
