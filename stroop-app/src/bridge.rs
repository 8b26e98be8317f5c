//! Channel plumbing between the session thread and the window thread.

use std::sync::mpsc::{Receiver, RecvTimeoutError, TryRecvError};
use std::time::{Duration, Instant};
use stroop_core::Screen;
use stroop_experiment::{ExperimentError, KeyPress, KeySource, Presenter, Result};
use winit::event_loop::EventLoopProxy;
use winit::keyboard::{Key, NamedKey};

const FLIP_TIMEOUT: Duration = Duration::from_secs(5);

/// Session thread → window thread
#[derive(Debug, Clone)]
pub enum UserEvent {
    Show(Screen),
    Finished,
}

/// Window thread → session thread
#[derive(Debug, Clone)]
pub enum InputEvent {
    Key(KeyPress),
    Abort(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    Press(char),
    Abort,
    Ignore,
}

pub fn translate_key(key: &Key) -> KeyAction {
    match key {
        Key::Named(NamedKey::Escape) => KeyAction::Abort,
        Key::Named(NamedKey::Space) => KeyAction::Press(' '),
        Key::Named(NamedKey::Enter) => KeyAction::Press('\n'),
        Key::Character(s) => match s.chars().next() {
            Some(c) => KeyAction::Press(c.to_ascii_lowercase()),
            None => KeyAction::Ignore,
        },
        _ => KeyAction::Ignore,
    }
}

fn window_gone() -> ExperimentError {
    ExperimentError::Aborted("window closed".to_string())
}

/// Hands screens to the window and waits for the flip timestamp.
pub struct WindowPresenter {
    proxy: EventLoopProxy<UserEvent>,
    flips: Receiver<u64>,
}

impl WindowPresenter {
    pub fn new(proxy: EventLoopProxy<UserEvent>, flips: Receiver<u64>) -> Self {
        Self { proxy, flips }
    }
}

impl Presenter for WindowPresenter {
    fn present(&mut self, screen: &Screen) -> Result<u64> {
        self.proxy
            .send_event(UserEvent::Show(screen.clone()))
            .map_err(|_| window_gone())?;
        match self.flips.recv_timeout(FLIP_TIMEOUT) {
            Ok(ts) => Ok(ts),
            Err(RecvTimeoutError::Timeout) => Err(ExperimentError::Presentation(format!(
                "no flip within {FLIP_TIMEOUT:?}"
            ))),
            Err(RecvTimeoutError::Disconnected) => Err(window_gone()),
        }
    }
}

/// Key presses stamped by the window thread, consumed here with timeouts.
pub struct ChannelKeys {
    rx: Receiver<InputEvent>,
    aborted: Option<String>,
}

impl ChannelKeys {
    pub fn new(rx: Receiver<InputEvent>) -> Self {
        Self { rx, aborted: None }
    }
}

impl KeySource for ChannelKeys {
    fn wait_for_key(
        &mut self,
        max_wait: Option<Duration>,
        accept: Option<&[char]>,
    ) -> Result<Option<KeyPress>> {
        if let Some(reason) = self.aborted.take() {
            return Err(ExperimentError::Aborted(reason));
        }
        let deadline = max_wait.map(|d| Instant::now() + d);

        loop {
            let event = match deadline {
                None => self.rx.recv().map_err(|_| window_gone())?,
                Some(deadline) => {
                    let remaining = deadline.saturating_duration_since(Instant::now());
                    match self.rx.recv_timeout(remaining) {
                        Ok(event) => event,
                        Err(RecvTimeoutError::Timeout) => return Ok(None),
                        Err(RecvTimeoutError::Disconnected) => return Err(window_gone()),
                    }
                }
            };
            match event {
                InputEvent::Key(press) => {
                    if accept.is_none_or(|keys| keys.contains(&press.key)) {
                        return Ok(Some(press));
                    }
                }
                InputEvent::Abort(reason) => return Err(ExperimentError::Aborted(reason)),
            }
        }
    }

    fn clear_pending(&mut self) {
        loop {
            match self.rx.try_recv() {
                Ok(InputEvent::Key(_)) => {}
                Ok(InputEvent::Abort(reason)) => self.aborted = Some(reason),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    self.aborted.get_or_insert_with(|| "window closed".to_string());
                    break;
                }
            }
        }
    }

    fn check_abort(&mut self) -> Result<()> {
        self.clear_pending();
        match self.aborted.take() {
            Some(reason) => Err(ExperimentError::Aborted(reason)),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;
    use winit::keyboard::SmolStr;

    fn press(key: char, ts: u64) -> InputEvent {
        InputEvent::Key(KeyPress {
            key,
            timestamp_ns: ts,
        })
    }

    #[test]
    fn filtered_keys_are_skipped() {
        let (tx, rx) = mpsc::channel();
        let mut keys = ChannelKeys::new(rx);
        tx.send(press('x', 10)).unwrap();
        tx.send(press('g', 20)).unwrap();

        let got = keys
            .wait_for_key(Some(Duration::from_millis(50)), Some(&['r', 'g']))
            .unwrap();
        assert_eq!(got, Some(KeyPress { key: 'g', timestamp_ns: 20 }));
    }

    #[test]
    fn times_out_without_accepted_key() {
        let (tx, rx) = mpsc::channel();
        let mut keys = ChannelKeys::new(rx);
        tx.send(press('x', 10)).unwrap();
        let got = keys
            .wait_for_key(Some(Duration::from_millis(20)), Some(&['r']))
            .unwrap();
        assert_eq!(got, None);
    }

    #[test]
    fn clear_pending_drops_keys_but_keeps_abort() {
        let (tx, rx) = mpsc::channel();
        let mut keys = ChannelKeys::new(rx);
        tx.send(press('r', 1)).unwrap();
        tx.send(InputEvent::Abort("escape pressed".to_string())).unwrap();
        keys.clear_pending();

        let err = keys.wait_for_key(None, None).unwrap_err();
        assert!(matches!(err, ExperimentError::Aborted(reason) if reason == "escape pressed"));
    }

    #[test]
    fn check_abort_reports_escape_or_closed_window() {
        let (tx, rx) = mpsc::channel();
        let mut keys = ChannelKeys::new(rx);
        assert!(keys.check_abort().is_ok());

        tx.send(InputEvent::Abort("escape pressed".to_string())).unwrap();
        assert!(matches!(
            keys.check_abort(),
            Err(ExperimentError::Aborted(reason)) if reason == "escape pressed"
        ));

        drop(tx);
        assert!(matches!(keys.check_abort(), Err(ExperimentError::Aborted(_))));
    }

    #[test]
    fn closed_window_aborts_wait() {
        let (tx, rx) = mpsc::channel::<InputEvent>();
        drop(tx);
        let mut keys = ChannelKeys::new(rx);
        assert!(matches!(
            keys.wait_for_key(None, None),
            Err(ExperimentError::Aborted(_))
        ));
    }

    #[test]
    fn translates_letters_space_and_escape() {
        assert_eq!(
            translate_key(&Key::Character(SmolStr::new("R"))),
            KeyAction::Press('r')
        );
        assert_eq!(translate_key(&Key::Named(NamedKey::Space)), KeyAction::Press(' '));
        assert_eq!(translate_key(&Key::Named(NamedKey::Escape)), KeyAction::Abort);
        assert_eq!(translate_key(&Key::Named(NamedKey::Tab)), KeyAction::Ignore);
    }
}
