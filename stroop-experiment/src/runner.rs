use crate::config::StroopConfig;
use crate::error::{ExperimentError, Result};
use crate::io::{KeySource, Presenter};
use std::time::Duration;
use stroop_core::{Block, FeedbackKind, Participant, ResponseRecord, Screen, Trial, TrialState};
use stroop_timing::Timer;
use tracing::{debug, info};

/// Scored outcome of one response window
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredResponse {
    pub response_color: Option<String>,
    pub reaction_time_seconds: Option<f64>,
    pub correct: bool,
    pub feedback: FeedbackKind,
}

impl ScoredResponse {
    fn missed() -> Self {
        Self {
            response_color: None,
            reaction_time_seconds: None,
            correct: false,
            feedback: FeedbackKind::TooSlow,
        }
    }
}

/// Scores a key/RT pair against the trial's ink.
///
/// The claimed color comes from the key table, the expected one from mapping
/// the ink back to its color name.
pub fn score_response(
    config: &StroopConfig,
    trial: &Trial,
    response: Option<(char, Duration)>,
) -> ScoredResponse {
    let Some((key, rt)) = response else {
        return ScoredResponse::missed();
    };

    let claimed = config.color_for_key(key);
    let expected = config.name_for_ink(&trial.ink);
    let correct = claimed.is_some() && claimed == expected;

    ScoredResponse {
        response_color: claimed.map(str::to_string),
        reaction_time_seconds: Some(rt.as_secs_f64()),
        correct,
        feedback: if correct {
            FeedbackKind::Correct
        } else {
            FeedbackKind::Incorrect
        },
    }
}

/// Drives one block of trials through fixation, stimulus, response window
/// and feedback.
pub struct TrialRunner<'a, T, P, K>
where
    T: Timer,
    P: Presenter,
    K: KeySource,
{
    config: &'a StroopConfig,
    timer: &'a T,
    presenter: &'a mut P,
    keys: &'a mut K,
    response_keys: Vec<char>,
}

impl<'a, T, P, K> TrialRunner<'a, T, P, K>
where
    T: Timer<Timestamp = u64>,
    P: Presenter,
    K: KeySource,
{
    pub fn new(
        config: &'a StroopConfig,
        timer: &'a T,
        presenter: &'a mut P,
        keys: &'a mut K,
    ) -> Self {
        Self {
            response_keys: config.response_keys(),
            config,
            timer,
            presenter,
            keys,
        }
    }

    pub fn run_block(
        &mut self,
        block: Block,
        participant: &Participant,
        trials: &[Trial],
    ) -> Result<Vec<ResponseRecord>> {
        let mut records = Vec::with_capacity(trials.len());
        for (index, trial) in trials.iter().enumerate() {
            let record = self.run_trial(block, participant, trial)?;
            info!(
                block = %block,
                trial = index + 1,
                of = trials.len(),
                word = %record.word,
                ink = %record.ink,
                response = record.response_color.as_deref().unwrap_or("-"),
                rt = ?record.reaction_time_seconds,
                correct = record.correct,
                "trial complete"
            );
            records.push(record);
        }
        Ok(records)
    }

    pub fn run_trial(
        &mut self,
        block: Block,
        participant: &Participant,
        trial: &Trial,
    ) -> Result<ResponseRecord> {
        let mut state = TrialState::Fixation;
        let mut onset_ns = 0u64;
        let mut response = None;
        let mut scored = ScoredResponse::missed();

        loop {
            match state {
                TrialState::Fixation => {
                    self.presenter.present(&Screen::Fixation)?;
                    self.timer.sleep(self.config.fixation());
                }
                TrialState::Stimulus => {
                    let color = self.config.ink_rgba(&trial.ink).ok_or_else(|| {
                        ExperimentError::Presentation(format!("unknown ink {}", trial.ink))
                    })?;
                    onset_ns = self.presenter.present(&Screen::Stimulus {
                        word: trial.word.clone(),
                        color,
                    })?;
                }
                TrialState::AwaitResponse => response = self.await_response(onset_ns)?,
                TrialState::Feedback => {
                    scored = score_response(self.config, trial, response);
                    let text = match scored.feedback {
                        FeedbackKind::Correct => &self.config.texts.correct,
                        FeedbackKind::Incorrect => &self.config.texts.incorrect,
                        FeedbackKind::TooSlow => &self.config.texts.too_slow,
                    };
                    self.presenter.present(&Screen::Feedback {
                        kind: scored.feedback,
                        text: text.clone(),
                    })?;
                    self.timer.sleep(self.config.feedback());
                    self.keys.clear_pending();
                }
                TrialState::Done => {}
            }
            debug!(?state, word = %trial.word, "trial state finished");
            match state.next() {
                Some(next) => state = next,
                None => break,
            }
        }

        Ok(ResponseRecord {
            block,
            participant_id: participant.id.clone(),
            age: participant.age,
            word: trial.word.clone(),
            ink: trial.ink.clone(),
            trial_type: trial.congruence,
            response_color: scored.response_color,
            reaction_time_seconds: scored.reaction_time_seconds,
            correct: scored.correct,
        })
    }

    /// Waits out the response window that opened at `onset_ns`.
    ///
    /// Presses stamped before onset were queued during fixation and are
    /// skipped; presses stamped past the window count as misses.
    fn await_response(&mut self, onset_ns: u64) -> Result<Option<(char, Duration)>> {
        let max_wait = self.config.max_response();
        loop {
            let waited = Duration::from_nanos(self.timer.now().saturating_sub(onset_ns));
            let Some(remaining) = max_wait.checked_sub(waited) else {
                return Ok(None);
            };
            let Some(press) = self
                .keys
                .wait_for_key(Some(remaining), Some(self.response_keys.as_slice()))?
            else {
                return Ok(None);
            };
            if press.timestamp_ns < onset_ns {
                debug!(key = %press.key, "dropping press from before stimulus onset");
                continue;
            }
            let rt = Duration::from_nanos(press.timestamp_ns - onset_ns);
            return Ok((rt <= max_wait).then_some((press.key, rt)));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stroop_core::Congruence;

    fn trial(word: &str, ink: &str) -> Trial {
        Trial {
            word: word.to_string(),
            ink: ink.to_string(),
            congruence: Congruence::Incongruent,
        }
    }

    #[test]
    fn matching_key_scores_correct() {
        let config = StroopConfig::default();
        let scored = score_response(
            &config,
            &trial("MAVI", "red"),
            Some(('r', Duration::from_millis(300))),
        );
        assert_eq!(scored.response_color.as_deref(), Some("KIRMIZI"));
        assert!(scored.correct);
        assert_eq!(scored.feedback, FeedbackKind::Correct);
        assert!((scored.reaction_time_seconds.unwrap() - 0.3).abs() < 1e-9);
    }

    #[test]
    fn reading_the_word_instead_of_the_ink_is_incorrect() {
        let config = StroopConfig::default();
        let scored = score_response(
            &config,
            &trial("MAVI", "red"),
            Some(('b', Duration::from_millis(650))),
        );
        assert_eq!(scored.response_color.as_deref(), Some("MAVI"));
        assert!(!scored.correct);
        assert_eq!(scored.feedback, FeedbackKind::Incorrect);
    }

    #[test]
    fn no_response_is_too_slow() {
        let config = StroopConfig::default();
        let scored = score_response(&config, &trial("SARI", "green"), None);
        assert_eq!(scored, ScoredResponse::missed());
        assert_eq!(scored.feedback, FeedbackKind::TooSlow);
    }
}
