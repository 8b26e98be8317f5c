use crate::config::StroopConfig;
use crate::error::Result;
use crate::generator::generate_trials;
use crate::io::{KeySource, ParticipantSource, Presenter};
use crate::output::{ensure_results_dir, results_path, summary_path, write_csv, write_summary};
use crate::runner::TrialRunner;
use crate::summary::SessionSummary;
use chrono::NaiveDateTime;
use rand::Rng;
use std::path::PathBuf;
use stroop_core::{Participant, Phase, ResponseRecord, Screen, StroopPhase};
use stroop_timing::Timer;
use tracing::info;

/// Participant and output location, fixed before any trial runs
#[derive(Debug, Clone)]
pub struct SessionPlan {
    pub participant: Participant,
    pub started_at: NaiveDateTime,
    pub output_path: PathBuf,
}

impl SessionPlan {
    /// Asks for the participant, then creates the results directory.
    ///
    /// Returns `Ok(None)` on cancellation without touching the filesystem.
    pub fn prepare<S: ParticipantSource + ?Sized>(
        config: &StroopConfig,
        source: &mut S,
        started_at: NaiveDateTime,
    ) -> Result<Option<Self>> {
        let Some(participant) = source.request_participant()? else {
            info!("participant dialog cancelled");
            return Ok(None);
        };

        ensure_results_dir(&config.results_dir)?;
        let output_path = results_path(&config.results_dir, &participant.id, started_at);
        info!(
            participant = %participant.id,
            age = participant.age,
            output = %output_path.display(),
            "session prepared"
        );

        Ok(Some(Self {
            participant,
            started_at,
            output_path,
        }))
    }
}

#[derive(Debug, Clone)]
pub struct SessionReport {
    pub records: Vec<ResponseRecord>,
    pub summary: SessionSummary,
    pub csv_path: PathBuf,
    pub summary_path: PathBuf,
}

/// Walks the session phases: instructions, practice, transition, main,
/// completion.
pub struct Session<'a, T, P, K, R>
where
    T: Timer,
    P: Presenter,
    K: KeySource,
    R: Rng,
{
    config: &'a StroopConfig,
    plan: &'a SessionPlan,
    timer: T,
    presenter: P,
    keys: K,
    rng: R,
    phase: StroopPhase,
    records: Vec<ResponseRecord>,
}

impl<'a, T, P, K, R> Session<'a, T, P, K, R>
where
    T: Timer<Timestamp = u64>,
    P: Presenter,
    K: KeySource,
    R: Rng,
{
    pub fn new(
        config: &'a StroopConfig,
        plan: &'a SessionPlan,
        timer: T,
        presenter: P,
        keys: K,
        rng: R,
    ) -> Self {
        Self {
            config,
            plan,
            timer,
            presenter,
            keys,
            rng,
            phase: StroopPhase::default(),
            records: Vec::new(),
        }
    }

    pub fn current_phase(&self) -> &StroopPhase {
        &self.phase
    }

    pub fn run(mut self) -> Result<SessionReport> {
        while !self.phase.is_complete() {
            info!(phase = ?self.phase, "entering phase");
            if self.phase.waits_for_key() {
                let text = match self.phase {
                    StroopPhase::Instructions => self.config.instructions(),
                    _ => self.config.texts.transition.clone(),
                };
                self.hold_message(text)?;
            } else if self.phase.block().is_some() {
                self.run_block()?;
            }
            match self.phase.next() {
                Some(next) => self.phase = next,
                None => break,
            }
        }
        self.finish()
    }

    fn hold_message(&mut self, text: String) -> Result<()> {
        self.presenter.present(&Screen::Message(text))?;
        self.keys.wait_for_key(None, None)?;
        self.keys.clear_pending();
        Ok(())
    }

    fn run_block(&mut self) -> Result<()> {
        let Some(block) = self.phase.block() else {
            return Ok(());
        };
        let count = self.config.trials_for(block);
        let trials = generate_trials(count, &self.config.colors, &mut self.rng)?;
        info!(block = %block, trials = trials.len(), "block starting");

        let mut runner =
            TrialRunner::new(self.config, &self.timer, &mut self.presenter, &mut self.keys);
        let records = runner.run_block(block, &self.plan.participant, &trials)?;
        self.records.extend(records);
        Ok(())
    }

    fn finish(mut self) -> Result<SessionReport> {
        // An abort still pending from the last feedback screen writes nothing.
        self.keys.check_abort()?;

        let csv_path = self.plan.output_path.clone();
        write_csv(&csv_path, &self.records)?;
        info!(rows = self.records.len(), path = %csv_path.display(), "results written");

        let summary = SessionSummary::from_records(&self.plan.participant, &self.records);
        summary.log();
        let summary_path = summary_path(&csv_path);
        write_summary(&summary_path, &summary)?;

        self.presenter
            .present(&Screen::Message(self.config.texts.completion.clone()))?;
        self.timer.sleep(self.config.completion());

        Ok(SessionReport {
            records: std::mem::take(&mut self.records),
            summary,
            csv_path,
            summary_path,
        })
    }
}
