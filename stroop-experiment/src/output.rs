use crate::error::{ExperimentError, Result};
use crate::summary::SessionSummary;
use chrono::NaiveDateTime;
use std::borrow::Cow;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use stroop_core::ResponseRecord;

pub const CSV_COLUMNS: [&str; 9] = [
    "block",
    "participant_id",
    "age",
    "word",
    "ink",
    "trial_type",
    "response_color",
    "reaction_time_seconds",
    "correct",
];

/// `<dir>/stroop_<participant>_<YYYYMMDD_HHMM>.csv`
pub fn results_path(dir: &Path, participant_id: &str, started_at: NaiveDateTime) -> PathBuf {
    let id: String = participant_id
        .chars()
        .map(|c| if matches!(c, '/' | '\\') { '_' } else { c })
        .collect();
    dir.join(format!(
        "stroop_{}_{}.csv",
        id,
        started_at.format("%Y%m%d_%H%M")
    ))
}

/// Sidecar path for the session summary, next to the CSV.
pub fn summary_path(csv_path: &Path) -> PathBuf {
    let stem = csv_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "stroop".to_string());
    csv_path.with_file_name(format!("{stem}_summary.json"))
}

pub fn ensure_results_dir(dir: &Path) -> Result<()> {
    std::fs::create_dir_all(dir).map_err(|e| ExperimentError::io(dir, e))
}

pub fn write_csv(path: &Path, records: &[ResponseRecord]) -> Result<()> {
    let file = File::create(path).map_err(|e| ExperimentError::io(path, e))?;
    let mut out = BufWriter::new(file);
    render_csv(&mut out, records).map_err(|e| ExperimentError::io(path, e))?;
    out.flush().map_err(|e| ExperimentError::io(path, e))
}

pub fn render_csv<W: Write>(out: &mut W, records: &[ResponseRecord]) -> std::io::Result<()> {
    writeln!(out, "{}", CSV_COLUMNS.join(","))?;
    for r in records {
        let age = r.age.to_string();
        let rt = r
            .reaction_time_seconds
            .map(|s| s.to_string())
            .unwrap_or_default();
        let fields = [
            r.block.label(),
            r.participant_id.as_str(),
            age.as_str(),
            r.word.as_str(),
            r.ink.as_str(),
            r.trial_type.label(),
            r.response_color.as_deref().unwrap_or(""),
            rt.as_str(),
            if r.correct { "true" } else { "false" },
        ];
        let row: Vec<Cow<'_, str>> = fields.iter().map(|f| escape_field(f)).collect();
        writeln!(out, "{}", row.join(","))?;
    }
    Ok(())
}

pub fn write_summary(path: &Path, summary: &SessionSummary) -> Result<()> {
    let file = File::create(path).map_err(|e| ExperimentError::io(path, e))?;
    let mut out = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut out, summary)?;
    out.flush().map_err(|e| ExperimentError::io(path, e))
}

fn escape_field(field: &str) -> Cow<'_, str> {
    if field.contains([',', '"', '\n', '\r']) {
        Cow::Owned(format!("\"{}\"", field.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(field)
    }
}
