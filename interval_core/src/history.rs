//! Session history.
//!
//! Summaries of finished or abandoned playbacks are appended to a JSONL
//! (JSON Lines) file with file locking, and read back for review.

use crate::fileio;
use crate::playback::StepStatus;
use crate::{Error, Result};
use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Outcome of one timeline step within a session
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct StepRecord {
    pub id: String,
    pub name: String,
    pub status: StepStatus,
    pub planned_secs: u32,
    pub elapsed_ms: u64,
}

/// Completion summary of a playback session
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct SessionSummary {
    pub id: Uuid,
    pub plan_id: String,
    pub plan_name: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    /// False when the session was stopped before the last step ended
    pub completed: bool,
    pub planned_secs: u32,
    pub total_elapsed_ms: u64,
    pub steps: Vec<StepRecord>,
}

impl SessionSummary {
    pub fn count(&self, status: StepStatus) -> usize {
        self.steps.iter().filter(|s| s.status == status).count()
    }
}

/// Sink for persisting session summaries
pub trait SummarySink {
    fn append(&mut self, summary: &SessionSummary) -> Result<()>;
}

/// Appends each summary as one line of a JSON Lines file
pub struct JsonlSink {
    path: PathBuf,
}

impl JsonlSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl SummarySink for JsonlSink {
    fn append(&mut self, summary: &SessionSummary) -> Result<()> {
        let line = serde_json::to_string(summary)?;
        fileio::append_line(&self.path, &line)?;
        tracing::debug!("Appended session {} to history", summary.id);
        Ok(())
    }
}

/// Every readable summary in a history file, oldest first
///
/// A missing file is an empty history. Lines that fail to parse are
/// skipped with a warning.
pub fn read_summaries(path: &Path) -> Result<Vec<SessionSummary>> {
    let Some(contents) = fileio::read_shared(path)? else {
        return Ok(Vec::new());
    };

    let summaries: Vec<SessionSummary> = contents
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .filter_map(|(i, line)| match serde_json::from_str(line) {
            Ok(summary) => Some(summary),
            Err(e) => {
                tracing::warn!("Skipping unreadable session on line {}: {}", i + 1, e);
                None
            }
        })
        .collect();

    tracing::debug!("Read {} sessions from {:?}", summaries.len(), path);
    Ok(summaries)
}

/// Summaries started within the last `days` days, newest first
///
/// Negative or unrepresentable windows are rejected. A window reaching
/// past the earliest representable date covers the whole history.
pub fn load_recent_summaries(path: &Path, days: i64) -> Result<Vec<SessionSummary>> {
    let window = TimeDelta::try_days(days)
        .filter(|w| *w >= TimeDelta::zero())
        .ok_or_else(|| Error::Validation(format!("history window of {} days", days)))?;
    let cutoff = Utc::now()
        .checked_sub_signed(window)
        .unwrap_or(DateTime::<Utc>::MIN_UTC);

    let mut recent: Vec<_> = read_summaries(path)?
        .into_iter()
        .filter(|s| s.started_at >= cutoff)
        .collect();
    recent.sort_by(|a, b| b.started_at.cmp(&a.started_at));
    Ok(recent)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::OpenOptions;
    use std::io::Write;

    fn create_test_summary(plan_id: &str, days_ago: i64) -> SessionSummary {
        let started_at = Utc::now() - TimeDelta::days(days_ago);
        SessionSummary {
            id: Uuid::new_v4(),
            plan_id: plan_id.into(),
            plan_name: "Intervals".into(),
            started_at,
            finished_at: started_at + TimeDelta::minutes(20),
            completed: true,
            planned_secs: 1200,
            total_elapsed_ms: 1_200_000,
            steps: vec![
                StepRecord {
                    id: "a".into(),
                    name: "warmup".into(),
                    status: StepStatus::Completed,
                    planned_secs: 300,
                    elapsed_ms: 300_000,
                },
                StepRecord {
                    id: "b".into(),
                    name: "sprint".into(),
                    status: StepStatus::Skipped,
                    planned_secs: 900,
                    elapsed_ms: 12_000,
                },
            ],
        }
    }

    #[test]
    fn test_append_and_read_single_summary() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("sessions.jsonl");

        let summary = create_test_summary("plan", 0);
        let mut sink = JsonlSink::new(&path);
        sink.append(&summary).unwrap();

        let read = read_summaries(&path).unwrap();
        assert_eq!(read, vec![summary]);
        assert_eq!(read[0].count(StepStatus::Skipped), 1);
    }

    #[test]
    fn test_corrupt_lines_are_skipped() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("sessions.jsonl");

        let mut sink = JsonlSink::new(&path);
        sink.append(&create_test_summary("first", 0)).unwrap();
        {
            let mut file = OpenOptions::new().append(true).open(&path).unwrap();
            writeln!(file, "{{ not json").unwrap();
        }
        sink.append(&create_test_summary("second", 0)).unwrap();

        let read = read_summaries(&path).unwrap();
        assert_eq!(read.len(), 2);
        assert_eq!(read[1].plan_id, "second");
    }

    #[test]
    fn test_read_missing_history() {
        let temp_dir = tempfile::tempdir().unwrap();
        let read = read_summaries(&temp_dir.path().join("missing.jsonl")).unwrap();
        assert!(read.is_empty());
    }

    #[test]
    fn test_recent_window_newest_first() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("sessions.jsonl");

        let mut sink = JsonlSink::new(&path);
        sink.append(&create_test_summary("old", 5)).unwrap();
        sink.append(&create_test_summary("new", 1)).unwrap();
        sink.append(&create_test_summary("ancient", 40)).unwrap();

        let recent = load_recent_summaries(&path, 7).unwrap();
        let ids: Vec<&str> = recent.iter().map(|s| s.plan_id.as_str()).collect();
        assert_eq!(ids, vec!["new", "old"]);
    }

    #[test]
    fn test_out_of_range_windows() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("sessions.jsonl");
        let mut sink = JsonlSink::new(&path);
        sink.append(&create_test_summary("ancient", 4000)).unwrap();

        assert!(matches!(
            load_recent_summaries(&path, 999_999_999_999_999),
            Err(Error::Validation(_))
        ));
        assert!(matches!(
            load_recent_summaries(&path, -1),
            Err(Error::Validation(_))
        ));

        // representable as a delta but further back than any date
        let all = load_recent_summaries(&path, 10_000_000_000).unwrap();
        assert_eq!(all.len(), 1);
    }
}
