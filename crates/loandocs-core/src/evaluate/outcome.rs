use serde::{Deserialize, Serialize};

use crate::model::{DeadlineValue, SubmissionStatus, Table};

/// Deadlines derived for one record, in ruleset order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordDeadlines {
    pub deadlines: Vec<DeadlineValue>,
    pub status: SubmissionStatus,
    /// Base-date cells that were present but could not be read, as (rule index, raw text).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub unparseable: Vec<(usize, String)>,
}

/// A base date that could not be parsed. The deadline fell back to not-applicable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateWarning {
    /// 1-based data row (the header row is not counted).
    pub record: usize,
    pub column: String,
    pub raw: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvaluationSummary {
    pub rows: usize,
    pub complete: usize,
    pub in_progress: usize,
    pub not_started: usize,
    pub warnings: Vec<DateWarning>,
}

impl EvaluationSummary {
    pub(crate) fn count(&mut self, status: SubmissionStatus) {
        self.rows += 1;
        match status {
            SubmissionStatus::Complete => self.complete += 1,
            SubmissionStatus::InProgress => self.in_progress += 1,
            SubmissionStatus::NotStarted => self.not_started += 1,
        }
    }
}

/// The annotated table plus what happened while building it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evaluation {
    pub table: Table,
    pub summary: EvaluationSummary,
}
