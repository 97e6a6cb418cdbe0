pub mod engine;
pub mod outcome;

use chrono::{Local, NaiveDate};

pub use engine::{evaluate, evaluate_record, evaluate_rule};
pub use outcome::{DateWarning, Evaluation, EvaluationSummary, RecordDeadlines};

/// Options for deadline evaluation.
#[derive(Debug, Clone)]
pub struct EvaluateOptions {
    /// Anchor for date formats that carry no year (`Nov-30`).
    pub reference_date: NaiveDate,
}

impl EvaluateOptions {
    pub fn new(reference_date: NaiveDate) -> Self {
        EvaluateOptions { reference_date }
    }
}

impl Default for EvaluateOptions {
    fn default() -> Self {
        EvaluateOptions::new(Local::now().date_naive())
    }
}
