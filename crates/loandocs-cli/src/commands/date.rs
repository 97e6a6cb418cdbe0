use loandocs_core::error::LoanDocsError;
use loandocs_core::parsing::{DateNormalizer, DateOutcome};
use serde::Serialize;

use crate::commands::reference_date;
use crate::output;

#[derive(Serialize)]
struct DateReading<'a> {
    raw: &'a str,
    #[serde(flatten)]
    outcome: &'a DateOutcome,
}

pub fn run(values: &[String], today: Option<&str>, output_format: &str) -> Result<(), LoanDocsError> {
    let normalizer = DateNormalizer::new(reference_date(today)?);
    let results: Vec<(String, DateOutcome)> = values
        .iter()
        .map(|raw| (raw.clone(), normalizer.normalize_str(raw)))
        .collect();

    match output_format {
        "json" => {
            let readings: Vec<DateReading> = results
                .iter()
                .map(|(raw, outcome)| DateReading { raw, outcome })
                .collect();
            output::json::print(&readings)?;
        }
        _ => output::table::print_dates(&results),
    }

    // A single value is a strict lookup
    if let [(_, outcome)] = results.as_slice() {
        outcome.clone().require()?;
    }

    Ok(())
}
