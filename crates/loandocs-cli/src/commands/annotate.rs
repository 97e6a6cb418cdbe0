use loandocs_core::error::LoanDocsError;
use loandocs_core::export::annotated_download;
use loandocs_core::EvaluateOptions;
use std::path::PathBuf;

use crate::commands::{read_input, reference_date, save_export, RuleArgs};
use crate::output;

pub fn run(
    input_file: PathBuf,
    rule_args: &RuleArgs,
    today: Option<&str>,
    output_format: &str,
    output_file: Option<PathBuf>,
) -> Result<(), LoanDocsError> {
    let ruleset = rule_args.load()?;
    let options = EvaluateOptions::new(reference_date(today)?);
    let (filename, bytes) = read_input(&input_file)?;

    let evaluation = loandocs_core::annotate_upload(&filename, &bytes, &ruleset, &options)?;

    match output_file {
        Some(path) => {
            let target = save_export(&path, &evaluation.table, |t| {
                annotated_download(t, &filename)
            })?;
            eprintln!(
                "Annotated {} record(s), written to {}",
                evaluation.summary.rows,
                target.display()
            );
            for w in &evaluation.summary.warnings {
                eprintln!(
                    "  warning: record {} has unreadable {} '{}'",
                    w.record, w.column, w.raw
                );
            }
        }
        None => match output_format {
            "json" => output::json::print(&evaluation)?,
            _ => output::table::print_evaluation(&evaluation, &ruleset),
        },
    }

    Ok(())
}
