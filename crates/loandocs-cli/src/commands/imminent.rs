use loandocs_core::error::LoanDocsError;
use loandocs_core::export::imminent_download;
use loandocs_core::ImminentOptions;
use std::path::PathBuf;
use tracing::debug;

use crate::commands::{read_input, reference_date, save_export, RuleArgs};
use crate::output;

pub fn run(
    input_file: PathBuf,
    rule_args: &RuleArgs,
    today: Option<&str>,
    months: u32,
    evaluate_first: bool,
    output_format: &str,
    output_file: Option<PathBuf>,
) -> Result<(), LoanDocsError> {
    let ruleset = rule_args.load()?;
    let options = ImminentOptions::new(reference_date(today)?).with_window_months(months);
    let window = options.window();
    debug!(from = %window.start, to = %window.end, evaluate_first, "imminent window");

    let (filename, bytes) = read_input(&input_file)?;
    let outcome = loandocs_core::imminent_from_upload(
        &filename,
        &bytes,
        &ruleset,
        &options,
        evaluate_first,
    )?;

    match output_file {
        Some(path) => {
            let target = save_export(&path, &outcome.to_table(&ruleset), imminent_download)?;
            eprintln!(
                "{} imminent document(s), written to {}",
                outcome.entries().len(),
                target.display()
            );
        }
        None => match output_format {
            "json" => output::json::print(&outcome)?,
            _ => output::table::print_imminent(&outcome, &ruleset, &window),
        },
    }

    Ok(())
}
