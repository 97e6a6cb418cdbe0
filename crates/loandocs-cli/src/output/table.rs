use loandocs_core::evaluate::Evaluation;
use loandocs_core::imminent::{ImminentOutcome, Window};
use loandocs_core::model::Table;
use loandocs_core::parsing::DateOutcome;
use loandocs_core::rules::schema::RuleSetDef;
use unicode_width::UnicodeWidthStr;

/// Render a table with columns padded to their display width.
/// Hangul is double width, so `str::len` would misalign.
pub fn format_table(table: &Table) -> String {
    let cells: Vec<Vec<String>> = table
        .rows
        .iter()
        .map(|row| row.iter().map(|c| c.to_string()).collect())
        .collect();

    let widths: Vec<usize> = table
        .columns
        .iter()
        .enumerate()
        .map(|(i, header)| {
            cells
                .iter()
                .filter_map(|row| row.get(i))
                .map(|s| s.width())
                .chain(std::iter::once(header.width()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let mut out = String::new();
    push_line(&mut out, table.columns.iter().map(String::as_str), &widths);
    let rule_len = widths.iter().sum::<usize>() + 2 * widths.len().saturating_sub(1);
    out.push_str("  ");
    out.push_str(&"-".repeat(rule_len));
    out.push('\n');
    for row in &cells {
        push_line(&mut out, row.iter().map(String::as_str), &widths);
    }
    out
}

fn push_line<'a>(out: &mut String, cells: impl Iterator<Item = &'a str>, widths: &[usize]) {
    let mut line = String::from("  ");
    for (i, (cell, width)) in cells.zip(widths).enumerate() {
        if i > 0 {
            line.push_str("  ");
        }
        line.push_str(cell);
        line.push_str(&" ".repeat(width.saturating_sub(cell.width())));
    }
    out.push_str(line.trim_end());
    out.push('\n');
}

pub fn print_evaluation(evaluation: &Evaluation, ruleset: &RuleSetDef) {
    println!("=== {} (v{}) ===\n", ruleset.name, ruleset.version);
    print!("{}", format_table(&evaluation.table));
    println!();

    let s = &evaluation.summary;
    println!(
        "  {} record(s): 완료 {}, 진행중 {}, 미진행중 {}",
        s.rows, s.complete, s.in_progress, s.not_started
    );

    if !s.warnings.is_empty() {
        println!("\n  Unreadable dates (deadline set to {}):", ruleset.not_applicable);
        for w in &s.warnings {
            println!("    record {}  {}: '{}'", w.record, w.column, w.raw);
        }
    }
}

pub fn print_imminent(outcome: &ImminentOutcome, ruleset: &RuleSetDef, window: &Window) {
    println!(
        "=== Deadlines from {} to {} ===\n",
        window.start, window.end
    );
    match outcome {
        ImminentOutcome::Empty => println!("  No deadlines fall within the window."),
        ImminentOutcome::Entries(entries) => {
            print!("{}", format_table(&outcome.to_table(ruleset)));
            println!("\n  {} document(s) due", entries.len());
        }
    }
}

pub fn print_dates(results: &[(String, DateOutcome)]) {
    let width = results.iter().map(|(raw, _)| raw.width()).max().unwrap_or(0);
    for (raw, outcome) in results {
        let shown = match outcome {
            DateOutcome::Date(d) => d.to_string(),
            DateOutcome::Empty => "(empty)".to_string(),
            DateOutcome::Unparseable(_) => "unparseable".to_string(),
        };
        let pad = " ".repeat(width.saturating_sub(raw.width()));
        println!("  {raw}{pad}  -> {shown}");
    }
}
