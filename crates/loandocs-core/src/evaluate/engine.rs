use chrono::Duration;
use tracing::{debug, info, warn};

use crate::error::LoanDocsError;
use crate::evaluate::outcome::{DateWarning, Evaluation, EvaluationSummary, RecordDeadlines};
use crate::evaluate::EvaluateOptions;
use crate::model::{CellValue, DeadlineValue, SubmissionStatus, Table};
use crate::parsing::{normalize_category, DateNormalizer, DateOutcome};
use crate::rules::schema::{ConditionDef, DeadlineRuleDef, RuleSetDef};

/// Column positions of one rule's inputs within a table.
#[derive(Debug, Clone, Copy)]
struct RuleInputs {
    condition: usize,
    base: usize,
}

/// Annotate every record of `table` with its deadlines and submission status.
///
/// Returns a new table; `table` is left untouched. Deadline and status
/// columns that already exist are overwritten in place, everything else is
/// appended after the original columns.
pub fn evaluate(
    table: &Table,
    ruleset: &RuleSetDef,
    options: &EvaluateOptions,
) -> Result<Evaluation, LoanDocsError> {
    let inputs = resolve_inputs(table, ruleset)?;
    let normalizer = DateNormalizer::new(options.reference_date);

    debug!(
        rows = table.len(),
        rules = ruleset.rules.len(),
        ruleset = %ruleset.name,
        "evaluating deadlines"
    );

    let mut columns = table.columns.clone();
    let deadline_cols: Vec<usize> = ruleset
        .rules
        .iter()
        .map(|r| position_or_append(&mut columns, &r.field))
        .collect();
    let status_col = position_or_append(&mut columns, &ruleset.status_field);

    let mut annotated = Table::new(columns);
    let mut summary = EvaluationSummary::default();

    for (i, row) in table.rows.iter().enumerate() {
        let result = evaluate_row(row, &inputs, ruleset, &normalizer);

        // Rules sharing a base column report the same cell once
        let mut reported: Vec<&str> = Vec::new();
        for (rule_idx, raw) in &result.unparseable {
            let column = &ruleset.rules[*rule_idx].base;
            if reported.contains(&column.as_str()) {
                continue;
            }
            reported.push(column.as_str());
            warn!(
                record = i + 1,
                column = %column,
                value = %raw,
                "unparseable base date, deadline set to not applicable"
            );
            summary.warnings.push(DateWarning {
                record: i + 1,
                column: column.clone(),
                raw: raw.clone(),
            });
        }

        let mut cells = row.clone();
        cells.resize(annotated.columns.len(), CellValue::Empty);
        for (value, &col) in result.deadlines.iter().zip(&deadline_cols) {
            cells[col] = value.to_cell(&ruleset.not_applicable);
        }
        cells[status_col] = CellValue::text(result.status.label());

        summary.count(result.status);
        annotated.push_row(cells);
    }

    info!(
        rows = summary.rows,
        complete = summary.complete,
        in_progress = summary.in_progress,
        not_started = summary.not_started,
        warnings = summary.warnings.len(),
        "deadline evaluation finished"
    );

    Ok(Evaluation {
        table: annotated,
        summary,
    })
}

/// Evaluate all rules of `ruleset` for a single record.
///
/// `cell` returns the record's value for a column name, or `None` when the
/// record has no such value.
pub fn evaluate_record<'a>(
    ruleset: &RuleSetDef,
    normalizer: &DateNormalizer,
    cell: impl Fn(&str) -> Option<&'a CellValue>,
) -> RecordDeadlines {
    derive_deadlines(ruleset, normalizer, |_, rule| {
        (
            cell(&rule.when.column).unwrap_or(&CellValue::Empty),
            cell(&rule.base).unwrap_or(&CellValue::Empty),
        )
    })
}

/// Apply one rule. The second element carries the raw text of a base date
/// that was present but unreadable.
pub fn evaluate_rule(
    rule: &DeadlineRuleDef,
    condition: &CellValue,
    base: &CellValue,
    normalizer: &DateNormalizer,
) -> (DeadlineValue, Option<String>) {
    if !condition_holds(&rule.when, condition) {
        return (DeadlineValue::NotApplicable, None);
    }

    match normalizer.normalize(base) {
        DateOutcome::Date(date) => {
            let due = date
                .checked_add_signed(Duration::days(rule.offset_days))
                .map(DeadlineValue::Due)
                .unwrap_or(DeadlineValue::NotApplicable);
            (due, None)
        }
        DateOutcome::Empty => (DeadlineValue::NotApplicable, None),
        DateOutcome::Unparseable(raw) => (DeadlineValue::NotApplicable, Some(raw)),
    }
}

/// A missing or blank category never satisfies a condition.
fn condition_holds(condition: &ConditionDef, cell: &CellValue) -> bool {
    if cell.is_blank() {
        return false;
    }
    let value = normalize_category(&cell.to_string());
    condition
        .any_of
        .iter()
        .any(|accepted| normalize_category(accepted) == value)
}

fn evaluate_row(
    row: &[CellValue],
    inputs: &[RuleInputs],
    ruleset: &RuleSetDef,
    normalizer: &DateNormalizer,
) -> RecordDeadlines {
    derive_deadlines(ruleset, normalizer, |idx, _| {
        let cols = inputs[idx];
        (
            row.get(cols.condition).unwrap_or(&CellValue::Empty),
            row.get(cols.base).unwrap_or(&CellValue::Empty),
        )
    })
}

/// `inputs` yields the (condition, base) cells for the rule at an index.
fn derive_deadlines<'a>(
    ruleset: &RuleSetDef,
    normalizer: &DateNormalizer,
    inputs: impl Fn(usize, &DeadlineRuleDef) -> (&'a CellValue, &'a CellValue),
) -> RecordDeadlines {
    let mut deadlines = Vec::with_capacity(ruleset.rules.len());
    let mut unparseable = Vec::new();

    for (idx, rule) in ruleset.rules.iter().enumerate() {
        let (condition, base) = inputs(idx, rule);
        let (value, bad_date) = evaluate_rule(rule, condition, base, normalizer);
        if let Some(raw) = bad_date {
            unparseable.push((idx, raw));
        }
        deadlines.push(value);
    }

    let applicable = deadlines.iter().filter(|d| d.is_applicable()).count();
    RecordDeadlines {
        status: SubmissionStatus::from_applicable(applicable, deadlines.len()),
        deadlines,
        unparseable,
    }
}

fn resolve_inputs(table: &Table, ruleset: &RuleSetDef) -> Result<Vec<RuleInputs>, LoanDocsError> {
    ruleset
        .rules
        .iter()
        .map(|rule| {
            Ok(RuleInputs {
                condition: table.require_column(&rule.when.column)?,
                base: table.require_column(&rule.base)?,
            })
        })
        .collect()
}

fn position_or_append(columns: &mut Vec<String>, name: &str) -> usize {
    match columns.iter().position(|c| c == name) {
        Some(idx) => idx,
        None => {
            columns.push(name.to_string());
            columns.len() - 1
        }
    }
}
