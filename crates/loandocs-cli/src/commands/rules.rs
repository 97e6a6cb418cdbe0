use loandocs_core::error::LoanDocsError;
use loandocs_core::rules::builtin;
use loandocs_core::rules::schema::{DeadlineRuleDef, RuleSetDef};
use std::path::Path;
use unicode_width::UnicodeWidthStr;

pub fn list() -> Result<(), LoanDocsError> {
    println!("Available predefined rulesets:\n");
    for name in builtin::PRESETS {
        let rs = builtin::load_preset(name)?;
        let default_marker = if *name == builtin::DEFAULT_PRESET {
            " [default]"
        } else {
            ""
        };
        println!("  {:<14} {} (v{}){}", name, rs.name, rs.version, default_marker);
        if let Some(ref desc) = rs.description {
            println!("                 {}", desc);
        }
        println!();
    }
    Ok(())
}

pub fn explain(preset: &str) -> Result<(), LoanDocsError> {
    let rs = builtin::load_preset(preset)?;
    explain_ruleset(&rs);
    Ok(())
}

fn offset_phrase(rule: &DeadlineRuleDef) -> String {
    match rule.offset_days {
        0 => format!("on {}", rule.base),
        n if n < 0 => format!("{} day(s) before {}", -n, rule.base),
        n => format!("{} day(s) after {}", n, rule.base),
    }
}

fn explain_ruleset(rs: &RuleSetDef) {
    println!("{} (version {})\n", rs.name, rs.version);

    if let Some(ref desc) = rs.description {
        println!("{}\n", desc);
    }

    println!(
        "Each record is matched against {} document rule(s). A rule whose",
        rs.rules.len()
    );
    println!("condition holds gets a due date; otherwise the field reads");
    println!("'{}'.\n", rs.not_applicable);

    let max_label = rs
        .rules
        .iter()
        .map(|r| r.label().width())
        .max()
        .unwrap_or(10);

    for rule in &rs.rules {
        let pad = " ".repeat(max_label.saturating_sub(rule.label().width()));
        println!("  {}{}  {}", rule.label(), pad, rule.field);
        println!(
            "  {}  when {} is {}",
            " ".repeat(max_label),
            rule.when.column,
            rule.when.any_of.join(" / ")
        );
        println!("  {}  due {}", " ".repeat(max_label), offset_phrase(rule));
        if let Some(ref note) = rule.note {
            println!("  {}  {}", " ".repeat(max_label), note);
        }
        println!();
    }

    println!("Status column '{}':", rs.status_field);
    println!("  완료      every document rule applies");
    println!("  진행중    some but not all apply");
    println!("  미진행중  none apply\n");
}

pub fn schema() -> Result<(), LoanDocsError> {
    print!("{}", schema_text());
    Ok(())
}

fn schema_text() -> String {
    format!(
        r#"JSON Rule Schema
================

A rule file describes which supporting documents a loan record owes and
when each is due. `loandocs annotate` adds one column per rule holding
the due date, or the not-applicable marker when the rule's condition
does not hold.

Top-level fields:
  name          (string, required)  Human-readable name of the ruleset
  description   (string, optional)  What this ruleset is for
  version       (string, required)  Version identifier (e.g., "2024.10")
  not_applicable
                (string, optional)  Marker written when a rule does not
                                    apply. Default: "해당없음"
  status_field  (string, optional)  Column receiving 완료 / 진행중 / 미진행중.
                                    Default: "서류제출완료여부"
  columns       (object, optional)  Identity columns used in the imminent
                                    listing: employee_id, name, title.
                                    Defaults: "사번", "성명", "직위"
  rules         (array, required)   List of document rules (see below)

Each rule in the "rules" array:
  field         (string, required)  Output column holding the deadline.
                                    Must be unique and differ from
                                    status_field.
  label         (string, optional)  Short document name shown in the
                                    imminent listing. Default: field
  when          (object, required)  Condition: {{ "column": ..., "any_of": [...] }}.
                                    Holds when the record's value in
                                    column equals one of any_of (surrounding
                                    and repeated whitespace ignored). A blank
                                    or missing value never matches.
  base          (string, required)  Column holding the base date
  offset_days   (integer, required) Days added to the base date; negative
                                    means before. At most 3660 either way.
  note          (string, optional)  Explanation shown by `rules explain`

Base dates may be spreadsheet dates or text such as "2024-11-30",
"2024-11", "2024년 11월" or "Nov-30".

Example:
{{
  "name": "Relocation documents",
  "version": "1.0",
  "rules": [
    {{
      "field": "계약서 제출기한",
      "label": "계약서",
      "when": {{ "column": "지원유형", "any_of": ["이전", "신규"] }},
      "base": "계약일",
      "offset_days": 14
    }}
  ]
}}
"#
    )
}

pub fn validate(file: &Path) -> Result<(), LoanDocsError> {
    let rs = loandocs_core::rules::load_ruleset(file)?;

    println!("Ruleset '{}' (v{}) is valid.", rs.name, rs.version);
    println!("  Rules: {} document(s)", rs.rules.len());
    println!("  Status column: {}", rs.status_field);

    // Suspicious but legal
    let mut warnings = Vec::new();
    for rule in &rs.rules {
        if rule.base == rule.field {
            warnings.push(format!(
                "rule '{}' reads its base date from its own output column",
                rule.label()
            ));
        }
        if rule.when.column == rule.field {
            warnings.push(format!(
                "rule '{}' tests its own output column",
                rule.label()
            ));
        }
        if rule.when.any_of.iter().any(|v| v.trim().is_empty()) {
            warnings.push(format!(
                "rule '{}' accepts a blank value, which never matches",
                rule.label()
            ));
        }
    }

    if !warnings.is_empty() {
        println!("\nWarnings:");
        for w in &warnings {
            println!("  - {}", w);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offset_phrase() {
        let rs = builtin::load_preset("housing-loan").unwrap();
        assert_eq!(offset_phrase(&rs.rules[0]), "30 day(s) before 대출신청월");
        assert_eq!(offset_phrase(&rs.rules[1]), "90 day(s) after 입주예정일");
    }

    #[test]
    fn test_schema_text_renders_literal_braces() {
        let text = schema_text();
        assert!(text.contains(r#"Condition: { "column": ..., "any_of": [...] }."#));

        let example = text.split("Example:\n").nth(1).unwrap();
        let rs = loandocs_core::rules::parse_ruleset_str(example).unwrap();
        assert_eq!(rs.rules[0].label(), "계약서");
    }
}
