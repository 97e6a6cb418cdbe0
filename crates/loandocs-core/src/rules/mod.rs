pub mod builtin;
pub mod schema;

use crate::error::LoanDocsError;
use schema::RuleSetDef;
use std::collections::HashSet;
use std::path::Path;

/// Offsets beyond roughly ten years are almost certainly typos.
pub const MAX_OFFSET_DAYS: i64 = 3660;

/// Load a ruleset from a JSON file.
pub fn load_ruleset(path: &Path) -> Result<RuleSetDef, LoanDocsError> {
    let content = std::fs::read_to_string(path).map_err(|e| LoanDocsError::RulesetLoad {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    parse_ruleset(&content, path)
}

/// Parse a ruleset from a JSON string.
pub fn parse_ruleset(json: &str, source: &Path) -> Result<RuleSetDef, LoanDocsError> {
    let ruleset: RuleSetDef =
        serde_json::from_str(json).map_err(|e| LoanDocsError::RulesetLoad {
            path: source.to_path_buf(),
            reason: e.to_string(),
        })?;
    validate_ruleset(&ruleset)?;
    Ok(ruleset)
}

/// Parse a ruleset from a JSON string (no file path context).
pub fn parse_ruleset_str(json: &str) -> Result<RuleSetDef, LoanDocsError> {
    let ruleset: RuleSetDef = serde_json::from_str(json).map_err(LoanDocsError::Json)?;
    validate_ruleset(&ruleset)?;
    Ok(ruleset)
}

/// Validate that a ruleset is well-formed.
pub fn validate_ruleset(ruleset: &RuleSetDef) -> Result<(), LoanDocsError> {
    if ruleset.rules.is_empty() {
        return Err(LoanDocsError::RulesetInvalid("rules must not be empty".into()));
    }

    if ruleset.status_field.trim().is_empty() {
        return Err(LoanDocsError::RulesetInvalid(
            "status_field must not be empty".into(),
        ));
    }

    let mut fields = HashSet::new();
    let mut labels = HashSet::new();

    for rule in &ruleset.rules {
        if rule.field.trim().is_empty() {
            return Err(LoanDocsError::RulesetInvalid(
                "rule field name must not be empty".into(),
            ));
        }

        if rule.field == ruleset.status_field {
            return Err(LoanDocsError::RulesetInvalid(format!(
                "rule field '{}' collides with the status field",
                rule.field
            )));
        }

        if !fields.insert(rule.field.as_str()) {
            return Err(LoanDocsError::RulesetInvalid(format!(
                "rule field '{}' is defined more than once",
                rule.field
            )));
        }

        if !labels.insert(rule.label()) {
            return Err(LoanDocsError::RulesetInvalid(format!(
                "rule label '{}' is used more than once",
                rule.label()
            )));
        }

        if rule.base.trim().is_empty() {
            return Err(LoanDocsError::RulesetInvalid(format!(
                "rule '{}' has no base date column",
                rule.field
            )));
        }

        if rule.when.column.trim().is_empty() {
            return Err(LoanDocsError::RulesetInvalid(format!(
                "rule '{}' has no condition column",
                rule.field
            )));
        }

        if rule.when.any_of.is_empty() {
            return Err(LoanDocsError::RulesetInvalid(format!(
                "rule '{}' has an empty any_of list",
                rule.field
            )));
        }

        if rule.offset_days.abs() > MAX_OFFSET_DAYS {
            return Err(LoanDocsError::RulesetInvalid(format!(
                "rule '{}' offset {} days exceeds {} days",
                rule.field, rule.offset_days, MAX_OFFSET_DAYS
            )));
        }
    }

    Ok(())
}
