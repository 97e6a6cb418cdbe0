use crate::error::LoanDocsError;
use crate::rules::schema::RuleSetDef;

const HOUSING_LOAN_JSON: &str = include_str!("../../../../rules/housing-loan.json");

/// Available predefined rulesets.
pub const PRESETS: &[&str] = &["housing-loan"];

/// Preset used when neither `--rules` nor `--preset` is given.
pub const DEFAULT_PRESET: &str = "housing-loan";

/// Load a predefined ruleset by name.
pub fn load_preset(name: &str) -> Result<RuleSetDef, LoanDocsError> {
    match name {
        "housing-loan" => {
            let ruleset: RuleSetDef = serde_json::from_str(HOUSING_LOAN_JSON)?;
            Ok(ruleset)
        }
        _ => Err(LoanDocsError::RulesetInvalid(format!(
            "unknown preset '{}'. Available: {}",
            name,
            PRESETS.join(", ")
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::validate_ruleset;

    #[test]
    fn test_load_housing_loan_preset() {
        let rs = load_preset("housing-loan").unwrap();
        assert_eq!(rs.rules.len(), 4);
        assert_eq!(rs.status_field, "서류제출완료여부");
        validate_ruleset(&rs).unwrap();
    }

    #[test]
    fn test_preset_rule_table() {
        let rs = load_preset("housing-loan").unwrap();
        let summary: Vec<(&str, &str, i64)> = rs
            .rules
            .iter()
            .map(|r| (r.label(), r.base.as_str(), r.offset_days))
            .collect();
        assert_eq!(
            summary,
            vec![
                ("기존 소유 증빙", "대출신청월", -30),
                ("구매 등기 증빙", "입주예정일", 90),
                ("구매 주민등록 증빙", "입주예정일", 90),
                ("전세 증빙", "입주예정일", 90),
            ]
        );
        assert_eq!(rs.rules[1].when.any_of, vec!["구매", "분양"]);
        assert_eq!(rs.rules[3].when.any_of, vec!["전세"]);
    }

    #[test]
    fn test_unknown_preset() {
        assert!(load_preset("xyz").is_err());
    }
}
