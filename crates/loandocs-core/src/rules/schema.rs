use serde::{Deserialize, Serialize};

/// A ruleset defining how document deadlines are derived from a record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleSetDef {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub version: String,
    /// Text written into a deadline column whose rule does not apply.
    #[serde(default = "default_not_applicable")]
    pub not_applicable: String,
    /// Column receiving the aggregate submission status.
    #[serde(default = "default_status_field")]
    pub status_field: String,
    #[serde(default)]
    pub columns: IdentityColumns,
    pub rules: Vec<DeadlineRuleDef>,
}

/// Columns that identify an employee in the imminent-deadline listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IdentityColumns {
    pub employee_id: String,
    pub name: String,
    pub title: String,
}

impl Default for IdentityColumns {
    fn default() -> Self {
        IdentityColumns {
            employee_id: "사번".into(),
            name: "성명".into(),
            title: "직위".into(),
        }
    }
}

/// One deadline rule: when `when` holds, the deadline is `base + offset_days`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeadlineRuleDef {
    /// Output column holding the deadline.
    pub field: String,
    /// Short name shown in the imminent listing. Defaults to `field`.
    #[serde(default)]
    pub label: Option<String>,
    pub when: ConditionDef,
    /// Column holding the base date.
    pub base: String,
    pub offset_days: i64,
    #[serde(default)]
    pub note: Option<String>,
}

impl DeadlineRuleDef {
    pub fn label(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.field)
    }
}

/// Category condition: the cell in `column` equals one of `any_of`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConditionDef {
    pub column: String,
    pub any_of: Vec<String>,
}

fn default_not_applicable() -> String {
    "해당없음".into()
}

fn default_status_field() -> String {
    "서류제출완료여부".into()
}
