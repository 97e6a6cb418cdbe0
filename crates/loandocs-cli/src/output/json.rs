use loandocs_core::error::LoanDocsError;
use serde::Serialize;

pub fn print<T: Serialize>(value: &T) -> Result<(), LoanDocsError> {
    let json = serde_json::to_string_pretty(value)?;
    println!("{json}");
    Ok(())
}
