/// Normalize a category cell (ownership status, purchase type) for comparison.
///
/// Steps:
/// 1. Drop non-breaking and zero-width spaces that spreadsheet exports leave behind
/// 2. Trim
/// 3. Collapse internal whitespace runs to a single space
pub fn normalize_category(raw: &str) -> String {
    let cleaned: String = raw
        .chars()
        .map(|c| match c {
            '\u{00a0}' | '\u{3000}' => ' ',
            _ => c,
        })
        .filter(|c| !matches!(c, '\u{200b}' | '\u{feff}'))
        .collect();

    cleaned.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Normalize a header cell. Blank headers get a positional placeholder.
pub fn normalize_header(raw: &str, index: usize) -> String {
    let name = normalize_category(raw);
    if name.is_empty() {
        format!("Unnamed: {index}")
    } else {
        name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trims_and_collapses() {
        assert_eq!(normalize_category("  구매  "), "구매");
        assert_eq!(normalize_category("기존  주택\t대상"), "기존 주택 대상");
    }

    #[test]
    fn test_strips_invisible_spaces() {
        assert_eq!(normalize_category("\u{feff}전세\u{00a0}"), "전세");
        assert_eq!(normalize_category("분\u{200b}양"), "분양");
    }

    #[test]
    fn test_blank_header_placeholder() {
        assert_eq!(normalize_header("  ", 3), "Unnamed: 3");
        assert_eq!(normalize_header(" 사번 ", 0), "사번");
    }
}
