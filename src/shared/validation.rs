use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// Regex for national identifiers (No. KK and NIK): exactly 16 digits
    /// - Valid: "3201010101010001"
    /// - Invalid: "320101010101000", "32010101010100A", " 3201010101010001"
    pub static ref NATIONAL_ID_REGEX: Regex = Regex::new(r"^[0-9]{16}$").unwrap();

    /// Regex for RT/RW numbers: 1-3 digits
    pub static ref RT_RW_REGEX: Regex = Regex::new(r"^[0-9]{1,3}$").unwrap();

    /// Regex for Indonesian postal codes: 5 digits
    pub static ref POSTAL_CODE_REGEX: Regex = Regex::new(r"^[0-9]{5}$").unwrap();
}

/// Build an `ILIKE` pattern matching `term` as a literal substring.
///
/// `\`, `%` and `_` in the user input are escaped so they match themselves.
pub fn contains_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for c in term.chars() {
        if matches!(c, '\\' | '%' | '_') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

/// Trimmed, non-empty view of an optional query string
pub fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_national_id_regex_valid() {
        assert!(NATIONAL_ID_REGEX.is_match("3201010101010001"));
        assert!(NATIONAL_ID_REGEX.is_match("0000000000000000"));
    }

    #[test]
    fn test_national_id_regex_invalid() {
        assert!(!NATIONAL_ID_REGEX.is_match("320101010101000")); // 15 digits
        assert!(!NATIONAL_ID_REGEX.is_match("32010101010100011")); // 17 digits
        assert!(!NATIONAL_ID_REGEX.is_match("32010101010100A1"));
        assert!(!NATIONAL_ID_REGEX.is_match(" 3201010101010001"));
        assert!(!NATIONAL_ID_REGEX.is_match(""));
    }

    #[test]
    fn test_contains_pattern_escapes_wildcards() {
        assert_eq!(contains_pattern("Budi"), "%Budi%");
        assert_eq!(contains_pattern("50%"), "%50\\%%");
        assert_eq!(contains_pattern("a_b"), "%a\\_b%");
        assert_eq!(contains_pattern("c:\\"), "%c:\\\\%");
    }

    #[test]
    fn test_non_blank() {
        assert_eq!(non_blank(Some("  Budi ")), Some("Budi"));
        assert_eq!(non_blank(Some("   ")), None);
        assert_eq!(non_blank(None), None);
    }
}
