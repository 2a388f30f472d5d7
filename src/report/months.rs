//! Spanish month-name table used by the monthly report routes.
//!
//! The backend expects the numeric month in the URL; the user-facing side of
//! the app works with lowercase Spanish month names.

/// Month names in calendar order, 1-based.
pub const MONTH_NAMES: [&str; 12] = [
    "enero",
    "febrero",
    "marzo",
    "abril",
    "mayo",
    "junio",
    "julio",
    "agosto",
    "septiembre",
    "octubre",
    "noviembre",
    "diciembre",
];

/// Resolve a Spanish month name to its 1..=12 number.
///
/// Matching is case-insensitive; anything not in the table returns `None`,
/// which callers treat as a missing-selection error before any network call.
pub fn month_number(name: &str) -> Option<u32> {
    let lower = name.trim().to_lowercase();
    MONTH_NAMES
        .iter()
        .position(|m| *m == lower)
        .map(|idx| idx as u32 + 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_months() {
        assert_eq!(month_number("enero"), Some(1));
        assert_eq!(month_number("marzo"), Some(3));
        assert_eq!(month_number("diciembre"), Some(12));
    }

    #[test]
    fn test_case_and_whitespace() {
        assert_eq!(month_number("Marzo"), Some(3));
        assert_eq!(month_number("  SEPTIEMBRE "), Some(9));
    }

    #[test]
    fn test_unknown_month() {
        assert_eq!(month_number("march"), None);
        assert_eq!(month_number(""), None);
    }
}
