//! Default value whitelisting
//!
//! Catalog default expressions are only usable when they are plain literals.
//! Auto-increment markers are dropped and `CURRENT_TIMESTAMP` on temporal
//! columns is replaced with a fixed literal of the column's type.

use crate::types::SqlType;

/// Substitute for `CURRENT_TIMESTAMP` on TIMESTAMP columns
pub const TIMESTAMP_PLACEHOLDER: &str = "2000-01-01 00:00:00";

/// Substitute for `CURRENT_TIMESTAMP` on DATE columns
pub const DATE_PLACEHOLDER: &str = "2000-01-01";

/// Substitute for `CURRENT_TIMESTAMP` on TIME columns
pub const TIME_PLACEHOLDER: &str = "00:00:00";

/// Sanitize a raw catalog default for a column of `sql_type`
pub fn sanitize(sql_type: SqlType, raw: Option<&str>) -> Option<String> {
    let raw = raw?;
    let lower = raw.to_ascii_lowercase();
    if lower.starts_with("autoincrement") {
        return None;
    }

    if lower.contains("current_timestamp") {
        let placeholder = match sql_type {
            SqlType::Timestamp => Some(TIMESTAMP_PLACEHOLDER),
            SqlType::Date => Some(DATE_PLACEHOLDER),
            SqlType::Time => Some(TIME_PLACEHOLDER),
            _ => None,
        };
        if let Some(placeholder) = placeholder {
            return Some(placeholder.to_string());
        }
    }

    Some(raw.to_string())
}

/// Whether a sanitized default is the explicit `null` literal
#[inline]
pub fn is_null_literal(value: &str) -> bool {
    value.eq_ignore_ascii_case("null")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absent_default() {
        assert_eq!(sanitize(SqlType::Integer, None), None);
    }

    #[test]
    fn test_autoincrement_dropped() {
        assert_eq!(sanitize(SqlType::Integer, Some("AUTOINCREMENT(1,1)")), None);
        assert_eq!(sanitize(SqlType::VarChar, Some("autoincrement")), None);
        assert_eq!(
            sanitize(SqlType::Integer, Some("1 autoincrement")),
            Some("1 autoincrement".to_string())
        );
    }

    #[test]
    fn test_current_timestamp_placeholders() {
        assert_eq!(
            sanitize(SqlType::Timestamp, Some("CURRENT_TIMESTAMP")).as_deref(),
            Some(TIMESTAMP_PLACEHOLDER)
        );
        assert_eq!(
            sanitize(SqlType::Date, Some("(current_timestamp())")).as_deref(),
            Some(DATE_PLACEHOLDER)
        );
        assert_eq!(
            sanitize(SqlType::Time, Some("Current_Timestamp")).as_deref(),
            Some(TIME_PLACEHOLDER)
        );
    }

    #[test]
    fn test_current_timestamp_on_text_kept() {
        assert_eq!(
            sanitize(SqlType::VarChar, Some("CURRENT_TIMESTAMP")).as_deref(),
            Some("CURRENT_TIMESTAMP")
        );
    }

    #[test]
    fn test_null_literal() {
        let value = sanitize(SqlType::Integer, Some("NULL"));
        assert_eq!(value.as_deref(), Some("NULL"));
        assert!(is_null_literal("NULL"));
        assert!(is_null_literal("null"));
        assert!(!is_null_literal("'null'"));
    }
}
