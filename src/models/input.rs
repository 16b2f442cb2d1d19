//! Loosely typed request inputs sent by the dashboard

use serde::Deserialize;

use crate::error::{AppError, AppResult};

/// Identifier sent either as a JSON number or as a numeric string
/// (form `<select>` values are always strings)
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum NumericInput {
    Number(i64),
    Text(String),
}

impl NumericInput {
    /// Positive `i32` value, or `Validation("{label} must be a valid number")`
    pub fn positive(&self, label: &str) -> AppResult<i32> {
        let invalid = || AppError::Validation(format!("{} must be a valid number", label));
        let value = match self {
            NumericInput::Number(n) => *n,
            NumericInput::Text(s) => s.trim().parse::<i64>().map_err(|_| invalid())?,
        };
        i32::try_from(value)
            .ok()
            .filter(|n| *n > 0)
            .ok_or_else(invalid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_numbers_and_numeric_strings() {
        let input: NumericInput = serde_json::from_str("\"12\"").unwrap();
        assert_eq!(input.positive("Bed number").unwrap(), 12);
        let input: NumericInput = serde_json::from_str("7").unwrap();
        assert_eq!(input.positive("Bed number").unwrap(), 7);
        let input: NumericInput = serde_json::from_str("\" 3 \"").unwrap();
        assert_eq!(input.positive("Equipment ID").unwrap(), 3);
    }

    #[test]
    fn rejects_words_zero_and_overflow() {
        let input: NumericInput = serde_json::from_str("\"twelve\"").unwrap();
        let err = input.positive("Equipment ID").unwrap_err();
        assert_eq!(err.to_string(), "Validation error: Equipment ID must be a valid number");
        assert!(NumericInput::Number(0).positive("Bed number").is_err());
        assert!(NumericInput::Number(i64::from(i32::MAX) + 1).positive("Bed number").is_err());
    }
}
