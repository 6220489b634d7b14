//! String-to-number coercion used ahead of numeric range checks.
//!
//! Coercion is a separate stage so each numeric field goes through
//! coerce → integer check → range check, and the first failing stage
//! produces that field's only error.

use sheet_model::CellValue;

/// Result of coercing a cell to a number.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Coerced {
    Number(f64),
    /// The field is absent from the row.
    Absent,
    /// The value does not read as a number.
    NotANumber,
}

impl Coerced {
    /// The number, or `fallback` for absent and non-numeric values.
    pub fn unwrap_or(self, fallback: f64) -> f64 {
        match self {
            Self::Number(value) => value,
            Self::Absent | Self::NotANumber => fallback,
        }
    }
}

/// Coerce an optional cell.
pub fn coerce_number(value: Option<&CellValue>) -> Coerced {
    match value {
        None => Coerced::Absent,
        Some(CellValue::Number(number)) if number.is_nan() => Coerced::NotANumber,
        Some(CellValue::Number(number)) => Coerced::Number(*number),
        Some(CellValue::Text(text)) => match parse_number(text) {
            Some(number) => Coerced::Number(number),
            None => Coerced::NotANumber,
        },
    }
}

/// Parse text with standard string-to-number rules.
///
/// Surrounding whitespace is ignored and a blank string reads as 0.
/// Accepts decimal and exponent forms, `Infinity`, and unsigned
/// `0x`/`0o`/`0b` integer literals.
pub fn parse_number(text: &str) -> Option<f64> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Some(0.0);
    }

    match trimmed {
        "Infinity" | "+Infinity" => return Some(f64::INFINITY),
        "-Infinity" => return Some(f64::NEG_INFINITY),
        _ => {}
    }

    if let Some(value) = parse_radix_literal(trimmed) {
        return value;
    }

    // Rust's float parser also accepts "inf" and "nan"; those are not numbers here.
    let decimal_chars = trimmed
        .chars()
        .all(|ch| ch.is_ascii_digit() || matches!(ch, '+' | '-' | '.' | 'e' | 'E'));
    if !decimal_chars {
        return None;
    }
    trimmed.parse::<f64>().ok()
}

/// `Some(result)` when the text carries a radix prefix, `None` otherwise.
fn parse_radix_literal(text: &str) -> Option<Option<f64>> {
    let prefix = text.get(..2)?.to_ascii_lowercase();
    let radix = match prefix.as_str() {
        "0x" => 16,
        "0o" => 8,
        "0b" => 2,
        _ => return None,
    };
    let digits = &text[2..];
    if digits.is_empty() || !digits.chars().all(|ch| ch.is_digit(radix)) {
        return Some(None);
    }
    let value = digits
        .chars()
        .filter_map(|ch| ch.to_digit(radix))
        .fold(0.0, |acc, digit| acc * f64::from(radix) + f64::from(digit));
    Some(Some(value))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_decimal_forms() {
        assert_eq!(parse_number("3"), Some(3.0));
        assert_eq!(parse_number(" 4 "), Some(4.0));
        assert_eq!(parse_number("2.5"), Some(2.5));
        assert_eq!(parse_number("-1"), Some(-1.0));
        assert_eq!(parse_number("1e3"), Some(1000.0));
        assert_eq!(parse_number(".5"), Some(0.5));
    }

    #[test]
    fn blank_reads_as_zero() {
        assert_eq!(parse_number(""), Some(0.0));
        assert_eq!(parse_number("   "), Some(0.0));
    }

    #[test]
    fn radix_literals() {
        assert_eq!(parse_number("0x10"), Some(16.0));
        assert_eq!(parse_number("0b11"), Some(3.0));
        assert_eq!(parse_number("0x"), None);
        assert_eq!(parse_number("0xZZ"), None);
        assert_eq!(parse_number("0x+1"), None);
        assert_eq!(parse_number("0b-1"), None);
        assert_eq!(parse_number("0x10000000000000000"), Some(18_446_744_073_709_551_616.0));
    }

    #[test]
    fn rejects_words() {
        assert_eq!(parse_number("abc"), None);
        assert_eq!(parse_number("inf"), None);
        assert_eq!(parse_number("NaN"), None);
        assert_eq!(parse_number("3 apples"), None);
        assert_eq!(parse_number("Infinity"), Some(f64::INFINITY));
    }

    #[test]
    fn coerces_cells() {
        assert_eq!(coerce_number(None), Coerced::Absent);
        assert_eq!(
            coerce_number(Some(&CellValue::Number(7.0))),
            Coerced::Number(7.0)
        );
        assert_eq!(
            coerce_number(Some(&CellValue::text("x"))),
            Coerced::NotANumber
        );
        assert_eq!(Coerced::NotANumber.unwrap_or(0.0), 0.0);
    }
}
