// src/utils/amount.rs
use crate::utils::error::FormatError;
use once_cell::sync::Lazy;
use regex::Regex;

/// Absolute tolerance used whenever two amounts are compared.
pub const AMOUNT_EPSILON: f64 = 1e-8;

// Characters that decorate an amount but carry no numeric value.
static AMOUNT_NOISE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[()$,]").expect("Failed to compile AMOUNT_NOISE_RE")
});

/// Parses a currency string such as `($1,234.50)` into a signed amount.
///
/// Enclosing parentheses mark a negative amount, as does a leading `-`
/// (which survives the cleanup and is handled by the float parser).
/// A parenthesized amount is negative even when it also carries a `-`.
/// `(`, `)`, `$` and `,` are stripped before parsing.
pub fn to_amount(value: &str) -> Result<f64, FormatError> {
    let value = value.trim();
    let parenthesized = value.starts_with('(');

    let cleaned = AMOUNT_NOISE_RE.replace_all(value, "");
    let amount: f64 = cleaned
        .trim()
        .parse()
        .map_err(|_| FormatError::InvalidAmount(value.to_string()))?;

    // "inf" and "NaN" parse as f64 but are not amounts.
    if !amount.is_finite() {
        return Err(FormatError::InvalidAmount(value.to_string()));
    }
    Ok(if parenthesized { -amount.abs() } else { amount })
}

/// Checks if the given amounts are (nearly) equal.
pub fn amounts_equal(first: f64, second: f64) -> bool {
    (second - first).abs() < AMOUNT_EPSILON
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_amounts() {
        assert_eq!(to_amount("12.456695"), Ok(12.456695));
        assert_eq!(to_amount("34"), Ok(34.0));
        assert_eq!(to_amount("-12.45"), Ok(-12.45));
    }

    #[test]
    fn parses_parenthesized_negatives() {
        assert_eq!(to_amount("(12.45)"), Ok(-12.45));
        assert_eq!(to_amount("(12,456,213.95)"), Ok(-12456213.95));
    }

    #[test]
    fn both_negative_markers_together_stay_negative() {
        assert_eq!(to_amount("(-$12.45)"), Ok(-12.45));
        assert_eq!(to_amount("(-12.45)"), Ok(-12.45));
    }

    #[test]
    fn parses_dollar_amounts() {
        assert_eq!(to_amount("$12.45"), Ok(12.45));
        assert_eq!(to_amount("($12.45)"), Ok(-12.45));
        assert_eq!(to_amount("-$12.45"), Ok(-12.45));
        assert_eq!(to_amount("$1,235,123.45"), Ok(1235123.45));
    }

    #[test]
    fn tolerates_surrounding_whitespace() {
        assert_eq!(to_amount("  $8.00 "), Ok(8.0));
    }

    #[test]
    fn rejects_non_numeric_residue() {
        assert_eq!(
            to_amount("$abc"),
            Err(FormatError::InvalidAmount("$abc".to_string()))
        );
        assert!(to_amount("").is_err());
        assert!(to_amount("$").is_err());
        assert!(to_amount("inf").is_err());
        assert!(to_amount("NaN").is_err());
    }

    #[test]
    fn is_deterministic() {
        assert_eq!(to_amount("($1,000.01)"), to_amount("($1,000.01)"));
    }

    #[test]
    fn compares_within_epsilon() {
        assert!(amounts_equal(0.1 + 0.2, 0.3));
        assert!(!amounts_equal(100.0, 100.00001));
    }
}
