//! Per-column cell formatting for markdown tables.

use serde_json::Value;

/// Literal rendered for null cells.
pub const NULL_TOKEN: &str = "NULL";

/// How a column's values are rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    /// Thousands separators, exactly two decimals.
    Decimal,
    /// Thousands separators, no decimals.
    Integer,
    Other,
}

impl ColumnKind {
    /// Classify a backend type name. Matching is case-insensitive and ignores
    /// parameters such as `DECIMAL(10,2)`.
    pub fn from_type_name(type_name: &str) -> Self {
        let base = type_name
            .split('(')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_uppercase();
        match base.as_str() {
            "DECIMAL" | "DOUBLE" | "FLOAT" => Self::Decimal,
            "INT" | "BIGINT" | "LONG" | "SHORT" | "SMALLINT" | "TINYINT" | "BYTE" => Self::Integer,
            _ => Self::Other,
        }
    }
}

/// Render one cell. Numeric cells that do not parse fall back to plain text.
pub fn format_cell(value: &Value, kind: ColumnKind) -> String {
    let formatted = match (value, kind) {
        (Value::Null, _) => return NULL_TOKEN.to_string(),
        (_, ColumnKind::Decimal) => as_f64(value).map(format_decimal),
        (_, ColumnKind::Integer) => as_i128(value).map(format_integer),
        (_, ColumnKind::Other) => None,
    };
    formatted.unwrap_or_else(|| plain(value))
}

/// `1234567.5` -> `1,234,567.50`
pub fn format_decimal(value: f64) -> String {
    if !value.is_finite() {
        return value.to_string();
    }
    let fixed = format!("{value:.2}");
    let (sign, unsigned) = match fixed.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", fixed.as_str()),
    };
    let (whole, frac) = unsigned.split_once('.').unwrap_or((unsigned, "00"));
    format!("{sign}{}.{frac}", group_thousands(whole))
}

/// `1000` -> `1,000`
pub fn format_integer(value: i128) -> String {
    let digits = value.unsigned_abs().to_string();
    let sign = if value < 0 { "-" } else { "" };
    format!("{sign}{}", group_thousands(&digits))
}

fn group_thousands(digits: &str) -> String {
    let len = digits.len();
    let mut out = String::with_capacity(len + len / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

fn as_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn as_i128(value: &Value) -> Option<i128> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .map(i128::from)
            .or_else(|| n.as_u64().map(i128::from)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn plain(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decimal_gets_separators_and_two_places() {
        assert_eq!(format_decimal(1234567.5), "1,234,567.50");
        assert_eq!(format_decimal(0.0), "0.00");
        assert_eq!(format_decimal(999.999), "1,000.00");
        assert_eq!(format_decimal(-1234.5), "-1,234.50");
    }

    #[test]
    fn integer_gets_separators() {
        assert_eq!(format_integer(1000), "1,000");
        assert_eq!(format_integer(999), "999");
        assert_eq!(format_integer(-1234567), "-1,234,567");
        assert_eq!(format_integer(0), "0");
    }

    #[test]
    fn cells_follow_column_kind() {
        assert_eq!(format_cell(&json!("1234567.5"), ColumnKind::Decimal), "1,234,567.50");
        assert_eq!(format_cell(&json!(1000), ColumnKind::Integer), "1,000");
        assert_eq!(format_cell(&json!("1000"), ColumnKind::Integer), "1,000");
        assert_eq!(format_cell(&json!("12345"), ColumnKind::Other), "12345");
        assert_eq!(format_cell(&json!(true), ColumnKind::Other), "true");
    }

    #[test]
    fn null_wins_over_type() {
        for kind in [ColumnKind::Decimal, ColumnKind::Integer, ColumnKind::Other] {
            assert_eq!(format_cell(&Value::Null, kind), "NULL");
        }
    }

    #[test]
    fn unparseable_numbers_render_verbatim() {
        assert_eq!(format_cell(&json!("n/a"), ColumnKind::Decimal), "n/a");
        assert_eq!(format_cell(&json!("12.5"), ColumnKind::Integer), "12.5");
    }

    #[test]
    fn type_names_are_classified_loosely() {
        assert_eq!(ColumnKind::from_type_name("decimal(10,2)"), ColumnKind::Decimal);
        assert_eq!(ColumnKind::from_type_name("BIGINT"), ColumnKind::Integer);
        assert_eq!(ColumnKind::from_type_name("STRING"), ColumnKind::Other);
        assert_eq!(ColumnKind::from_type_name(""), ColumnKind::Other);
    }
}
