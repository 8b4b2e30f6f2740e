//! Row value conversion
//!
//! Converts DuckDB cell values into JSON for the page response. Scalar
//! types map to native JSON values; anything nested or exotic falls back
//! to its textual form so a row can always be rendered.

use duckdb::types::{TimeUnit, Value};
use serde_json::Value as JsonValue;

use crate::utils::time::micros_to_datetime;

fn unit_to_micros(unit: &TimeUnit, v: i64) -> i64 {
    match unit {
        TimeUnit::Second => v.saturating_mul(1_000_000),
        TimeUnit::Millisecond => v.saturating_mul(1_000),
        TimeUnit::Microsecond => v,
        TimeUnit::Nanosecond => v / 1_000,
    }
}

fn days_to_date_string(days: i32) -> String {
    chrono::DateTime::from_timestamp(i64::from(days) * 86_400, 0)
        .map(|dt| dt.date_naive().to_string())
        .unwrap_or_default()
}

fn f64_to_json(v: f64) -> JsonValue {
    serde_json::Number::from_f64(v)
        .map(JsonValue::Number)
        .unwrap_or(JsonValue::Null)
}

/// Convert one DuckDB cell value to JSON
pub fn value_to_json(value: Value) -> JsonValue {
    match value {
        Value::Null => JsonValue::Null,
        Value::Boolean(b) => JsonValue::Bool(b),
        Value::TinyInt(v) => JsonValue::from(v),
        Value::SmallInt(v) => JsonValue::from(v),
        Value::Int(v) => JsonValue::from(v),
        Value::BigInt(v) => JsonValue::from(v),
        Value::HugeInt(v) => JsonValue::String(v.to_string()),
        Value::UTinyInt(v) => JsonValue::from(v),
        Value::USmallInt(v) => JsonValue::from(v),
        Value::UInt(v) => JsonValue::from(v),
        Value::UBigInt(v) => JsonValue::from(v),
        Value::Float(v) => f64_to_json(f64::from(v)),
        Value::Double(v) => f64_to_json(v),
        Value::Decimal(d) => d
            .to_string()
            .parse::<f64>()
            .map(f64_to_json)
            .unwrap_or_else(|_| JsonValue::String(d.to_string())),
        Value::Text(s) => JsonValue::String(s),
        Value::Enum(s) => JsonValue::String(s),
        Value::Timestamp(unit, v) => JsonValue::String(
            micros_to_datetime(unit_to_micros(&unit, v))
                .to_rfc3339_opts(chrono::SecondsFormat::Micros, true),
        ),
        Value::Date32(days) => JsonValue::String(days_to_date_string(days)),
        Value::Time64(unit, v) => JsonValue::String(
            micros_to_datetime(unit_to_micros(&unit, v))
                .format("%H:%M:%S%.6f")
                .to_string(),
        ),
        other => JsonValue::String(format!("{:?}", other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalars() {
        assert_eq!(value_to_json(Value::Null), JsonValue::Null);
        assert_eq!(value_to_json(Value::Boolean(true)), JsonValue::Bool(true));
        assert_eq!(value_to_json(Value::BigInt(42)), JsonValue::from(42));
        assert_eq!(
            value_to_json(Value::Text("ok".into())),
            JsonValue::String("ok".into())
        );
        assert_eq!(value_to_json(Value::Double(1.5)), JsonValue::from(1.5));
    }

    #[test]
    fn test_non_finite_float_is_null() {
        assert_eq!(value_to_json(Value::Double(f64::NAN)), JsonValue::Null);
    }

    #[test]
    fn test_date32() {
        // 2024-01-01 is 19723 days after the epoch
        assert_eq!(
            value_to_json(Value::Date32(19723)),
            JsonValue::String("2024-01-01".into())
        );
    }

    #[test]
    fn test_timestamp_micros() {
        let json = value_to_json(Value::Timestamp(TimeUnit::Microsecond, 1_700_000_000_000_000));
        assert_eq!(json, JsonValue::String("2023-11-14T22:13:20.000000Z".into()));
    }
}
