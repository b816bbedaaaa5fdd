//! JSON value coercions shared by the walker and the exporter

use serde_json::{Number, Value};

/// Kind name used in "incorrect type" problems
pub fn json_kind_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "Null",
        Value::Bool(_) => "Boolean",
        Value::Number(_) => "Number",
        Value::String(_) => "String",
        Value::Array(_) => "Array",
        Value::Object(_) => "Object",
    }
}

/// Integer view of a JSON value.
///
/// Accepts integral numbers and strings holding one. Fractional numbers
/// and values outside `i64` are rejected.
pub fn json_to_i64(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => number_to_i64(n),
        Value::String(s) => {
            let trimmed = s.trim();
            trimmed.parse::<i64>().ok().or_else(|| {
                trimmed
                    .parse::<f64>()
                    .ok()
                    .and_then(integral_f64_to_i64)
            })
        }
        _ => None,
    }
}

fn number_to_i64(n: &Number) -> Option<i64> {
    if let Some(v) = n.as_i64() {
        return Some(v);
    }
    if n.is_u64() {
        return None;
    }
    n.as_f64().and_then(integral_f64_to_i64)
}

fn integral_f64_to_i64(v: f64) -> Option<i64> {
    if v.is_finite() && v.fract() == 0.0 && v >= i64::MIN as f64 && v < i64::MAX as f64 {
        Some(v as i64)
    } else {
        None
    }
}

/// Floating point view of a JSON number or numeric string
pub fn json_to_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|v| v.is_finite()),
        _ => None,
    }
}

/// Boolean view of a JSON boolean or a `true`/`false` string
pub fn json_to_bool(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" => Some(true),
            "false" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

/// Text of a row key cell: strings as-is, numbers and booleans printed
pub fn row_key_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// JSON number for a float, or `None` when it has no JSON form
pub fn f64_to_json(value: f64) -> Option<Value> {
    Number::from_f64(value).map(Value::Number)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_kind_names() {
        assert_eq!(json_kind_name(&json!(null)), "Null");
        assert_eq!(json_kind_name(&json!(true)), "Boolean");
        assert_eq!(json_kind_name(&json!(1.5)), "Number");
        assert_eq!(json_kind_name(&json!("x")), "String");
        assert_eq!(json_kind_name(&json!([])), "Array");
        assert_eq!(json_kind_name(&json!({})), "Object");
    }

    #[test]
    fn test_json_to_i64() {
        assert_eq!(json_to_i64(&json!(42)), Some(42));
        assert_eq!(json_to_i64(&json!(-7)), Some(-7));
        assert_eq!(json_to_i64(&json!(3.0)), Some(3));
        assert_eq!(json_to_i64(&json!(3.5)), None);
        assert_eq!(json_to_i64(&json!(u64::MAX)), None);
        assert_eq!(json_to_i64(&json!(" 12 ")), Some(12));
        assert_eq!(json_to_i64(&json!("bad-int")), None);
        assert_eq!(json_to_i64(&json!(true)), None);
    }

    #[test]
    fn test_json_to_f64_and_bool() {
        assert_eq!(json_to_f64(&json!(2)), Some(2.0));
        assert_eq!(json_to_f64(&json!("0.25")), Some(0.25));
        assert_eq!(json_to_f64(&json!("NaN")), None);
        assert_eq!(json_to_bool(&json!(false)), Some(false));
        assert_eq!(json_to_bool(&json!("TRUE")), Some(true));
        assert_eq!(json_to_bool(&json!(1)), None);
    }

    #[test]
    fn test_row_key_text() {
        assert_eq!(row_key_text(&json!("Sword")), Some("Sword".into()));
        assert_eq!(row_key_text(&json!(17)), Some("17".into()));
        assert_eq!(row_key_text(&json!(true)), Some("true".into()));
        assert_eq!(row_key_text(&json!(null)), None);
        assert_eq!(row_key_text(&json!({"a": 1})), None);
    }

    #[test]
    fn test_non_finite_has_no_json_form() {
        assert!(f64_to_json(f64::INFINITY).is_none());
        assert_eq!(f64_to_json(1.5), Some(json!(1.5)));
    }
}
