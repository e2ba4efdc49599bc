//! Shared numeric helpers for loosely-typed PostgREST payloads.
//!
//! PostgREST renders `numeric` columns as JSON numbers, but rows inserted
//! through the statistics RPC may carry strings or nulls instead. The
//! helpers here coerce those values and apply the rounding rule used by
//! the temperature pipeline.

use serde_json::Value;

/// Round half away from negative infinity (`floor(x + 0.5)`).
///
/// This is the rounding every Celsius value in the game goes through, so
/// 35.5 → 36 and -2.5 → -2.
pub(crate) fn round_half_up(v: f64) -> f64 {
    (v + 0.5).floor()
}

/// Coerce a JSON value into a finite f64.
///
/// Accepts numbers and numeric strings; everything else (null, bool,
/// non-numeric strings, NaN/Inf) is `None`.
pub(crate) fn value_to_f64(v: &Value) -> Option<f64> {
    let n = match v {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }?;
    n.is_finite().then_some(n)
}

/// Like [`value_to_f64`] for an optional field.
pub(crate) fn opt_value_to_f64(v: Option<&Value>) -> Option<f64> {
    v.and_then(value_to_f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_round_half_up_positive() {
        assert_eq!(round_half_up(35.53), 36.0);
        assert_eq!(round_half_up(35.5), 36.0);
        assert_eq!(round_half_up(35.49), 35.0);
    }

    #[test]
    fn test_round_half_up_negative() {
        assert_eq!(round_half_up(-2.5), -2.0);
        assert_eq!(round_half_up(-2.51), -3.0);
    }

    #[test]
    fn test_value_to_f64_number() {
        assert_eq!(value_to_f64(&json!(308.68)), Some(308.68));
        assert_eq!(value_to_f64(&json!(300)), Some(300.0));
    }

    #[test]
    fn test_value_to_f64_numeric_string() {
        assert_eq!(value_to_f64(&json!("301.5")), Some(301.5));
        assert_eq!(value_to_f64(&json!(" 12 ")), Some(12.0));
    }

    #[test]
    fn test_value_to_f64_rejects_non_numeric() {
        assert_eq!(value_to_f64(&json!(null)), None);
        assert_eq!(value_to_f64(&json!("abc")), None);
        assert_eq!(value_to_f64(&json!(true)), None);
        assert_eq!(value_to_f64(&json!("NaN")), None);
    }

    #[test]
    fn test_opt_value_to_f64() {
        assert_eq!(opt_value_to_f64(None), None);
        assert_eq!(opt_value_to_f64(Some(&json!(1.5))), Some(1.5));
    }
}
