use crate::selection::RawSelection;

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Accepts a JSON number or numeric string. Anything else becomes NaN.
pub fn loose_f64<'a, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'a>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().map_or(f64::NAN, value_to_f64))
}

/// Like [`loose_f64`] but keeps absence distinguishable from a malformed value.
pub fn loose_opt_f64<'a, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'a>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(Value::Null) => None,
        Some(v) => Some(value_to_f64(&v)),
    })
}

/// Signed integer flag that may arrive as a number, a float or a string.
pub fn loose_i32<'a, D>(deserializer: D) -> Result<i32, D::Error>
where
    D: Deserializer<'a>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    let parsed = value.as_ref().map_or(f64::NAN, value_to_f64);
    Ok(if parsed.is_finite() { parsed as i32 } else { 0 })
}

/// Identifiers are strings, but tabular exports often carry them as numbers.
pub fn loose_string<'a, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'a>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s,
        Some(other) => other.to_string(),
    })
}

pub fn loose_opt_string<'a, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'a>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s),
        Some(other) => Some(other.to_string()),
    })
}

/// Selection ids as hosts send them: one id, a list of ids, numbers allowed.
/// Any other shape becomes the "none" sentinel; null stays absent.
pub fn loose_selection<'a, D>(deserializer: D) -> Result<Option<RawSelection>, D::Error>
where
    D: Deserializer<'a>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(Value::Null) => None,
        Some(Value::Array(items)) => Some(RawSelection::Many(
            items.into_iter().filter_map(value_to_id).collect(),
        )),
        Some(other) => Some(match value_to_id(other) {
            Some(id) => RawSelection::One(id),
            None => RawSelection::default(),
        }),
    })
}

fn value_to_id(value: Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

pub fn parse_f64(raw: &str) -> f64 {
    raw.trim().parse::<f64>().unwrap_or(f64::NAN)
}

fn value_to_f64(value: &Value) -> f64 {
    match value {
        Value::Number(n) => n.as_f64().unwrap_or(f64::NAN),
        Value::String(s) => parse_f64(s),
        Value::Bool(b) => f64::from(u8::from(*b)),
        _ => f64::NAN,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Deserialize)]
    struct Row {
        #[serde(default = "nan", deserialize_with = "loose_f64")]
        x: f64,
        #[serde(default, deserialize_with = "loose_string")]
        id: String,
        #[serde(default, deserialize_with = "loose_i32")]
        flag: i32,
    }

    fn nan() -> f64 {
        f64::NAN
    }

    #[test]
    fn numeric_strings_are_parsed() {
        let row: Row = serde_json::from_value(json!({ "x": " 12.5 ", "id": 120, "flag": "-1" }))
            .unwrap();
        assert_eq!(row.x, 12.5);
        assert_eq!(row.id, "120");
        assert_eq!(row.flag, -1);
    }

    #[test]
    fn malformed_numbers_become_nan() {
        let row: Row = serde_json::from_value(json!({ "x": "n/a", "flag": "?" })).unwrap();
        assert!(row.x.is_nan());
        assert_eq!(row.flag, 0);

        let missing: Row = serde_json::from_value(json!({})).unwrap();
        assert!(missing.x.is_nan());
        assert!(missing.id.is_empty());
    }

    #[derive(Deserialize)]
    struct Patch {
        #[serde(default, deserialize_with = "loose_selection")]
        ids: Option<RawSelection>,
    }

    fn ids(value: serde_json::Value) -> Option<RawSelection> {
        serde_json::from_value::<Patch>(json!({ "ids": value })).unwrap().ids
    }

    #[test]
    fn selections_accept_numeric_ids() {
        assert_eq!(ids(json!(42)), Some(RawSelection::One("42".into())));
        assert_eq!(
            ids(json!([120, "10", true])),
            Some(RawSelection::Many(vec!["120".into(), "10".into()]))
        );
        assert_eq!(ids(json!({ "site": "120" })), Some(RawSelection::default()));
        assert_eq!(ids(json!(false)), Some(RawSelection::default()));
        assert_eq!(ids(json!(null)), None);
    }
}
