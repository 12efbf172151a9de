//! JSON conversion helpers on top of serde_json

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{debug, instrument};

use crate::error::{Error, Result};

pub fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    Ok(serde_json::to_string(value)?)
}

pub fn to_pretty_json<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}

/// Unknown fields in `json` are ignored unless `T` denies them.
pub fn from_json<T: DeserializeOwned>(json: &str) -> Result<T> {
    Ok(serde_json::from_str(json)?)
}

pub fn from_json_to_list<T: DeserializeOwned>(json: &str) -> Result<Vec<T>> {
    from_json(json)
}

pub fn from_json_to_map<T: DeserializeOwned>(json: &str) -> Result<HashMap<String, T>> {
    from_json(json)
}

pub fn parse_json(json: &str) -> Result<Value> {
    from_json(json)
}

#[instrument]
pub fn read_json_file<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let reader = BufReader::new(File::open(path)?);
    Ok(serde_json::from_reader(reader)?)
}

pub fn read_json_file_as_value(path: &Path) -> Result<Value> {
    read_json_file(path)
}

pub fn read_json_from_reader<T: DeserializeOwned, R: Read>(reader: R) -> Result<T> {
    Ok(serde_json::from_reader(reader)?)
}

#[instrument(skip(value))]
pub fn write_json_file<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer(&mut writer, value)?;
    writer.flush()?;
    Ok(())
}

#[instrument(skip(value))]
pub fn write_pretty_json_file<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut writer, value)?;
    writer.flush()?;
    Ok(())
}

pub fn create_object() -> Value {
    Value::Object(Map::new())
}

pub fn create_array() -> Value {
    Value::Array(Vec::new())
}

/// Reads `field` from an object as `T`. Missing, null or mistyped fields give `None`.
pub fn extract_value<T: DeserializeOwned>(value: &Value, field: &str) -> Option<T> {
    let raw = value.get(field).filter(|v| !v.is_null())?;
    match serde_json::from_value(raw.clone()) {
        Ok(parsed) => Some(parsed),
        Err(e) => {
            debug!("Field '{}' has an unexpected shape: {}", field, e);
            None
        }
    }
}

pub fn is_valid_json(json: &str) -> bool {
    validate_json(json).is_ok()
}

pub fn validate_json(json: &str) -> Result<()> {
    serde_json::from_str::<serde::de::IgnoredAny>(json)?;
    Ok(())
}

/// Shallow merge of two objects; keys from `right` win.
pub fn merge_values(left: Value, right: Value) -> Result<Value> {
    match (left, right) {
        (Value::Object(mut merged), Value::Object(right)) => {
            merged.extend(right);
            Ok(Value::Object(merged))
        }
        _ => Err(Error::validation("Both JSON values must be objects")),
    }
}

pub fn merge_json_objects(left: &str, right: &str) -> Result<String> {
    let merged = merge_values(parse_json(left)?, parse_json(right)?)?;
    to_json(&merged)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use serde::Deserialize;
    use serde_json::json;
    use tempfile::tempdir;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct User {
        name: String,
        age: u32,
    }

    #[test]
    fn test_typed_round_trip_ignores_unknown_fields() {
        let user: User = from_json(r#"{"name":"Ada","age":36,"role":"admin"}"#).unwrap();
        assert_eq!(user, User { name: "Ada".into(), age: 36 });
        assert_eq!(to_json(&user).unwrap(), r#"{"name":"Ada","age":36}"#);
        assert!(to_pretty_json(&user).unwrap().contains("\n  \"name\""));
    }

    #[test]
    fn test_lists_and_maps() {
        let ids: Vec<u32> = from_json_to_list("[1,2,3]").unwrap();
        assert_eq!(ids, vec![1, 2, 3]);
        let scores: HashMap<String, f64> = from_json_to_map(r#"{"a":1.5}"#).unwrap();
        assert_eq!(scores["a"], 1.5);
        assert_eq!(
            from_json::<User>("{").unwrap_err().kind(),
            ErrorKind::ParseFailure
        );
    }

    #[test]
    fn test_file_round_trip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("user.json");
        let user = User { name: "Lin".into(), age: 29 };

        write_pretty_json_file(&path, &user).unwrap();
        let back: User = read_json_file(&path).unwrap();
        assert_eq!(back, user);
        assert_eq!(read_json_file_as_value(&path).unwrap()["age"], 29);

        write_json_file(&path, &json!([1, 2])).unwrap();
        let raw = std::fs::read_to_string(&path).unwrap();
        assert_eq!(raw, "[1,2]");
        let from_reader: Vec<u8> = read_json_from_reader(raw.as_bytes()).unwrap();
        assert_eq!(from_reader, vec![1, 2]);

        let missing = read_json_file::<User>(&dir.path().join("nope.json")).unwrap_err();
        assert_eq!(missing.kind(), ErrorKind::IoFailure);
    }

    #[test]
    fn test_extract_value() {
        let doc = json!({"count": 4, "name": "x", "empty": null});
        assert_eq!(extract_value::<u32>(&doc, "count"), Some(4));
        assert_eq!(extract_value::<u32>(&doc, "name"), None);
        assert_eq!(extract_value::<String>(&doc, "empty"), None);
        assert_eq!(extract_value::<String>(&doc, "missing"), None);
        assert_eq!(extract_value::<String>(&json!([1]), "name"), None);
    }

    #[test]
    fn test_validation() {
        assert!(is_valid_json(r#"{"a":[1,2,{"b":null}]}"#));
        assert!(is_valid_json("42"));
        assert!(!is_valid_json("{a:1}"));
        assert!(!is_valid_json(""));
        assert_eq!(validate_json("[1,").unwrap_err().kind(), ErrorKind::ParseFailure);
    }

    #[test]
    fn test_merge_right_wins() {
        let merged = merge_json_objects(r#"{"a":1,"b":{"x":1}}"#, r#"{"b":{"y":2},"c":3}"#).unwrap();
        let merged: Value = parse_json(&merged).unwrap();
        assert_eq!(merged, json!({"a": 1, "b": {"y": 2}, "c": 3}));

        let err = merge_json_objects("[1]", "{}").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ValidationFailure);
        assert_eq!(create_object(), json!({}));
        assert_eq!(create_array(), json!([]));
    }
}
