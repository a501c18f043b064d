//! Response shape validation

use serde_json::Value;

use crate::contracts::{Homework, StatusResponse};
use crate::error::{BotError, Result};

/// Check that a status API response has the expected shape.
///
/// An empty `homeworks` list is valid and means nothing changed since the
/// cursor.
pub fn check_response(response: &Value) -> Result<StatusResponse> {
    let object = response
        .as_object()
        .ok_or_else(|| BotError::invalid_response(format!("expected an object, got {}", kind(response))))?;

    let homeworks = object
        .get("homeworks")
        .ok_or_else(|| BotError::invalid_response("response has no `homeworks` key"))?;

    let list = homeworks.as_array().ok_or_else(|| {
        BotError::invalid_response(format!("`homeworks` must be a list, got {}", kind(homeworks)))
    })?;

    let homeworks = list
        .iter()
        .enumerate()
        .map(|(index, item)| check_homework(index, item))
        .collect::<Result<Vec<_>>>()?;

    let current_date = object.get("current_date").and_then(Value::as_i64);

    Ok(StatusResponse {
        homeworks,
        current_date,
    })
}

fn check_homework(index: usize, item: &Value) -> Result<Homework> {
    let record = item.as_object().ok_or_else(|| {
        BotError::invalid_response(format!("homework #{} must be an object, got {}", index, kind(item)))
    })?;

    for field in ["homework_name", "status"] {
        match record.get(field) {
            Some(Value::String(_)) => {}
            Some(other) => {
                return Err(BotError::invalid_response(format!(
                    "homework #{} field `{}` must be a string, got {}",
                    index,
                    field,
                    kind(other)
                )))
            }
            None => {
                return Err(BotError::invalid_response(format!(
                    "homework #{} has no `{}` key",
                    index, field
                )))
            }
        }
    }

    serde_json::from_value(item.clone()).map_err(BotError::from)
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_valid_response() {
        let response = json!({
            "homeworks": [{"homework_name": "hw_bot", "status": "approved", "id": 7}],
            "current_date": 1700000000
        });

        let parsed = check_response(&response).unwrap();
        assert_eq!(parsed.homeworks.len(), 1);
        assert_eq!(parsed.homeworks[0].homework_name, "hw_bot");
        assert_eq!(parsed.homeworks[0].id, Some(7));
        assert_eq!(parsed.current_date, Some(1700000000));
    }

    #[test]
    fn test_empty_list_is_valid() {
        let parsed = check_response(&json!({"homeworks": []})).unwrap();
        assert!(parsed.homeworks.is_empty());
        assert_eq!(parsed.current_date, None);
    }

    #[test]
    fn test_not_an_object() {
        let err = check_response(&json!([1, 2])).unwrap_err();
        assert!(err.to_string().contains("expected an object, got a list"));
    }

    #[test]
    fn test_missing_homeworks_key() {
        let err = check_response(&json!({"current_date": 1})).unwrap_err();
        assert!(matches!(err, BotError::InvalidResponse(_)));
        assert!(err.to_string().contains("no `homeworks` key"));
    }

    #[test]
    fn test_homeworks_not_a_list() {
        let err = check_response(&json!({"homeworks": {"homework_name": "x"}})).unwrap_err();
        assert!(err.to_string().contains("must be a list, got an object"));
    }

    #[test]
    fn test_homework_missing_fields() {
        let err = check_response(&json!({"homeworks": [{"status": "approved"}]})).unwrap_err();
        assert!(err.to_string().contains("homework #0 has no `homework_name` key"));

        let err = check_response(&json!({"homeworks": [{"homework_name": "x", "status": 3}]}))
            .unwrap_err();
        assert!(err.to_string().contains("field `status` must be a string, got a number"));
    }
}
