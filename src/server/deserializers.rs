use serde::de::{self, Unexpected};
use serde::{Deserialize, Deserializer};
use serde_json::Value;

// `?page=abc` is not an error, it is the first page
pub fn deserialize_page<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value
        .and_then(|page| page.trim().parse::<i64>().ok())
        .unwrap_or(1))
}

/// Accepts the quiz category as a number, a numeric string or the
/// `{"type": ..., "id": ...}` object the frontend keeps for the selected
/// category. Falsy values (`null`, `0`, `""`, `false`) mean "every category".
pub fn deserialize_quiz_category<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    match value {
        None => Ok(None),
        Some(value) => quiz_category_id(&value),
    }
}

fn quiz_category_id<E: de::Error>(value: &Value) -> Result<Option<i64>, E> {
    let id = match value {
        Value::Null | Value::Bool(false) => None,
        Value::Number(number) => Some(number.as_i64().ok_or_else(|| {
            E::invalid_value(Unexpected::Other("non-integer number"), &"a category id")
        })?),
        Value::String(s) if s.is_empty() => None,
        Value::String(s) => Some(
            s.trim()
                .parse::<i64>()
                .map_err(|_| E::invalid_value(Unexpected::Str(s), &"a category id"))?,
        ),
        Value::Object(object) => match object.get("id") {
            Some(id) => return quiz_category_id(id),
            None => return Err(E::missing_field("id")),
        },
        _ => {
            return Err(E::invalid_type(
                Unexpected::Other("array or boolean"),
                &"a category id",
            ))
        }
    };
    Ok(id.filter(|id| *id != 0))
}
