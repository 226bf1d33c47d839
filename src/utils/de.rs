//! Lenient deserializers for the API's wire quirks.
//!
//! Django REST Framework renders `DecimalField`s as strings (`"2.50"`) while
//! hand-built views return plain JSON numbers, so amounts accept both.

use serde::de::{self, Deserializer};
use serde::Deserialize;

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrText {
    Number(f64),
    Text(String),
}

/// Amount that may be a number, a numeric string, `null` or absent (0.0).
pub fn decimal<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<NumberOrText>::deserialize(deserializer)? {
        None => Ok(0.0),
        Some(NumberOrText::Number(value)) => Ok(value),
        Some(NumberOrText::Text(text)) if text.trim().is_empty() => Ok(0.0),
        Some(NumberOrText::Text(text)) => text.trim().parse().map_err(de::Error::custom),
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Label {
    Text(String),
    Named {
        #[serde(alias = "title")]
        name: String,
    },
    Other(serde_json::Value),
}

/// Publication lists arrive as plain names or as `{name}` / `{title}` objects.
pub fn labels<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Vec<Label>>::deserialize(deserializer)?.unwrap_or_default();

    Ok(raw
        .into_iter()
        .map(|label| match label {
            Label::Text(text) => text,
            Label::Named { name } => name,
            Label::Other(value) => value.to_string(),
        })
        .collect())
}
