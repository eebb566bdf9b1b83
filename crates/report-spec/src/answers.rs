use std::collections::BTreeMap;
use std::fmt;
use std::ops::{Index, IndexMut};
use std::str::FromStr;

use serde::de::Deserializer;
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::registry::{QUESTION_COUNT, QuestionKey};

/// Tri-state answer to a catalog question. Wire form is `true | false | null`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "Option<bool>", into = "Option<bool>")]
pub enum Answer {
    #[default]
    Unset,
    Yes,
    No,
}

impl Answer {
    pub fn is_yes(self) -> bool {
        matches!(self, Answer::Yes)
    }

    pub fn is_set(self) -> bool {
        !matches!(self, Answer::Unset)
    }

    /// Label shown in the report grid (`DA` / `NE`, empty while unanswered).
    pub fn label(self) -> &'static str {
        match self {
            Answer::Yes => "DA",
            Answer::No => "NE",
            Answer::Unset => "",
        }
    }
}

impl From<Option<bool>> for Answer {
    fn from(value: Option<bool>) -> Self {
        match value {
            Some(true) => Answer::Yes,
            Some(false) => Answer::No,
            None => Answer::Unset,
        }
    }
}

impl From<Answer> for Option<bool> {
    fn from(value: Answer) -> Self {
        match value {
            Answer::Yes => Some(true),
            Answer::No => Some(false),
            Answer::Unset => None,
        }
    }
}

impl From<bool> for Answer {
    fn from(value: bool) -> Self {
        Answer::from(Some(value))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid answer '{0}' (expected da, ne or unset)")]
pub struct InvalidAnswer(pub String);

impl FromStr for Answer {
    type Err = InvalidAnswer;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "da" | "yes" | "true" => Ok(Answer::Yes),
            "ne" | "no" | "false" => Ok(Answer::No),
            "" | "unset" | "null" => Ok(Answer::Unset),
            other => Err(InvalidAnswer(other.to_string())),
        }
    }
}

impl fmt::Display for Answer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Answer::Unset => f.write_str("unset"),
            other => f.write_str(other.label()),
        }
    }
}

/// One slot per registry question, addressed by `QuestionKey`.
///
/// Serialized as an object keyed by question key. Missing keys take the
/// default value; unknown keys fail deserialization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionMap<T> {
    slots: [T; QUESTION_COUNT],
}

impl<T: Default> Default for QuestionMap<T> {
    fn default() -> Self {
        Self {
            slots: std::array::from_fn(|_| T::default()),
        }
    }
}

impl<T> QuestionMap<T> {
    pub fn get(&self, key: QuestionKey) -> &T {
        &self.slots[key.index()]
    }

    pub fn get_mut(&mut self, key: QuestionKey) -> &mut T {
        &mut self.slots[key.index()]
    }

    /// Entries in registry order.
    pub fn iter(&self) -> impl Iterator<Item = (QuestionKey, &T)> {
        QuestionKey::ALL.into_iter().zip(self.slots.iter())
    }
}

impl<T> Index<QuestionKey> for QuestionMap<T> {
    type Output = T;

    fn index(&self, key: QuestionKey) -> &T {
        self.get(key)
    }
}

impl<T> IndexMut<QuestionKey> for QuestionMap<T> {
    fn index_mut(&mut self, key: QuestionKey) -> &mut T {
        self.get_mut(key)
    }
}

impl<T: Serialize> Serialize for QuestionMap<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.iter().map(|(key, value)| (key.as_str(), value)))
    }
}

impl<'de, T> Deserialize<'de> for QuestionMap<T>
where
    T: Default + Deserialize<'de>,
{
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let entries = BTreeMap::<QuestionKey, T>::deserialize(deserializer)?;
        let mut map = QuestionMap::default();
        for (key, value) in entries {
            map[key] = value;
        }
        Ok(map)
    }
}

/// Single labelled value captured by a sub-form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormField {
    pub label: String,
    pub value: Value,
}

/// Payload committed by a sub-form. The engine only checks its presence;
/// the fields are kept in capture order for client-facing summaries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FormPayload {
    fields: Vec<FormField>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PayloadError {
    #[error("sub-form payload must be a JSON object or a list of {{label, value}} entries")]
    Shape,
}

impl FormPayload {
    pub fn new(fields: Vec<FormField>) -> Self {
        Self { fields }
    }

    /// Accepts either `{ "label": value, ... }` or `[{ "label": .., "value": .. }, ...]`.
    pub fn from_json(value: &Value) -> Result<Self, PayloadError> {
        match value {
            Value::Object(map) => Ok(Self::new(
                map.iter()
                    .map(|(label, value)| FormField {
                        label: label.clone(),
                        value: value.clone(),
                    })
                    .collect(),
            )),
            Value::Array(_) => serde_json::from_value(value.clone()).map_err(|_| PayloadError::Shape),
            _ => Err(PayloadError::Shape),
        }
    }

    pub fn fields(&self) -> &[FormField] {
        &self.fields
    }

    /// Field-by-field rendering: `label: value` entries joined with `; `.
    pub fn summary(&self) -> String {
        self.fields
            .iter()
            .map(|field| format!("{}: {}", field.label, value_to_display(&field.value)))
            .collect::<Vec<_>>()
            .join("; ")
    }
}

fn value_to_display(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Bool(flag) => Answer::from(*flag).label().to_string(),
        Value::Number(num) => num.to_string(),
        Value::Null => "-".to_string(),
        Value::Array(items) => items
            .iter()
            .map(value_to_display)
            .collect::<Vec<_>>()
            .join(", "),
        other => other.to_string(),
    }
}
