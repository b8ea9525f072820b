use std::{fmt::Display, str::FromStr};

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

use crate::domain::{Priority, ProjectId, Status, TaskId};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: ProjectId,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "optional_wire_value")]
    pub due_date: Option<NaiveDate>,
    #[serde(default)]
    pub assignee: Option<String>,
    #[serde(default, deserialize_with = "lenient_wire_value")]
    pub status: Option<Status>,
    #[serde(default, deserialize_with = "lenient_wire_value")]
    pub priority: Option<Priority>,
    #[serde(with = "server_time")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "server_time")]
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    /// Owning project. Older backends leave it out of task responses.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<ProjectId>,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "optional_wire_value")]
    pub due_date: Option<NaiveDate>,
    #[serde(default)]
    pub assignee: Option<String>,
    #[serde(default, deserialize_with = "lenient_wire_value")]
    pub status: Option<Status>,
    #[serde(default, deserialize_with = "lenient_wire_value")]
    pub priority: Option<Priority>,
    #[serde(with = "server_time")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "server_time")]
    pub updated_at: DateTime<Utc>,
}

/// One optional field of a create/update body.
///
/// `Untouched` is omitted from the JSON object, `Cleared` is sent as `null`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue<T> {
    Untouched,
    Cleared,
    Set(T),
}

impl<T> FieldValue<T> {
    pub fn is_untouched(&self) -> bool {
        matches!(self, FieldValue::Untouched)
    }

    pub fn as_set(&self) -> Option<&T> {
        match self {
            FieldValue::Set(value) => Some(value),
            _ => None,
        }
    }
}

impl<T> Default for FieldValue<T> {
    fn default() -> Self {
        FieldValue::Untouched
    }
}

impl<T> From<Option<T>> for FieldValue<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(value) => FieldValue::Set(value),
            None => FieldValue::Cleared,
        }
    }
}

impl<T: Serialize> Serialize for FieldValue<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            FieldValue::Set(value) => value.serialize(serializer),
            FieldValue::Untouched | FieldValue::Cleared => serializer.serialize_none(),
        }
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for FieldValue<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Option::<T>::deserialize(deserializer).map(FieldValue::from)
    }
}

/// Body of `POST` and `PUT` requests for both projects and tasks.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EntityPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "FieldValue::is_untouched")]
    pub description: FieldValue<String>,
    #[serde(default, skip_serializing_if = "FieldValue::is_untouched")]
    pub due_date: FieldValue<NaiveDate>,
    #[serde(default, skip_serializing_if = "FieldValue::is_untouched")]
    pub assignee: FieldValue<String>,
    #[serde(default, skip_serializing_if = "FieldValue::is_untouched")]
    pub status: FieldValue<Status>,
    #[serde(default, skip_serializing_if = "FieldValue::is_untouched")]
    pub priority: FieldValue<Priority>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<ProjectId>,
}

/// Reads `null`, a missing key and `""` as `None`; anything else must parse.
fn optional_wire_value<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
    T::Err: Display,
{
    match Option::<String>::deserialize(deserializer)? {
        None => Ok(None),
        Some(raw) if raw.is_empty() => Ok(None),
        Some(raw) => raw.parse().map(Some).map_err(de::Error::custom),
    }
}

/// Like [`optional_wire_value`], but a value outside the known set is logged and read
/// as `None` so one odd row does not sink the whole collection.
fn lenient_wire_value<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
    T::Err: Display,
{
    match Option::<String>::deserialize(deserializer)? {
        None => Ok(None),
        Some(raw) if raw.is_empty() => Ok(None),
        Some(raw) => match raw.parse() {
            Ok(value) => Ok(Some(value)),
            Err(err) => {
                tracing::warn!(value = %raw, error = %err, "reading unknown enum value as absent");
                Ok(None)
            }
        },
    }
}

/// Parses a server timestamp, reading offset-less values as UTC.
pub fn parse_server_timestamp(raw: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|parsed| parsed.with_timezone(&Utc))
        .or_else(|_| raw.parse::<NaiveDateTime>().map(|naive| naive.and_utc()))
}

mod server_time {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_rfc3339_opts(SecondsFormat::Secs, true))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        super::parse_server_timestamp(&raw).map_err(de::Error::custom)
    }
}
