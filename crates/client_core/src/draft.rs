//! Form drafts: the editable text copy of an entity, its schema checks, and the
//! mapping between draft text and the wire payload.

use std::{collections::BTreeMap, fmt, str::FromStr};

use chrono::NaiveDate;
use shared::{
    domain::{Priority, Status},
    protocol::{EntityPayload, FieldValue},
};

pub const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Field {
    Title,
    Description,
    DueDate,
    Assignee,
    Status,
    Priority,
}

impl Field {
    pub const ALL: [Field; 6] = [
        Field::Title,
        Field::Description,
        Field::DueDate,
        Field::Assignee,
        Field::Status,
        Field::Priority,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Field::Title => "title",
            Field::Description => "description",
            Field::DueDate => "due_date",
            Field::Assignee => "assignee",
            Field::Status => "status",
            Field::Priority => "priority",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Field::Title => "Title*",
            Field::Description => "Description",
            Field::DueDate => "Due Date",
            Field::Assignee => "Assignee",
            Field::Status => "Status",
            Field::Priority => "Priority",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Field {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase().replace('-', "_");
        Field::ALL
            .into_iter()
            .find(|field| field.name() == wanted)
            .ok_or_else(|| format!("unknown field '{s}'"))
    }
}

/// Working copy of an entity under edit. `""` stands for "no value".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Draft {
    pub title: String,
    pub description: String,
    pub due_date: String,
    pub assignee: String,
    pub status: String,
    pub priority: String,
}

impl Draft {
    pub fn get(&self, field: Field) -> &str {
        match field {
            Field::Title => &self.title,
            Field::Description => &self.description,
            Field::DueDate => &self.due_date,
            Field::Assignee => &self.assignee,
            Field::Status => &self.status,
            Field::Priority => &self.priority,
        }
    }

    pub fn set(&mut self, field: Field, value: impl Into<String>) {
        let slot = match field {
            Field::Title => &mut self.title,
            Field::Description => &mut self.description,
            Field::DueDate => &mut self.due_date,
            Field::Assignee => &mut self.assignee,
            Field::Status => &mut self.status,
            Field::Priority => &mut self.priority,
        };
        *slot = value.into();
    }

    pub(crate) fn from_entity(
        title: &str,
        description: Option<&str>,
        due_date: Option<NaiveDate>,
        assignee: Option<&str>,
        status: Option<Status>,
        priority: Option<Priority>,
    ) -> Self {
        Self {
            title: title.to_string(),
            description: denormalize_text(description),
            due_date: due_date
                .map(|date| date.format(DATE_FORMAT).to_string())
                .unwrap_or_default(),
            assignee: denormalize_text(assignee),
            status: denormalize_text(status.map(Status::as_str)),
            priority: denormalize_text(priority.map(Priority::as_str)),
        }
    }
}

pub type FieldErrors = BTreeMap<Field, String>;

/// `""` is a display placeholder only and never reaches the wire.
pub fn normalize_text(value: &str) -> Option<String> {
    (!value.is_empty()).then(|| value.to_string())
}

pub fn denormalize_text(value: Option<&str>) -> String {
    value.unwrap_or_default().to_string()
}

pub fn validate_field(draft: &Draft, field: Field) -> Option<String> {
    let value = draft.get(field);
    match field {
        Field::Title if value.trim().is_empty() => Some("Title is required".to_string()),
        Field::DueDate if !value.is_empty() => NaiveDate::parse_from_str(value, DATE_FORMAT)
            .err()
            .map(|_| "Invalid date format".to_string()),
        Field::Status if !value.is_empty() => value
            .parse::<Status>()
            .err()
            .map(|_| "Invalid status".to_string()),
        Field::Priority if !value.is_empty() => value
            .parse::<Priority>()
            .err()
            .map(|_| "Invalid priority".to_string()),
        _ => None,
    }
}

pub fn validate(draft: &Draft) -> FieldErrors {
    Field::ALL
        .into_iter()
        .filter_map(|field| validate_field(draft, field).map(|message| (field, message)))
        .collect()
}

/// Converts a valid draft into a payload, sending cleared fields as `null`.
pub fn normalize(draft: &Draft) -> Result<EntityPayload, FieldErrors> {
    let errors = validate(draft);
    if !errors.is_empty() {
        return Err(errors);
    }

    Ok(EntityPayload {
        title: Some(draft.title.clone()),
        description: normalize_text(&draft.description).into(),
        due_date: parsed(&draft.due_date, |raw| {
            NaiveDate::parse_from_str(raw, DATE_FORMAT).ok()
        }),
        assignee: normalize_text(&draft.assignee).into(),
        status: parsed(&draft.status, |raw| raw.parse().ok()),
        priority: parsed(&draft.priority, |raw| raw.parse().ok()),
        project_id: None,
    })
}

fn parsed<T>(raw: &str, parse: impl FnOnce(&str) -> Option<T>) -> FieldValue<T> {
    normalize_text(raw).and_then(|raw| parse(&raw)).into()
}

#[cfg(test)]
#[path = "tests/draft_tests.rs"]
mod tests;
