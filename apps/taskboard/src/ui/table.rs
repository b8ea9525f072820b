//! Collection tables: one row per entity, cells in column order.

use chrono::{DateTime, NaiveDate, Utc};
use client_core::Resource;
use shared::{
    domain::{Priority, ProjectId, Status, TaskId},
    protocol::{Project, Task},
};

pub const HEADERS: [&str; 9] = [
    "ID",
    "Title",
    "Description",
    "Due date",
    "Assignee",
    "Status",
    "Priority",
    "Created at",
    "Updated at",
];

/// A resource that can be shown as a table row and addressed by a typed-in id.
pub trait TableRow: Resource {
    fn cells(&self) -> Vec<String>;

    fn id_from_input(raw: i64) -> Self::Id;
}

impl TableRow for Project {
    fn cells(&self) -> Vec<String> {
        row_cells(
            self.id.0,
            &self.title,
            self.description.as_deref(),
            self.due_date,
            self.assignee.as_deref(),
            self.status,
            self.priority,
            self.created_at,
            self.updated_at,
        )
    }

    fn id_from_input(raw: i64) -> ProjectId {
        ProjectId(raw)
    }
}

impl TableRow for Task {
    fn cells(&self) -> Vec<String> {
        row_cells(
            self.id.0,
            &self.title,
            self.description.as_deref(),
            self.due_date,
            self.assignee.as_deref(),
            self.status,
            self.priority,
            self.created_at,
            self.updated_at,
        )
    }

    fn id_from_input(raw: i64) -> TaskId {
        TaskId(raw)
    }
}

#[allow(clippy::too_many_arguments)]
fn row_cells(
    id: i64,
    title: &str,
    description: Option<&str>,
    due_date: Option<NaiveDate>,
    assignee: Option<&str>,
    status: Option<Status>,
    priority: Option<Priority>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
) -> Vec<String> {
    vec![
        id.to_string(),
        title.to_string(),
        description.unwrap_or_default().to_string(),
        due_date.map(format_date).unwrap_or_default(),
        assignee.unwrap_or_default().to_string(),
        status.map(Status::label).unwrap_or_default().to_string(),
        priority.map(Priority::label).unwrap_or_default().to_string(),
        format_timestamp(created_at),
        format_timestamp(updated_at),
    ]
}

pub fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.format("%Y-%m-%d %H:%M").to_string()
}

/// Renders `items` as an aligned text table.
pub fn render_table<R: TableRow>(items: &[R]) -> String {
    let rows: Vec<Vec<String>> = items.iter().map(TableRow::cells).collect();
    let mut widths: Vec<usize> = HEADERS.iter().map(|h| h.chars().count()).collect();
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let headers: Vec<String> = HEADERS.iter().map(|h| h.to_string()).collect();
    let mut out = render_line(&headers, &widths);
    out.push('\n');
    out.push_str(
        &widths
            .iter()
            .map(|width| "-".repeat(*width))
            .collect::<Vec<_>>()
            .join("-+-"),
    );
    for row in &rows {
        out.push('\n');
        out.push_str(&render_line(row, &widths));
    }
    if rows.is_empty() {
        out.push_str("\n(nothing here yet)");
    }
    out
}

/// Renders one entity as `header : value` lines.
pub fn render_details<R: TableRow>(item: &R) -> String {
    let width = HEADERS.iter().map(|h| h.chars().count()).max().unwrap_or_default();
    HEADERS
        .iter()
        .zip(item.cells())
        .map(|(header, cell)| format!("{header:<width$} : {cell}").trim_end().to_string())
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_line(cells: &[String], widths: &[usize]) -> String {
    cells
        .iter()
        .zip(widths)
        .map(|(cell, &width)| format!("{cell:<width$}"))
        .collect::<Vec<_>>()
        .join(" | ")
        .trim_end()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_project() -> Project {
        Project {
            id: ProjectId(1),
            title: "Garden".into(),
            description: Some("Beds and paths".into()),
            due_date: NaiveDate::from_ymd_opt(2024, 6, 1),
            assignee: None,
            status: Some(Status::InProgress),
            priority: Some(Priority::High),
            created_at: "2024-01-01T09:30:00Z".parse().expect("timestamp"),
            updated_at: "2024-01-02T10:45:00Z".parse().expect("timestamp"),
        }
    }

    #[test]
    fn cells_use_labels_and_blank_absent_values() {
        assert_eq!(
            sample_project().cells(),
            vec![
                "1",
                "Garden",
                "Beds and paths",
                "2024-06-01",
                "",
                "In Progress",
                "High",
                "2024-01-01 09:30",
                "2024-01-02 10:45",
            ]
        );
    }

    #[test]
    fn table_lists_rows_in_collection_order() {
        let mut second = sample_project();
        second.id = ProjectId(2);
        second.title = "Attic".into();

        let rendered = render_table(&[sample_project(), second]);
        let lines: Vec<&str> = rendered.lines().collect();

        assert!(lines[0].starts_with("ID | Title "));
        assert!(lines[2].starts_with("1  | Garden"));
        assert!(lines[3].starts_with("2  | Attic"));
    }

    #[test]
    fn details_list_one_field_per_line() {
        let rendered = render_details(&sample_project());
        let lines: Vec<&str> = rendered.lines().collect();

        assert_eq!(lines.len(), HEADERS.len());
        assert_eq!(lines[0], "ID          : 1");
        assert_eq!(lines[4], "Assignee    :");
        assert_eq!(lines[5], "Status      : In Progress");
    }

    #[test]
    fn empty_table_says_so() {
        assert!(render_table::<Task>(&[]).ends_with("(nothing here yet)"));
    }
}
