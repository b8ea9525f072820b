//! Plain-text presentation: tables, the form, the delete dialog and intent parsing.

pub mod form;
pub mod intent;
pub mod table;

use client_core::{FormController, SyncSnapshot};

use self::table::TableRow;

/// Composes one screen: heading, notice, loading marker, table, then any dialog or form.
pub fn render_screen<R: TableRow>(
    heading: &str,
    snapshot: &SyncSnapshot<R>,
    form: Option<&FormController<R>>,
) -> String {
    let mut sections = vec![format!("== {heading} ==")];
    if let Some(notice) = &snapshot.notice {
        sections.push(format!("! {notice}"));
    }
    if snapshot.is_loading() {
        sections.push("loading...".into());
    }
    sections.push(table::render_table(&snapshot.items));
    if let Some(id) = snapshot.pending_delete {
        sections.push(format!("{} [{} {id}] (yes/no)", form::CONFIRM_DELETE, R::NOUN));
    }
    if let Some(form) = form {
        sections.push(form::render_form(form));
    }
    sections.join("\n\n")
}
