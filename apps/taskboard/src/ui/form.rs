use client_core::{Field, FormController, Resource};

pub const CONFIRM_DELETE: &str = "Are you sure you want to delete this?";

pub fn form_title<R: Resource>(editing: bool) -> String {
    if editing {
        format!("Update {}", R::NOUN)
    } else {
        format!("Add new {}", R::NOUN)
    }
}

/// Renders the draft as labeled fields with their validation marks.
pub fn render_form<R: Resource>(form: &FormController<R>) -> String {
    let draft = form.draft();
    let label_width = Field::ALL
        .iter()
        .map(|field| field.label().len())
        .max()
        .unwrap_or_default();

    let mut lines = vec![form_title::<R>(form.is_editing())];
    for field in Field::ALL {
        let mark = if form.is_invalid(field) {
            " [!]"
        } else if form.is_valid(field) {
            " [ok]"
        } else {
            ""
        };
        lines.push(
            format!("  {:<label_width$} : {}{mark}", field.label(), draft.get(field))
                .trim_end()
                .to_string(),
        );
        if form.is_invalid(field) {
            if let Some(error) = form.error(field) {
                lines.push(format!("  {:<label_width$}   {error}", ""));
            }
        }
    }
    if form.is_busy() {
        lines.push("  saving...".into());
    }
    lines.join("\n")
}
