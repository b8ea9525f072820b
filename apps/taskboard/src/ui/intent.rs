//! User intents and the line syntax they are typed in.

use client_core::Field;

/// Ids are raw numbers here; the active view decides which entity they name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    Add,
    EditRequest(i64),
    Show(i64),
    DeleteRequest(i64),
    ConfirmDelete,
    CancelDelete,
    SubmitDraft,
    SetField(Field, String),
    Blur(Field),
    CloseForm,
    DismissError,
    Refresh,
    OpenProjects,
    OpenTasks(Option<i64>),
    Help,
    Quit,
}

pub const HELP: &str = "\
commands:
  projects                 show all projects
  tasks [project-id]       show all tasks, or the tasks of one project
  refresh                  reload the current list
  add                      open an empty form
  show <id>                load one entry fresh from the server
  edit <id>                open the form on an existing entry
  set <field> <value...>   change a form field (empty value clears it)
  check <field>            validate a field without changing it
  submit                   save the form
  close                    discard the form
  delete <id>              ask to delete an entry
  yes | no                 answer the delete confirmation
  dismiss                  hide the current error
  help                     show this text
  quit                     leave
fields: title, description, due_date, assignee, status, priority";

/// Parses one input line. Blank lines yield `Ok(None)`.
pub fn parse_intent(line: &str) -> Result<Option<Intent>, String> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    let (command, rest) = match line.split_once(char::is_whitespace) {
        Some((command, rest)) => (command, rest.trim()),
        None => (line, ""),
    };

    let intent = match command.to_ascii_lowercase().as_str() {
        "add" | "new" => Intent::Add,
        "edit" => Intent::EditRequest(parse_id(rest)?),
        "show" | "view" => Intent::Show(parse_id(rest)?),
        "delete" | "rm" => Intent::DeleteRequest(parse_id(rest)?),
        "yes" | "y" => Intent::ConfirmDelete,
        "no" | "n" => Intent::CancelDelete,
        "submit" | "save" => Intent::SubmitDraft,
        "set" => {
            let (field, value) = match rest.split_once(char::is_whitespace) {
                Some((field, value)) => (field, value.trim()),
                None => (rest, ""),
            };
            Intent::SetField(parse_field(field)?, value.to_string())
        }
        "check" => Intent::Blur(parse_field(rest)?),
        "close" | "cancel" => Intent::CloseForm,
        "dismiss" => Intent::DismissError,
        "refresh" | "r" => Intent::Refresh,
        "projects" => Intent::OpenProjects,
        "tasks" if rest.is_empty() => Intent::OpenTasks(None),
        "tasks" => Intent::OpenTasks(Some(parse_id(rest)?)),
        "help" | "?" => Intent::Help,
        "quit" | "exit" | "q" => Intent::Quit,
        other => return Err(format!("unknown command '{other}', try 'help'")),
    };
    Ok(Some(intent))
}

fn parse_id(raw: &str) -> Result<i64, String> {
    if raw.is_empty() {
        return Err("an id is required".into());
    }
    raw.parse().map_err(|_| format!("'{raw}' is not an id"))
}

fn parse_field(raw: &str) -> Result<Field, String> {
    if raw.is_empty() {
        return Err("a field name is required".into());
    }
    raw.parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_commands_with_arguments() {
        assert_eq!(parse_intent("edit 4"), Ok(Some(Intent::EditRequest(4))));
        assert_eq!(parse_intent("show 2"), Ok(Some(Intent::Show(2))));
        assert_eq!(parse_intent("  delete 7 "), Ok(Some(Intent::DeleteRequest(7))));
        assert_eq!(parse_intent("tasks"), Ok(Some(Intent::OpenTasks(None))));
        assert_eq!(parse_intent("tasks 32"), Ok(Some(Intent::OpenTasks(Some(32)))));
        assert_eq!(parse_intent("YES"), Ok(Some(Intent::ConfirmDelete)));
        assert_eq!(parse_intent(""), Ok(None));
    }

    #[test]
    fn set_keeps_the_rest_of_the_line_as_value() {
        assert_eq!(
            parse_intent("set description  water the  roses "),
            Ok(Some(Intent::SetField(
                Field::Description,
                "water the  roses".into()
            )))
        );
        assert_eq!(
            parse_intent("set due-date"),
            Ok(Some(Intent::SetField(Field::DueDate, String::new())))
        );
        assert_eq!(parse_intent("check title"), Ok(Some(Intent::Blur(Field::Title))));
    }

    #[test]
    fn reports_malformed_lines() {
        assert_eq!(parse_intent("edit"), Err("an id is required".into()));
        assert_eq!(parse_intent("edit four"), Err("'four' is not an id".into()));
        assert_eq!(parse_intent("set colour red"), Err("unknown field 'colour'".into()));
        assert!(parse_intent("frobnicate").is_err());
    }
}
