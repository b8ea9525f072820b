use super::*;

fn draft_with_title(title: &str) -> Draft {
    Draft {
        title: title.to_string(),
        ..Draft::default()
    }
}

#[test]
fn text_normalization_round_trips() {
    for value in ["", "Description 1", " padded ", "0"] {
        assert_eq!(denormalize_text(normalize_text(value).as_deref()), value);
    }
    assert_eq!(normalize_text(""), None);
}

#[test]
fn empty_title_is_the_only_error_of_a_blank_draft() {
    let errors = validate(&Draft::default());
    assert_eq!(errors.len(), 1);
    assert_eq!(errors.get(&Field::Title).map(String::as_str), Some("Title is required"));
}

#[test]
fn whitespace_title_is_rejected() {
    assert!(validate_field(&draft_with_title("   "), Field::Title).is_some());
}

#[test]
fn optional_fields_are_format_checked_only_when_present() {
    let mut draft = draft_with_title("Plan");
    draft.due_date = "01/02/2024".into();
    draft.status = "blocked".into();
    draft.priority = "high".into();

    let errors = validate(&draft);
    assert_eq!(
        errors.get(&Field::DueDate).map(String::as_str),
        Some("Invalid date format")
    );
    assert_eq!(errors.get(&Field::Status).map(String::as_str), Some("Invalid status"));
    assert!(!errors.contains_key(&Field::Priority));

    draft.due_date = "2024-02-01".into();
    draft.status.clear();
    assert!(validate(&draft).is_empty());
}

#[test]
fn normalize_sends_cleared_fields_as_null() {
    let mut draft = draft_with_title("Plan");
    draft.due_date = "2024-02-01".into();
    draft.status = "in_progress".into();

    let payload = normalize(&draft).expect("valid draft");
    assert_eq!(payload.title.as_deref(), Some("Plan"));
    assert_eq!(payload.description, FieldValue::Cleared);
    assert_eq!(payload.assignee, FieldValue::Cleared);
    assert_eq!(payload.priority, FieldValue::Cleared);
    assert_eq!(payload.status, FieldValue::Set(Status::InProgress));
    assert_eq!(
        payload.due_date.as_set().map(|date| date.format(DATE_FORMAT).to_string()),
        Some("2024-02-01".to_string())
    );
}

#[test]
fn normalize_refuses_invalid_drafts() {
    let errors = normalize(&Draft::default()).expect_err("title missing");
    assert!(errors.contains_key(&Field::Title));
}

#[test]
fn fields_parse_from_their_wire_names() {
    assert_eq!("due_date".parse::<Field>(), Ok(Field::DueDate));
    assert_eq!("Due-Date".parse::<Field>(), Ok(Field::DueDate));
    assert!("deadline".parse::<Field>().is_err());
}
