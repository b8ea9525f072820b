use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Error body returned by the backend on non-2xx responses.
///
/// `detail` is either a plain message or a list of field validation entries
/// (`[{"loc": [...], "msg": "..."}]`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    #[serde(default)]
    pub detail: Value,
}

impl ApiError {
    pub fn new(detail: impl Into<String>) -> Self {
        Self {
            detail: Value::String(detail.into()),
        }
    }

    /// Flattens `detail` into a single line, or `None` when it carries nothing readable.
    pub fn message(&self) -> Option<String> {
        match &self.detail {
            Value::String(message) if !message.trim().is_empty() => Some(message.trim().to_string()),
            Value::Array(entries) => {
                let messages: Vec<String> = entries.iter().filter_map(entry_message).collect();
                (!messages.is_empty()).then(|| messages.join("; "))
            }
            _ => None,
        }
    }
}

fn entry_message(entry: &Value) -> Option<String> {
    let msg = entry.get("msg")?.as_str()?;
    let field = entry
        .get("loc")
        .and_then(Value::as_array)
        .and_then(|loc| loc.last())
        .and_then(Value::as_str);
    Some(match field {
        Some(field) => format!("{field}: {msg}"),
        None => msg.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_detail_is_used_verbatim() {
        let err: ApiError = serde_json::from_str(r#"{"detail":"Project not found"}"#).expect("decode");
        assert_eq!(err.message().as_deref(), Some("Project not found"));
    }

    #[test]
    fn validation_detail_names_fields() {
        let err: ApiError = serde_json::from_str(
            r#"{"detail":[{"loc":["body","title"],"msg":"field required","type":"value_error.missing"}]}"#,
        )
        .expect("decode");
        assert_eq!(err.message().as_deref(), Some("title: field required"));
    }

    #[test]
    fn missing_detail_has_no_message() {
        let err: ApiError = serde_json::from_str("{}").expect("decode");
        assert_eq!(err.message(), None);
    }
}
