use thiserror::Error;

pub type ClientResult<T> = std::result::Result<T, ClientError>;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("request cancelled")]
    Cancelled,
    #[error(
        "request failed with HTTP {status}{}",
        .detail.as_deref().map(|detail| format!(": {detail}")).unwrap_or_default()
    )]
    RequestFailed { status: u16, detail: Option<String> },
    #[error("network error: {0}")]
    Network(String),
    #[error("invalid response body: {0}")]
    InvalidResponse(String),
    #[error("{resource} cannot be listed under a project")]
    InvalidScope { resource: &'static str },
    #[error("{resource} can only be created inside a project")]
    MissingParent { resource: &'static str },
    #[error("invalid base url '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },
}

impl ClientError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, ClientError::Cancelled)
    }

    /// User-facing notice for a failed `action`; `None` for cancellations, which stay silent.
    pub fn notice(&self, action: &str) -> Option<String> {
        let notice = match self {
            ClientError::Cancelled => return None,
            ClientError::RequestFailed {
                status,
                detail: Some(detail),
            } => format!("{action}: {detail} (HTTP {status})"),
            ClientError::RequestFailed {
                status,
                detail: None,
            } => format!("{action} (HTTP {status})"),
            ClientError::Network(_) => format!("{action}: server unreachable"),
            ClientError::InvalidResponse(_) => format!("{action}: unexpected server response"),
            other => format!("{action}: {other}"),
        };
        Some(notice)
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ClientError::InvalidResponse(err.to_string())
        } else {
            ClientError::Network(err.to_string())
        }
    }
}
