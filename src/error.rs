use thiserror::Error;

/// Failures from the remote collaborators (GitHub REST, chat completions).
///
/// The app layer turns these into notifications; nothing here is fatal.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("API error: {status}")]
    Http { status: u16 },

    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("unexpected response: {0}")]
    Decode(#[from] serde_json::Error),

    /// Rejected locally, before any request is sent
    #[error("{0}")]
    InvalidInput(String),

    #[error("{0} is not set")]
    MissingCredential(String),

    #[error("reply of length 0 received")]
    EmptyReply,
}

impl FetchError {
    /// True when the request never left the machine
    pub fn is_local(&self) -> bool {
        matches!(
            self,
            FetchError::InvalidInput(_) | FetchError::MissingCredential(_)
        )
    }
}

pub type FetchResult<T> = std::result::Result<T, FetchError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_error_message_includes_status() {
        let err = FetchError::Http { status: 404 };
        assert_eq!(err.to_string(), "API error: 404");
        assert!(!err.is_local());
    }

    #[test]
    fn input_and_credential_errors_are_local() {
        assert!(FetchError::InvalidInput("bad".into()).is_local());
        assert!(FetchError::MissingCredential("OpenAI API key".into()).is_local());
        assert!(!FetchError::EmptyReply.is_local());
    }
}
