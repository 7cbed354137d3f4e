use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// The request never produced a response
    Network(String),
    /// Non-2xx response
    Status(u16),
    /// The body was not the JSON shape we expect
    Decode(String),
    /// The request could not be built (bad base URL, bad path)
    Invalid(String),
}

impl FetchError {
    /// Transient failures are retried on the next poll without user action
    #[must_use]
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Network(_) => true,
            Self::Status(code) => *code == 429 || *code >= 500,
            Self::Decode(_) | Self::Invalid(_) => false,
        }
    }
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Network(e) => write!(f, "Request failed: {e}"),
            Self::Status(code) => write!(f, "Server responded with status {code}"),
            Self::Decode(e) => write!(f, "Failed to deserialize: {e}"),
            Self::Invalid(e) => write!(f, "Invalid request: {e}"),
        }
    }
}

impl std::error::Error for FetchError {}

/// State of a one-shot load that blocks its view until it resolves
#[derive(Debug, Clone, PartialEq, Default)]
pub enum LoadState<T> {
    #[default]
    Loading,
    Ready(T),
    Failed(String),
}

impl<T> LoadState<T> {
    #[must_use]
    pub fn from_result(result: Result<T, FetchError>) -> Self {
        match result {
            Ok(value) => Self::Ready(value),
            Err(e) => Self::Failed(e.to_string()),
        }
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    #[must_use]
    pub fn ready(&self) -> Option<&T> {
        match self {
            Self::Ready(value) => Some(value),
            _ => None,
        }
    }

    #[must_use]
    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Failed(e) => Some(e),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_classification() {
        assert!(FetchError::Network("offline".into()).is_transient());
        assert!(FetchError::Status(503).is_transient());
        assert!(FetchError::Status(429).is_transient());
        assert!(!FetchError::Status(404).is_transient());
        assert!(!FetchError::Decode("eof".into()).is_transient());
    }

    #[test]
    fn test_load_state_from_result() {
        let ready: LoadState<u32> = LoadState::from_result(Ok(3));
        assert_eq!(ready.ready(), Some(&3));
        assert!(ready.error().is_none());

        let failed: LoadState<u32> = LoadState::from_result(Err(FetchError::Status(500)));
        assert_eq!(failed.error(), Some("Server responded with status 500"));
        assert!(!failed.is_loading());
        assert!(LoadState::<u32>::default().is_loading());
    }
}
