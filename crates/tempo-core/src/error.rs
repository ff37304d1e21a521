/// Core error types for the Tempo engine.
use std::time::Duration;

/// A specialized Result type for Tempo operations.
pub type TempoResult<T> = Result<T, TempoError>;

/// Top-level error type encompassing all Tempo subsystems.
#[derive(Debug, thiserror::Error)]
pub enum TempoError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("unknown transition '{name}'")]
    UnknownTransition { name: String },

    #[error("cannot convert '{input}' to pixels")]
    Unit { input: String },

    #[error("preparation of {kind} element '{element}' timed out after {elapsed:?}")]
    PrepareTimeout {
        element: String,
        kind: String,
        elapsed: Duration,
    },

    #[error("preparation of {kind} element '{element}' failed: {source}")]
    Prepare {
        element: String,
        kind: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("render error: {0}")]
    Render(String),

    #[error("gpu error: {0}")]
    Gpu(String),

    #[error("config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

impl TempoError {
    /// Create an invalid-argument error.
    pub fn invalid(message: impl Into<String>) -> Self {
        TempoError::InvalidArgument(message.into())
    }

    /// Create an unknown-transition error.
    pub fn unknown_transition(name: impl Into<String>) -> Self {
        TempoError::UnknownTransition { name: name.into() }
    }

    /// True when the error came from a per-element preparation step.
    pub fn is_prepare_failure(&self) -> bool {
        matches!(
            self,
            TempoError::PrepareTimeout { .. } | TempoError::Prepare { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_transition_display() {
        let err = TempoError::unknown_transition("unknown-xyz");
        assert_eq!(err.to_string(), "unknown transition 'unknown-xyz'");
    }

    #[test]
    fn test_timeout_display_mentions_element() {
        let err = TempoError::PrepareTimeout {
            element: "title".into(),
            kind: "text".into(),
            elapsed: Duration::from_secs(10),
        };
        let msg = err.to_string();
        assert!(msg.contains("title"));
        assert!(msg.contains("text"));
        assert!(err.is_prepare_failure());
    }

    #[test]
    fn test_prepare_keeps_source() {
        let err = TempoError::Prepare {
            element: "logo".into(),
            kind: "image".into(),
            source: anyhow::anyhow!("decode failed"),
        };
        assert!(err.to_string().contains("decode failed"));
        assert!(std::error::Error::source(&err).is_some());
    }
}
