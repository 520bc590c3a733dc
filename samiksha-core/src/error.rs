//! Error types for the samiksha orchestration core.
//!
//! Uses `thiserror` for public API error types with structured variants
//! covering configuration, individual provider calls, routing, and
//! whole-pipeline failures.

/// Top-level error type for the samiksha core library.
#[derive(Debug, thiserror::Error)]
pub enum SamikshaError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    #[error("Routing error: {0}")]
    Routing(#[from] RoutingError),

    #[error("Pipeline error: {0}")]
    Pipeline(#[from] PipelineError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Errors from capability configuration.
///
/// Raised before any remote call is made; a configuration error always
/// short-circuits the task.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ConfigError {
    #[error("No completion capability is configured: set at least one of {expected}")]
    NoCompletionCapability { expected: String },

    #[error("Search capability '{name}' is not configured: set {var} (must start with '{prefix}')")]
    SearchNotConfigured {
        name: String,
        var: String,
        prefix: String,
    },

    /// Several prerequisites are missing at once; one entry per problem.
    #[error("{}", .errors.iter().map(|e| e.to_string()).collect::<Vec<_>>().join("; "))]
    MissingPrerequisites { errors: Vec<ConfigError> },

    #[error("Invalid configuration: {message}")]
    Invalid { message: String },

    #[error("Configuration parse error: {message}")]
    ParseError { message: String },
}

/// Errors from a single remote capability call.
///
/// Recovered locally by the orchestrator's fallback loop; only surfaced
/// to the caller when the whole chain is exhausted.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ProviderError {
    #[error("API request failed with status {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Response parse error: {message}")]
    ResponseParse { message: String },

    #[error("Connection failed: {message}")]
    Connection { message: String },

    #[error("Request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    #[error("Authentication failed for capability {capability}")]
    AuthFailed { capability: String },
}

/// Errors from the task router.
#[derive(Debug, Clone, thiserror::Error)]
pub enum RoutingError {
    #[error("Unsupported task: no capability mapped for '{task_type}' in language '{language}'")]
    UnsupportedTask { task_type: String, language: String },

    #[error("Capability '{capability}' required by task '{task_type}' is not available")]
    CapabilityUnavailable {
        capability: String,
        task_type: String,
    },
}

/// Errors from the orchestration pipeline.
#[derive(Debug, Clone, thiserror::Error)]
pub enum PipelineError {
    #[error("All capabilities failed: {summary}")]
    ChainExhausted {
        /// (capability name, error message) per attempt, in priority order.
        attempts: Vec<(String, String)>,
        summary: String,
    },

    #[error("Subtask '{subtask}' failed: {message}")]
    SubtaskFailed { subtask: String, message: String },

    #[error("Illegal mission transition from '{from}' to '{to}'")]
    InvalidTransition { from: String, to: String },
}

impl PipelineError {
    /// Build a chain-exhausted error from the per-capability attempts.
    pub fn exhausted(attempts: Vec<(String, String)>) -> Self {
        let summary = attempts
            .iter()
            .map(|(name, err)| format!("{name}: {err}"))
            .collect::<Vec<_>>()
            .join("; ");
        PipelineError::ChainExhausted { attempts, summary }
    }
}

/// A type alias for results using the top-level `SamikshaError`.
pub type Result<T> = std::result::Result<T, SamikshaError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_config() {
        let err = SamikshaError::Config(ConfigError::NoCompletionCapability {
            expected: "SARVAM_API_KEY, KRUTRIM_API_KEY, OPENAI_API_KEY".into(),
        });
        assert_eq!(
            err.to_string(),
            "Configuration error: No completion capability is configured: \
             set at least one of SARVAM_API_KEY, KRUTRIM_API_KEY, OPENAI_API_KEY"
        );
    }

    #[test]
    fn test_missing_prerequisites_joins_entries() {
        let err = ConfigError::MissingPrerequisites {
            errors: vec![
                ConfigError::NoCompletionCapability {
                    expected: "SARVAM_API_KEY".into(),
                },
                ConfigError::SearchNotConfigured {
                    name: "tavily".into(),
                    var: "TAVILY_API_KEY".into(),
                    prefix: "tvly-".into(),
                },
            ],
        };
        let msg = err.to_string();
        assert!(msg.contains("SARVAM_API_KEY"));
        assert!(msg.contains("TAVILY_API_KEY"));
        assert!(msg.contains("; "));
    }

    #[test]
    fn test_error_display_provider() {
        let err = SamikshaError::Provider(ProviderError::Api {
            status: 503,
            message: "service unavailable".into(),
        });
        assert_eq!(
            err.to_string(),
            "Provider error: API request failed with status 503: service unavailable"
        );
    }

    #[test]
    fn test_error_display_routing() {
        let err = RoutingError::UnsupportedTask {
            task_type: "sentiment".into(),
            language: "english".into(),
        };
        assert_eq!(
            err.to_string(),
            "Unsupported task: no capability mapped for 'sentiment' in language 'english'"
        );
    }

    #[test]
    fn test_pipeline_exhausted_lists_all_attempts() {
        let err = PipelineError::exhausted(vec![
            ("sarvam".into(), "timeout".into()),
            ("krutrim".into(), "status 500".into()),
            ("openai".into(), "connection refused".into()),
        ]);
        let msg = err.to_string();
        assert!(msg.contains("sarvam: timeout"));
        assert!(msg.contains("krutrim: status 500"));
        assert!(msg.contains("openai: connection refused"));
        match err {
            PipelineError::ChainExhausted { attempts, .. } => assert_eq!(attempts.len(), 3),
            other => panic!("Expected ChainExhausted, got {other:?}"),
        }
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: SamikshaError = io_err.into();
        assert!(matches!(err, SamikshaError::Io(_)));
    }

    #[test]
    fn test_provider_timeout_display() {
        let err = ProviderError::Timeout { timeout_secs: 30 };
        assert_eq!(err.to_string(), "Request timed out after 30s");
    }
}
