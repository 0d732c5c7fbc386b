use crate::handler::{HandlerFailure, SourceLocation};
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for the application
pub type Result<T> = std::result::Result<T, Error>;

/// Fatal conditions that stop a documentation run.
///
/// Validation failures and response overrides raised while resolving parameters are
/// not errors: they become the action's response (see [`crate::handler::Rejection`]).
#[derive(Debug, Error)]
pub enum Error {
    /// The descriptor declares neither the field nor a `config` override for it.
    #[error("{location}\nHttp {field} is required on {action}()\nExample {example}")]
    MissingRequiredField {
        field: &'static str,
        action: String,
        location: SourceLocation,
        example: String,
    },

    /// A primitive handler parameter has no value in the descriptor's url params.
    #[error("{location}\nArgument \"{parameter}\" is not provided of {action}({signature})\nExample {example}")]
    MissingParameterValue {
        parameter: String,
        signature: String,
        action: String,
        location: SourceLocation,
        example: String,
    },

    /// A complex parameter could not be synthesized.
    #[error("{action}: {message}")]
    Resolution { action: String, message: String },

    /// The handler failed while running in strict mode.
    #[error("{failure} on {action}()")]
    Invocation {
        action: String,
        failure: HandlerFailure,
    },

    #[error("group document {} is unreadable: {reason}", path.display())]
    GroupDocumentUnreadable { path: PathBuf, reason: String },

    #[error("Controller {0} is not found.")]
    ControllerNotFound(String),

    #[error("IO error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("invalid configuration: {0}")]
    Config(String),
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }

    /// Whether the error came from a descriptor that needs fixing, as opposed to a
    /// runtime or filesystem failure.
    pub fn is_configuration_mistake(&self) -> bool {
        matches!(
            self,
            Error::MissingRequiredField { .. } | Error::MissingParameterValue { .. }
        )
    }
}
