//! Error types for the MediaTailor operator

use thiserror::Error;

use crate::mediatailor::ApiError;

/// Result type alias for operator operations
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Errors that can occur during reconciliation
#[derive(Error, Debug)]
pub enum Error {
    #[error("Kubernetes API error: {0}")]
    KubeError(#[from] kube::Error),

    /// A control plane call failed; `step` names what the reconciler was doing
    #[error("error while {step}: {source}")]
    Remote {
        step: &'static str,
        #[source]
        source: ApiError,
    },

    #[error("cannot derive a resource name from '{identifier}': {reason}")]
    IdentityError { identifier: String, reason: String },

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Finalizer error: {0}")]
    FinalizerError(String),
}

impl Error {
    /// Wrap a control plane failure with the step it happened in
    pub fn remote(step: &'static str) -> impl FnOnce(ApiError) -> Error {
        move |source| Error::Remote { step, source }
    }

    /// The underlying control plane error, if any
    pub fn api_error(&self) -> Option<&ApiError> {
        match self {
            Error::Remote { source, .. } => Some(source),
            _ => None,
        }
    }

    /// Check if the error is retriable
    pub fn is_retriable(&self) -> bool {
        match self {
            Error::KubeError(_) => true,
            Error::Remote { source, .. } => source.is_retriable(),
            _ => false,
        }
    }
}

impl From<kube::runtime::finalizer::Error<Error>> for Error {
    fn from(err: kube::runtime::finalizer::Error<Error>) -> Self {
        use kube::runtime::finalizer::Error as FinalizerError;
        match err {
            FinalizerError::ApplyFailed(e) | FinalizerError::CleanupFailed(e) => e,
            FinalizerError::AddFinalizer(e) | FinalizerError::RemoveFinalizer(e) => {
                Error::KubeError(e)
            }
            FinalizerError::UnnamedObject => {
                Error::FinalizerError("object has no name".to_string())
            }
            FinalizerError::InvalidFinalizer => {
                Error::FinalizerError("invalid finalizer name".to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mediatailor::{ApiErrorKind, Operation};

    #[test]
    fn test_remote_error_names_step_and_operation() {
        let err = Error::remote("starting the channel")(ApiError::new(
            Operation::StartChannel,
            ApiErrorKind::Server,
            "internal failure",
        ));
        assert_eq!(
            err.to_string(),
            "error while starting the channel: StartChannel failed (server error): internal failure"
        );
        assert!(err.is_retriable());
        assert_eq!(
            err.api_error().map(|e| e.operation),
            Some(Operation::StartChannel)
        );
    }

    #[test]
    fn test_validation_and_identity_errors_are_not_retriable() {
        assert!(!Error::ValidationError("bad".to_string()).is_retriable());
        assert!(!Error::IdentityError {
            identifier: "x".to_string(),
            reason: "not an ARN".to_string(),
        }
        .is_retriable());
    }

    #[test]
    fn test_client_errors_are_not_retriable() {
        let err = Error::remote("updating the channel")(ApiError::new(
            Operation::UpdateChannel,
            ApiErrorKind::BadRequest,
            "invalid outputs",
        ));
        assert!(!err.is_retriable());
    }
}
