//! Typed failures for a rotation run
//!
//! Every variant aborts the run. Commands wrap these in `eyre` context so the
//! top level prints the whole chain and exits non-zero.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RotateError {
    /// Configuration is present but unusable
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The avatar service could not be reached or answered garbage
    #[error("transport error talking to {url}")]
    Transport {
        url: String,
        #[source]
        source: ureq::Error,
    },

    /// The service answered with something other than 204 No Content
    #[error("avatar update rejected by service (HTTP {status})")]
    Rejected { status: u16 },

    /// The state record could not be read or written
    #[error("state file {} could not be accessed", .path.display())]
    Persistence {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl RotateError {
    pub fn persistence(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Persistence {
            path: path.into(),
            source,
        }
    }

    /// Short label used when reporting which kind of failure ended a run
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Configuration(_) => "ConfigurationError",
            Self::Transport { .. } => "TransportError",
            Self::Rejected { .. } => "RejectedByService",
            Self::Persistence { .. } => "PersistenceError",
        }
    }
}

pub type Result<T, E = RotateError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_rejected_message_carries_status() {
        let err = RotateError::Rejected { status: 403 };
        assert_eq!(err.to_string(), "avatar update rejected by service (HTTP 403)");
        assert_eq!(err.kind(), "RejectedByService");
    }

    #[test]
    fn test_persistence_keeps_source() {
        let err = RotateError::persistence(
            "/tmp/state",
            io::Error::new(io::ErrorKind::PermissionDenied, "nope"),
        );
        assert!(err.to_string().contains("/tmp/state"));
        assert_eq!(err.source().unwrap().to_string(), "nope");
        assert_eq!(err.kind(), "PersistenceError");
    }

    #[test]
    fn test_configuration_kind() {
        let err = RotateError::Configuration("avatar_ids is empty".to_string());
        assert_eq!(err.kind(), "ConfigurationError");
        assert!(err.to_string().contains("avatar_ids is empty"));
    }
}
