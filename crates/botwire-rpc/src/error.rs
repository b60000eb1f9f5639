//! Error types for the botwire-rpc crate.
//!
//! Every failure in marshalling, transport, or response decoding surfaces as
//! the single [`Error`] type. Nothing is retried or swallowed.

use std::path::PathBuf;

use botwire_types::ResponseParameters;

use crate::protocol::ResultShape;

/// Errors raised by a [`Transport`](crate::transport::Transport).
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A non-success status whose body was not an API envelope.
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("{0}")]
    Other(String),
}

impl TransportError {
    /// HTTP status reported by the server, if the failure carried one.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Http(e) => e.status().map(|s| s.as_u16()),
            Self::Status { status, .. } => Some(*status),
            Self::Io(_) | Self::Other(_) => None,
        }
    }
}

/// Unified error type for API calls
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Cannot upload {}: {source}", .path.display())]
    Upload {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Cannot encode parameter '{param}': {source}")]
    Encode {
        param: String,
        source: serde_json::Error,
    },

    #[error("Parameter '{0}' collides with an uploaded file part")]
    PartNameCollision(String),

    #[error("Unsupported: multiple return shapes ({0} declared)")]
    MultipleShapes(usize),

    #[error("Unexpected result: expected {expected}, got {found}")]
    ShapeMismatch {
        expected: ResultShape,
        found: &'static str,
    },

    #[error("API error {code}: {description}")]
    Api {
        code: i64,
        description: String,
        parameters: Option<ResponseParameters>,
    },

    #[error("Response reported success without a result")]
    MissingResult,

    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),
}

impl Error {
    pub fn api(code: i64, description: impl Into<String>) -> Self {
        Self::Api {
            code,
            description: description.into(),
            parameters: None,
        }
    }

    /// Human-readable description of the failure.
    #[must_use]
    pub fn message(&self) -> String {
        self.to_string()
    }

    /// Numeric code: the API `error_code`, or the HTTP status of a transport failure.
    #[must_use]
    pub fn code(&self) -> Option<i64> {
        match self {
            Self::Api { code, .. } => Some(*code),
            Self::Transport(e) => e.status().map(i64::from),
            _ => None,
        }
    }

    /// Seconds to wait before retrying, when the API asked for it.
    #[must_use]
    pub fn retry_after(&self) -> Option<i64> {
        match self {
            Self::Api {
                parameters: Some(p),
                ..
            } => p.retry_after,
            _ => None,
        }
    }

    /// New chat id after a group was migrated to a supergroup.
    #[must_use]
    pub fn migrate_to_chat_id(&self) -> Option<i64> {
        match self {
            Self::Api {
                parameters: Some(p),
                ..
            } => p.migrate_to_chat_id,
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_error_api_factory() {
        let err = Error::api(400, "Bad Request: chat not found");
        match &err {
            Error::Api {
                code,
                description,
                parameters,
            } => {
                assert_eq!(*code, 400);
                assert_eq!(description, "Bad Request: chat not found");
                assert!(parameters.is_none());
            }
            _ => panic!("Expected Api error"),
        }
        assert_eq!(err.code(), Some(400));
        assert_eq!(err.message(), "API error 400: Bad Request: chat not found");
    }

    #[test]
    fn test_error_from_json_error() {
        let json_err = serde_json::from_str::<serde_json::Value>("invalid json").unwrap_err();
        let err: Error = json_err.into();

        assert!(matches!(err, Error::Json(_)));
        assert!(err.source().is_some());
        assert_eq!(err.code(), None);
    }

    #[test]
    fn test_error_from_transport_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::ConnectionReset, "reset by peer");
        let err: Error = TransportError::Io(io_err).into();

        assert!(matches!(err, Error::Transport(TransportError::Io(_))));
        assert!(err.to_string().contains("reset by peer"));
        assert_eq!(err.code(), None);
    }

    #[test]
    fn test_status_error_code() {
        let err: Error = TransportError::Status {
            status: 502,
            body: "<html>Bad Gateway</html>".to_string(),
        }
        .into();
        assert_eq!(err.code(), Some(502));
        assert!(err.to_string().contains("Bad Gateway"));
    }

    #[test]
    fn test_upload_error_keeps_cause() {
        let err = Error::Upload {
            path: PathBuf::from("/nope/cat.jpg"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "No such file"),
        };
        assert!(err.to_string().contains("/nope/cat.jpg"));
        assert!(err.to_string().contains("No such file"));
        assert!(err.source().is_some());
    }

    #[test]
    fn test_retry_after_and_migration() {
        let err = Error::Api {
            code: 429,
            description: "Too Many Requests: retry after 5".to_string(),
            parameters: Some(ResponseParameters {
                retry_after: Some(5),
                migrate_to_chat_id: None,
            }),
        };
        assert_eq!(err.retry_after(), Some(5));
        assert_eq!(err.migrate_to_chat_id(), None);

        assert_eq!(Error::MissingResult.retry_after(), None);
    }

    #[test]
    fn test_error_display() {
        assert_eq!(
            Error::MultipleShapes(2).to_string(),
            "Unsupported: multiple return shapes (2 declared)"
        );
        assert_eq!(
            Error::MissingResult.to_string(),
            "Response reported success without a result"
        );

        let err = Error::ShapeMismatch {
            expected: ResultShape::ArrayOf("Update"),
            found: "object",
        };
        assert_eq!(
            err.to_string(),
            "Unexpected result: expected array of Update, got object"
        );
    }

    #[test]
    fn test_transport_other_display() {
        let err = TransportError::Other("cancelled".to_string());
        assert_eq!(err.to_string(), "cancelled");
        assert_eq!(err.status(), None);
    }

    #[test]
    fn test_result_type_alias() {
        #[allow(clippy::unnecessary_wraps)]
        fn returns_result() -> Result<i32> {
            Ok(42)
        }

        fn returns_error() -> Result<i32> {
            Err(Error::MissingResult)
        }

        assert_eq!(returns_result().unwrap(), 42);
        assert!(matches!(returns_error(), Err(Error::MissingResult)));
    }
}
