//! Error types for the `domain` layer.
use crate::validation::FieldErrors;
use session_auth::error::{Error as SessionError, ErrorKind as SessionErrorKind};
use std::error::Error as StdError;
use std::fmt;

/// Top-level domain error type.
/// Errors in the Domain layer are modeled as a tree structure
/// with `domain::error::Error` as the root type holding a tree of `error_kind`
/// enums that represent the kinds of errors that can occur in the domain layer or
/// in lower layers. The `source` field is used to hold the original error that caused
/// the domain error. `session-auth` errors are translated here so the CLI only ever
/// deals with domain error kinds.
#[derive(Debug)]
pub struct Error {
    pub source: Option<Box<dyn StdError + Send + Sync>>,
    pub error_kind: DomainErrorKind,
}

/// Enum representing the major categories of errors that can occur in the `domain` layer.
#[derive(Debug, PartialEq)]
pub enum DomainErrorKind {
    Internal(InternalErrorKind),
    External(ExternalErrorKind),
}

/// Enum representing the various kinds of internal errors that can occur in the `domain` layer.
#[derive(Debug, PartialEq)]
pub enum InternalErrorKind {
    /// A form failed client-side validation; nothing was sent.
    Validation(FieldErrors),
    /// The session store could not be read or written.
    Storage,
    Config,
    Other(String),
}

/// Enum representing the various kinds of external errors that can occur in the `domain` layer.
#[derive(Debug, PartialEq)]
pub enum ExternalErrorKind {
    Network,
    /// The API answered with a non-success status.
    Api { status: u16, message: String },
    /// The API answered with a body we could not interpret.
    Decode,
}

impl Error {
    pub fn validation(errors: FieldErrors) -> Self {
        Error {
            source: None,
            error_kind: DomainErrorKind::Internal(InternalErrorKind::Validation(errors)),
        }
    }

    pub fn api(status: u16, message: impl Into<String>) -> Self {
        Error {
            source: None,
            error_kind: DomainErrorKind::External(ExternalErrorKind::Api {
                status,
                message: message.into(),
            }),
        }
    }

    pub fn decode(message: &str) -> Self {
        Error {
            source: Some(message.to_string().into()),
            error_kind: DomainErrorKind::External(ExternalErrorKind::Decode),
        }
    }

    /// Status code of an API error, if this is one.
    pub fn status(&self) -> Option<u16> {
        match &self.error_kind {
            DomainErrorKind::External(ExternalErrorKind::Api { status, .. }) => Some(*status),
            _ => None,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &self.error_kind {
            DomainErrorKind::Internal(InternalErrorKind::Validation(errors)) => {
                write!(f, "{}", errors)
            }
            DomainErrorKind::External(ExternalErrorKind::Api { message, .. }) => {
                write!(f, "{}", message)
            }
            DomainErrorKind::External(ExternalErrorKind::Network) => {
                write!(f, "Network error. Please try again.")
            }
            _ => write!(f, "Domain Error: {:?}", self.error_kind),
        }
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn StdError + 'static))
    }
}

// This is where we translate errors from the `session-auth` layer to the `domain` layer.
impl From<SessionError> for Error {
    fn from(err: SessionError) -> Self {
        let error_kind = match err.error_kind {
            SessionErrorKind::Http(_) => DomainErrorKind::External(ExternalErrorKind::Network),
            SessionErrorKind::Storage(_) => DomainErrorKind::Internal(InternalErrorKind::Storage),
            SessionErrorKind::Config(_) => DomainErrorKind::Internal(InternalErrorKind::Config),
        };

        Error {
            source: Some(Box::new(err)),
            error_kind,
        }
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        let error_kind = if err.is_decode() {
            DomainErrorKind::External(ExternalErrorKind::Decode)
        } else {
            DomainErrorKind::External(ExternalErrorKind::Network)
        };

        Error {
            source: Some(Box::new(err)),
            error_kind,
        }
    }
}
