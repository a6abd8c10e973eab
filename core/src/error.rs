use http::StatusCode;
use std::fmt;
use thiserror::Error;

/// The error type for reqlist operations
#[derive(Error, Debug)]
#[error("{kind}: {message}")]
pub struct Error {
    kind: ErrorKind,
    message: String,
    #[source]
    source: Option<anyhow::Error>,
    context: Vec<String>,
    service: Option<ServiceError>,
}

/// The kind of error that occurred
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// A continuation token document is malformed.
    Format,

    /// The operation is not valid for the current state, for example a
    /// continuation token pinned to a location the request options forbid.
    InvalidOperation,

    /// The storage service answered with a non-success status.
    Service,

    /// Client side validation failed before any request was sent.
    Argument,

    /// The caller cancelled an in-flight operation.
    Cancelled,

    /// The client side execution time budget was exceeded.
    Timeout,

    /// Configuration error (missing fields, invalid values)
    ConfigInvalid,

    /// Unexpected errors (network, I/O, decoding, etc.)
    Unexpected,
}

/// Detail of a non-success response returned by the storage service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceError {
    /// HTTP status of the response.
    pub status: StatusCode,
    /// Error code reported by the server, like `ContainerNotFound`.
    pub code: Option<String>,
    /// Human readable message reported by the server.
    pub message: Option<String>,
    /// Request id assigned by the server.
    pub request_id: Option<String>,
}

impl fmt::Display for ServiceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "status {}", self.status)?;
        if let Some(code) = &self.code {
            write!(f, ", code {code}")?;
        }
        if let Some(message) = &self.message {
            write!(f, ", message {message}")?;
        }
        Ok(())
    }
}

impl Error {
    /// Create a new error with the given kind and message
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            source: None,
            context: Vec::new(),
            service: None,
        }
    }

    /// Add a source error
    pub fn with_source(mut self, source: impl Into<anyhow::Error>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Add a line of context, like the operation or the resource involved.
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context.push(context.into());
        self
    }

    /// Get the error kind
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Get the error message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Get the context lines attached to this error.
    pub fn context(&self) -> &[String] {
        &self.context
    }

    /// Get the service response detail if this error came from the service.
    pub fn service_error(&self) -> Option<&ServiceError> {
        self.service.as_ref()
    }

    /// Get the HTTP status if this error came from the service.
    pub fn status(&self) -> Option<StatusCode> {
        self.service.as_ref().map(|v| v.status)
    }

    /// Get the server error code if this error came from the service.
    pub fn service_code(&self) -> Option<&str> {
        self.service.as_ref().and_then(|v| v.code.as_deref())
    }

    /// Check if this error was raised before any request reached the network.
    pub fn is_client_side(&self) -> bool {
        matches!(
            self.kind,
            ErrorKind::Argument | ErrorKind::InvalidOperation | ErrorKind::ConfigInvalid
        )
    }
}

// Convenience constructors
impl Error {
    /// Create a format error
    pub fn format(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Format, message)
    }

    /// Create an invalid operation error
    pub fn invalid_operation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidOperation, message)
    }

    /// Create a service error from the response detail
    pub fn service(detail: ServiceError) -> Self {
        let mut err = Self::new(ErrorKind::Service, detail.to_string());
        err.service = Some(detail);
        err
    }

    /// Create an argument error
    pub fn argument(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Argument, message)
    }

    /// Create a cancelled error
    pub fn cancelled(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Cancelled, message)
    }

    /// Create a timeout error
    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Timeout, message)
    }

    /// Create a config invalid error
    pub fn config_invalid(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::ConfigInvalid, message)
    }

    /// Create an unexpected error
    pub fn unexpected(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Unexpected, message)
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::Format => write!(f, "invalid format"),
            ErrorKind::InvalidOperation => write!(f, "invalid operation"),
            ErrorKind::Service => write!(f, "service error"),
            ErrorKind::Argument => write!(f, "invalid argument"),
            ErrorKind::Cancelled => write!(f, "operation cancelled"),
            ErrorKind::Timeout => write!(f, "operation timed out"),
            ErrorKind::ConfigInvalid => write!(f, "invalid configuration"),
            ErrorKind::Unexpected => write!(f, "unexpected error"),
        }
    }
}

/// Convenience type alias for Results
pub type Result<T> = std::result::Result<T, Error>;

// Common From implementations
impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Self::unexpected(err.to_string()).with_source(err)
    }
}

impl From<http::Error> for Error {
    fn from(err: http::Error) -> Self {
        Self::argument(err.to_string()).with_source(anyhow::Error::from(err))
    }
}

impl From<http::uri::InvalidUri> for Error {
    fn from(err: http::uri::InvalidUri) -> Self {
        Self::config_invalid(err.to_string()).with_source(anyhow::Error::from(err))
    }
}

impl From<std::string::FromUtf8Error> for Error {
    fn from(err: std::string::FromUtf8Error) -> Self {
        Self::unexpected(err.to_string()).with_source(anyhow::Error::from(err))
    }
}

impl From<quick_xml::Error> for Error {
    fn from(err: quick_xml::Error) -> Self {
        Self::format(err.to_string()).with_source(anyhow::Error::from(err))
    }
}
