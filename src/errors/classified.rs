//! Classified error value.

use std::backtrace::Backtrace;
use std::fmt;

use serde_json::Value;

use crate::errors::kind::ErrorKind;

/// Boxed error accepted as a cause or as an unclassified failure.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// An error carrying a fixed-vocabulary kind next to its message.
///
/// Fields are private and set only at construction; the value is consumed by
/// the response boundary.
pub struct ClassifiedError {
    kind: ErrorKind,
    code: String,
    message: String,
    details: Option<Value>,
    cause: Option<BoxError>,
    backtrace: Backtrace,
}

impl fmt::Display for ClassifiedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for ClassifiedError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.cause.as_ref().map(|e| e.as_ref() as &(dyn std::error::Error + 'static))
    }
}

impl ClassifiedError {
    pub fn new(kind: ErrorKind, code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind,
            code: code.into(),
            message: message.into(),
            details: None,
            cause: None,
            backtrace: Backtrace::capture(),
        }
    }

    /// Attach a structured payload.
    pub fn with_details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }

    /// Attach the original error.
    pub fn with_cause<E>(mut self, cause: E) -> Self
    where
        E: Into<BoxError>,
    {
        self.cause = Some(cause.into());
        self
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn details(&self) -> Option<&Value> {
        self.details.as_ref()
    }

    pub fn cause(&self) -> Option<&(dyn std::error::Error + Send + Sync + 'static)> {
        self.cause.as_deref()
    }

    pub fn backtrace(&self) -> &Backtrace {
        &self.backtrace
    }

    /// HTTP status for this error's kind.
    pub fn status(&self) -> u16 {
        crate::errors::kind::status_for(self.kind)
    }

    // Shorthands for the kinds raised at handler boundaries.

    pub fn validation(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Validation, code, message)
    }

    pub fn database(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Database, code, message)
    }

    pub fn external(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(ErrorKind::ExternalService, code, message)
    }

    pub fn rate_limited(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(ErrorKind::RateLimit, code, message)
    }

    pub fn internal(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Internal, code, message)
    }
}

impl fmt::Debug for ClassifiedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClassifiedError")
            .field("kind", &self.kind)
            .field("code", &self.code)
            .field("message", &self.message)
            .field("details", &self.details)
            .field("cause", &self.cause.as_ref().map(|c| c.to_string()))
            .finish()
    }
}

/// Build a classified error in one call.
pub fn classify(
    kind: ErrorKind,
    code: impl Into<String>,
    message: impl Into<String>,
    details: Option<Value>,
    cause: Option<BoxError>,
) -> ClassifiedError {
    let mut error = ClassifiedError::new(kind, code, message);
    error.details = details;
    error.cause = cause;
    error
}
