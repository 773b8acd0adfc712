use std::{error::Error as StdError, fmt};
use thiserror::Error as ThisError;

/// Boxed error type accepted from caller-supplied callbacks.
pub type BoxError = Box<dyn StdError + Send + Sync + 'static>;

///
/// ProviderError
///
/// Structured error with a stable classification.
/// Backend and conversion failures keep the caller's original error as
/// `source`, untouched, so it can be downcast at the call site.
///

#[derive(Debug, ThisError)]
#[error("{message}")]
pub struct ProviderError {
    pub class: ErrorClass,
    pub origin: ErrorOrigin,
    pub message: String,

    #[source]
    source: Option<BoxError>,
}

impl ProviderError {
    /// Construct a ProviderError without an underlying source.
    pub fn new(class: ErrorClass, origin: ErrorOrigin, message: impl Into<String>) -> Self {
        Self {
            class,
            origin,
            message: message.into(),
            source: None,
        }
    }

    /// Construct a query-origin validation error.
    pub(crate) fn invalid_query(message: impl Into<String>) -> Self {
        Self::new(ErrorClass::InvalidQuery, ErrorOrigin::Query, message)
    }

    /// Construct a setup-time configuration error.
    pub(crate) fn configuration(origin: ErrorOrigin, message: impl Into<String>) -> Self {
        Self::new(ErrorClass::Configuration, origin, message)
    }

    /// Standard error for a sort key with no registered comparator.
    pub(crate) fn unsortable_property(origin: ErrorOrigin, key: &str) -> Self {
        Self::configuration(
            origin,
            format!("property '{key}' has no comparator and cannot be sorted"),
        )
    }

    /// Wrap a failure raised by a backend fetch or count callback.
    pub(crate) fn backend(operation: &'static str, source: impl Into<BoxError>) -> Self {
        let source = source.into();

        Self {
            class: ErrorClass::Backend,
            origin: ErrorOrigin::BackendProvider,
            message: format!("backend {operation} callback failed: {source}"),
            source: Some(source),
        }
    }

    /// Wrap a failure raised by a filter converter.
    pub(crate) fn conversion(source: impl Into<BoxError>) -> Self {
        let source = source.into();

        Self {
            class: ErrorClass::Conversion,
            origin: ErrorOrigin::Wrapper,
            message: format!("filter conversion failed: {source}"),
            source: Some(source),
        }
    }

    #[must_use]
    pub const fn is_configuration(&self) -> bool {
        matches!(self.class, ErrorClass::Configuration)
    }

    #[must_use]
    pub const fn is_backend(&self) -> bool {
        matches!(self.class, ErrorClass::Backend)
    }

    /// Borrow the caller-supplied source error as a concrete type.
    #[must_use]
    pub fn source_as<E: StdError + 'static>(&self) -> Option<&E> {
        self.source.as_deref()?.downcast_ref::<E>()
    }

    /// Consume this error and return the caller-supplied source, if any.
    #[must_use]
    pub fn into_source(self) -> Option<BoxError> {
        self.source
    }

    #[must_use]
    pub fn display_with_class(&self) -> String {
        format!("{}:{}: {}", self.origin, self.class, self.message)
    }
}

///
/// ErrorClass
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorClass {
    Backend,
    Configuration,
    Conversion,
    InvalidQuery,
}

impl fmt::Display for ErrorClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Backend => "backend",
            Self::Configuration => "configuration",
            Self::Conversion => "conversion",
            Self::InvalidQuery => "invalid_query",
        };
        write!(f, "{label}")
    }
}

///
/// ErrorOrigin
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorOrigin {
    BackendProvider,
    ListProvider,
    Query,
    Sort,
    Wrapper,
}

impl fmt::Display for ErrorOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::BackendProvider => "backend_provider",
            Self::ListProvider => "list_provider",
            Self::Query => "query",
            Self::Sort => "sort",
            Self::Wrapper => "wrapper",
        };
        write!(f, "{label}")
    }
}

///
/// TESTS
///
