//! Error types for field conversion.

/// Boxed error produced by a render adapter.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Error returned by conversion and validation.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The value handed to an operation did not have the required shape.
    #[error("invalid type: {0}")]
    InvalidType(&'static str),

    /// The render adapter failed on a field's text.
    #[error("render failed at `{path}`: {source}")]
    Render {
        /// Dotted path of the field being rendered (e.g. `details.description`).
        path: String,
        /// Error raised by the adapter, unchanged.
        source: BoxError,
    },

    /// Records were nested deeper than the converter's configured limit.
    #[error("maximum traversal depth of {limit} exceeded at `{path}`")]
    DepthExceeded {
        /// Configured depth limit.
        limit: usize,
        /// Path of the record that crossed the limit.
        path: String,
    },
}

impl Error {
    /// Whether this is an [`Error::InvalidType`].
    #[must_use]
    pub fn is_invalid_type(&self) -> bool {
        matches!(self, Error::InvalidType(_))
    }

    /// Field path at which the error occurred, if any.
    #[must_use]
    pub fn path(&self) -> Option<&str> {
        match self {
            Error::InvalidType(_) => None,
            Error::Render { path, .. } | Error::DepthExceeded { path, .. } => Some(path),
        }
    }
}
