//! Error types for catalog model operations

use thiserror::Error;

/// Main error type for catalog operations
#[derive(Error, Debug)]
pub enum CatalogError {
    /// A trait name was resolved that the model's schema does not declare
    #[error("Trait '{trait_name}' is not declared by schema '{type_name}'")]
    UndeclaredTrait {
        /// Trait name that was requested
        trait_name: String,
        /// Type discriminator of the schema
        type_name: String,
    },

    /// A trait value did not match the declared kind
    #[error("Trait '{trait_name}' expects {expected}, got {actual}")]
    TraitType {
        /// Trait name that was written
        trait_name: String,
        /// Declared kind
        expected: String,
        /// Kind of the rejected value
        actual: String,
    },

    /// Fatal structural load error, surfaced to the UI with a title
    #[error("{title}: {message}")]
    Structural {
        /// User-facing error title
        title: String,
        /// User-facing message key or text
        message: String,
    },

    /// Network fetch errors
    #[error("Failed to fetch '{url}': {reason}")]
    Fetch {
        /// URL that failed
        url: String,
        /// Reason for failure
        reason: String,
    },

    /// Response parsing errors
    #[error("Failed to parse response: {message}")]
    Parse {
        /// Error message
        message: String,
        /// Source URL if available
        url: Option<String>,
    },

    /// Regex compilation errors in format rules
    #[error("Pattern error: {message}")]
    Pattern {
        /// Error message
        message: String,
        /// Pattern that failed to compile
        pattern: Option<String>,
    },

    /// An unregistered type discriminator was passed to the factory
    #[error("Unknown catalog member type '{0}'")]
    UnknownType(String),

    /// A model id collided in the registry
    #[error("A model with id '{0}' is already registered")]
    DuplicateId(String),

    /// A stratum name collided in the stratum order
    #[error("Stratum '{0}' is already registered in the stratum order")]
    DuplicateStratum(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic errors with context
    #[error("{message}")]
    Other {
        /// Error message
        message: String,
        /// Optional source error
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

/// Result type alias for catalog operations
pub type Result<T> = std::result::Result<T, CatalogError>;

impl CatalogError {
    /// Create an undeclared-trait error
    #[must_use]
    pub fn undeclared_trait(trait_name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self::UndeclaredTrait {
            trait_name: trait_name.into(),
            type_name: type_name.into(),
        }
    }

    /// Create a trait-kind mismatch error
    #[must_use]
    pub fn trait_type(
        trait_name: impl Into<String>,
        expected: impl Into<String>,
        actual: impl Into<String>,
    ) -> Self {
        Self::TraitType {
            trait_name: trait_name.into(),
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    /// Create a fatal structural error with a user-facing title
    #[must_use]
    pub fn structural(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Structural {
            title: title.into(),
            message: message.into(),
        }
    }

    /// Create a fetch error
    #[must_use]
    pub fn fetch(url: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Fetch {
            url: url.into(),
            reason: reason.into(),
        }
    }

    /// Create a parse error
    #[must_use]
    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse {
            message: message.into(),
            url: None,
        }
    }

    /// Create a parse error tagged with the source URL
    #[must_use]
    pub fn parse_at(message: impl Into<String>, url: impl Into<String>) -> Self {
        Self::Parse {
            message: message.into(),
            url: Some(url.into()),
        }
    }

    /// Create a configuration error
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a generic error
    #[must_use]
    pub fn other(message: impl Into<String>) -> Self {
        Self::Other {
            message: message.into(),
            source: None,
        }
    }

    /// Create a generic error with a source
    #[must_use]
    pub fn other_with_source<E>(message: impl Into<String>, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Other {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// True for errors that should surface to the UI with a title
    #[must_use]
    pub fn is_fatal_structural(&self) -> bool {
        matches!(self, Self::Structural { .. })
    }
}

impl From<serde_json::Error> for CatalogError {
    fn from(err: serde_json::Error) -> Self {
        Self::Parse {
            message: err.to_string(),
            url: None,
        }
    }
}

impl From<regex::Error> for CatalogError {
    fn from(err: regex::Error) -> Self {
        Self::Pattern {
            message: err.to_string(),
            pattern: None,
        }
    }
}

impl From<url::ParseError> for CatalogError {
    fn from(err: url::ParseError) -> Self {
        Self::Config(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let err = CatalogError::undeclared_trait("legends", "wms");
        assert!(matches!(err, CatalogError::UndeclaredTrait { .. }));

        let err = CatalogError::structural("SDMX load failed", "sdmx.missingDataflow");
        assert!(err.is_fatal_structural());
        let display = err.to_string();
        assert!(display.contains("SDMX load failed"));
        assert!(display.contains("sdmx.missingDataflow"));
    }

    #[test]
    fn test_error_conversions() {
        let json_err = serde_json::from_str::<serde_json::Value>("not json").unwrap_err();
        let err: CatalogError = json_err.into();
        assert!(matches!(err, CatalogError::Parse { .. }));

        let regex_err = regex::Regex::new("(unclosed").unwrap_err();
        let err: CatalogError = regex_err.into();
        assert!(matches!(err, CatalogError::Pattern { .. }));
    }
}
