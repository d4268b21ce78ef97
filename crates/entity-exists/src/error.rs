//! Error types for the entity existence check
//!
//! Two tiers:
//!
//! - [`Error`]: configuration and data-integrity failures. These are bugs in
//!   the constraint declaration, entity metadata, or stored data, never bad
//!   user input, and always abort the current validation call.
//! - [`NotFound`]: the domain signal raised when no row matches and the
//!   constraint asked for hard failure.
use thiserror::Error;

/// Result type for existence-check operations
pub type Result<T> = std::result::Result<T, Error>;

/// Fatal error raised while resolving or executing an existence lookup
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// A constraint of another kind was handed to the validator
    #[error("Expected constraint of type '{expected}', got '{actual}'")]
    UnexpectedConstraint {
        /// The constraint type the validator handles
        expected: &'static str,
        /// The constraint type that was passed
        actual: String,
    },

    /// Target entity is empty or not known to any manager
    #[error("Entity value is not filled or entity '{entity}' does not exist")]
    InvalidEntity {
        /// The declared entity identifier
        entity: String,
    },

    /// Registry has no manager under the requested name
    #[error("Manager '{name}' is not registered")]
    UnknownManager {
        /// The requested manager name
        name: String,
    },

    /// Entity metadata declares no identifier fields
    #[error("Primary key of entity '{entity}' not found")]
    MissingPrimaryKey {
        /// The entity identifier
        entity: String,
    },

    /// The validated property does not map onto a primary-key field
    #[error("Entity does not have primary key {property}")]
    NotPrimaryKey {
        /// The property under validation
        property: String,
    },

    /// The validated property has no entry in the resolved mapping
    #[error("Property '{property}' is not part of the lookup mapping")]
    UnmappedProperty {
        /// The property under validation
        property: String,
    },

    /// A sibling DTO field required by the mapping is not readable
    #[error("Parameter for key {dto_field}:{entity_field} was not found")]
    MissingParameter {
        /// The DTO field that could not be read
        dto_field: String,
        /// The entity field it was supposed to fill
        entity_field: String,
    },

    /// More than one row matched a key that is supposed to be unique
    #[error("More than one entity {entity} found by key {value}")]
    Ambiguous {
        /// The entity identifier
        entity: String,
        /// The rendered input value
        value: String,
        /// Number of matching rows
        count: u64,
    },

    /// Constraint declaration could not be loaded from configuration
    #[error("Invalid constraint configuration: {0}")]
    Config(#[from] serde_json::Error),

    /// The backing store failed to answer
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl Error {
    /// Returns `true` for errors caused by a misconfigured declaration or
    /// entity metadata, as opposed to store or data-integrity failures.
    #[must_use]
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Self::UnexpectedConstraint { .. }
                | Self::InvalidEntity { .. }
                | Self::UnknownManager { .. }
                | Self::MissingPrimaryKey { .. }
                | Self::NotPrimaryKey { .. }
                | Self::UnmappedProperty { .. }
                | Self::MissingParameter { .. }
                | Self::Config(_)
        )
    }

    /// Get the entity identifier associated with this error (if any)
    #[must_use]
    pub fn entity(&self) -> Option<&str> {
        match self {
            Self::InvalidEntity { entity }
            | Self::MissingPrimaryKey { entity }
            | Self::Ambiguous { entity, .. } => Some(entity),
            Self::Store(err) => Some(&err.entity),
            _ => None,
        }
    }
}

/// Failure reported by a manager or repository implementation
#[derive(Error, Debug)]
#[error("Store error for entity '{entity}': {message}")]
pub struct StoreError {
    /// The entity being queried
    pub entity: String,
    /// Human-readable failure description
    pub message: String,
    /// The underlying driver error
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl StoreError {
    /// Create a store error without an underlying source
    pub fn new(entity: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            entity: entity.into(),
            message: message.into(),
            source: None,
        }
    }

    /// Attach the driver error that caused this failure
    #[must_use]
    pub fn with_source(mut self, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }
}

/// Raised when no row matches and the constraint requested hard failure
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Entity {entity} not found")]
pub struct NotFound {
    entity: String,
}

impl NotFound {
    /// Create the signal for the given entity
    pub fn entity(entity: impl Into<String>) -> Self {
        Self {
            entity: entity.into(),
        }
    }

    /// The entity that was not found
    #[must_use]
    pub fn entity_name(&self) -> &str {
        &self.entity
    }
}
