//! Constraint declarations
//!
//! A constraint is plain data describing a rule attached to a DTO field.
//! [`EntityExists`] is the declaration consumed by
//! [`EntityExistsValidator`](crate::EntityExistsValidator).
//!
//! # Mapping direction
//!
//! `mapping` pairs read `entity field → DTO field`: the entity field on the
//! left is matched against the value of the DTO field on the right.
//!
//! ```rust,ignore
//! // Agent has the composite key (user_id, agent_id). The validated DTO
//! // field is `account_id`; `user_id` is read from the DTO field of the
//! // same name.
//! let constraint = EntityExists::new("app::Agent")
//!     .map("agent_id", "account_id")
//!     .with_exception(true);
//!
//! // Transaction is keyed by transaction_id alone; `site_id` narrows the
//! // lookup and is read from the DTO's `user_id`.
//! let constraint = EntityExists::new("app::Transaction")
//!     .map("site_id", "user_id")
//!     .with_manager("global");
//! ```

use std::any::Any;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::{NotFound, Result};

/// A declarative validation rule.
///
/// Validators receive constraints as `&dyn Constraint` and downcast to the
/// concrete declaration they understand.
pub trait Constraint: Any {
    /// Name of the constraint type, used in error reports.
    fn name(&self) -> &'static str;

    /// Upcast for downcasting in validators.
    fn as_any(&self) -> &dyn Any;
}

impl dyn Constraint + '_ {
    /// Returns the concrete declaration if it is a `T`.
    #[must_use]
    pub fn downcast_ref<T: Constraint>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }
}

/// Declares that the value of a DTO field must identify an existing entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EntityExists {
    /// Message template for soft violations.
    ///
    /// Placeholders: `%entity%`, `%value%`, `%parameters%`.
    pub message: String,

    /// Identifier of the entity to look up.
    pub entity: String,

    /// Extra criteria, `entity field → DTO field`.
    pub mapping: IndexMap<String, String>,

    /// Manager to query instead of resolving one from the entity.
    #[serde(alias = "persistentManager")]
    pub persistent_manager: Option<String>,

    /// Produce a hard [`NotFound`] instead of a violation when nothing matches.
    pub exception: bool,
}

impl EntityExists {
    /// Template used when none is configured.
    pub const DEFAULT_MESSAGE: &'static str =
        r#"Entity "%entity%" with parameter "%value%" does not exist."#;

    /// Creates a declaration for `entity` with default settings.
    pub fn new(entity: impl Into<String>) -> Self {
        Self {
            entity: entity.into(),
            ..Self::default()
        }
    }

    /// Loads a declaration from JSON configuration.
    ///
    /// Missing keys take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Adds one `entity field → DTO field` pair.
    #[must_use]
    pub fn map(mut self, entity_field: impl Into<String>, dto_field: impl Into<String>) -> Self {
        self.mapping.insert(entity_field.into(), dto_field.into());
        self
    }

    /// Replaces the whole mapping.
    #[must_use]
    pub fn with_mapping<I, K, V>(mut self, mapping: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.mapping = mapping
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        self
    }

    /// Pins the lookup to a named manager.
    #[must_use]
    pub fn with_manager(mut self, name: impl Into<String>) -> Self {
        self.persistent_manager = Some(name.into());
        self
    }

    /// Chooses hard failure over a soft violation.
    #[must_use]
    pub fn with_exception(mut self, exception: bool) -> Self {
        self.exception = exception;
        self
    }

    /// Overrides the violation message template.
    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// The "not found" signal for this declaration's entity.
    #[must_use]
    pub fn not_found(&self) -> NotFound {
        NotFound::entity(&self.entity)
    }

    /// Always fails with [`NotFound`] for this declaration's entity.
    pub fn throw_exception(&self) -> std::result::Result<(), NotFound> {
        Err(self.not_found())
    }
}

impl Default for EntityExists {
    fn default() -> Self {
        Self {
            message: Self::DEFAULT_MESSAGE.to_string(),
            entity: String::new(),
            mapping: IndexMap::new(),
            persistent_manager: None,
            exception: false,
        }
    }
}

impl Constraint for EntityExists {
    fn name(&self) -> &'static str {
        "EntityExists"
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
