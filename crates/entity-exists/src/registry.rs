//! Data-access seams
//!
//! The existence check does not talk to a database directly. It needs three
//! things from the mapping layer, each behind a trait:
//!
//! - [`ManagerRegistry`]: named managers plus a designated default
//! - [`ObjectManager`]: entity metadata and repositories for one connection
//! - [`Repository`]: counting rows of one entity by criteria
//!
//! [`memory`](crate::memory) provides an in-process implementation.

use crate::error::{Result, StoreError};
use crate::value::Criteria;

/// Counts rows of a single entity.
pub trait Repository {
    /// Number of rows whose fields equal every entry of `criteria`.
    fn count(&self, criteria: &Criteria) -> std::result::Result<u64, StoreError>;
}

/// A bound connection responsible for the entities of some namespaces.
pub trait ObjectManager {
    /// Entity identifiers this manager is configured to own.
    fn entity_namespaces(&self) -> Vec<String>;

    /// Whether mapping metadata exists for `entity`.
    fn has_metadata_for(&self, entity: &str) -> bool;

    /// Identifier (primary-key) field names of `entity`, in declaration order.
    fn identifier_field_names(&self, entity: &str) -> std::result::Result<Vec<String>, StoreError>;

    /// Repository for `entity`.
    fn repository(&self, entity: &str) -> std::result::Result<&dyn Repository, StoreError>;
}

/// Directory of named managers.
///
/// Implementations must enumerate managers in a stable order; manager
/// resolution picks the first namespace owner in that order.
pub trait ManagerRegistry {
    /// Name of the default manager.
    fn default_manager_name(&self) -> &str;

    /// Manager registered under `name`.
    ///
    /// Fails with [`Error::UnknownManager`](crate::Error::UnknownManager)
    /// for unregistered names.
    fn manager(&self, name: &str) -> Result<&dyn ObjectManager>;

    /// Every registered manager with its name, in registration order.
    fn managers(&self) -> Vec<(&str, &dyn ObjectManager)>;

    /// The default manager.
    fn default_manager(&self) -> Result<&dyn ObjectManager> {
        self.manager(self.default_manager_name())
    }

    /// Whether any registered manager has metadata for `entity`.
    fn is_known_entity(&self, entity: &str) -> bool {
        self.managers()
            .into_iter()
            .any(|(_, manager)| manager.has_metadata_for(entity))
    }
}

impl<T: ManagerRegistry + ?Sized> ManagerRegistry for &T {
    fn default_manager_name(&self) -> &str {
        (**self).default_manager_name()
    }

    fn manager(&self, name: &str) -> Result<&dyn ObjectManager> {
        (**self).manager(name)
    }

    fn managers(&self) -> Vec<(&str, &dyn ObjectManager)> {
        (**self).managers()
    }

    fn is_known_entity(&self, entity: &str) -> bool {
        (**self).is_known_entity(entity)
    }
}

impl<T: ManagerRegistry + ?Sized> ManagerRegistry for std::sync::Arc<T> {
    fn default_manager_name(&self) -> &str {
        (**self).default_manager_name()
    }

    fn manager(&self, name: &str) -> Result<&dyn ObjectManager> {
        (**self).manager(name)
    }

    fn managers(&self) -> Vec<(&str, &dyn ObjectManager)> {
        (**self).managers()
    }

    fn is_known_entity(&self, entity: &str) -> bool {
        (**self).is_known_entity(entity)
    }
}
