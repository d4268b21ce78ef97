//! In-memory data-access layer
//!
//! A small embedded store implementing [`ManagerRegistry`],
//! [`ObjectManager`], and [`Repository`]. Rows are JSON objects; a row
//! matches when every criteria field is present and equal.
//!
//! ```rust,ignore
//! use entity_exists::memory::{MemoryManager, MemoryRegistry, Row};
//!
//! let mut user = Row::new();
//! user.insert("id".into(), 1.into());
//!
//! let registry = MemoryRegistry::new("default")
//!     .with_manager(
//!         "default",
//!         MemoryManager::new()
//!             .with_entity("app::User", ["id"])
//!             .with_row("app::User", user),
//!     );
//! ```

use std::sync::atomic::{AtomicU64, Ordering};

use indexmap::IndexMap;
use tracing::trace;

use crate::error::{Error, Result, StoreError};
use crate::registry::{ManagerRegistry, ObjectManager, Repository};
use crate::value::{Criteria, Value};

/// One stored row.
pub type Row = serde_json::Map<String, Value>;

// ============================================================================
// REPOSITORY
// ============================================================================

/// Rows and identifier metadata of one entity.
#[derive(Debug, Default)]
pub struct MemoryRepository {
    identifier: Vec<String>,
    rows: Vec<Row>,
    queries: AtomicU64,
}

impl MemoryRepository {
    /// Creates an empty table with the given identifier fields.
    pub fn new<I, S>(identifier: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            identifier: identifier.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
            queries: AtomicU64::new(0),
        }
    }

    /// Appends a row.
    pub fn insert(&mut self, row: Row) {
        self.rows.push(row);
    }

    /// Number of stored rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns true if the table holds no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Number of count queries answered so far.
    #[must_use]
    pub fn query_count(&self) -> u64 {
        self.queries.load(Ordering::Relaxed)
    }
}

impl Repository for MemoryRepository {
    fn count(&self, criteria: &Criteria) -> std::result::Result<u64, StoreError> {
        self.queries.fetch_add(1, Ordering::Relaxed);

        let matched = self
            .rows
            .iter()
            .filter(|row| criteria.iter().all(|(k, v)| row.get(k) == Some(v)))
            .count() as u64;

        trace!(?criteria, matched, "memory repository count");
        Ok(matched)
    }
}

// ============================================================================
// MANAGER
// ============================================================================

/// A set of tables plus the entity namespaces this manager owns.
#[derive(Debug, Default)]
pub struct MemoryManager {
    namespaces: Vec<String>,
    tables: IndexMap<String, MemoryRepository>,
}

impl MemoryManager {
    /// Creates a manager with no tables and no namespaces.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares `entity` as owned by this manager.
    #[must_use]
    pub fn with_namespace(mut self, entity: impl Into<String>) -> Self {
        let entity = entity.into();
        if !self.namespaces.contains(&entity) {
            self.namespaces.push(entity);
        }
        self
    }

    /// Registers a table for `entity` with the given identifier fields.
    ///
    /// Re-registering replaces the table.
    #[must_use]
    pub fn with_entity<I, S>(mut self, entity: impl Into<String>, identifier: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tables
            .insert(entity.into(), MemoryRepository::new(identifier));
        self
    }

    /// Appends a row to `entity`, creating a table without identifier
    /// fields if none is registered.
    #[must_use]
    pub fn with_row(mut self, entity: impl Into<String>, row: Row) -> Self {
        self.insert(entity, row);
        self
    }

    /// Appends a row to `entity`.
    pub fn insert(&mut self, entity: impl Into<String>, row: Row) {
        self.tables.entry(entity.into()).or_default().insert(row);
    }

    /// Table for `entity`, if registered.
    #[must_use]
    pub fn table(&self, entity: &str) -> Option<&MemoryRepository> {
        self.tables.get(entity)
    }

    /// Count queries answered by all tables of this manager.
    #[must_use]
    pub fn query_count(&self) -> u64 {
        self.tables.values().map(MemoryRepository::query_count).sum()
    }

    fn table_or_err(&self, entity: &str) -> std::result::Result<&MemoryRepository, StoreError> {
        self.tables
            .get(entity)
            .ok_or_else(|| StoreError::new(entity, "no mapping metadata registered"))
    }
}

impl ObjectManager for MemoryManager {
    fn entity_namespaces(&self) -> Vec<String> {
        self.namespaces.clone()
    }

    fn has_metadata_for(&self, entity: &str) -> bool {
        self.tables.contains_key(entity)
    }

    fn identifier_field_names(&self, entity: &str) -> std::result::Result<Vec<String>, StoreError> {
        Ok(self.table_or_err(entity)?.identifier.clone())
    }

    fn repository(&self, entity: &str) -> std::result::Result<&dyn Repository, StoreError> {
        let table: &dyn Repository = self.table_or_err(entity)?;
        Ok(table)
    }
}

// ============================================================================
// REGISTRY
// ============================================================================

/// Named managers in registration order plus a default name.
#[derive(Debug)]
pub struct MemoryRegistry {
    default_name: String,
    managers: IndexMap<String, MemoryManager>,
}

impl MemoryRegistry {
    /// Creates an empty registry whose default manager is `default_name`.
    pub fn new(default_name: impl Into<String>) -> Self {
        Self {
            default_name: default_name.into(),
            managers: IndexMap::new(),
        }
    }

    /// Registers a manager. Re-registering a name replaces the manager but
    /// keeps its original position.
    #[must_use]
    pub fn with_manager(mut self, name: impl Into<String>, manager: MemoryManager) -> Self {
        self.managers.insert(name.into(), manager);
        self
    }

    /// A registered manager.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&MemoryManager> {
        self.managers.get(name)
    }

    /// Mutable access to a registered manager.
    pub fn manager_mut(&mut self, name: &str) -> Option<&mut MemoryManager> {
        self.managers.get_mut(name)
    }

    /// Count queries answered across every manager.
    #[must_use]
    pub fn query_count(&self) -> u64 {
        self.managers.values().map(MemoryManager::query_count).sum()
    }
}

impl ManagerRegistry for MemoryRegistry {
    fn default_manager_name(&self) -> &str {
        &self.default_name
    }

    fn manager(&self, name: &str) -> Result<&dyn ObjectManager> {
        self.managers
            .get(name)
            .map(|m| m as &dyn ObjectManager)
            .ok_or_else(|| Error::UnknownManager {
                name: name.to_string(),
            })
    }

    fn managers(&self) -> Vec<(&str, &dyn ObjectManager)> {
        self.managers
            .iter()
            .map(|(name, m)| (name.as_str(), m as &dyn ObjectManager))
            .collect()
    }
}
