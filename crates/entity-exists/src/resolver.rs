//! Manager resolution
//!
//! Picks the manager that owns an entity in multi-database setups:
//!
//! 1. an explicitly requested manager always wins;
//! 2. otherwise the first non-default manager, in registration order, whose
//!    entity namespaces contain the entity;
//! 3. otherwise the registry's default manager.
//!
//! An entity claimed by both the default and a dedicated manager resolves to
//! the dedicated one. No result is cached; every call rescans the registry.

use tracing::debug;

use crate::error::Result;
use crate::registry::{ManagerRegistry, ObjectManager};

/// Resolves the manager to query for `entity`.
pub fn find_manager<'r, R>(
    registry: &'r R,
    entity: &str,
    persistent_manager: Option<&str>,
) -> Result<&'r dyn ObjectManager>
where
    R: ManagerRegistry + ?Sized,
{
    if let Some(name) = persistent_manager {
        debug!(entity, manager = name, "using explicitly requested manager");
        return registry.manager(name);
    }

    let default_name = registry.default_manager_name();
    for (name, manager) in registry.managers() {
        if name == default_name {
            continue;
        }

        if manager.entity_namespaces().iter().any(|ns| ns == entity) {
            debug!(entity, manager = name, "manager resolved by entity namespace");
            return Ok(manager);
        }
    }

    debug!(entity, manager = default_name, "falling back to default manager");
    registry.default_manager()
}
