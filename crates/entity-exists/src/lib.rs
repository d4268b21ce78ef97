//! # entity-exists
//!
//! Declarative existence check for DTO fields: the value of a field must
//! identify exactly one row of a mapped entity.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use entity_exists::prelude::*;
//! use entity_exists::memory::{MemoryManager, MemoryRegistry, Row};
//! use serde_json::json;
//!
//! let registry = MemoryRegistry::new("default").with_manager(
//!     "default",
//!     MemoryManager::new()
//!         .with_entity("app::User", ["user_id"])
//!         .with_row("app::User", Row::from_iter([("user_id".into(), json!(1))])),
//! );
//! let validator = EntityExistsValidator::new(registry);
//!
//! let dto = json!({ "user_id": 1 });
//! let mut ctx = ExecutionContext::for_property(&dto, "user_id");
//! let outcome = validator.validate(&json!(1), &EntityExists::new("app::User"), &mut ctx)?;
//! assert!(outcome.is_valid());
//! ```
//!
//! ## Building blocks
//!
//! - [`EntityExists`]: the constraint declaration
//! - [`find_manager`]: picks the manager owning an entity
//! - [`EntityExistsValidator`]: builds criteria and runs the count query
//! - [`ManagerRegistry`] / [`ObjectManager`] / [`Repository`]: data-access
//!   seams, with an in-memory implementation in [`memory`]
//! - [`FieldAccess`]: by-name reads of sibling DTO fields

pub mod access;
pub mod constraint;
pub mod context;
pub mod error;
pub mod memory;
pub mod prelude;
pub mod registry;
pub mod resolver;
pub mod validator;
pub mod value;
pub mod violation;

pub use access::FieldAccess;
pub use constraint::{Constraint, EntityExists};
pub use context::{ExecutionContext, ViolationBuilder};
pub use error::{Error, NotFound, Result, StoreError};
pub use registry::{ManagerRegistry, ObjectManager, Repository};
pub use resolver::find_manager;
pub use validator::{ConstraintValidator, EntityExistsValidator, KeyMapping, Outcome};
pub use value::{Criteria, Value};
pub use violation::{ConstraintViolation, ConstraintViolationList};
