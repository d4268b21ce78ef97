//! Prelude module for convenient imports.
//!
//! ```rust,ignore
//! use entity_exists::prelude::*;
//! ```

pub use crate::access::FieldAccess;
pub use crate::constraint::{Constraint, EntityExists};
pub use crate::context::ExecutionContext;
pub use crate::error::{Error, NotFound};
pub use crate::registry::{ManagerRegistry, ObjectManager, Repository};
pub use crate::validator::{ConstraintValidator, EntityExistsValidator, Outcome};
pub use crate::violation::{ConstraintViolation, ConstraintViolationList};
