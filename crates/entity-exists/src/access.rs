//! Read access to sibling DTO fields
//!
//! Composite-key lookups need values from DTO fields other than the one
//! being validated. [`FieldAccess`] is the capability a DTO exposes for that:
//! a by-name read that returns `None` when the DTO has no such field.
//!
//! # Examples
//!
//! ```rust,ignore
//! use entity_exists::{field_access, FieldAccess};
//!
//! struct AssignAgent {
//!     user_id: i64,
//!     account_id: i64,
//!     note: Option<String>,
//! }
//!
//! field_access!(AssignAgent { user_id, account_id, note });
//!
//! let dto = AssignAgent { user_id: 7, account_id: 11, note: None };
//! assert_eq!(dto.field("user_id"), Some(7.into()));
//! assert_eq!(dto.field("missing"), None);
//! ```

use std::collections::HashMap;
use std::hash::BuildHasher;

use indexmap::IndexMap;

use crate::value::Value;

/// By-name read access to the fields of a DTO.
pub trait FieldAccess {
    /// Returns the value of `name`, or `None` if the DTO has no such field.
    fn field(&self, name: &str) -> Option<Value>;
}

impl<T: FieldAccess + ?Sized> FieldAccess for &T {
    fn field(&self, name: &str) -> Option<Value> {
        (**self).field(name)
    }
}

impl FieldAccess for serde_json::Map<String, Value> {
    fn field(&self, name: &str) -> Option<Value> {
        self.get(name).cloned()
    }
}

/// Only JSON objects have fields; every other variant reads as empty.
impl FieldAccess for Value {
    fn field(&self, name: &str) -> Option<Value> {
        self.as_object().and_then(|map| map.field(name))
    }
}

impl<S: BuildHasher> FieldAccess for HashMap<String, Value, S> {
    fn field(&self, name: &str) -> Option<Value> {
        self.get(name).cloned()
    }
}

impl<S: BuildHasher> FieldAccess for IndexMap<String, Value, S> {
    fn field(&self, name: &str) -> Option<Value> {
        self.get(name).cloned()
    }
}

/// Implements [`FieldAccess`] for a struct by listing its readable fields.
///
/// Each listed field must be `Clone` and convert into
/// [`serde_json::Value`]. Fields are exposed under their Rust name, or under
/// an explicit name with the `"name" => field` form.
///
/// ```rust,ignore
/// field_access!(Transfer { transaction_id, user_id });
/// field_access!(LegacyDto { "userId" => user_id, "siteId" => site_id });
/// ```
#[macro_export]
macro_rules! field_access {
    ($ty:ty { $($name:literal => $field:ident),+ $(,)? }) => {
        impl $crate::FieldAccess for $ty {
            fn field(&self, name: &str) -> ::core::option::Option<$crate::Value> {
                match name {
                    $($name => ::core::option::Option::Some(
                        $crate::Value::from(::core::clone::Clone::clone(&self.$field)),
                    ),)+
                    _ => ::core::option::Option::None,
                }
            }
        }
    };
    ($ty:ty { $($field:ident),+ $(,)? }) => {
        impl $crate::FieldAccess for $ty {
            fn field(&self, name: &str) -> ::core::option::Option<$crate::Value> {
                match name {
                    $(::core::stringify!($field) => ::core::option::Option::Some(
                        $crate::Value::from(::core::clone::Clone::clone(&self.$field)),
                    ),)+
                    _ => ::core::option::Option::None,
                }
            }
        }
    };
}
