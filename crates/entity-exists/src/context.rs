//! Per-call view of the surrounding validation run
//!
//! The pipeline that walks a DTO owns one [`ExecutionContext`] per object.
//! Before each field is validated it points the context at that field with
//! [`ExecutionContext::set_property`]; validators read the current property
//! and the DTO through it and report soft failures into it.

use std::fmt;

use crate::access::FieldAccess;
use crate::value::Value;
use crate::violation::{ConstraintViolation, ConstraintViolationList};

/// Execution context for validating one DTO.
pub struct ExecutionContext<'a> {
    object: &'a dyn FieldAccess,
    property_name: String,
    violations: ConstraintViolationList,
}

impl<'a> ExecutionContext<'a> {
    /// Creates a context for `object` with no current property.
    pub fn new(object: &'a dyn FieldAccess) -> Self {
        Self {
            object,
            property_name: String::new(),
            violations: ConstraintViolationList::new(),
        }
    }

    /// Creates a context already pointed at `property`.
    pub fn for_property(object: &'a dyn FieldAccess, property: impl Into<String>) -> Self {
        let mut ctx = Self::new(object);
        ctx.set_property(property);
        ctx
    }

    /// Moves the context to the next field under validation.
    pub fn set_property(&mut self, property: impl Into<String>) {
        self.property_name = property.into();
    }

    /// Name of the DTO field currently being validated.
    #[must_use]
    pub fn property_name(&self) -> &str {
        &self.property_name
    }

    /// The DTO being validated.
    #[must_use]
    pub fn object(&self) -> &'a dyn FieldAccess {
        self.object
    }

    /// Starts a violation for the current property.
    pub fn build_violation(&mut self, template: impl Into<String>) -> ViolationBuilder<'_, 'a> {
        let violation =
            ConstraintViolation::new(template).with_property_path(self.property_name.clone());
        ViolationBuilder {
            context: self,
            violation,
        }
    }

    /// Violations recorded so far.
    #[must_use]
    pub fn violations(&self) -> &ConstraintViolationList {
        &self.violations
    }

    /// Consumes the context, returning every recorded violation.
    #[must_use]
    pub fn into_violations(self) -> ConstraintViolationList {
        self.violations
    }
}

impl fmt::Debug for ExecutionContext<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExecutionContext")
            .field("object", &"<dto>")
            .field("property_name", &self.property_name)
            .field("violations", &self.violations)
            .finish()
    }
}

/// Fluent builder returned by [`ExecutionContext::build_violation`].
///
/// Nothing is recorded until [`add_violation`](Self::add_violation) runs.
#[must_use = "a violation is only recorded by add_violation()"]
pub struct ViolationBuilder<'c, 'a> {
    context: &'c mut ExecutionContext<'a>,
    violation: ConstraintViolation,
}

impl ViolationBuilder<'_, '_> {
    /// Sets a message placeholder.
    pub fn set_parameter(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.violation = self.violation.with_param(name, value);
        self
    }

    /// Records the submitted value on the violation.
    pub fn set_invalid_value(mut self, value: Value) -> Self {
        self.violation = self.violation.with_invalid_value(value);
        self
    }

    /// Overrides the violation code.
    pub fn set_code(mut self, code: &'static str) -> Self {
        self.violation = self.violation.with_code(code);
        self
    }

    /// Records the violation on the context and returns a copy of it.
    pub fn add_violation(self) -> ConstraintViolation {
        self.context.violations.add(self.violation.clone());
        self.violation
    }
}
