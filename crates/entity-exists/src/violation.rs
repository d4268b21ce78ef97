//! Soft validation failures
//!
//! A [`ConstraintViolation`] is the non-fatal record left on the execution
//! context when a lookup finds nothing. Validation of sibling fields keeps
//! running; the caller inspects the collected [`ConstraintViolationList`]
//! once the whole DTO has been checked.

use std::borrow::Cow;
use std::fmt;

use crate::value::{self, Value};

// ============================================================================
// CONSTRAINT VIOLATION
// ============================================================================

/// A structured, non-fatal validation failure attached to a field.
///
/// # Examples
///
/// ```rust,ignore
/// use entity_exists::ConstraintViolation;
///
/// let violation = ConstraintViolation::new("Entity \"%entity%\" does not exist.")
///     .with_param("%entity%", "app::User")
///     .with_property_path("user_id");
///
/// assert_eq!(violation.message(), "Entity \"app::User\" does not exist.");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ConstraintViolation {
    /// Error code for programmatic handling.
    pub code: Cow<'static, str>,

    /// Message template with `%placeholder%` markers.
    pub template: String,

    /// Placeholder values, in the order they were set.
    ///
    /// Example: `[("%entity%", "app::User"), ("%value%", "42")]`
    pub params: Vec<(String, String)>,

    /// Field the violation belongs to.
    pub property_path: Option<String>,

    /// The submitted value that failed the check.
    pub invalid_value: Value,
}

impl ConstraintViolation {
    /// Code used for violations raised by the existence check.
    pub const ENTITY_NOT_FOUND: &'static str = "entity_not_found";

    /// Creates a violation from a message template.
    pub fn new(template: impl Into<String>) -> Self {
        Self {
            code: Cow::Borrowed(Self::ENTITY_NOT_FOUND),
            template: template.into(),
            params: Vec::new(),
            property_path: None,
            invalid_value: Value::Null,
        }
    }

    /// Sets a placeholder value, replacing an earlier value for the same name.
    #[must_use = "builder methods must be chained or built"]
    pub fn with_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let name = name.into();
        let value = value.into();
        if let Some(slot) = self.params.iter_mut().find(|(k, _)| *k == name) {
            slot.1 = value;
        } else {
            self.params.push((name, value));
        }
        self
    }

    /// Sets the field path for this violation.
    #[must_use = "builder methods must be chained or built"]
    pub fn with_property_path(mut self, path: impl Into<String>) -> Self {
        self.property_path = Some(path.into());
        self
    }

    /// Records the submitted value.
    #[must_use = "builder methods must be chained or built"]
    pub fn with_invalid_value(mut self, value: Value) -> Self {
        self.invalid_value = value;
        self
    }

    /// Overrides the error code.
    #[must_use = "builder methods must be chained or built"]
    pub fn with_code(mut self, code: impl Into<Cow<'static, str>>) -> Self {
        self.code = code.into();
        self
    }

    /// Looks up a placeholder value by name.
    #[must_use]
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Renders the template with every placeholder substituted.
    ///
    /// Substitution is a single left-to-right pass. The longest placeholder
    /// matching at a position wins, and substituted text is never scanned
    /// again, so values containing `%name%` markers come out verbatim.
    #[must_use]
    pub fn message(&self) -> String {
        let mut out = String::with_capacity(self.template.len());
        let mut rest = self.template.as_str();

        while let Some(c) = rest.chars().next() {
            let hit = self
                .params
                .iter()
                .filter(|(name, _)| !name.is_empty() && rest.starts_with(name.as_str()))
                .max_by_key(|(name, _)| name.len());

            if let Some((name, value)) = hit {
                out.push_str(value);
                rest = &rest[name.len()..];
            } else {
                out.push(c);
                rest = &rest[c.len_utf8()..];
            }
        }

        out
    }

    /// The submitted value as it appears in messages.
    #[must_use]
    pub fn rendered_value(&self) -> String {
        value::render(&self.invalid_value)
    }
}

impl fmt::Display for ConstraintViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(path) = &self.property_path {
            write!(f, "[{}] {}: {}", path, self.code, self.message())
        } else {
            write!(f, "{}: {}", self.code, self.message())
        }
    }
}

// ============================================================================
// VIOLATION LIST
// ============================================================================

/// Violations collected during one validation run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConstraintViolationList {
    violations: Vec<ConstraintViolation>,
}

impl ConstraintViolationList {
    /// Creates an empty list.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a violation.
    pub fn add(&mut self, violation: ConstraintViolation) {
        self.violations.push(violation);
    }

    /// Returns the number of violations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.violations.len()
    }

    /// Returns true if no violation was recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.violations.is_empty()
    }

    /// Returns all violations.
    #[must_use]
    pub fn violations(&self) -> &[ConstraintViolation] {
        &self.violations
    }

    /// Violations recorded for one field.
    pub fn for_property<'a>(
        &'a self,
        path: &'a str,
    ) -> impl Iterator<Item = &'a ConstraintViolation> + 'a {
        self.violations
            .iter()
            .filter(move |v| v.property_path.as_deref() == Some(path))
    }

    /// Iterates over the violations.
    pub fn iter(&self) -> std::slice::Iter<'_, ConstraintViolation> {
        self.violations.iter()
    }
}

impl<'a> IntoIterator for &'a ConstraintViolationList {
    type Item = &'a ConstraintViolation;
    type IntoIter = std::slice::Iter<'a, ConstraintViolation>;

    fn into_iter(self) -> Self::IntoIter {
        self.violations.iter()
    }
}

impl FromIterator<ConstraintViolation> for ConstraintViolationList {
    fn from_iter<I: IntoIterator<Item = ConstraintViolation>>(iter: I) -> Self {
        Self {
            violations: iter.into_iter().collect(),
        }
    }
}

impl fmt::Display for ConstraintViolationList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Validation failed with {} violation(s):", self.violations.len())?;
        for (i, violation) in self.violations.iter().enumerate() {
            writeln!(f, "  {}. {}", i + 1, violation)?;
        }
        Ok(())
    }
}
