//! The existence-check validator
//!
//! [`EntityExistsValidator`] turns an [`EntityExists`] declaration and the
//! DTO under validation into one count query:
//!
//! 1. guard the constraint type and the target entity;
//! 2. skip `null` / `""` input;
//! 3. resolve the manager ([`find_manager`](crate::resolver::find_manager));
//! 4. read the entity's primary keys and check the validated property is one
//!    of them (through the inverse of the declared mapping);
//! 5. merge the primary keys with the declared mapping and build criteria,
//!    reading sibling values from the DTO;
//! 6. count matching rows and decide.
//!
//! Exactly one row passes. No row yields a soft violation or, with
//! `exception` set, a hard [`NotFound`]. More than one row means the key is
//! not unique and always fails fatally.

use indexmap::IndexMap;
use tracing::{debug, trace, warn};

use crate::constraint::{Constraint, EntityExists};
use crate::context::ExecutionContext;
use crate::error::{Error, NotFound, Result};
use crate::registry::{ManagerRegistry, ObjectManager};
use crate::resolver;
use crate::value::{self, Criteria, Value};
use crate::violation::ConstraintViolation;

/// Ordered `entity field → DTO field` pairs.
pub type KeyMapping = IndexMap<String, String>;

// ============================================================================
// OUTCOME
// ============================================================================

/// Result of a completed existence check.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// Exactly one row matched, or the input was empty.
    Valid,
    /// No row matched; the violation was recorded on the context.
    SoftInvalid(ConstraintViolation),
    /// No row matched and the constraint requested hard failure.
    HardInvalid(NotFound),
}

impl Outcome {
    /// Returns `true` for [`Outcome::Valid`].
    #[must_use]
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid)
    }

    /// The recorded violation, for soft failures.
    #[must_use]
    pub fn violation(&self) -> Option<&ConstraintViolation> {
        match self {
            Self::SoftInvalid(v) => Some(v),
            _ => None,
        }
    }

    /// Turns a hard failure into `Err` so it can be propagated with `?`.
    ///
    /// Soft failures are `Ok`: their violation already sits on the context.
    pub fn into_result(self) -> std::result::Result<(), NotFound> {
        match self {
            Self::HardInvalid(not_found) => Err(not_found),
            Self::Valid | Self::SoftInvalid(_) => Ok(()),
        }
    }
}

// ============================================================================
// VALIDATOR TRAIT
// ============================================================================

/// A validator for one kind of [`Constraint`].
pub trait ConstraintValidator {
    /// Validates `value` against `constraint` for the context's current
    /// property.
    ///
    /// `Err` is reserved for configuration and data-integrity failures;
    /// ordinary validation failures are reported through [`Outcome`].
    fn validate(
        &self,
        value: &Value,
        constraint: &dyn Constraint,
        ctx: &mut ExecutionContext<'_>,
    ) -> Result<Outcome>;
}

// ============================================================================
// ENTITY EXISTS VALIDATOR
// ============================================================================

/// Checks that the validated value identifies an existing entity.
#[derive(Debug, Clone)]
pub struct EntityExistsValidator<R> {
    registry: R,
}

impl<R: ManagerRegistry> EntityExistsValidator<R> {
    /// Creates a validator backed by `registry`.
    pub fn new(registry: R) -> Self {
        Self { registry }
    }

    /// The injected registry.
    pub fn registry(&self) -> &R {
        &self.registry
    }

    /// Runs the check for an already type-checked declaration.
    pub fn check(
        &self,
        value: &Value,
        constraint: &EntityExists,
        ctx: &mut ExecutionContext<'_>,
    ) -> Result<Outcome> {
        let entity = constraint.entity.as_str();
        if entity.is_empty() || !self.registry.is_known_entity(entity) {
            return Err(Error::InvalidEntity {
                entity: entity.to_string(),
            });
        }

        if value::is_empty(value) {
            trace!(entity, property = ctx.property_name(), "empty input, skipping lookup");
            return Ok(Outcome::Valid);
        }

        let manager = self.find_manager(entity, constraint.persistent_manager.as_deref())?;
        let primary_keys = self.get_primary_keys(entity, manager)?;

        self.entity_has_primary_key(ctx.property_name(), &primary_keys, &constraint.mapping)?;

        let mut mapping = primary_keys;
        mapping.extend(
            constraint
                .mapping
                .iter()
                .map(|(k, v)| (k.clone(), v.clone())),
        );

        let criteria = self.make_criteria(value, &mapping, ctx)?;
        let count = manager.repository(entity)?.count(&criteria)?;
        debug!(entity, ?criteria, count, "entity existence lookup");

        match count {
            0 => Ok(self.throw_violation(constraint, value, &mapping, ctx)),
            1 => Ok(Outcome::Valid),
            _ => {
                let value = value::render(value);
                warn!(entity, %value, count, "more than one row matched a unique key");
                Err(Error::Ambiguous {
                    entity: entity.to_string(),
                    value,
                    count,
                })
            }
        }
    }

    /// Resolves the manager that owns `entity`.
    ///
    /// See [`resolver::find_manager`].
    pub fn find_manager(
        &self,
        entity: &str,
        persistent_manager: Option<&str>,
    ) -> Result<&dyn ObjectManager> {
        resolver::find_manager(&self.registry, entity, persistent_manager)
    }

    /// Primary keys of `entity` as a `pk → pk` mapping.
    ///
    /// Fails with [`Error::MissingPrimaryKey`] when the entity declares none.
    pub fn get_primary_keys(&self, entity: &str, manager: &dyn ObjectManager) -> Result<KeyMapping> {
        let keys = manager.identifier_field_names(entity)?;
        if keys.is_empty() {
            return Err(Error::MissingPrimaryKey {
                entity: entity.to_string(),
            });
        }

        Ok(keys.into_iter().map(|k| (k.clone(), k)).collect())
    }

    /// Checks that `property` maps onto one of `primary_keys`.
    ///
    /// `mapping` is the declared `entity field → DTO field` mapping; when the
    /// property appears on its DTO side, the paired entity field is checked
    /// instead of the property name. Later pairs win over earlier ones.
    pub fn entity_has_primary_key(
        &self,
        property: &str,
        primary_keys: &KeyMapping,
        mapping: &KeyMapping,
    ) -> Result<()> {
        let field = mapping
            .iter()
            .rev()
            .find(|(_, dto_field)| dto_field.as_str() == property)
            .map_or(property, |(entity_field, _)| entity_field.as_str());

        if primary_keys.values().any(|pk| pk == field) {
            Ok(())
        } else {
            Err(Error::NotPrimaryKey {
                property: property.to_string(),
            })
        }
    }

    /// Builds query criteria from the resolved `entity field → DTO field`
    /// mapping.
    ///
    /// The entry for the context's current property takes `value`; every
    /// other entity field takes the value of its DTO field, read through
    /// [`FieldAccess`](crate::FieldAccess).
    pub fn make_criteria(
        &self,
        value: &Value,
        mapping: &KeyMapping,
        ctx: &ExecutionContext<'_>,
    ) -> Result<Criteria> {
        let property = ctx.property_name();
        let inverse: IndexMap<&str, &str> = mapping
            .iter()
            .map(|(entity_field, dto_field)| (dto_field.as_str(), entity_field.as_str()))
            .collect();

        let own_field = inverse
            .get(property)
            .ok_or_else(|| Error::UnmappedProperty {
                property: property.to_string(),
            })?;

        let mut criteria = Criteria::with_capacity(inverse.len());
        criteria.insert((*own_field).to_string(), value.clone());

        for (dto_field, entity_field) in &inverse {
            if *dto_field == property {
                continue;
            }

            let sibling = ctx
                .object()
                .field(dto_field)
                .ok_or_else(|| Error::MissingParameter {
                    dto_field: (*dto_field).to_string(),
                    entity_field: (*entity_field).to_string(),
                })?;
            criteria.insert((*entity_field).to_string(), sibling);
        }

        trace!(property, ?criteria, "criteria built");
        Ok(criteria)
    }

    /// Reports a lookup that matched nothing.
    ///
    /// Returns [`Outcome::HardInvalid`] when the constraint asks for hard
    /// failure; otherwise records one violation on `ctx` with `%entity%`,
    /// `%value%`, and `%parameters%` (the DTO side of `mapping`) filled in.
    pub fn throw_violation(
        &self,
        constraint: &EntityExists,
        value: &Value,
        mapping: &KeyMapping,
        ctx: &mut ExecutionContext<'_>,
    ) -> Outcome {
        if constraint.exception {
            debug!(entity = %constraint.entity, "entity not found, failing hard");
            return Outcome::HardInvalid(constraint.not_found());
        }

        let parameters = mapping
            .values()
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(", ");

        let violation = ctx
            .build_violation(constraint.message.clone())
            .set_parameter("%entity%", constraint.entity.clone())
            .set_parameter("%value%", value::render(value))
            .set_parameter("%parameters%", parameters)
            .set_invalid_value(value.clone())
            .add_violation();

        debug!(entity = %constraint.entity, property = ctx.property_name(), "entity not found");
        Outcome::SoftInvalid(violation)
    }
}

impl<R: ManagerRegistry> ConstraintValidator for EntityExistsValidator<R> {
    fn validate(
        &self,
        value: &Value,
        constraint: &dyn Constraint,
        ctx: &mut ExecutionContext<'_>,
    ) -> Result<Outcome> {
        let constraint =
            constraint
                .downcast_ref::<EntityExists>()
                .ok_or_else(|| Error::UnexpectedConstraint {
                    expected: "EntityExists",
                    actual: constraint.name().to_string(),
                })?;

        self.check(value, constraint, ctx)
    }
}
