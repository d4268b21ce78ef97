use std::any::Any;

use entity_exists::memory::{MemoryManager, MemoryRegistry, Row};
use entity_exists::prelude::*;
use pretty_assertions::assert_eq;
use rstest::{fixture, rstest};
use serde_json::{Value, json};

struct NotBlank;

impl Constraint for NotBlank {
    fn name(&self) -> &'static str {
        "NotBlank"
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

fn row(value: Value) -> Row {
    match value {
        Value::Object(map) => map,
        other => panic!("row must be a JSON object, got {other}"),
    }
}

#[fixture]
fn validator() -> EntityExistsValidator<MemoryRegistry> {
    let default = MemoryManager::new()
        .with_entity("app::User", ["user_id"])
        .with_row("app::User", row(json!({ "user_id": 1, "email": "a@example.com" })))
        .with_row("app::User", row(json!({ "user_id": 2, "email": "b@example.com" })))
        .with_entity("app::Agent", ["user_id", "agent_id"])
        .with_row("app::Agent", row(json!({ "user_id": 1, "agent_id": 10 })))
        .with_row("app::Agent", row(json!({ "user_id": 2, "agent_id": 10 })))
        .with_entity("app::Log", std::iter::empty::<&str>())
        .with_entity("app::Coupon", ["code"])
        .with_row("app::Coupon", row(json!({ "code": "SPRING" })))
        .with_row("app::Coupon", row(json!({ "code": "SPRING" })));

    let global = MemoryManager::new()
        .with_namespace("app::Transaction")
        .with_entity("app::Transaction", ["transaction_id"])
        .with_row(
            "app::Transaction",
            row(json!({ "transaction_id": 100, "site_id": 1 })),
        );

    let registry = MemoryRegistry::new("default")
        .with_manager("default", default)
        .with_manager("global", global);

    EntityExistsValidator::new(registry)
}

fn run(
    validator: &EntityExistsValidator<MemoryRegistry>,
    dto: &Value,
    property: &str,
    value: Value,
    constraint: &dyn Constraint,
) -> (Result<Outcome, Error>, ConstraintViolationList) {
    let mut ctx = ExecutionContext::for_property(dto, property);
    let result = validator.validate(&value, constraint, &mut ctx);
    (result, ctx.into_violations())
}

// ============================================================================
// GUARDS
// ============================================================================

#[rstest]
fn test_wrong_constraint_type_fails_before_store_access(
    validator: EntityExistsValidator<MemoryRegistry>,
) {
    let dto = json!({ "user_id": 1 });
    let (result, violations) = run(&validator, &dto, "user_id", json!(""), &NotBlank);

    assert!(matches!(
        result,
        Err(Error::UnexpectedConstraint { expected: "EntityExists", ref actual }) if actual == "NotBlank"
    ));
    assert!(violations.is_empty());
    assert_eq!(validator.registry().query_count(), 0);
}

#[rstest]
#[case::empty_entity("")]
#[case::unknown_entity("app::Ghost")]
fn test_invalid_entity_is_fatal(
    validator: EntityExistsValidator<MemoryRegistry>,
    #[case] entity: &str,
) {
    let dto = json!({});
    let (result, _) = run(&validator, &dto, "user_id", json!(""), &EntityExists::new(entity));

    let err = result.unwrap_err();
    assert!(err.is_configuration());
    assert!(matches!(err, Error::InvalidEntity { .. }));
}

#[rstest]
#[case::null(Value::Null)]
#[case::empty_string(json!(""))]
fn test_empty_input_is_valid_without_query(
    validator: EntityExistsValidator<MemoryRegistry>,
    #[case] value: Value,
) {
    let constraint = EntityExists::new("app::User")
        .with_exception(true)
        .with_manager("global");
    let dto = json!({});
    let (result, violations) = run(&validator, &dto, "user_id", value, &constraint);

    assert_eq!(result.unwrap(), Outcome::Valid);
    assert!(violations.is_empty());
    assert_eq!(validator.registry().query_count(), 0);
}

#[rstest]
fn test_property_must_be_primary_key(validator: EntityExistsValidator<MemoryRegistry>) {
    let dto = json!({ "email": "a@example.com" });
    let (result, _) = run(
        &validator,
        &dto,
        "email",
        json!("a@example.com"),
        &EntityExists::new("app::User"),
    );

    assert!(matches!(result, Err(Error::NotPrimaryKey { ref property }) if property == "email"));
    assert_eq!(validator.registry().query_count(), 0);
}

#[rstest]
fn test_entity_without_primary_key_is_fatal(validator: EntityExistsValidator<MemoryRegistry>) {
    let dto = json!({ "id": 1 });
    let (result, _) = run(&validator, &dto, "id", json!(1), &EntityExists::new("app::Log"));

    assert!(matches!(result, Err(Error::MissingPrimaryKey { ref entity }) if entity == "app::Log"));
}

// ============================================================================
// SINGLE KEY
// ============================================================================

#[rstest]
fn test_existing_row_is_valid(validator: EntityExistsValidator<MemoryRegistry>) {
    let dto = json!({ "user_id": 1 });
    let (result, violations) = run(
        &validator,
        &dto,
        "user_id",
        json!(1),
        &EntityExists::new("app::User"),
    );

    assert_eq!(result.unwrap(), Outcome::Valid);
    assert!(violations.is_empty());
    assert_eq!(validator.registry().query_count(), 1);
}

#[rstest]
fn test_missing_row_records_one_violation(validator: EntityExistsValidator<MemoryRegistry>) {
    let dto = json!({ "user_id": 99 });
    let (result, violations) = run(
        &validator,
        &dto,
        "user_id",
        json!(99),
        &EntityExists::new("app::User"),
    );

    let outcome = result.unwrap();
    let violation = outcome.violation().expect("soft violation");
    assert_eq!(
        violation.message(),
        r#"Entity "app::User" with parameter "99" does not exist."#
    );
    assert_eq!(violation.param("%entity%"), Some("app::User"));
    assert_eq!(violation.param("%value%"), Some("99"));
    assert_eq!(violation.param("%parameters%"), Some("user_id"));
    assert_eq!(violation.property_path.as_deref(), Some("user_id"));
    assert_eq!(violation.invalid_value, json!(99));

    assert_eq!(violations.len(), 1);
    assert_eq!(&violations.violations()[0], violation);
    assert!(outcome.into_result().is_ok());
}

#[rstest]
#[case::parameters_marker("%parameters%")]
#[case::entity_marker("%entity%")]
#[case::value_marker("%value%")]
fn test_submitted_placeholder_is_rendered_literally(
    validator: EntityExistsValidator<MemoryRegistry>,
    #[case] submitted: &str,
) {
    let dto = json!({});
    let (result, _) = run(
        &validator,
        &dto,
        "user_id",
        json!(submitted),
        &EntityExists::new("app::User"),
    );

    let outcome = result.unwrap();
    let violation = outcome.violation().expect("soft violation");
    assert_eq!(
        violation.message(),
        format!(r#"Entity "app::User" with parameter "{submitted}" does not exist."#)
    );
}

#[rstest]
fn test_custom_message_template(validator: EntityExistsValidator<MemoryRegistry>) {
    let constraint = EntityExists::new("app::User")
        .with_message("No %entity% for %value% (keys: %parameters%)");
    let dto = json!({});
    let (result, _) = run(&validator, &dto, "user_id", json!("abc"), &constraint);

    assert_eq!(
        result.unwrap().violation().map(ConstraintViolation::message),
        Some("No app::User for abc (keys: user_id)".to_string())
    );
}

#[rstest]
fn test_missing_row_with_exception_fails_hard(validator: EntityExistsValidator<MemoryRegistry>) {
    let constraint = EntityExists::new("app::User").with_exception(true);
    let dto = json!({ "user_id": 99 });
    let (result, violations) = run(&validator, &dto, "user_id", json!(99), &constraint);

    let outcome = result.unwrap();
    assert_eq!(
        outcome,
        Outcome::HardInvalid(NotFound::entity("app::User"))
    );
    assert!(violations.is_empty());

    let err = outcome.into_result().unwrap_err();
    assert_eq!(err.entity_name(), "app::User");
}

#[rstest]
#[case::soft(false)]
#[case::hard(true)]
fn test_more_than_one_row_is_fatal(
    validator: EntityExistsValidator<MemoryRegistry>,
    #[case] exception: bool,
) {
    let constraint = EntityExists::new("app::Coupon").with_exception(exception);
    let dto = json!({ "code": "SPRING" });
    let (result, violations) = run(&validator, &dto, "code", json!("SPRING"), &constraint);

    match result {
        Err(Error::Ambiguous {
            entity,
            value,
            count,
        }) => {
            assert_eq!(entity, "app::Coupon");
            assert_eq!(value, "SPRING");
            assert_eq!(count, 2);
        }
        other => panic!("expected ambiguous match, got {other:?}"),
    }
    assert!(violations.is_empty());
}

// ============================================================================
// COMPOSITE KEYS AND MAPPING
// ============================================================================

#[rstest]
fn test_composite_key_reads_sibling_field(validator: EntityExistsValidator<MemoryRegistry>) {
    let constraint = EntityExists::new("app::Agent").map("agent_id", "account_id");
    let dto = json!({ "user_id": 2, "account_id": 10 });
    let (result, _) = run(&validator, &dto, "account_id", json!(10), &constraint);

    assert_eq!(result.unwrap(), Outcome::Valid);
}

#[rstest]
fn test_composite_key_miss_lists_dto_fields(validator: EntityExistsValidator<MemoryRegistry>) {
    let constraint = EntityExists::new("app::Agent").map("agent_id", "account_id");
    let dto = json!({ "user_id": 3, "account_id": 10 });
    let (result, _) = run(&validator, &dto, "account_id", json!(10), &constraint);

    let outcome = result.unwrap();
    assert_eq!(
        outcome.violation().and_then(|v| v.param("%parameters%")),
        Some("user_id, account_id")
    );
}

#[rstest]
fn test_composite_key_without_sibling_is_fatal(validator: EntityExistsValidator<MemoryRegistry>) {
    let constraint = EntityExists::new("app::Agent").map("agent_id", "account_id");
    let dto = json!({ "account_id": 10 });
    let (result, _) = run(&validator, &dto, "account_id", json!(10), &constraint);

    match result {
        Err(Error::MissingParameter {
            dto_field,
            entity_field,
        }) => {
            assert_eq!(dto_field, "user_id");
            assert_eq!(entity_field, "user_id");
        }
        other => panic!("expected missing parameter, got {other:?}"),
    }
    assert_eq!(validator.registry().query_count(), 0);
}

// ============================================================================
// MANAGER RESOLUTION
// ============================================================================

#[rstest]
fn test_namespace_owner_is_queried(validator: EntityExistsValidator<MemoryRegistry>) {
    let constraint = EntityExists::new("app::Transaction").map("site_id", "user_id");
    let dto = json!({ "transaction_id": 100, "user_id": 1 });
    let (result, _) = run(&validator, &dto, "transaction_id", json!(100), &constraint);

    assert_eq!(result.unwrap(), Outcome::Valid);

    let registry = validator.registry();
    assert_eq!(registry.get("global").map(MemoryManager::query_count), Some(1));
    assert_eq!(registry.get("default").map(MemoryManager::query_count), Some(0));
}

#[rstest]
fn test_explicit_manager_overrides_namespace(validator: EntityExistsValidator<MemoryRegistry>) {
    let constraint = EntityExists::new("app::Transaction").with_manager("default");
    let dto = json!({ "transaction_id": 100 });
    let (result, _) = run(&validator, &dto, "transaction_id", json!(100), &constraint);

    let err = result.unwrap_err();
    assert!(matches!(err, Error::Store(_)));
    assert!(!err.is_configuration());
}

#[rstest]
fn test_unknown_explicit_manager_is_fatal(validator: EntityExistsValidator<MemoryRegistry>) {
    let constraint = EntityExists::new("app::User").with_manager("shard-9");
    let dto = json!({});
    let (result, _) = run(&validator, &dto, "user_id", json!(1), &constraint);

    assert!(matches!(result, Err(Error::UnknownManager { ref name }) if name == "shard-9"));
}

// ============================================================================
// PIPELINE BEHAVIOUR
// ============================================================================

#[rstest]
fn test_soft_violations_accumulate_across_fields(
    validator: EntityExistsValidator<MemoryRegistry>,
) {
    let dto = json!({ "user_id": 7, "account_id": 42 });
    let mut ctx = ExecutionContext::new(&dto);

    ctx.set_property("user_id");
    let first = validator
        .validate(&json!(7), &EntityExists::new("app::User"), &mut ctx)
        .unwrap();

    ctx.set_property("account_id");
    let second = validator
        .validate(
            &json!(42),
            &EntityExists::new("app::Agent")
                .map("agent_id", "account_id")
                .map("user_id", "user_id"),
            &mut ctx,
        )
        .unwrap();

    assert!(!first.is_valid());
    assert!(!second.is_valid());

    let violations = ctx.into_violations();
    assert_eq!(violations.len(), 2);
    assert_eq!(violations.for_property("user_id").count(), 1);
    assert_eq!(violations.for_property("account_id").count(), 1);
}

#[rstest]
fn test_validator_over_shared_registry(validator: EntityExistsValidator<MemoryRegistry>) {
    let shared = std::sync::Arc::new(
        MemoryRegistry::new("default").with_manager(
            "default",
            MemoryManager::new()
                .with_entity("app::User", ["user_id"])
                .with_row("app::User", row(json!({ "user_id": 5 }))),
        ),
    );
    let by_arc = EntityExistsValidator::new(std::sync::Arc::clone(&shared));
    let by_ref = EntityExistsValidator::new(validator.registry());

    let dto = json!({});
    let mut ctx = ExecutionContext::for_property(&dto, "user_id");
    let constraint = EntityExists::new("app::User");

    assert!(by_arc.validate(&json!(5), &constraint, &mut ctx).unwrap().is_valid());
    assert!(by_ref.validate(&json!(1), &constraint, &mut ctx).unwrap().is_valid());
    assert_eq!(shared.query_count(), 1);
}
