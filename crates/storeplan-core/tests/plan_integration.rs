//! Integration tests for migration plans.

use serde_json::json;
use storeplan_core::catalog::{evaluate, evaluate_multi_entry, resolve, KeyPath, Shape};
use storeplan_core::migration::{Action, MigrationPlan, OperationKind, Transform};
use storeplan_core::proto::Key;
use storeplan_core::{
    IndexDef, KeyViolation, MigrationError, NameKind, PlanConfig, SameNameRename, SchemaError,
    StoreDef,
};
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn users_shape() -> Shape {
    Shape::object()
        .with_field("id", Shape::String)
        .with_field("email", Shape::String)
        .build()
}

fn users_plan() -> MigrationPlan {
    MigrationPlan::new()
        .version(1, |v| {
            v.create_store(StoreDef::new("users", users_shape()).with_key_path("id"))?;
            Ok(())
        })
        .unwrap()
}

#[test]
fn test_users_scenario() {
    init_tracing();

    let plan = users_plan()
        .version(2, |v| {
            v.create_index("users", IndexDef::new("byEmail", "email"))?;
            Ok(())
        })
        .unwrap()
        .version(3, |v| {
            v.delete_index("users", "byEmail")?;
            Ok(())
        })
        .unwrap()
        .version(4, |v| {
            v.create_index("users", IndexDef::new("byEmail", "id"))?;
            Ok(())
        })
        .unwrap();

    assert_eq!(plan.steps().len(), 4);
    assert_eq!(plan.latest_version(), Some(4));

    let users = plan.model().get_store("users").unwrap();
    assert_eq!(users.index_names(), vec!["byEmail"]);
    assert_eq!(users.get_index("byEmail").unwrap().key_path, KeyPath::from("id"));

    let kinds: Vec<_> = plan
        .steps()
        .iter()
        .flat_map(|step| step.actions.iter().map(|a| a.description()))
        .collect();
    assert_eq!(
        kinds,
        vec![
            "Create store 'users'",
            "Create index 'users.byEmail'",
            "Delete index 'users.byEmail'",
            "Create index 'users.byEmail'",
        ]
    );
}

#[test]
fn test_version_monotonicity() {
    let mut plan = users_plan();

    for attempted in [1, 0, -5] {
        assert_eq!(
            plan.add_version(attempted, |_| Ok(())).unwrap_err(),
            MigrationError::VersionOrder {
                previous: 1,
                attempted
            }
        );
    }

    plan.add_version(2, |_| Ok(())).unwrap();
    plan.add_version(1_000, |_| Ok(())).unwrap();
    plan.add_version(i64::MAX, |_| Ok(())).unwrap();
    assert_eq!(plan.latest_version(), Some(i64::MAX));
}

#[test]
fn test_name_lifecycle() {
    let mut plan = users_plan();

    plan.add_version(2, |v| {
        v.delete_store("users")?;
        Ok(())
    })
    .unwrap();
    plan.add_version(3, |v| {
        v.create_store(StoreDef::new("users", Shape::String))?;
        Ok(())
    })
    .unwrap();

    let err = plan
        .add_version(4, |v| {
            v.create_store(StoreDef::new("users", Shape::String))?;
            Ok(())
        })
        .unwrap_err();
    assert!(matches!(
        err.schema_error(),
        Some(SchemaError::DuplicateName {
            kind: NameKind::Store,
            ..
        })
    ));

    let err = plan
        .add_version(4, |v| {
            v.delete_store("users")?.delete_store("users")?;
            Ok(())
        })
        .unwrap_err();
    assert!(matches!(
        err,
        MigrationError::Rejected {
            index: 1,
            operation: Some(OperationKind::DeleteStore),
            source: SchemaError::UnknownName { .. },
            ..
        }
    ));
}

#[test]
fn test_name_reusable_within_version() {
    let plan = users_plan()
        .version(2, |v| {
            v.delete_store("users")?
                .create_store(StoreDef::new("users", Shape::Number))?;
            Ok(())
        })
        .unwrap();

    let users = plan.model().get_store("users").unwrap();
    assert_eq!(users.shape, Shape::Number);
    assert!(users.key_path.is_none());
}

#[test]
fn test_key_path_resolution() {
    let nested = Shape::object()
        .with_field(
            "a",
            Shape::object()
                .with_field("b", Shape::object().with_field("c", Shape::Number).build())
                .build(),
        )
        .build();
    assert_eq!(
        resolve(&nested, &"a.b.c".into()).unwrap().to_string(),
        "number"
    );

    let flat = Shape::object().with_field("a", Shape::String).build();
    assert!(resolve(&flat, &"a.x".into()).is_none());

    let mixed = Shape::object()
        .with_field("a", Shape::String)
        .with_field("b", Shape::object().with_field("c", Shape::Number).build())
        .build();
    assert_eq!(
        resolve(&mixed, &["a", "b.c"].into()).unwrap().to_string(),
        "[string, number]"
    );
}

#[test]
fn test_auto_increment() {
    let numeric = MigrationPlan::new().version(1, |v| {
        v.create_store(
            StoreDef::new("items", Shape::object().with_field("id", Shape::Number))
                .with_key_path("id")
                .with_auto_increment(),
        )?;
        Ok(())
    });
    assert!(numeric.is_ok());

    let text = MigrationPlan::new()
        .version(1, |v| {
            v.create_store(
                StoreDef::new("items", Shape::object().with_field("id", Shape::String))
                    .with_key_path("id")
                    .with_auto_increment(),
            )?;
            Ok(())
        })
        .unwrap_err();
    assert!(matches!(
        text.schema_error(),
        Some(SchemaError::AutoIncrementConstraint { .. })
    ));

    let composite = MigrationPlan::new()
        .version(1, |v| {
            v.create_store(
                StoreDef::new(
                    "items",
                    Shape::object()
                        .with_field("a", Shape::Number)
                        .with_field("b", Shape::Number),
                )
                .with_key_path(["a", "b"])
                .with_auto_increment(),
            )?;
            Ok(())
        })
        .unwrap_err();
    assert!(matches!(
        composite.schema_error(),
        Some(SchemaError::AutoIncrementConstraint {
            violation: KeyViolation::CompositeAutoIncrement,
            ..
        })
    ));
}

fn tags_plan(tags: Shape, path: impl Into<KeyPath>) -> Result<MigrationPlan, MigrationError> {
    let path = path.into();
    MigrationPlan::new().version(1, |v| {
        v.create_store(StoreDef::new(
            "posts",
            Shape::object()
                .with_field("tags", tags)
                .with_field("title", Shape::String),
        ))?
        .create_index("posts", IndexDef::new("byTag", path).with_multi_entry())?;
        Ok(())
    })
}

#[test]
fn test_multi_entry() {
    assert!(tags_plan(Shape::array(Shape::String), "tags").is_ok());
    assert!(tags_plan(Shape::String, "tags").is_ok());

    let err = tags_plan(Shape::array(Shape::object().build()), "tags").unwrap_err();
    assert!(matches!(
        err.schema_error(),
        Some(SchemaError::MultiEntryConstraint {
            violation: KeyViolation::InvalidElements { .. },
            ..
        })
    ));

    let err = tags_plan(Shape::array(Shape::String), ["tags", "title"]).unwrap_err();
    assert!(matches!(
        err.schema_error(),
        Some(SchemaError::MultiEntryConstraint {
            violation: KeyViolation::CompositeMultiEntry,
            ..
        })
    ));
}

#[test]
fn test_transform_invalidates_empty_key_path() {
    let mut plan = MigrationPlan::new()
        .version(1, |v| {
            v.create_store(StoreDef::new("names", Shape::String).with_key_path(""))?;
            Ok(())
        })
        .unwrap();
    let before = plan.model().clone();

    let err = plan
        .add_version(2, |v| {
            v.transform_store(
                "names",
                Transform::new(
                    Shape::object().with_field("address", Shape::String),
                    |value| json!({ "address": value }),
                ),
            )?;
            Ok(())
        })
        .unwrap_err();

    assert!(matches!(
        err,
        MigrationError::Rejected {
            version: 2,
            operation: Some(OperationKind::TransformStore),
            source: SchemaError::TransformInvalidatesKey { .. },
            ..
        }
    ));
    assert_eq!(plan.model(), &before);
    assert_eq!(plan.steps().len(), 1);
}

#[test]
fn test_rejection_leaves_model_identical() {
    let mut plan = users_plan();
    let before = plan.model().clone();

    let err = plan
        .add_version(2, |v| {
            v.create_index("users", IndexDef::new("byEmail", "email"))?
                .rename_store("users", "people")?
                .create_index("people", IndexDef::new("byName", "name"))?;
            Ok(())
        })
        .unwrap_err();

    assert!(matches!(
        err,
        MigrationError::Rejected {
            index: 2,
            operation: Some(OperationKind::CreateIndex),
            source: SchemaError::InvalidKeyPath {
                violation: KeyViolation::Unresolvable,
                ..
            },
            ..
        }
    ));
    assert_eq!(plan.model(), &before);
    assert_eq!(plan.action_count(), 1);
}

#[test]
fn test_swap_rename() {
    let plan = MigrationPlan::new()
        .version(1, |v| {
            v.create_store(StoreDef::new("a", Shape::String))?
                .create_store(StoreDef::new("b", Shape::Number))?;
            Ok(())
        })
        .unwrap()
        .version(2, |v| {
            v.rename_store("a", "tmp")?
                .rename_store("b", "a")?
                .rename_store("tmp", "b")?;
            Ok(())
        })
        .unwrap();

    assert_eq!(plan.model().get_store("a").unwrap().shape, Shape::Number);
    assert_eq!(plan.model().get_store("b").unwrap().shape, Shape::String);
    assert!(!plan.model().contains_store("tmp"));
    assert_eq!(plan.steps()[1].actions.len(), 3);
}

#[test]
fn test_same_name_rename_policy() {
    let plan = users_plan()
        .version(2, |v| {
            v.rename_store("users", "users")?;
            Ok(())
        })
        .unwrap();
    assert!(plan.steps()[1].is_empty());

    let strict = MigrationPlan::with_config(
        PlanConfig::new().with_same_name_rename(SameNameRename::Reject),
    )
    .version(1, |v| {
        v.create_store(StoreDef::new("users", Shape::String))?
            .rename_store("users", "users")?;
        Ok(())
    })
    .unwrap_err();
    assert!(matches!(
        strict.schema_error(),
        Some(SchemaError::DuplicateName { .. })
    ));
}

#[test]
fn test_step_aborted_after_failure() {
    let mut plan = MigrationPlan::new();
    let mut aborted = None;

    let err = plan
        .add_version(1, |v| {
            if v.delete_store("ghosts").is_err() {
                aborted = v.create_store(StoreDef::new("users", Shape::String)).err();
            }
            Ok(())
        })
        .unwrap_err();

    assert_eq!(aborted, Some(SchemaError::StepAborted { version: 1 }));
    assert!(matches!(err, MigrationError::Rejected { index: 0, .. }));
    assert!(plan.is_empty());
}

#[test]
fn test_update_schema_cannot_make_primary_key_optional() {
    let mut plan = users_plan();

    let err = plan
        .add_version(2, |v| {
            v.update_schema("users", Shape::object().with_optional("id", Shape::String))?;
            Ok(())
        })
        .unwrap_err();
    assert!(matches!(
        err.schema_error(),
        Some(SchemaError::TransformInvalidatesKey {
            violation: KeyViolation::Optional { .. },
            ..
        })
    ));

    plan.add_version(2, |v| {
        v.update_schema("users", Shape::object().with_optional("nickname", Shape::String))?;
        Ok(())
    })
    .unwrap();
    assert!(plan.steps()[1].is_empty());
}

#[test]
fn test_update_schema_keeps_auto_increment_key_required() {
    let mut plan = MigrationPlan::new()
        .version(1, |v| {
            v.create_store(
                StoreDef::new("items", Shape::object().with_field("id", Shape::Number))
                    .with_key_path("id")
                    .with_auto_increment(),
            )?;
            Ok(())
        })
        .unwrap();
    let before = plan.model().clone();

    let err = plan
        .add_version(2, |v| {
            v.update_schema("items", Shape::object().with_optional("id", Shape::Number))?;
            Ok(())
        })
        .unwrap_err();
    assert!(matches!(
        err,
        MigrationError::Rejected {
            operation: Some(OperationKind::UpdateSchema),
            source: SchemaError::TransformInvalidatesKey {
                violation: KeyViolation::Optional { .. },
                ..
            },
            ..
        }
    ));
    assert_eq!(plan.model(), &before);
    assert_eq!(plan.latest_version(), Some(1));
}

#[test]
fn test_pending_steps_and_replay() {
    let plan = users_plan()
        .version(2, |v| {
            v.create_index("users", IndexDef::new("byEmail", "email").with_unique())?;
            Ok(())
        })
        .unwrap()
        .version(5, |v| {
            v.create_store(StoreDef::new("log", Shape::String).with_auto_increment())?
                .rename_index("users", "byEmail", "email")?;
            Ok(())
        })
        .unwrap();

    let pending: Vec<i64> = plan.pending_steps(Some(1)).iter().map(|s| s.version).collect();
    assert_eq!(pending, vec![2, 5]);
    assert_eq!(plan.pending_steps(None).len(), 3);
    assert!(plan.pending_steps(Some(5)).is_empty());

    assert_eq!(plan.replay_layout().unwrap(), plan.model().layout());

    let mut layout = storeplan_core::SchemaLayout::default();
    storeplan_core::migration::replay(&plan.steps()[..1], &mut layout).unwrap();
    storeplan_core::migration::replay(plan.pending_steps(Some(1)), &mut layout).unwrap();
    assert_eq!(layout, plan.model().layout());
}

#[test]
fn test_actions_feed_an_executor() {
    let plan = users_plan()
        .version(2, |v| {
            v.update_schema("users", Shape::object().with_field("tags", Shape::array(Shape::String)))?
                .create_index("users", IndexDef::new("byTag", "tags").with_multi_entry())?
                .transform_store(
                    "users",
                    Transform::new(
                        Shape::object()
                            .with_field("id", Shape::String)
                            .with_field("email", Shape::String)
                            .with_field("tags", Shape::array(Shape::String)),
                        |mut record| {
                            record["tags"] = json!(["new", "new"]);
                            record
                        },
                    ),
                )?;
            Ok(())
        })
        .unwrap();

    let mut record = json!({ "id": "u1", "email": "a@example.com" });
    for action in &plan.steps()[1].actions {
        if let Action::TransformStore { transform, .. } = action {
            record = transform.apply(record);
        }
    }

    assert_eq!(evaluate(&record, &"id".into()), Some(Key::from("u1")));
    assert_eq!(evaluate_multi_entry(&record, "tags"), vec![Key::from("new")]);

    let dump = serde_json::to_value(plan.steps()).unwrap();
    assert_eq!(dump[1]["actions"][0]["kind"], "create-index");
    assert_eq!(dump[1]["actions"][1]["kind"], "transform-store");
}

#[test]
fn test_plan_is_shareable() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<MigrationPlan>();
    assert_send_sync::<Action>();
}
