//! Integration tests for a full authoring session.

mod helpers;

use etl_compiler::codegen::Dialect;
use etl_compiler::error::{SessionError, StageError, StoreError};
use etl_compiler::graph::{NodeKind, Position};
use etl_compiler::persist::{InMemoryStore, PipelineRecord, PipelineStatus, PipelineStore};
use etl_compiler::reconcile::{DirtyRepresentation, FormField, Mode};
use etl_compiler::session::{AuthoringSession, SaveTrigger};
use etl_compiler::stage::{DeploymentConfig, Stage, StageAction};

use helpers::*;

fn built_session() -> AuthoringSession {
    let mut s = AuthoringSession::new("Orders Nightly");
    let src = s.add_node(NodeKind::Source, "postgresql", Position::new(100.0, 100.0));
    let flt = s.add_node(NodeKind::Transform, "filter", Position::new(350.0, 100.0));
    let dst = s.add_node(NodeKind::Target, "snowflake", Position::new(600.0, 100.0));
    s.add_edge(&src, &flt).unwrap();
    s.add_edge(&flt, &dst).unwrap();
    s.update_node_config(&flt, "condition", "amount > 0").unwrap();
    s
}

#[test]
fn configure_to_complete() {
    let mut s = AuthoringSession::new("Empty");
    assert!(s.available_actions().is_empty());
    assert!(matches!(
        s.apply(StageAction::Generate),
        Err(SessionError::Stage(StageError::NotAvailable { .. }))
    ));

    let mut s = built_session();
    assert_eq!(s.apply(StageAction::Generate).unwrap(), Stage::Building);
    let code = s.generate_code(Dialect::Python);
    assert!(code.content.contains("df_1_filter"));
    s.apply(StageAction::SkipToDeploy).unwrap();

    let deployer = RecordingDeployer::default();
    s.deploy(&deployer, &DeploymentConfig::default()).unwrap();
    assert_eq!(s.stage(), Stage::Complete);
    assert_eq!(s.status(), PipelineStatus::Active);
}

#[test]
fn failed_deploy_keeps_status() {
    let mut s = built_session();
    s.apply(StageAction::Generate).unwrap();
    s.apply(StageAction::SkipToDeploy).unwrap();
    let err = s
        .deploy(&FailingDeployer("no capacity"), &DeploymentConfig::default())
        .unwrap_err();
    assert_eq!(err, SessionError::Stage(StageError::DeployFailed("no capacity".into())));
    assert_eq!(s.stage(), Stage::Deployment);
    assert_eq!(s.status(), PipelineStatus::Draft);
}

#[test]
fn mode_switch_without_edits_changes_nothing() {
    let mut s = built_session();
    s.switch_mode(Mode::Form);
    let graph_before = s.graph().clone();
    let form_before = s.form().clone();
    s.switch_mode(Mode::Visual);
    s.switch_mode(Mode::Form);
    assert_eq!(s.graph(), &graph_before);
    assert_eq!(s.form(), &form_before);
    assert_eq!(s.dirty(), DirtyRepresentation::Unknown);
}

#[test]
fn form_edits_win_over_stale_canvas() {
    let mut s = built_session();
    s.switch_mode(Mode::Form);
    s.update_row(NodeKind::Target, 0, &FormField::Type, "bigquery").unwrap();
    assert_eq!(s.dirty(), DirtyRepresentation::Form);
    assert_eq!(s.canonical_spec().targets[0].component_type, "bigquery");

    let warnings = s.switch_mode(Mode::Visual);
    assert!(warnings.is_empty());
    let target = s.graph().nodes_of_kind(NodeKind::Target).next().unwrap();
    assert_eq!(target.subtype, "bigquery");
    assert_eq!(target.position, Position::new(600.0, 100.0));
    assert_eq!(s.graph().edges().len(), 2);
}

#[test]
fn save_then_update_bumps_version() {
    let mut store = InMemoryStore::new();
    let mut s = built_session();
    assert_eq!(s.save(&mut store, SaveTrigger::Manual).unwrap(), 1);
    let id = s.record_id().unwrap().to_string();

    s.set_description("nightly orders load");
    assert_eq!(s.save(&mut store, SaveTrigger::Auto).unwrap(), 2);
    assert_eq!(s.version(), 2);
    assert_eq!(store.get_all().unwrap().len(), 1);
    assert_eq!(
        store.get_by_id(&id).unwrap().unwrap().description,
        "nightly orders load"
    );
}

#[test]
fn save_against_newer_copy_is_stale() {
    let mut store = InMemoryStore::new();
    let mut s = built_session();
    s.save(&mut store, SaveTrigger::Manual).unwrap();
    let id = s.record_id().unwrap().to_string();

    let other = store.get_by_id(&id).unwrap().unwrap();
    store.update(&id, other).unwrap();

    let err = s.save(&mut store, SaveTrigger::Manual).unwrap_err();
    assert!(matches!(err, SessionError::Store(StoreError::StaleWrite { .. })));
    assert_eq!(s.version(), 1);
}

#[test]
fn failed_first_save_leaves_session_unsaved() {
    let mut s = built_session();
    assert!(s.save(&mut OfflineStore, SaveTrigger::Manual).is_err());
    assert_eq!(s.record_id(), None);
    assert!(!s.is_saving());
}

#[test]
fn form_mode_save_and_reopen() {
    let mut store = InMemoryStore::new();
    let mut s = built_session();
    s.switch_mode(Mode::Form);
    s.add_row(NodeKind::CloudService);
    s.save(&mut store, SaveTrigger::Manual).unwrap();

    let stored = store.get_by_id(s.record_id().unwrap()).unwrap().unwrap();
    assert_eq!(stored.mode, Mode::Form);
    assert!(stored.graph.is_empty());
    assert!(s.to_record().graph.is_empty());

    let record = PipelineRecord::from_json(&stored.to_json().unwrap()).unwrap();
    assert!(record.graph.is_empty());

    let mut reopened = AuthoringSession::open(record);
    assert_eq!(reopened.mode(), Mode::Form);
    assert_eq!(reopened.form().cloud_services.len(), 1);
    reopened.switch_mode(Mode::Visual);
    assert_eq!(reopened.graph().nodes().len(), 4);
    assert_eq!(reopened.graph().edges().len(), 2);
}

#[test]
fn reopened_session_resumes_stage() {
    let record = PipelineRecord::from_json(include_str!("fixtures/form_record.json")).unwrap();
    let mut s = AuthoringSession::open(record);
    assert_eq!(s.stage(), Stage::Building);
    assert_eq!(s.version(), 3);
    let sql = s.generate_code(Dialect::Sql);
    assert!(sql.content.contains("staging.customer_sync"));
    assert!(sql.content.contains("UPDATE staging.customer_sync SET country = upper(country);"));
}
