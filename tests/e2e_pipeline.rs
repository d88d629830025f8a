//! End-to-end: canvas JSON → validate → canonical spec → stage → codegen → DAG → store.

mod helpers;

use chrono::NaiveDate;
use etl_compiler::codegen::{self, Dialect, GenerationRequest};
use etl_compiler::parse;
use etl_compiler::persist::{InMemoryStore, PipelineStore};
use etl_compiler::reconcile::{self, Mode};
use etl_compiler::session::{AuthoringSession, SaveTrigger};
use etl_compiler::stage::{Stage, StageAction, StageController};
use etl_compiler::validate;

use helpers::*;

#[test]
fn end_to_end_demo_pipeline() {
    let graph = parse::parse_and_build(DEMO_PIPELINE).unwrap();
    assert!(validate::validate_graph(&graph).is_empty());

    let spec = reconcile::from_graph(&graph);
    assert!(validate::validate_spec(&spec).is_empty());

    let mut stage = StageController::new();
    stage.apply(StageAction::Generate, &spec).unwrap();
    assert_eq!(stage.stage(), Stage::Building);

    for dialect in Dialect::ALL {
        let code = codegen::generate(&GenerationRequest::from_spec(&spec, "Orders Nightly", dialect));
        assert!(code.content.contains("postgresql"));
        assert!(code.content.contains("snowflake"));
    }

    let date = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
    let yaml = codegen::airflow_dag_yaml_at(&graph, "Orders Nightly", date).unwrap();
    let dag: serde_yaml::Value = serde_yaml::from_str(&yaml).unwrap();
    assert_eq!(dag["dag_id"], "orders_nightly");
    let tasks = dag["tasks"].as_sequence().unwrap();
    let task = |id: &str| tasks.iter().find(|t| t["task_id"] == id).unwrap();
    assert_eq!(task("tgt-1")["operator"], "BaseOperator");
    assert_eq!(task("tgt-1")["depends_on"][0], "tf-2");
    assert_eq!(task("svc-1")["operator"], "GlueJobOperator");
    assert!(task("svc-1")["depends_on"].is_null());
}

#[test]
fn session_round_trip_through_store() {
    let graph = parse::parse_and_build(DEMO_PIPELINE).unwrap();
    let mut store = InMemoryStore::new();

    let mut record = etl_compiler::persist::PipelineRecord::draft("Orders Nightly");
    record.spec = reconcile::from_graph(&graph);
    record.graph = graph;
    let id = store.create(record).unwrap();

    let mut session = AuthoringSession::open(store.get_by_id(&id).unwrap().unwrap());
    assert_eq!(session.mode(), Mode::Visual);
    session.apply(StageAction::Generate).unwrap();
    session.rename_node("tf-1", "Paid orders").unwrap();
    assert_eq!(session.save(&mut store, SaveTrigger::Manual).unwrap(), 2);

    let stored = store.get_by_id(&id).unwrap().unwrap();
    assert_eq!(stored.stage, Stage::Building);
    assert_eq!(stored.graph.node("tf-1").unwrap().label, "Paid orders");
    assert!(stored.spec.transformations.iter().any(|c| c.label == "Paid orders"));
}
