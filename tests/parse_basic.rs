//! Integration tests for the Parse phase: canvas JSON parsing, round-trips, graph building.

mod helpers;

use etl_compiler::graph::NodeKind;
use etl_compiler::parse::{self, WireNode};

use helpers::*;

#[test]
fn parse_demo_pipeline() {
    let data = parse::parse(DEMO_PIPELINE).expect("Should parse successfully");
    assert_eq!(data.nodes.len(), 5);
    assert_eq!(data.edges.len(), 3);
    assert!(matches!(data.nodes[4], WireNode::CloudService(_)));
}

#[test]
fn build_keeps_ids_and_creation_order() {
    let graph = demo_graph();
    let ids: Vec<&str> = graph.nodes().iter().map(|n| n.id.as_str()).collect();
    assert_eq!(ids, ["src-1", "tf-2", "tf-1", "tgt-1", "svc-1"]);
    assert_eq!(graph.node("tf-1").unwrap().kind, NodeKind::Transform);
    assert_eq!(graph.node("tf-1").unwrap().subtype, "filter");
}

#[test]
fn non_string_config_values_become_text() {
    let graph = demo_graph();
    let src = graph.node("src-1").unwrap();
    assert_eq!(src.config.get("port").map(String::as_str), Some("5432"));
    assert_eq!(src.config.get("table").map(String::as_str), Some("orders"));
}

#[test]
fn parse_invalid_json_returns_error() {
    let result = parse::parse("not valid json");
    assert!(result.is_err());
    let errors = result.unwrap_err();
    assert!(errors[0].code == "P001");
}

#[test]
fn unknown_node_type_is_a_parse_error() {
    let json = r#"{"nodes":[{"id":"n","type":"sink","position":{"x":0,"y":0},"data":{}}],"edges":[]}"#;
    let errors = parse::parse(json).unwrap_err();
    assert_eq!(codes(&errors), ["P001"]);
}

#[test]
fn illegal_edges_are_reported_per_edge() {
    let json = include_str!("fixtures/invalid_edge.json");
    let errors = parse::parse_and_build(json).unwrap_err();
    assert_eq!(codes(&errors), ["P002", "P002"]);
    assert!(errors[0].message.contains("'back'"));
    assert!(errors[1].message.contains("ghost"));
}

#[test]
fn duplicate_node_ids_are_rejected() {
    let json = r#"{
        "nodes": [
            {"id": "n", "type": "source", "data": {"sourceType": "s3"}},
            {"id": "n", "type": "target", "data": {"targetType": "s3"}}
        ],
        "edges": []
    }"#;
    let errors = parse::parse_and_build(json).unwrap_err();
    assert_eq!(codes(&errors), ["P003"]);
}

#[test]
fn blank_labels_get_defaults() {
    let json = r#"{
        "nodes": [
            {"id": "a", "type": "source", "data": {"label": "", "sourceType": "mongodb"}},
            {"id": "b", "type": "transform", "data": {"transformType": "custom"}}
        ]
    }"#;
    let graph = parse::parse_and_build(json).unwrap();
    assert_eq!(graph.node("a").unwrap().label, "MongoDB");
    assert_eq!(graph.node("b").unwrap().label, "New Transformation");
}

#[test]
fn missing_edge_ids_are_generated() {
    let json = r#"{
        "nodes": [
            {"id": "a", "type": "source", "data": {"sourceType": "s3"}},
            {"id": "b", "type": "target", "data": {"targetType": "s3"}}
        ],
        "edges": [{"source": "a", "target": "b"}]
    }"#;
    let graph = parse::parse_and_build(json).unwrap();
    assert!(!graph.edges()[0].id.is_empty());
}

#[test]
fn workflow_json_round_trip() {
    let graph = demo_graph();
    let json = parse::to_workflow_json(&graph);
    let back = parse::parse_and_build(&json).expect("Should parse again");
    assert_eq!(back.nodes(), graph.nodes());
    assert_eq!(back.edges(), graph.edges());
}

#[test]
fn wire_format_uses_canvas_keys() {
    let json = parse::to_workflow_json(&demo_graph());
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    let nodes = value["nodes"].as_array().unwrap();
    assert_eq!(nodes[0]["type"], "source");
    assert_eq!(nodes[0]["data"]["sourceType"], "postgresql");
    assert_eq!(nodes[1]["data"]["transformType"], "dedupe");
    assert_eq!(nodes[3]["data"]["targetType"], "snowflake");
    assert_eq!(nodes[4]["type"], "cloudService");
    assert_eq!(nodes[4]["data"]["serviceType"], "glue");
    assert_eq!(nodes[4]["data"]["provider"], "aws");
}

#[test]
fn reused_edge_id_is_rejected() {
    let json = r#"{
        "nodes": [
            {"id": "s", "type": "source", "position": {"x": 0, "y": 0},
             "data": {"label": "PG", "sourceType": "postgresql"}},
            {"id": "f", "type": "transform", "position": {"x": 0, "y": 0},
             "data": {"label": "F", "transformType": "filter"}},
            {"id": "d", "type": "target", "position": {"x": 0, "y": 0},
             "data": {"label": "SF", "targetType": "snowflake"}}
        ],
        "edges": [
            {"id": "e1", "source": "s", "target": "f"},
            {"id": "e1", "source": "f", "target": "d"}
        ]
    }"#;
    let errors = parse::parse_and_build(json).unwrap_err();
    assert_eq!(codes(&errors), ["P006"]);
}
