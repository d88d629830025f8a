//! Integration tests for the graph ⇄ form reconciler.

mod helpers;

use etl_compiler::graph::NodeKind;
use etl_compiler::reconcile::{self, ComponentRef, Dependency, FormField, FormState};

use helpers::*;

#[test]
fn from_graph_partitions_by_kind_in_creation_order() {
    let spec = reconcile::from_graph(&demo_graph());
    assert_eq!(spec.sources.len(), 1);
    assert_eq!(spec.targets.len(), 1);
    assert_eq!(spec.cloud_services.len(), 1);
    let labels: Vec<&str> = spec.transformations.iter().map(|c| c.label.as_str()).collect();
    assert_eq!(labels, ["Unique orders", "Paid only"]);
    assert_eq!(spec.dependencies.len(), 3);
    assert_eq!(spec.sources[0].node_id.as_deref(), Some("src-1"));
}

#[test]
fn generator_order_follows_dependencies() {
    let spec = reconcile::from_graph(&demo_graph());
    let ordered: Vec<&str> = spec
        .ordered_transformations()
        .iter()
        .map(|c| c.component_type.as_str())
        .collect();
    assert_eq!(ordered, ["filter", "dedupe"]);
}

#[test]
fn form_round_trip_is_identity() {
    let spec = reconcile::from_graph(&demo_graph());
    assert_eq!(reconcile::from_form(&reconcile::to_form(&spec)), spec);
}

#[test]
fn to_graph_restores_ids_edges_and_positions() {
    let original = demo_graph();
    let spec = reconcile::from_graph(&original);
    let (rebuilt, warnings) = reconcile::to_graph(&spec, Some(&original));
    assert!(warnings.is_empty(), "{warnings:?}");
    assert_eq!(rebuilt.edges().len(), original.edges().len());
    for node in original.nodes() {
        let back = rebuilt.node(&node.id).expect("id kept");
        assert_eq!(back.position, node.position);
        assert_eq!(back.subtype, node.subtype);
        assert_eq!(back.config, node.config);
    }
    assert_eq!(reconcile::from_graph(&rebuilt), spec);
}

#[test]
fn new_form_rows_are_laid_out_in_columns() {
    let mut form = FormState::default();
    form.add_row(NodeKind::Source);
    form.add_row(NodeKind::Source);
    form.add_row(NodeKind::Target);
    let (graph, warnings) = reconcile::to_graph(&reconcile::from_form(&form), None);
    assert!(warnings.is_empty());

    let sources: Vec<_> = graph.nodes_of_kind(NodeKind::Source).collect();
    assert_eq!((sources[0].position.x, sources[0].position.y), (100.0, 100.0));
    assert_eq!((sources[1].position.x, sources[1].position.y), (100.0, 220.0));
    let target = graph.nodes_of_kind(NodeKind::Target).next().unwrap();
    assert_eq!((target.position.x, target.position.y), (600.0, 100.0));
    assert!(graph.edges().is_empty());
}

#[test]
fn illegal_form_dependencies_are_dropped_with_warning() {
    let mut spec = reconcile::from_graph(&linear_graph("s3", "s3"));
    let src = spec.sources[0].node_id.clone().unwrap();
    let dst = spec.targets[0].node_id.clone().unwrap();
    spec.dependencies.push(Dependency { from: dst, to: src });
    spec.dependencies.push(Dependency {
        from: "nowhere".into(),
        to: "x".into(),
    });

    let (graph, warnings) = reconcile::to_graph(&spec, None);
    assert_eq!(graph.edges().len(), 1);
    assert_eq!(codes(&warnings), ["R002", "R002"]);
}

#[test]
fn duplicated_row_ids_get_fresh_nodes() {
    let mut a = ComponentRef::new("filter", "A");
    a.node_id = Some("t-1".into());
    let mut b = ComponentRef::new("map", "B");
    b.node_id = Some("t-1".into());
    let mut spec = demo_spec();
    spec.transformations = vec![a, b];

    let (graph, warnings) = reconcile::to_graph(&spec, None);
    assert_eq!(codes(&warnings), ["R001"]);
    assert_eq!(graph.nodes_of_kind(NodeKind::Transform).count(), 2);
    assert!(graph.node("t-1").is_some());
}

#[test]
fn form_edits_flow_into_spec() {
    let mut form = reconcile::to_form(&demo_spec());
    form.update_row(NodeKind::Target, 0, &FormField::parse("config.table").unwrap(), "orders")
        .unwrap();
    form.update_row(NodeKind::Source, 0, &FormField::parse("label").unwrap(), "")
        .unwrap();
    let spec = reconcile::from_form(&form);
    assert_eq!(spec.targets[0].config["table"], "orders");
    assert_eq!(spec.sources[0].label, "New Source");
}
