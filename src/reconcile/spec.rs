//! Canonical pipeline specification: the list-of-components view that code
//! generation consumes.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::graph::{DependencyGraph, NodeKind};

/// One source, transform, target or cloud service.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentRef {
    #[serde(rename = "type")]
    pub component_type: String,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub config: BTreeMap<String, String>,
    /// Id of the canvas node this row came from, when it came from one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_id: Option<String>,
}

impl ComponentRef {
    pub fn new(component_type: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            component_type: component_type.into(),
            label: label.into(),
            config: BTreeMap::new(),
            node_id: None,
        }
    }

    pub fn with_config(mut self, key: &str, value: &str) -> Self {
        self.config.insert(key.to_string(), value.to_string());
        self
    }

    /// Fill a blank label with the kind's placeholder.
    pub fn normalized(mut self, kind: NodeKind) -> Self {
        if self.label.trim().is_empty() {
            self.label = kind.placeholder_label().to_string();
        }
        self
    }
}

/// A directed edge between two components, by node id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Dependency {
    pub from: String,
    pub to: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CanonicalPipelineSpec {
    #[serde(default)]
    pub sources: Vec<ComponentRef>,
    #[serde(default)]
    pub transformations: Vec<ComponentRef>,
    #[serde(default)]
    pub targets: Vec<ComponentRef>,
    #[serde(default)]
    pub cloud_services: Vec<ComponentRef>,
    #[serde(default)]
    pub dependencies: Vec<Dependency>,
}

impl CanonicalPipelineSpec {
    pub fn components(&self, kind: NodeKind) -> &[ComponentRef] {
        match kind {
            NodeKind::Source => &self.sources,
            NodeKind::Transform => &self.transformations,
            NodeKind::Target => &self.targets,
            NodeKind::CloudService => &self.cloud_services,
        }
    }

    pub fn components_mut(&mut self, kind: NodeKind) -> &mut Vec<ComponentRef> {
        match kind {
            NodeKind::Source => &mut self.sources,
            NodeKind::Transform => &mut self.transformations,
            NodeKind::Target => &mut self.targets,
            NodeKind::CloudService => &mut self.cloud_services,
        }
    }

    pub fn component_count(&self) -> usize {
        NodeKind::ALL.iter().map(|k| self.components(*k).len()).sum()
    }

    /// At least one source and one target have been chosen.
    pub fn has_endpoints(&self) -> bool {
        !self.sources.is_empty() && !self.targets.is_empty()
    }

    pub fn primary_source_type(&self) -> &str {
        self.sources
            .first()
            .map(|c| c.component_type.as_str())
            .unwrap_or_default()
    }

    pub fn primary_target_type(&self) -> &str {
        self.targets
            .first()
            .map(|c| c.component_type.as_str())
            .unwrap_or_default()
    }

    /// Transformations in dependency order.
    ///
    /// Rows carrying a node id are ordered by a topological sort of the
    /// dependency list; rows without one keep their declared order after
    /// them. A cyclic dependency list falls back to declared order.
    pub fn ordered_transformations(&self) -> Vec<&ComponentRef> {
        let mut ordered: Vec<&ComponentRef> = self.transformations.iter().collect();
        if self.dependencies.is_empty() {
            return ordered;
        }

        let ids = NodeKind::ALL
            .iter()
            .flat_map(|k| self.components(*k))
            .filter_map(|c| c.node_id.as_deref());
        let dg = DependencyGraph::from_edges(
            ids,
            self.dependencies
                .iter()
                .map(|d| (d.from.as_str(), d.to.as_str())),
        );
        let Ok(topo) = dg.topo_order() else {
            return ordered;
        };
        let rank: HashMap<&str, usize> = topo
            .iter()
            .enumerate()
            .map(|(i, id)| (id.as_str(), i))
            .collect();

        ordered.sort_by_key(|c| {
            c.node_id
                .as_deref()
                .and_then(|id| rank.get(id).copied())
                .unwrap_or(usize::MAX)
        });
        ordered
    }
}
