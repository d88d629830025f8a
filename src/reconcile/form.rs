//! Form builder state: one editable row list per component kind.

use serde::{Deserialize, Serialize};

use super::spec::{ComponentRef, Dependency};
use crate::error::FormError;
use crate::graph::NodeKind;

/// Which part of a row an edit targets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormField {
    Type,
    Label,
    Config(String),
}

impl FormField {
    /// Accepts `type`, `label` and `config.<key>`.
    pub fn parse(field: &str) -> Result<Self, FormError> {
        match field {
            "type" => Ok(FormField::Type),
            "label" => Ok(FormField::Label),
            _ => match field.strip_prefix("config.") {
                Some(key) if !key.is_empty() => Ok(FormField::Config(key.to_string())),
                _ => Err(FormError::UnknownField(field.to_string())),
            },
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormState {
    pub sources: Vec<ComponentRef>,
    pub transformations: Vec<ComponentRef>,
    pub targets: Vec<ComponentRef>,
    pub cloud_services: Vec<ComponentRef>,
    /// Topology carried over from the canvas. Not editable in the form, but
    /// kept so a round trip through the form does not lose wiring.
    #[serde(default)]
    pub dependencies: Vec<Dependency>,
}

/// Row appended by the form's "add" button for each kind.
pub fn default_row(kind: NodeKind) -> ComponentRef {
    match kind {
        NodeKind::Source => ComponentRef::new("postgresql", "New Source"),
        NodeKind::Transform => ComponentRef::new("filter", "New Transformation"),
        NodeKind::Target => ComponentRef::new("snowflake", "New Target"),
        NodeKind::CloudService => ComponentRef::new("glue", "AWS Glue"),
    }
}

impl FormState {
    pub fn rows(&self, kind: NodeKind) -> &[ComponentRef] {
        match kind {
            NodeKind::Source => &self.sources,
            NodeKind::Transform => &self.transformations,
            NodeKind::Target => &self.targets,
            NodeKind::CloudService => &self.cloud_services,
        }
    }

    fn rows_mut(&mut self, kind: NodeKind) -> &mut Vec<ComponentRef> {
        match kind {
            NodeKind::Source => &mut self.sources,
            NodeKind::Transform => &mut self.transformations,
            NodeKind::Target => &mut self.targets,
            NodeKind::CloudService => &mut self.cloud_services,
        }
    }

    /// Append the kind's default row; returns its index.
    pub fn add_row(&mut self, kind: NodeKind) -> usize {
        let rows = self.rows_mut(kind);
        rows.push(default_row(kind));
        rows.len() - 1
    }

    /// Remove a row. Dependencies attached to the row's canvas node go with it.
    pub fn remove_row(&mut self, kind: NodeKind, index: usize) -> Result<ComponentRef, FormError> {
        let rows = self.rows_mut(kind);
        if index >= rows.len() {
            return Err(FormError::RowOutOfRange { kind, index });
        }
        let removed = rows.remove(index);
        if let Some(id) = &removed.node_id {
            self.dependencies.retain(|d| &d.from != id && &d.to != id);
        }
        Ok(removed)
    }

    pub fn update_row(
        &mut self,
        kind: NodeKind,
        index: usize,
        field: &FormField,
        value: &str,
    ) -> Result<(), FormError> {
        let row = self
            .rows_mut(kind)
            .get_mut(index)
            .ok_or(FormError::RowOutOfRange { kind, index })?;
        match field {
            FormField::Type => row.component_type = value.to_string(),
            FormField::Label => row.label = value.to_string(),
            FormField::Config(key) => {
                row.config.insert(key.clone(), value.to_string());
            }
        }
        Ok(())
    }
}
