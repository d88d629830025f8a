//! Codegen pass: canonical spec → ETL source in one of three dialects.
//!
//! Public API: `generate(request) -> GeneratedCode`. Generation is pure and
//! total; the same request always yields the same text.

pub mod airflow;
pub mod options;
pub mod steps;
pub mod writer;

mod python;
mod scala;
mod sql;

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::reconcile::{CanonicalPipelineSpec, ComponentRef};

pub use airflow::{
    AirflowDag, AirflowTask, DefaultArgs, airflow_dag, airflow_dag_yaml, airflow_dag_yaml_at,
    pipeline_preview,
};
pub use options::GeneratorOptions;
pub use steps::{StepInput, StepRegistry, StepRenderer};
pub use writer::CodeWriter;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    #[default]
    Python,
    Scala,
    Sql,
}

impl Dialect {
    pub const ALL: [Dialect; 3] = [Dialect::Python, Dialect::Scala, Dialect::Sql];

    pub fn as_str(&self) -> &'static str {
        match self {
            Dialect::Python => "python",
            Dialect::Scala => "scala",
            Dialect::Sql => "sql",
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            Dialect::Python => "py",
            Dialect::Scala => "scala",
            Dialect::Sql => "sql",
        }
    }

    pub fn file_name(&self) -> String {
        format!("etl_pipeline.{}", self.extension())
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|d| d.as_str() == s)
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub struct GenerationRequest<'a> {
    pub spec: &'a CanonicalPipelineSpec,
    pub pipeline_name: &'a str,
    pub source_type: &'a str,
    pub target_type: &'a str,
    pub dialect: Dialect,
    pub options: GeneratorOptions,
}

impl<'a> GenerationRequest<'a> {
    /// Source and target types come from the first source and target.
    pub fn from_spec(spec: &'a CanonicalPipelineSpec, pipeline_name: &'a str, dialect: Dialect) -> Self {
        Self {
            spec,
            pipeline_name,
            source_type: spec.primary_source_type(),
            target_type: spec.primary_target_type(),
            dialect,
            options: GeneratorOptions::default(),
        }
    }

    pub fn with_options(mut self, options: GeneratorOptions) -> Self {
        self.options = options;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedCode {
    pub dialect: Dialect,
    pub file_name: String,
    pub content: String,
}

/// Generate with the standard step registry.
pub fn generate(request: &GenerationRequest<'_>) -> GeneratedCode {
    generate_with(request, &StepRegistry::standard())
}

pub fn generate_with(request: &GenerationRequest<'_>, registry: &StepRegistry) -> GeneratedCode {
    let template = Template::resolve(request);
    let transformations = request.spec.ordered_transformations();

    let content = match request.dialect {
        Dialect::Python => python::emit(&template, &transformations, registry),
        Dialect::Scala => scala::emit(&template, &transformations, registry),
        Dialect::Sql => sql::emit(&template, &transformations, registry),
    };
    tracing::debug!(
        dialect = request.dialect.as_str(),
        pipeline = request.pipeline_name,
        bytes = content.len(),
        "generated pipeline code"
    );

    GeneratedCode {
        dialect: request.dialect,
        file_name: request.dialect.file_name(),
        content,
    }
}

/// `staging.<name>` where the name goes through `snake_name`.
pub fn staging_table_name(pipeline_name: &str) -> String {
    format!("staging.{}", snake_name(pipeline_name))
}

/// Lowercase, each whitespace run replaced by `_`.
pub fn snake_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut in_space = false;
    for c in name.chars() {
        if c.is_whitespace() {
            if !in_space {
                out.push('_');
            }
            in_space = true;
        } else {
            out.extend(c.to_lowercase());
            in_space = false;
        }
    }
    out
}

/// Connector values after config overrides, shared by the dialect emitters.
pub(crate) struct Template<'a> {
    pub name: &'a str,
    pub source_type: &'a str,
    pub target_type: &'a str,
    pub source_url: &'a str,
    pub source_table: &'a str,
    pub source_user: &'a str,
    pub source_password: &'a str,
    pub target_path: &'a str,
    pub target_table: &'a str,
    pub options: &'a GeneratorOptions,
}

impl<'a> Template<'a> {
    fn resolve(request: &'a GenerationRequest<'a>) -> Self {
        let opts = &request.options;
        let source = request.spec.sources.first();
        let target = request.spec.targets.first();
        Self {
            name: request.pipeline_name,
            source_type: request.source_type,
            target_type: request.target_type,
            source_url: pick(source, "url", &opts.source_url),
            source_table: pick(source, "table", &opts.source_table),
            source_user: pick(source, "user", &opts.source_user),
            source_password: &opts.source_password,
            target_path: pick(target, "path", &opts.target_path),
            target_table: pick(target, "table", &opts.target_table),
            options: opts,
        }
    }
}

fn pick<'a>(component: Option<&'a ComponentRef>, key: &str, fallback: &'a str) -> &'a str {
    component
        .and_then(|c| c.config.get(key))
        .map(|v| v.as_str())
        .filter(|v| !v.trim().is_empty())
        .unwrap_or(fallback)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn demo_spec() -> CanonicalPipelineSpec {
        CanonicalPipelineSpec {
            sources: vec![ComponentRef::new("postgresql", "PG")],
            targets: vec![ComponentRef::new("snowflake", "SF")],
            ..Default::default()
        }
    }

    #[test]
    fn file_names_follow_dialect() {
        assert_eq!(Dialect::Python.file_name(), "etl_pipeline.py");
        assert_eq!(Dialect::Scala.file_name(), "etl_pipeline.scala");
        assert_eq!(Dialect::Sql.file_name(), "etl_pipeline.sql");
        assert_eq!(Dialect::parse("sql"), Some(Dialect::Sql));
        assert_eq!(Dialect::parse("java"), None);
    }

    #[test]
    fn staging_name_collapses_whitespace() {
        assert_eq!(staging_table_name("Demo"), "staging.demo");
        assert_eq!(staging_table_name("Daily  Sales\tLoad"), "staging.daily_sales_load");
        assert_eq!(staging_table_name(" x"), "staging._x");
    }

    #[test]
    fn from_spec_uses_first_endpoints() {
        let mut spec = demo_spec();
        spec.sources.push(ComponentRef::new("mysql", "My"));
        let req = GenerationRequest::from_spec(&spec, "Demo", Dialect::Sql);
        assert_eq!(req.source_type, "postgresql");
        assert_eq!(req.target_type, "snowflake");
    }

    #[test]
    fn every_dialect_mentions_both_endpoints() {
        let spec = demo_spec();
        for dialect in Dialect::ALL {
            let code = generate(&GenerationRequest::from_spec(&spec, "Demo", dialect));
            assert_eq!(code.dialect, dialect);
            assert!(code.content.contains("postgresql"), "{dialect}");
            assert!(code.content.contains("snowflake"), "{dialect}");
        }
    }

    #[test]
    fn component_config_overrides_template() {
        let mut spec = demo_spec();
        spec.sources[0] = ComponentRef::new("postgresql", "PG")
            .with_config("url", "jdbc:postgresql://db.internal:5432/sales");
        let code = generate(&GenerationRequest::from_spec(&spec, "Demo", Dialect::Python));
        assert!(code.content.contains("jdbc:postgresql://db.internal:5432/sales"));
        assert!(!code.content.contains("jdbc:postgresql://host:5432/db"));
    }
}
