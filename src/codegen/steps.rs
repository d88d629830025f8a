//! Per-transformation step renderers.
//!
//! The cleaning baseline is always emitted by the dialect emitters. A
//! registry adds one block per transformation whose type has a renderer;
//! types without one are covered by the baseline and emit nothing.

use std::collections::HashMap;

use super::Dialect;
use super::writer::CodeWriter;
use crate::reconcile::ComponentRef;

/// One transformation about to be rendered.
pub struct StepInput<'a> {
    pub dialect: Dialect,
    pub component: &'a ComponentRef,
    /// Binding holding the data so far: a DataFrame variable for Python and
    /// Scala, the staging table for SQL.
    pub input: &'a str,
    /// 1-based position in dependency order.
    pub index: usize,
}

impl StepInput<'_> {
    pub fn config(&self, key: &str) -> Option<&str> {
        self.component
            .config
            .get(key)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }

    /// Binding name for this step's output in the DataFrame dialects.
    pub fn output_binding(&self) -> String {
        let ty = identifier(&self.component.component_type);
        match self.dialect {
            Dialect::Python => format!("df_{}_{}", self.index, ty),
            Dialect::Scala => format!("df{}{}", self.index, camel(&ty)),
            Dialect::Sql => self.input.to_string(),
        }
    }

    fn header(&self, w: &mut CodeWriter) {
        let marker = match self.dialect {
            Dialect::Python => "#",
            Dialect::Scala => "//",
            Dialect::Sql => "--",
        };
        w.line(&format!(
            "{} Step {}: {} ({})",
            marker,
            self.index,
            single_line(&self.component.label),
            single_line(&self.component.component_type)
        ));
    }
}

/// Renders one transformation, returning the binding that holds its output.
pub trait StepRenderer {
    fn render(&self, step: &StepInput<'_>, w: &mut CodeWriter) -> String;
}

#[derive(Default)]
pub struct StepRegistry {
    renderers: HashMap<String, Box<dyn StepRenderer>>,
}

impl StepRegistry {
    /// Baseline only: output does not depend on the declared transformations.
    pub fn canned() -> Self {
        Self::default()
    }

    /// Baseline plus `filter`, `dedupe` and `map`.
    pub fn standard() -> Self {
        let mut registry = Self::canned();
        registry.register("filter", FilterStep);
        registry.register("dedupe", DedupeStep);
        registry.register("map", MapStep);
        registry
    }

    pub fn register(&mut self, transform_type: &str, renderer: impl StepRenderer + 'static) {
        self.renderers
            .insert(transform_type.to_string(), Box::new(renderer));
    }

    pub fn get(&self, transform_type: &str) -> Option<&dyn StepRenderer> {
        self.renderers.get(transform_type).map(|r| r.as_ref())
    }

    pub fn is_empty(&self) -> bool {
        self.renderers.is_empty()
    }

    /// Render every registered transformation in order, threading the
    /// binding through. Returns the final binding.
    pub fn render_all(
        &self,
        dialect: Dialect,
        transformations: &[&ComponentRef],
        input: &str,
        w: &mut CodeWriter,
    ) -> String {
        let mut current = input.to_string();
        for (i, &component) in transformations.iter().enumerate() {
            let Some(renderer) = self.get(&component.component_type) else {
                continue;
            };
            let step = StepInput {
                dialect,
                component,
                input: &current,
                index: i + 1,
            };
            w.blank();
            let next = renderer.render(&step, w);
            current = next;
        }
        current
    }
}

/// `filter`: keeps rows matching `config.condition`.
pub struct FilterStep;

impl StepRenderer for FilterStep {
    fn render(&self, step: &StepInput<'_>, w: &mut CodeWriter) -> String {
        step.header(w);
        let Some(condition) = step.config("condition") else {
            w.line(&skip_note(step.dialect, "no condition configured"));
            return step.input.to_string();
        };
        let out = step.output_binding();
        match step.dialect {
            Dialect::Python => w.line(&format!(
                "{} = {}.filter(\"{}\")",
                out,
                step.input,
                escape_double(condition)
            )),
            Dialect::Scala => w.line(&format!(
                "val {} = {}.filter(\"{}\")",
                out,
                step.input,
                escape_double(condition)
            )),
            Dialect::Sql => w.line(&format!(
                "DELETE FROM {} WHERE NOT ({});",
                step.input,
                single_line(condition)
            )),
        }
        out
    }
}

/// `dedupe`: drops duplicate rows, optionally keyed by `config.columns`.
pub struct DedupeStep;

impl StepRenderer for DedupeStep {
    fn render(&self, step: &StepInput<'_>, w: &mut CodeWriter) -> String {
        step.header(w);
        let columns: Vec<&str> = step
            .config("columns")
            .map(|c| c.split(',').map(str::trim).filter(|s| !s.is_empty()).collect())
            .unwrap_or_default();
        let quoted: Vec<String> = columns
            .iter()
            .map(|c| format!("\"{}\"", escape_double(c)))
            .collect();
        let out = step.output_binding();
        match step.dialect {
            Dialect::Python if columns.is_empty() => {
                w.line(&format!("{} = {}.dropDuplicates()", out, step.input))
            }
            Dialect::Python => w.line(&format!(
                "{} = {}.dropDuplicates([{}])",
                out,
                step.input,
                quoted.join(", ")
            )),
            Dialect::Scala if columns.is_empty() => {
                w.line(&format!("val {} = {}.dropDuplicates()", out, step.input))
            }
            Dialect::Scala => w.line(&format!(
                "val {} = {}.dropDuplicates(Seq({}))",
                out,
                step.input,
                quoted.join(", ")
            )),
            Dialect::Sql if columns.is_empty() => w.line(&format!(
                "CREATE OR REPLACE TABLE {0} AS SELECT DISTINCT * FROM {0};",
                step.input
            )),
            Dialect::Sql => {
                w.line(&format!("CREATE OR REPLACE TABLE {} AS", step.input));
                w.line("SELECT *");
                w.line(&format!("FROM {}", step.input));
                w.line(&format!(
                    "QUALIFY ROW_NUMBER() OVER (PARTITION BY {} ORDER BY created_at) = 1;",
                    columns.join(", ")
                ));
            }
        }
        out
    }
}

/// `map`: sets `config.column` to the SQL expression `config.expression`.
pub struct MapStep;

impl StepRenderer for MapStep {
    fn render(&self, step: &StepInput<'_>, w: &mut CodeWriter) -> String {
        step.header(w);
        let (Some(column), Some(expression)) = (step.config("column"), step.config("expression"))
        else {
            w.line(&skip_note(step.dialect, "column and expression are required"));
            return step.input.to_string();
        };
        let out = step.output_binding();
        match step.dialect {
            Dialect::Python => w.line(&format!(
                "{} = {}.withColumn(\"{}\", expr(\"{}\"))",
                out,
                step.input,
                escape_double(column),
                escape_double(expression)
            )),
            Dialect::Scala => w.line(&format!(
                "val {} = {}.withColumn(\"{}\", expr(\"{}\"))",
                out,
                step.input,
                escape_double(column),
                escape_double(expression)
            )),
            Dialect::Sql => w.line(&format!(
                "UPDATE {} SET {} = {};",
                step.input,
                column,
                single_line(expression)
            )),
        }
        out
    }
}

fn skip_note(dialect: Dialect, reason: &str) -> String {
    let marker = match dialect {
        Dialect::Python => "#",
        Dialect::Scala => "//",
        Dialect::Sql => "--",
    };
    format!("{} skipped: {}", marker, reason)
}

/// Escape for a double-quoted Python or Scala string literal.
pub(crate) fn escape_double(s: &str) -> String {
    single_line(s).replace('\\', "\\\\").replace('"', "\\\"")
}

/// Collapse line breaks so user text cannot escape a comment or literal.
pub(crate) fn single_line(s: &str) -> String {
    s.replace(['\r', '\n'], " ")
}

/// Lowercase ASCII identifier fragment; anything else becomes `_`.
fn identifier(s: &str) -> String {
    let ident: String = s
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_lowercase() } else { '_' })
        .collect();
    if ident.is_empty() { "step".into() } else { ident }
}

fn camel(ident: &str) -> String {
    ident
        .split('_')
        .filter(|p| !p.is_empty())
        .map(|p| {
            let mut chars = p.chars();
            match chars.next() {
                Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect()
}
