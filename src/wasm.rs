//! WASM entry points for browser use.

use wasm_bindgen::prelude::*;

use crate::codegen::{self, Dialect, GenerationRequest};
use crate::error::CompilerError;
use crate::persist::PipelineRecord;
use crate::reconcile;

/// Validate a canvas `workflow_data` JSON: parse, graph rules, component
/// rules. Returns a JSON array of CompilerError objects.
#[wasm_bindgen]
pub fn validate_pipeline(workflow_json: &str) -> JsValue {
    let result = validate_pipeline_inner(workflow_json);
    serde_wasm_bindgen::to_value(&result).unwrap_or(JsValue::NULL)
}

fn validate_pipeline_inner(workflow_json: &str) -> Vec<ErrorDto> {
    let graph = match crate::parse::parse_and_build(workflow_json) {
        Ok(g) => g,
        Err(errors) => return errors.into_iter().map(ErrorDto::from).collect(),
    };

    let mut errors = crate::validate::validate_graph(&graph);
    errors.extend(crate::validate::validate_spec(&reconcile::from_graph(&graph)));
    errors.into_iter().map(ErrorDto::from).collect()
}

/// Generate code for a stored pipeline record in `dialect`
/// (`python`, `scala` or `sql`).
#[wasm_bindgen]
pub fn generate_pipeline_code(record_json: &str, dialect: &str) -> JsValue {
    let result = generate_pipeline_code_inner(record_json, dialect);
    serde_wasm_bindgen::to_value(&result).unwrap_or(JsValue::NULL)
}

fn generate_pipeline_code_inner(record_json: &str, dialect: &str) -> GenerateResult {
    let Some(dialect) = Dialect::parse(dialect) else {
        return GenerateResult::Errors {
            errors: vec![ErrorDto::from(CompilerError::parse(
                "P005",
                format!("Unknown dialect '{}'", dialect),
            ))],
        };
    };
    let record = match PipelineRecord::from_json(record_json) {
        Ok(r) => r,
        Err(e) => {
            return GenerateResult::Errors {
                errors: vec![ErrorDto::from(CompilerError::parse(
                    "P001",
                    format!("Failed to parse pipeline record: {}", e),
                ))],
            };
        }
    };

    let code = codegen::generate(&GenerationRequest::from_spec(&record.spec, &record.name, dialect));
    GenerateResult::Success {
        dialect: code.dialect.to_string(),
        file_name: code.file_name,
        content: code.content,
    }
}

/// Export a canvas `workflow_data` JSON as an Airflow DAG YAML document.
#[wasm_bindgen]
pub fn export_airflow_dag(workflow_json: &str, pipeline_name: &str) -> JsValue {
    let result = export_airflow_dag_inner(workflow_json, pipeline_name);
    serde_wasm_bindgen::to_value(&result).unwrap_or(JsValue::NULL)
}

fn export_airflow_dag_inner(workflow_json: &str, pipeline_name: &str) -> ExportResult {
    let yaml = crate::parse::parse_and_build(workflow_json)
        .and_then(|graph| codegen::airflow_dag_yaml(&graph, pipeline_name).map_err(|e| vec![e]));
    match yaml {
        Ok(yaml) => ExportResult::Success { yaml },
        Err(errors) => ExportResult::Errors {
            errors: errors.into_iter().map(ErrorDto::from).collect(),
        },
    }
}

// ---------------------------------------------------------------------------
// DTOs for serialization to JS
// ---------------------------------------------------------------------------

#[derive(Debug, serde::Serialize, serde::Deserialize)]
struct ErrorDto {
    code: String,
    phase: String,
    message: String,
    node_id: Option<String>,
}

impl From<CompilerError> for ErrorDto {
    fn from(e: CompilerError) -> Self {
        ErrorDto {
            code: e.code,
            phase: e.phase.to_string(),
            message: e.message,
            node_id: e.node_id,
        }
    }
}

#[derive(Debug, serde::Serialize, serde::Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
enum GenerateResult {
    Success {
        dialect: String,
        #[serde(rename = "fileName")]
        file_name: String,
        content: String,
    },
    Errors {
        errors: Vec<ErrorDto>,
    },
}

#[derive(Debug, serde::Serialize, serde::Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
enum ExportResult {
    Success { yaml: String },
    Errors { errors: Vec<ErrorDto> },
}
