//! Connector template defaults used by every dialect.
//!
//! Values from the first source/target component's config take precedence
//! (`url`, `table`, `user` on the source; `path`, `table` on the target).

use serde::{Deserialize, Serialize};

use crate::error::CompilerError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GeneratorOptions {
    pub source_url: String,
    pub source_table: String,
    pub source_user: String,
    pub source_password: String,
    pub target_path: String,
    pub target_table: String,
    pub output_format: String,
    pub write_mode: String,
    pub partition_column: String,
    pub adaptive_execution: bool,
    pub email_pattern: String,
}

impl Default for GeneratorOptions {
    fn default() -> Self {
        Self {
            source_url: "jdbc:postgresql://host:5432/db".into(),
            source_table: "source_table".into(),
            source_user: "username".into(),
            source_password: "password".into(),
            target_path: "s3://bucket/output/".into(),
            target_table: "final_table".into(),
            output_format: "parquet".into(),
            write_mode: "overwrite".into(),
            partition_column: "date".into(),
            adaptive_execution: true,
            email_pattern: "^[a-zA-Z0-9+_.-]+@[a-zA-Z0-9.-]+$".into(),
        }
    }
}

impl GeneratorOptions {
    /// Missing keys keep their defaults.
    pub fn from_json(json: &str) -> Result<Self, CompilerError> {
        serde_json::from_str(json).map_err(|e| {
            CompilerError::parse("P004", format!("Failed to parse generator options: {}", e))
        })
    }
}
