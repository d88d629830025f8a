//! The palette: which subtypes each node kind accepts.

use super::types::NodeKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CatalogEntry {
    pub id: &'static str,
    pub label: &'static str,
    /// Hosting provider; only cloud services carry one.
    pub provider: Option<&'static str>,
}

const fn entry(id: &'static str, label: &'static str) -> CatalogEntry {
    CatalogEntry {
        id,
        label,
        provider: None,
    }
}

const fn service(id: &'static str, label: &'static str, provider: &'static str) -> CatalogEntry {
    CatalogEntry {
        id,
        label,
        provider: Some(provider),
    }
}

pub const SOURCES: &[CatalogEntry] = &[
    entry("postgresql", "PostgreSQL"),
    entry("mysql", "MySQL"),
    entry("mongodb", "MongoDB"),
    entry("s3", "AWS S3"),
    entry("gcs", "Google Cloud Storage"),
    entry("azure-blob", "Azure Blob"),
    entry("snowflake", "Snowflake"),
    entry("redshift", "Redshift"),
    entry("bigquery", "BigQuery"),
    entry("api", "REST API"),
    entry("csv", "CSV File"),
];

pub const TRANSFORMS: &[CatalogEntry] = &[
    entry("filter", "Filter Rows"),
    entry("map", "Transform Columns"),
    entry("join", "Join Data"),
    entry("aggregate", "Aggregate"),
    entry("dedupe", "Deduplicate"),
    entry("validate", "Validate"),
    entry("sort", "Sort"),
    entry("union", "Union"),
    entry("pivot", "Pivot"),
];

pub const TARGETS: &[CatalogEntry] = &[
    entry("snowflake", "Snowflake"),
    entry("redshift", "Redshift"),
    entry("bigquery", "BigQuery"),
    entry("delta-lake", "Delta Lake"),
    entry("postgresql", "PostgreSQL"),
    entry("s3", "AWS S3"),
    entry("gcs", "Google Cloud Storage"),
    entry("azure-blob", "Azure Blob"),
    entry("mongodb", "MongoDB"),
];

pub const CLOUD_SERVICES: &[CatalogEntry] = &[
    service("glue", "AWS Glue", "aws"),
    service("data-factory", "Azure Data Factory", "azure"),
    service("dataflow", "Google Dataflow", "gcp"),
    service("emr", "AWS EMR", "aws"),
    service("databricks", "Databricks", "databricks"),
    service("airflow", "Apache Airflow", "aws"),
];

pub fn entries(kind: NodeKind) -> &'static [CatalogEntry] {
    match kind {
        NodeKind::Source => SOURCES,
        NodeKind::Transform => TRANSFORMS,
        NodeKind::Target => TARGETS,
        NodeKind::CloudService => CLOUD_SERVICES,
    }
}

pub fn lookup(kind: NodeKind, subtype: &str) -> Option<&'static CatalogEntry> {
    entries(kind).iter().find(|e| e.id == subtype)
}

pub fn is_valid_subtype(kind: NodeKind, subtype: &str) -> bool {
    lookup(kind, subtype).is_some()
}

/// Default label for a freshly placed node: the palette label when the
/// subtype is known, the kind placeholder otherwise.
pub fn default_label(kind: NodeKind, subtype: &str) -> &'static str {
    lookup(kind, subtype)
        .map(|e| e.label)
        .unwrap_or_else(|| kind.placeholder_label())
}
