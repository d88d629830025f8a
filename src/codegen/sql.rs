//! Warehouse SQL script emitter. Steps rewrite the staging table in place.

use super::steps::{StepRegistry, single_line};
use super::writer::CodeWriter;
use super::{Dialect, Template, staging_table_name};
use crate::reconcile::ComponentRef;

pub(super) fn emit(t: &Template<'_>, transformations: &[&ComponentRef], registry: &StepRegistry) -> String {
    let staging = staging_table_name(t.name);
    let target = format!("{}.{}", t.target_type, t.target_table);
    let pattern = t.options.email_pattern.replace('\'', "''");
    let mut w = CodeWriter::with_indent(4);

    w.line(&format!("-- ETL Pipeline - {}", single_line(t.name)));
    w.line(&format!(
        "-- Source: {} → Target: {}",
        single_line(t.source_type),
        single_line(t.target_type)
    ));
    w.blank();

    w.line("-- Extract and Transform in one step");
    w.line(&format!("CREATE OR REPLACE TABLE {} AS", staging));
    w.line("SELECT");
    w.indent();
    w.line("-- Clean and standardize data");
    w.line("TRIM(email) AS email,");
    w.line("UPPER(status) AS status,");
    w.line("created_at,");
    w.line("updated_at,");
    w.line("-- Data validation");
    w.line("CASE");
    w.indent();
    w.line(&format!("WHEN REGEXP_LIKE(email, '{}')", pattern));
    w.line("THEN 'valid'");
    w.line("ELSE 'invalid'");
    w.dedent();
    w.line("END AS email_validation,");
    w.line("-- Data enrichment");
    w.line("DATE_TRUNC('day', created_at) AS date_partition");
    w.dedent();
    w.line("FROM source.raw_data");
    w.line("WHERE email IS NOT NULL");
    w.line("  AND status IS NOT NULL;");

    registry.render_all(Dialect::Sql, transformations, &staging, &mut w);

    w.blank();
    w.line("-- Load to final destination");
    w.line(&format!("INSERT INTO {}", target));
    w.line("SELECT");
    w.indent();
    w.lines([
        "email,",
        "status,",
        "created_at,",
        "updated_at,",
        "date_partition,",
        "CURRENT_TIMESTAMP() AS etl_processed_at",
    ]);
    w.dedent();
    w.line(&format!("FROM {}", staging));
    w.line("WHERE email_validation = 'valid';");
    w.blank();

    w.line("-- Data quality checks");
    w.line("SELECT");
    w.indent();
    w.lines([
        "COUNT(*) AS total_rows,",
        "COUNT(DISTINCT email) AS unique_emails,",
        "SUM(CASE WHEN status = 'ACTIVE' THEN 1 ELSE 0 END) AS active_count,",
        "SUM(CASE WHEN status = 'INACTIVE' THEN 1 ELSE 0 END) AS inactive_count",
    ]);
    w.dedent();
    w.line(&format!("FROM {};", target));
    w.finish()
}
