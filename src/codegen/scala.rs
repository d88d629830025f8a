//! Spark (Scala) job emitter.

use super::steps::{StepRegistry, escape_double, single_line};
use super::writer::CodeWriter;
use super::{Dialect, Template};
use crate::reconcile::ComponentRef;

pub(super) fn emit(t: &Template<'_>, transformations: &[&ComponentRef], registry: &StepRegistry) -> String {
    let o = t.options;
    let mut w = CodeWriter::with_indent(2);

    w.line(&format!("// ETL Pipeline - {}", single_line(t.name)));
    w.line(&format!(
        "// Source: {} → Target: {}",
        single_line(t.source_type),
        single_line(t.target_type)
    ));
    w.blank();
    w.line("import org.apache.spark.sql.{SparkSession, DataFrame}");
    w.line("import org.apache.spark.sql.functions._");
    w.blank();

    w.block_open("object ETLPipeline");

    w.block_open("def extract(spark: SparkSession, sourceConfig: Map[String, String]): DataFrame =");
    w.line("println(s\"Extracting data from ${sourceConfig(\"type\")}\")");
    w.blank();
    w.lines([
        "val df = spark.read",
        "  .format(\"jdbc\")",
        "  .option(\"url\", sourceConfig(\"url\"))",
        "  .option(\"dbtable\", sourceConfig(\"table\"))",
        "  .option(\"user\", sourceConfig(\"user\"))",
        "  .option(\"password\", sourceConfig(\"password\"))",
        "  .load()",
    ]);
    w.blank();
    w.line("println(s\"Extracted ${df.count()} rows\")");
    w.line("df");
    w.block_close();
    w.blank();

    w.block_open("def transform(df: DataFrame): DataFrame =");
    w.line("println(\"Applying transformations\")");
    w.blank();
    w.line("val dfClean = df.na.drop()");
    w.blank();
    w.lines([
        "val dfTransformed = dfClean",
        "  .withColumn(\"email\", trim(col(\"email\")))",
        "  .withColumn(\"status\", upper(col(\"status\")))",
    ]);
    w.blank();
    w.line("val dfValidated = dfTransformed");
    w.line(&format!(
        "  .filter(col(\"email\").rlike(\"{}\"))",
        escape_double(&o.email_pattern)
    ));
    let output = registry.render_all(Dialect::Scala, transformations, "dfValidated", &mut w);
    w.blank();
    w.line(&format!("println(s\"Transformed to ${{{}.count()}} rows\")", output));
    w.line(&output);
    w.block_close();
    w.blank();

    w.block_open("def load(df: DataFrame, targetConfig: Map[String, String]): Unit =");
    w.line("println(s\"Loading data to ${targetConfig(\"type\")}\")");
    w.blank();
    w.line("df.write");
    w.line(&format!("  .format(\"{}\")", escape_double(&o.output_format)));
    w.line(&format!("  .mode(\"{}\")", escape_double(&o.write_mode)));
    if !o.partition_column.is_empty() {
        w.line(&format!("  .partitionBy(\"{}\")", escape_double(&o.partition_column)));
    }
    w.line("  .save(targetConfig(\"path\"))");
    w.blank();
    w.line("println(\"Data loaded successfully\")");
    w.block_close();
    w.blank();

    w.block_open("def main(args: Array[String]): Unit =");
    w.line("val spark = SparkSession.builder()");
    w.line(&format!("  .appName(\"{}\")", escape_double(t.name)));
    if o.adaptive_execution {
        w.line("  .config(\"spark.sql.adaptive.enabled\", \"true\")");
    }
    w.line("  .getOrCreate()");
    w.blank();
    w.line("val sourceConfig = Map(");
    w.indent();
    w.line(&format!("\"type\" -> \"{}\",", escape_double(t.source_type)));
    w.line(&format!("\"url\" -> \"{}\",", escape_double(t.source_url)));
    w.line(&format!("\"table\" -> \"{}\",", escape_double(t.source_table)));
    w.line(&format!("\"user\" -> \"{}\",", escape_double(t.source_user)));
    w.line(&format!("\"password\" -> \"{}\"", escape_double(t.source_password)));
    w.dedent();
    w.line(")");
    w.blank();
    w.line("val targetConfig = Map(");
    w.indent();
    w.line(&format!("\"type\" -> \"{}\",", escape_double(t.target_type)));
    w.line(&format!("\"path\" -> \"{}\"", escape_double(t.target_path)));
    w.dedent();
    w.line(")");
    w.blank();
    w.block_open("try");
    w.line("val df = extract(spark, sourceConfig)");
    w.line("val dfTransformed = transform(df)");
    w.line("load(dfTransformed, targetConfig)");
    w.blank();
    w.line("println(\"ETL Pipeline completed successfully\")");
    w.dedent();
    w.block_open("} catch");
    w.line("case e: Exception =>");
    w.indent();
    w.line("println(s\"ETL Pipeline failed: ${e.getMessage}\")");
    w.line("throw e");
    w.dedent();
    w.dedent();
    w.block_open("} finally");
    w.line("spark.stop()");
    w.block_close();
    w.block_close();

    w.block_close();
    w.finish()
}
