//! In-process text report producer

use super::filter::describe_criteria;
use super::{ProducerOutput, ReportProducer, ReportRequest};
use crate::error::Result;
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::fmt::Write;

/// Writes a plain-text report for the qualifying rows
///
/// The report carries a title with the category label and generation date, the
/// filter criteria, per-product counts, optional counts per summary column (the
/// pre-approving user by default), and the qualifying rows themselves.
#[derive(Debug, Default, Clone, Copy)]
pub struct BuiltinProducer;

impl BuiltinProducer {
    /// Create a producer
    pub fn new() -> Self {
        Self
    }

    /// Render the report body
    pub fn render(request: &ReportRequest) -> String {
        let table = request.dataset.table();
        let rows: Vec<&Vec<String>> = request
            .qualifying
            .iter()
            .filter_map(|&i| table.rows().get(i))
            .collect();

        let mut out = String::new();
        let _ = writeln!(
            out,
            "{} Annual Credit Review Report",
            request.category.label()
        );
        let _ = writeln!(
            out,
            "Generated: {}",
            request.generated_at.format("%Y-%m-%d %H:%M")
        );
        let _ = writeln!(out, "Dataset: {}", request.dataset.path().display());
        let _ = writeln!(out, "Qualifying records: {}", rows.len());
        out.push('\n');

        out.push_str("Filter criteria:\n");
        out.push_str(&describe_criteria(&request.columns, &request.products));
        out.push_str("\n\n");

        if let Some(product) = table.column(&request.columns.product) {
            push_counts(&mut out, "Records by product", &rows, product);
        }
        if let Some(summary) = request.columns.summary.as_deref()
            && let Some(column) = table.column(summary)
        {
            push_counts(&mut out, &format!("Records by {summary}"), &rows, column);
        }

        out.push_str("Qualifying records:\n");
        let _ = writeln!(out, "{}", table.headers().join(" | "));
        for row in rows {
            let _ = writeln!(out, "{}", row.join(" | "));
        }
        out
    }
}

fn push_counts(out: &mut String, title: &str, rows: &[&Vec<String>], column: usize) {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for row in rows {
        let key = row[column].trim();
        let key = if key.is_empty() { "(blank)" } else { key };
        *counts.entry(key).or_default() += 1;
    }

    let _ = writeln!(out, "{title}:");
    for (key, count) in counts {
        let _ = writeln!(out, "  {key}: {count}");
    }
    out.push('\n');
}

#[async_trait]
impl ReportProducer for BuiltinProducer {
    async fn generate(&self, request: &ReportRequest) -> Result<ProducerOutput> {
        if request.qualifying.is_empty() {
            return Ok(ProducerOutput::Empty);
        }

        let body = Self::render(request);
        if let Some(parent) = request.output.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&request.output, body).await?;
        Ok(ProducerOutput::Generated(request.output.clone()))
    }

    fn name(&self) -> &'static str {
        "builtin"
    }
}
