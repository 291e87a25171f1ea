//! Message templates, one per scenario

use crate::config::ReportsConfig;
use crate::reports::filter::describe_criteria;
use crate::types::{Category, ReportResult, ReportStatus, Scenario};
use chrono::NaiveDate;
use std::fmt::Write;
use std::path::PathBuf;

/// Why a category has no deliverable report
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Unavailability {
    /// Generation ran and nothing qualified
    NoQualifyingRecords,
    /// Generation ran and failed
    GenerationError(String),
    /// Generation never ran because no dataset was acquired
    ExtractionFailed {
        /// Attempts made before giving up
        attempts: usize,
    },
}

impl std::fmt::Display for Unavailability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Unavailability::NoQualifyingRecords => {
                f.write_str("no qualifying records matched the filter criteria")
            }
            Unavailability::GenerationError(cause) => write!(f, "generation error: {cause}"),
            Unavailability::ExtractionFailed { attempts } => {
                write!(f, "extraction failed after {attempts} attempts")
            }
        }
    }
}

/// Extraction failure details surfaced in the NONE message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionSummary {
    /// Number of attempts made
    pub attempts: usize,
    /// Cause of the final attempt
    pub last_cause: String,
}

/// Inputs to message rendering
#[derive(Debug, Clone, Copy)]
pub struct MessageContext<'a> {
    /// Scenario of the run
    pub scenario: Scenario,
    /// Report results in category order
    pub reports: &'a [ReportResult],
    /// Set when no dataset was acquired
    pub extraction: Option<&'a ExtractionSummary>,
    /// Report settings, for criteria text
    pub settings: &'a ReportsConfig,
    /// Date shown in subjects
    pub date: NaiveDate,
    /// Closing signature
    pub signature: &'a str,
}

/// A rendered message, before recipients are resolved
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    /// Template identifier
    pub template: &'static str,
    /// Subject line
    pub subject: String,
    /// Plain-text body
    pub body: String,
    /// Files to attach
    pub attachments: Vec<PathBuf>,
}

/// Template identifier for a scenario
pub fn template_id(scenario: Scenario) -> &'static str {
    match scenario {
        Scenario::Both => "both_reports",
        Scenario::OnlyA => "only_auto_finance",
        Scenario::OnlyB => "only_three_wheeler",
        Scenario::None => "no_data",
    }
}

/// Why `result` is unavailable, or `None` when it was generated
pub fn unavailability(
    result: &ReportResult,
    extraction: Option<&ExtractionSummary>,
) -> Option<Unavailability> {
    if let Some(extraction) = extraction {
        return Some(Unavailability::ExtractionFailed {
            attempts: extraction.attempts,
        });
    }
    match &result.status {
        ReportStatus::Generated { .. } => None,
        ReportStatus::Empty => Some(Unavailability::NoQualifyingRecords),
        ReportStatus::Failed { cause } => Some(Unavailability::GenerationError(cause.clone())),
    }
}

fn result_for(reports: &[ReportResult], category: Category) -> Option<&ReportResult> {
    reports.iter().find(|r| r.category == category)
}

fn reason_for(ctx: &MessageContext<'_>, category: Category) -> Unavailability {
    match result_for(ctx.reports, category) {
        Some(result) => unavailability(result, ctx.extraction)
            .unwrap_or_else(|| Unavailability::GenerationError("report missing".to_string())),
        None => match ctx.extraction {
            Some(e) => Unavailability::ExtractionFailed {
                attempts: e.attempts,
            },
            None => Unavailability::GenerationError("no result recorded".to_string()),
        },
    }
}

fn file_name(path: &std::path::Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn sign(body: &mut String, signature: &str) {
    let _ = write!(body, "\nBest regards,\n{signature}");
}

/// Render the message for the run's scenario
///
/// Attachments are exactly the generated artifacts: two for BOTH, one for
/// ONLY_A and ONLY_B, none for NONE.
pub fn render(ctx: &MessageContext<'_>) -> Message {
    let date = ctx.date.format("%Y-%m-%d");
    let attachments: Vec<PathBuf> = Category::ALL
        .iter()
        .filter_map(|&c| result_for(ctx.reports, c).and_then(ReportResult::artifact))
        .cloned()
        .collect();

    let mut body = String::from("Dear Team,\n\n");
    let subject = match ctx.scenario {
        Scenario::Both => {
            body.push_str("Please find attached the Annual Credit Review Reports.\n\nReports included:\n");
            for (index, category) in Category::ALL.iter().enumerate() {
                let result = result_for(ctx.reports, *category);
                let _ = write!(body, "{}. {} Annual Review Report", index + 1, category.label());
                if let Some(artifact) = result.and_then(ReportResult::artifact) {
                    let _ = write!(body, " ({})", file_name(artifact));
                }
                if let Some(rows) = result.and_then(|r| r.qualifying_rows) {
                    let _ = write!(body, ", {rows} qualifying records");
                }
                body.push('\n');
            }
            format!("Annual Credit Review Reports - {date}")
        }
        Scenario::OnlyA | Scenario::OnlyB => {
            let available = if ctx.scenario == Scenario::OnlyA {
                Category::A
            } else {
                Category::B
            };
            let other = available.other();
            let result = result_for(ctx.reports, available);

            let _ = writeln!(
                body,
                "Please find attached the Annual Credit Review Report for {} facilities.\n",
                available.label()
            );
            let _ = write!(body, "Report included:\n1. {} Annual Review Report", available.label());
            if let Some(rows) = result.and_then(|r| r.qualifying_rows) {
                let _ = write!(body, " ({rows} qualifying records)");
            }
            body.push_str("\n\n");
            let _ = writeln!(
                body,
                "Note: the {} report was not generated: {}",
                other.label(),
                reason_for(ctx, other)
            );
            if reason_for(ctx, other) == Unavailability::NoQualifyingRecords {
                let _ = writeln!(
                    body,
                    "\n{} filter criteria applied:\n{}",
                    other.label(),
                    describe_criteria(&ctx.settings.columns, &ctx.settings.category(other).products)
                );
            }
            format!(
                "Annual Credit Review Report - {} - {date}",
                available.label()
            )
        }
        Scenario::None => {
            body.push_str("No Annual Credit Review report is available for this run.\n\n");
            if let Some(extraction) = ctx.extraction {
                let _ = writeln!(
                    body,
                    "Root cause: the dataset could not be extracted ({}).\nLast error: {}",
                    Unavailability::ExtractionFailed {
                        attempts: extraction.attempts
                    },
                    extraction.last_cause
                );
            } else {
                for category in Category::ALL {
                    let reason = reason_for(ctx, category);
                    let _ = writeln!(body, "{} Report: {reason}", category.label());
                    if reason == Unavailability::NoQualifyingRecords {
                        let _ = writeln!(
                            body,
                            "Filter criteria applied:\n{}",
                            describe_criteria(
                                &ctx.settings.columns,
                                &ctx.settings.category(category).products
                            )
                        );
                    }
                    body.push('\n');
                }
                body.push_str(
                    "Please review the data source and filtering criteria if this is unexpected.\n",
                );
            }
            format!("Annual Credit Review - No Data Available for Both Reports - {date}")
        }
    };

    sign(&mut body, ctx.signature);

    Message {
        template: template_id(ctx.scenario),
        subject,
        body,
        attachments,
    }
}
