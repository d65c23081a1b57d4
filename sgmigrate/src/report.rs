use colored::Colorize;
use config_trace::ConfigValidationError;
use serde::Serialize;

use crate::migrate::{MigrationReporter, Problem};
use crate::migration_summary::MigrationSummary;

/// Render validation failures, one line per offending path.
pub fn render_validation_errors(errors: &[ConfigValidationError]) -> String {
    let mut out = Vec::new();
    for error in errors {
        let file = error.file.as_deref().unwrap_or("<document>");
        out.push(format!("{} {}", "invalid".red().bold(), file));
        for entry in &error.errors {
            let path = if entry.path.is_empty() {
                "<root>"
            } else {
                entry.path.as_str()
            };
            out.push(format!("  {}: {}", path.yellow(), entry.kind));
        }
    }
    out.join("\n")
}

/// The reporter's grouped summary, tinted by whether anything was found.
pub fn render_migration_summary(reporter: &MigrationReporter, title: &str) -> String {
    let summary = reporter.generate_summary(title);
    if reporter.is_empty() {
        summary.green().to_string()
    } else {
        summary.yellow().to_string()
    }
}

#[derive(Debug, Serialize)]
struct JsonReport<'a> {
    summary: &'a MigrationSummary,
    problems: &'a [Problem],
}

/// Machine readable form of one run.
pub fn render_json(
    summary: &MigrationSummary,
    problems: &[Problem],
) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&JsonReport { summary, problems })
}
