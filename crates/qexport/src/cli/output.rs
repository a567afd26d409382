//! Output formatting utilities

use anyhow::{Context, Result};
use colored::Colorize;
use qexport_archive::{ArchiveReport, EntryStatus};
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Set up color output based on user preference
pub fn setup_colors(mode: &str) {
    match mode.to_lowercase().as_str() {
        "always" => colored::control::set_override(true),
        "never" => colored::control::set_override(false),
        // colored already honours NO_COLOR and CLICOLOR
        _ => colored::control::unset_override(),
    }
}

/// Format an error for display
pub fn format_error(error: &anyhow::Error) -> String {
    format!("{} {:#}", "Error:".red().bold(), error)
}

/// Format a warning for display
pub fn format_warning(warning: &str) -> String {
    format!("{} {}", "Warning:".yellow().bold(), warning)
}

/// Format a success message for display
pub fn format_success(message: &str) -> String {
    format!("{} {}", "Success:".green().bold(), message)
}

/// One line per archive entry
pub fn format_report(report: &ArchiveReport) -> String {
    let mut lines = Vec::with_capacity(report.entries.len() + 1);
    for entry in &report.entries {
        let status = match &entry.status {
            EntryStatus::Completed { bytes } => format!("{} ({bytes} bytes)", "ok".green()),
            EntryStatus::Expanded { entries } => format!("{} ({entries} entries)", "expanded".green()),
            EntryStatus::Truncated { bytes, error } => {
                format!("{} after {bytes} bytes: {error}", "truncated".yellow())
            }
            EntryStatus::Interrupted { bytes } => {
                format!("{} after {bytes} bytes", "interrupted".yellow())
            }
            EntryStatus::Skipped => "skipped".yellow().to_string(),
            EntryStatus::Failed { error } => format!("{}: {error}", "failed".red()),
        };
        lines.push(format!("  {} {status}", entry.name.cyan()));
    }
    if report.aborted {
        lines.push(format_warning("export was aborted"));
    }
    lines.join("\n")
}

/// Write output to a file or stdout
pub fn write_output(content: &str, output_file: Option<&Path>) -> Result<()> {
    if let Some(path) = output_file {
        let mut file = File::create(path)
            .with_context(|| format!("Failed to create output file: {}", path.display()))?;
        file.write_all(content.as_bytes())
            .with_context(|| format!("Failed to write to output file: {}", path.display()))?;
        eprintln!(
            "{}",
            format_success(&format!("Output written to {}", path.display()))
        );
    } else {
        println!("{content}");
    }
    Ok(())
}
