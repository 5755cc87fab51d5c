//! Plain-text rendering of query results for tool responses

use chrono::{DateTime, Utc};

use crate::error::SvnError;
use crate::svn::client::{
    BlameOptions, BlameReport, CatOptions, DiffOptions, FileContent, StatusReport,
};
use crate::svn::parser::{InfoRecord, LogEntry, StatusEntry};

const LOG_SEPARATOR_WIDTH: usize = 60;

const STATUS_GROUPS: [&str; 7] = [
    "Modified",
    "Added",
    "Deleted",
    "Conflicted",
    "Missing",
    "Unversioned",
    "Other",
];

/// Render a typed svn error the way tool callers expect it
pub fn svn_error(err: &SvnError) -> String {
    let mut text = format!("Error: {}\nCode: {}", err, err.kind().code());
    if let Some(details) = err.details().filter(|d| !d.is_empty()) {
        text.push_str("\nDetails: ");
        text.push_str(details);
    }
    text
}

pub fn info(info: &InfoRecord) -> String {
    let mut lines = vec![
        format!("Path: {}", info.path),
        format!("URL: {}", info.url),
        format!("Relative URL: {}", info.relative_url),
        format!("Repository Root: {}", info.repository_root),
        format!("Repository UUID: {}", info.repository_uuid),
        format!("Revision: {}", info.revision),
        format!("Node Kind: {}", info.node_kind),
        format!("Last Changed Author: {}", info.last_changed_author),
        format!("Last Changed Rev: {}", info.last_changed_rev),
        format!("Last Changed Date: {}", info.last_changed_date),
    ];

    if let Some(ref root) = info.wc_root {
        lines.push(format!("Working Copy Root Path: {}", root));
    }

    if let Some(ref branch) = info.branch {
        lines.push(format!("Branch Type: {}", branch.branch_type));
        if let Some(ref name) = branch.name {
            lines.push(format!("Branch Name: {}", name));
        }
    }

    lines.join("\n")
}

fn status_label(code: char) -> &'static str {
    match code {
        'M' => "Modified",
        'A' => "Added",
        'D' => "Deleted",
        'C' => "Conflicted",
        '?' => "Unversioned",
        '!' => "Missing",
        _ => "Other",
    }
}

/// Group entries by status, in a fixed group order
pub fn status(report: &StatusReport) -> String {
    let entries = &report.entries;
    if entries.is_empty() {
        return if report.hidden > 0 {
            "No changes in working copy (unversioned files hidden).".to_string()
        } else {
            "No changes in working copy.".to_string()
        };
    }

    let count = entries.len();
    let mut lines = vec![format!(
        "Working copy status ({} item{}):",
        count,
        if count == 1 { "" } else { "s" }
    )];

    for label in STATUS_GROUPS {
        let paths: Vec<&str> = entries
            .iter()
            .filter(|e| status_label(e.status_code) == label)
            .map(|e| e.path.as_str())
            .collect();
        if paths.is_empty() {
            continue;
        }

        lines.push(String::new());
        lines.push(format!("{}:", label));
        lines.extend(paths.iter().map(|p| format!("  {}", p)));
    }

    lines.join("\n")
}

/// Render an svn timestamp like `Jan 15, 2024, 10:30 AM` (UTC); unparsable input is returned as-is
pub fn log_date(raw: &str) -> String {
    match raw.parse::<DateTime<Utc>>() {
        Ok(date) => date.format("%b %-d, %Y, %I:%M %p").to_string(),
        Err(_) => raw.to_string(),
    }
}

pub fn log(entries: &[LogEntry], verbose: bool) -> String {
    if entries.is_empty() {
        return "No log entries found.".to_string();
    }

    let mut lines = Vec::new();
    for entry in entries {
        lines.push("─".repeat(LOG_SEPARATOR_WIDTH));
        lines.push(format!(
            "r{} | {} | {}",
            entry.revision,
            entry.author,
            log_date(&entry.date)
        ));
        lines.push(String::new());

        let message = entry.message.trim();
        if message.is_empty() {
            lines.push("(no message)".to_string());
        } else {
            lines.push(message.to_string());
        }

        if verbose {
            if let Some(paths) = entry.paths.as_ref().filter(|p| !p.is_empty()) {
                lines.push(String::new());
                lines.push("Changed paths:".to_string());
                for change in paths {
                    let mut line = format!("  {} {}", change.action, change.path);
                    if let Some(ref from) = change.copyfrom_path {
                        let rev = change
                            .copyfrom_rev
                            .map(|r| r.to_string())
                            .unwrap_or_default();
                        line.push_str(&format!(" (from {}:{})", from, rev));
                    }
                    lines.push(line);
                }
            }
        }

        lines.push(String::new());
    }

    lines.join("\n")
}

pub fn diff(output: &str, options: &DiffOptions) -> String {
    if output.trim().is_empty() {
        return "No differences found.".to_string();
    }

    let header = match (options.change, options.revision.as_deref()) {
        (Some(change), _) => format!("Changes in revision {}:", change),
        (None, Some(revision)) => format!("Diff for revision range {}:", revision),
        (None, None) => "Working copy changes (BASE vs working copy):".to_string(),
    };

    format!("{}\n\n{}", header, output)
}

pub fn blame(report: &BlameReport, options: &BlameOptions) -> String {
    if report.total_lines == 0 {
        return "No blame output (file may be empty or binary).".to_string();
    }
    if report.lines.is_empty() {
        return "No lines found in specified range.".to_string();
    }

    let mut lines = vec![format!("Blame for: {}", options.path)];
    if options.range.is_set() {
        let (start, end) = options.range.bounds(report.total_lines);
        lines.push(format!("Lines {} to {}", start, end));
    }
    lines.push(String::new());

    let rev_width = report
        .lines
        .iter()
        .map(|l| l.revision.to_string().len())
        .max()
        .unwrap_or(1);
    let author_width = report
        .lines
        .iter()
        .map(|l| l.author.chars().count())
        .max()
        .unwrap_or(0);
    let line_width = report
        .lines
        .iter()
        .map(|l| l.line_number.to_string().len())
        .max()
        .unwrap_or(1);

    for line in &report.lines {
        lines.push(format!(
            "{:>rw$} {:<aw$} {:>lw$}: {}",
            line.revision,
            line.author,
            line.line_number,
            line.content,
            rw = rev_width,
            aw = author_width,
            lw = line_width,
        ));
    }

    lines.join("\n")
}

pub fn cat(content: &FileContent, options: &CatOptions) -> String {
    if content.total_lines == 0 {
        return "File is empty or binary.".to_string();
    }

    let mut lines = vec![format!("File: {}", options.path)];
    if let Some(ref revision) = options.revision {
        lines.push(format!("Revision: {}", revision));
    }
    if options.range.is_set() {
        let (_, end) = options.range.bounds(content.total_lines);
        lines.push(format!(
            "Lines {} to {} of {}",
            content.first_line,
            end.min(content.total_lines),
            content.total_lines
        ));
    }
    lines.push(String::new());

    let last = content.first_line + content.lines.len().saturating_sub(1);
    let width = last.to_string().len();
    for (offset, text) in content.lines.iter().enumerate() {
        lines.push(format!(
            "{:>width$}: {}",
            content.first_line + offset,
            text,
            width = width
        ));
    }

    lines.join("\n")
}
