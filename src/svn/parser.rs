use regex::Regex;
use serde::Serialize;
use std::sync::LazyLock;

use crate::error::{ParseError, ParseResult};
use crate::svn::branch::{BranchInfo, classify_url};
use crate::svn::xml::{XmlElement, parse_document};

/// Parse `svn info --xml` output
pub fn parse_info_xml(xml: &str) -> ParseResult<InfoRecord> {
    let doc = parse_document(xml)?;
    let entry = doc
        .descend(&["info", "entry"])
        .ok_or_else(|| ParseError("Invalid SVN info XML output".to_string()))?;

    let url = entry.child_text("url").to_string();
    let branch = classify_url(&url);
    let repository = entry.first("repository");
    let commit = entry.first("commit");
    let wc_root = entry
        .descend(&["wc-info", "wcroot-abspath"])
        .map(|e| e.text.clone())
        .filter(|s| !s.is_empty());

    Ok(InfoRecord {
        path: entry.attr("path").unwrap_or("").to_string(),
        relative_url: entry.child_text("relative-url").to_string(),
        repository_root: repository.map(|r| r.child_text("root")).unwrap_or("").to_string(),
        repository_uuid: repository.map(|r| r.child_text("uuid")).unwrap_or("").to_string(),
        revision: entry.attr_u64("revision"),
        node_kind: entry.attr("kind").unwrap_or("").to_string(),
        last_changed_author: commit.map(|c| c.child_text("author")).unwrap_or("").to_string(),
        last_changed_rev: commit.map(|c| c.attr_u64("revision")).unwrap_or(0),
        last_changed_date: commit.map(|c| c.child_text("date")).unwrap_or("").to_string(),
        wc_root,
        branch: Some(branch),
        url,
    })
}

/// Parse `svn status --xml` output; no target or no entries gives an empty list
pub fn parse_status_xml(xml: &str) -> ParseResult<Vec<StatusEntry>> {
    let doc = parse_document(xml)?;
    let Some(status) = doc.first("status") else {
        return Ok(Vec::new());
    };

    let entries = status
        .children_named("target")
        .into_iter()
        .flat_map(|target| target.children_named("entry"))
        .map(status_entry)
        .collect();

    Ok(entries)
}

fn status_entry(entry: &XmlElement) -> StatusEntry {
    let wc_status = entry.first("wc-status");
    let item = wc_status
        .and_then(|w| w.attr("item"))
        .filter(|s| !s.is_empty())
        .unwrap_or("normal");
    let props = wc_status
        .and_then(|w| w.attr("props"))
        .filter(|s| !s.is_empty())
        .unwrap_or("none");

    let commit = wc_status.and_then(|w| w.first("commit")).map(|c| CommitSummary {
        revision: c.attr_u64("revision"),
        author: c.child_text("author").to_string(),
        date: c.child_text("date").to_string(),
    });

    StatusEntry {
        path: entry.attr("path").unwrap_or("").to_string(),
        status: item.to_string(),
        status_code: status_code(item),
        props: props.to_string(),
        props_code: status_code(props),
        revision: wc_status
            .and_then(|w| w.attr("revision"))
            .and_then(|r| r.parse().ok()),
        commit,
    }
}

/// Single-letter code for a status item word
pub fn status_code(item: &str) -> char {
    match item {
        "added" => 'A',
        "conflicted" => 'C',
        "deleted" => 'D',
        "ignored" => 'I',
        "modified" => 'M',
        "replaced" => 'R',
        "external" => 'X',
        "unversioned" => '?',
        "missing" | "incomplete" => '!',
        "obstructed" => '~',
        "normal" | "none" => ' ',
        "merged" => 'G',
        other => other
            .chars()
            .next()
            .map(|c| c.to_ascii_uppercase())
            .unwrap_or(' '),
    }
}

/// Parse `svn log --xml` output; entries keep server order
pub fn parse_log_xml(xml: &str) -> ParseResult<Vec<LogEntry>> {
    let doc = parse_document(xml)?;
    let Some(log) = doc.first("log") else {
        return Ok(Vec::new());
    };

    let entries = log
        .children_named("logentry")
        .into_iter()
        .map(|entry| {
            let paths = entry.first("paths").map(|paths| {
                paths
                    .children_named("path")
                    .into_iter()
                    .map(log_path_change)
                    .collect()
            });

            LogEntry {
                revision: entry.attr_u64("revision"),
                author: entry.child_text("author").to_string(),
                date: entry.child_text("date").to_string(),
                message: entry.child_text("msg").to_string(),
                paths,
            }
        })
        .collect();

    Ok(entries)
}

fn log_path_change(path: &XmlElement) -> LogPathChange {
    // A bare <path> with no attributes is reported as a modified file
    if path.attributes.is_empty() {
        return LogPathChange {
            action: "M".to_string(),
            kind: "file".to_string(),
            path: path.text.clone(),
            copyfrom_path: None,
            copyfrom_rev: None,
        };
    }

    LogPathChange {
        action: path.attr("action").unwrap_or("").to_string(),
        kind: path.attr("kind").unwrap_or("").to_string(),
        path: path.text.clone(),
        copyfrom_path: path.attr("copyfrom-path").map(str::to_string),
        copyfrom_rev: path.attr("copyfrom-rev").and_then(|r| r.parse().ok()),
    }
}

static BLAME_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(\d+)\s+(\S+)\s(.*)$").expect("blame line pattern is valid")
});

/// Parse `svn blame` text output
///
/// Line numbers follow input order starting at 1. Lines that do not look like
/// `<rev> <author> <content>` are kept with revision 0 and an empty author.
/// Authors containing whitespace are not supported and will be split.
pub fn parse_blame(output: &str) -> Vec<BlameLine> {
    output
        .lines()
        .enumerate()
        .map(|(idx, line)| {
            let line_number = idx + 1;
            match BLAME_LINE.captures(line) {
                Some(caps) => BlameLine {
                    line_number,
                    revision: caps[1].parse().unwrap_or(0),
                    author: caps[2].to_string(),
                    content: caps[3].to_string(),
                },
                None => BlameLine {
                    line_number,
                    revision: 0,
                    author: String::new(),
                    content: line.to_string(),
                },
            }
        })
        .collect()
}

/// Result of `svn info`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct InfoRecord {
    pub path: String,
    pub url: String,
    pub relative_url: String,
    pub repository_root: String,
    pub repository_uuid: String,
    pub revision: u64,
    pub node_kind: String,
    pub last_changed_author: String,
    pub last_changed_rev: u64,
    pub last_changed_date: String,
    pub wc_root: Option<String>,
    pub branch: Option<BranchInfo>,
}

/// One line of `svn status`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusEntry {
    pub path: String,
    /// Item word as reported, e.g. `modified`
    pub status: String,
    pub status_code: char,
    pub props: String,
    pub props_code: char,
    pub revision: Option<u64>,
    pub commit: Option<CommitSummary>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommitSummary {
    pub revision: u64,
    pub author: String,
    pub date: String,
}

/// One revision from `svn log`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LogEntry {
    pub revision: u64,
    pub author: String,
    pub date: String,
    pub message: String,
    pub paths: Option<Vec<LogPathChange>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LogPathChange {
    pub action: String,
    pub kind: String,
    pub path: String,
    pub copyfrom_path: Option<String>,
    pub copyfrom_rev: Option<u64>,
}

/// One annotated line from `svn blame`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BlameLine {
    pub line_number: usize,
    pub revision: u64,
    pub author: String,
    pub content: String,
}
