//! Tool catalogue and dispatch
//!
//! - `svn_info` - repository and working-copy information
//! - `svn_status` - local modifications in a working copy
//! - `svn_log` - commit history
//! - `svn_diff` - unified diff against BASE or between revisions
//! - `svn_blame` - per-line revision and author
//! - `svn_cat` - file contents at a revision

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::error::{AppError, AppResult};
use crate::server::format;
use crate::svn::client::{
    BlameOptions, CatOptions, DEFAULT_LOG_LIMIT, DiffOptions, LineRange, LogOptions,
    StatusOptions, SvnClient,
};
use crate::svn::executor::CommandRunner;

/// Tool definition as advertised by `tools/list`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub input_schema: Value,
}

/// Result of one tool invocation
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolResult {
    pub content: Vec<ToolContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_error: Option<bool>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type")]
pub enum ToolContent {
    #[serde(rename = "text")]
    Text { text: String },
}

impl ToolResult {
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: vec![ToolContent::Text {
                text: content.into(),
            }],
            is_error: None,
        }
    }

    pub fn error(content: impl Into<String>) -> Self {
        Self {
            is_error: Some(true),
            ..Self::text(content)
        }
    }
}

fn tool(name: &str, description: &str, input_schema: Value) -> ToolDefinition {
    ToolDefinition {
        name: name.to_string(),
        description: description.to_string(),
        input_schema,
    }
}

pub fn get_tool_definitions() -> Vec<ToolDefinition> {
    vec![
        tool(
            "svn_info",
            "Get SVN repository and working copy information including URL, revision, branch type, and last commit details",
            json!({
                "type": "object",
                "properties": {
                    "path": {
                        "type": "string",
                        "description": "Path or URL to query (defaults to current working copy or configured repo)"
                    }
                }
            }),
        ),
        tool(
            "svn_status",
            "Show modified, added, deleted, and untracked files in the SVN working copy",
            json!({
                "type": "object",
                "properties": {
                    "path": {
                        "type": "string",
                        "description": "Working copy path to check (defaults to current directory)"
                    },
                    "show_unversioned": {
                        "type": "boolean",
                        "default": true,
                        "description": "Include unversioned files in output"
                    }
                }
            }),
        ),
        tool(
            "svn_log",
            "Show SVN commit history for repository or specific file. Uses local working copy when possible to avoid network calls.",
            json!({
                "type": "object",
                "properties": {
                    "path": {
                        "type": "string",
                        "description": "File or directory path to show history for"
                    },
                    "limit": {
                        "type": "integer",
                        "default": DEFAULT_LOG_LIMIT,
                        "description": "Maximum number of log entries to show"
                    },
                    "revision": {
                        "type": "string",
                        "description": "Revision or revision range (e.g., \"1000:HEAD\", \"BASE:HEAD\")"
                    },
                    "verbose": {
                        "type": "boolean",
                        "default": false,
                        "description": "Include list of changed paths in each commit"
                    },
                    "search": {
                        "type": "string",
                        "description": "Search pattern to filter log messages"
                    }
                }
            }),
        ),
        tool(
            "svn_diff",
            "Show differences between working copy and BASE, or between revisions. Returns unified diff format.",
            json!({
                "type": "object",
                "properties": {
                    "path": {
                        "type": "string",
                        "description": "File or directory path to diff"
                    },
                    "revision": {
                        "type": "string",
                        "description": "Revision range (e.g., \"1000:1005\", \"BASE:HEAD\")"
                    },
                    "change": {
                        "type": "integer",
                        "description": "Show changes made in a specific revision number"
                    }
                }
            }),
        ),
        tool(
            "svn_blame",
            "Show line-by-line annotation of a file with revision and author information for each line",
            json!({
                "type": "object",
                "properties": {
                    "path": {
                        "type": "string",
                        "description": "File path to annotate"
                    },
                    "revision": {
                        "type": "string",
                        "description": "Annotate up to this revision"
                    },
                    "start_line": {
                        "type": "integer",
                        "description": "Start line number for output"
                    },
                    "end_line": {
                        "type": "integer",
                        "description": "End line number for output"
                    }
                },
                "required": ["path"]
            }),
        ),
        tool(
            "svn_cat",
            "Show contents of a file at a specific revision. Useful for viewing historical versions of a file.",
            json!({
                "type": "object",
                "properties": {
                    "path": {
                        "type": "string",
                        "description": "File path to show"
                    },
                    "revision": {
                        "type": "string",
                        "description": "Revision to show (e.g., \"1000\", \"HEAD\", \"BASE\"). Defaults to working copy version."
                    },
                    "start_line": {
                        "type": "integer",
                        "description": "Start line number for output"
                    },
                    "end_line": {
                        "type": "integer",
                        "description": "End line number for output"
                    }
                },
                "required": ["path"]
            }),
        ),
    ]
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct InfoArgs {
    path: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct StatusArgs {
    path: Option<String>,
    show_unversioned: bool,
}

impl Default for StatusArgs {
    fn default() -> Self {
        Self {
            path: None,
            show_unversioned: true,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct LogArgs {
    path: Option<String>,
    limit: u32,
    revision: Option<String>,
    verbose: bool,
    search: Option<String>,
}

impl Default for LogArgs {
    fn default() -> Self {
        Self {
            path: None,
            limit: DEFAULT_LOG_LIMIT,
            revision: None,
            verbose: false,
            search: None,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct DiffArgs {
    path: Option<String>,
    revision: Option<String>,
    change: Option<u64>,
}

/// Shared by `svn_blame` and `svn_cat`
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct FileArgs {
    path: Option<String>,
    revision: Option<String>,
    start_line: Option<usize>,
    end_line: Option<usize>,
}

fn decode<T: serde::de::DeserializeOwned>(tool: &str, arguments: Value) -> AppResult<T> {
    let arguments = if arguments.is_null() {
        json!({})
    } else {
        arguments
    };

    serde_json::from_value(arguments)
        .map_err(|e| AppError::InvalidArguments(format!("{}: {}", tool, e)))
}

/// Run one tool and render its result as text
///
/// Typed svn failures come back as `AppError::Svn`; the caller decides how to
/// present them.
pub async fn handle_tool_call<R: CommandRunner>(
    client: &SvnClient<R>,
    name: &str,
    arguments: Value,
) -> AppResult<String> {
    tracing::debug!(tool = name, "Dispatching tool call");

    match name {
        "svn_info" => {
            let args: InfoArgs = decode(name, arguments)?;
            let info = client.info(args.path.as_deref()).await?;
            Ok(format::info(&info))
        }
        "svn_status" => {
            let args: StatusArgs = decode(name, arguments)?;
            let options = StatusOptions {
                path: args.path,
                show_unversioned: args.show_unversioned,
            };
            let report = client.status(&options).await?;
            Ok(format::status(&report))
        }
        "svn_log" => {
            let args: LogArgs = decode(name, arguments)?;
            let options = LogOptions {
                path: args.path,
                limit: args.limit,
                revision: args.revision,
                verbose: args.verbose,
                search: args.search,
            };
            let entries = client.log(&options).await?;
            Ok(format::log(&entries, options.verbose))
        }
        "svn_diff" => {
            let args: DiffArgs = decode(name, arguments)?;
            let options = DiffOptions {
                path: args.path,
                revision: args.revision,
                change: args.change,
            };
            let output = client.diff(&options).await?;
            Ok(format::diff(&output, &options))
        }
        "svn_blame" => {
            let args: FileArgs = decode(name, arguments)?;
            let options = BlameOptions {
                path: args.path.unwrap_or_default(),
                revision: args.revision,
                range: LineRange::new(args.start_line, args.end_line),
            };
            let report = client.blame(&options).await?;
            Ok(format::blame(&report, &options))
        }
        "svn_cat" => {
            let args: FileArgs = decode(name, arguments)?;
            let options = CatOptions {
                path: args.path.unwrap_or_default(),
                revision: args.revision,
                range: LineRange::new(args.start_line, args.end_line),
            };
            let content = client.cat(&options).await?;
            Ok(format::cat(&content, &options))
        }
        _ => Err(AppError::UnknownTool(name.to_string())),
    }
}
