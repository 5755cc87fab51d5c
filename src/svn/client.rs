use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::config::Config;
use crate::error::{AppResult, SvnError};
use crate::svn::executor::{CommandRunner, ExecOptions, SvnExecutor};
use crate::svn::parser::{self, BlameLine, InfoRecord, LogEntry, StatusEntry};
use crate::svn::resolver::{
    Operation, PathResolver, RepositoryLocation, absolutize, find_working_copy_root,
};

pub const DEFAULT_LOG_LIMIT: u32 = 10;

/// Inclusive, 1-based line window; open ends default to the first/last line
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LineRange {
    pub start: Option<usize>,
    pub end: Option<usize>,
}

impl LineRange {
    pub fn new(start: Option<usize>, end: Option<usize>) -> Self {
        Self { start, end }
    }

    pub fn is_set(&self) -> bool {
        self.start.is_some() || self.end.is_some()
    }

    /// Concrete bounds for a text of `total` lines
    pub fn bounds(&self, total: usize) -> (usize, usize) {
        (self.start.unwrap_or(1).max(1), self.end.unwrap_or(total))
    }

    pub fn contains(&self, line: usize, total: usize) -> bool {
        let (start, end) = self.bounds(total);
        line >= start && line <= end
    }
}

#[derive(Debug, Clone)]
pub struct StatusOptions {
    pub path: Option<String>,
    pub show_unversioned: bool,
}

impl Default for StatusOptions {
    fn default() -> Self {
        Self {
            path: None,
            show_unversioned: true,
        }
    }
}

#[derive(Debug, Clone)]
pub struct LogOptions {
    pub path: Option<String>,
    pub limit: u32,
    /// Revision or range, e.g. `1000:HEAD`
    pub revision: Option<String>,
    pub verbose: bool,
    pub search: Option<String>,
}

impl Default for LogOptions {
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

#[derive(Debug, Clone, Default)]
pub struct DiffOptions {
    pub path: Option<String>,
    /// Revision range, e.g. `1000:1005`
    pub revision: Option<String>,
    /// Single revision whose changes are shown (`-c`)
    pub change: Option<u64>,
}

#[derive(Debug, Clone, Default)]
pub struct BlameOptions {
    pub path: String,
    pub revision: Option<String>,
    pub range: LineRange,
}

#[derive(Debug, Clone, Default)]
pub struct CatOptions {
    pub path: String,
    pub revision: Option<String>,
    pub range: LineRange,
}

/// Status entries that passed the filter, plus how many were filtered out
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusReport {
    pub entries: Vec<StatusEntry>,
    /// Unversioned entries dropped because `show_unversioned` was off
    pub hidden: usize,
}

/// Blame lines inside the requested window, plus the file's full length
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlameReport {
    pub lines: Vec<BlameLine>,
    pub total_lines: usize,
}

/// File text inside the requested window
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileContent {
    pub lines: Vec<String>,
    /// Line number of `lines[0]`
    pub first_line: usize,
    pub total_lines: usize,
}

/// Read-only svn operations on top of path resolution, execution and parsing
pub struct SvnClient<R: CommandRunner = SvnExecutor> {
    config: Arc<Config>,
    resolver: PathResolver,
    runner: R,
    base_dir: Option<PathBuf>,
}

impl SvnClient<SvnExecutor> {
    pub fn new(config: Arc<Config>) -> Self {
        let runner = SvnExecutor::new(config.clone());
        Self::with_runner(config, runner)
    }
}

impl<R: CommandRunner> SvnClient<R> {
    pub fn with_runner(config: Arc<Config>, runner: R) -> Self {
        Self {
            resolver: PathResolver::new(config.clone()),
            config,
            runner,
            base_dir: None,
        }
    }

    /// Resolve relative paths against `dir` instead of the process directory
    pub fn with_base_dir<P: AsRef<Path>>(mut self, dir: P) -> Self {
        self.base_dir = Some(dir.as_ref().to_path_buf());
        self
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    fn cwd(&self) -> PathBuf {
        match self.base_dir {
            Some(ref dir) => dir.clone(),
            None => std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
        }
    }

    fn resolve(&self, path: Option<&str>, operation: Operation) -> RepositoryLocation {
        self.resolver.resolve_from(&self.cwd(), path, operation)
    }

    async fn info_at(&self, target: &str, options: &ExecOptions) -> AppResult<InfoRecord> {
        let args = vec!["--xml".to_string(), target.to_string()];
        let output = self.runner.execute("info", &args, options).await?;
        Ok(parser::parse_info_xml(&output)?)
    }

    /// Repository and working-copy information
    ///
    /// Without a path, tries the local mirror, then the current directory, then
    /// the configured remote.
    pub async fn info(&self, path: Option<&str>) -> AppResult<InfoRecord> {
        if let Some(path) = path.filter(|p| !p.trim().is_empty()) {
            let location = self.resolve(Some(path), Operation::Info);
            return self
                .info_at(&location.target, &ExecOptions::for_location(&location))
                .await;
        }

        if let Some(ref mirror) = self.config.local_working_copy {
            let options = ExecOptions {
                working_dir: Some(mirror.clone()),
                ..ExecOptions::default()
            };
            match self.info_at(&mirror.to_string_lossy(), &options).await {
                Ok(info) => return Ok(info),
                Err(e) => tracing::debug!(error = %e, "Local mirror info failed"),
            }
        }

        let options = ExecOptions {
            working_dir: Some(self.cwd()),
            ..ExecOptions::default()
        };
        match self.info_at(".", &options).await {
            Ok(info) => return Ok(info),
            Err(e) => tracing::debug!(error = %e, "Current directory is not a working copy"),
        }

        if let Some(url) = self.resolver.remote_url("") {
            let options = ExecOptions {
                use_credentials: true,
                ..ExecOptions::default()
            };
            return self.info_at(&url, &options).await;
        }

        Err(SvnError::not_working_copy(
            "No SVN working copy found and no repository URL configured",
        )
        .into())
    }

    /// Working-copy status; the target must be inside a working copy
    pub async fn status(&self, options: &StatusOptions) -> AppResult<StatusReport> {
        let cwd = self.cwd();
        let target = match options.path.as_deref().filter(|p| !p.trim().is_empty()) {
            Some(path) => absolutize(&cwd, Path::new(path)),
            None => cwd,
        };

        let Some(root) = find_working_copy_root(&target) else {
            return Err(SvnError::not_working_copy(
                "The specified path is not within an SVN working copy",
            )
            .into());
        };

        let args = vec!["--xml".to_string(), target.to_string_lossy().into_owned()];
        let exec = ExecOptions {
            working_dir: Some(root),
            ..ExecOptions::default()
        };
        let output = self.runner.execute("status", &args, &exec).await?;
        let mut entries = parser::parse_status_xml(&output)?;

        let before = entries.len();
        if !options.show_unversioned {
            entries.retain(|e| e.status_code != '?');
        }
        let hidden = before - entries.len();

        Ok(StatusReport { entries, hidden })
    }

    /// Commit history, newest first as reported by svn
    pub async fn log(&self, options: &LogOptions) -> AppResult<Vec<LogEntry>> {
        let location = match options.path.as_deref().filter(|p| !p.trim().is_empty()) {
            Some(path) => self.resolve(Some(path), Operation::Log),
            None => self.default_log_location(),
        };

        let mut args = vec![
            "--xml".to_string(),
            "-l".to_string(),
            options.limit.to_string(),
        ];
        if options.verbose {
            args.push("-v".to_string());
        }
        if let Some(ref revision) = options.revision {
            args.push("-r".to_string());
            args.push(revision.clone());
        }
        if let Some(ref search) = options.search {
            args.push("--search".to_string());
            args.push(search.clone());
        }
        args.push(location.target.clone());

        let output = self
            .runner
            .execute("log", &args, &ExecOptions::for_location(&location))
            .await?;

        Ok(parser::parse_log_xml(&output)?)
    }

    fn default_log_location(&self) -> RepositoryLocation {
        if let Some(ref mirror) = self.config.local_working_copy {
            return RepositoryLocation {
                target: mirror.to_string_lossy().into_owned(),
                use_credentials: false,
                working_dir: Some(mirror.clone()),
            };
        }

        if let Some(url) = self.resolver.remote_url("") {
            return RepositoryLocation {
                target: url,
                use_credentials: true,
                working_dir: None,
            };
        }

        RepositoryLocation {
            target: ".".to_string(),
            use_credentials: false,
            working_dir: Some(self.cwd()),
        }
    }

    /// Unified diff text; empty when there are no differences
    pub async fn diff(&self, options: &DiffOptions) -> AppResult<String> {
        let mut location = match options.path.as_deref().filter(|p| !p.trim().is_empty()) {
            Some(path) => self.resolve(Some(path), Operation::Diff),
            None => {
                let cwd = self.cwd();
                RepositoryLocation {
                    target: cwd.to_string_lossy().into_owned(),
                    use_credentials: false,
                    working_dir: find_working_copy_root(&cwd),
                }
            }
        };

        let mut args = Vec::new();
        if let Some(change) = options.change {
            args.push("-c".to_string());
            args.push(change.to_string());
            // Cross-revision diffs go to the server
            location.use_credentials = true;
        } else if let Some(ref revision) = options.revision {
            args.push("-r".to_string());
            args.push(revision.clone());
            if revision != "BASE" {
                location.use_credentials = true;
            }
        }
        args.push(location.target.clone());

        let output = self
            .runner
            .execute("diff", &args, &ExecOptions::for_location(&location))
            .await?;

        Ok(output)
    }

    /// Per-line revision and author, limited to `options.range`
    pub async fn blame(&self, options: &BlameOptions) -> AppResult<BlameReport> {
        if options.path.trim().is_empty() {
            return Err(SvnError::file_not_found("Path is required for blame operation").into());
        }

        let location = self.resolve(Some(&options.path), Operation::Blame);
        let mut args = Vec::new();
        if let Some(ref revision) = options.revision {
            args.push("-r".to_string());
            args.push(revision.clone());
        }
        args.push(location.target.clone());

        let output = self
            .runner
            .execute("blame", &args, &ExecOptions::for_location(&location))
            .await?;

        if output.trim().is_empty() {
            return Ok(BlameReport {
                lines: Vec::new(),
                total_lines: 0,
            });
        }

        let all = parser::parse_blame(&output);
        let total_lines = all.len();
        let lines = all
            .into_iter()
            .filter(|l| options.range.contains(l.line_number, total_lines))
            .collect();

        Ok(BlameReport { lines, total_lines })
    }

    /// File contents at a revision, limited to `options.range`
    pub async fn cat(&self, options: &CatOptions) -> AppResult<FileContent> {
        if options.path.trim().is_empty() {
            return Err(SvnError::file_not_found("Path is required for cat operation").into());
        }

        let location = self.resolve(Some(&options.path), Operation::Cat);
        let mut args = Vec::new();
        if let Some(ref revision) = options.revision {
            args.push("-r".to_string());
            args.push(revision.clone());
        }
        args.push(location.target.clone());

        let output = self
            .runner
            .execute("cat", &args, &ExecOptions::for_location(&location))
            .await?;

        let all: Vec<&str> = output.lines().collect();
        let total_lines = all.len();
        let (start, end) = options.range.bounds(total_lines);
        let end = end.min(total_lines);

        let lines = if start > end {
            Vec::new()
        } else {
            all[start - 1..end].iter().map(|l| l.to_string()).collect()
        };

        Ok(FileContent {
            lines,
            first_line: start,
            total_lines,
        })
    }
}
