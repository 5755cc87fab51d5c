use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use crate::config::Config;

/// Directory that marks the root of an svn working copy
pub const WORKING_COPY_MARKER: &str = ".svn";

const REMOTE_SCHEMES: [&str; 5] = ["svn://", "svn+ssh://", "http://", "https://", "file://"];

/// The operation a path is being resolved for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Info,
    Status,
    Log,
    Diff,
    Blame,
    Cat,
}

/// Where and how to run svn for one request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryLocation {
    /// Local path or repository URL passed to svn; never empty
    pub target: String,
    pub use_credentials: bool,
    pub working_dir: Option<PathBuf>,
}

/// Check if a string is a repository URL rather than a filesystem path
pub fn is_remote_url(input: &str) -> bool {
    REMOTE_SCHEMES.iter().any(|scheme| input.starts_with(scheme))
}

/// Check if a directory carries working-copy metadata
pub fn is_working_copy(path: &Path) -> bool {
    path.join(WORKING_COPY_MARKER).exists()
}

/// Walk upward from `start` to find the nearest working-copy root
pub fn find_working_copy_root<P: AsRef<Path>>(start: P) -> Option<PathBuf> {
    let mut current = Some(start.as_ref());

    while let Some(dir) = current {
        if is_working_copy(dir) {
            return Some(dir.to_path_buf());
        }
        current = dir.parent();
    }

    None
}

/// Join URL segments with exactly one `/` between them, skipping empty ones
pub fn join_url(base: &str, segments: &[&str]) -> String {
    let mut url = base.trim_end_matches('/').to_string();

    for segment in segments {
        let segment = segment.trim_matches('/');
        if segment.is_empty() {
            continue;
        }
        url.push('/');
        url.push_str(segment);
    }

    url
}

/// Make `path` absolute against `cwd` and fold `.`/`..` components lexically
pub fn absolutize(cwd: &Path, path: &Path) -> PathBuf {
    let joined = if path.is_absolute() {
        path.to_path_buf()
    } else {
        cwd.join(path)
    };

    let mut normalized = PathBuf::new();
    for component in joined.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                normalized.pop();
            }
            other => normalized.push(other.as_os_str()),
        }
    }

    normalized
}

/// `relative` joined under `mirror`; `None` for absolute paths or ones that climb out
fn mirror_candidate(mirror: &Path, relative: &str) -> Option<PathBuf> {
    let relative = Path::new(relative);
    if relative.has_root() {
        return None;
    }

    let base = absolutize(mirror, Path::new(""));
    absolutize(&base, relative)
        .starts_with(&base)
        .then(|| mirror.join(relative))
}

/// Decides for each request whether svn runs locally or against the server
#[derive(Debug, Clone)]
pub struct PathResolver {
    config: Arc<Config>,
}

impl PathResolver {
    pub fn new(config: Arc<Config>) -> Self {
        Self { config }
    }

    /// Resolve relative to the process working directory
    pub fn resolve(&self, input: Option<&str>, operation: Operation) -> RepositoryLocation {
        let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        self.resolve_from(&cwd, input, operation)
    }

    /// Resolve `input` relative to `cwd`
    ///
    /// Order is fixed: remote URL, enclosing working copy, configured local
    /// mirror, configured remote, and finally the bare local path. Never fails;
    /// a target that is not usable shows up as an svn error when executed.
    pub fn resolve_from(
        &self,
        cwd: &Path,
        input: Option<&str>,
        operation: Operation,
    ) -> RepositoryLocation {
        let input = input.map(str::trim).filter(|s| !s.is_empty());

        if let Some(url) = input.filter(|s| is_remote_url(s)) {
            tracing::debug!(?operation, target = url, "Resolved as remote URL");
            return RepositoryLocation {
                target: url.to_string(),
                use_credentials: true,
                working_dir: None,
            };
        }

        let relative = input.unwrap_or(".");
        let absolute = absolutize(cwd, Path::new(relative));

        if let Some(root) = find_working_copy_root(&absolute) {
            tracing::debug!(?operation, root = %root.display(), "Resolved inside working copy");
            return RepositoryLocation {
                target: absolute.to_string_lossy().into_owned(),
                use_credentials: false,
                working_dir: Some(root),
            };
        }

        if let Some(ref mirror) = self.config.local_working_copy {
            let candidate = match input {
                Some(path) => mirror_candidate(mirror, path),
                None => Some(mirror.clone()),
            };
            if let Some(candidate) = candidate.filter(|c| c.exists()) {
                tracing::debug!(?operation, mirror = %mirror.display(), "Resolved in local mirror");
                return RepositoryLocation {
                    target: candidate.to_string_lossy().into_owned(),
                    use_credentials: false,
                    working_dir: Some(mirror.clone()),
                };
            }
        }

        let remote_relative = input.map(|p| p.trim_start_matches("./")).unwrap_or("");
        if let Some(url) = self.remote_url(remote_relative) {
            tracing::debug!(?operation, target = %url, "Resolved against configured remote");
            return RepositoryLocation {
                target: url,
                use_credentials: true,
                working_dir: None,
            };
        }

        tracing::debug!(?operation, target = %absolute.display(), "No working copy or remote, using local path");
        RepositoryLocation {
            target: absolute.to_string_lossy().into_owned(),
            use_credentials: false,
            working_dir: None,
        }
    }

    /// Configured remote location, optionally extended by `relative`
    ///
    /// A trunk path that is itself a URL wins over `repo_url`.
    pub fn remote_url(&self, relative: &str) -> Option<String> {
        if let Some(trunk) = self.config.trunk_url() {
            return Some(join_url(trunk, &[relative]));
        }

        let repo = self.config.repo_url.as_deref()?;
        let trunk = self.config.trunk_path.as_deref().unwrap_or("");
        Some(join_url(repo, &[trunk, relative]))
    }
}
