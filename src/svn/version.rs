use std::time::Duration;

use crate::error::{AppResult, ParseError, ParseResult};
use crate::svn::executor::{CommandRunner, ExecOptions};

/// Version check timeout; the check only has to start the binary
const VERSION_CHECK_TIMEOUT: Duration = Duration::from_secs(5);

/// Represents an svn client version
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct SvnVersion {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
}

impl SvnVersion {
    /// Ask the installed svn client for its version
    pub async fn detect<R: CommandRunner + ?Sized>(runner: &R) -> AppResult<Self> {
        let options = ExecOptions::default().with_timeout(VERSION_CHECK_TIMEOUT);
        let output = runner
            .execute("--version", &["--quiet".to_string()], &options)
            .await?;

        Ok(Self::parse(&output)?)
    }

    /// Parse `1.14.2` (from `--quiet`) or `svn, version 1.14.2 (r1899510)`
    pub fn parse(version_str: &str) -> ParseResult<Self> {
        let first_line = version_str.lines().next().unwrap_or("").trim();
        let token = match first_line.strip_prefix("svn, version") {
            Some(rest) => rest.split_whitespace().next().unwrap_or(""),
            None => first_line.split_whitespace().next().unwrap_or(""),
        };

        let nums: Vec<&str> = token.split('.').collect();
        if nums.len() < 2 {
            return Err(ParseError(format!(
                "Unexpected svn version format: {}",
                version_str.trim()
            )));
        }

        let major = nums[0]
            .parse::<u32>()
            .map_err(|_| ParseError(format!("Invalid major version: {}", nums[0])))?;

        let minor = nums[1]
            .parse::<u32>()
            .map_err(|_| ParseError(format!("Invalid minor version: {}", nums[1])))?;

        // Patch may carry suffixes such as "-dev"
        let patch = nums
            .get(2)
            .map(|p| {
                p.chars()
                    .take_while(|c| c.is_ascii_digit())
                    .collect::<String>()
                    .parse::<u32>()
                    .unwrap_or(0)
            })
            .unwrap_or(0);

        Ok(SvnVersion {
            major,
            minor,
            patch,
        })
    }
}

impl std::fmt::Display for SvnVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}
