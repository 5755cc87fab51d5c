pub mod branch;
pub mod client;
pub mod executor;
pub mod parser;
pub mod resolver;
pub mod version;
pub mod xml;

// Re-export commonly used types
pub use branch::{BranchInfo, BranchType, classify_url};
pub use client::{
    BlameOptions, BlameReport, CatOptions, DiffOptions, FileContent, LineRange, LogOptions,
    StatusOptions, StatusReport, SvnClient,
};
pub use executor::{CommandOutput, CommandRunner, ExecOptions, SvnExecutor};
pub use parser::{
    BlameLine, CommitSummary, InfoRecord, LogEntry, LogPathChange, StatusEntry, parse_blame,
    parse_info_xml, parse_log_xml, parse_status_xml,
};
pub use resolver::{Operation, PathResolver, RepositoryLocation};
pub use version::SvnVersion;
pub use xml::{XmlElement, XmlValue, as_sequence};
