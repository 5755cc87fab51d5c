pub mod config;
pub mod error;
pub mod server;
pub mod svn;

// Re-export commonly used types for convenience
pub use config::{Config, ConfigError};
pub use error::{AppError, AppResult, ErrorKind, ParseError, SvnError, SvnResult};
pub use server::SvnMcpServer;
pub use svn::{CommandRunner, PathResolver, SvnClient, SvnExecutor, SvnVersion};
