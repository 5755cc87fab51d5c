use std::error::Error;

use svn_mcp::config::settings::{ConfigError, ENV_REPO_URL, ENV_TIMEOUT_MS, ENV_USERNAME};
use svn_mcp::error::{AppError, AppResult, ErrorKind, ParseError, SvnError};
use svn_mcp::Config;

/// Test that SvnError converts to AppError::Svn
#[test]
fn test_svn_error_converts_to_app_error() {
    let app_err: AppError = SvnError::NotInstalled.into();
    assert!(matches!(app_err, AppError::Svn(SvnError::NotInstalled)));
}

/// Test that ParseError converts to AppError::Parse
#[test]
fn test_parse_error_converts_to_app_error() {
    let app_err: AppError = ParseError("bad xml".to_string()).into();
    assert!(matches!(app_err, AppError::Parse(_)));
    assert!(app_err.to_string().contains("bad xml"));
}

/// Test that ConfigError converts to AppError::Config
#[test]
fn test_config_error_converts_to_app_error() {
    let app_err: AppError = ConfigError::InvalidValue("timeout_ms".to_string()).into();
    assert!(matches!(app_err, AppError::Config(_)));
    assert!(app_err.to_string().contains("Configuration error"));
}

/// Test that std::io::Error converts to AppError::Io
#[test]
fn test_io_error_converts_to_app_error() {
    let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "test");
    let app_err: AppError = io_err.into();
    assert!(matches!(app_err, AppError::Io(_)));
}

/// Test that error source is preserved through the wrapper
#[test]
fn test_error_source_preserved() {
    let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "config.toml");
    let app_err: AppError = ConfigError::ReadError(io_err).into();

    assert!(app_err.source().is_some());
}

#[test]
fn test_every_kind_has_distinct_code() {
    let kinds = [
        ErrorKind::NotInstalled,
        ErrorKind::NotWorkingCopy,
        ErrorKind::AuthFailed,
        ErrorKind::NetworkError,
        ErrorKind::FileNotFound,
        ErrorKind::InvalidRevision,
        ErrorKind::CommandFailed,
        ErrorKind::Timeout,
    ];
    let mut codes: Vec<&str> = kinds.iter().map(|k| k.code()).collect();
    codes.sort();
    codes.dedup();
    assert_eq!(codes.len(), kinds.len());
}

#[test]
fn test_question_mark_operator() {
    fn inner() -> AppResult<()> {
        Err(SvnError::InvalidRevision {
            details: "svn: E160006: No such revision 99999".to_string(),
        })?;
        Ok(())
    }

    match inner() {
        Err(AppError::Svn(e)) => assert_eq!(e.kind(), ErrorKind::InvalidRevision),
        other => panic!("unexpected result: {:?}", other),
    }
}

#[test]
fn test_config_lookup_accepts_unknown_repo_scheme() {
    let config = Config::from_lookup(|key| match key {
        k if k == ENV_REPO_URL => Some("ftp://example.com/repo".to_string()),
        _ => None,
    })
    .unwrap();
    assert_eq!(config.repo_url.as_deref(), Some("ftp://example.com/repo"));
}

#[test]
fn test_config_lookup_rejects_zero_timeout() {
    let result = Config::from_lookup(|key| match key {
        k if k == ENV_TIMEOUT_MS => Some("0".to_string()),
        _ => None,
    });
    assert!(matches!(result, Err(ConfigError::InvalidValue(_))));
}

#[test]
fn test_config_lookup_ignores_bad_timeout() {
    let config = Config::from_lookup(|key| match key {
        k if k == ENV_TIMEOUT_MS => Some("soon".to_string()),
        k if k == ENV_USERNAME => Some("alice".to_string()),
        _ => None,
    })
    .unwrap();

    assert_eq!(config.timeout_ms, 30_000);
    assert_eq!(config.username.as_deref(), Some("alice"));
    assert!(!config.has_credentials());
}
