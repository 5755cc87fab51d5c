mod helpers;

use std::sync::Arc;

use helpers::{FakeRunner, INFO_XML, LOG_XML, STATUS_XML, create_file, create_working_copy, remote_config};
use svn_mcp::svn::{
    BlameOptions, BranchType, CatOptions, DiffOptions, LineRange, LogOptions, StatusOptions,
};
use svn_mcp::{AppError, Config, ErrorKind, SvnClient, SvnError};
use tempfile::TempDir;

fn client(config: Config, runner: FakeRunner, base_dir: &std::path::Path) -> SvnClient<FakeRunner> {
    SvnClient::with_runner(Arc::new(config), runner).with_base_dir(base_dir)
}

fn svn_kind(err: AppError) -> ErrorKind {
    match err {
        AppError::Svn(e) => e.kind(),
        other => panic!("expected svn error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_info_in_working_copy() {
    let (_temp, wc) = create_working_copy();
    let runner = FakeRunner::new().respond(INFO_XML);
    let client = client(Config::default(), runner.clone(), &wc);

    let info = client.info(None).await.expect("info should succeed");

    assert_eq!(info.revision, 1234);
    assert_eq!(info.last_changed_author, "alice");
    assert_eq!(info.wc_root.as_deref(), Some("/home/alice/wc"));
    let branch = info.branch.expect("branch classified");
    assert_eq!(branch.branch_type, BranchType::Branch);
    assert_eq!(branch.name.as_deref(), Some("feature-x"));

    let call = runner.last_call();
    assert_eq!(call.command, "info");
    assert_eq!(call.args, vec!["--xml", "."]);
    assert_eq!(call.options.working_dir, Some(wc));
    assert!(!call.options.use_credentials);
}

#[tokio::test]
async fn test_info_falls_back_to_remote() {
    let temp_dir = TempDir::new().unwrap();
    let runner = FakeRunner::new()
        .fail(SvnError::not_working_copy("not a working copy"))
        .respond(INFO_XML);
    let client = client(remote_config(), runner.clone(), temp_dir.path());

    client.info(None).await.expect("remote info should succeed");

    let calls = runner.calls();
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[1].args, vec!["--xml", "https://svn.example.com/repo/trunk"]);
    assert!(calls[1].options.use_credentials);
}

#[tokio::test]
async fn test_info_without_working_copy_or_remote() {
    let temp_dir = TempDir::new().unwrap();
    let runner = FakeRunner::new().fail(SvnError::not_working_copy("not a working copy"));
    let client = client(Config::default(), runner, temp_dir.path());

    let err = client.info(None).await.unwrap_err();
    assert_eq!(err.to_string(), "SVN error: No SVN working copy found and no repository URL configured");
    assert_eq!(svn_kind(err), ErrorKind::NotWorkingCopy);
}

#[tokio::test]
async fn test_info_with_malformed_xml() {
    let (_temp, wc) = create_working_copy();
    let runner = FakeRunner::new().respond("<status></status>");
    let client = client(Config::default(), runner, &wc);

    let err = client.info(Some(".")).await.unwrap_err();
    assert!(matches!(err, AppError::Parse(_)));
}

#[tokio::test]
async fn test_status_outside_working_copy() {
    let temp_dir = TempDir::new().unwrap();
    let runner = FakeRunner::new();
    let client = client(Config::default(), runner.clone(), temp_dir.path());

    let err = client.status(&StatusOptions::default()).await.unwrap_err();
    assert_eq!(svn_kind(err), ErrorKind::NotWorkingCopy);
    assert!(runner.calls().is_empty());
}

#[tokio::test]
async fn test_status_hides_unversioned() {
    let (_temp, wc) = create_working_copy();
    let runner = FakeRunner::new().respond(STATUS_XML).respond(STATUS_XML);
    let client = client(Config::default(), runner.clone(), &wc);

    let all = client.status(&StatusOptions::default()).await.unwrap();
    assert_eq!(all.entries.len(), 2);
    assert_eq!(all.hidden, 0);

    let options = StatusOptions {
        path: None,
        show_unversioned: false,
    };
    let versioned = client.status(&options).await.unwrap();
    assert_eq!(versioned.entries.len(), 1);
    assert_eq!(versioned.hidden, 1);
    assert_eq!(versioned.entries[0].path, "src/main.c");
    assert_eq!(versioned.entries[0].status_code, 'M');

    let call = runner.last_call();
    assert_eq!(call.command, "status");
    assert_eq!(call.options.working_dir, Some(wc));
}

#[tokio::test]
async fn test_log_arguments() {
    let (_temp, wc) = create_working_copy();
    let runner = FakeRunner::new().respond(LOG_XML);
    let client = client(Config::default(), runner.clone(), &wc);

    let options = LogOptions {
        path: Some("src".to_string()),
        limit: 5,
        revision: Some("1000:HEAD".to_string()),
        verbose: true,
        search: Some("parser".to_string()),
    };
    let entries = client.log(&options).await.unwrap();

    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].revision, 1234);
    assert_eq!(entries[1].message, "");

    let call = runner.last_call();
    let target = wc.join("src").to_string_lossy().into_owned();
    assert_eq!(
        call.args,
        vec!["--xml", "-l", "5", "-v", "-r", "1000:HEAD", "--search", "parser", target.as_str()]
    );
    assert!(!call.options.use_credentials);
}

#[tokio::test]
async fn test_log_defaults_to_configured_remote() {
    let temp_dir = TempDir::new().unwrap();
    let runner = FakeRunner::new().respond(LOG_XML);
    let client = client(remote_config(), runner.clone(), temp_dir.path());

    client.log(&LogOptions::default()).await.unwrap();

    let call = runner.last_call();
    assert_eq!(call.args, vec!["--xml", "-l", "10", "https://svn.example.com/repo/trunk"]);
    assert!(call.options.use_credentials);
}

#[tokio::test]
async fn test_log_defaults_to_local_mirror() {
    let (_temp, wc) = create_working_copy();
    let elsewhere = TempDir::new().unwrap();
    let config = Config {
        local_working_copy: Some(wc.clone()),
        ..remote_config()
    };
    let runner = FakeRunner::new().respond(LOG_XML);
    let client = client(config, runner.clone(), elsewhere.path());

    client.log(&LogOptions::default()).await.unwrap();

    let call = runner.last_call();
    let expected = wc.to_string_lossy().into_owned();
    assert_eq!(call.args.last(), Some(&expected));
    assert_eq!(call.options.working_dir, Some(wc));
    assert!(!call.options.use_credentials);
}

#[tokio::test]
async fn test_diff_credentials_by_revision() {
    let (_temp, wc) = create_working_copy();
    let runner = FakeRunner::new();
    let client = client(Config::default(), runner.clone(), &wc);

    client.diff(&DiffOptions::default()).await.unwrap();
    assert!(!runner.last_call().options.use_credentials);

    let base = DiffOptions {
        revision: Some("BASE".to_string()),
        ..DiffOptions::default()
    };
    client.diff(&base).await.unwrap();
    assert!(!runner.last_call().options.use_credentials);

    let range = DiffOptions {
        revision: Some("1000:1005".to_string()),
        ..DiffOptions::default()
    };
    client.diff(&range).await.unwrap();
    assert!(runner.last_call().options.use_credentials);

    let change = DiffOptions {
        change: Some(1005),
        revision: Some("BASE".to_string()),
        ..DiffOptions::default()
    };
    client.diff(&change).await.unwrap();
    let call = runner.last_call();
    assert_eq!(call.args[..2], ["-c".to_string(), "1005".to_string()]);
    assert!(call.options.use_credentials);
}

#[tokio::test]
async fn test_blame_requires_path() {
    let (_temp, wc) = create_working_copy();
    let runner = FakeRunner::new();
    let client = client(Config::default(), runner.clone(), &wc);

    let err = client.blame(&BlameOptions::default()).await.unwrap_err();
    assert_eq!(svn_kind(err), ErrorKind::FileNotFound);
    assert!(runner.calls().is_empty());
}

#[tokio::test]
async fn test_blame_line_range() {
    let (_temp, wc) = create_working_copy();
    create_file(&wc, "a.c", "one\ntwo\nthree\n");
    let output = "   100      alice one\n   101        bob two\n   102      alice three\n";
    let runner = FakeRunner::new().respond(output);
    let client = client(Config::default(), runner, &wc);

    let options = BlameOptions {
        path: "a.c".to_string(),
        revision: None,
        range: LineRange::new(Some(2), None),
    };
    let report = client.blame(&options).await.unwrap();

    assert_eq!(report.total_lines, 3);
    assert_eq!(report.lines.len(), 2);
    assert_eq!(report.lines[0].line_number, 2);
    assert_eq!(report.lines[0].author, "bob");
    assert_eq!(report.lines[1].content, "three");
}

#[tokio::test]
async fn test_cat_slices_lines() {
    let (_temp, wc) = create_working_copy();
    let runner = FakeRunner::new().respond("l1\nl2\nl3\nl4\n");
    let client = client(Config::default(), runner.clone(), &wc);

    let options = CatOptions {
        path: "a.c".to_string(),
        revision: Some("HEAD".to_string()),
        range: LineRange::new(Some(2), Some(3)),
    };
    let content = client.cat(&options).await.unwrap();

    assert_eq!(content.lines, vec!["l2", "l3"]);
    assert_eq!(content.first_line, 2);
    assert_eq!(content.total_lines, 4);
    assert_eq!(runner.last_call().args[..2], ["-r".to_string(), "HEAD".to_string()]);
}

#[tokio::test]
async fn test_cat_range_past_end() {
    let (_temp, wc) = create_working_copy();
    let runner = FakeRunner::new().respond("l1\nl2\n");
    let client = client(Config::default(), runner, &wc);

    let options = CatOptions {
        path: "a.c".to_string(),
        revision: None,
        range: LineRange::new(Some(5), None),
    };
    let content = client.cat(&options).await.unwrap();
    assert!(content.lines.is_empty());
    assert_eq!(content.total_lines, 2);
}

#[tokio::test]
async fn test_runner_errors_propagate() {
    let (_temp, wc) = create_working_copy();
    let runner = FakeRunner::new().fail(SvnError::AuthFailed {
        details: "svn: E170001: Authentication failed".to_string(),
    });
    let client = client(Config::default(), runner, &wc);

    let err = client.log(&LogOptions::default()).await.unwrap_err();
    assert_eq!(svn_kind(err), ErrorKind::AuthFailed);
}
