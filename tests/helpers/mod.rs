#![allow(dead_code)]

use std::collections::VecDeque;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use svn_mcp::svn::ExecOptions;
use svn_mcp::{CommandRunner, Config, SvnError, SvnResult};
use tempfile::TempDir;

/// Helper to create a directory that looks like an svn working copy
pub fn create_working_copy() -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let wc_path = temp_dir.path().join("wc");
    fs::create_dir_all(wc_path.join(".svn")).expect("Failed to create .svn directory");

    (temp_dir, wc_path)
}

/// Helper to create a file inside a working copy
pub fn create_file(root: &Path, file: &str, content: &str) -> PathBuf {
    let file_path = root.join(file);
    if let Some(parent) = file_path.parent() {
        fs::create_dir_all(parent).expect("Failed to create parent directory");
    }
    fs::write(&file_path, content).expect("Failed to write file");
    file_path
}

pub fn remote_config() -> Config {
    Config {
        username: Some("alice".to_string()),
        password: Some("s3cret".to_string()),
        repo_url: Some("https://svn.example.com/repo".to_string()),
        trunk_path: Some("trunk".to_string()),
        ..Config::default()
    }
}

/// One recorded invocation
#[derive(Debug, Clone)]
pub struct Call {
    pub command: String,
    pub args: Vec<String>,
    pub options: ExecOptions,
}

/// Runner that records calls and replays canned responses in order
///
/// When the queue is empty every call succeeds with empty output.
#[derive(Clone, Default)]
pub struct FakeRunner {
    calls: Arc<Mutex<Vec<Call>>>,
    responses: Arc<Mutex<VecDeque<SvnResult<String>>>>,
}

impl FakeRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(self, output: &str) -> Self {
        self.responses
            .lock()
            .unwrap()
            .push_back(Ok(output.to_string()));
        self
    }

    pub fn fail(self, err: SvnError) -> Self {
        self.responses.lock().unwrap().push_back(Err(err));
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn last_call(&self) -> Call {
        self.calls().pop().expect("no calls recorded")
    }
}

#[async_trait]
impl CommandRunner for FakeRunner {
    async fn execute(
        &self,
        command: &str,
        args: &[String],
        options: &ExecOptions,
    ) -> SvnResult<String> {
        self.calls.lock().unwrap().push(Call {
            command: command.to_string(),
            args: args.to_vec(),
            options: options.clone(),
        });

        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(String::new()))
    }
}

pub const INFO_XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<info>
<entry kind="dir" path="." revision="1234">
<url>https://svn.example.com/repo/branches/feature-x</url>
<relative-url>^/branches/feature-x</relative-url>
<repository>
<root>https://svn.example.com/repo</root>
<uuid>0b8f8c3e-1111-2222-3333-444455556666</uuid>
</repository>
<wc-info>
<wcroot-abspath>/home/alice/wc</wcroot-abspath>
</wc-info>
<commit revision="1230">
<author>alice</author>
<date>2024-01-15T10:30:00.000000Z</date>
</commit>
</entry>
</info>
"#;

pub const STATUS_XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<status>
<target path=".">
<entry path="src/main.c">
<wc-status item="modified" props="none" revision="1234">
<commit revision="1200"><author>bob</author><date>2024-01-10T08:00:00.000000Z</date></commit>
</wc-status>
</entry>
<entry path="notes.txt">
<wc-status item="unversioned" props="none"></wc-status>
</entry>
</target>
</status>
"#;

pub const LOG_XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<log>
<logentry revision="1234">
<author>alice</author>
<date>2024-01-15T10:30:00.000000Z</date>
<msg>Fix the parser</msg>
</logentry>
<logentry revision="1233">
<author>bob</author>
<date>2024-01-14T09:00:00.000000Z</date>
<msg></msg>
</logentry>
</log>
"#;
