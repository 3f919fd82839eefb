use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};

use tempfile::TempDir;

/// Four-row results table in the published column layout.
#[allow(dead_code)]
pub const RESULTS_CSV: &str = "\
human_baseline_summaries,original_model_summaries,instruct_model_summaries,peft_model_summaries
Ms. Dawson helps #Person1# to write a memo to inform every employee that they have to change the communication method.,#Person1#: Ms. Dawson I need you to take a dictation for me.,Ms. Dawson writes a memo about the new communication method for every employee.,Ms. Dawson helps #Person1# write a memo to inform every employee about the new communication method.
In order to prevent employees from wasting time on Instant Message programs #Person1# decides to terminate the use of them.,#Person1#: I need to take a dictation for you.,#Person1# decides to terminate the use of Instant Message programs.,#Person1# decides to terminate the use of Instant Message programs to prevent wasting time.
#Person2# arrives late because of traffic jam. #Person1# suggests public transport.,The traffic is terrible.,#Person2# got stuck in traffic and #Person1# suggests taking public transport.,#Person2# arrives late because of traffic and #Person1# suggests public transport.
#Person2# decides to ride a bike to work.,I am going to start biking.,#Person2# will bike to work.,#Person2# decides to ride a bike to work.
";

#[allow(dead_code)]
pub fn run_summeval(args: &[&str]) -> Output {
    TestEnv::new().run(args)
}

pub struct TestEnv {
    home: TempDir,
    config: TempDir,
    data: TempDir,
    runtime: TempDir,
    work: TempDir,
}

impl TestEnv {
    pub fn new() -> Self {
        Self {
            home: tempfile::tempdir().expect("create temporary HOME dir"),
            config: tempfile::tempdir().expect("create temporary XDG config dir"),
            data: tempfile::tempdir().expect("create temporary XDG data dir"),
            runtime: tempfile::tempdir().expect("create temporary XDG runtime dir"),
            work: tempfile::tempdir().expect("create temporary working dir"),
        }
    }

    fn command(&self, args: &[&str]) -> Command {
        let mut command = Command::new(env!("CARGO_BIN_EXE_summeval"));
        command
            .args(args)
            .current_dir(self.work.path())
            .env("HOME", self.home.path())
            .env("XDG_CONFIG_HOME", self.config.path())
            .env("XDG_DATA_HOME", self.data.path())
            .env("XDG_RUNTIME_DIR", self.runtime.path())
            .env_remove("SUMMEVAL_API_KEY")
            .env_remove("RUST_LOG");
        command
    }

    pub fn run(&self, args: &[&str]) -> Output {
        self.command(args)
            .output()
            .expect("failed to execute summeval binary")
    }

    #[allow(dead_code)]
    pub fn run_with_stdin(&self, args: &[&str], input: &str) -> Output {
        let mut child = self
            .command(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .expect("failed to spawn summeval binary");

        child
            .stdin
            .take()
            .expect("child stdin")
            .write_all(input.as_bytes())
            .expect("write child stdin");

        child
            .wait_with_output()
            .expect("failed to wait for summeval binary")
    }

    /// Directory the binary runs in
    #[allow(dead_code)]
    pub fn work_dir(&self) -> &Path {
        self.work.path()
    }

    /// Write a file into the working directory and return its path.
    #[allow(dead_code)]
    pub fn write_file(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.work.path().join(name);
        std::fs::write(&path, contents).expect("write fixture file");
        path
    }

    #[allow(dead_code)]
    pub fn config_path(&self) -> PathBuf {
        let output = self.run(&["config", "path"]);
        assert!(
            output.status.success(),
            "config path should succeed\nstdout:\n{}\nstderr:\n{}",
            String::from_utf8_lossy(&output.stdout),
            String::from_utf8_lossy(&output.stderr),
        );

        let path = String::from_utf8_lossy(&output.stdout);
        PathBuf::from(path.trim())
    }

    #[allow(dead_code)]
    pub fn write_config(&self, contents: &str) {
        let config_path = self.config_path();
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent).expect("create config parent directory");
        }
        std::fs::write(&config_path, contents).expect("write config file");
    }
}

/// Assert success and return (stdout, stderr).
#[allow(dead_code)]
pub fn assert_success(output: &Output, what: &str) -> (String, String) {
    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    assert!(
        output.status.success(),
        "{} should succeed\nstdout:\n{}\nstderr:\n{}",
        what,
        stdout,
        stderr
    );
    (stdout, stderr)
}
