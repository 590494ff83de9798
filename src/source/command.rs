//! Testable execution of external tools.
//!
//! The `CommandRunner` trait lets the yt-dlp integration run against canned
//! output in tests instead of a real binary.

use crate::error::{Result, VidscribeError};
use async_trait::async_trait;
use std::process::Stdio;
use std::sync::Mutex;
use tokio::process::Command;

/// Trait for executing system commands.
///
/// Object-safe, Send + Sync for use in concurrent contexts.
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Run `program` with `args` and return its stdout.
    ///
    /// Returns an error if the program is missing or exits unsuccessfully.
    async fn run(&self, program: &str, args: &[String]) -> Result<Vec<u8>>;
}

/// Production command runner using tokio::process::Command.
#[derive(Debug, Clone, Default)]
pub struct SystemCommandRunner;

impl SystemCommandRunner {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl CommandRunner for SystemCommandRunner {
    async fn run(&self, program: &str, args: &[String]) -> Result<Vec<u8>> {
        let output = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    VidscribeError::ToolNotFound {
                        tool: program.to_string(),
                    }
                } else {
                    VidscribeError::Other(format!("Failed to execute {program}: {e}"))
                }
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(VidscribeError::Other(format!(
                "{} failed with {}: {}",
                program,
                output.status,
                stderr.trim()
            )));
        }

        Ok(output.stdout)
    }
}

/// Mock command runner for testing.
///
/// Each rule answers invocations whose arguments contain its marker; the
/// first matching rule wins. Unmatched invocations fail.
#[derive(Debug, Default)]
pub struct MockCommandRunner {
    rules: Vec<(String, std::result::Result<Vec<u8>, String>)>,
    invocations: Mutex<Vec<Vec<String>>>,
}

impl MockCommandRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reply with `stdout` when an argument equals `marker`.
    pub fn on(mut self, marker: &str, stdout: impl Into<Vec<u8>>) -> Self {
        self.rules.push((marker.to_string(), Ok(stdout.into())));
        self
    }

    /// Fail with `message` when an argument equals `marker`.
    pub fn fail_on(mut self, marker: &str, message: &str) -> Self {
        self.rules
            .push((marker.to_string(), Err(message.to_string())));
        self
    }

    /// Argument lists received so far.
    pub fn invocations(&self) -> Vec<Vec<String>> {
        self.invocations
            .lock()
            .map(|i| i.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl CommandRunner for MockCommandRunner {
    async fn run(&self, program: &str, args: &[String]) -> Result<Vec<u8>> {
        if let Ok(mut invocations) = self.invocations.lock() {
            invocations.push(args.to_vec());
        }

        let rule = self
            .rules
            .iter()
            .find(|(marker, _)| args.iter().any(|a| a == marker));

        match rule {
            Some((_, Ok(stdout))) => Ok(stdout.clone()),
            Some((_, Err(message))) => Err(VidscribeError::Other(format!(
                "{program} failed: {message}"
            ))),
            None => Err(VidscribeError::Other(format!(
                "{program}: unexpected invocation {args:?}"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn test_system_runner_missing_tool() {
        let runner = SystemCommandRunner::new();
        let result = runner
            .run("definitely-not-a-real-tool-vidscribe", &args(&["--version"]))
            .await;
        match result {
            Err(VidscribeError::ToolNotFound { tool }) => {
                assert_eq!(tool, "definitely-not-a-real-tool-vidscribe")
            }
            other => panic!("Expected ToolNotFound, got {:?}", other),
        }
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_system_runner_captures_stdout() {
        let runner = SystemCommandRunner::new();
        let stdout = runner.run("echo", &args(&["hello"])).await.unwrap();
        assert_eq!(String::from_utf8_lossy(&stdout).trim(), "hello");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_system_runner_reports_failure_status() {
        let runner = SystemCommandRunner::new();
        assert!(runner.run("false", &[]).await.is_err());
    }

    #[tokio::test]
    async fn test_mock_runner_matches_marker() {
        let runner = MockCommandRunner::new()
            .on("-J", b"{}".to_vec())
            .fail_on("-o", "blocked");

        let out = runner.run("yt-dlp", &args(&["-J", "url"])).await.unwrap();
        assert_eq!(out, b"{}".to_vec());

        let err = runner
            .run("yt-dlp", &args(&["-o", "-", "url"]))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("blocked"));

        assert!(runner.run("yt-dlp", &args(&["--other"])).await.is_err());
        assert_eq!(runner.invocations().len(), 3);
    }
}
