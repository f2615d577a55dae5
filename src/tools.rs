//! External tool invocation (tar, grep, gs, wget)
//!
//! Tools are black boxes: only the exit status and, for the search tool, stdout are
//! consumed. Working directories are passed per command; the process cwd never changes.

use std::ffi::OsString;
use std::path::Path;
use std::process::{Command, Stdio};

/// Captured result of one tool run
#[derive(Debug, Clone, Default)]
pub struct ToolOutput {
    pub success: bool,
    pub stdout: String,
    pub stderr: String,
}

/// Runs external programs. Spawn failures (missing binary) are `Err`.
pub trait ToolRunner {
    fn run(&self, program: &str, args: &[OsString], cwd: Option<&Path>) -> std::io::Result<ToolOutput>;
}

/// Runs tools as real subprocesses
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemTools;

impl ToolRunner for SystemTools {
    fn run(&self, program: &str, args: &[OsString], cwd: Option<&Path>) -> std::io::Result<ToolOutput> {
        let mut command = Command::new(program);
        command.args(args).stdin(Stdio::null());
        if let Some(dir) = cwd {
            command.current_dir(dir);
        }

        tracing::debug!("[Tools] {} {:?}", program, args);
        let output = command.output()?;

        Ok(ToolOutput {
            success: output.status.success(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}
