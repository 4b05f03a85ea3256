//! Subprocess plumbing shared by the command-line transports

use tokio::process::Command;
use tracing::debug;

/// Captured result of a finished subprocess
#[derive(Debug)]
pub(crate) struct Captured {
    pub success: bool,
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl Captured {
    /// Short failure description for error messages
    pub fn failure(&self) -> String {
        let stderr = self.stderr.trim();
        match (self.code, stderr.is_empty()) {
            (Some(code), true) => format!("exited with status {}", code),
            (Some(code), false) => format!("exited with status {}: {}", code, stderr),
            (None, true) => "terminated by signal".to_string(),
            (None, false) => format!("terminated by signal: {}", stderr),
        }
    }
}

/// Run a command to completion, capturing its output.
///
/// There is no timeout: a hanging child hangs the caller.
pub(crate) async fn run(command: &mut Command) -> std::io::Result<Captured> {
    debug!("Running {:?}", command.as_std().get_program());

    let output = command.kill_on_drop(true).output().await?;

    Ok(Captured {
        success: output.status.success(),
        code: output.status.code(),
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
    })
}
