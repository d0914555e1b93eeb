//! Best-effort detection of whether a named executable can be invoked.
//!
//! Probes are tried in order: the POSIX `command -v` builtin (via `sh`),
//! then `which`, then the Windows `where` tool. The first probe that exits
//! zero wins; a probe tool that is itself missing just means moving on to
//! the next one.

use std::process::Stdio;
use tokio::process::Command;
use tracing::debug;

/// Returns true if `command` resolves to something runnable on this system.
///
/// Never errors: unknown commands, missing probe tools, and spawn failures
/// all read as "not available".
pub async fn is_command_available(command: &str) -> bool {
    let command = command.trim();
    if command.is_empty() {
        return false;
    }

    if shell_probe(command).await {
        debug!(command, probe = "command -v", "Executable found");
        return true;
    }
    if tool_probe("which", command).await {
        debug!(command, probe = "which", "Executable found");
        return true;
    }
    if tool_probe("where", command).await {
        debug!(command, probe = "where", "Executable found");
        return true;
    }

    debug!(command, "Executable not found by any probe");
    false
}

/// `command -v` is a shell builtin, so it runs through `sh`. The name is
/// passed as `$0` rather than spliced into the script.
async fn shell_probe(command: &str) -> bool {
    let mut cmd = Command::new("sh");
    cmd.arg("-c").arg(r#"command -v -- "$0""#).arg(command);
    run_silent(cmd).await
}

async fn tool_probe(tool: &str, command: &str) -> bool {
    let mut cmd = Command::new(tool);
    cmd.arg(command);
    run_silent(cmd).await
}

async fn run_silent(mut cmd: Command) -> bool {
    cmd.stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null());
    match cmd.status().await {
        Ok(status) => status.success(),
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_empty_and_whitespace_are_not_available() {
        assert!(!is_command_available("").await);
        assert!(!is_command_available("   ").await);
    }

    #[tokio::test]
    async fn test_nonsense_command_is_not_available() {
        assert!(!is_command_available("definitely-not-a-real-tool-4427").await);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_common_unix_tools_are_available() {
        assert!(is_command_available("echo").await);
        assert!(is_command_available("sh").await);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_surrounding_whitespace_is_trimmed() {
        assert!(is_command_available("  echo  ").await);
    }
}
