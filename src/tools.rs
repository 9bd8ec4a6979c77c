//! Blocking invocation of external tools with a hard deadline.

use std::io::Read;
use std::path::Path;
use std::process::{Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use thiserror::Error;
use tracing::debug;

const POLL_INTERVAL: Duration = Duration::from_millis(10);

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ToolError {
    #[error("{tool} could not be started: {reason}")]
    Spawn { tool: String, reason: String },

    #[error("{tool} timed out after {}ms", .timeout.as_millis())]
    Timeout { tool: String, timeout: Duration },

    #[error("{tool} exited with status {}", .code.map(|code| code.to_string()).unwrap_or_else(|| "signal".to_string()))]
    Exit {
        tool: String,
        code: Option<i32>,
        stderr: String,
    },
}

/// Runs `program` and returns its stdout with trailing whitespace removed.
/// The child is killed once `timeout` elapses.
pub fn run(
    program: &str,
    args: &[String],
    current_dir: Option<&Path>,
    envs: &[(&str, &str)],
    timeout: Duration,
) -> Result<String, ToolError> {
    let mut cmd = Command::new(program);
    cmd.args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());
    if let Some(dir) = current_dir {
        cmd.current_dir(dir);
    }
    for (key, value) in envs {
        cmd.env(key, value);
    }

    let mut child = cmd.spawn().map_err(|err| ToolError::Spawn {
        tool: program.to_string(),
        reason: err.to_string(),
    })?;

    let stdout = child.stdout.take().map(spawn_reader);
    let stderr = child.stderr.take().map(spawn_reader);

    let deadline = Instant::now() + timeout;
    let status = loop {
        match child.try_wait() {
            Ok(Some(status)) => break status,
            Ok(None) if Instant::now() >= deadline => {
                let _ = child.kill();
                let _ = child.wait();
                debug!(tool = program, ?timeout, "tool timed out");
                return Err(ToolError::Timeout {
                    tool: program.to_string(),
                    timeout,
                });
            }
            Ok(None) => thread::sleep(POLL_INTERVAL),
            Err(err) => {
                let _ = child.kill();
                return Err(ToolError::Spawn {
                    tool: program.to_string(),
                    reason: err.to_string(),
                });
            }
        }
    };

    let stdout = stdout.map(join_reader).unwrap_or_default();
    let stderr = stderr.map(join_reader).unwrap_or_default();
    if !status.success() {
        return Err(ToolError::Exit {
            tool: program.to_string(),
            code: status.code(),
            stderr: String::from_utf8_lossy(&stderr).trim_end().to_string(),
        });
    }
    Ok(String::from_utf8_lossy(&stdout).trim_end().to_string())
}

fn spawn_reader<R: Read + Send + 'static>(mut source: R) -> thread::JoinHandle<Vec<u8>> {
    thread::spawn(move || {
        let mut buffer = Vec::new();
        let _ = source.read_to_end(&mut buffer);
        buffer
    })
}

fn join_reader(handle: thread::JoinHandle<Vec<u8>>) -> Vec<u8> {
    handle.join().unwrap_or_default()
}
