//! Isolated subprocess execution for tools that run untrusted code.
//!
//! The child is spawned in a fresh process group so that a single signal
//! tears down any grandchildren it forks. On timeout the parent escalates
//! from a polite termination request to a forced kill.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use nix::sys::signal::{self, Signal};
use nix::unistd::Pid;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{error, warn};
use warden_core::ClientId;

/// Grace period between a polite termination request and a forced kill.
const TERMINATE_GRACE: Duration = Duration::from_secs(2);

#[derive(Debug, Serialize)]
struct WorkerRequest<'a> {
    code: &'a str,
    context: &'a HashMap<String, Value>,
    client_id: &'a str,
}

#[derive(Debug, Deserialize)]
struct WorkerSuccessBody {
    result: Value,
    #[serde(default)]
    context: HashMap<String, Value>,
    #[serde(default)]
    stdout: String,
}

#[derive(Debug, Deserialize)]
struct WorkerFailureBody {
    error: String,
}

/// The outcome of one subprocess execution.
#[derive(Debug)]
pub enum SubprocessOutcome {
    /// The worker completed successfully.
    Success {
        /// The value it returned.
        result: Value,
        /// Its top-level bindings after execution, for callers that thread state through.
        context: HashMap<String, Value>,
        /// Captured standard output.
        stdout: String,
    },
    /// The worker reported a failure, or the parent could not make sense of its output.
    Failure {
        /// Human-readable error message.
        error: String,
    },
}

/// Spawns an isolated worker process per call and enforces its timeout.
pub struct SubprocessExecutor {
    worker_binary: PathBuf,
}

impl SubprocessExecutor {
    /// Build an executor that spawns `worker_binary` for every call.
    pub fn new(worker_binary: impl Into<PathBuf>) -> Self {
        Self {
            worker_binary: worker_binary.into(),
        }
    }

    /// Run `code` in a fresh worker process rooted at `cwd`, bounded by `timeout`.
    pub async fn run(
        &self,
        client_id: &ClientId,
        code: &str,
        context: &HashMap<String, Value>,
        cwd: &Path,
        timeout: Duration,
    ) -> SubprocessOutcome {
        let request = WorkerRequest {
            code,
            context,
            client_id: client_id.as_str(),
        };
        let payload = match serde_json::to_vec(&request) {
            Ok(bytes) => bytes,
            Err(e) => {
                return SubprocessOutcome::Failure {
                    error: format!("failed to encode worker request: {e}"),
                }
            }
        };

        let mut child = match Command::new(&self.worker_binary)
            .current_dir(cwd)
            .process_group(0)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
        {
            Ok(child) => child,
            Err(e) => {
                return SubprocessOutcome::Failure {
                    error: format!("failed to spawn worker: {e}"),
                }
            }
        };

        if let Some(mut stdin) = child.stdin.take() {
            if let Err(e) = stdin.write_all(&payload).await {
                return SubprocessOutcome::Failure {
                    error: format!("failed to write worker stdin: {e}"),
                };
            }
        }

        let pid = child.id();

        match tokio::time::timeout(timeout, child.wait_with_output()).await {
            Ok(Ok(output)) => parse_output(&output.stdout, &output.stderr),
            Ok(Err(e)) => SubprocessOutcome::Failure {
                error: format!("worker process error: {e}"),
            },
            Err(_) => {
                if let Some(pid) = pid {
                    terminate_then_kill(pid).await;
                }
                SubprocessOutcome::Failure {
                    error: format!("timeout after {}s", timeout.as_secs()),
                }
            }
        }
    }
}

async fn terminate_then_kill(pid: u32) {
    let target = Pid::from_raw(-(pid as i32));
    warn!(pid, "sending SIGTERM to worker process group");
    if signal::kill(target, Signal::SIGTERM).is_err() {
        return;
    }
    tokio::time::sleep(TERMINATE_GRACE).await;
    if let Err(e) = signal::kill(target, Signal::SIGKILL) {
        error!(pid, error = %e, "failed to SIGKILL worker process group");
    }
}

fn parse_output(stdout: &[u8], stderr: &[u8]) -> SubprocessOutcome {
    let envelope: Value = match serde_json::from_slice(stdout) {
        Ok(value) => value,
        Err(_) => {
            let stdout_text = String::from_utf8_lossy(stdout);
            let stderr_text = String::from_utf8_lossy(stderr);
            return SubprocessOutcome::Failure {
                error: format!("invalid JSON output: stdout={stdout_text} stderr={stderr_text}"),
            };
        }
    };

    let succeeded = envelope.get("success").and_then(Value::as_bool).unwrap_or(false);
    if succeeded {
        match serde_json::from_value::<WorkerSuccessBody>(envelope) {
            Ok(body) => SubprocessOutcome::Success {
                result: body.result,
                context: body.context,
                stdout: body.stdout,
            },
            Err(e) => SubprocessOutcome::Failure {
                error: format!("malformed success envelope: {e}"),
            },
        }
    } else {
        match serde_json::from_value::<WorkerFailureBody>(envelope) {
            Ok(body) => SubprocessOutcome::Failure { error: body.error },
            Err(e) => SubprocessOutcome::Failure {
                error: format!("malformed failure envelope: {e}"),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_output_reports_invalid_json() {
        let outcome = parse_output(b"not json", b"");
        match outcome {
            SubprocessOutcome::Failure { error } => assert!(error.contains("invalid JSON")),
            SubprocessOutcome::Success { .. } => panic!("expected failure"),
        }
    }

    #[test]
    fn parse_output_decodes_success_envelope() {
        let body = serde_json::json!({
            "success": true,
            "result": 42,
            "context": {},
            "stdout": "",
        });
        let outcome = parse_output(body.to_string().as_bytes(), b"");
        match outcome {
            SubprocessOutcome::Success { result, .. } => assert_eq!(result, serde_json::json!(42)),
            SubprocessOutcome::Failure { error } => panic!("unexpected failure: {error}"),
        }
    }

    #[test]
    fn parse_output_decodes_failure_envelope() {
        let body = serde_json::json!({
            "success": false,
            "error": "boom",
            "traceback": null,
            "context": null,
        });
        let outcome = parse_output(body.to_string().as_bytes(), b"");
        match outcome {
            SubprocessOutcome::Failure { error } => assert_eq!(error, "boom"),
            SubprocessOutcome::Success { .. } => panic!("expected failure"),
        }
    }
}
