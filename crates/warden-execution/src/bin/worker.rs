//! Companion worker binary spawned by `SubprocessExecutor`.
//!
//! Reads a single JSON request from stdin (`{code, context, client_id}`),
//! runs `code` as a shell command via `sh -c` with `context` exported as
//! environment variables, and writes a JSON response envelope to stdout.
//! This binary is never invoked directly by a client; it only ever runs as
//! the isolated child of the execution engine.

use std::collections::HashMap;
use std::io::Read;
use std::process::Stdio;

use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Deserialize)]
struct WorkerRequest {
    code: String,
    context: HashMap<String, Value>,
    #[allow(dead_code)]
    client_id: String,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum WorkerResponse {
    Success {
        success: bool,
        result: Value,
        context: HashMap<String, Value>,
        stdout: String,
    },
    Failure {
        success: bool,
        error: String,
        traceback: Option<String>,
        context: Option<HashMap<String, Value>>,
    },
}

fn main() {
    let mut input = String::new();
    if let Err(e) = std::io::stdin().read_to_string(&mut input) {
        emit_failure(format!("failed to read stdin: {e}"));
        std::process::exit(1);
    }

    let request: WorkerRequest = match serde_json::from_str(&input) {
        Ok(request) => request,
        Err(e) => {
            emit_failure(format!("failed to parse request: {e}"));
            std::process::exit(1);
        }
    };

    let output = std::process::Command::new("sh")
        .arg("-c")
        .arg(&request.code)
        .envs(
            request
                .context
                .iter()
                .map(|(k, v)| (k.clone(), value_to_env(v))),
        )
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output();

    match output {
        Ok(output) if output.status.success() => {
            let stdout = String::from_utf8_lossy(&output.stdout).to_string();
            let response = WorkerResponse::Success {
                success: true,
                result: Value::String(stdout.trim_end().to_string()),
                context: request.context,
                stdout,
            };
            print_response(&response);
        }
        Ok(output) => {
            let stderr = String::from_utf8_lossy(&output.stderr).to_string();
            emit_failure(format!(
                "command exited with status {}: {stderr}",
                output.status
            ));
            std::process::exit(1);
        }
        Err(e) => {
            emit_failure(format!("failed to spawn command: {e}"));
            std::process::exit(1);
        }
    }
}

fn value_to_env(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn emit_failure(error: String) {
    let response = WorkerResponse::Failure {
        success: false,
        error,
        traceback: None,
        context: None,
    };
    print_response(&response);
}

fn print_response(response: &WorkerResponse) {
    match serde_json::to_string(response) {
        Ok(json) => println!("{json}"),
        Err(e) => println!("{{\"success\":false,\"error\":\"failed to encode response: {e}\"}}"),
    }
}
