use crate::exceptions::DevcallError;
use crate::models::ExecOutput;
use std::collections::BTreeMap;
use std::path::Path;
use std::process::{Command, Stdio};

/// One process invocation with captured output.
pub struct ExecRequest<'a> {
    pub program: &'a str,
    pub args: &'a [String],
    pub cwd: Option<&'a Path>,
    pub env: Option<&'a BTreeMap<String, String>>,
}

impl<'a> ExecRequest<'a> {
    pub fn new(program: &'a str, args: &'a [String]) -> Self {
        ExecRequest {
            program,
            args,
            cwd: None,
            env: None,
        }
    }
}

/// Spawn the process and capture stdout/stderr. Spawn failure (missing
/// binary, permissions) is an error; a non-zero exit is not.
pub fn run_captured(request: &ExecRequest) -> Result<ExecOutput, DevcallError> {
    let mut cmd = Command::new(request.program);
    cmd.args(request.args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());

    if let Some(cwd) = request.cwd {
        cmd.current_dir(cwd);
    }
    if let Some(env) = request.env {
        for (key, value) in env {
            cmd.env(key, value);
        }
    }

    let output = cmd
        .output()
        .map_err(|e| DevcallError::Exec(format!("failed to spawn '{}': {}", request.program, e)))?;

    Ok(ExecOutput {
        status: output.status.code().unwrap_or(-1),
        stdout: String::from_utf8_lossy(&output.stdout).to_string(),
        stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        success: output.status.success(),
    })
}

/// Like [`run_captured`], but a non-zero exit becomes an error unless the
/// caller opted into inspecting failures itself.
pub fn run_checked(request: &ExecRequest, allow_failure: bool) -> Result<ExecOutput, DevcallError> {
    let output = run_captured(request)?;
    if !output.success && !allow_failure {
        return Err(DevcallError::Exec(format!(
            "'{}' exited with status {}: {}",
            request.program,
            output.status,
            output.stderr.trim()
        )));
    }
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn captures_stdout_and_status() {
        let args = vec!["hello".to_string()];
        let out = run_captured(&ExecRequest::new("echo", &args)).unwrap();
        assert!(out.success);
        assert_eq!(out.status, 0);
        assert_eq!(out.stdout.trim(), "hello");
    }

    #[test]
    fn missing_binary_is_an_exec_error() {
        let err = run_captured(&ExecRequest::new("devcall-definitely-missing", &[])).unwrap_err();
        assert!(matches!(err, DevcallError::Exec(_)));
    }

    #[test]
    fn checked_rejects_nonzero_exit() {
        let args = vec!["-c".to_string(), "exit 3".to_string()];
        let err = run_checked(&ExecRequest::new("sh", &args), false).unwrap_err();
        assert!(matches!(err, DevcallError::Exec(_)));

        let out = run_checked(&ExecRequest::new("sh", &args), true).unwrap();
        assert_eq!(out.status, 3);
        assert!(!out.success);
    }
}
