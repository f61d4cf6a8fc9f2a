use crate::exceptions::DevcallError;
use crate::exec::{ExecRequest, run_checked};
use crate::provider::Provider;
use crate::registry::{CallContext, Registry, from_args};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

pub struct CliProvider;

impl Provider for CliProvider {
    fn name(&self) -> &'static str {
        "cli"
    }

    fn register(&self, registry: &mut Registry) -> Result<(), DevcallError> {
        registry.register_fn(
            "cli.which",
            self.name(),
            "Resolve an executable on PATH",
            which,
        )?;
        registry.register_fn(
            "cli.run",
            self.name(),
            "Spawn a binary directly with an argument vector",
            run,
        )?;
        Ok(())
    }
}

fn is_executable_file(path: &Path) -> bool {
    if let Ok(meta) = fs::metadata(path) {
        if !meta.is_file() {
            return false;
        }

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            return meta.permissions().mode() & 0o111 != 0;
        }
        #[cfg(not(unix))]
        return true;
    }
    false
}

pub(crate) fn find_in_path(bin: &str) -> Option<PathBuf> {
    // Explicit paths bypass the PATH lookup
    if bin.contains(std::path::MAIN_SEPARATOR) {
        let candidate = PathBuf::from(bin);
        return is_executable_file(&candidate).then_some(candidate);
    }

    let path_var = env::var_os("PATH")?;
    for dir in env::split_paths(&path_var) {
        let candidate = dir.join(bin);
        if is_executable_file(&candidate) {
            return Some(candidate);
        }
    }
    None
}

#[derive(Deserialize)]
struct WhichArgs {
    bin: String,
}

#[derive(Serialize)]
struct WhichResponse {
    found: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    path: Option<String>,
}

#[derive(Deserialize)]
struct RunArgs {
    bin: String,
    #[serde(default)]
    args: Vec<String>,
    #[serde(default)]
    cwd: Option<String>,
    #[serde(default)]
    allow_failure: bool,
}

fn which(_ctx: &CallContext, args: Value) -> Result<Value, DevcallError> {
    let args: WhichArgs = from_args(args)?;
    let response = match find_in_path(&args.bin) {
        Some(path) => WhichResponse {
            found: true,
            path: Some(path.to_string_lossy().to_string()),
        },
        None => WhichResponse {
            found: false,
            path: None,
        },
    };
    Ok(serde_json::to_value(response)?)
}

fn run(ctx: &CallContext, args: Value) -> Result<Value, DevcallError> {
    let args: RunArgs = from_args(args)?;

    let program = find_in_path(&args.bin)
        .ok_or_else(|| DevcallError::Exec(format!("'{}' not found on PATH", args.bin)))?;

    let cwd = match args.cwd.as_deref() {
        Some(dir) => ctx.resolve(dir),
        None => ctx.cwd().to_path_buf(),
    };

    let program = program.to_string_lossy().to_string();
    let request = ExecRequest {
        program: &program,
        args: &args.args,
        cwd: Some(&cwd),
        env: None,
    };
    let output = run_checked(&request, args.allow_failure)?;
    Ok(serde_json::to_value(output)?)
}
