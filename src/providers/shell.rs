use crate::exceptions::DevcallError;
use crate::exec::{ExecRequest, run_checked};
use crate::provider::Provider;
use crate::registry::{CallContext, Registry, from_args};
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;

pub struct ShellProvider;

impl Provider for ShellProvider {
    fn name(&self) -> &'static str {
        "shell"
    }

    fn register(&self, registry: &mut Registry) -> Result<(), DevcallError> {
        registry.register_fn(
            "shell.exec",
            self.name(),
            "Run a command line and capture its output",
            exec,
        )?;
        Ok(())
    }
}

#[derive(Deserialize)]
struct ExecArgs {
    command: String,
    #[serde(default)]
    cwd: Option<String>,
    #[serde(default)]
    env: Option<BTreeMap<String, String>>,
    #[serde(default)]
    allow_failure: bool,
}

fn exec(ctx: &CallContext, args: Value) -> Result<Value, DevcallError> {
    let args: ExecArgs = from_args(args)?;

    let words = shlex::split(&args.command).ok_or_else(|| {
        DevcallError::InvalidInput(format!("unparsable command line: {}", args.command))
    })?;
    let Some((program, rest)) = words.split_first() else {
        return Err(DevcallError::InvalidInput(
            "empty command line".to_string(),
        ));
    };

    let cwd = match args.cwd.as_deref() {
        Some(dir) => ctx.resolve(dir),
        None => ctx.cwd().to_path_buf(),
    };

    let request = ExecRequest {
        program,
        args: rest,
        cwd: Some(&cwd),
        env: args.env.as_ref(),
    };
    let output = run_checked(&request, args.allow_failure)?;
    Ok(serde_json::to_value(output)?)
}
