use crate::consts::ENV_PNPM_BIN;
use crate::exceptions::DevcallError;
use crate::exec::{ExecRequest, run_checked};
use crate::provider::Provider;
use crate::registry::{CallContext, Registry, from_args};
use serde::Deserialize;
use serde_json::Value;
use std::env;

pub struct PnpmProvider;

impl Provider for PnpmProvider {
    fn name(&self) -> &'static str {
        "pnpm"
    }

    fn register(&self, registry: &mut Registry) -> Result<(), DevcallError> {
        let name = self.name();
        registry.register_fn("pnpm.install", name, "Install workspace dependencies", install)?;
        registry.register_fn("pnpm.add", name, "Add packages to a workspace", add)?;
        registry.register_fn("pnpm.run", name, "Run a package script", run_script)?;
        Ok(())
    }
}

fn pnpm_bin() -> String {
    env::var(ENV_PNPM_BIN).unwrap_or_else(|_| "pnpm".to_string())
}

pub fn install_argv(frozen_lockfile: bool) -> Vec<String> {
    let mut argv = vec!["install".to_string()];
    if frozen_lockfile {
        argv.push("--frozen-lockfile".to_string());
    }
    argv
}

pub fn add_argv(packages: &[String], dev: bool) -> Vec<String> {
    let mut argv = vec!["add".to_string()];
    if dev {
        argv.push("--save-dev".to_string());
    }
    argv.extend(packages.iter().cloned());
    argv
}

pub fn run_argv(script: &str, extra: &[String]) -> Vec<String> {
    let mut argv = vec!["run".to_string(), script.to_string()];
    if !extra.is_empty() {
        argv.push("--".to_string());
        argv.extend(extra.iter().cloned());
    }
    argv
}

#[derive(Deserialize)]
struct InstallArgs {
    #[serde(default)]
    cwd: Option<String>,
    #[serde(default)]
    frozen_lockfile: bool,
}

#[derive(Deserialize)]
struct AddArgs {
    packages: Vec<String>,
    #[serde(default)]
    dev: bool,
    #[serde(default)]
    cwd: Option<String>,
}

#[derive(Deserialize)]
struct RunScriptArgs {
    script: String,
    #[serde(default)]
    args: Vec<String>,
    #[serde(default)]
    cwd: Option<String>,
}

fn invoke(ctx: &CallContext, cwd: Option<&str>, argv: Vec<String>) -> Result<Value, DevcallError> {
    let cwd = match cwd {
        Some(dir) => ctx.resolve(dir),
        None => ctx.cwd().to_path_buf(),
    };
    let bin = pnpm_bin();
    let request = ExecRequest {
        program: &bin,
        args: &argv,
        cwd: Some(&cwd),
        env: None,
    };
    let output = run_checked(&request, false)?;
    Ok(serde_json::to_value(output)?)
}

fn install(ctx: &CallContext, args: Value) -> Result<Value, DevcallError> {
    let args: InstallArgs = from_args(args)?;
    invoke(ctx, args.cwd.as_deref(), install_argv(args.frozen_lockfile))
}

fn add(ctx: &CallContext, args: Value) -> Result<Value, DevcallError> {
    let args: AddArgs = from_args(args)?;
    if args.packages.is_empty() {
        return Err(DevcallError::InvalidInput(
            "pnpm.add needs at least one package".to_string(),
        ));
    }
    invoke(ctx, args.cwd.as_deref(), add_argv(&args.packages, args.dev))
}

fn run_script(ctx: &CallContext, args: Value) -> Result<Value, DevcallError> {
    let args: RunScriptArgs = from_args(args)?;
    invoke(ctx, args.cwd.as_deref(), run_argv(&args.script, &args.args))
}
