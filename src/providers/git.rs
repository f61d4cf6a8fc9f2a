use crate::consts::ENV_GIT_BIN;
use crate::exceptions::DevcallError;
use crate::exec::{ExecRequest, run_checked};
use crate::models::ExecOutput;
use crate::provider::Provider;
use crate::registry::{CallContext, Registry, from_args};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::env;

pub struct GitProvider;

impl Provider for GitProvider {
    fn name(&self) -> &'static str {
        "git"
    }

    fn register(&self, registry: &mut Registry) -> Result<(), DevcallError> {
        let name = self.name();
        registry.register_fn("git.status", name, "Working tree status", status)?;
        registry.register_fn("git.add", name, "Stage paths", add)?;
        registry.register_fn("git.commit", name, "Record a commit", commit)?;
        registry.register_fn("git.log", name, "Recent commits", log)?;
        Ok(())
    }
}

fn git_bin() -> String {
    env::var(ENV_GIT_BIN).unwrap_or_else(|_| "git".to_string())
}

fn run_git(ctx: &CallContext, cwd: Option<&str>, argv: Vec<String>) -> Result<ExecOutput, DevcallError> {
    let cwd = match cwd {
        Some(dir) => ctx.resolve(dir),
        None => ctx.cwd().to_path_buf(),
    };
    let bin = git_bin();
    let request = ExecRequest {
        program: &bin,
        args: &argv,
        cwd: Some(&cwd),
        env: None,
    };
    run_checked(&request, false)
}

#[derive(Deserialize)]
struct CwdArgs {
    #[serde(default)]
    cwd: Option<String>,
}

#[derive(Deserialize)]
struct AddArgs {
    paths: Vec<String>,
    #[serde(default)]
    cwd: Option<String>,
}

#[derive(Deserialize)]
struct CommitArgs {
    message: String,
    #[serde(default)]
    cwd: Option<String>,
}

#[derive(Deserialize)]
struct LogArgs {
    #[serde(default = "default_log_limit")]
    limit: usize,
    #[serde(default)]
    cwd: Option<String>,
}

fn default_log_limit() -> usize {
    10
}

#[derive(Debug, Serialize, PartialEq)]
pub struct GitChange {
    pub status: String,
    pub path: String,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct GitStatus {
    pub branch: String,
    pub clean: bool,
    pub changes: Vec<GitChange>,
}

#[derive(Serialize)]
struct LogCommit {
    sha: String,
    subject: String,
}

#[derive(Serialize)]
struct LogResponse {
    commits: Vec<LogCommit>,
}

/// Parse `git status --porcelain=v1 -b` output.
pub(crate) fn parse_status(stdout: &str) -> GitStatus {
    let mut branch = String::new();
    let mut changes = Vec::new();

    for line in stdout.lines() {
        if let Some(rest) = line.strip_prefix("## ") {
            // Fresh repositories and detached HEAD use prose headers
            branch = if let Some(name) = rest.strip_prefix("No commits yet on ") {
                name.to_string()
            } else if rest.starts_with("HEAD (no branch)") {
                "HEAD".to_string()
            } else {
                // "main...origin/main [ahead 1]" -> "main"
                rest.split("...")
                    .next()
                    .unwrap_or(rest)
                    .split(' ')
                    .next()
                    .unwrap_or(rest)
                    .to_string()
            };
            continue;
        }
        if line.len() > 3 {
            changes.push(GitChange {
                status: line[..2].trim().to_string(),
                path: line[3..].to_string(),
            });
        }
    }

    GitStatus {
        branch,
        clean: changes.is_empty(),
        changes,
    }
}

fn status(ctx: &CallContext, args: Value) -> Result<Value, DevcallError> {
    let args: CwdArgs = from_args(args)?;
    let argv = vec![
        "status".to_string(),
        "--porcelain=v1".to_string(),
        "-b".to_string(),
    ];
    let output = run_git(ctx, args.cwd.as_deref(), argv)?;
    Ok(serde_json::to_value(parse_status(&output.stdout))?)
}

fn add(ctx: &CallContext, args: Value) -> Result<Value, DevcallError> {
    let args: AddArgs = from_args(args)?;
    if args.paths.is_empty() {
        return Err(DevcallError::InvalidInput(
            "git.add needs at least one path".to_string(),
        ));
    }
    let mut argv = vec!["add".to_string(), "--".to_string()];
    argv.extend(args.paths.iter().cloned());
    let output = run_git(ctx, args.cwd.as_deref(), argv)?;
    Ok(serde_json::to_value(output)?)
}

fn commit(ctx: &CallContext, args: Value) -> Result<Value, DevcallError> {
    let args: CommitArgs = from_args(args)?;
    let argv = vec!["commit".to_string(), "-m".to_string(), args.message];
    let output = run_git(ctx, args.cwd.as_deref(), argv)?;
    Ok(serde_json::to_value(output)?)
}

fn log(ctx: &CallContext, args: Value) -> Result<Value, DevcallError> {
    let args: LogArgs = from_args(args)?;
    let argv = vec![
        "log".to_string(),
        "--format=%H%x09%s".to_string(),
        "-n".to_string(),
        args.limit.to_string(),
    ];
    let output = run_git(ctx, args.cwd.as_deref(), argv)?;

    let commits = output
        .stdout
        .lines()
        .filter_map(|line| {
            let (sha, subject) = line.split_once('\t')?;
            Some(LogCommit {
                sha: sha.to_string(),
                subject: subject.to_string(),
            })
        })
        .collect();
    Ok(serde_json::to_value(LogResponse { commits })?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_status_clean_tree() {
        let parsed = parse_status("## main...origin/main\n");
        assert_eq!(parsed.branch, "main");
        assert!(parsed.clean);
        assert!(parsed.changes.is_empty());
    }

    #[test]
    fn parse_status_with_changes() {
        let parsed = parse_status("## feature\n M src/lib.rs\n?? notes.txt\n");
        assert_eq!(parsed.branch, "feature");
        assert!(!parsed.clean);
        assert_eq!(
            parsed.changes,
            vec![
                GitChange {
                    status: "M".to_string(),
                    path: "src/lib.rs".to_string()
                },
                GitChange {
                    status: "??".to_string(),
                    path: "notes.txt".to_string()
                },
            ]
        );
    }

    #[test]
    fn parse_status_ahead_marker_does_not_leak_into_branch() {
        let parsed = parse_status("## main...origin/main [ahead 1]\n");
        assert_eq!(parsed.branch, "main");
    }

    #[test]
    fn parse_status_fresh_repository_reports_its_branch() {
        let parsed = parse_status("## No commits yet on main\n?? a.txt\n");
        assert_eq!(parsed.branch, "main");
        assert!(!parsed.clean);
    }

    #[test]
    fn parse_status_detached_head() {
        let parsed = parse_status("## HEAD (no branch)\n");
        assert_eq!(parsed.branch, "HEAD");
        assert!(parsed.clean);
    }
}
