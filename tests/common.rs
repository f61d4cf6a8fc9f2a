use devcall::exceptions::DevcallError;
use devcall::registry::{ProcPath, Registry};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

#[allow(dead_code)]
pub fn bundled_registry() -> Registry {
    devcall::bundle::build().unwrap()
}

/// Dispatch a dot-path procedure with `cwd` as the resolution root.
#[allow(dead_code)]
pub fn call(
    registry: &Registry,
    path: &str,
    args: Value,
    cwd: &Path,
) -> Result<Value, DevcallError> {
    registry.call_from(&ProcPath::parse(path).unwrap(), args, cwd.to_path_buf())
}

/// Seed a pnpm-style package directory under `root`.
#[allow(dead_code)]
pub fn write_package(root: &Path, name: &str, deps: &[&str]) {
    let dir_name = name.rsplit('/').next().unwrap();
    let dir = root.join(dir_name);
    fs::create_dir_all(dir.join("src")).unwrap();

    let deps_map: serde_json::Map<String, Value> = deps
        .iter()
        .map(|dep| (dep.to_string(), Value::String("workspace:*".to_string())))
        .collect();
    let manifest = serde_json::json!({
        "name": name,
        "version": "1.0.0",
        "dependencies": deps_map,
    });
    fs::write(
        dir.join("package.json"),
        serde_json::to_string_pretty(&manifest).unwrap(),
    )
    .unwrap();
}

/// Write an executable stub script and return its path.
#[allow(dead_code)]
pub fn write_stub_bin(dir: &Path, name: &str, script: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, script).unwrap();

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mut perms = fs::metadata(&path).unwrap().permissions();
        perms.set_mode(0o755);
        fs::set_permissions(&path, perms).unwrap();
    }
    path
}

/// Initialize a git repository with a local identity so commits work in CI.
#[allow(dead_code)]
pub fn init_git_repo(root: &Path) {
    let run = |args: &[&str]| {
        let status = Command::new("git")
            .args(args)
            .current_dir(root)
            .status()
            .unwrap();
        assert!(status.success(), "git {:?} failed", args);
    };
    run(&["init", "-b", "main"]);
    run(&["config", "user.email", "dev@example.com"]);
    run(&["config", "user.name", "Dev"]);
}
