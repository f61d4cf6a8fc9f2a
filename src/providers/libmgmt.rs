use crate::consts::{DEFAULT_GITIGNORE, DEFAULT_PACKAGE_VERSION, MANIFEST_FILE_NAME};
use crate::exceptions::DevcallError;
use crate::fs::{atomic_write_json, atomic_write_text, read_json};
use crate::models::PackageManifest;
use crate::provider::Provider;
use crate::registry::{CallContext, Registry, from_args};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

pub struct LibProvider;

impl Provider for LibProvider {
    fn name(&self) -> &'static str {
        "lib"
    }

    fn register(&self, registry: &mut Registry) -> Result<(), DevcallError> {
        let name = self.name();
        registry.register_fn("lib.new", name, "Scaffold a new library package", new)?;
        registry.register_fn("lib.info", name, "Read a package manifest", info)?;
        registry.register_fn("lib.list", name, "List packages under a directory", list)?;
        Ok(())
    }
}

// pnpm-style package names, optionally scoped (@scope/name)
const PACKAGE_NAME_PATTERN: &str = r"^(@[a-z0-9][a-z0-9._-]*/)?[a-z0-9][a-z0-9._-]*$";

fn is_valid_package_name(name: &str) -> bool {
    static RE: std::sync::LazyLock<regex::Regex> =
        std::sync::LazyLock::new(|| regex::Regex::new(PACKAGE_NAME_PATTERN).unwrap());
    RE.is_match(name)
}

/// Scan the direct subdirectories of `root` for package manifests.
/// Returns (package directory, manifest) sorted by package name.
pub(crate) fn scan_packages(root: &Path) -> Result<Vec<(PathBuf, PackageManifest)>, DevcallError> {
    let mut packages = Vec::new();

    for entry in fs::read_dir(root)? {
        let entry = entry?;
        let dir = entry.path();
        if !dir.is_dir() {
            continue;
        }
        let manifest_path = dir.join(MANIFEST_FILE_NAME);
        if !manifest_path.is_file() {
            continue;
        }
        let manifest: PackageManifest = read_json(&manifest_path).map_err(|e| {
            DevcallError::InvalidInput(format!(
                "bad manifest in '{}': {}",
                dir.display(),
                e
            ))
        })?;
        packages.push((dir, manifest));
    }

    packages.sort_by(|a, b| a.1.name.cmp(&b.1.name));
    Ok(packages)
}

#[derive(Deserialize)]
struct NewArgs {
    name: String,
    #[serde(default)]
    dir: Option<String>,
    #[serde(default)]
    description: Option<String>,
}

#[derive(Deserialize)]
struct InfoArgs {
    dir: String,
}

#[derive(Deserialize)]
struct ListArgs {
    root: String,
}

#[derive(Serialize)]
struct NewResponse {
    dir: String,
    manifest: PackageManifest,
}

#[derive(Serialize)]
struct ListEntry {
    name: String,
    version: String,
    dir: String,
}

#[derive(Serialize)]
struct ListResponse {
    packages: Vec<ListEntry>,
}

fn new(ctx: &CallContext, args: Value) -> Result<Value, DevcallError> {
    let args: NewArgs = from_args(args)?;

    if !is_valid_package_name(&args.name) {
        return Err(DevcallError::InvalidInput(format!(
            "invalid package name '{}'",
            args.name
        )));
    }

    // Scoped names keep only the part after the scope as the directory name
    let dir_name = args.name.rsplit('/').next().unwrap_or(&args.name);
    let parent = match args.dir.as_deref() {
        Some(dir) => ctx.resolve(dir),
        None => ctx.cwd().to_path_buf(),
    };
    let target = parent.join(dir_name);

    if target.exists() {
        return Err(DevcallError::InvalidInput(format!(
            "'{}' already exists",
            target.display()
        )));
    }

    fs::create_dir_all(target.join("src"))?;

    let manifest = PackageManifest {
        name: args.name.clone(),
        version: DEFAULT_PACKAGE_VERSION.to_string(),
        description: args.description,
        dependencies: BTreeMap::new(),
    };
    atomic_write_json(&target.join(MANIFEST_FILE_NAME), &manifest)?;
    atomic_write_text(target.join("src").join("index.ts"), "export {};\n")?;
    atomic_write_text(target.join(".gitignore"), DEFAULT_GITIGNORE)?;

    Ok(serde_json::to_value(NewResponse {
        dir: target.to_string_lossy().to_string(),
        manifest,
    })?)
}

fn info(ctx: &CallContext, args: Value) -> Result<Value, DevcallError> {
    let args: InfoArgs = from_args(args)?;
    let manifest: PackageManifest =
        read_json(&ctx.resolve(&args.dir).join(MANIFEST_FILE_NAME))?;
    Ok(serde_json::to_value(manifest)?)
}

fn list(ctx: &CallContext, args: Value) -> Result<Value, DevcallError> {
    let args: ListArgs = from_args(args)?;
    let packages = scan_packages(&ctx.resolve(&args.root))?
        .into_iter()
        .map(|(dir, manifest)| ListEntry {
            name: manifest.name,
            version: manifest.version,
            dir: dir.to_string_lossy().to_string(),
        })
        .collect();
    Ok(serde_json::to_value(ListResponse { packages })?)
}
