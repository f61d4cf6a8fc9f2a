use crate::exceptions::DevcallError;
use crate::fs::atomic_write_text;
use crate::provider::Provider;
use crate::registry::{CallContext, Registry, from_args};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs;

pub struct FsProvider;

impl Provider for FsProvider {
    fn name(&self) -> &'static str {
        "fs"
    }

    fn register(&self, registry: &mut Registry) -> Result<(), DevcallError> {
        let name = self.name();
        registry.register_fn("fs.read", name, "Read a file as UTF-8 text", read)?;
        registry.register_fn("fs.write", name, "Atomically write text to a file", write)?;
        registry.register_fn("fs.exists", name, "Check whether a path exists", exists)?;
        registry.register_fn(
            "fs.mkdirp",
            name,
            "Create a directory and its parents",
            mkdirp,
        )?;
        registry.register_fn("fs.rm", name, "Remove a file or directory", rm)?;
        registry.register_fn("fs.ls", name, "List directory entries", ls)?;
        Ok(())
    }
}

#[derive(Deserialize)]
struct PathArgs {
    path: String,
}

#[derive(Deserialize)]
struct WriteArgs {
    path: String,
    content: String,
}

#[derive(Deserialize)]
struct RmArgs {
    path: String,
    #[serde(default)]
    recursive: bool,
}

#[derive(Serialize)]
struct ReadResponse {
    content: String,
}

#[derive(Serialize)]
struct ExistsResponse {
    exists: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    file_type: Option<String>,
}

#[derive(Serialize)]
struct LsEntry {
    name: String,
    file_type: String,
}

#[derive(Serialize)]
struct LsResponse {
    entries: Vec<LsEntry>,
}

fn file_type_label(meta: &fs::Metadata) -> String {
    if meta.is_dir() {
        "dir".to_string()
    } else if meta.is_symlink() {
        "symlink".to_string()
    } else if meta.is_file() {
        "file".to_string()
    } else {
        "other".to_string()
    }
}

fn read(ctx: &CallContext, args: Value) -> Result<Value, DevcallError> {
    let args: PathArgs = from_args(args)?;
    let content = fs::read_to_string(ctx.resolve(&args.path))?;
    Ok(serde_json::to_value(ReadResponse { content })?)
}

fn write(ctx: &CallContext, args: Value) -> Result<Value, DevcallError> {
    let args: WriteArgs = from_args(args)?;
    atomic_write_text(ctx.resolve(&args.path), &args.content)?;
    Ok(Value::Null)
}

fn exists(ctx: &CallContext, args: Value) -> Result<Value, DevcallError> {
    let args: PathArgs = from_args(args)?;
    // symlink_metadata so dangling links still report their own type
    let response = match fs::symlink_metadata(ctx.resolve(&args.path)) {
        Ok(meta) => ExistsResponse {
            exists: true,
            file_type: Some(file_type_label(&meta)),
        },
        Err(_) => ExistsResponse {
            exists: false,
            file_type: None,
        },
    };
    Ok(serde_json::to_value(response)?)
}

fn mkdirp(ctx: &CallContext, args: Value) -> Result<Value, DevcallError> {
    let args: PathArgs = from_args(args)?;
    fs::create_dir_all(ctx.resolve(&args.path))?;
    Ok(Value::Null)
}

fn rm(ctx: &CallContext, args: Value) -> Result<Value, DevcallError> {
    let args: RmArgs = from_args(args)?;
    let target = ctx.resolve(&args.path);
    let meta = fs::symlink_metadata(&target)?;

    if meta.is_dir() {
        if !args.recursive {
            return Err(DevcallError::InvalidInput(format!(
                "'{}' is a directory (pass recursive=true)",
                args.path
            )));
        }
        fs::remove_dir_all(&target)?;
    } else {
        fs::remove_file(&target)?;
    }
    Ok(Value::Null)
}

fn ls(ctx: &CallContext, args: Value) -> Result<Value, DevcallError> {
    let args: PathArgs = from_args(args)?;
    let mut entries = Vec::new();

    for entry in fs::read_dir(ctx.resolve(&args.path))? {
        let entry = entry?;
        let meta = entry.metadata()?;
        entries.push(LsEntry {
            name: entry.file_name().to_string_lossy().to_string(),
            file_type: file_type_label(&meta),
        });
    }
    entries.sort_by(|a, b| a.name.cmp(&b.name));

    Ok(serde_json::to_value(LsResponse { entries })?)
}
