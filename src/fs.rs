use crate::exceptions::DevcallError;
use std::fs;
use std::io::Write;
use std::path::Component;
use std::path::Path;
use std::path::PathBuf;
use tempfile::NamedTempFile;

/// Atomically write text to a file using a temporary file + rename strategy.
pub fn atomic_write_text<P: AsRef<Path>>(path: P, text: &str) -> Result<(), DevcallError> {
    let path = path.as_ref();
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(dir)?;

    // Create temp file in the same directory to ensure atomic rename works across filesystems
    let mut temp_file = NamedTempFile::new_in(dir)?;

    temp_file.write_all(text.as_bytes())?;

    // Persist replaces the destination path atomically
    temp_file
        .persist(path)
        .map_err(|e| DevcallError::Io(e.error))?;

    Ok(())
}

pub fn atomic_write_json<T: serde::Serialize>(
    path: &Path,
    data: &T,
) -> Result<(), DevcallError> {
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(dir)?;

    let mut temp_file = NamedTempFile::new_in(dir)?;

    {
        let mut writer = std::io::BufWriter::new(&mut temp_file);
        serde_json::to_writer_pretty(&mut writer, data)?;
        writer.write_all(b"\n")?;
        writer.flush()?;
    }

    temp_file
        .persist(path)
        .map_err(|e| DevcallError::Io(e.error))?;
    Ok(())
}

pub fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, DevcallError> {
    let content = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

/// Collapse `.` and `..` components without touching the filesystem, so
/// non-existent targets can still be resolved.
pub fn normalize_path(path: &Path) -> PathBuf {
    path.components()
        .fold(PathBuf::new(), |mut acc, component| {
            match component {
                // ".." means pop the last segment
                Component::ParentDir => {
                    acc.pop();
                }
                // "." means do nothing
                Component::CurDir => {}
                // Normal segments, Root, and Prefix just get pushed
                c => acc.push(c.as_os_str()),
            };
            acc
        })
}
