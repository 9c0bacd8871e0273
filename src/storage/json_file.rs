use std::fs;
use std::io::Write;
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tempfile::NamedTempFile;

use crate::errors::FeederResult;

/// Read a JSON document. A missing file or blank content yields `None`.
pub fn read<T: DeserializeOwned>(path: &Path) -> FeederResult<Option<T>> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };

    if content.trim().is_empty() {
        return Ok(None);
    }

    Ok(Some(serde_json::from_str(&content)?))
}

/// Pretty-print `value` to a sibling temp file and rename it over `path`
pub fn write_atomic<T: Serialize + ?Sized>(path: &Path, value: &T) -> FeederResult<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir)?;

    let mut file = NamedTempFile::new_in(dir)?;
    serde_json::to_writer_pretty(&mut file, value)?;
    file.write_all(b"\n")?;
    file.as_file().sync_all()?;
    file.persist(path).map_err(|e| e.error)?;

    Ok(())
}
