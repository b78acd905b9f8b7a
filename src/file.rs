// src/file.rs

use std::{
    fs,
    io::{self, BufWriter, Write},
    path::Path,
};

use crate::error::{Error, Result};

/// Create `dir` (and parents) if missing. Idempotent.
/// A non-directory already sitting at `dir` is a configuration problem.
pub fn ensure_directory(dir: &Path) -> Result<()> {
    if dir.exists() && !dir.is_dir() {
        return Err(Error::config(format!(
            "Path exists but is not a directory: {}",
            dir.display()
        )));
    }
    if !dir.exists() {
        fs::create_dir_all(dir).map_err(|source| Error::Storage {
            path: dir.to_path_buf(),
            source,
        })?;
    }
    Ok(())
}

/// Ensure the parent directory of `path` exists.
pub fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            ensure_directory(parent)?;
        }
    }
    Ok(())
}

/// Create/truncate `path` and hand a buffered writer to `body`.
pub fn write_with<F>(path: &Path, body: F) -> io::Result<()>
where
    F: FnOnce(&mut BufWriter<fs::File>) -> io::Result<()>,
{
    let file = fs::File::create(path)?; // truncate/overwrite
    let mut out = BufWriter::new(file);
    body(&mut out)?;
    out.flush()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ensure_directory_is_idempotent() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("a/b");
        ensure_directory(&dir).unwrap();
        ensure_directory(&dir).unwrap();
        assert!(dir.is_dir());
    }

    #[test]
    fn ensure_directory_rejects_file() {
        let tmp = tempfile::tempdir().unwrap();
        let f = tmp.path().join("plain");
        fs::write(&f, "x").unwrap();
        assert!(matches!(ensure_directory(&f), Err(Error::Config(_))));
    }
}
