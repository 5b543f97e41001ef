//! Locked file access shared by the plan store and session history.
//!
//! Readers hold a shared `fs2` lock for the duration of one read; writers
//! hold an exclusive lock. Whole-file replacement goes through a temp file
//! in the same directory so readers never observe a half-written file.

use crate::{Error, Result};
use fs2::FileExt;
use std::fs::{self, File, OpenOptions};
use std::io::{Read, Write};
use std::path::Path;
use tempfile::NamedTempFile;

/// Contents of `path` under a shared lock; `None` when the file is absent
pub(crate) fn read_shared(path: &Path) -> Result<Option<String>> {
    let mut file = match File::open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };

    FileExt::lock_shared(&file)?;
    let mut contents = String::new();
    let read = file.read_to_string(&mut contents);
    let _ = FileExt::unlock(&file);
    read?;

    Ok(Some(contents))
}

/// Append one newline-terminated record under an exclusive lock
pub(crate) fn append_line(path: &Path, line: &str) -> Result<()> {
    create_parent(path)?;

    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    FileExt::lock_exclusive(&file)?;

    // single write so a record is never split around another writer's
    let mut record = String::with_capacity(line.len() + 1);
    record.push_str(line);
    record.push('\n');
    let written = file.write_all(record.as_bytes()).and_then(|_| file.flush());
    let _ = FileExt::unlock(&file);
    written?;

    Ok(())
}

/// Replace `path` with `contents` via temp file, fsync and rename
pub(crate) fn replace_atomically(path: &Path, contents: &[u8]) -> Result<()> {
    let dir = create_parent(path)?;

    let mut temp = NamedTempFile::new_in(dir)?;
    FileExt::lock_exclusive(temp.as_file())?;
    temp.write_all(contents)?;
    temp.as_file().sync_all()?;
    FileExt::unlock(temp.as_file())?;

    temp.persist(path).map_err(|e| Error::Io(e.error))?;
    Ok(())
}

fn create_parent(path: &Path) -> Result<&Path> {
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(dir)?;
    Ok(dir)
}
