// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Atomic write-then-rename for small JSON documents, with rotated `.bak`
//! backups so a write that's interrupted mid-rotation never loses both the
//! live file and its most recent good backup.

use automaker_core::Error;
use std::path::{Path, PathBuf};

const MAX_BACKUPS: u32 = 3;

/// `<path>.bak`, `<path>.bak.2`, `<path>.bak.3`, oldest last.
fn backup_path(path: &Path, generation: u32) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    if generation <= 1 {
        name.push(".bak");
    } else {
        name.push(format!(".bak.{generation}"));
    }
    PathBuf::from(name)
}

fn rotate_backups(path: &Path) -> std::io::Result<()> {
    for generation in (1..MAX_BACKUPS).rev() {
        let from = backup_path(path, generation);
        let to = backup_path(path, generation + 1);
        if from.exists() {
            std::fs::rename(&from, &to)?;
        }
    }
    if path.exists() {
        std::fs::rename(path, backup_path(path, 1))?;
    }
    Ok(())
}

/// Write `contents` to `path` durably: serialize to a temp sibling, rotate
/// the existing file into `.bak`, then rename the temp file into place.
/// The rename is the durability point; a crash before it leaves the old
/// file (or its backup) intact.
pub fn write_json_atomic<T: serde::Serialize>(path: &Path, value: &T) -> Result<(), Error> {
    let parent = path.parent().ok_or_else(|| Error::state("path has no parent directory"))?;
    std::fs::create_dir_all(parent).map_err(|source| Error::Persistence {
        path: parent.to_path_buf(),
        source,
    })?;

    let tmp_path = parent.join(format!(
        ".{}.tmp",
        path.file_name().and_then(|n| n.to_str()).unwrap_or("state")
    ));
    let contents = serde_json::to_vec_pretty(value)
        .map_err(|source| Error::PersistenceDecode { path: path.to_path_buf(), source })?;
    std::fs::write(&tmp_path, &contents)
        .map_err(|source| Error::Persistence { path: tmp_path.clone(), source })?;

    rotate_backups(path).map_err(|source| Error::Persistence { path: path.to_path_buf(), source })?;

    std::fs::rename(&tmp_path, path)
        .map_err(|source| Error::Persistence { path: path.to_path_buf(), source })?;

    tracing::debug!(path = %path.display(), bytes = contents.len(), "wrote state file atomically");
    Ok(())
}

/// Read and deserialize `path`; a missing file is `Ok(None)`, never an
/// error, since callers treat "no file yet" as an empty starting state.
pub fn read_json_opt<T: serde::de::DeserializeOwned>(path: &Path) -> Result<Option<T>, Error> {
    match std::fs::read(path) {
        Ok(bytes) => {
            let value = serde_json::from_slice(&bytes)
                .map_err(|source| Error::PersistenceDecode { path: path.to_path_buf(), source })?;
            Ok(Some(value))
        }
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(source) => Err(Error::Persistence { path: path.to_path_buf(), source }),
    }
}

#[cfg(test)]
#[path = "atomic_tests.rs"]
mod tests;
