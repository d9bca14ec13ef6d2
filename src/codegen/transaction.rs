//! All-or-nothing artifact writes.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

use crate::error::{CodegenError, CodegenResult};

struct StagedWrite {
    path: PathBuf,
    content: String,
    prior: Option<String>,
}

/// Stages writes and applies them together.
///
/// Each file is written through a temp file in the same directory and renamed
/// into place. If any write fails, files already written in this transaction
/// are restored from their prior contents (or removed when they did not exist),
/// and directories the transaction created are removed again once empty.
/// Dropping an uncommitted transaction rolls back the same way.
#[derive(Default)]
pub struct FileTransaction {
    staged: Vec<StagedWrite>,
    applied: Vec<(PathBuf, Option<String>)>,
    /// Outermost first.
    created_dirs: Vec<PathBuf>,
    committed: bool,
}

impl FileTransaction {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stage a write; `prior` is the file's current content, if it exists.
    pub fn stage_write(&mut self, path: &Path, content: String, prior: Option<String>) {
        self.staged.push(StagedWrite {
            path: path.to_path_buf(),
            content,
            prior,
        });
    }

    pub fn len(&self) -> usize {
        self.staged.len()
    }

    pub fn is_empty(&self) -> bool {
        self.staged.is_empty()
    }

    pub fn commit(mut self) -> CodegenResult<()> {
        let staged = std::mem::take(&mut self.staged);
        for write in staged {
            let result = create_parent_dirs(&write.path, &mut self.created_dirs)
                .and_then(|()| atomic_write(&write.path, &write.content));
            if let Err(source) = result {
                self.rollback();
                return Err(CodegenError::ArtifactWrite {
                    path: write.path,
                    source,
                });
            }
            tracing::debug!(path = %write.path.display(), "artifact written");
            self.applied.push((write.path, write.prior));
        }
        self.committed = true;
        Ok(())
    }

    fn rollback(&mut self) {
        while let Some((path, prior)) = self.applied.pop() {
            let restored = match &prior {
                Some(content) => atomic_write(&path, content),
                None => fs::remove_file(&path),
            };
            match restored {
                Ok(()) => tracing::info!(path = %path.display(), "rolled back artifact"),
                Err(e) => tracing::error!(
                    path = %path.display(),
                    error = %e,
                    "failed to roll back artifact"
                ),
            }
        }
        while let Some(dir) = self.created_dirs.pop() {
            if let Err(e) = fs::remove_dir(&dir) {
                tracing::debug!(path = %dir.display(), error = %e, "left directory in place");
            }
        }
    }
}

impl Drop for FileTransaction {
    fn drop(&mut self) {
        if !self.committed && !(self.applied.is_empty() && self.created_dirs.is_empty()) {
            self.rollback();
        }
    }
}

/// Create the missing ancestors of `path`, outermost first, recording each one.
fn create_parent_dirs(path: &Path, created: &mut Vec<PathBuf>) -> io::Result<()> {
    let Some(parent) = path.parent() else {
        return Ok(());
    };
    let missing: Vec<&Path> = parent
        .ancestors()
        .take_while(|dir| !dir.as_os_str().is_empty() && !dir.exists())
        .collect();
    for dir in missing.into_iter().rev() {
        match fs::create_dir(dir) {
            Ok(()) => created.push(dir.to_path_buf()),
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {}
            Err(e) => return Err(e),
        }
    }
    Ok(())
}

fn atomic_write(path: &Path, content: &str) -> io::Result<()> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut temp_file = NamedTempFile::new_in(parent)?;
    temp_file.write_all(content.as_bytes())?;
    temp_file.flush()?;
    temp_file.persist(path).map_err(|e| e.error)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use tempfile::TempDir;

    #[test]
    fn test_commit_writes_all_files() {
        let dir = TempDir::new().unwrap();
        let mut txn = FileTransaction::new();
        txn.stage_write(&dir.path().join("a/one.rs"), "one".to_string(), None);
        txn.stage_write(&dir.path().join("b/two.rs"), "two".to_string(), None);
        assert_eq!(txn.len(), 2);

        txn.commit().unwrap();

        assert_eq!(fs::read_to_string(dir.path().join("a/one.rs")).unwrap(), "one");
        assert_eq!(fs::read_to_string(dir.path().join("b/two.rs")).unwrap(), "two");
    }

    #[test]
    fn test_failed_write_rolls_back_earlier_writes() {
        // Arrange
        let dir = TempDir::new().unwrap();
        let existing = dir.path().join("existing.rs");
        fs::write(&existing, "old").unwrap();
        let created = dir.path().join("created.rs");
        // A regular file where a directory is needed makes the last write fail.
        fs::write(dir.path().join("blocker"), "").unwrap();

        let mut txn = FileTransaction::new();
        txn.stage_write(&existing, "new".to_string(), Some("old".to_string()));
        txn.stage_write(&created, "fresh".to_string(), None);
        txn.stage_write(&dir.path().join("blocker/inner.rs"), "x".to_string(), None);

        // Act
        let result = txn.commit();

        // Assert
        assert_matches!(result, Err(CodegenError::ArtifactWrite { .. }));
        assert_eq!(fs::read_to_string(&existing).unwrap(), "old");
        assert!(!created.exists());
    }

    #[test]
    fn test_rollback_removes_directories_it_created() {
        // Arrange
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("models")).unwrap();
        fs::write(dir.path().join("models/keep.rs"), "kept").unwrap();
        fs::write(dir.path().join("blocker"), "").unwrap();

        let mut txn = FileTransaction::new();
        txn.stage_write(&dir.path().join("graphql/resolvers/type_user.rs"), "a".to_string(), None);
        txn.stage_write(&dir.path().join("models/constraints/data/c.json"), "b".to_string(), None);
        txn.stage_write(&dir.path().join("blocker/inner.rs"), "x".to_string(), None);

        // Act
        let result = txn.commit();

        // Assert
        assert_matches!(result, Err(CodegenError::ArtifactWrite { .. }));
        assert!(!dir.path().join("graphql").exists());
        assert!(!dir.path().join("models/constraints").exists());
        assert_eq!(fs::read_to_string(dir.path().join("models/keep.rs")).unwrap(), "kept");
    }
}
