use std::fs::Metadata;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// One filesystem node visited during traversal
#[derive(Debug, Clone)]
pub struct FileEntry {
    pub path: PathBuf,
    pub is_dir: bool,
    pub size: u64,
    /// File extension including the leading dot (e.g. `".log"`), `None` when absent
    pub extension: Option<String>,
}

impl FileEntry {
    /// Build a `FileEntry` from a path and its metadata
    pub fn new<P: AsRef<Path>>(path: P, metadata: &Metadata) -> Self {
        let path = path.as_ref().to_path_buf();
        let extension = dot_extension(&path);

        FileEntry {
            is_dir: metadata.is_dir(),
            size: metadata.len(),
            extension,
            path,
        }
    }

    /// Build a `FileEntry` by looking up metadata on demand
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let metadata = std::fs::metadata(path).map_err(|source| Error::Metadata {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::new(path, &metadata))
    }

    /// File name portion of the path, lossy on non-UTF-8 names
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

/// Derive the extension with its leading dot, matching how operators type
/// filters (`".log"` rather than `"log"`)
fn dot_extension(path: &Path) -> Option<String> {
    path.extension()
        .map(|ext| format!(".{}", ext.to_string_lossy()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_entry_from_file() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let path = temp_dir.path().join("notes.log");
        fs::write(&path, "hello world!")?;

        let entry = FileEntry::from_path(&path)?;
        assert!(!entry.is_dir);
        assert_eq!(entry.size, 12);
        assert_eq!(entry.extension.as_deref(), Some(".log"));
        assert_eq!(entry.file_name(), "notes.log");

        Ok(())
    }

    #[test]
    fn test_entry_from_directory() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let entry = FileEntry::from_path(temp_dir.path())?;
        assert!(entry.is_dir);

        Ok(())
    }

    #[test]
    fn test_entry_without_extension() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let path = temp_dir.path().join("Makefile");
        fs::write(&path, "all:")?;

        let entry = FileEntry::from_path(&path)?;
        assert_eq!(entry.extension, None);

        Ok(())
    }

    #[test]
    fn test_entry_missing_path() {
        let result = FileEntry::from_path("/nonexistent/definitely/missing");
        assert!(matches!(result, Err(Error::Metadata { .. })));
    }
}
