//! Enumeration and reading of documents under the store roots.

use crate::error::{IssueError, Result};
use crate::layout::{Kind, Layout};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

pub struct Store {
    layout: Layout,
}

impl Store {
    pub fn new(layout: Layout) -> Self {
        Store { layout }
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    /// All markdown documents of one kind, sorted. A missing root yields none.
    pub fn documents_of(&self, kind: Kind) -> Vec<PathBuf> {
        let root = self.layout.kind_root(kind);
        if !root.is_dir() {
            debug!(root = %root.display(), "store root missing");
            return Vec::new();
        }
        let Some(root_str) = root.to_str() else {
            warn!(root = %root.display(), "skipping non UTF-8 store root");
            return Vec::new();
        };
        let suffix = if kind.is_nested() { "**/*.md" } else { "*.md" };
        let pattern = format!("{}/{}", glob::Pattern::escape(root_str), suffix);

        let paths = match glob::glob(&pattern) {
            Ok(paths) => paths,
            Err(e) => {
                warn!(%pattern, error = %e, "invalid glob pattern");
                return Vec::new();
            }
        };
        let mut files: Vec<PathBuf> = paths
            .filter_map(|entry| match entry {
                Ok(p) => Some(p),
                Err(e) => {
                    warn!(error = %e, "skipping unreadable path");
                    None
                }
            })
            .filter(|p| p.is_file())
            .collect();
        files.sort();
        files
    }

    /// Every document under the three roots, root by root.
    pub fn documents(&self) -> Vec<PathBuf> {
        Kind::ALL
            .into_iter()
            .flat_map(|kind| self.documents_of(kind))
            .collect()
    }

    /// Read a document. Invalid UTF-8 is replaced rather than rejected so the
    /// valid lines stay searchable.
    pub fn read(&self, path: &Path) -> Result<String> {
        let bytes = fs::read(path).map_err(|e| IssueError::io("failed to read", path, e))?;
        match String::from_utf8(bytes) {
            Ok(content) => Ok(content),
            Err(e) => {
                debug!(path = %path.display(), "document is not valid UTF-8");
                Ok(String::from_utf8_lossy(e.as_bytes()).into_owned())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn touch(root: &Path, rel: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "# x\n").unwrap();
    }

    #[test]
    fn enumerates_each_root_with_its_depth() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "quick-reference/docker.md");
        touch(dir.path(), "quick-reference/nested/ignored.md");
        touch(dir.path(), "quick-reference/notes.txt");
        touch(dir.path(), "platform-specific/macos.md");
        touch(dir.path(), "detailed-guides/database/postgres.md");
        touch(dir.path(), "detailed-guides/memory/leaks/node.md");
        touch(dir.path(), "README.md");

        let store = Store::new(Layout::new(dir.path()));
        assert_eq!(store.documents_of(Kind::QuickFix).len(), 1);
        assert_eq!(store.documents_of(Kind::Platform).len(), 1);
        assert_eq!(store.documents_of(Kind::DetailedGuide).len(), 2);
        assert_eq!(store.documents().len(), 4);
    }

    #[test]
    fn missing_roots_are_empty() {
        let dir = TempDir::new().unwrap();
        let store = Store::new(Layout::new(dir.path()));
        assert!(store.documents().is_empty());
    }

    #[test]
    fn read_replaces_invalid_utf8() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("broken.md");
        fs::write(&path, b"ok line\n\xff\xfe bad\nconda PATH\n").unwrap();
        let store = Store::new(Layout::new(dir.path()));
        let content = store.read(&path).unwrap();
        assert_eq!(content.lines().count(), 3);
        assert!(content.contains("conda PATH"));
    }

    #[test]
    fn read_missing_is_io_error() {
        let dir = TempDir::new().unwrap();
        let store = Store::new(Layout::new(dir.path()));
        let err = store.read(&dir.path().join("nope.md")).unwrap_err();
        assert!(matches!(err, IssueError::Io { .. }));
    }
}
