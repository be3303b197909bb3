//! Store layout: where documents live and which kind of issue they hold.
//!
//! The category → location convention is kept in one table here so that the
//! appender, search and statistics agree on it.

use crate::slug::slugify;
use std::path::{Path, PathBuf};

pub const QUICK_REFERENCE_DIR: &str = "quick-reference";
pub const DETAILED_GUIDES_DIR: &str = "detailed-guides";
pub const PLATFORM_SPECIFIC_DIR: &str = "platform-specific";
pub const INDEX_FILE: &str = "README.md";

/// Category used when none is given.
pub const DEFAULT_CATEGORY: &str = "other";

/// Categories that are stored as platform notes rather than quick fixes.
const PLATFORMS: &[&str] = &["macos", "linux", "windows"];

/// Kind of issue a document holds, decided by its root directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    QuickFix,
    Platform,
    DetailedGuide,
}

impl Kind {
    pub const ALL: [Kind; 3] = [Kind::QuickFix, Kind::Platform, Kind::DetailedGuide];

    pub fn dir_name(self) -> &'static str {
        match self {
            Kind::QuickFix => QUICK_REFERENCE_DIR,
            Kind::Platform => PLATFORM_SPECIFIC_DIR,
            Kind::DetailedGuide => DETAILED_GUIDES_DIR,
        }
    }

    /// Whether documents of this kind are nested in category subdirectories.
    pub fn is_nested(self) -> bool {
        matches!(self, Kind::DetailedGuide)
    }
}

/// Root of a knowledge base checkout.
#[derive(Debug, Clone)]
pub struct Layout {
    root: PathBuf,
}

impl Layout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Layout { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn kind_root(&self, kind: Kind) -> PathBuf {
        self.root.join(kind.dir_name())
    }

    pub fn index_path(&self) -> PathBuf {
        self.root.join(INDEX_FILE)
    }

    /// Resolve a user-supplied target file against the store root.
    pub fn resolve_target(&self, target: &Path) -> PathBuf {
        if target.is_absolute() {
            target.to_path_buf()
        } else {
            self.root.join(target)
        }
    }

    /// Default document for a category: `<root>/<kind dir>/<category>.md`.
    pub fn category_document(&self, category: &str) -> PathBuf {
        let (kind, name) = resolve_category(category);
        self.kind_root(kind).join(format!("{}.md", name))
    }

    /// Path shown to the user: relative to the store root when possible.
    pub fn display_path<'a>(&self, path: &'a Path) -> std::path::Display<'a> {
        path.strip_prefix(&self.root).unwrap_or(path).display()
    }
}

/// Map a category string to the kind of document it is stored in and the
/// normalized category name used for its file.
pub fn resolve_category(category: &str) -> (Kind, String) {
    let mut name = slugify(category);
    if name.is_empty() {
        name = DEFAULT_CATEGORY.to_string();
    }
    let kind = if PLATFORMS.contains(&name.as_str()) {
        Kind::Platform
    } else {
        Kind::QuickFix
    };
    (kind, name)
}
