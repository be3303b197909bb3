//! Append a new issue section to a store document.

use crate::error::{IssueError, Result};
use crate::index::{self, IndexUpdate};
use crate::layout::{Layout, DEFAULT_CATEGORY};
use crate::render::{render_document_header, render_section};
use crate::slug::slugify;
use crate::store::Store;
use chrono::NaiveDate;
use std::fs::{self, OpenOptions};
use std::io::{Read, Write};
use std::path::PathBuf;
use tracing::{debug, info};

/// Tag applied when the caller gives none.
pub const DEFAULT_TAG: &str = "#general";

/// How the index statistics follow an append.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum IndexMode {
    /// Bump `Total Issues` by one.
    #[default]
    Increment,
    /// Recompute every counter from the store.
    Recount,
}

#[derive(Debug, Default)]
pub struct AppendRequest {
    pub title: String,
    /// Explicit document; relative paths are taken from the store root.
    pub target: Option<PathBuf>,
    pub category: Option<String>,
    pub tags: Vec<String>,
    pub index_mode: IndexMode,
}

#[derive(Debug)]
pub struct AppendOutcome {
    pub path: PathBuf,
    pub id: String,
    /// True when the document did not exist before this append.
    pub created: bool,
    pub index: IndexUpdate,
}

/// Normalize a tag list: `#` prefix, no blanks, no repeats, default when empty.
pub fn normalize_tags(tags: &[String]) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for raw in tags {
        let tag = raw.trim();
        if tag.is_empty() || tag == "#" {
            continue;
        }
        let tag = if tag.starts_with('#') {
            tag.to_string()
        } else {
            format!("#{}", tag)
        };
        if !out.contains(&tag) {
            out.push(tag);
        }
    }
    if out.is_empty() {
        out.push(DEFAULT_TAG.to_string());
    }
    out
}

fn target_path(layout: &Layout, request: &AppendRequest) -> PathBuf {
    match &request.target {
        Some(target) => layout.resolve_target(target),
        None => layout.category_document(
            request.category.as_deref().unwrap_or(DEFAULT_CATEGORY),
        ),
    }
}

/// Append a section built from `request` and update the index.
///
/// Input is validated before the filesystem is touched. Once the section is
/// written, index problems are reported in [`AppendOutcome::index`] and never
/// undo the append.
pub fn append(store: &Store, request: &AppendRequest, today: NaiveDate) -> Result<AppendOutcome> {
    let title = request.title.trim();
    if title.is_empty() {
        return Err(IssueError::InvalidInput("title must not be empty".to_string()));
    }
    let layout = store.layout();
    let path = target_path(layout, request);
    if path.is_dir() {
        return Err(IssueError::InvalidInput(format!(
            "target is a directory: {}",
            path.display()
        )));
    }
    let tags = normalize_tags(&request.tags);
    let id = slugify(title);

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .map_err(|e| IssueError::io("failed to create directory", parent, e))?;
    }

    let mut file = OpenOptions::new()
        .read(true)
        .append(true)
        .create(true)
        .open(&path)
        .map_err(|e| IssueError::io("failed to open", &path, e))?;
    let mut existing = String::new();
    file.read_to_string(&mut existing)
        .map_err(|e| IssueError::io("failed to read", &path, e))?;
    let created = existing.is_empty();

    let mut text = String::new();
    if created {
        let stem = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or(DEFAULT_CATEGORY);
        text.push_str(&render_document_header(stem));
    } else if !existing.ends_with('\n') {
        text.push('\n');
    }
    text.push_str(&render_section(title, &tags));

    file.write_all(text.as_bytes())
        .and_then(|()| file.sync_all())
        .map_err(|e| IssueError::io("failed to write", &path, e))?;
    info!(path = %path.display(), %id, created, "appended issue");

    let index = update_index(store, request.index_mode, today);
    Ok(AppendOutcome {
        path,
        id,
        created,
        index,
    })
}

fn update_index(store: &Store, mode: IndexMode, today: NaiveDate) -> IndexUpdate {
    let result = match mode {
        IndexMode::Increment => index::increment_total(&store.layout().index_path())
            .map(|(from, to)| IndexUpdate::Incremented { from, to }),
        IndexMode::Recount => index::recount(store, today).map(IndexUpdate::Recounted),
    };
    match result {
        Ok(update) => {
            debug!(?update, "index updated");
            update
        }
        Err(e) => {
            debug!(error = %e, "index statistics not updated");
            IndexUpdate::Skipped(e)
        }
    }
}
