//! Statistics block of the index document.
//!
//! Two ways to maintain it: [`increment_total`] bumps the `Total Issues`
//! counter after an append and leaves every other byte alone, so the numbers
//! are advisory and can drift. [`recount`] walks the store and rewrites all
//! counters plus the `Last Updated` date.

use crate::error::{IssueError, Result};
use crate::layout::Kind;
use crate::parser::parse_document;
use crate::store::Store;
use chrono::NaiveDate;
use regex::{Captures, Regex};
use std::fs;
use std::path::Path;
use std::sync::LazyLock;
use tracing::warn;

pub const TOTAL_ISSUES: &str = "Total Issues";
pub const QUICK_FIXES: &str = "Quick Fixes";
pub const DETAILED_GUIDES: &str = "Detailed Guides";
pub const LAST_UPDATED: &str = "Last Updated";

static RE_INTEGER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d+").unwrap());

/// A `Label:` statistics line; group 1 keeps everything up to the value,
/// group 2 is the label.
static RE_STAT_LINE: LazyLock<Regex> = LazyLock::new(|| {
    let labels = [TOTAL_ISSUES, QUICK_FIXES, DETAILED_GUIDES, LAST_UPDATED]
        .map(regex::escape)
        .join("|");
    Regex::new(&format!(r"(?m)^([^\r\n]*?({}):(?:\*\*)?)[^\r\n]*", labels)).unwrap()
});

/// Section counts per kind of document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Stats {
    pub quick_fixes: usize,
    pub detailed_guides: usize,
    pub platform_notes: usize,
}

impl Stats {
    pub fn total(&self) -> usize {
        self.quick_fixes + self.detailed_guides + self.platform_notes
    }

    fn add(&mut self, kind: Kind, n: usize) {
        match kind {
            Kind::QuickFix => self.quick_fixes += n,
            Kind::DetailedGuide => self.detailed_guides += n,
            Kind::Platform => self.platform_notes += n,
        }
    }
}

/// Outcome of the index step that follows an append.
#[derive(Debug)]
pub enum IndexUpdate {
    Incremented { from: u64, to: u64 },
    Recounted(Stats),
    /// The append stands; only the index was left as it was.
    Skipped(IssueError),
}

fn index_error(path: &Path, reason: impl Into<String>) -> IssueError {
    IssueError::IndexUpdate {
        path: path.to_path_buf(),
        reason: reason.into(),
    }
}

/// Byte range of the first line containing `needle`, without its line ending.
fn find_line(content: &str, needle: &str) -> Option<(usize, usize)> {
    let mut offset = 0;
    for line in content.split_inclusive('\n') {
        if line.contains(needle) {
            let body = line.trim_end_matches(['\n', '\r']);
            return Some((offset, offset + body.len()));
        }
        offset += line.len();
    }
    None
}

/// Add one to the first integer on the `Total Issues` line.
///
/// Every failure is reported as [`IssueError::IndexUpdate`].
pub fn increment_total(path: &Path) -> Result<(u64, u64)> {
    let content = fs::read_to_string(path)
        .map_err(|e| index_error(path, format!("cannot read index: {}", e)))?;

    let (start, end) = find_line(&content, TOTAL_ISSUES)
        .ok_or_else(|| index_error(path, format!("no '{}' line", TOTAL_ISSUES)))?;
    let found = RE_INTEGER
        .find(&content[start..end])
        .ok_or_else(|| index_error(path, format!("no number on the '{}' line", TOTAL_ISSUES)))?;
    let from: u64 = found
        .as_str()
        .parse()
        .map_err(|e| index_error(path, format!("bad counter '{}': {}", found.as_str(), e)))?;
    let to = from
        .checked_add(1)
        .ok_or_else(|| index_error(path, "counter overflow"))?;

    let mut updated = String::with_capacity(content.len() + 1);
    updated.push_str(&content[..start + found.start()]);
    updated.push_str(&to.to_string());
    updated.push_str(&content[start + found.end()..]);

    fs::write(path, updated)
        .map_err(|e| index_error(path, format!("cannot write index: {}", e)))?;
    Ok((from, to))
}

/// Count issue sections per kind by parsing every document in the store.
///
/// Unreadable documents are skipped with a warning.
pub fn count(store: &Store) -> Stats {
    let mut stats = Stats::default();
    for kind in Kind::ALL {
        for path in store.documents_of(kind) {
            match store.read(&path) {
                Ok(content) => stats.add(kind, parse_document(&content).sections.len()),
                Err(e) => warn!(error = %e, "skipping document"),
            }
        }
    }
    stats
}

/// Rewrite the statistics block of `content` with `stats` and `today`.
///
/// When the index has no statistics at all a `## Statistics` section is
/// appended.
pub fn apply_stats(content: &str, stats: &Stats, today: NaiveDate) -> String {
    let date = today.format("%Y-%m-%d").to_string();
    let values = [
        (TOTAL_ISSUES, stats.total().to_string()),
        (QUICK_FIXES, stats.quick_fixes.to_string()),
        (DETAILED_GUIDES, stats.detailed_guides.to_string()),
        (LAST_UPDATED, date),
    ];

    if find_line(content, TOTAL_ISSUES).is_none() {
        let mut out = content.to_string();
        if !out.is_empty() && !out.ends_with('\n') {
            out.push('\n');
        }
        out.push_str("\n## Statistics\n\n");
        for (label, value) in &values {
            out.push_str(&format!("- **{}:** {}\n", label, value));
        }
        return out;
    }

    // Only the first line per label is rewritten.
    let mut updated: Vec<&str> = Vec::new();
    let out = RE_STAT_LINE
        .replace_all(content, |caps: &Captures| {
            let label = caps.get(2).map_or("", |m| m.as_str());
            match values.iter().find(|(l, _)| *l == label) {
                Some((l, value)) if !updated.contains(l) => {
                    updated.push(*l);
                    format!("{} {}", &caps[1], value)
                }
                _ => caps[0].to_string(),
            }
        })
        .into_owned();
    for (label, _) in &values {
        if !updated.contains(label) {
            warn!(label = *label, "no statistics line for label; left unchanged");
        }
    }
    out
}

/// Recompute statistics from the store and write them to the index document.
pub fn recount(store: &Store, today: NaiveDate) -> Result<Stats> {
    let path = store.layout().index_path();
    let content =
        fs::read_to_string(&path).map_err(|e| IssueError::io("failed to read", &path, e))?;
    let stats = count(store);
    let updated = apply_stats(&content, &stats, today);
    fs::write(&path, updated).map_err(|e| IssueError::io("failed to write", &path, e))?;
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::Layout;
    use tempfile::TempDir;

    const README: &str = "# Troubleshooting\n\n\
        | Topic | Link |\n|---|---|\n| Docker | [x](quick-reference/docker.md) |\n\n\
        ## Statistics\n\n\
        - **Total Issues:** 36\n\
        - **Quick Fixes:** 20\n\
        - **Detailed Guides:** 16\n\
        - **Last Updated:** 2024-01-05\n";

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 18).unwrap()
    }

    #[test]
    fn increment_touches_only_the_counter() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("README.md");
        fs::write(&path, README).unwrap();

        assert_eq!(increment_total(&path).unwrap(), (36, 37));
        let after = fs::read_to_string(&path).unwrap();
        assert_eq!(after, README.replace("Total Issues:** 36", "Total Issues:** 37"));
    }

    #[test]
    fn increment_plain_label_line() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("README.md");
        fs::write(&path, "intro\r\nTotal Issues: 36\r\ntrailer").unwrap();

        increment_total(&path).unwrap();
        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "intro\r\nTotal Issues: 37\r\ntrailer"
        );
    }

    #[test]
    fn increment_without_line_is_index_warning() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("README.md");
        fs::write(&path, "# nothing here\n").unwrap();

        let err = increment_total(&path).unwrap_err();
        assert!(matches!(err, IssueError::IndexUpdate { .. }));
        assert_eq!(fs::read_to_string(&path).unwrap(), "# nothing here\n");
    }

    #[test]
    fn increment_without_number_is_index_warning() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("README.md");
        fs::write(&path, "- **Total Issues:** many\n").unwrap();
        assert!(matches!(
            increment_total(&path).unwrap_err(),
            IssueError::IndexUpdate { .. }
        ));
    }

    #[test]
    fn increment_missing_index_is_index_warning() {
        let dir = TempDir::new().unwrap();
        assert!(matches!(
            increment_total(&dir.path().join("README.md")).unwrap_err(),
            IssueError::IndexUpdate { .. }
        ));
    }

    #[test]
    fn apply_rewrites_all_lines() {
        let stats = Stats {
            quick_fixes: 3,
            detailed_guides: 2,
            platform_notes: 1,
        };
        let out = apply_stats(README, &stats, day());
        assert!(out.contains("- **Total Issues:** 6\n"));
        assert!(out.contains("- **Quick Fixes:** 3\n"));
        assert!(out.contains("- **Detailed Guides:** 2\n"));
        assert!(out.contains("- **Last Updated:** 2026-10-18\n"));
        assert!(out.starts_with("# Troubleshooting\n\n| Topic | Link |"));
    }

    #[test]
    fn apply_appends_missing_block() {
        let out = apply_stats("# KB", &Stats::default(), day());
        assert_eq!(
            out,
            "# KB\n\n## Statistics\n\n\
             - **Total Issues:** 0\n\
             - **Quick Fixes:** 0\n\
             - **Detailed Guides:** 0\n\
             - **Last Updated:** 2026-10-18\n"
        );
    }

    #[test]
    fn recount_counts_sections_per_kind() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("quick-reference")).unwrap();
        fs::create_dir_all(root.join("detailed-guides/database")).unwrap();
        fs::create_dir_all(root.join("platform-specific")).unwrap();
        fs::write(
            root.join("quick-reference/docker.md"),
            "# Docker\n\n---\n\n## A\n\n---\n\n## B\n",
        )
        .unwrap();
        fs::write(
            root.join("detailed-guides/database/postgres.md"),
            "# Postgres\n\n## Step one\n\n## Step two\n",
        )
        .unwrap();
        fs::write(root.join("platform-specific/macos.md"), "# macOS\n\n---\n\n## Brew\n").unwrap();
        fs::write(root.join("README.md"), README).unwrap();

        let store = Store::new(Layout::new(root));
        let stats = recount(&store, day()).unwrap();
        assert_eq!(
            stats,
            Stats {
                quick_fixes: 2,
                detailed_guides: 1,
                platform_notes: 1,
            }
        );
        let readme = fs::read_to_string(root.join("README.md")).unwrap();
        assert!(readme.contains("- **Total Issues:** 4\n"));
    }

    #[test]
    fn apply_rewrites_only_first_line_per_label() {
        let content = "- **Total Issues:** 1\n- **Total Issues:** 2\n";
        let out = apply_stats(content, &Stats::default(), day());
        assert_eq!(out, "- **Total Issues:** 0\n- **Total Issues:** 2\n");
    }

    #[test]
    fn apply_leaves_unlabelled_lines_alone() {
        let content = "Total Issues: 9\nQuick Fixes - 5\n";
        let out = apply_stats(content, &Stats::default(), day());
        assert_eq!(out, "Total Issues: 0\nQuick Fixes - 5\n");
    }

    #[test]
    fn table_of_contents_is_not_counted() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("quick-reference/docker.md");
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(
            &path,
            "# Docker\n\n---\n\n## Port binding\n\n**Tags:** #docker\n",
        )
        .unwrap();
        let store = Store::new(Layout::new(dir.path()));
        assert_eq!(count(&store).quick_fixes, 1);

        crate::toc::update_file(&path, &crate::toc::TocOptions::default()).unwrap();
        assert!(fs::read_to_string(&path).unwrap().contains("## Table of Contents"));
        assert_eq!(count(&store).quick_fixes, 1);
    }

    #[test]
    fn recount_without_index_is_io_error() {
        let dir = TempDir::new().unwrap();
        let store = Store::new(Layout::new(dir.path()));
        assert!(matches!(
            recount(&store, day()).unwrap_err(),
            IssueError::Io { .. }
        ));
    }
}
