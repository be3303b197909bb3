//! Table of contents generation for markdown documents.
//!
//! The generated block is fenced by HTML comment markers so it can be found
//! and replaced on the next run.

use crate::error::{IssueError, Result};
use crate::parser::FenceTracker;
use crate::slug::github_anchor;
use regex::{NoExpand, Regex, RegexBuilder};
use std::fs;
use std::path::Path;
use std::sync::LazyLock;

pub const TOC_START: &str = "<!-- TOC START -->";
pub const TOC_END: &str = "<!-- TOC END -->";
const TOC_HEADING: &str = "## Table of Contents";

/// Heading titles that never appear in a generated table of contents.
const SKIPPED_TITLES: &[&str] = &["table of contents", "contents", "toc"];

static RE_HEADER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(#{1,6})\s+(.+)$").unwrap());

static RE_EXISTING_TOC: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(?s){}.*?{}",
        regex::escape(TOC_START),
        regex::escape(TOC_END)
    ))
    .unwrap()
});

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    pub level: usize,
    pub title: String,
    pub anchor: String,
}

#[derive(Debug, Clone)]
pub struct TocOptions {
    pub min_depth: usize,
    pub max_depth: usize,
    /// Place a new block after the first occurrence of this text.
    pub insert_after: Option<String>,
}

impl Default for TocOptions {
    fn default() -> Self {
        TocOptions {
            min_depth: 1,
            max_depth: 6,
            insert_after: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TocUpdate {
    Replaced,
    Inserted,
    /// The document has no headings; it was left alone.
    NoHeaders,
}

/// ATX headings outside fenced code blocks.
pub fn extract_headers(content: &str) -> Vec<Header> {
    let mut fence = FenceTracker::default();
    content
        .lines()
        .filter(|line| fence.is_markdown(line))
        .filter_map(|line| {
            let caps = RE_HEADER.captures(line)?;
            let title = caps[2].trim().to_string();
            if SKIPPED_TITLES.contains(&title.to_lowercase().as_str()) {
                return None;
            }
            Some(Header {
                level: caps[1].len(),
                anchor: github_anchor(&title),
                title,
            })
        })
        .collect()
}

/// Render the marker-delimited block. Indentation is relative to the
/// shallowest heading in the document.
pub fn render_toc(headers: &[Header], options: &TocOptions) -> String {
    let min_level = headers.iter().map(|h| h.level).min().unwrap_or(1);
    let mut lines: Vec<String> = vec![TOC_START.to_string(), TOC_HEADING.to_string(), String::new()];
    for header in headers {
        if header.level < options.min_depth || header.level > options.max_depth {
            continue;
        }
        let indent = "  ".repeat(header.level - min_level);
        lines.push(format!("{}- [{}](#{})", indent, header.title, header.anchor));
    }
    lines.push(String::new());
    lines.push(TOC_END.to_string());
    lines.join("\n")
}

/// Compute the new document text. Re-running on its own output is a no-op.
pub fn update_toc(content: &str, options: &TocOptions) -> (String, TocUpdate) {
    let headers = extract_headers(content);
    if headers.is_empty() {
        return (content.to_string(), TocUpdate::NoHeaders);
    }
    let block = render_toc(&headers, options);

    if RE_EXISTING_TOC.is_match(content) {
        let updated = RE_EXISTING_TOC.replace_all(content, NoExpand(&block));
        return (updated.into_owned(), TocUpdate::Replaced);
    }

    if let Some(anchor_text) = options.insert_after.as_deref() {
        let found = RegexBuilder::new(&regex::escape(anchor_text))
            .case_insensitive(true)
            .build()
            .ok()
            .and_then(|re| re.find(content));
        if let Some(m) = found {
            let updated = format!(
                "{}\n\n{}{}",
                &content[..m.end()],
                block,
                &content[m.end()..]
            );
            return (updated, TocUpdate::Inserted);
        }
    }

    (format!("{}\n\n{}", block, content), TocUpdate::Inserted)
}

/// Update the table of contents of one file in place.
pub fn update_file(path: &Path, options: &TocOptions) -> Result<TocUpdate> {
    let content =
        fs::read_to_string(path).map_err(|e| IssueError::io("failed to read", path, e))?;
    let (updated, outcome) = update_toc(&content, options);
    if updated != content {
        fs::write(path, updated).map_err(|e| IssueError::io("failed to write", path, e))?;
    }
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: &str = "# Docker\n\n## Port binding\n\nText\n\n### Check: lsof\n\n```bash\n# not a header\n```\n\n## Volumes\n";

    #[test]
    fn headers_skip_code_and_toc_titles() {
        let headers = extract_headers(&format!("## Contents\n{}", DOC));
        let titles: Vec<_> = headers.iter().map(|h| h.title.as_str()).collect();
        assert_eq!(titles, vec!["Docker", "Port binding", "Check: lsof", "Volumes"]);
        assert_eq!(headers[2].anchor, "check-lsof");
    }

    #[test]
    fn toc_block_layout() {
        let block = render_toc(&extract_headers(DOC), &TocOptions::default());
        assert_eq!(
            block,
            "<!-- TOC START -->\n## Table of Contents\n\n\
             - [Docker](#docker)\n\
             \x20\x20- [Port binding](#port-binding)\n\
             \x20\x20\x20\x20- [Check: lsof](#check-lsof)\n\
             \x20\x20- [Volumes](#volumes)\n\
             \n<!-- TOC END -->"
        );
    }

    #[test]
    fn depth_filter() {
        let options = TocOptions {
            min_depth: 2,
            max_depth: 2,
            insert_after: None,
        };
        let block = render_toc(&extract_headers(DOC), &options);
        assert!(!block.contains("[Docker]"));
        assert!(!block.contains("lsof"));
        assert!(block.contains("  - [Volumes](#volumes)"));
    }

    #[test]
    fn inserts_at_top_then_replaces_idempotently() {
        let (first, outcome) = update_toc(DOC, &TocOptions::default());
        assert_eq!(outcome, TocUpdate::Inserted);
        assert!(first.starts_with(TOC_START));
        assert!(first.ends_with(DOC));

        let (second, outcome) = update_toc(&first, &TocOptions::default());
        assert_eq!(outcome, TocUpdate::Replaced);
        assert_eq!(second, first);
    }

    #[test]
    fn inserts_after_text_case_insensitively() {
        let options = TocOptions {
            insert_after: Some("# DOCKER".to_string()),
            ..TocOptions::default()
        };
        let (out, _) = update_toc(DOC, &options);
        assert!(out.starts_with("# Docker\n\n<!-- TOC START -->"));
    }

    #[test]
    fn missing_insert_after_falls_back_to_top() {
        let options = TocOptions {
            insert_after: Some("nowhere".to_string()),
            ..TocOptions::default()
        };
        let (out, _) = update_toc(DOC, &options);
        assert!(out.starts_with(TOC_START));
    }

    #[test]
    fn no_headers_leaves_content() {
        let (out, outcome) = update_toc("plain text\n", &TocOptions::default());
        assert_eq!(outcome, TocUpdate::NoHeaders);
        assert_eq!(out, "plain text\n");
    }
}
