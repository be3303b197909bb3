//! Markdown document → [`IssueDocument`].
//!
//! Documents are split on `---` rules; a chunk is an issue when it carries a
//! `## ` heading. Rules and headings inside fenced code blocks are ignored so
//! that hand-written guides with shell snippets parse the same way. A
//! generated table of contents block is skipped entirely.

use crate::model::{IssueDocument, IssueSection};
use crate::slug::slugify;
use crate::toc::{TOC_END, TOC_START};

pub const SECTION_DELIMITER: &str = "---";
pub const TAGS_LABEL: &str = "**Tags:**";

/// Tracks whether the current line sits inside a fenced code block.
#[derive(Default)]
pub struct FenceTracker {
    open: Option<&'static str>,
}

impl FenceTracker {
    /// Feed one line; returns true if the line is markdown (not code).
    pub fn is_markdown(&mut self, line: &str) -> bool {
        let trimmed = line.trim_start();
        let marker = if trimmed.starts_with("```") {
            Some("```")
        } else if trimmed.starts_with("~~~") {
            Some("~~~")
        } else {
            None
        };
        match (self.open, marker) {
            (None, Some(m)) => {
                self.open = Some(m);
                false
            }
            (Some(open), Some(m)) if open == m => {
                self.open = None;
                false
            }
            (Some(_), _) => false,
            (None, None) => true,
        }
    }
}

pub fn parse_document(content: &str) -> IssueDocument {
    let mut doc = IssueDocument::default();
    let mut fence = FenceTracker::default();
    let mut chunk: Vec<&str> = Vec::new();
    let mut chunk_code: Vec<bool> = Vec::new();
    // An unterminated start marker is ordinary text.
    let has_toc = content.contains(TOC_END);
    let mut in_toc = false;

    for line in content.lines() {
        let markdown = fence.is_markdown(line);
        if markdown && has_toc {
            match line.trim() {
                TOC_START => {
                    in_toc = true;
                    continue;
                }
                TOC_END if in_toc => {
                    in_toc = false;
                    continue;
                }
                _ if in_toc => continue,
                _ => {}
            }
        }
        if markdown {
            if doc.title.is_none()
                && doc.sections.is_empty()
                && chunk.iter().all(|l| l.trim().is_empty())
            {
                if let Some(h1) = line.strip_prefix("# ") {
                    doc.title = Some(h1.trim().to_string());
                    continue;
                }
            }
            if line.trim() == SECTION_DELIMITER {
                if let Some(section) = parse_section(&chunk, &chunk_code) {
                    doc.sections.push(section);
                }
                chunk.clear();
                chunk_code.clear();
                continue;
            }
        }
        chunk.push(line);
        chunk_code.push(!markdown);
    }
    if let Some(section) = parse_section(&chunk, &chunk_code) {
        doc.sections.push(section);
    }
    doc
}

fn parse_section(lines: &[&str], code: &[bool]) -> Option<IssueSection> {
    let heading = lines
        .iter()
        .zip(code)
        .position(|(l, &is_code)| !is_code && l.starts_with("## "))?;
    let title = lines[heading][3..].trim().to_string();

    let tags = lines
        .iter()
        .zip(code)
        .filter(|&(_, &is_code)| !is_code)
        .find_map(|(l, _)| l.trim_start().strip_prefix(TAGS_LABEL))
        .map(parse_tags)
        .unwrap_or_default();

    let body = lines[heading + 1..].join("\n").trim_matches('\n').to_string();

    Some(IssueSection {
        id: slugify(&title),
        title,
        tags,
        body,
    })
}

fn parse_tags(list: &str) -> Vec<String> {
    list.split(|c: char| c.is_whitespace() || c == ',')
        .filter(|t| t.starts_with('#') && t.len() > 1)
        .map(str::to_string)
        .collect()
}
