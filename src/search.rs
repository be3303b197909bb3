//! Full-scan substring search over the store.
//!
//! Every scan re-enumerates the store and reads documents one at a time as
//! the match iterator advances. There is no ranking: results follow the
//! enumeration order (quick fixes, platform notes, detailed guides; each
//! sorted by path).

use crate::error::{IssueError, Result};
use crate::store::Store;
use regex::{Regex, RegexBuilder};
use std::path::PathBuf;
use tracing::{debug, warn};

/// Lines shown before a matching line.
pub const CONTEXT_BEFORE: usize = 1;
/// Lines shown after a matching line.
pub const CONTEXT_AFTER: usize = 2;
/// Upper bound on excerpt lines per document.
pub const MAX_EXCERPT_LINES: usize = 10;

/// Shown instead of results when neither a term nor a tag is given.
pub const SUGGESTIONS: &[&str] = &[
    "issuebook search docker",
    "issuebook search \"conda PATH\"",
    "issuebook search --tag \"#python\"",
    "issuebook search port --category docker",
    "issuebook search memory --files-only",
    "issuebook search ENOSPC --case-sensitive",
];

#[derive(Debug, Clone, Default)]
pub struct SearchOptions {
    pub term: Option<String>,
    pub tag: Option<String>,
    pub category: Option<String>,
    pub files_only: bool,
    pub no_content: bool,
    pub case_sensitive: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExcerptLine {
    /// 1-based line number in the document.
    pub number: usize,
    pub text: String,
    pub is_match: bool,
    /// Lines were skipped between this line and the previous excerpt line.
    pub gap_before: bool,
}

#[derive(Debug, Clone)]
pub struct Match {
    pub path: PathBuf,
    /// Number of matching lines in the document.
    pub hits: usize,
    /// Empty when excerpts are suppressed.
    pub excerpt: Vec<ExcerptLine>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchOutcome {
    Found { documents: usize, scanned: usize },
    NoResults { scanned: usize },
}

pub enum SearchPlan<'a> {
    /// Nothing to search for; offer example searches instead.
    Suggest(&'static [&'static str]),
    Scan(Scan<'a>),
}

/// Decide what a search request does.
pub fn plan<'a>(store: &'a Store, options: &SearchOptions) -> Result<SearchPlan<'a>> {
    let term = options.term.as_deref().map(str::trim).filter(|t| !t.is_empty());
    let tag = options.tag.as_deref().map(str::trim).filter(|t| !t.is_empty());

    let needle = match (term, tag) {
        (Some(_), Some(_)) => {
            return Err(IssueError::InvalidInput(
                "search by term or by tag, not both".to_string(),
            ))
        }
        (None, None) => return Ok(SearchPlan::Suggest(SUGGESTIONS)),
        (Some(term), None) => term.to_string(),
        (None, Some(tag)) if tag.starts_with('#') => tag.to_string(),
        (None, Some(tag)) => format!("#{}", tag),
    };

    let matcher = RegexBuilder::new(&regex::escape(&needle))
        .case_insensitive(!options.case_sensitive)
        .build()
        .map_err(|e| IssueError::InvalidInput(format!("unusable search term: {}", e)))?;

    let category = options
        .category
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(str::to_lowercase);

    Ok(SearchPlan::Scan(Scan {
        store,
        needle,
        matcher,
        category,
        excerpts: !(options.files_only || options.no_content),
    }))
}

pub struct Scan<'a> {
    store: &'a Store,
    needle: String,
    matcher: Regex,
    category: Option<String>,
    excerpts: bool,
}

impl<'a> Scan<'a> {
    /// The literal text being searched for.
    pub fn needle(&self) -> &str {
        &self.needle
    }

    /// Lazily scan the store. Each call starts a fresh enumeration.
    pub fn matches(&self) -> Matches<'_> {
        let root = self.store.layout().root();
        let candidates: Vec<PathBuf> = self
            .store
            .documents()
            .into_iter()
            .filter(|path| match &self.category {
                Some(category) => {
                    let rel = path.strip_prefix(root).unwrap_or(path);
                    rel.to_string_lossy().to_lowercase().contains(category.as_str())
                }
                None => true,
            })
            .collect();
        debug!(candidates = candidates.len(), needle = %self.needle, "scanning");
        Matches {
            scan: self,
            paths: candidates.into_iter(),
        }
    }

    /// Markdown documents under the store roots, whatever the filter.
    pub fn scanned(&self) -> usize {
        self.store.documents().len()
    }

    /// Run the scan, handing each match to `on_match`.
    pub fn drain(&self, mut on_match: impl FnMut(&Match)) -> SearchOutcome {
        let mut documents = 0;
        for m in self.matches() {
            on_match(&m);
            documents += 1;
        }
        let scanned = self.scanned();
        if documents == 0 {
            SearchOutcome::NoResults { scanned }
        } else {
            SearchOutcome::Found { documents, scanned }
        }
    }

    fn match_document(&self, path: PathBuf, content: &str) -> Option<Match> {
        let lines: Vec<&str> = content.lines().collect();
        let hit_lines: Vec<usize> = lines
            .iter()
            .enumerate()
            .filter(|(_, line)| self.matcher.is_match(line))
            .map(|(i, _)| i)
            .collect();
        if hit_lines.is_empty() {
            return None;
        }
        let excerpt = if self.excerpts {
            build_excerpt(&lines, &hit_lines)
        } else {
            Vec::new()
        };
        Some(Match {
            path,
            hits: hit_lines.len(),
            excerpt,
        })
    }
}

/// Iterator over matching documents, reading each one on demand.
pub struct Matches<'s> {
    scan: &'s Scan<'s>,
    paths: std::vec::IntoIter<PathBuf>,
}

impl Iterator for Matches<'_> {
    type Item = Match;

    fn next(&mut self) -> Option<Match> {
        for path in self.paths.by_ref() {
            let content = match self.scan.store.read(&path) {
                Ok(content) => content,
                Err(e) => {
                    warn!(error = %e, "skipping document");
                    continue;
                }
            };
            if let Some(m) = self.scan.match_document(path, &content) {
                return Some(m);
            }
        }
        None
    }
}

/// grep-style context around matching lines, merged and capped.
fn build_excerpt(lines: &[&str], hit_lines: &[usize]) -> Vec<ExcerptLine> {
    let mut out: Vec<ExcerptLine> = Vec::new();
    let mut last: Option<usize> = None;
    'hits: for &hit in hit_lines {
        let start = hit.saturating_sub(CONTEXT_BEFORE);
        let end = (hit + CONTEXT_AFTER).min(lines.len() - 1);
        for idx in start..=end {
            if last.is_some_and(|l| idx <= l) {
                continue;
            }
            if out.len() == MAX_EXCERPT_LINES {
                break 'hits;
            }
            out.push(ExcerptLine {
                number: idx + 1,
                text: lines[idx].to_string(),
                is_match: hit_lines.binary_search(&idx).is_ok(),
                gap_before: last.is_some_and(|l| idx > l + 1),
            });
            last = Some(idx);
        }
    }
    out
}
