//! Markdown templates for new documents and sections.

use crate::parser::{SECTION_DELIMITER, TAGS_LABEL};
use crate::slug::title_from_stem;

/// Heading written to a document that does not exist yet.
pub fn render_document_header(stem: &str) -> String {
    format!("# {}\n", title_from_stem(stem))
}

/// Render a new issue section, including its leading delimiter.
///
/// Fix and example blocks are placeholders for the author to fill in.
pub fn render_section(title: &str, tags: &[String]) -> String {
    let mut lines: Vec<String> = Vec::new();

    lines.push(String::new());
    lines.push(SECTION_DELIMITER.to_string());
    lines.push(String::new());
    lines.push(format!("## {}", title));
    lines.push(String::new());
    lines.push(format!("{} {}", TAGS_LABEL, tags.join(" ")));
    lines.push(String::new());
    lines.push("**Problem:** Describe the symptoms and the exact error message.".to_string());
    lines.push(String::new());
    lines.push("**Fix:**".to_string());
    lines.push(String::new());
    lines.push("```bash".to_string());
    lines.push("# Commands that resolve the issue".to_string());
    lines.push("```".to_string());
    lines.push(String::new());
    lines.push("**Example:**".to_string());
    lines.push(String::new());
    lines.push("```bash".to_string());
    lines.push("# How to verify the fix".to_string());
    lines.push("```".to_string());

    let mut out = lines.join("\n");
    out.push('\n');
    out
}
