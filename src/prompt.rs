//! Interactive input for `add -i`: asks for each field the flags left out.

use crate::append::{AppendRequest, DEFAULT_TAG};
use crate::layout::DEFAULT_CATEGORY;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;

fn ask<R: BufRead, W: Write>(input: &mut R, output: &mut W, question: &str) -> io::Result<String> {
    write!(output, "{}: ", question)?;
    output.flush()?;
    let mut answer = String::new();
    input.read_line(&mut answer)?;
    Ok(answer.trim().to_string())
}

/// Split a tag answer on commas and whitespace.
fn split_tags(answer: &str) -> Vec<String> {
    answer
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

/// Prompt for the fields of `request` that are still unset. Blank answers
/// keep the defaults; end of input counts as a blank answer.
pub fn fill_request<R: BufRead, W: Write>(
    request: &mut AppendRequest,
    input: &mut R,
    output: &mut W,
) -> io::Result<()> {
    if request.title.trim().is_empty() {
        request.title = ask(input, output, "Issue title")?;
    }
    if request.target.is_none() {
        if request.category.is_none() {
            let answer = ask(input, output, &format!("Category [{}]", DEFAULT_CATEGORY))?;
            if !answer.is_empty() {
                request.category = Some(answer);
            }
        }
        let answer = ask(input, output, "Target file (blank to derive from category)")?;
        if !answer.is_empty() {
            request.target = Some(PathBuf::from(answer));
        }
    }
    if request.tags.is_empty() {
        let answer = ask(input, output, &format!("Tags [{}]", DEFAULT_TAG))?;
        request.tags = split_tags(&answer);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn asks_for_missing_fields() {
        let mut request = AppendRequest::default();
        let mut input = "Docker Port Binding\ndocker\n\n#docker, #ports\n".as_bytes();
        let mut output = Vec::new();
        fill_request(&mut request, &mut input, &mut output).unwrap();

        assert_eq!(request.title, "Docker Port Binding");
        assert_eq!(request.category.as_deref(), Some("docker"));
        assert_eq!(request.target, None);
        assert_eq!(request.tags, vec!["#docker", "#ports"]);
        let prompts = String::from_utf8(output).unwrap();
        assert!(prompts.contains("Issue title: "));
        assert!(prompts.contains("Tags [#general]: "));
    }

    #[test]
    fn provided_fields_are_not_asked() {
        let mut request = AppendRequest {
            title: "Given".to_string(),
            category: Some("linux".to_string()),
            tags: vec!["#kernel".to_string()],
            ..AppendRequest::default()
        };
        let mut input = "\n".as_bytes();
        let mut output = Vec::new();
        fill_request(&mut request, &mut input, &mut output).unwrap();

        let prompts = String::from_utf8(output).unwrap();
        assert_eq!(prompts, "Target file (blank to derive from category): ");
        assert_eq!(request.title, "Given");
        assert_eq!(request.tags, vec!["#kernel"]);
    }

    #[test]
    fn end_of_input_keeps_defaults() {
        let mut request = AppendRequest::default();
        let mut input = "Only a title\n".as_bytes();
        let mut output = Vec::new();
        fill_request(&mut request, &mut input, &mut output).unwrap();
        assert_eq!(request.title, "Only a title");
        assert_eq!(request.category, None);
        assert!(request.tags.is_empty());
    }
}
