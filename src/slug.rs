//! Identifier and anchor generation for issue titles.

/// Section id for an issue title.
///
/// Lower-cases ASCII letters, turns every run of other characters into a
/// single `-`, and trims hyphens from both ends. Applying it twice yields the
/// same string.
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut pending_dash = false;
    for c in title.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c.to_ascii_lowercase());
        } else {
            pending_dash = true;
        }
    }
    slug
}

/// GitHub heading anchor, as rendered for `[title](#anchor)` links.
///
/// - lowercase
/// - drop everything that isn't a word character, whitespace or hyphen
/// - whitespace runs become one hyphen, hyphen runs collapse
/// - leading and trailing hyphens are trimmed
pub fn github_anchor(text: &str) -> String {
    let mut anchor = String::with_capacity(text.len());
    let mut in_space = false;
    for c in text.to_lowercase().chars() {
        if c.is_whitespace() {
            in_space = true;
            continue;
        }
        if !(c.is_alphanumeric() || c == '_' || c == '-') {
            continue;
        }
        if in_space {
            anchor.push('-');
            in_space = false;
        }
        anchor.push(c);
    }

    let mut collapsed = String::with_capacity(anchor.len());
    for c in anchor.chars() {
        if c == '-' && collapsed.ends_with('-') {
            continue;
        }
        collapsed.push(c);
    }
    collapsed.trim_matches('-').to_string()
}

/// Human title for a document stem: "docker-compose" → "Docker Compose".
pub fn title_from_stem(stem: &str) -> String {
    stem.split(['-', '_', ' '])
        .filter(|w| !w.is_empty())
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
