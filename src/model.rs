//! Parsed view of an issue document.

/// A markdown document from the store.
#[allow(dead_code)]
#[derive(Debug, Default)]
pub struct IssueDocument {
    /// Leading `# ` heading, if the document has one.
    pub title: Option<String>,
    pub sections: Vec<IssueSection>,
}

/// One problem/fix entry, delimited by horizontal rules.
#[allow(dead_code)]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssueSection {
    /// Slug of the title. Not unique: equal titles share an id.
    pub id: String,
    pub title: String,
    /// Labels from the `**Tags:**` line, `#`-prefixed.
    pub tags: Vec<String>,
    /// Everything after the heading, untouched.
    pub body: String,
}

#[allow(dead_code)]
impl IssueDocument {
    pub fn section(&self, id: &str) -> Option<&IssueSection> {
        self.sections.iter().find(|s| s.id == id)
    }
}
