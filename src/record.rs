use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Section heading -> body lines, in document order.
pub type Sections = IndexMap<String, Vec<String>>;

/// Structured result of extracting one judgment page.
///
/// Every field is a concrete value. Missing keys deserialise to empty
/// defaults, so an all-empty record is valid input to every consumer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CaseRecord {
    pub title: String,
    pub number: String,
    pub date: String,
    pub tribunal_court: String,
    pub coram: String,
    pub counsel: String,
    pub parties: String,
    pub legal_issues: Vec<String>,
    pub body: Sections,
    pub facts_text: String,
}

impl CaseRecord {
    /// Total number of body lines across all sections.
    pub fn line_count(&self) -> usize {
        self.body.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.title.is_empty()
            && self.number.is_empty()
            && self.legal_issues.is_empty()
            && self.body.is_empty()
    }
}
