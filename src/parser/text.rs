use std::sync::LazyLock;

use regex::Regex;

use crate::record::Sections;

static NUMBERING_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^[^\S\r\n]*[0-9]+\.?[^\S\r\n]*").unwrap());
static FACTS_HEADING_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?-u:\b)(?:facts|background|material facts)(?-u:\b)").unwrap()
});

/// Max lines of the facts section carried into `facts_text`.
pub const FACTS_LINE_LIMIT: usize = 40;

/// Strip the document's own paragraph number from the start of every line.
pub fn sanitise(text: &str) -> String {
    NUMBERING_RE.replace_all(text, "").into_owned()
}

pub fn is_facts_heading(heading: &str) -> bool {
    FACTS_HEADING_RE.is_match(heading)
}

/// First facts/background section, capped, sanitised and newline-joined.
/// Empty when no heading looks like one.
pub fn facts_text(body: &Sections) -> String {
    body.iter()
        .find(|(heading, _)| is_facts_heading(heading))
        .map(|(_, lines)| {
            lines
                .iter()
                .take(FACTS_LINE_LIMIT)
                .map(|l| sanitise(l))
                .collect::<Vec<_>>()
                .join("\n")
        })
        .unwrap_or_default()
}
