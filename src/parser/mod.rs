pub mod fields;
pub mod paragraphs;
pub mod sections;
pub mod text;

use scraper::Html;
use tracing::debug;

use crate::record::CaseRecord;
use fields::CaseFields;

/// Two passes over one parsed page: fixed fields, then body sections.
pub fn extract_case(html: &str) -> CaseRecord {
    let document = Html::parse_document(html);
    extract_document(&document)
}

pub fn extract_document(document: &Html) -> CaseRecord {
    let CaseFields {
        title,
        number,
        date,
        tribunal_court,
        coram,
        counsel,
        parties,
        legal_issues,
    } = fields::extract_fields(document);

    let paragraphs = paragraphs::classify_paragraphs(document);
    let body = sections::cluster_sections(&paragraphs);
    let facts_text = text::facts_text(&body);

    debug!(
        paragraphs = paragraphs.len(),
        sections = body.len(),
        legal_issues = legal_issues.len(),
        facts_chars = facts_text.len(),
        "extracted case"
    );

    CaseRecord {
        title,
        number,
        date,
        tribunal_court,
        coram,
        counsel,
        parties,
        legal_issues,
        body,
        facts_text,
    }
}

// ── Tests ──
