use serde::Serialize;

use crate::record::CaseRecord;

/// Metadata block embedded in the facts prompt.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PromptMetadata<'a> {
    case_number: &'a str,
    case_date: &'a str,
    tribunal_court: &'a str,
    coram: &'a str,
    parties: &'a str,
}

pub fn facts_prompt(record: &CaseRecord) -> String {
    let meta = PromptMetadata {
        case_number: &record.number,
        case_date: &record.date,
        tribunal_court: &record.tribunal_court,
        coram: &record.coram,
        parties: &record.parties,
    };
    // Serialising a struct of plain strings cannot fail
    let meta = serde_json::to_string(&meta).unwrap_or_default();

    [
        "You are a legal assistant. Produce a crisp case facts rundown.",
        "Constraints:",
        "- Output plain text with short bullets.",
        "- Do NOT fabricate facts. If missing, say \"Not stated\".",
        "- Keep it under 180 words.",
        "",
        &format!("Title: {}", record.title),
        &format!("Metadata: {}", meta),
        &format!("Legal issues: {}", record.legal_issues.join(" | ")),
        "",
        "Extracted facts (may be partial):",
        &record.facts_text,
    ]
    .join("\n")
}

pub fn diagram_prompt(record: &CaseRecord) -> String {
    [
        "You are a legal analyst. Create a simple directed graph representing the case.",
        "Return ONLY valid JSON, nothing else.",
        "Schema:",
        r#"{"nodes":[{"id":"string","label":"string","type":"party|court|event|issue|outcome"}],"edges":[{"from":"string","to":"string","label":"string"}]}"#,
        "Rules:",
        "- Keep nodes <= 10 and edges <= 14.",
        "- Use stable ids like n1, n2...",
        "- Do NOT fabricate facts; if unknown, omit.",
        "",
        &format!("Title: {}", record.title),
        &format!("Legal issues: {}", record.legal_issues.join(" | ")),
        "",
        "Extracted facts (may be partial):",
        &record.facts_text,
    ]
    .join("\n")
}
