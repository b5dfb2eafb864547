use std::sync::LazyLock;

use scraper::{ElementRef, Html, Selector};

static PARAGRAPH: LazyLock<Selector> = LazyLock::new(|| Selector::parse("p").unwrap());

const HEADING_CLASS: &str = "Judg-Heading-1";
const BODY_CLASS: &str = "Judg-1";

/// Role a paragraph plays in the judgment body, read off its CSS classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Heading,
    Body,
    Other,
}

impl Role {
    /// Heading wins when a paragraph carries both classes.
    pub fn of(element: &ElementRef) -> Self {
        let mut role = Role::Other;
        for class in element.value().classes() {
            match class {
                HEADING_CLASS => return Role::Heading,
                BODY_CLASS => role = Role::Body,
                _ => {}
            }
        }
        role
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Paragraph {
    pub role: Role,
    pub text: String,
}

impl Paragraph {
    pub fn new(role: Role, text: impl Into<String>) -> Self {
        Self {
            role,
            text: text.into(),
        }
    }
}

/// Every `<p>` in document order with its role and trimmed text content.
pub fn classify_paragraphs(document: &Html) -> Vec<Paragraph> {
    document
        .select(&PARAGRAPH)
        .map(|p| Paragraph::new(Role::of(&p), element_text(&p)))
        .collect()
}

/// Concatenated descendant text, trimmed.
pub fn element_text(element: &ElementRef) -> String {
    element.text().collect::<String>().trim().to_string()
}
