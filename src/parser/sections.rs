use super::paragraphs::{Paragraph, Role};
use crate::record::Sections;

/// Cluster classified paragraphs into named sections in one forward pass.
///
/// Body lines are kept only if they start with an ASCII digit and are stored
/// as found; numbering is stripped later, when the lines are consumed. Body
/// lines seen before the first heading are never committed. A repeated
/// heading replaces the earlier section's lines but keeps its position.
pub fn cluster_sections(paragraphs: &[Paragraph]) -> Sections {
    let mut sections = Sections::new();
    let mut current_heading = String::new();
    let mut buffer: Vec<String> = Vec::new();

    for paragraph in paragraphs {
        match paragraph.role {
            Role::Heading => {
                if !current_heading.is_empty() {
                    sections.insert(
                        std::mem::take(&mut current_heading),
                        std::mem::take(&mut buffer),
                    );
                }
                current_heading = paragraph.text.clone();
                buffer.clear();
            }
            Role::Body => {
                if starts_with_digit(&paragraph.text) {
                    buffer.push(paragraph.text.clone());
                }
            }
            Role::Other => {}
        }
    }

    if !current_heading.is_empty() {
        sections.insert(current_heading, buffer);
    }

    sections
}

/// Numeric-prefix test: the first character is an ASCII digit.
pub fn starts_with_digit(text: &str) -> bool {
    text.chars().next().is_some_and(|c| c.is_ascii_digit())
}

// ── Tests ──
