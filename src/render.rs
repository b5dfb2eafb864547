use std::fmt::Write;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use crate::parser::text::sanitise;
use crate::record::CaseRecord;

pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Simplified reading view as a standalone HTML page.
///
/// Sections become collapsible `<details>` blocks. Body lines lose their
/// original numbering and are renumbered with one counter running across
/// all sections. With `original`, the source page is embedded (base64,
/// iframe `srcdoc`) behind a toggle button.
pub fn simplified_html(record: &CaseRecord, original: Option<&str>) -> String {
    let mut html = String::new();
    html.push_str("<!doctype html>\n<html>\n<head>\n");
    html.push_str("  <meta charset=\"utf-8\">\n");
    html.push_str("  <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n");
    html.push_str("  <title>Judgeman</title>\n</head>\n<body>\n");

    let _ = writeln!(
        html,
        "  <header>\n    <span id=\"case-title\">{}</span>",
        escape_html(&record.title)
    );
    if original.is_some() {
        html.push_str("    <button id=\"toggleButton\" type=\"button\">Toggle page</button>\n");
    }
    html.push_str("  </header>\n");

    html.push_str("  <main id=\"simplified\">\n");
    html.push_str(&metadata_html(record));
    html.push_str(&sections_html(record));
    html.push_str("  </main>\n");

    if let Some(original) = original {
        html.push_str(&original_frame_html(original));
    }

    html.push_str("</body>\n</html>\n");
    html
}

fn metadata_html(record: &CaseRecord) -> String {
    let rows = [
        ("Case number", &record.number),
        ("Date", &record.date),
        ("Tribunal / Court", &record.tribunal_court),
        ("Coram", &record.coram),
        ("Counsel", &record.counsel),
        ("Parties", &record.parties),
    ];

    let mut out = String::from("    <dl class=\"metadata\">\n");
    for (label, value) in rows {
        let _ = writeln!(
            out,
            "      <dt>{}</dt><dd>{}</dd>",
            label,
            escape_html(value)
        );
    }
    out.push_str("    </dl>\n");

    out.push_str("    <section class=\"legal-issues\">\n      <h2>Legal issues</h2>\n      <ul>");
    for issue in &record.legal_issues {
        let _ = write!(out, "<li>{}</li>", escape_html(issue));
    }
    out.push_str("</ul>\n    </section>\n");
    out
}

fn sections_html(record: &CaseRecord) -> String {
    let mut out = String::new();
    let mut number = 0usize;
    for (heading, lines) in &record.body {
        let _ = writeln!(
            out,
            "    <details>\n      <summary>{}</summary>\n      <div class=\"section\">",
            escape_html(heading)
        );
        for line in lines {
            number += 1;
            let _ = writeln!(
                out,
                "        <p>{}.&emsp;{}</p>",
                number,
                escape_html(&sanitise(line))
            );
        }
        out.push_str("      </div>\n    </details>\n");
    }
    out
}

fn original_frame_html(original: &str) -> String {
    let encoded = STANDARD.encode(original.as_bytes());
    let mut out = String::new();
    out.push_str("  <div id=\"original\" style=\"display:none\">\n");
    out.push_str("    <iframe id=\"originalFrame\" style=\"width:100%;height:90vh;border:0\" ");
    out.push_str("sandbox=\"allow-same-origin allow-popups\"></iframe>\n");
    out.push_str("  </div>\n  <script>\n");
    let _ = writeln!(out, "    const originalBase64 = '{}';", encoded);
    out.push_str(
        "    const bytes = Uint8Array.from(atob(originalBase64), c => c.charCodeAt(0));\n\
         \x20   document.getElementById('originalFrame').srcdoc = new TextDecoder('utf-8').decode(bytes);\n\
         \x20   let simplified = true;\n\
         \x20   document.getElementById('toggleButton').addEventListener('click', () => {\n\
         \x20     simplified = !simplified;\n\
         \x20     document.getElementById('simplified').style.display = simplified ? '' : 'none';\n\
         \x20     document.getElementById('original').style.display = simplified ? 'none' : '';\n\
         \x20   });\n",
    );
    out.push_str("  </script>\n");
    out
}
