use std::sync::LazyLock;

use scraper::{ElementRef, Html, Selector};

use super::paragraphs::element_text;

static CASE_TITLE: LazyLock<Selector> = LazyLock::new(|| Selector::parse(".caseTitle").unwrap());
static DOC_TITLE: LazyLock<Selector> = LazyLock::new(|| Selector::parse("title").unwrap());
static INFO_TABLE: LazyLock<Selector> = LazyLock::new(|| Selector::parse("#info-table").unwrap());
static ROW: LazyLock<Selector> = LazyLock::new(|| Selector::parse("tr").unwrap());
static LEGAL_ISSUES: LazyLock<Selector> = LazyLock::new(|| Selector::parse("div.txt-body").unwrap());

/// Cell holding the value; cells 0 and 1 are the label and a separator.
const VALUE_CELL: usize = 2;

/// Metadata read from fixed locations on the page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CaseFields {
    pub title: String,
    pub number: String,
    pub date: String,
    pub tribunal_court: String,
    pub coram: String,
    pub counsel: String,
    pub parties: String,
    pub legal_issues: Vec<String>,
}

/// Never fails: anything missing stays empty.
pub fn extract_fields(document: &Html) -> CaseFields {
    let mut fields = CaseFields {
        title: extract_title(document),
        legal_issues: extract_legal_issues(document),
        ..Default::default()
    };

    if let Some(table) = document.select(&INFO_TABLE).next() {
        for (i, row) in own_rows(&table).into_iter().enumerate() {
            let Some(value) = row_cells(&row).get(VALUE_CELL).map(cell_text) else {
                continue;
            };
            if value.is_empty() {
                continue;
            }
            let slot = match i {
                0 => &mut fields.number,
                1 => &mut fields.date,
                2 => &mut fields.tribunal_court,
                3 => &mut fields.coram,
                4 => &mut fields.counsel,
                5 => &mut fields.parties,
                _ => break,
            };
            *slot = value;
        }
    }

    fields
}

fn extract_title(document: &Html) -> String {
    document
        .select(&CASE_TITLE)
        .next()
        .map(|el| element_text(&el))
        .filter(|t| !t.is_empty())
        .or_else(|| document.select(&DOC_TITLE).next().map(|el| element_text(&el)))
        .unwrap_or_default()
}

fn extract_legal_issues(document: &Html) -> Vec<String> {
    let Some(container) = document.select(&LEGAL_ISSUES).next() else {
        return Vec::new();
    };
    container
        .children()
        .filter_map(ElementRef::wrap)
        .map(|child| element_text(&child))
        .filter(|t| !t.is_empty())
        .collect()
}

/// Rows belonging to `table` itself, skipping rows of nested tables.
fn own_rows<'a>(table: &ElementRef<'a>) -> Vec<ElementRef<'a>> {
    table
        .select(&ROW)
        .filter(|row| {
            row.ancestors()
                .find(|n| n.value().as_element().is_some_and(|e| e.name() == "table"))
                .is_some_and(|n| n.id() == table.id())
        })
        .collect()
}

fn row_cells<'a>(row: &ElementRef<'a>) -> Vec<ElementRef<'a>> {
    row.children()
        .filter_map(ElementRef::wrap)
        .filter(|c| matches!(c.value().name(), "td" | "th"))
        .collect()
}

/// Rendered-text approximation: runs of whitespace collapse to one space.
fn cell_text(cell: &ElementRef) -> String {
    cell.text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(html: &str) -> CaseFields {
        extract_fields(&Html::parse_document(html))
    }

    const TABLE: &str = r#"
        <table id="info-table">
          <tr><td>Case Number</td><td>:</td><td>Civil Appeal No 68 of 2008</td></tr>
          <tr><td>Decision Date</td><td>:</td><td>20 January 2009</td></tr>
          <tr><td>Tribunal/Court</td><td>:</td><td>Court of Appeal</td></tr>
          <tr><td>Coram</td><td>:</td><td>Chan Sek Keong CJ;
                Andrew Phang Boon Leong JA</td></tr>
          <tr><td>Counsel Name(s)</td><td>:</td><td>Mr A for the appellant</td></tr>
          <tr><td>Parties</td><td>:</td><td>Tan Ah Kow — Lim Bee Hoon</td></tr>
          <tr><td>Extra</td><td>:</td><td>ignored</td></tr>
        </table>
    "#;

    #[test]
    fn metadata_rows_map_in_order() {
        let f = fields(TABLE);
        assert_eq!(f.number, "Civil Appeal No 68 of 2008");
        assert_eq!(f.date, "20 January 2009");
        assert_eq!(f.tribunal_court, "Court of Appeal");
        assert_eq!(f.coram, "Chan Sek Keong CJ; Andrew Phang Boon Leong JA");
        assert_eq!(f.counsel, "Mr A for the appellant");
        assert_eq!(f.parties, "Tan Ah Kow — Lim Bee Hoon");
    }

    #[test]
    fn missing_table_leaves_metadata_empty() {
        let f = fields("<html><head><title>X</title></head><body><p>hi</p></body></html>");
        assert_eq!(f.number, "");
        assert_eq!(f.date, "");
        assert_eq!(f.tribunal_court, "");
        assert_eq!(f.coram, "");
        assert_eq!(f.counsel, "");
        assert_eq!(f.parties, "");
    }

    #[test]
    fn short_or_blank_rows_contribute_nothing() {
        let html = r#"
            <table id="info-table">
              <tr><td>Case Number</td><td>:</td></tr>
              <tr><td>Decision Date</td><td>:</td><td>   </td></tr>
              <tr><th>Tribunal</th><th>:</th><th>High Court</th></tr>
            </table>
        "#;
        let f = fields(html);
        assert_eq!(f.number, "");
        assert_eq!(f.date, "");
        assert_eq!(f.tribunal_court, "High Court");
    }

    #[test]
    fn nested_table_rows_not_counted() {
        let html = r#"
            <table id="info-table">
              <tr><td>Case Number</td><td>:</td><td>CA 1
                <table><tr><td>a</td><td>b</td><td>nested</td></tr></table>
              </td></tr>
              <tr><td>Decision Date</td><td>:</td><td>1 May 2020</td></tr>
            </table>
        "#;
        let f = fields(html);
        assert_eq!(f.date, "1 May 2020");
    }

    #[test]
    fn title_from_case_title_element() {
        let f = fields(r#"<title>Page</title><div class="caseTitle">  Tan v Lim  </div>"#);
        assert_eq!(f.title, "Tan v Lim");
    }

    #[test]
    fn title_falls_back_to_document_title() {
        let f = fields("<html><head><title>X</title></head><body></body></html>");
        assert_eq!(f.title, "X");
    }

    #[test]
    fn title_blank_case_title_falls_back() {
        let f = fields(r#"<title>Page</title><div class="caseTitle">  </div>"#);
        assert_eq!(f.title, "Page");
    }

    #[test]
    fn title_empty_when_both_absent() {
        assert_eq!(fields("<p>nothing</p>").title, "");
    }

    #[test]
    fn legal_issues_take_element_children_only() {
        let html = r#"
            <div class="txt-body">
              stray text
              <!-- a comment -->
              <p>Contract – Formation</p>
              <p>   </p>
              <div>Tort – <b>Negligence</b></div>
              <p>Contract – Formation</p>
            </div>
        "#;
        let f = fields(html);
        assert_eq!(
            f.legal_issues,
            ["Contract – Formation", "Tort – Negligence", "Contract – Formation"]
        );
    }

    #[test]
    fn missing_legal_issues_container() {
        assert!(fields("<div class='other'><p>x</p></div>").legal_issues.is_empty());
    }
}
