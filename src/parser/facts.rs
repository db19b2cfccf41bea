use askama::Template;
use scraper::{ElementRef, Html, Selector};
use tracing::debug;

use crate::error::{Result, ScrapingError};
use crate::parser::{compile, element_text};

const PAGE: &str = "facts page";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fact {
    pub feature: String,
    pub value: String,
}

#[derive(Template)]
#[template(
    source = r#"<table border="1" class="dataframe">
  <thead>
    <tr style="text-align: right;">
      <th></th>
      <th>Value</th>
    </tr>
    <tr>
      <th>Feature</th>
      <th></th>
    </tr>
  </thead>
  <tbody>
{%- for fact in facts %}
    <tr>
      <th>{{ fact.feature }}</th>
      <td>{{ fact.value }}</td>
    </tr>
{%- endfor %}
  </tbody>
</table>"#,
    ext = "html"
)]
struct FactsTable<'a> {
    facts: &'a [Fact],
}

/// Turns the first table on the facts page into a Feature/Value fragment
/// ready to be embedded in the display page.
pub struct FactsTableParser {
    table_selector: Selector,
    row_selector: Selector,
    cell_selector: Selector,
}

impl FactsTableParser {
    pub fn new() -> Result<Self> {
        Ok(Self {
            table_selector: compile("table")?,
            row_selector: compile("tr")?,
            cell_selector: compile("th, td")?,
        })
    }

    pub fn parse(&self, html: &str) -> Result<String> {
        let facts = self.parse_facts(html)?;
        render(&facts)
    }

    pub fn parse_facts(&self, html: &str) -> Result<Vec<Fact>> {
        let document = Html::parse_document(html);
        let table = document
            .select(&self.table_selector)
            .next()
            .ok_or_else(|| ScrapingError::mismatch(PAGE, "no table element"))?;

        let mut facts = Vec::new();
        for row in table.select(&self.row_selector).filter(|row| belongs_to(row, &table)) {
            let cells: Vec<ElementRef> = row
                .select(&self.cell_selector)
                .filter(|cell| belongs_to(cell, &table))
                .collect();
            if cells.is_empty() || self.is_header_row(&row, &cells) {
                continue;
            }
            if cells.len() != 2 {
                return Err(ScrapingError::mismatch(
                    PAGE,
                    format!("expected 2 columns, found a row with {}", cells.len()),
                ));
            }
            facts.push(Fact {
                feature: element_text(&cells[0]).trim().to_string(),
                value: element_text(&cells[1]).trim().to_string(),
            });
        }

        debug!(rows = facts.len(), "Parsed facts table");
        Ok(facts)
    }

    fn is_header_row(&self, row: &ElementRef, cells: &[ElementRef]) -> bool {
        let in_thead = row
            .parent()
            .and_then(ElementRef::wrap)
            .map_or(false, |parent| parent.value().name() == "thead");
        in_thead || cells.iter().all(|cell| cell.value().name() == "th")
    }
}

/// Whether `table` is the nearest table around `element`, so rows of nested
/// tables are left out.
fn belongs_to(element: &ElementRef, table: &ElementRef) -> bool {
    element
        .ancestors()
        .filter_map(ElementRef::wrap)
        .find(|ancestor| ancestor.value().name() == "table")
        .map_or(false, |nearest| nearest == *table)
}

/// Render facts as a newline-free table fragment keyed by feature.
pub fn render(facts: &[Fact]) -> Result<String> {
    let markup = FactsTable { facts }.render()?;
    Ok(markup.replace('\n', ""))
}

#[cfg(test)]
mod tests {
    use super::*;

    const MOCK_FACTS_HTML: &str = r#"
    <html><body>
      <table id="tablepress-p-mars" class="tablepress">
        <thead><tr><th>Mars - Earth Comparison</th><th>Mars</th></tr></thead>
        <tbody>
          <tr><td class="column-1"><strong>Diameter</strong></td><td class="column-2">6,779 km</td></tr>
          <tr><td class="column-1">Mass</td><td class="column-2">
6.42 × 10^23 kg
</td></tr>
        </tbody>
      </table>
      <table><tr><td>Second table</td><td>ignored</td></tr></table>
    </body></html>
    "#;

    #[test]
    fn test_parse_rows_skipping_header() {
        let parser = FactsTableParser::new().unwrap();
        let facts = parser.parse_facts(MOCK_FACTS_HTML).unwrap();

        assert_eq!(
            facts,
            vec![
                Fact { feature: "Diameter".to_string(), value: "6,779 km".to_string() },
                Fact { feature: "Mass".to_string(), value: "6.42 × 10^23 kg".to_string() },
            ]
        );
    }

    #[test]
    fn test_rendered_fragment_uses_features_as_row_labels() {
        let parser = FactsTableParser::new().unwrap();
        let markup = parser.parse(MOCK_FACTS_HTML).unwrap();

        assert!(!markup.contains('\n'));
        assert!(markup.starts_with("<table border=\"1\" class=\"dataframe\">"));
        assert!(markup.contains("<th>Feature</th>"));
        assert!(markup.contains("<th>Diameter</th>      <td>6,779 km</td>"));
        assert!(markup.contains("<th>Mass</th>      <td>6.42 × 10^23 kg</td>"));
        assert!(!markup.contains("Mars - Earth Comparison"));
        assert!(!markup.contains("Second table"));
    }

    #[test]
    fn test_cell_text_is_escaped() {
        let facts = vec![Fact { feature: "Moons".to_string(), value: "Phobos & Deimos <2>".to_string() }];
        let markup = render(&facts).unwrap();
        assert!(markup.contains("<td>Phobos &amp; Deimos &lt;2&gt;</td>"));
    }

    #[test]
    fn test_headerless_table_keeps_every_row() {
        let parser = FactsTableParser::new().unwrap();
        let html = "<table><tr><td>Equatorial Diameter:</td><td>6,792 km</td></tr><tr><td>Moons:</td><td>2</td></tr></table>";
        assert_eq!(parser.parse_facts(html).unwrap().len(), 2);
    }

    #[test]
    fn test_nested_table_rows_are_ignored() {
        let parser = FactsTableParser::new().unwrap();
        let html = r#"<table>
            <tr><td>Moons:</td><td>
              <table><tr><td>Phobos</td><td>22 km</td><td>irregular</td></tr></table>
            </td></tr>
            <tr><td>Mass:</td><td>6.42 × 10^23 kg</td></tr>
        </table>"#;

        let facts = parser.parse_facts(html).unwrap();

        assert_eq!(facts.len(), 2);
        assert_eq!(facts[0].feature, "Moons:");
        assert_eq!(facts[1].value, "6.42 × 10^23 kg");
    }

    #[test]
    fn test_no_table_is_structure_mismatch() {
        let parser = FactsTableParser::new().unwrap();
        let err = parser.parse("<p>no data</p>").unwrap_err();
        assert!(matches!(err, ScrapingError::StructureMismatch { .. }));
    }

    #[test]
    fn test_three_columns_is_structure_mismatch() {
        let parser = FactsTableParser::new().unwrap();
        let html = "<table><tr><td>Mass</td><td>6.42</td><td>kg</td></tr></table>";
        let err = parser.parse(html).unwrap_err();
        assert!(err.to_string().contains("expected 2 columns"));
    }
}
