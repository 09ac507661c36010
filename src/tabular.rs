//! Turning a rendered `<table>` into records.

use scraper::{ElementRef, Html, Selector};
use serde_json::{Map, Value};

use crate::errors::{Result, ScrapeError};

pub type Record = Map<String, Value>;

/// Parses serialized table markup into records keyed by column header.
pub trait TableParser {
    fn parse_first_table(&self, markup: &str) -> Result<Vec<Record>>;
}

/// [`TableParser`] backed by the `scraper` HTML parser.
#[derive(Debug, Default, Clone, Copy)]
pub struct HtmlTableParser;

fn selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| ScrapeError::Table(format!("bad selector {css:?}: {e:?}")))
}

fn cell_text(el: &ElementRef<'_>) -> String {
    el.text().collect::<Vec<_>>().join(" ").split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Integers and floats become numbers, empty cells become null.
fn cell_value(text: String) -> Value {
    if text.is_empty() {
        return Value::Null;
    }
    if let Ok(i) = text.parse::<i64>() {
        return Value::from(i);
    }
    if let Ok(f) = text.parse::<f64>() {
        if f.is_finite() {
            return Value::from(f);
        }
    }
    Value::String(text)
}

impl TableParser for HtmlTableParser {
    fn parse_first_table(&self, markup: &str) -> Result<Vec<Record>> {
        let doc = Html::parse_fragment(markup);
        let table_sel = selector("table")?;
        let row_sel = selector("tr")?;
        let cell_sel = selector("th, td")?;
        let header_sel = selector("th")?;

        let table = doc
            .select(&table_sel)
            .next()
            .ok_or_else(|| ScrapeError::Table("no tables found".into()))?;

        let mut rows: Vec<ElementRef<'_>> = table.select(&row_sel).collect();
        let has_header = rows
            .first()
            .is_some_and(|r| r.select(&header_sel).next().is_some());
        let headers: Vec<String> = if has_header {
            rows.remove(0)
                .select(&cell_sel)
                .enumerate()
                .map(|(i, c)| {
                    let t = cell_text(&c);
                    if t.is_empty() { i.to_string() } else { t }
                })
                .collect()
        } else {
            Vec::new()
        };

        let mut out = Vec::new();
        for row in rows {
            let cells: Vec<_> = row.select(&cell_sel).collect();
            if cells.is_empty() {
                continue;
            }
            let mut record = Record::new();
            for (i, cell) in cells.iter().enumerate() {
                let key = headers.get(i).cloned().unwrap_or_else(|| i.to_string());
                record.insert(key, cell_value(cell_text(cell)));
            }
            out.push(record);
        }
        Ok(out)
    }
}
