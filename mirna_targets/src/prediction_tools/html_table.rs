//! Turns a miRDB result page into a table.

use std::sync::LazyLock;

use polars::prelude::*;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, warn};

use crate::error::{MirdbError, Result};

static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").expect("valid regex"));

const RANK_COLUMN: &str = "Target Rank";
const SCORE_COLUMN: &str = "Target Score";
/// Columns that repeat the query on a miRNA search page.
const MIRNA_SEARCH_REDUNDANT: [&str; 3] = ["Target Detail", "miRNA Name", "Gene Description"];

/// Attribute set identifying the result `<table>`.
#[derive(Debug, Clone, PartialEq)]
pub struct TableSelector {
    pub attributes: Vec<(String, String)>,
}

impl Default for TableSelector {
    fn default() -> Self {
        Self {
            attributes: vec![
                ("border".to_string(), "1".to_string()),
                ("id".to_string(), "table1".to_string()),
                ("style".to_string(), "border-collapse: collapse".to_string()),
            ],
        }
    }
}

impl TableSelector {
    pub fn css(&self) -> String {
        let mut css = String::from("table");
        for (name, value) in &self.attributes {
            css.push_str(&format!("[{}=\"{}\"]", name, value.replace('"', "\\\"")));
        }
        css
    }
}

#[derive(Debug, Clone)]
pub struct TableOptions {
    pub selector: TableSelector,
    /// Render linked cells as `<a target="_blank" href=...>` strings.
    pub detail_links: bool,
    /// Origin prepended to site-relative links.
    pub link_base: String,
    /// Drop the columns that only echo the searched miRNA.
    pub mirna_search: bool,
}

impl Default for TableOptions {
    fn default() -> Self {
        Self {
            selector: TableSelector::default(),
            detail_links: false,
            link_base: "http://mirdb.org".to_string(),
            mirna_search: true,
        }
    }
}

fn selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| MirdbError::Parse(format!("bad selector `{}`: {}", css, e)))
}

/// Header plus data rows, all as text.
#[derive(Debug, Clone, PartialEq)]
pub struct HtmlTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl HtmlTable {
    pub fn parse(html: &str, options: &TableOptions) -> Result<Self> {
        let document = Html::parse_document(html);
        let table_sel = selector(&options.selector.css())?;
        let row_sel = selector("tr")?;
        let cell_sel = selector("td, th")?;
        let link_sel = selector("a[href]")?;

        let table = document.select(&table_sel).next().ok_or_else(|| {
            MirdbError::Parse(format!("no table matching {}", options.selector.css()))
        })?;

        let mut rows = table.select(&row_sel).map(|tr| {
            tr.select(&cell_sel)
                .map(|td| cell_text(td, &link_sel, options))
                .collect::<Vec<String>>()
        });

        let headers = rows
            .next()
            .ok_or_else(|| MirdbError::Parse("result table has no rows".to_string()))?;
        let rows: Vec<Vec<String>> = rows.collect();
        debug!("Parsed table with {} columns and {} rows", headers.len(), rows.len());

        Ok(Self { headers, rows })
    }

    /// String-typed frame; rank and score are cast to numbers when present.
    pub fn into_dataframe(self, mirna_search: bool) -> Result<DataFrame> {
        let width = self.headers.len();
        let mut columns: Vec<Vec<Option<String>>> = vec![Vec::with_capacity(self.rows.len()); width];

        for (i, row) in self.rows.into_iter().enumerate() {
            if row.len() != width {
                warn!("Row {} has {} cells, header has {}", i, row.len(), width);
            }
            let mut cells = row.into_iter();
            for column in columns.iter_mut() {
                column.push(cells.next());
            }
        }

        let series: Vec<Column> = self
            .headers
            .iter()
            .zip(columns)
            .map(|(h, c)| Series::new(PlSmallStr::from(h.as_str()), c).into())
            .collect();
        let mut df = DataFrame::new(series)?;

        if df.get_column_index(SCORE_COLUMN).is_some() {
            let score = df.column(SCORE_COLUMN)?.as_materialized_series().cast(&DataType::Float64)?;
            df.with_column(score)?;
        }

        let mut order: Vec<String> = Vec::with_capacity(width);
        if df.get_column_index(RANK_COLUMN).is_some() {
            let rank = df.column(RANK_COLUMN)?.as_materialized_series().cast(&DataType::Int64)?;
            df.with_column(rank)?;
            order.push(RANK_COLUMN.to_string());
        }
        for name in &self.headers {
            if name == RANK_COLUMN || (mirna_search && MIRNA_SEARCH_REDUNDANT.contains(&name.as_str())) {
                continue;
            }
            order.push(name.clone());
        }

        Ok(df.select(order)?)
    }
}

fn cell_text(td: ElementRef<'_>, link_sel: &Selector, options: &TableOptions) -> String {
    let raw: String = td.text().collect();
    let text = WHITESPACE.replace_all(raw.trim(), " ").into_owned();

    if !options.detail_links {
        return text;
    }
    let Some(href) = td.select(link_sel).next().and_then(|a| a.value().attr("href")) else {
        return text;
    };
    if href.starts_with('/') {
        format!(
            "<a target=\"_blank\" href=\"{}{}\">{}</a>",
            options.link_base.trim_end_matches('/'),
            href,
            text
        )
    } else if href.starts_with("http") {
        format!("<a target=\"_blank\" href=\"{}\">{}</a>", href, text)
    } else {
        text
    }
}

/// Parse `html` and build the result frame in one go.
pub fn mirdb_table(html: &str, options: &TableOptions) -> Result<DataFrame> {
    HtmlTable::parse(html, options)?.into_dataframe(options.mirna_search)
}
