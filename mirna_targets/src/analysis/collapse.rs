use polars::lazy::dsl::*;
use polars::prelude::*;
use tracing::debug;

use crate::helper_functions::{render_cell, require_columns};

/// One row per distinct `key`, ordered by key.
///
/// Every other column is reduced to its ascending distinct values, and a
/// group with one distinct value holds that scalar. Columns where every group
/// is single-valued keep their type, columns where no group is stay lists,
/// and mixed columns become text (`9` next to `[5, 7]`).
pub fn collapse_by_key(df: &DataFrame, key: &str) -> PolarsResult<DataFrame> {
    require_columns(df, &[key], "collapse_by_key")?;

    let others: Vec<String> = df
        .get_column_names()
        .into_iter()
        .filter(|name| name.as_str() != key)
        .map(|name| name.to_string())
        .collect();

    let aggs: Vec<Expr> = others
        .iter()
        .map(|name| col(name.as_str()).unique().sort(SortOptions::default()))
        .collect();

    let mut grouped = df
        .clone()
        .lazy()
        .group_by([col(key)])
        .agg(aggs)
        .sort_by_exprs([col(key)], SortMultipleOptions::default())
        .collect()?;

    let mut scalar: Vec<String> = Vec::new();
    let mut mixed: Vec<String> = Vec::new();
    for name in &others {
        let lists = grouped.column(name)?.as_materialized_series().list()?.clone();
        let singles = lists
            .into_iter()
            .filter(|values| values.as_ref().map_or(true, |s| s.len() == 1))
            .count();
        if singles == lists.len() {
            scalar.push(name.clone());
        } else if singles > 0 {
            let rendered: Vec<Option<String>> = lists
                .into_iter()
                .map(|cell| cell.map(|values| render_cell(&values)))
                .collect();
            grouped.with_column(Series::new(PlSmallStr::from(name.as_str()), rendered))?;
            mixed.push(name.clone());
        }
    }
    debug!(
        "Collapsed {} rows into {} groups; scalar columns {:?}, mixed columns {:?}",
        df.height(),
        grouped.height(),
        scalar,
        mixed
    );

    let mut out = if scalar.is_empty() { grouped } else { grouped.explode(scalar)? };

    // group_by puts the key first already; keep the caller's column order otherwise
    let order: Vec<String> = df.get_column_names().into_iter().map(|c| c.to_string()).collect();
    out = out.select(order)?;
    Ok(out)
}
