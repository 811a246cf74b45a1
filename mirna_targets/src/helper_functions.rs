use std::env;
use std::fs::{create_dir_all, File};
use std::path::{Path, PathBuf};

use polars::prelude::*;
use tracing::{debug, info};

use crate::models::{missing_column, polars_err};

pub fn project_root() -> PathBuf {
    match env::var_os("PROJECT_ROOT") {
        Some(val) => PathBuf::from(val),
        None => {
            // Fall back to current directory if PROJECT_ROOT not set
            env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
        }
    }
}

/// Column types are inferred from every row; a family column whose first
/// rows are all `155`-like must still come out as text.
pub fn read_csv(file_path: &str) -> PolarsResult<DataFrame> {
    CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(None)
        .try_into_reader_with_file_path(Some(PathBuf::from(file_path)))?
        .finish()
}

/// TargetScan ships its predictions tab-separated.
pub fn read_tsv(file_path: &str) -> PolarsResult<DataFrame> {
    CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(None)
        .map_parse_options(|mut o| {
            o.separator = b'\t';
            o.truncate_ragged_lines = true;
            o
        })
        .try_into_reader_with_file_path(Some(PathBuf::from(file_path)))?
        .finish()
}

/// `.tsv` / `.txt` are read tab-separated, everything else as CSV.
pub fn read_table(file_path: &str) -> PolarsResult<DataFrame> {
    let tab_separated = Path::new(file_path)
        .extension()
        .and_then(|e| e.to_str())
        .map_or(false, |s| s.eq_ignore_ascii_case("tsv") || s.eq_ignore_ascii_case("txt"));

    info!("Reading table from {}", file_path);
    let df = if tab_separated { read_tsv(file_path)? } else { read_csv(file_path)? };
    debug!("Loaded {} rows, {} cols", df.height(), df.width());
    Ok(df)
}

/// Write `df` as CSV, creating parent directories. List columns are
/// rendered as `[a, b]` since CSV has no nested type.
pub fn dataframe_to_csv(df: &DataFrame, path: &str, include_header: bool) -> PolarsResult<()> {
    if let Some(parent) = Path::new(path).parent() {
        if !parent.as_os_str().is_empty() {
            create_dir_all(parent).map_err(|e| polars_err(Box::new(e)))?;
        }
    }

    let mut flat = stringify_nested(df)?;
    let mut file = File::create(path).map_err(|e| polars_err(Box::new(e)))?;
    CsvWriter::new(&mut file)
        .include_header(include_header)
        .finish(&mut flat)?;

    info!("Wrote {} rows to {}", flat.height(), path);
    Ok(())
}

/// Fail with a schema error naming the first absent column.
pub fn require_columns(df: &DataFrame, columns: &[&str], table: &str) -> PolarsResult<()> {
    for &name in columns {
        if df.get_column_index(name).is_none() {
            return Err(missing_column(table, name));
        }
    }
    Ok(())
}

pub fn has_column(df: &DataFrame, name: &str) -> bool {
    df.get_column_index(name).is_some()
}

/// Column values as owned strings; numbers are formatted, nulls stay `None`.
pub fn string_values(df: &DataFrame, name: &str) -> PolarsResult<Vec<Option<String>>> {
    let s = df.column(name)?.as_materialized_series().cast(&DataType::String)?;
    Ok(s.str()?.into_iter().map(|v| v.map(str::to_string)).collect())
}

/// Column values as `f64`; anything unparsable becomes `None`.
pub fn f64_values(df: &DataFrame, name: &str) -> PolarsResult<Vec<Option<f64>>> {
    let s = df.column(name)?.as_materialized_series().cast(&DataType::Float64)?;
    Ok(s.f64()?.into_iter().collect())
}

pub fn i64_values(df: &DataFrame, name: &str) -> PolarsResult<Vec<Option<i64>>> {
    let s = df.column(name)?.as_materialized_series().cast(&DataType::Int64)?;
    Ok(s.i64()?.into_iter().collect())
}

fn render_value(av: AnyValue) -> String {
    match av {
        AnyValue::String(v) => v.to_string(),
        AnyValue::StringOwned(v) => v.to_string(),
        AnyValue::Null => "null".to_string(),
        other => other.to_string(),
    }
}

/// A one-element list renders as its bare value, anything else as `[a, b]`.
pub fn render_cell(values: &Series) -> String {
    let items: Vec<String> = values.iter().map(render_value).collect();
    if let [single] = items.as_slice() {
        return single.clone();
    }
    format!("[{}]", items.join(", "))
}

/// Replace every list column by its string rendering.
pub fn stringify_nested(df: &DataFrame) -> PolarsResult<DataFrame> {
    let mut out = df.clone();
    for column in df.get_columns() {
        if !matches!(column.dtype(), DataType::List(_)) {
            continue;
        }
        let rendered: Vec<Option<String>> = column
            .as_materialized_series()
            .list()?
            .into_iter()
            .map(|cell| cell.map(|values| render_cell(&values)))
            .collect();
        out.with_column(Series::new(column.name().clone(), rendered))?;
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::df;

    #[test]
    fn require_columns_names_the_missing_one() {
        let df = df!["a" => &[1, 2]].unwrap();
        assert!(require_columns(&df, &["a"], "t").is_ok());
        let err = require_columns(&df, &["a", "b"], "t").unwrap_err();
        assert!(matches!(err, PolarsError::ColumnNotFound(_)));
        assert!(err.to_string().contains("'b'"));
    }

    #[test]
    fn value_extraction_casts() {
        let df = df![
            "score" => &["60", "abc", "10.5"],
            "pos" => &[1, 2, 3]
        ]
        .unwrap();
        assert_eq!(f64_values(&df, "score").unwrap(), vec![Some(60.0), None, Some(10.5)]);
        assert_eq!(string_values(&df, "pos").unwrap()[1].as_deref(), Some("2"));
        assert_eq!(i64_values(&df, "pos").unwrap(), vec![Some(1), Some(2), Some(3)]);
    }

    #[test]
    fn csv_round_trip_by_extension() {
        let dir = tempfile::tempdir().unwrap();
        let csv_path = dir.path().join("out/table.csv");
        let csv_path = csv_path.to_str().unwrap();

        let df = df![
            "miRNA" => &["hsa-miR-21", "hsa-let-7a"],
            "Target Score" => &[80.0, 55.0]
        ]
        .unwrap();
        dataframe_to_csv(&df, csv_path, true).unwrap();

        let back = read_table(csv_path).unwrap();
        assert_eq!(back.shape(), (2, 2));
        assert_eq!(string_values(&back, "miRNA").unwrap()[1].as_deref(), Some("hsa-let-7a"));

        let tsv_path = dir.path().join("targets.tsv");
        std::fs::write(&tsv_path, "miRNA_family_ID\ta_Gene_ID\n21/21a\tG1\n").unwrap();
        let tsv = read_table(tsv_path.to_str().unwrap()).unwrap();
        assert_eq!(tsv.shape(), (1, 2));
    }

    #[test]
    fn late_text_value_keeps_column_as_text() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("families.csv");
        let mut text = String::from("miRNA_family_ID,a_Gene_ID\n");
        for _ in 0..150 {
            text.push_str("155,5728\n");
        }
        text.push_str("21/21a,7157\n");
        std::fs::write(&path, text).unwrap();

        let df = read_table(path.to_str().unwrap()).unwrap();
        assert_eq!(df.height(), 151);
        assert_eq!(df.column("miRNA_family_ID").unwrap().dtype(), &DataType::String);
        assert_eq!(string_values(&df, "miRNA_family_ID").unwrap()[150].as_deref(), Some("21/21a"));
    }

    #[test]
    fn single_element_lists_render_bare() {
        let lists = Series::new(
            PlSmallStr::from("v"),
            vec![
                Series::new(PlSmallStr::EMPTY, &[5i32, 7]),
                Series::new(PlSmallStr::EMPTY, &[9i32]),
            ],
        );
        let df = DataFrame::new(vec![lists.into()]).unwrap();
        let flat = stringify_nested(&df).unwrap();
        assert_eq!(
            string_values(&flat, "v").unwrap(),
            vec![Some("[5, 7]".to_string()), Some("9".to_string())]
        );
    }
}
