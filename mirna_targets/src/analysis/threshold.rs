use polars::lazy::dsl::*;
use polars::prelude::*;
use tracing::info;

use crate::helper_functions::require_columns;

/// Rows whose `column` value is at least `threshold`.
///
/// Values are read as floats; text that does not parse and missing values
/// count as failing the threshold.
pub fn top_score(df: &DataFrame, column: &str, threshold: f64) -> PolarsResult<DataFrame> {
    require_columns(df, &[column], "top_score")?;

    let kept = df
        .clone()
        .lazy()
        .filter(col(column).cast(DataType::Float64).gt_eq(lit(threshold)))
        .collect()?;

    info!(
        "{} of {} rows have {} >= {}",
        kept.height(),
        df.height(),
        column,
        threshold
    );
    Ok(kept)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::helper_functions::{f64_values, string_values};
    use polars::df;

    #[test]
    fn keeps_scores_at_or_above_threshold() {
        let df = df![
            "miRNA" => &["a", "b", "c"],
            "Target Score" => &[10, 60, 50]
        ]
        .unwrap();
        let out = top_score(&df, "Target Score", 50.0).unwrap();
        assert_eq!(f64_values(&out, "Target Score").unwrap(), vec![Some(60.0), Some(50.0)]);
    }

    #[test]
    fn unparsable_and_missing_values_fail() {
        let df = df![
            "miRNA" => &["a", "b", "c", "d"],
            "Target Score" => &[Some("70"), Some("n/a"), None, Some("49.9")]
        ]
        .unwrap();
        let out = top_score(&df, "Target Score", 50.0).unwrap();
        assert_eq!(string_values(&out, "miRNA").unwrap(), vec![Some("a".to_string())]);
    }

    #[test]
    fn unknown_column_is_a_schema_error() {
        let df = df!["Target Score" => &[1.0]].unwrap();
        assert!(matches!(top_score(&df, "score", 1.0), Err(PolarsError::ColumnNotFound(_))));
    }
}
