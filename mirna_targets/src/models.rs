use polars::prelude::*;

/// Anything that can be loaded into a prediction table.
pub trait Dataset {
    fn load(&self) -> PolarsResult<DataFrame>;
}

/// Wrap a foreign error so it can travel through `PolarsResult`.
pub fn polars_err(e: Box<dyn std::error::Error>) -> PolarsError {
    PolarsError::ComputeError(format!("{}", e).into())
}

/// Schema violation for a column the caller promised but the table lacks.
pub fn missing_column(table: &str, column: &str) -> PolarsError {
    PolarsError::ColumnNotFound(format!("{}: missing column '{}'", table, column).into())
}
