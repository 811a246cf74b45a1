use polars::error::PolarsResult;
use polars::frame::DataFrame;

use crate::helper_functions::read_table;
use crate::models::Dataset;

/// Any CSV/TSV table, read as-is.
pub struct AnyDataset {
    pub path: String,
}

impl Dataset for AnyDataset {
    fn load(&self) -> PolarsResult<DataFrame> {
        read_table(&self.path)
    }
}
