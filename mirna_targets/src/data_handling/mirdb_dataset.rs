use polars::prelude::*;
use tracing::{debug, error, info};

use crate::helper_functions::{read_table, require_columns};
use crate::models::Dataset;

/// A miRDB prediction export (one row per miRNA/target pair).
pub struct MirdbDataset {
    pub path: String,
    pub name_column: String,
    pub score_column: String,
}

impl MirdbDataset {
    pub fn new(path: &str, name_column: &str, score_column: &str) -> Self {
        Self {
            path: path.to_string(),
            name_column: name_column.to_string(),
            score_column: score_column.to_string(),
        }
    }
}

impl Dataset for MirdbDataset {
    fn load(&self) -> PolarsResult<DataFrame> {
        info!("Reading miRDB predictions from {}", &self.path);

        let mut df = match read_table(&self.path) {
            Ok(df) => df,
            Err(e) => {
                error!("Failed to read miRDB table: {}", e);
                return Err(e);
            }
        };
        require_columns(&df, &[self.name_column.as_str(), self.score_column.as_str()], &self.path)?;

        let name = df.column(&self.name_column)?.cast(&DataType::String)?;
        let score = df.column(&self.score_column)?.cast(&DataType::Float64)?;
        df.with_column(name)?;
        df.with_column(score)?;

        debug!("miRDB table shape: {:?}", df.shape());
        Ok(df)
    }
}
