use polars::prelude::*;
use tracing::{debug, error, info};

use crate::helper_functions::{read_table, require_columns};
use crate::models::Dataset;

/// TargetScan site predictions, usually the tab-separated output of
/// `targetscan_70.pl` (miRNA_family_ID, a_Gene_ID, MSA_start, ...).
pub struct TargetScanDataset {
    pub path: String,
    pub family_column: String,
    pub gene_column: String,
}

impl TargetScanDataset {
    pub fn new(path: &str, family_column: &str, gene_column: &str) -> Self {
        Self {
            path: path.to_string(),
            family_column: family_column.to_string(),
            gene_column: gene_column.to_string(),
        }
    }
}

impl Dataset for TargetScanDataset {
    fn load(&self) -> PolarsResult<DataFrame> {
        info!("Reading TargetScan predictions from {}", &self.path);

        let mut df = match read_table(&self.path) {
            Ok(df) => df,
            Err(e) => {
                error!("Failed to read TargetScan table: {}", e);
                return Err(e);
            }
        };
        require_columns(&df, &[self.family_column.as_str(), self.gene_column.as_str()], &self.path)?;

        // "155" alone would otherwise be inferred as an integer family
        let family = df.column(&self.family_column)?.cast(&DataType::String)?;
        let gene = df.column(&self.gene_column)?.cast(&DataType::String)?;
        df.with_column(family)?;
        df.with_column(gene)?;

        debug!("TargetScan table shape: {:?}", df.shape());
        Ok(df)
    }
}
