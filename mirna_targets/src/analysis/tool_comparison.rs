use std::collections::HashMap;

use polars::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::analysis::naming::canonical_names;
use crate::helper_functions::{f64_values, has_column, i64_values, require_columns, string_values};

pub const RESULT_MIRNA: &str = "miRNA";
pub const RESULT_GENE: &str = "a_Gene_ID";
pub const RESULT_START: &str = "Start";
pub const RESULT_END: &str = "End";
pub const RESULT_SITE: &str = "Site type";
pub const RESULT_SCORE: &str = "Target Score";

/// Where the comparator finds its inputs in the miRDB and TargetScan tables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComparisonColumns {
    /// miRDB: mature miRNA name.
    pub mirdb_name: String,
    /// miRDB: target score.
    pub mirdb_score: String,
    /// TargetScan: slash-joined seed family.
    pub family: String,
    pub gene: String,
    /// Optional alignment/site columns; absent columns yield nulls.
    pub start: String,
    pub end: String,
    pub site_type: String,
}

impl Default for ComparisonColumns {
    fn default() -> Self {
        Self {
            mirdb_name: "miRNA Name".to_string(),
            mirdb_score: "Target Score".to_string(),
            family: "miRNA_family_ID".to_string(),
            gene: "a_Gene_ID".to_string(),
            start: "MSA_start".to_string(),
            end: "MSA_end".to_string(),
            site_type: "Site_type".to_string(),
        }
    }
}

/// miRNA name → target score. On duplicate names the later row wins.
pub fn target_scores(mirdb: &DataFrame, columns: &ComparisonColumns) -> PolarsResult<HashMap<String, f64>> {
    let names = string_values(mirdb, &columns.mirdb_name)?;
    let scores = f64_values(mirdb, &columns.mirdb_score)?;

    let mut map = HashMap::with_capacity(names.len());
    let mut overwritten = 0usize;
    for (name, score) in names.into_iter().zip(scores) {
        let Some(name) = name else {
            continue;
        };
        let Some(score) = score else {
            debug!("miRDB entry {} has no score, left out of the join", name);
            continue;
        };
        if let Some(previous) = map.insert(name.clone(), score) {
            debug!("Duplicate miRDB entry {}: {} replaced by {}", name, previous, score);
            overwritten += 1;
        }
    }
    if overwritten > 0 {
        warn!("{} duplicate miRDB names; kept the last score for each", overwritten);
    }
    Ok(map)
}

fn optional_i64(df: &DataFrame, name: &str) -> PolarsResult<Vec<Option<i64>>> {
    if has_column(df, name) {
        i64_values(df, name)
    } else {
        debug!("Column '{}' absent, leaving it null", name);
        Ok(vec![None; df.height()])
    }
}

fn optional_str(df: &DataFrame, name: &str) -> PolarsResult<Vec<Option<String>>> {
    if has_column(df, name) {
        string_values(df, name)
    } else {
        debug!("Column '{}' absent, leaving it null", name);
        Ok(vec![None; df.height()])
    }
}

/// Inner join of TargetScan sites with miRDB scores on canonical miRNA name.
///
/// Every TargetScan row is expanded to its family members; members miRDB
/// does not know are dropped without a trace.
pub fn compare_predictions(
    mirdb: &DataFrame,
    targetscan: &DataFrame,
    columns: &ComparisonColumns,
) -> PolarsResult<DataFrame> {
    require_columns(
        mirdb,
        &[columns.mirdb_name.as_str(), columns.mirdb_score.as_str()],
        "miRDB table",
    )?;
    require_columns(
        targetscan,
        &[columns.family.as_str(), columns.gene.as_str()],
        "TargetScan table",
    )?;

    let scores = target_scores(mirdb, columns)?;
    info!("{} scored miRNAs in miRDB table", scores.len());

    let families = string_values(targetscan, &columns.family)?;
    let genes = string_values(targetscan, &columns.gene)?;
    let starts = optional_i64(targetscan, &columns.start)?;
    let ends = optional_i64(targetscan, &columns.end)?;
    let sites = optional_str(targetscan, &columns.site_type)?;

    let mut mirna: Vec<String> = Vec::new();
    let mut gene: Vec<Option<String>> = Vec::new();
    let mut start: Vec<Option<i64>> = Vec::new();
    let mut end: Vec<Option<i64>> = Vec::new();
    let mut site: Vec<Option<String>> = Vec::new();
    let mut score: Vec<f64> = Vec::new();

    for (i, family) in families.iter().enumerate() {
        let Some(family) = family else {
            warn!("TargetScan row {} has no family, skipping", i);
            continue;
        };
        for name in canonical_names(family) {
            let Some(&target_score) = scores.get(&name) else {
                continue;
            };
            mirna.push(name);
            gene.push(genes[i].clone());
            start.push(starts[i]);
            end.push(ends[i]);
            site.push(sites[i].clone());
            score.push(target_score);
        }
    }
    info!("{} TargetScan sites matched miRDB predictions", mirna.len());

    DataFrame::new(vec![
        Series::new(PlSmallStr::from(RESULT_MIRNA), mirna).into(),
        Series::new(PlSmallStr::from(RESULT_GENE), gene).into(),
        Series::new(PlSmallStr::from(RESULT_START), start).into(),
        Series::new(PlSmallStr::from(RESULT_END), end).into(),
        Series::new(PlSmallStr::from(RESULT_SITE), site).into(),
        Series::new(PlSmallStr::from(RESULT_SCORE), score).into(),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::df;

    fn mirdb() -> DataFrame {
        df![
            "miRNA Name" => &["hsa-miR-21", "hsa-miR-155"],
            "Target Score" => &[80, 95]
        ]
        .unwrap()
    }

    #[test]
    fn unscored_names_are_left_out() {
        let mirdb = df![
            "miRNA Name" => &[Some("hsa-miR-21"), Some("hsa-miR-155")],
            "Target Score" => &[Some(80.0), None]
        ]
        .unwrap();
        let scores = target_scores(&mirdb, &ComparisonColumns::default()).unwrap();
        assert_eq!(scores.len(), 1);
        assert_eq!(scores.get("hsa-miR-21"), Some(&80.0));
    }

    fn column_names(df: &DataFrame) -> Vec<String> {
        df.get_column_names().iter().map(|c| c.to_string()).collect()
    }

    #[test]
    fn joins_on_canonical_name_and_drops_unknown_members() {
        let targetscan = df![
            "miRNA_family_ID" => &["21/210"],
            "a_Gene_ID" => &["G1"],
            "MSA_start" => &[1],
            "MSA_end" => &[10],
            "Site_type" => &["8mer"]
        ]
        .unwrap();

        let out = compare_predictions(&mirdb(), &targetscan, &ComparisonColumns::default()).unwrap();
        assert_eq!(out.height(), 1);
        assert_eq!(string_values(&out, RESULT_MIRNA).unwrap(), vec![Some("hsa-miR-21".to_string())]);
        assert_eq!(string_values(&out, RESULT_GENE).unwrap(), vec![Some("G1".to_string())]);
        assert_eq!(i64_values(&out, RESULT_START).unwrap(), vec![Some(1)]);
        assert_eq!(i64_values(&out, RESULT_END).unwrap(), vec![Some(10)]);
        assert_eq!(string_values(&out, RESULT_SITE).unwrap(), vec![Some("8mer".to_string())]);
        assert_eq!(f64_values(&out, RESULT_SCORE).unwrap(), vec![Some(80.0)]);
    }

    #[test]
    fn empty_targetscan_gives_headers_only() {
        let targetscan = df![
            "miRNA_family_ID" => Vec::<String>::new(),
            "a_Gene_ID" => Vec::<String>::new()
        ]
        .unwrap();

        let out = compare_predictions(&mirdb(), &targetscan, &ComparisonColumns::default()).unwrap();
        assert_eq!(out.height(), 0);
        assert_eq!(
            column_names(&out),
            vec!["miRNA", "a_Gene_ID", "Start", "End", "Site type", "Target Score"]
        );
    }

    #[test]
    fn optional_columns_become_null() {
        let targetscan = df![
            "miRNA_family_ID" => &["155"],
            "a_Gene_ID" => &["G7"]
        ]
        .unwrap();

        let out = compare_predictions(&mirdb(), &targetscan, &ComparisonColumns::default()).unwrap();
        assert_eq!(out.height(), 1);
        assert_eq!(i64_values(&out, RESULT_START).unwrap(), vec![None]);
        assert_eq!(string_values(&out, RESULT_SITE).unwrap(), vec![None]);
        assert_eq!(f64_values(&out, RESULT_SCORE).unwrap(), vec![Some(95.0)]);
    }

    #[test]
    fn duplicate_reference_names_keep_the_last_score() {
        let mirdb = df![
            "miRNA Name" => &["hsa-miR-21", "hsa-miR-21"],
            "Target Score" => &[50, 90]
        ]
        .unwrap();
        let scores = target_scores(&mirdb, &ComparisonColumns::default()).unwrap();
        assert_eq!(scores.len(), 1);
        assert_eq!(scores["hsa-miR-21"], 90.0);
    }

    #[test]
    fn one_row_per_matching_family_member() {
        let targetscan = df![
            "miRNA_family_ID" => &["21/155", "let-7"],
            "a_Gene_ID" => &["G1", "G2"]
        ]
        .unwrap();
        let out = compare_predictions(&mirdb(), &targetscan, &ComparisonColumns::default()).unwrap();
        assert_eq!(
            string_values(&out, RESULT_MIRNA).unwrap(),
            vec![Some("hsa-miR-21".to_string()), Some("hsa-miR-155".to_string())]
        );
    }

    #[test]
    fn missing_columns_are_schema_errors() {
        let targetscan = df!["family" => &["21"], "a_Gene_ID" => &["G1"]].unwrap();
        let err = compare_predictions(&mirdb(), &targetscan, &ComparisonColumns::default()).unwrap_err();
        assert!(matches!(err, PolarsError::ColumnNotFound(_)));
        assert!(err.to_string().contains("miRNA_family_ID"));

        let bad_mirdb = df!["miRNA Name" => &["hsa-miR-21"]].unwrap();
        let targetscan = df!["miRNA_family_ID" => &["21"], "a_Gene_ID" => &["G1"]].unwrap();
        let err = compare_predictions(&bad_mirdb, &targetscan, &ComparisonColumns::default()).unwrap_err();
        assert!(err.to_string().contains("Target Score"));
    }

    #[test]
    fn caller_chosen_column_names() {
        let mirdb = df!["name" => &["hsa-miR-21"], "score" => &[70.5]].unwrap();
        let targetscan = df!["fam" => &["21"], "gene" => &["G3"]].unwrap();
        let columns = ComparisonColumns {
            mirdb_name: "name".into(),
            mirdb_score: "score".into(),
            family: "fam".into(),
            gene: "gene".into(),
            ..ComparisonColumns::default()
        };
        let out = compare_predictions(&mirdb, &targetscan, &columns).unwrap();
        assert_eq!(f64_values(&out, RESULT_SCORE).unwrap(), vec![Some(70.5)]);
    }
}
