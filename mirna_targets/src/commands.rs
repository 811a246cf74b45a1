//! One function per subcommand.

use std::path::Path;

use anyhow::Context;
use polars::prelude::DataFrame;
use tracing::info;

use crate::analysis::collapse::collapse_by_key;
use crate::analysis::naming::{hsa_add, hsa_del, mirname_remake};
use crate::analysis::threshold::top_score;
use crate::analysis::tool_comparison::{compare_predictions, ComparisonColumns};
use crate::cli::{
    CollapseArgs, ColumnArgs, CompareArgs, CustomArgs, InitConfigArgs, OutputArgs, RemakeArgs,
    SearchArgs, TableArgs, TopArgs,
};
use crate::config::{write_default_config, PipelineConfig};
use crate::data_handling::any_dataset::AnyDataset;
use crate::data_handling::mirdb_dataset::MirdbDataset;
use crate::data_handling::targetscan::TargetScanDataset;
use crate::helper_functions::dataframe_to_csv;
use crate::models::Dataset;
use crate::prediction_tools::html_table::TableOptions;
use crate::prediction_tools::mirdb_integration::{MirdbSession, ReqwestTransport, SessionSettings};
use crate::prediction_tools::mirdb_query::{GeneChoice, MirdbQuery, SearchType, Species, SubmissionType};

fn path_str(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

fn load_any(path: &Path) -> anyhow::Result<DataFrame> {
    AnyDataset { path: path_str(path) }
        .load()
        .with_context(|| format!("loading {}", path.display()))
}

/// Write to `--out` if given, print otherwise.
fn emit(df: &DataFrame, output: &OutputArgs) -> anyhow::Result<()> {
    match &output.out {
        Some(path) => dataframe_to_csv(df, &path_str(path), true)
            .with_context(|| format!("writing {}", path.display()))?,
        None => println!("{}", df),
    }
    Ok(())
}

fn table_options(config: &PipelineConfig, table: &TableArgs, mirna_search: bool) -> TableOptions {
    TableOptions {
        detail_links: table.detail_links,
        link_base: config.base_url.clone(),
        mirna_search: mirna_search && !table.keep_all_columns,
        ..TableOptions::default()
    }
}

fn run_query(
    config: &PipelineConfig,
    settings: SessionSettings,
    query: &MirdbQuery,
    table: &TableArgs,
    output: &OutputArgs,
) -> anyhow::Result<()> {
    let transport = ReqwestTransport::new(config)?;
    let response = MirdbSession::new(transport, settings)
        .run(query)
        .context("querying miRDB")?;

    if table.raw_html {
        println!("{}", response);
        return Ok(());
    }
    let df = response
        .to_table(&table_options(config, table, query.is_mirna_search()))
        .context("reading miRDB result table")?;
    info!("miRDB returned {} predictions", df.height());
    emit(&df, output)
}

pub fn search(config: &PipelineConfig, args: SearchArgs) -> anyhow::Result<()> {
    let species = args.species.parse::<Species>()?;
    info!("Searching miRDB ({}) for {}", species, args.query);
    let query = MirdbQuery::Default {
        search_box: args.query,
        search_type: args.search_type.parse::<SearchType>()?,
        species,
        gene_choice: args.gene_choice.parse::<GeneChoice>()?,
    };
    run_query(config, SessionSettings::from(config), &query, &args.table, &args.output)
}

pub fn custom(config: &PipelineConfig, args: CustomArgs) -> anyhow::Result<()> {
    let species = args.species.parse::<Species>()?;
    info!("Submitting custom prediction ({})", species);
    let query = MirdbQuery::custom(&args.sequence, args.submission.parse::<SubmissionType>()?, species);
    let mut settings = SessionSettings::from(config);
    if args.no_reset {
        settings.reset = false;
    }
    run_query(config, settings, &query, &args.table, &args.output)
}

pub fn compare(config: &PipelineConfig, args: CompareArgs) -> anyhow::Result<()> {
    let defaults = &config.columns;
    let columns = ComparisonColumns {
        mirdb_name: args.mirdb_name_column.unwrap_or_else(|| defaults.mirdb_name.clone()),
        mirdb_score: args.mirdb_score_column.unwrap_or_else(|| defaults.mirdb_score.clone()),
        family: args.family_column.unwrap_or_else(|| defaults.family.clone()),
        gene: args.gene_column.unwrap_or_else(|| defaults.gene.clone()),
        ..defaults.clone()
    };

    let mirdb = MirdbDataset::new(&path_str(&args.mirdb), &columns.mirdb_name, &columns.mirdb_score)
        .load()
        .with_context(|| format!("loading miRDB table {}", args.mirdb.display()))?;
    let targetscan = TargetScanDataset::new(&path_str(&args.targetscan), &columns.family, &columns.gene)
        .load()
        .with_context(|| format!("loading TargetScan table {}", args.targetscan.display()))?;

    let result = compare_predictions(&mirdb, &targetscan, &columns)?;
    emit(&result, &args.output)
}

pub fn remake(args: RemakeArgs) -> anyhow::Result<()> {
    let df = load_any(&args.input)?;
    emit(&mirname_remake(&df, &args.column, &args.new_column)?, &args.output)
}

pub fn collapse(args: CollapseArgs) -> anyhow::Result<()> {
    let df = load_any(&args.input)?;
    emit(&collapse_by_key(&df, &args.key)?, &args.output)
}

pub fn top(args: TopArgs) -> anyhow::Result<()> {
    let df = load_any(&args.input)?;
    emit(&top_score(&df, &args.column, args.threshold)?, &args.output)
}

pub fn strip_prefix(args: ColumnArgs) -> anyhow::Result<()> {
    let df = load_any(&args.input)?;
    emit(&hsa_del(&df, &args.column)?, &args.output)
}

pub fn add_prefix(args: ColumnArgs) -> anyhow::Result<()> {
    let df = load_any(&args.input)?;
    emit(&hsa_add(&df, &args.column)?, &args.output)
}

pub fn init_config(config_path: &Path, args: InitConfigArgs) -> anyhow::Result<()> {
    write_default_config(config_path, args.force)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::helper_functions::{read_table, string_values};
    use std::fs;
    use std::path::PathBuf;

    fn out(path: &Path) -> OutputArgs {
        OutputArgs { out: Some(path.to_path_buf()) }
    }

    #[test]
    fn compare_writes_joined_csv() {
        let dir = tempfile::tempdir().unwrap();
        let mirdb = dir.path().join("mirdb.csv");
        let targetscan = dir.path().join("targets.txt");
        let result = dir.path().join("result.csv");
        fs::write(&mirdb, "miRNA Name,Target Score\nhsa-miR-21,80\nhsa-miR-155,95\n").unwrap();
        fs::write(
            &targetscan,
            "a_Gene_ID\tmiRNA_family_ID\tMSA_start\tMSA_end\tSite_type\nG1\t21/210\t1\t10\t8mer\n",
        )
        .unwrap();

        let args = CompareArgs {
            mirdb,
            targetscan,
            mirdb_name_column: None,
            mirdb_score_column: None,
            family_column: None,
            gene_column: None,
            output: out(&result),
        };
        compare(&PipelineConfig::default(), args).unwrap();

        let df = read_table(result.to_str().unwrap()).unwrap();
        assert_eq!(df.height(), 1);
        assert_eq!(string_values(&df, "miRNA").unwrap(), vec![Some("hsa-miR-21".to_string())]);
    }

    #[test]
    fn collapse_renders_lists_in_csv() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.csv");
        let result = dir.path().join("collapsed.csv");
        fs::write(&input, "k,v\n1,5\n1,5\n1,7\n").unwrap();

        collapse(CollapseArgs {
            input,
            key: "k".to_string(),
            output: out(&result),
        })
        .unwrap();

        let text = fs::read_to_string(&result).unwrap();
        assert!(text.contains("[5, 7]"), "{}", text);
    }

    #[test]
    fn missing_input_is_reported() {
        let err = top(TopArgs {
            input: PathBuf::from("/nonexistent/in.csv"),
            column: "Target Score".to_string(),
            threshold: 50.0,
            output: OutputArgs { out: None },
        })
        .unwrap_err();
        assert!(format!("{:#}", err).contains("/nonexistent/in.csv"));
    }
}
