//! Command-line arguments.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Fetch miRDB predictions and compare them with TargetScan
#[derive(Parser, Debug)]
#[command(name = "mirna_targets", version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable debug logging (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Config file (default: $PROJECT_ROOT/mirna_targets.json)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Search miRDB predictions by miRNA name or gene
    Search(SearchArgs),

    /// Submit a sequence to miRDB custom prediction
    Custom(CustomArgs),

    /// Join TargetScan sites with miRDB scores on canonical miRNA name
    Compare(CompareArgs),

    /// Expand slash-joined miRNA families into one row per canonical name
    Remake(RemakeArgs),

    /// Collapse rows sharing a key, listing the distinct values of other columns
    Collapse(CollapseArgs),

    /// Keep rows whose score is at least a threshold
    Top(TopArgs),

    /// Remove a leading "hsa-" from a column
    #[command(name = "strip-prefix")]
    StripPrefix(ColumnArgs),

    /// Add "hsa-" to names lacking a species or let- marker
    #[command(name = "add-prefix")]
    AddPrefix(ColumnArgs),

    /// Write a config file with default values
    #[command(name = "init-config")]
    InitConfig(InitConfigArgs),
}

#[derive(Args, Debug)]
pub struct OutputArgs {
    /// Write the result table as CSV instead of printing it
    #[arg(short, long)]
    pub out: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct TableArgs {
    /// Render linked cells as HTML anchors
    #[arg(long)]
    pub detail_links: bool,

    /// Keep the columns that repeat the searched miRNA
    #[arg(long)]
    pub keep_all_columns: bool,

    /// Print the raw HTML page instead of the table
    #[arg(long)]
    pub raw_html: bool,
}

#[derive(Args, Debug)]
pub struct SearchArgs {
    /// miRNA name, gene symbol, GenBank accession or NCBI gene id
    pub query: String,

    /// 'miRNA' or 'gene'
    #[arg(long, default_value = "miRNA")]
    pub search_type: String,

    #[arg(long, default_value = "Human")]
    pub species: String,

    /// 'symbol', 'geneID' or 'accession' (gene searches only)
    #[arg(long, default_value = "symbol")]
    pub gene_choice: String,

    #[command(flatten)]
    pub table: TableArgs,

    #[command(flatten)]
    pub output: OutputArgs,
}

#[derive(Args, Debug)]
pub struct CustomArgs {
    /// miRNA or mRNA target sequence
    pub sequence: String,

    /// 'miRNA' or 'mRNATarget'
    #[arg(long, default_value = "miRNA")]
    pub submission: String,

    #[arg(long, default_value = "hsa")]
    pub species: String,

    /// Do not return the miRDB session to the custom prediction form
    #[arg(long)]
    pub no_reset: bool,

    #[command(flatten)]
    pub table: TableArgs,

    #[command(flatten)]
    pub output: OutputArgs,
}

#[derive(Args, Debug)]
pub struct CompareArgs {
    /// miRDB prediction table (CSV, or TSV for .tsv/.txt)
    pub mirdb: PathBuf,

    /// TargetScan prediction table
    pub targetscan: PathBuf,

    #[arg(long)]
    pub mirdb_name_column: Option<String>,

    #[arg(long)]
    pub mirdb_score_column: Option<String>,

    #[arg(long)]
    pub family_column: Option<String>,

    #[arg(long)]
    pub gene_column: Option<String>,

    #[command(flatten)]
    pub output: OutputArgs,
}

#[derive(Args, Debug)]
pub struct RemakeArgs {
    pub input: PathBuf,

    /// Column holding slash-joined family names
    #[arg(long, default_value = "miRNA_family_ID")]
    pub column: String,

    #[arg(long, default_value = "miRNA")]
    pub new_column: String,

    #[command(flatten)]
    pub output: OutputArgs,
}

#[derive(Args, Debug)]
pub struct CollapseArgs {
    pub input: PathBuf,

    #[arg(long, default_value = "miRNA")]
    pub key: String,

    #[command(flatten)]
    pub output: OutputArgs,
}

#[derive(Args, Debug)]
pub struct TopArgs {
    pub input: PathBuf,

    #[arg(long, default_value = "Target Score")]
    pub column: String,

    #[arg(long, default_value_t = 80.0)]
    pub threshold: f64,

    #[command(flatten)]
    pub output: OutputArgs,
}

#[derive(Args, Debug)]
pub struct ColumnArgs {
    pub input: PathBuf,

    #[arg(long, default_value = "miRNA")]
    pub column: String,

    #[command(flatten)]
    pub output: OutputArgs,
}

#[derive(Args, Debug)]
pub struct InitConfigArgs {
    /// Overwrite an existing file
    #[arg(long)]
    pub force: bool,
}
