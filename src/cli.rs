use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::config::{
    DEFAULT_DELETE_AFTER, DEFAULT_DELETION_PATTERN, DEFAULT_KEEP, DEFAULT_OLDER_THAN,
    DEFAULT_REPO_PATH,
};
use crate::output::OutputFormat;
use crate::vcs::SortCriteria;

#[derive(Parser)]
#[command(name = "seiso")]
#[command(about = "Find and remove unused image tags, ConfigMaps, Secrets and idle namespaces")]
pub struct Cli {
    /// Namespace (defaults to the one of the current kubeconfig context)
    #[arg(short = 'n', long, global = true)]
    pub namespace: Option<String>,

    /// Context
    #[arg(long, global = true)]
    pub context: Option<String>,

    /// Log level when RUST_LOG is not set
    #[arg(long, global = true, default_value = "info")]
    pub log_level: String,

    /// Shorthand for --log-level debug
    #[arg(short = 'v', long, global = true)]
    pub verbose: bool,

    /// How candidates are reported
    #[arg(short = 'o', long, global = true, value_enum, default_value = "log")]
    pub output: OutputFormat,

    /// Shorthand for --output batch
    #[arg(short = 'b', long, global = true)]
    pub batch: bool,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    pub fn output_format(&self) -> OutputFormat {
        if self.batch {
            OutputFormat::Batch
        } else {
            self.output
        }
    }

    pub fn log_filter(&self) -> &str {
        if self.verbose { "debug" } else { &self.log_level }
    }
}

#[derive(Subcommand)]
pub enum Command {
    /// Clean up image tags of superseded commits or git tags, keeping the newest ones
    History(HistoryArgs),
    /// Clean up image tags that match no commit or git tag at all
    Orphans(OrphanArgs),
    /// Clean up ConfigMaps not referenced by any workload
    Configmaps(ResourceArgs),
    /// Clean up Secrets not referenced by any workload
    Secrets(ResourceArgs),
    /// Clean up namespaces that have been idle long enough
    Namespaces(NamespaceArgs),
}

#[derive(Args)]
pub struct DeleteArgs {
    /// Actually delete the candidates instead of only reporting them
    #[arg(short = 'd', long, visible_alias = "force")]
    pub delete: bool,
}

#[derive(Args)]
pub struct GitArgs {
    /// Only look at the first N commits, 0 for all
    #[arg(short = 'l', long, default_value_t = 0)]
    pub commit_limit: usize,

    /// Path to the git repository
    #[arg(short = 'p', long, default_value = DEFAULT_REPO_PATH)]
    pub repo_path: PathBuf,

    /// Compare git tags with image tags instead of commit hashes
    #[arg(short = 't', long)]
    pub tags: bool,

    /// Sort order of git tags, only used with --tags
    #[arg(long, value_enum, default_value = "version")]
    pub sort: SortCriteria,
}

#[derive(Args)]
pub struct HistoryArgs {
    /// Image stream name; lists the available image streams when omitted
    pub image: Option<String>,

    /// Number of matching tags to keep
    #[arg(long, default_value_t = DEFAULT_KEEP)]
    pub keep: usize,

    #[command(flatten)]
    pub git: GitArgs,

    #[command(flatten)]
    pub delete: DeleteArgs,
}

#[derive(Args)]
pub struct OrphanArgs {
    /// Image stream name; lists the available image streams when omitted
    pub image: Option<String>,

    /// Only tags last updated longer ago than this are candidates
    #[arg(long, default_value = DEFAULT_OLDER_THAN)]
    pub older_than: String,

    /// Only tags matching this pattern are candidates
    #[arg(short = 'r', long, default_value = DEFAULT_DELETION_PATTERN)]
    pub deletion_pattern: String,

    #[command(flatten)]
    pub git: GitArgs,

    #[command(flatten)]
    pub delete: DeleteArgs,
}

#[derive(Args)]
pub struct ResourceArgs {
    /// Namespace to clean up, overrides --namespace
    pub target_namespace: Option<String>,

    /// Label selector (key=value), may be repeated
    #[arg(short = 'l', long = "label")]
    pub labels: Vec<String>,

    /// Only resources created longer ago than this are candidates
    #[arg(long, default_value = DEFAULT_OLDER_THAN)]
    pub older_than: String,

    #[command(flatten)]
    pub delete: DeleteArgs,
}

#[derive(Args)]
pub struct NamespaceArgs {
    /// Label selector for namespaces, may be repeated
    #[arg(short = 'l', long = "label")]
    pub labels: Vec<String>,

    /// Grace period after a namespace was marked idle
    #[arg(long, default_value = DEFAULT_DELETE_AFTER)]
    pub delete_after: String,

    /// Skip the Helm release check
    #[arg(long)]
    pub no_helm: bool,

    #[command(flatten)]
    pub delete: DeleteArgs,
}
