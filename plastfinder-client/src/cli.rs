//! Command-line arguments.

use crate::config::{ClientConfig, DEFAULT_ENDPOINT};
use clap::builder::PossibleValuesParser;
use clap::{Args, Parser, Subcommand, ValueEnum};
use plastfinder_core::{SearchCriteria, SortOrder, BAG_SIZES, BAG_TYPES, MATERIALS};
use std::path::PathBuf;
use std::time::Duration;

/// Find custom plastic bag suppliers with a grounded web search
#[derive(Parser, Debug)]
#[command(name = "plastfinder", version, about, long_about = None)]
pub struct Cli {
    /// Search endpoint
    #[arg(long, env = "PLASTFINDER_ENDPOINT", default_value = DEFAULT_ENDPOINT)]
    pub endpoint: String,

    /// Give up when the stream is silent for this many seconds
    #[arg(long, default_value_t = 60)]
    pub idle_timeout: u64,

    /// History file (defaults to the platform data directory)
    #[arg(long, env = "PLASTFINDER_HISTORY")]
    pub history_file: Option<PathBuf>,

    /// Emit logs as JSON
    #[arg(
        long,
        env = "PLASTFINDER_LOG_JSON",
        value_parser = clap::builder::FalseyValueParser::new()
    )]
    pub json_logs: bool,

    /// Subcommand
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run a new search
    Search(SearchArgs),

    /// List saved searches, most recent first
    History,

    /// Re-run a saved search
    Rerun {
        /// Position in `plastfinder history` (1 = most recent)
        #[arg(value_parser = clap::value_parser!(u32).range(1..))]
        index: u32,

        /// Summary ordering
        #[arg(long, value_enum, default_value_t = SortArg::Price)]
        sort: SortArg,
    },
}

/// Criteria flags for `search`.
#[derive(Args, Debug)]
pub struct SearchArgs {
    /// Bag type
    #[arg(
        long,
        default_value = BAG_TYPES[0],
        value_parser = PossibleValuesParser::new(BAG_TYPES.iter().copied())
    )]
    pub bag_type: String,

    /// Size in centimetres
    #[arg(
        long,
        default_value = BAG_SIZES[1],
        value_parser = PossibleValuesParser::new(BAG_SIZES.iter().copied())
    )]
    pub size: String,

    /// Film thickness in microns
    #[arg(long, default_value_t = 40, value_parser = clap::value_parser!(u32).range(10..=150))]
    pub thickness: u32,

    /// Number of print colors
    #[arg(long, default_value_t = 2, value_parser = clap::value_parser!(u32).range(0..=6))]
    pub colors: u32,

    /// Material
    #[arg(
        long,
        default_value = MATERIALS[0],
        value_parser = PossibleValuesParser::new(MATERIALS.iter().copied())
    )]
    pub material: String,

    /// Summary ordering
    #[arg(long, value_enum, default_value_t = SortArg::Price)]
    pub sort: SortArg,
}

impl SearchArgs {
    /// Criteria from the flags.
    pub fn criteria(&self) -> SearchCriteria {
        SearchCriteria::new(
            &self.bag_type,
            &self.size,
            f64::from(self.thickness),
            self.colors,
            &self.material,
        )
    }
}

/// Summary ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SortArg {
    /// Cheapest first
    Price,
    /// Fastest delivery first
    LeadTime,
}

impl From<SortArg> for SortOrder {
    fn from(arg: SortArg) -> Self {
        match arg {
            SortArg::Price => SortOrder::Price,
            SortArg::LeadTime => SortOrder::LeadTime,
        }
    }
}

impl Cli {
    /// Client configuration from the global flags.
    pub fn config(&self) -> ClientConfig {
        let config = ClientConfig::default()
            .with_endpoint(&self.endpoint)
            .with_idle_timeout(Duration::from_secs(self.idle_timeout));
        match &self.history_file {
            Some(path) => config.with_history_path(path),
            None => config,
        }
    }
}
