use clap::{Parser, ValueEnum};
use std::path::PathBuf;

use crate::analysis::Category;

/// Command-line names for [`Category`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum CategoryArg {
    /// Accounts you follow that do not follow you back
    NotFollowingBack,
    /// Accounts following you that you do not follow back
    NotFollowedByMe,
    Mutual,
}

impl From<CategoryArg> for Category {
    fn from(arg: CategoryArg) -> Self {
        match arg {
            CategoryArg::NotFollowingBack => Category::NotFollowingBack,
            CategoryArg::NotFollowedByMe => Category::NotFollowedByMe,
            CategoryArg::Mutual => Category::Mutual,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum SortOrder {
    /// Alphabetical, ignoring case
    #[default]
    Name,
    /// Most recent follow date first
    Date,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Parser, Debug)]
#[command(
    name = "followee",
    about = "Compare followers and following exports to find who does not follow back",
    version,
    long_about = None
)]
pub struct Args {
    /// Unpacked export directory to search for followers_*.json and following.json
    #[arg(short, long)]
    pub export_dir: Option<PathBuf>,

    /// Followers export files (overrides discovery)
    #[arg(long, num_args = 1..)]
    pub followers: Vec<PathBuf>,

    /// Following export file (overrides discovery)
    #[arg(long)]
    pub following: Option<PathBuf>,

    /// Write the analysis to an .xlsx workbook
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Only list this category
    #[arg(short, long, value_enum)]
    pub show: Option<CategoryArg>,

    /// Only list handles containing this text (case-insensitive)
    #[arg(long)]
    pub search: Option<String>,

    /// Number of accounts to list per category
    #[arg(short, long)]
    pub top: Option<usize>,

    /// Ordering of listed accounts
    #[arg(long, value_enum, default_value_t = SortOrder::Name)]
    pub sort: SortOrder,

    /// Report format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Number of worker threads for reading files
    #[arg(short, long)]
    pub workers: Option<usize>,

    /// Redact account handles for privacy
    #[arg(long)]
    pub redact: bool,
}
