pub mod analysis;
pub mod args;
pub mod identity;
pub mod loader;
pub mod parser;
pub mod pipeline;
pub mod report;
pub mod table;
pub mod utils;
pub mod xlsx;

pub use analysis::{analyze, AnalysisResult, Category, Metrics};
pub use args::Args;
pub use identity::{IdentitySet, TimestampMap, UserIdentity};
pub use parser::{
    parse_followers, parse_followers_with_timestamps, parse_following,
    parse_following_with_timestamps, ParseOutcome,
};
pub use pipeline::{run_analysis, Session};
