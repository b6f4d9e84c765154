use anyhow::{Context, Result};
use std::path::PathBuf;
use std::time::Instant;
use tracing::{info, warn};

use crate::analysis::{analyze, AnalysisResult, Category};
use crate::parser::{
    parse_followers_with_timestamps, parse_following_with_timestamps, ParseOutcome,
};
use crate::{loader, table, xlsx, Args};

/// Everything one run produced: both parsed exports and their analysis.
#[derive(Debug, Clone)]
pub struct Session {
    pub followers: ParseOutcome,
    pub following: ParseOutcome,
    pub result: AnalysisResult,
}

impl Session {
    pub fn from_buffers<B: AsRef<[u8]>>(followers: &[B], following: &[u8]) -> Self {
        let followers = parse_followers_with_timestamps(followers);
        let following = parse_following_with_timestamps(following);
        let result = analyze(&followers.identities, &following.identities);

        Self {
            followers,
            following,
            result,
        }
    }

    /// The date that matters for a category: when the subject followed them,
    /// when they followed the subject, or the later of both for mutuals.
    pub fn timestamp(&self, category: Category, key: &str) -> Option<i64> {
        let followed_at = || self.following.timestamps.get(key).copied();
        let follower_since = || self.followers.timestamps.get(key).copied();

        match category {
            Category::NotFollowingBack => followed_at(),
            Category::NotFollowedByMe => follower_since(),
            Category::Mutual => followed_at().max(follower_since()),
        }
    }
}

/// Input files after merging discovery with explicit flags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputFiles {
    pub followers: Vec<PathBuf>,
    pub following: PathBuf,
}

pub fn resolve_input_files(args: &Args) -> Result<InputFiles> {
    let discovered = match &args.export_dir {
        Some(dir) => loader::discover_export_files(dir)?,
        None => loader::ExportFiles::default(),
    };

    let followers = if args.followers.is_empty() {
        discovered.followers
    } else {
        args.followers.clone()
    };

    let Some(following) = args.following.clone().or(discovered.following) else {
        anyhow::bail!(
            "No following export found; pass --following or a directory containing {}",
            loader::FOLLOWING_FILE_NAME
        );
    };

    if followers.is_empty() {
        anyhow::bail!(
            "No followers export found; pass --followers or a directory containing followers_*.json"
        );
    }

    Ok(InputFiles {
        followers,
        following,
    })
}

pub fn run_analysis(args: &Args) -> Result<Session> {
    let total_start_time = Instant::now();
    info!(
        action = "start",
        component = "analysis",
        "Starting followers analysis"
    );

    let InputFiles {
        followers,
        following,
    } = resolve_input_files(args)?;

    let mut paths = followers;
    paths.push(following);
    let mut buffers = loader::read_buffers(&paths, args.workers)?;
    let following_buffer = buffers
        .pop()
        .context("Following export was not loaded")?;

    let session = Session::from_buffers(buffers.as_slice(), &following_buffer);

    let skipped = session.followers.buffers_skipped + session.following.buffers_skipped;
    if skipped > 0 {
        warn!(
            action = "skip",
            component = "analysis",
            skipped_files = skipped,
            "Some export files were ignored; make sure the export was requested in JSON format"
        );
    }

    if let Some(out_path) = &args.output {
        let sheets = table::build_sheets(&session.result);
        xlsx::write_workbook(out_path, &sheets)
            .with_context(|| format!("Failed to write workbook {:?}", out_path))?;
    }

    info!(
        action = "complete",
        component = "analysis",
        total_followers = session.result.total_followers,
        total_following = session.result.total_following,
        mutual = session.result.mutual.len(),
        duration_ms = total_start_time.elapsed().as_millis(),
        "Analysis completed successfully"
    );

    Ok(session)
}
