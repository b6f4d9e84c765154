use anyhow::{Context, Result};
use rayon::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::info;
use walkdir::WalkDir;

pub const FOLLOWING_FILE_NAME: &str = "following.json";

const FOLLOWERS_FILE_PREFIX: &str = "followers_";
const JSON_EXTENSION: &str = ".json";

/// Export files located inside an unpacked export archive.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ExportFiles {
    pub followers: Vec<PathBuf>,
    pub following: Option<PathBuf>,
}

fn is_followers_file(name: &str) -> bool {
    name.starts_with(FOLLOWERS_FILE_PREFIX) && name.ends_with(JSON_EXTENSION)
}

/// Page number of `followers_<n>.json`, if the suffix is numeric.
fn page_number(path: &Path) -> Option<u64> {
    path.file_name()?
        .to_str()?
        .strip_prefix(FOLLOWERS_FILE_PREFIX)?
        .strip_suffix(JSON_EXTENSION)?
        .parse()
        .ok()
}

/// Recursively finds `followers_*.json` and `following.json` under `dir`.
///
/// Symlinks are not followed. Followers files come back in page order
/// (`followers_2` before `followers_10`), unnumbered files last by path.
pub fn discover_export_files(dir: &Path) -> Result<ExportFiles> {
    if !dir.is_dir() {
        anyhow::bail!("Export directory not found: {:?}", dir);
    }

    let mut found = ExportFiles::default();
    for entry in WalkDir::new(dir).sort_by_file_name() {
        let entry = entry.with_context(|| format!("Failed to walk directory {:?}", dir))?;
        if !entry.file_type().is_file() {
            continue;
        }

        let Some(name) = entry.file_name().to_str() else {
            continue;
        };

        if is_followers_file(name) {
            found.followers.push(entry.path().to_path_buf());
        } else if name == FOLLOWING_FILE_NAME && found.following.is_none() {
            found.following = Some(entry.path().to_path_buf());
        }
    }

    found
        .followers
        .sort_by(|a, b| match (page_number(a), page_number(b)) {
            (Some(x), Some(y)) => x.cmp(&y).then_with(|| a.cmp(b)),
            (Some(_), None) => std::cmp::Ordering::Less,
            (None, Some(_)) => std::cmp::Ordering::Greater,
            (None, None) => a.cmp(b),
        });

    info!(
        action = "discover",
        component = "export_files",
        directory = ?dir,
        followers_files = found.followers.len(),
        following_file = ?found.following,
        "Export files discovered"
    );
    Ok(found)
}

/// Reads every path in parallel, keeping the input order in the output.
pub fn read_buffers(paths: &[PathBuf], max_workers: Option<usize>) -> Result<Vec<Vec<u8>>> {
    let start_time = Instant::now();
    let max_workers = max_workers.unwrap_or_else(|| std::cmp::min(num_cpus::get(), 8));

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(max_workers)
        .build()
        .context("Failed to build reader thread pool")?;

    let buffers = pool.install(|| {
        paths
            .par_iter()
            .map(|path| fs::read(path).with_context(|| format!("Failed to read {:?}", path)))
            .collect::<Result<Vec<Vec<u8>>>>()
    })?;

    info!(
        action = "complete",
        component = "file_loading",
        file_count = buffers.len(),
        worker_count = max_workers,
        total_bytes = buffers.iter().map(Vec::len).sum::<usize>(),
        duration_ms = start_time.elapsed().as_millis(),
        "Export files loaded"
    );
    Ok(buffers)
}
