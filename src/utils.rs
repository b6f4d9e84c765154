use chrono::DateTime;
use time::macros::format_description;
use tracing_subscriber::fmt::time::LocalTime;
use tracing_subscriber::EnvFilter;

pub const UNKNOWN_DATE: &str = "-";

/// Installs the stderr subscriber. `RUST_LOG` wins over `--verbose`.
pub fn setup_logging(verbose: bool) {
    let default_level = if verbose { "info" } else { "error" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let timer = LocalTime::new(format_description!(
        "[hour]:[minute]:[second].[subsecond digits:3]"
    ));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_timer(timer)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

pub fn format_number(num: usize) -> String {
    let digits = num.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Keeps the first character of a handle and masks the rest.
pub fn redact_handle(handle: &str) -> String {
    let mut chars = handle.chars();
    match chars.next() {
        Some(first) => {
            let mut redacted = first.to_string();
            redacted.push_str(&"*".repeat(chars.count()));
            redacted
        }
        None => String::new(),
    }
}

/// Renders epoch seconds as a UTC calendar date.
pub fn format_timestamp(ts: Option<i64>) -> String {
    ts.and_then(|ts| DateTime::from_timestamp(ts, 0))
        .map(|date| date.format("%B %-d, %Y").to_string())
        .unwrap_or_else(|| UNKNOWN_DATE.to_string())
}

pub fn validate_args(args: &crate::args::Args) -> anyhow::Result<()> {
    if let Some(top) = args.top {
        if top == 0 {
            anyhow::bail!("--top must be greater than 0");
        }
    }

    if let Some(workers) = args.workers {
        if workers == 0 {
            anyhow::bail!("--workers must be greater than 0");
        }
    }

    if args.export_dir.is_none() && (args.followers.is_empty() || args.following.is_none()) {
        anyhow::bail!("Provide --export-dir, or both --followers and --following");
    }

    Ok(())
}
