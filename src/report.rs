use anyhow::Result;
use serde::Serialize;

use crate::analysis::{Category, Metrics};
use crate::args::{OutputFormat, SortOrder};
use crate::identity::UserIdentity;
use crate::pipeline::Session;
use crate::utils::{format_number, format_timestamp, redact_handle};
use crate::Args;

/// One listed account, as shown in both text and JSON output.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportEntry {
    pub handle: String,
    pub timestamp: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
}

/// How a category listing is filtered, ordered and cut.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListOptions {
    pub sort: SortOrder,
    pub redact: bool,
    pub search: Option<String>,
    pub top: Option<usize>,
}

impl ListOptions {
    pub fn from_args(args: &Args) -> Self {
        Self {
            sort: args.sort,
            redact: args.redact,
            search: args.search.clone(),
            top: args.top,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct JsonReport {
    pub total_followers: usize,
    pub total_following: usize,
    pub metrics: Metrics,
    pub not_following_back: Vec<ReportEntry>,
    pub not_followed_by_me: Vec<ReportEntry>,
    pub mutual: Vec<ReportEntry>,
}

/// Accounts in `category` matching the search, ordered and optionally
/// redacted. `top` is not applied here.
///
/// Date order puts the newest first and accounts with an unknown date last.
pub fn category_entries(
    session: &Session,
    category: Category,
    options: &ListOptions,
) -> Vec<ReportEntry> {
    let needle = options.search.as_deref().map(str::to_lowercase);

    let mut users: Vec<(Option<i64>, &UserIdentity)> = session
        .result
        .members(category)
        .sorted()
        .into_iter()
        .filter(|user| match &needle {
            Some(needle) => user.key().contains(needle.as_str()),
            None => true,
        })
        .map(|user| (session.timestamp(category, user.key()), user))
        .collect();

    if options.sort == SortOrder::Date {
        // Stable sort keeps name order among equal dates.
        users.sort_by(|a, b| b.0.cmp(&a.0));
    }

    let redact = options.redact;
    users
        .into_iter()
        .map(|(timestamp, user)| ReportEntry {
            handle: if redact {
                redact_handle(user.handle())
            } else {
                user.handle().to_string()
            },
            timestamp,
            profile_url: (!redact).then(|| user.profile_url()),
            avatar_url: (!redact).then(|| user.avatar_url()),
        })
        .collect()
}

/// JSON lists follow the same search, order and `top` cut as the text report.
pub fn build_json_report(session: &Session, options: &ListOptions) -> JsonReport {
    let result = &session.result;
    let entries = |category: Category| {
        let mut entries = category_entries(session, category, options);
        if let Some(top) = options.top {
            entries.truncate(top);
        }
        entries
    };

    JsonReport {
        total_followers: result.total_followers,
        total_following: result.total_following,
        metrics: result.metrics(),
        not_following_back: entries(Category::NotFollowingBack),
        not_followed_by_me: entries(Category::NotFollowedByMe),
        mutual: entries(Category::Mutual),
    }
}

fn selected_categories(args: &Args) -> Vec<Category> {
    match args.show {
        Some(category) => vec![category.into()],
        None => Category::ALL.to_vec(),
    }
}

pub fn print_analysis_results(session: &Session, args: &Args) -> Result<()> {
    let options = ListOptions::from_args(args);
    match args.format {
        OutputFormat::Text => {
            print_text_report(session, args, &options);
            Ok(())
        }
        OutputFormat::Json => {
            let report = build_json_report(session, &options);
            println!("{}", serde_json::to_string_pretty(&report)?);
            Ok(())
        }
    }
}

fn print_text_report(session: &Session, args: &Args, options: &ListOptions) {
    let result = &session.result;
    let metrics = result.metrics();

    println!("\n--- Followers Analysis ---");
    println!("Followers: {}", format_number(result.total_followers));
    println!("Following: {}", format_number(result.total_following));
    for category in Category::ALL {
        println!(
            "{}: {}",
            category.title(),
            format_number(result.members(category).len())
        );
    }

    println!(
        "\nFollow ratio: {:.2} ({})",
        metrics.follow_ratio,
        if metrics.follow_ratio >= 1.0 {
            "healthy"
        } else {
            "low"
        }
    );
    println!("Mutual rate: {:.1}%", metrics.mutual_rate);
    println!("Ghost rate: {:.1}%", metrics.ghost_rate);
    println!("Health score: {}/100", metrics.health_score);

    for category in selected_categories(args) {
        let entries = category_entries(session, category, options);
        let shown = options.top.unwrap_or(entries.len()).min(entries.len());

        println!("\n{} ({} of {}):", category.title(), shown, entries.len());
        if entries.is_empty() {
            println!("- none");
            continue;
        }

        for entry in entries.iter().take(shown) {
            let date = format_timestamp(entry.timestamp);
            match &entry.profile_url {
                Some(url) => println!("- {} [{}] {}", entry.handle, date, url),
                None => println!("- {} [{}]", entry.handle, date),
            }
        }
    }
}
