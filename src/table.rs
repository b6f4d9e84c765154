//! Row-oriented view of an [`AnalysisResult`], ready for a spreadsheet writer.
//!
//! The layout is a stable contract: one summary sheet with five metric rows,
//! followed by one sheet per category with `Username` / `Profile` columns.

use crate::analysis::{AnalysisResult, Category};

pub const SUMMARY_SHEET_NAME: &str = "Summary";
pub const MAX_SHEET_NAME_LEN: usize = 31;

pub const HEADERS_SUMMARY: [&str; 2] = ["Metric", "Value"];
pub const HEADERS_USERS: [&str; 2] = ["Username", "Profile"];

#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Text(String),
    Number(f64),
    Link(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Sheet {
    pub name: String,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

impl Sheet {
    fn new(name: &str, headers: &[&str]) -> Self {
        Self {
            name: sheet_name(name),
            headers: headers.iter().map(|h| (*h).to_string()).collect(),
            rows: Vec::new(),
        }
    }
}

/// Truncates to the 31 character limit spreadsheet formats impose on titles.
pub fn sheet_name(name: &str) -> String {
    name.chars().take(MAX_SHEET_NAME_LEN).collect()
}

fn summary_sheet(result: &AnalysisResult) -> Sheet {
    let mut sheet = Sheet::new(SUMMARY_SHEET_NAME, &HEADERS_SUMMARY);
    let metrics = [
        ("Total followers", result.total_followers),
        ("Total following", result.total_following),
        (
            Category::NotFollowingBack.title(),
            result.not_following_back.len(),
        ),
        (
            Category::NotFollowedByMe.title(),
            result.not_followed_by_me.len(),
        ),
        (Category::Mutual.title(), result.mutual.len()),
    ];

    sheet.rows = metrics
        .into_iter()
        .map(|(label, value)| vec![Cell::Text(label.to_string()), Cell::Number(value as f64)])
        .collect();
    sheet
}

fn category_sheet(result: &AnalysisResult, category: Category) -> Sheet {
    let mut sheet = Sheet::new(category.title(), &HEADERS_USERS);
    sheet.rows = result
        .members(category)
        .sorted()
        .into_iter()
        .map(|user| {
            vec![
                Cell::Text(user.handle().to_string()),
                Cell::Link(user.profile_url()),
            ]
        })
        .collect();
    sheet
}

pub fn build_sheets(result: &AnalysisResult) -> Vec<Sheet> {
    let mut sheets = vec![summary_sheet(result)];
    sheets.extend(
        Category::ALL
            .into_iter()
            .map(|category| category_sheet(result, category)),
    );
    sheets
}
