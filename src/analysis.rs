use serde::Serialize;

use crate::identity::IdentitySet;

/// Relationship breakdown between a followers set and a following set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisResult {
    /// Followed by the subject but not following back.
    pub not_following_back: IdentitySet,
    /// Following the subject but not followed back.
    pub not_followed_by_me: IdentitySet,
    pub mutual: IdentitySet,
    pub total_followers: usize,
    pub total_following: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    NotFollowingBack,
    NotFollowedByMe,
    Mutual,
}

impl Category {
    pub const ALL: [Category; 3] = [
        Category::NotFollowingBack,
        Category::NotFollowedByMe,
        Category::Mutual,
    ];

    pub fn title(self) -> &'static str {
        match self {
            Category::NotFollowingBack => "Not following back",
            Category::NotFollowedByMe => "Not followed by me",
            Category::Mutual => "Mutual",
        }
    }
}

/// Ratios derived from an [`AnalysisResult`]. Rates are percentages.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Metrics {
    pub follow_ratio: f64,
    pub mutual_rate: f64,
    pub ghost_rate: f64,
    /// 0..=100 blend of the three ratios above.
    pub health_score: u32,
}

pub fn analyze(followers: &IdentitySet, following: &IdentitySet) -> AnalysisResult {
    AnalysisResult {
        not_following_back: following.difference(followers),
        not_followed_by_me: followers.difference(following),
        mutual: followers.intersection(following),
        total_followers: followers.len(),
        total_following: following.len(),
    }
}

fn ratio(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}

/// Ratio capped at 2 weighs 40 points, mutual rate 40, absence of ghosts 20.
fn health_score(follow_ratio: f64, mutual_rate: f64, ghost_rate: f64) -> u32 {
    let score = follow_ratio.min(2.0) * 20.0
        + mutual_rate * 0.4
        + (100.0 - ghost_rate).max(0.0) * 0.2;
    (score as u32).min(100)
}

impl AnalysisResult {
    pub fn members(&self, category: Category) -> &IdentitySet {
        match category {
            Category::NotFollowingBack => &self.not_following_back,
            Category::NotFollowedByMe => &self.not_followed_by_me,
            Category::Mutual => &self.mutual,
        }
    }

    pub fn metrics(&self) -> Metrics {
        let follow_ratio = ratio(self.total_followers, self.total_following);
        let mutual_rate = ratio(self.mutual.len(), self.total_followers) * 100.0;
        let ghost_rate = ratio(self.not_following_back.len(), self.total_following) * 100.0;

        Metrics {
            follow_ratio,
            mutual_rate,
            ghost_rate,
            health_score: health_score(follow_ratio, mutual_rate, ghost_rate),
        }
    }
}
