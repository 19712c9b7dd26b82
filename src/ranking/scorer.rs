//! Scoring engine mapping aggregated account statistics to a score and grade.

use crate::ranking::grade::{GradeTier, tier_for_score};
use crate::stats::AccountStats;

const COMMIT_POINTS_CAP: f64 = 300.0;
const ISSUE_POINTS_CAP: f64 = 50.0;
const PR_POINTS_CAP: f64 = 50.0;
const AVG_COMMITS_POINTS_CAP: f64 = 50.0;
const STARS_PER_REPO_POINTS_CAP: f64 = 100.0;
const RATE_POINTS_CAP: f64 = 10.0;
const ACTIVITY_POINTS_CAP: f64 = 25.0;
const DAYS_PER_YEAR: f64 = 365.0;

/// Compute the score and grade for an account.
///
/// Pure with respect to its input: identical statistics always produce the
/// identical outcome, and every input maps to some tier.
#[must_use]
pub fn rank(stats: &AccountStats) -> (u64, &'static GradeTier) {
    let score = score(stats);
    (score, tier_for_score(score))
}

/// The weighted scoring formula.
///
/// Every term contributes non-negatively, so growing any single raw metric
/// never lowers the total.
#[must_use]
#[expect(clippy::cast_precision_loss, reason = "counters are far below 2^52")]
#[expect(clippy::cast_possible_truncation, reason = "scores are far below u64::MAX")]
#[expect(clippy::cast_sign_loss, reason = "all terms are non-negative")]
pub fn score(stats: &AccountStats) -> u64 {
    let mut score = 0.0;

    // Volume terms, the commit/issue/PR ones capped since they count
    // repository-wide activity rather than just the account's own.
    score += stats.repositories as f64;
    score += stats.stars as f64 * 0.5;
    score += (stats.commits as f64 * 0.1).min(COMMIT_POINTS_CAP);
    score += (stats.issues as f64 * 0.05).min(ISSUE_POINTS_CAP);
    score += (stats.pull_requests as f64 * 0.1).min(PR_POINTS_CAP);
    score += stats.followers as f64 * 0.3;
    score += stats.contributed_to as f64 * 2.0;
    score += stats.forked as f64 * 0.2;

    // Step bonuses for consistently-starred and highly-starred accounts.
    score += stars_per_repo_bonus(stats.stars_per_repo);
    score += total_stars_bonus(stats.stars);

    // Ratio terms.
    score += stats.average_commits_per_repo.min(AVG_COMMITS_POINTS_CAP);
    score += (stats.stars_per_repo * 2.0).min(STARS_PER_REPO_POINTS_CAP);
    score += (stats.issue_close_rate / 10.0).min(RATE_POINTS_CAP);
    score += (stats.pr_merge_rate / 10.0).min(RATE_POINTS_CAP);

    // Longevity bonus, 5 points per year of history.
    if stats.days_active > 0 {
        score += (stats.days_active as f64 / DAYS_PER_YEAR * 5.0).min(ACTIVITY_POINTS_CAP);
    }

    score.round() as u64
}

/// Bonus for a high average star count per repository. Only the highest
/// applicable step applies.
fn stars_per_repo_bonus(stars_per_repo: f64) -> f64 {
    if stars_per_repo >= 100.0 {
        200.0
    } else if stars_per_repo >= 50.0 {
        100.0
    } else if stars_per_repo >= 20.0 {
        50.0
    } else if stars_per_repo >= 10.0 {
        20.0
    } else {
        0.0
    }
}

/// Bonus for total accumulated stars. Only the highest applicable step applies.
fn total_stars_bonus(stars: u64) -> f64 {
    if stars >= 10_000 {
        2000.0
    } else if stars >= 5000 {
        1000.0
    } else if stars >= 1000 {
        500.0
    } else if stars >= 500 {
        200.0
    } else if stars >= 100 {
        50.0
    } else {
        0.0
    }
}
