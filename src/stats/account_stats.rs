use crate::ranking::LOWEST_GRADE;
use chrono::{DateTime, Utc};

const SECONDS_PER_DAY: u64 = 86_400;

/// Aggregate statistics for one account, built by a single aggregation pass
/// and finalized by the scoring engine.
#[derive(Debug, Clone)]
pub struct AccountStats {
    /// Number of enumerated repositories.
    pub repositories: u64,

    // Sums across all enumerated repositories.
    pub stars: u64,
    pub forked: u64,
    pub watched_by: u64,
    pub commits: u64,
    pub issues: u64,
    pub pull_requests: u64,

    /// Closed subset of `issues`, tracked for the close rate.
    pub closed_issues: u64,

    /// Merged subset of `pull_requests`, tracked for the merge rate.
    pub merged_prs: u64,

    // Account-level numbers, independent of repository enumeration.
    pub followers: u64,
    pub following: u64,
    pub contributed_to: u64,
    pub contributions: u64,

    /// Occurrence count per primary language, in first-encountered order.
    pub languages: Vec<(String, u64)>,

    /// Creation time of the oldest enumerated repository.
    pub oldest_repo: Option<DateTime<Utc>>,

    /// Whole days since `oldest_repo`, rounded up. Zero without repositories.
    pub days_active: u64,

    // Derived ratios, all zero when their denominator is zero.
    pub average_commits_per_repo: f64,
    pub stars_per_repo: f64,
    pub issue_close_rate: f64,
    pub pr_merge_rate: f64,

    pub score: u64,
    pub grade: &'static str,
}

impl Default for AccountStats {
    fn default() -> Self {
        Self {
            repositories: 0,
            stars: 0,
            forked: 0,
            watched_by: 0,
            commits: 0,
            issues: 0,
            pull_requests: 0,
            closed_issues: 0,
            merged_prs: 0,
            followers: 0,
            following: 0,
            contributed_to: 0,
            contributions: 0,
            languages: Vec::new(),
            oldest_repo: None,
            days_active: 0,
            average_commits_per_repo: 0.0,
            stars_per_repo: 0.0,
            issue_close_rate: 0.0,
            pr_merge_rate: 0.0,
            score: 0,
            grade: LOWEST_GRADE,
        }
    }
}

impl AccountStats {
    /// Record one repository whose primary language is `name`.
    pub fn record_language(&mut self, name: &str) {
        if let Some(entry) = self.languages.iter_mut().find(|(lang, _)| lang == name) {
            entry.1 += 1;
        } else {
            self.languages.push((name.to_owned(), 1));
        }
    }

    /// The most frequent primary language. Ties resolve to the language
    /// encountered first.
    #[must_use]
    pub fn top_language(&self) -> Option<&str> {
        let mut best: Option<(&str, u64)> = None;
        for (lang, count) in &self.languages {
            if best.is_none_or(|(_, best_count)| *count > best_count) {
                best = Some((lang, *count));
            }
        }
        best.map(|(lang, _)| lang)
    }

    /// Track the minimum repository creation time seen so far.
    pub fn track_oldest(&mut self, created_at: DateTime<Utc>) {
        if self.oldest_repo.is_none_or(|oldest| created_at < oldest) {
            self.oldest_repo = Some(created_at);
        }
    }

    /// Compute the derived metrics from the accumulated totals.
    #[expect(clippy::cast_precision_loss, reason = "counters are far below 2^52")]
    pub fn finalize_derived(&mut self, now: DateTime<Utc>) {
        self.days_active = self
            .oldest_repo
            .map_or(0, |oldest| (now - oldest).num_seconds().unsigned_abs().div_ceil(SECONDS_PER_DAY));

        if self.repositories > 0 {
            self.average_commits_per_repo = self.commits as f64 / self.repositories as f64;
            self.stars_per_repo = self.stars as f64 / self.repositories as f64;
        } else {
            self.average_commits_per_repo = 0.0;
            self.stars_per_repo = 0.0;
        }

        self.issue_close_rate = if self.issues > 0 {
            self.closed_issues as f64 / self.issues as f64 * 100.0
        } else {
            0.0
        };

        self.pr_merge_rate = if self.pull_requests > 0 {
            self.merged_prs as f64 / self.pull_requests as f64 * 100.0
        } else {
            0.0
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn default_is_all_zero_with_lowest_grade() {
        let stats = AccountStats::default();
        assert_eq!(stats.repositories, 0);
        assert_eq!(stats.score, 0);
        assert_eq!(stats.grade, "D-");
        assert!(stats.oldest_repo.is_none());
        assert!(stats.top_language().is_none());
    }

    #[test]
    fn derived_metrics_are_zero_without_repositories() {
        let mut stats = AccountStats::default();
        stats.finalize_derived(Utc::now());

        assert_eq!(stats.days_active, 0);
        assert_eq!(stats.average_commits_per_repo, 0.0);
        assert_eq!(stats.stars_per_repo, 0.0);
        assert_eq!(stats.issue_close_rate, 0.0);
        assert_eq!(stats.pr_merge_rate, 0.0);
    }

    #[test]
    fn derived_metrics_from_totals() {
        let mut stats = AccountStats::default();
        stats.repositories = 4;
        stats.commits = 10;
        stats.stars = 6;
        stats.issues = 8;
        stats.closed_issues = 6;
        stats.pull_requests = 5;
        stats.merged_prs = 4;
        stats.finalize_derived(Utc::now());

        assert_eq!(stats.average_commits_per_repo, 2.5);
        assert_eq!(stats.stars_per_repo, 1.5);
        assert_eq!(stats.issue_close_rate, 75.0);
        assert_eq!(stats.pr_merge_rate, 80.0);
    }

    #[test]
    fn days_active_rounds_up() {
        let now = Utc.with_ymd_and_hms(2024, 3, 10, 12, 0, 0).single().expect("valid time");

        let mut stats = AccountStats::default();
        stats.track_oldest(Utc.with_ymd_and_hms(2024, 3, 9, 12, 0, 0).single().expect("valid time"));
        stats.finalize_derived(now);
        assert_eq!(stats.days_active, 1);

        let mut stats = AccountStats::default();
        stats.track_oldest(Utc.with_ymd_and_hms(2024, 3, 9, 11, 0, 0).single().expect("valid time"));
        stats.finalize_derived(now);
        assert_eq!(stats.days_active, 2);
    }

    #[test]
    fn oldest_repo_keeps_the_minimum() {
        let older = Utc.with_ymd_and_hms(2015, 1, 1, 0, 0, 0).single().expect("valid time");
        let newer = Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).single().expect("valid time");

        let mut stats = AccountStats::default();
        stats.track_oldest(newer);
        stats.track_oldest(older);
        stats.track_oldest(newer);

        assert_eq!(stats.oldest_repo, Some(older));
    }

    #[test]
    fn top_language_ties_break_on_first_encountered() {
        let mut stats = AccountStats::default();
        stats.record_language("Rust");
        stats.record_language("Go");
        stats.record_language("Go");
        stats.record_language("Rust");

        assert_eq!(stats.top_language(), Some("Rust"));

        stats.record_language("Go");
        assert_eq!(stats.top_language(), Some("Go"));
    }
}
