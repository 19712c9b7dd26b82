use crate::facts::hosting::Provider;
use crate::ranking;
use crate::stats::AccountStats;
use chrono::{DateTime, Utc};
use core::time::Duration;
use tokio::time::sleep;

const LOG_TARGET: &str = "aggregator";

/// Courtesy pause between the metric fetches of one repository.
const METRIC_DELAY: Duration = Duration::from_millis(100);

/// Invoked after each processed repository with (processed, total).
pub type ProgressObserver<'a> = &'a (dyn Fn(usize, usize) + Send + Sync);

/// Drives one full statistics pass for an account.
///
/// The aggregator is the sole owner of the `AccountStats` it builds.
/// Repositories and their metrics are fetched strictly sequentially to stay
/// inside a shared rate-limit budget; the scoring formula only ever sums, so
/// ordering carries no semantic weight.
#[derive(Debug, Clone, Copy)]
pub struct Aggregator<'a> {
    provider: &'a Provider,
    now: DateTime<Utc>,
}

impl<'a> Aggregator<'a> {
    /// Create an aggregator. `now` anchors the days-active computation.
    #[must_use]
    pub const fn new(provider: &'a Provider, now: DateTime<Utc>) -> Self {
        Self { provider, now }
    }

    /// Build the finalized, scored statistics for `login`.
    ///
    /// Always terminates with a defined result; a run over unreachable data
    /// degrades to all-zero counters and the lowest grade rather than failing.
    pub async fn collect(&self, login: &str, include_orgs: bool, observer: ProgressObserver<'_>) -> AccountStats {
        let mut stats = AccountStats::default();

        log::info!(target: LOG_TARGET, "Gathering statistics for '{login}'");

        let profile = self.provider.fetch_profile(login).await;
        stats.followers = profile.followers;
        stats.following = profile.following;

        let repos = self.provider.repositories(login, include_orgs).await;
        stats.repositories = repos.len() as u64;

        if repos.is_empty() {
            log::warn!(target: LOG_TARGET, "No repositories found for '{login}'; scoring account-level data only");
        }

        let total = repos.len();
        for (index, repo) in repos.iter().enumerate() {
            let owner = repo.owner.login.as_str();
            let name = repo.name.as_str();

            let commits = self.provider.commit_count(login, owner, name).await;
            sleep(METRIC_DELAY).await;
            let issues = self.provider.issue_count(owner, name).await;
            sleep(METRIC_DELAY).await;
            let closed_issues = self.provider.closed_issue_count(owner, name).await;
            sleep(METRIC_DELAY).await;
            let prs = self.provider.pr_count(owner, name).await;
            sleep(METRIC_DELAY).await;
            let merged_prs = self.provider.merged_pr_count(owner, name).await;

            stats.stars += repo.stargazers_count;
            stats.forked += repo.forks_count;
            stats.watched_by += repo.watchers_count;

            if let Some(created_at) = repo.created_at {
                stats.track_oldest(created_at);
            }

            if let Some(language) = &repo.language {
                stats.record_language(language);
            }

            stats.commits += commits;
            stats.issues += issues;
            stats.pull_requests += prs;

            // Degraded fetches must not push a subset past its total.
            stats.closed_issues += closed_issues.min(issues);
            stats.merged_prs += merged_prs.min(prs);

            log::debug!(
                target: LOG_TARGET,
                "Repository '{}': stars={}, commits={commits}, issues={closed_issues}/{issues}, prs={merged_prs}/{prs}",
                repo.full_name(),
                repo.stargazers_count
            );

            observer(index + 1, total);
        }

        match profile.contribution_totals {
            Some(totals) => {
                stats.contributed_to = totals.contributed_to;
                stats.contributions = totals.contributions;
            }
            None => {
                // The contribution query failed outright; estimate from the
                // totals this pass just produced.
                stats.contributed_to = estimate_contributed_to(stats.repositories);
                stats.contributions = estimate_contributions(stats.commits);
                log::debug!(
                    target: LOG_TARGET,
                    "Estimated contribution totals for '{login}': contributed_to={}, contributions={}",
                    stats.contributed_to,
                    stats.contributions
                );
            }
        }

        stats.finalize_derived(self.now);

        let (score, tier) = ranking::rank(&stats);
        stats.score = score;
        stats.grade = tier.label;

        log::info!(target: LOG_TARGET, "Scored '{login}': {score} points, grade {}", stats.grade);

        stats
    }
}

/// Rough estimate: an account contributes to about 70% as many repositories
/// as it owns.
const fn estimate_contributed_to(repositories: u64) -> u64 {
    (repositories * 7 + 5) / 10
}

/// Rough estimate: lifetime contributions run about 20% past commit totals.
const fn estimate_contributions(commits: u64) -> u64 {
    (commits * 12 + 5) / 10
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contributed_to_estimate_rounds_to_nearest() {
        assert_eq!(estimate_contributed_to(0), 0);
        assert_eq!(estimate_contributed_to(10), 7);
        assert_eq!(estimate_contributed_to(15), 11);
        assert_eq!(estimate_contributed_to(3), 2);
    }

    #[test]
    fn contributions_estimate_rounds_to_nearest() {
        assert_eq!(estimate_contributions(0), 0);
        assert_eq!(estimate_contributions(10), 12);
        assert_eq!(estimate_contributions(25), 30);
        assert_eq!(estimate_contributions(3), 4);
    }
}
