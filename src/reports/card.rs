use crate::ranking::color_for_grade;
use crate::stats::AccountStats;
use chrono::{DateTime, Utc};

/// Start of the replaceable region inside a README.
pub const BEGIN_MARKER: &str = "<!-- BEGIN_GITHUB_STATS -->";

/// End of the replaceable region inside a README.
pub const END_MARKER: &str = "<!-- END_GITHUB_STATS -->";

const BADGE_BASE: &str = "https://img.shields.io/badge";
const DAYS_PER_YEAR: f64 = 365.0;

// Badge colors for the fixed (non-grade) cells.
const ACCOUNT_COLOR: &str = "2D9EF1";
const REPO_COLOR: &str = "26A641";
const STARS_COLOR: &str = "FFD94C";
const COMMITS_COLOR: &str = "2188FF";
const ISSUES_COLOR: &str = "F74D53";
const PRS_COLOR: &str = "A371F7";

/// Render the stats card fragment for a scored account.
///
/// The fragment is self-delimited by [`BEGIN_MARKER`] and [`END_MARKER`] so it
/// can be spliced into an existing document with a plain find-and-replace.
#[must_use]
pub fn generate(stats: &AccountStats, login: &str, title: &str, now: DateTime<Utc>) -> String {
    let grade_color = color_for_grade(stats.grade);
    let date = now.format("%Y-%m-%d");

    let years_active = if stats.days_active > 0 {
        format!("{:.1}", days_to_years(stats.days_active))
    } else {
        "0".to_owned()
    };

    let top_language = stats.top_language().unwrap_or("None");

    let grade_badge = badge("Grade", stats.grade, grade_color, "github", "white");
    let score_badge = badge("Score", &stats.score.to_string(), grade_color, "github", "white");

    let user_badge = badge("User", login, ACCOUNT_COLOR, "github", "white");
    let followers_badge = badge("Followers", &stats.followers.to_string(), ACCOUNT_COLOR, "github", "white");
    let years_badge = badge("Years_Active", &years_active, ACCOUNT_COLOR, "github", "white");
    let contributed_badge = badge("Contributed_To", &stats.contributed_to.to_string(), ACCOUNT_COLOR, "github", "white");

    let repos_badge = badge("Repositories", &stats.repositories.to_string(), REPO_COLOR, "github", "white");
    let stars_badge = badge("Stars", &stats.stars.to_string(), STARS_COLOR, "github", "black");
    let forked_badge = badge("Forked", &stats.forked.to_string(), REPO_COLOR, "github", "white");
    let watched_badge = badge("Watched", &stats.watched_by.to_string(), REPO_COLOR, "github", "white");

    let commits_badge = badge("Commits", &stats.commits.to_string(), COMMITS_COLOR, "git", "white");
    let issues_badge = badge("Issues", &stats.issues.to_string(), ISSUES_COLOR, "github", "white");
    let prs_badge = badge("Pull_Requests", &stats.pull_requests.to_string(), PRS_COLOR, "github", "white");
    let language_badge = badge("Top_Language", top_language, COMMITS_COLOR, "github", "white");

    let commits_per_repo_badge = badge(
        "Commits_Per_Repo",
        &round_to_string(stats.average_commits_per_repo),
        COMMITS_COLOR,
        "git",
        "white",
    );
    let stars_per_repo_badge = badge("Stars_Per_Repo", &format!("{:.1}", stats.stars_per_repo), STARS_COLOR, "github", "black");
    let close_rate_badge = badge(
        "Issue_Close_Rate",
        &format!("{}%25", round_to_string(stats.issue_close_rate)),
        ISSUES_COLOR,
        "github",
        "white",
    );
    let merge_rate_badge = badge(
        "PR_Merge_Rate",
        &format!("{}%25", round_to_string(stats.pr_merge_rate)),
        PRS_COLOR,
        "github",
        "white",
    );

    format!(
        "{BEGIN_MARKER}
<div align=\"center\">

## {title}

<table>
  <tr>
    <td align=\"center\" colspan=\"4\">
      {grade_badge}
      {score_badge}
    </td>
  </tr>
  <tr>
    <td align=\"center\">{user_badge}</td>
    <td align=\"center\">{followers_badge}</td>
    <td align=\"center\">{years_badge}</td>
    <td align=\"center\">{contributed_badge}</td>
  </tr>
  <tr>
    <td align=\"center\">{repos_badge}</td>
    <td align=\"center\">{stars_badge}</td>
    <td align=\"center\">{forked_badge}</td>
    <td align=\"center\">{watched_badge}</td>
  </tr>
  <tr>
    <td align=\"center\">{commits_badge}</td>
    <td align=\"center\">{issues_badge}</td>
    <td align=\"center\">{prs_badge}</td>
    <td align=\"center\">{language_badge}</td>
  </tr>
  <tr>
    <td align=\"center\">{commits_per_repo_badge}</td>
    <td align=\"center\">{stars_per_repo_badge}</td>
    <td align=\"center\">{close_rate_badge}</td>
    <td align=\"center\">{merge_rate_badge}</td>
  </tr>
</table>

<sup>📅 Updated: {date}</sup>

</div>
{END_MARKER}"
    )
}

/// One shields.io badge cell.
fn badge(label: &str, value: &str, color: &str, logo: &str, logo_color: &str) -> String {
    let alt = label.replace('_', " ");
    let value = badge_text(value);
    format!("<img alt=\"{alt}\" src=\"{BADGE_BASE}/{label}-{value}-{color}?style=for-the-badge&logo={logo}&logoColor={logo_color}\" />")
}

/// Make a value safe inside a shields.io path segment.
fn badge_text(value: &str) -> String {
    value.replace('-', "--").replace(' ', "_")
}

#[expect(clippy::cast_precision_loss, reason = "day counts are far below 2^52")]
fn days_to_years(days: u64) -> f64 {
    days as f64 / DAYS_PER_YEAR
}

#[expect(clippy::cast_possible_truncation, reason = "percentages and averages are small")]
#[expect(clippy::cast_sign_loss, reason = "inputs are non-negative")]
fn round_to_string(value: f64) -> String {
    (value.round() as u64).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 20, 8, 30, 0).single().expect("valid time")
    }

    #[test]
    fn card_is_marker_delimited() {
        let stats = AccountStats::default();
        let card = generate(&stats, "octocat", "GitHub Statistics", sample_now());

        assert!(card.starts_with(BEGIN_MARKER));
        assert!(card.ends_with(END_MARKER));
    }

    #[test]
    fn card_carries_grade_score_and_date() {
        let mut stats = AccountStats::default();
        stats.score = 842;
        stats.grade = "S";

        let card = generate(&stats, "octocat", "GitHub Statistics", sample_now());

        assert!(card.contains("/Grade-S-FB2?"));
        assert!(card.contains("/Score-842-FB2?"));
        assert!(card.contains("Updated: 2024-05-20"));
        assert!(card.contains("## GitHub Statistics"));
        assert!(card.contains("/User-octocat-"));
    }

    #[test]
    fn rates_are_rounded_percentages() {
        let mut stats = AccountStats::default();
        stats.issue_close_rate = 66.6;
        stats.pr_merge_rate = 33.3;

        let card = generate(&stats, "octocat", "Stats", sample_now());

        assert!(card.contains("/Issue_Close_Rate-67%25-"));
        assert!(card.contains("/PR_Merge_Rate-33%25-"));
    }

    #[test]
    fn empty_account_renders_placeholders() {
        let stats = AccountStats::default();
        let card = generate(&stats, "octocat", "Stats", sample_now());

        assert!(card.contains("/Top_Language-None-"));
        assert!(card.contains("/Years_Active-0-"));
        assert!(card.contains("/Grade-D---933?"));
    }

    #[test]
    fn years_active_has_one_decimal() {
        let mut stats = AccountStats::default();
        stats.days_active = 730;

        let card = generate(&stats, "octocat", "Stats", sample_now());
        assert!(card.contains("/Years_Active-2.0-"));
    }

    #[test]
    fn badge_text_escapes_hyphens_and_spaces() {
        assert_eq!(badge_text("Jupyter Notebook"), "Jupyter_Notebook");
        assert_eq!(badge_text("D-"), "D--");
        assert_eq!(badge_text("Rust"), "Rust");
    }
}
