//! A tool to score and grade a GitHub account from its repository statistics.
//!
//! # Overview
//!
//! `gh-rank` walks every repository of a GitHub account, accumulates commit,
//! issue, pull request, star, fork, and watcher counts along with
//! account-level numbers (followers, repositories contributed to, lifetime
//! contributions), derives per-repository averages and close/merge rates, and
//! maps the result onto a numeric score and one of eighteen letter grades
//! from D- up to SSS. The scored result is rendered as a badge card and
//! spliced into a README between fixed markers, ready to be committed back.
//!
//! # Installation
//!
//! ```bash
//! cargo install gh-rank
//! ```
//!
//! # Quick Start
//!
//! Score an account and update `README.md` in the current directory:
//!
//! ```bash
//! export GITHUB_TOKEN=ghp_xxxxxxxxxxxxxxxxxxxx
//! gh-rank octocat
//! ```
//!
//! # Basic Usage
//!
//! **Include organization repositories:**
//! ```bash
//! gh-rank octocat --scope all
//! ```
//!
//! **Write the card into a different document:**
//! ```bash
//! gh-rank octocat --readme profile/README.md --card-title "My GitHub Statistics"
//! ```
//!
//! **Compute and update without committing:**
//! ```bash
//! gh-rank octocat --no-push
//! ```
//!
//! The card is bounded by `<!-- BEGIN_GITHUB_STATS -->` and
//! `<!-- END_GITHUB_STATS -->` markers. On later runs only the marked region
//! is replaced; the rest of the document is left alone, and nothing is
//! committed when the content did not change.
//!
//! # GitHub Access
//!
//! 1. Create a personal access token at <https://github.com/settings/tokens>
//! 2. No special permissions are needed to read public repositories; pushing
//!    the updated README requires write access to its repository
//! 3. Provide the token via environment variable or command-line flag
//!
//! **Environment variable (recommended):**
//! ```bash
//! export GITHUB_TOKEN=ghp_xxxxxxxxxxxxxxxxxxxx
//! gh-rank octocat
//! ```
//!
//! **Command-line flag:**
//! ```bash
//! gh-rank octocat --github-token ghp_xxxxxxxxxxxxxxxxxxxx
//! ```
//!
//! Without a token the public API rate limit of 60 requests per hour applies,
//! which only suffices for very small accounts. A token raises the limit to
//! 5000 requests per hour.
//!
//! # Scoring System
//!
//! Each metric contributes a weighted number of points. Repository-wide
//! counters (commits, issues, pull requests) are capped so that one busy
//! repository cannot dominate the result, and step bonuses reward highly
//! starred work and long activity. The total is rounded and looked up in a
//! fixed ladder of eighteen grades:
//!
//! | Band | Grades | Meaning |
//! |------|--------|---------|
//! | D    | D-, D, D+ | Getting started |
//! | C    | C-, C, C+ | Occasional activity |
//! | B    | B-, B, B+ | Steady contributor |
//! | A    | A-, A, A+ | Established developer |
//! | S    | S-, S, S+ | Prolific, widely used work |
//! | SS+  | SS, SS+, SSS | Exceptional reach |
//!
//! Missing remote data never aborts a run: whatever could not be fetched
//! counts as zero (or a documented estimate), and the account still receives
//! a defined score and grade.
//!
//! # CI/CD Integration
//!
//! A scheduled workflow can keep a profile README fresh:
//!
//! ```yaml
//! name: Update GitHub Stats
//!
//! on:
//!   schedule:
//!     - cron: "0 6 * * 1"
//!
//! jobs:
//!   update-stats:
//!     runs-on: ubuntu-latest
//!     steps:
//!       - uses: actions/checkout@v4
//!       - uses: actions-rust-lang/setup-rust-toolchain@v1
//!
//!       - name: Install gh-rank
//!         run: cargo install gh-rank
//!
//!       - name: Update stats card
//!         env:
//!           GITHUB_TOKEN: ${{ secrets.GITHUB_TOKEN }}
//!         run: gh-rank ${{ github.repository_owner }} --scope all
//! ```
//!
//! # Troubleshooting
//!
//! ## Rate Limiting
//!
//! Public (unauthenticated) GitHub API access has strict rate limits.
//! Provide a token via `GITHUB_TOKEN`; large accounts with many repositories
//! need one.
//!
//! ## Zero Repositories Found
//!
//! - Check the login spelling
//! - Private repositories require a token that can see them
//! - The account may genuinely own no repositories; the run still produces a
//!   score from account-level data
//!
//! ## Push Failures
//!
//! The commit-and-push step is best effort. If it fails (no git repository,
//! token without write access), the run still succeeds and the warning tells
//! you to commit the change manually, or pass `--no-push` to skip the step.

use clap::Parser;
use clap::builder::Styles;
use clap::builder::styling::{AnsiColor, Effects};
use gh_rank::Result;

mod commands;

use crate::commands::{RankArgs, process_account};

const CLAP_STYLES: Styles = Styles::styled()
    .header(AnsiColor::Green.on_default().effects(Effects::BOLD))
    .usage(AnsiColor::Green.on_default().effects(Effects::BOLD))
    .literal(AnsiColor::Cyan.on_default().effects(Effects::BOLD))
    .placeholder(AnsiColor::Cyan.on_default());

#[derive(Parser, Debug)]
#[command(name = "gh-rank", version, about)]
#[command(styles = CLAP_STYLES)]
struct Cli {
    #[command(flatten)]
    args: RankArgs,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    process_account(&cli.args).await
}
