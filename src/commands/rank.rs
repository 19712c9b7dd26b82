//! The one command of the tool: collect, score, render, persist, publish.

use crate::commands::publish;
use chrono::Utc;
use clap::{Args, ValueEnum};
use gh_rank::Result;
use gh_rank::facts::hosting::Provider;
use gh_rank::ranking::color_for_grade;
use gh_rank::reports::{generate_card, update_readme};
use gh_rank::stats::{AccountStats, Aggregator};
use indicatif::{ProgressBar, ProgressStyle};
use ohno::EnrichableExt;
use owo_colors::OwoColorize;
use std::io::{IsTerminal, stdout};
use std::path::PathBuf;
use std::time::Instant;

const LOG_TARGET: &str = "      rank";
const PROGRESS_TEMPLATE: &str = "{prefix:>12.bold.cyan} [{bar:25}] {pos}/{len} {msg}";

/// Log level for diagnostic output
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    /// No logging output
    None,
    /// Only error messages
    Error,
    /// Warning and error messages
    Warn,
    /// Info, warning, and error messages
    Info,
    /// Debug and above messages
    Debug,
    /// All messages including trace
    Trace,
}

/// Which repositories to include in the statistics
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Scope {
    /// Only repositories owned by the account
    User,
    /// Also repositories of every organization the account belongs to
    All,
}

#[derive(Args, Debug)]
pub struct RankArgs {
    /// GitHub login of the account to score
    #[arg(value_name = "LOGIN")]
    pub login: String,

    /// Repositories to include in the statistics
    #[arg(long, value_name = "SCOPE", default_value = "user")]
    pub scope: Scope,

    /// GitHub personal access token
    #[arg(long, value_name = "TOKEN", env = "GITHUB_TOKEN")]
    pub github_token: Option<String>,

    /// Path of the document receiving the stats card
    #[arg(long, default_value = "README.md", value_name = "PATH")]
    pub readme: PathBuf,

    /// Heading displayed above the stats card
    #[arg(long, default_value = "GitHub Statistics", value_name = "TITLE")]
    pub card_title: String,

    /// Base URL of the hosting API
    #[arg(long, default_value = "https://api.github.com", value_name = "URL")]
    pub api_url: String,

    /// Do not commit and push the updated document
    #[arg(long)]
    pub no_push: bool,

    /// Set the logging level for diagnostic output
    #[arg(long, value_name = "LEVEL", default_value = "none")]
    pub log_level: LogLevel,
}

/// Run the full pipeline for one account.
pub async fn process_account(args: &RankArgs) -> Result<()> {
    let started = Instant::now();
    init_logging(args.log_level);

    let provider = Provider::new(args.github_token.as_deref(), &args.api_url)?;

    // The only fatal remote failure: a missing account or rejected credentials.
    provider.verify_account(&args.login).await?;

    let now = Utc::now();
    let aggregator = Aggregator::new(&provider, now);

    let bar = make_progress_bar(args.log_level)?;
    bar.set_prefix("Collecting");

    let observer_bar = bar.clone();
    let observer = move |processed: usize, total: usize| {
        observer_bar.set_length(total as u64);
        observer_bar.set_position(processed as u64);
        if processed % 10 == 0 || processed == total {
            log::info!(target: LOG_TARGET, "Processed {processed}/{total} repositories");
        }
    };

    let stats = aggregator.collect(&args.login, args.scope == Scope::All, &observer).await;
    bar.finish_and_clear();

    let card = generate_card(&stats, &args.login, &args.card_title, now);
    let changed = update_readme(&args.readme, &card)
        .map_err(|e| e.enrich_with(|| format!("could not save the stats card for '{}'", args.login)))?;

    if changed {
        if args.no_push {
            log::info!(target: LOG_TARGET, "Skipping commit and push as requested");
        } else {
            publish::commit_and_push(&args.readme, stats.grade, stats.score).await;
        }
    }

    print_summary(&args.login, &stats, started.elapsed().as_secs());
    Ok(())
}

/// Initialize logger based on log level
fn init_logging(log_level: LogLevel) {
    if log_level == LogLevel::None {
        return;
    }

    let level = match log_level {
        LogLevel::None => return, // Already checked above, but being explicit
        LogLevel::Error => "error",
        LogLevel::Warn => "warn",
        LogLevel::Info => "info",
        LogLevel::Debug => "debug",
        LogLevel::Trace => "trace",
    };

    let env = env_logger::Env::default().filter_or("RUST_LOG", level);

    env_logger::Builder::from_env(env)
        .format_timestamp(None)
        .format_module_path(false)
        .format_target(matches!(log_level, LogLevel::Debug) || matches!(log_level, LogLevel::Trace))
        .init();
}

/// A visible progress bar when logging is off; a hidden one otherwise, since
/// bar redraws and log lines fight over the terminal.
fn make_progress_bar(log_level: LogLevel) -> Result<ProgressBar> {
    if log_level != LogLevel::None {
        return Ok(ProgressBar::hidden());
    }

    let bar = ProgressBar::new(0);
    bar.set_style(ProgressStyle::with_template(PROGRESS_TEMPLATE)?);
    Ok(bar)
}

fn print_summary(login: &str, stats: &AccountStats, elapsed_secs: u64) {
    let use_colors = stdout().is_terminal();

    println!();
    println!("Account          : {login}");
    println!("Repositories     : {}", stats.repositories);
    println!("Stars            : {}", stats.stars);
    println!("Commits          : {}", stats.commits);
    println!("Issues           : {}", stats.issues);
    println!("Pull Requests    : {}", stats.pull_requests);
    println!("Followers        : {}", stats.followers);
    println!("Following        : {}", stats.following);
    println!("Contributed To   : {}", stats.contributed_to);
    println!("Top Language     : {}", stats.top_language().unwrap_or("None"));
    println!("Days Active      : {}", stats.days_active);
    println!("Issue Close Rate : {:.0}%", stats.issue_close_rate);
    println!("PR Merge Rate    : {:.0}%", stats.pr_merge_rate);
    println!("Score            : {}", stats.score);
    println!("Grade            : {}", styled_grade(stats.grade, use_colors));
    println!();
    println!("Finished in {elapsed_secs}s");
}

fn styled_grade(grade: &str, use_colors: bool) -> String {
    if !use_colors {
        return grade.to_owned();
    }

    match color_for_grade(grade) {
        "396" => grade.green().bold().to_string(),
        "669" => grade.blue().bold().to_string(),
        "FB2" | "F84" => grade.yellow().bold().to_string(),
        "F42" | "933" => grade.red().bold().to_string(),
        _ => grade.bold().to_string(),
    }
}
