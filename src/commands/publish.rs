//! Commit-and-push tail step for the updated document.

use gh_rank::Result;
use ohno::{IntoAppError, bail};
use std::path::Path;
use tokio::process::Command;

const LOG_TARGET: &str = "   publish";
const GIT_USER_NAME: &str = "gh-rank bot";
const GIT_USER_EMAIL: &str = "gh-rank@users.noreply.github.com";

/// Commit the updated document and push it.
///
/// The computation already succeeded by the time this runs, so every failure
/// here is reported as a warning and swallowed.
pub async fn commit_and_push(document: &Path, grade: &str, score: u64) {
    match try_commit_and_push(document, grade, score).await {
        Ok(()) => log::info!(target: LOG_TARGET, "Committed and pushed the updated stats card"),
        Err(e) => {
            log::warn!(target: LOG_TARGET, "Could not commit and push the updated document: {e:#}");
            log::warn!(target: LOG_TARGET, "Make sure the token can push to this repository, or commit the change manually");
        }
    }
}

async fn try_commit_and_push(document: &Path, grade: &str, score: u64) -> Result<()> {
    run_git(&["config", "user.name", GIT_USER_NAME]).await?;
    run_git(&["config", "user.email", GIT_USER_EMAIL]).await?;

    let path = document.to_string_lossy();
    run_git(&["add", &path]).await?;

    let message = format!("Update GitHub stats card [{grade}, {score} points]");
    run_git(&["commit", "-m", &message]).await?;

    run_git(&["push"]).await
}

async fn run_git(args: &[&str]) -> Result<()> {
    let output = Command::new("git")
        .args(args)
        .output()
        .await
        .into_app_err_with(|| format!("could not run 'git {}'", args.join(" ")))?;

    check_git_output(&output, args)
}

fn check_git_output(output: &std::process::Output, args: &[&str]) -> Result<()> {
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        bail!("'git {}' failed: {}", args.join(" "), stderr.trim());
    }

    Ok(())
}
