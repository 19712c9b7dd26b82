use crate::Result;
use ohno::IntoAppError;
use regex::Regex;
use std::fs;
use std::path::Path;
use std::sync::LazyLock;

const LOG_TARGET: &str = "    readme";

/// Matches an existing stats-card region, including the markers.
static STATS_REGION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<!-- BEGIN_GITHUB_STATS -->.*<!-- END_GITHUB_STATS -->").expect("invalid regex"));

/// Write the card into the document at `path`.
///
/// Creates the document when missing, replaces the marker-delimited region
/// when present, and appends the card otherwise. Returns whether the document
/// content actually changed.
pub fn update(path: &Path, card: &str) -> Result<bool> {
    if !path.exists() {
        fs::write(path, card).into_app_err_with(|| format!("could not create '{}'", path.display()))?;
        log::info!(target: LOG_TARGET, "Created '{}' with the stats card", path.display());
        return Ok(true);
    }

    let content = fs::read_to_string(path).into_app_err_with(|| format!("could not read '{}'", path.display()))?;

    let new_content = if STATS_REGION.is_match(&content) {
        STATS_REGION.replace(&content, regex::NoExpand(card)).into_owned()
    } else {
        format!("{content}\n\n{card}")
    };

    if new_content == content {
        log::info!(target: LOG_TARGET, "Stats card in '{}' is already up to date", path.display());
        return Ok(false);
    }

    fs::write(path, new_content).into_app_err_with(|| format!("could not write '{}'", path.display()))?;
    log::info!(target: LOG_TARGET, "Updated the stats card in '{}'", path.display());
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reports::card::{BEGIN_MARKER, END_MARKER};

    fn card(body: &str) -> String {
        format!("{BEGIN_MARKER}\n{body}\n{END_MARKER}")
    }

    #[test]
    fn creates_missing_document() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("README.md");

        let changed = update(&path, &card("fresh")).unwrap();

        assert!(changed);
        assert_eq!(fs::read_to_string(&path).unwrap(), card("fresh"));
    }

    #[test]
    fn appends_when_no_region_exists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("README.md");
        fs::write(&path, "# My Profile\n").unwrap();

        let changed = update(&path, &card("stats")).unwrap();

        assert!(changed);
        let content = fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("# My Profile\n"));
        assert!(content.ends_with(&card("stats")));
    }

    #[test]
    fn replaces_existing_region_in_place() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("README.md");
        fs::write(&path, format!("before\n{}\nafter\n", card("old"))).unwrap();

        let changed = update(&path, &card("new")).unwrap();

        assert!(changed);
        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(content, format!("before\n{}\nafter\n", card("new")));
    }

    #[test]
    fn unchanged_card_reports_no_change() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("README.md");
        fs::write(&path, format!("intro\n{}\n", card("same"))).unwrap();

        let changed = update(&path, &card("same")).unwrap();

        assert!(!changed);
    }

    #[test]
    fn literal_dollar_signs_in_card_survive_replacement() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("README.md");
        fs::write(&path, card("old")).unwrap();

        let changed = update(&path, &card("costs $100")).unwrap();

        assert!(changed);
        assert!(fs::read_to_string(&path).unwrap().contains("costs $100"));
    }
}
