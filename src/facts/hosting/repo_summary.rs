use chrono::{DateTime, Utc};
use serde::Deserialize;

/// Minimal repository info with only the fields we need
#[derive(Debug, Clone, Deserialize)]
pub struct RepoSummary {
    pub name: String,
    pub owner: RepoOwner,
    #[serde(default)]
    pub stargazers_count: u64,
    #[serde(default)]
    pub forks_count: u64,
    #[serde(default)]
    pub watchers_count: u64,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Owning user or organization of a repository
#[derive(Debug, Clone, Deserialize)]
pub struct RepoOwner {
    pub login: String,
}

/// Minimal organization info from the org-membership listing
#[derive(Debug, Clone, Deserialize)]
pub struct OrgSummary {
    pub login: String,
}

impl RepoSummary {
    /// The `owner/name` form used in logs.
    #[must_use]
    pub fn full_name(&self) -> String {
        format!("{}/{}", self.owner.login, self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserialize_full_repository() {
        let json = r#"{
            "name": "widget",
            "owner": { "login": "octocat" },
            "stargazers_count": 1000,
            "forks_count": 200,
            "watchers_count": 50,
            "language": "Rust",
            "created_at": "2019-06-01T12:00:00Z"
        }"#;

        let repo: RepoSummary = serde_json::from_str(json).unwrap();
        assert_eq!(repo.full_name(), "octocat/widget");
        assert_eq!(repo.stargazers_count, 1000);
        assert_eq!(repo.forks_count, 200);
        assert_eq!(repo.watchers_count, 50);
        assert_eq!(repo.language.as_deref(), Some("Rust"));
        assert!(repo.created_at.is_some());
    }

    #[test]
    fn deserialize_sparse_repository() {
        let json = r#"{
            "name": "widget",
            "owner": { "login": "octocat" },
            "language": null
        }"#;

        let repo: RepoSummary = serde_json::from_str(json).unwrap();
        assert_eq!(repo.stargazers_count, 0);
        assert_eq!(repo.forks_count, 0);
        assert_eq!(repo.watchers_count, 0);
        assert!(repo.language.is_none());
        assert!(repo.created_at.is_none());
    }

    #[test]
    fn deserialize_org() {
        let json = r#"{ "login": "acme" }"#;
        let org: OrgSummary = serde_json::from_str(json).unwrap();
        assert_eq!(org.login, "acme");
    }
}
