use crate::Result;
use crate::facts::fallback::first_success;
use crate::facts::hosting::{AccountProfile, ContributionTotals, OrgSummary, RepoSummary};
use core::time::Duration;
use octocrab::{Octocrab, params};
use ohno::{IntoAppError, bail};
use reqwest::Client;
use reqwest::header::LINK;
use serde::Deserialize;
use std::sync::LazyLock;
use tokio::time::sleep;

const LOG_TARGET: &str = "   hosting";
const PAGE_SIZE: u8 = 100;

/// Courtesy pause between successive page requests.
const PAGE_DELAY: Duration = Duration::from_millis(50);

/// Assumed share of closed pull requests that ended up merged, used when the
/// merged listing cannot be read at all.
const MERGED_PR_NUMERATOR: u64 = 7;

/// Pattern to extract the last page number from the API Link header
static PAGE_REGEX: LazyLock<regex::Regex> = LazyLock::new(|| regex::Regex::new(r"page=(\d+)>; rel=.last.").expect("invalid regex"));

/// Hosting API access for one account run.
///
/// Owns an `octocrab` client for the listing endpoints and a raw `reqwest`
/// client for count queries, the profile endpoints, and the contribution
/// query. Both point at `base_url` so tests can substitute a mock server.
#[derive(Debug, Clone)]
pub struct Provider {
    octocrab: Octocrab,
    client: Client,
    base_url: String,
}

impl Provider {
    /// Create a new hosting provider with optional authentication token and base URL
    pub fn new(token: Option<&str>, base_url: impl Into<String>) -> Result<Self> {
        use reqwest::header::{AUTHORIZATION, HeaderValue};

        let base_url = base_url.into();
        let base_url = base_url.trim_end_matches('/').to_owned();

        let mut builder = Octocrab::builder().base_uri(base_url.as_str())?;
        let mut client_builder = Client::builder().user_agent("gh-rank");

        if let Some(t) = token {
            let mut auth_val = HeaderValue::from_str(&format!("token {t}"))?;
            auth_val.set_sensitive(true);

            let mut headers = reqwest::header::HeaderMap::new();
            let _ = headers.insert(AUTHORIZATION, auth_val);

            client_builder = client_builder.default_headers(headers);

            builder = builder.personal_token(t);
        }

        Ok(Self {
            octocrab: builder.build()?,
            client: client_builder.build()?,
            base_url,
        })
    }

    /// Get the base URL for this provider
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Confirm the account exists and the credentials are usable.
    ///
    /// This is the only remote query whose failure aborts a run.
    pub async fn verify_account(&self, login: &str) -> Result<()> {
        let url = format!("{}/users/{login}", self.base_url);
        let resp = self
            .client
            .get(&url)
            .send()
            .await
            .into_app_err_with(|| format!("could not reach '{url}'"))?;

        match resp.status().as_u16() {
            404 => bail!("account '{login}' does not exist"),
            401 | 403 => bail!("access denied while looking up account '{login}'; check the provided token"),
            _ => {
                let _ = resp
                    .error_for_status()
                    .into_app_err_with(|| format!("could not look up account '{login}'"))?;
                Ok(())
            }
        }
    }

    /// Fetch follower/following counts and the contribution totals.
    ///
    /// Never fails: profile numbers degrade to zero, and a failed contribution
    /// query leaves `contribution_totals` unset for the aggregation loop to
    /// estimate once its own totals are known.
    pub async fn fetch_profile(&self, login: &str) -> AccountProfile {
        let mut profile = AccountProfile::default();

        match self.user_info(login).await {
            Ok(user) => {
                profile.followers = user.followers;
                profile.following = user.following;
            }
            Err(e) => {
                log::warn!(target: LOG_TARGET, "Could not fetch profile info for '{login}': {e:#}");
            }
        }

        match self.contribution_totals(login).await {
            Ok(totals) => profile.contribution_totals = Some(totals),
            Err(e) => {
                log::debug!(target: LOG_TARGET, "Could not fetch contribution totals for '{login}', deferring to estimation: {e:#}");
            }
        }

        log::debug!(
            target: LOG_TARGET,
            "Profile for '{login}': followers={}, following={}, contribution_totals={:?}",
            profile.followers,
            profile.following,
            profile.contribution_totals
        );

        profile
    }

    /// Enumerate the repositories owned by the account, extended with each
    /// of its organizations' repositories when `include_orgs` is set.
    ///
    /// Any underlying failure degrades to whatever was collected so far; an
    /// empty result still lets the rest of the pipeline complete.
    pub async fn repositories(&self, login: &str, include_orgs: bool) -> Vec<RepoSummary> {
        let url = format!("{}/users/{login}/repos?type=owner&per_page={PAGE_SIZE}", self.base_url);
        let mut repos = match self.fetch_all_pages::<RepoSummary>(&url).await {
            Ok(repos) => repos,
            Err(e) => {
                log::warn!(target: LOG_TARGET, "Could not enumerate repositories for '{login}': {e:#}");
                return Vec::new();
            }
        };

        if include_orgs {
            let url = format!("{}/users/{login}/orgs?per_page={PAGE_SIZE}", self.base_url);
            match self.fetch_all_pages::<OrgSummary>(&url).await {
                Ok(orgs) => {
                    for org in orgs {
                        let url = format!("{}/orgs/{}/repos?per_page={PAGE_SIZE}", self.base_url, org.login);
                        match self.fetch_all_pages::<RepoSummary>(&url).await {
                            Ok(mut org_repos) => repos.append(&mut org_repos),
                            Err(e) => {
                                log::warn!(target: LOG_TARGET, "Could not enumerate repositories of organization '{}': {e:#}", org.login);
                            }
                        }
                    }
                }
                Err(e) => {
                    log::warn!(target: LOG_TARGET, "Could not enumerate organizations of '{login}': {e:#}");
                }
            }
        }

        log::info!(target: LOG_TARGET, "Found {} repositories for '{login}'", repos.len());
        repos
    }

    /// Count the account's commits in one repository.
    ///
    /// Tries a single aggregate-count request first, then author-filtered
    /// page-by-page enumeration, then a bare existence probe.
    pub async fn commit_count(&self, login: &str, owner: &str, repo: &str) -> u64 {
        let what = format!("commit count for '{owner}/{repo}'");
        first_success(
            &what,
            vec![
                ("aggregate count", Box::pin(self.commit_count_via_link_header(login, owner, repo))),
                ("paginated enumeration", Box::pin(self.count_commits_paged(login, owner, repo))),
                ("existence probe", Box::pin(self.probe_any_commit(login, owner, repo))),
            ],
            0,
        )
        .await
    }

    /// Count all issues in a repository, excluding pull requests.
    pub async fn issue_count(&self, owner: &str, repo: &str) -> u64 {
        let what = format!("issue count for '{owner}/{repo}'");
        first_success(&what, vec![("paginated listing", Box::pin(self.count_issues(owner, repo, false)))], 0).await
    }

    /// Count closed issues in a repository, excluding pull requests.
    pub async fn closed_issue_count(&self, owner: &str, repo: &str) -> u64 {
        let what = format!("closed issue count for '{owner}/{repo}'");
        first_success(&what, vec![("paginated listing", Box::pin(self.count_issues(owner, repo, true)))], 0).await
    }

    /// Count all pull requests in a repository.
    pub async fn pr_count(&self, owner: &str, repo: &str) -> u64 {
        let what = format!("pull request count for '{owner}/{repo}'");
        first_success(&what, vec![("paginated listing", Box::pin(self.count_pulls(owner, repo, false)))], 0).await
    }

    /// Count merged pull requests in a repository.
    ///
    /// When the closed listing cannot be read at all, the count is estimated
    /// as 70% of the total pull request count.
    pub async fn merged_pr_count(&self, owner: &str, repo: &str) -> u64 {
        let what = format!("merged pull request count for '{owner}/{repo}'");
        first_success(
            &what,
            vec![
                ("paginated listing", Box::pin(self.count_pulls(owner, repo, true))),
                (
                    "estimate from total",
                    Box::pin(async move {
                        let total = self.pr_count(owner, repo).await;
                        Ok(estimate_merged_from_total(total))
                    }),
                ),
            ],
            0,
        )
        .await
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, url: &str) -> Result<T> {
        let resp = self
            .client
            .get(url)
            .send()
            .await
            .into_app_err_with(|| format!("could not query '{url}'"))?;
        let resp = resp.error_for_status()?;
        resp.json().await.into_app_err_with(|| format!("could not parse response from '{url}'"))
    }

    /// Walk a paginated listing endpoint until a page comes back short.
    ///
    /// A failure on the first page fails the whole fetch; a failure later
    /// stops pagination and keeps the partial result.
    async fn fetch_all_pages<T: serde::de::DeserializeOwned>(&self, url: &str) -> Result<Vec<T>> {
        let mut out = Vec::new();
        let mut page = 1_u32;

        loop {
            let page_url = format!("{url}&page={page}");
            let items: Vec<T> = match self.get_json(&page_url).await {
                Ok(items) => items,
                Err(e) if page == 1 => return Err(e),
                Err(e) => {
                    log::debug!(target: LOG_TARGET, "Stopping pagination at page {page} of '{url}': {e:#}");
                    break;
                }
            };

            let full_page = items.len() >= usize::from(PAGE_SIZE);
            out.extend(items);

            if !full_page {
                break;
            }

            page += 1;
            sleep(PAGE_DELAY).await;
        }

        Ok(out)
    }

    async fn user_info(&self, login: &str) -> Result<UserInfo> {
        let url = format!("{}/users/{login}", self.base_url);
        self.get_json(&url).await
    }

    async fn contribution_totals(&self, login: &str) -> Result<ContributionTotals> {
        const QUERY: &str = "query($login: String!) { \
             user(login: $login) { \
               repositoriesContributedTo(first: 1) { totalCount } \
               contributionsCollection { \
                 contributionCalendar { totalContributions } \
                 contributionYears \
               } \
             } \
           }";

        #[derive(Debug, Deserialize)]
        struct Response {
            data: Option<Data>,
            #[serde(default)]
            errors: Option<serde_json::Value>,
        }

        #[derive(Debug, Deserialize)]
        struct Data {
            user: Option<UserNode>,
        }

        #[derive(Debug, Deserialize)]
        #[serde(rename_all = "camelCase")]
        struct UserNode {
            repositories_contributed_to: Option<CountNode>,
            contributions_collection: Option<ContributionsCollection>,
        }

        #[derive(Debug, Deserialize)]
        #[serde(rename_all = "camelCase")]
        struct CountNode {
            total_count: u64,
        }

        #[derive(Debug, Deserialize)]
        #[serde(rename_all = "camelCase")]
        struct ContributionsCollection {
            contribution_calendar: Option<ContributionCalendar>,
            #[serde(default)]
            contribution_years: Vec<i32>,
        }

        #[derive(Debug, Deserialize)]
        #[serde(rename_all = "camelCase")]
        struct ContributionCalendar {
            total_contributions: u64,
        }

        let url = format!("{}/graphql", self.base_url);
        let payload = serde_json::json!({ "query": QUERY, "variables": { "login": login } });

        let resp = self
            .client
            .post(&url)
            .json(&payload)
            .send()
            .await
            .into_app_err_with(|| format!("could not query '{url}'"))?;
        let resp = resp.error_for_status()?;
        let body: Response = resp.json().await.into_app_err("could not parse contribution query response")?;

        if let Some(errors) = body.errors {
            bail!("contribution query reported errors: {errors}");
        }

        let Some(user) = body.data.and_then(|data| data.user) else {
            bail!("contribution query returned no account data");
        };

        let contributed_to = user.repositories_contributed_to.map_or(0, |count| count.total_count);
        let contributions = match user.contributions_collection {
            Some(collection) => match collection.contribution_calendar {
                Some(calendar) => calendar.total_contributions,
                // Calendar unavailable: assume contributions on half the days
                // of every recorded year.
                None => collection.contribution_years.len() as u64 * 365 / 2,
            },
            None => 0,
        };

        Ok(ContributionTotals { contributed_to, contributions })
    }

    /// One cheap request whose Link header carries the total as the last page
    /// number; bodies without the header hold the full (short) result.
    async fn commit_count_via_link_header(&self, login: &str, owner: &str, repo: &str) -> Result<u64> {
        let url = format!("{}/repos/{owner}/{repo}/commits?author={login}&per_page=1", self.base_url);
        let resp = self
            .client
            .get(&url)
            .send()
            .await
            .into_app_err_with(|| format!("could not query '{url}'"))?;
        let resp = resp.error_for_status()?;

        if let Some(link_header) = resp.headers().get(LINK) {
            let link_str = link_header.to_str()?;
            if let Some(count) = PAGE_REGEX.captures(link_str).and_then(|caps| caps.get(1)) {
                return Ok(count.as_str().parse()?);
            }
        }

        let bytes = resp
            .bytes()
            .await
            .into_app_err_with(|| format!("could not read response body from '{url}'"))?;

        count_json_array_elements(&bytes).into_app_err_with(|| format!("could not count items in JSON response from '{url}'"))
    }

    async fn count_commits_paged(&self, login: &str, owner: &str, repo: &str) -> Result<u64> {
        let mut count = 0_u64;
        let mut page_number = 1_u32;

        loop {
            let page = match self
                .octocrab
                .repos(owner, repo)
                .list_commits()
                .author(login)
                .per_page(PAGE_SIZE)
                .page(page_number)
                .send()
                .await
            {
                Ok(page) => page,
                Err(e) if page_number == 1 => {
                    return Err(e).into_app_err_with(|| format!("could not list commits for '{owner}/{repo}'"));
                }
                Err(e) => {
                    log::debug!(target: LOG_TARGET, "Stopping commit pagination for '{owner}/{repo}' at page {page_number}: {e:#}");
                    break;
                }
            };

            count += page.items.len() as u64;

            if page.items.len() < usize::from(PAGE_SIZE) {
                break;
            }

            page_number += 1;
            sleep(PAGE_DELAY).await;
        }

        Ok(count)
    }

    async fn probe_any_commit(&self, login: &str, owner: &str, repo: &str) -> Result<u64> {
        let page = self
            .octocrab
            .repos(owner, repo)
            .list_commits()
            .author(login)
            .per_page(1)
            .page(1_u32)
            .send()
            .await?;

        Ok(u64::from(!page.items.is_empty()))
    }

    async fn count_issues(&self, owner: &str, repo: &str, only_closed: bool) -> Result<u64> {
        let mut count = 0_u64;
        let mut page_number = 1_u32;

        loop {
            let state = if only_closed { params::State::Closed } else { params::State::All };
            let page = match self
                .octocrab
                .issues(owner, repo)
                .list()
                .state(state)
                .per_page(PAGE_SIZE)
                .page(page_number)
                .send()
                .await
            {
                Ok(page) => page,
                Err(e) if page_number == 1 => {
                    return Err(e).into_app_err_with(|| format!("could not list issues for '{owner}/{repo}'"));
                }
                Err(e) => {
                    log::debug!(target: LOG_TARGET, "Stopping issue pagination for '{owner}/{repo}' at page {page_number}: {e:#}");
                    break;
                }
            };

            // The issues endpoint lists pull requests too; skip them.
            count += page.items.iter().filter(|issue| issue.pull_request.is_none()).count() as u64;

            if page.items.len() < usize::from(PAGE_SIZE) {
                break;
            }

            page_number += 1;
            sleep(PAGE_DELAY).await;
        }

        Ok(count)
    }

    async fn count_pulls(&self, owner: &str, repo: &str, merged_only: bool) -> Result<u64> {
        let mut count = 0_u64;
        let mut page_number = 1_u32;

        loop {
            let state = if merged_only { params::State::Closed } else { params::State::All };
            let page = match self
                .octocrab
                .pulls(owner, repo)
                .list()
                .state(state)
                .per_page(PAGE_SIZE)
                .page(page_number)
                .send()
                .await
            {
                Ok(page) => page,
                Err(e) if page_number == 1 => {
                    return Err(e).into_app_err_with(|| format!("could not list pull requests for '{owner}/{repo}'"));
                }
                Err(e) => {
                    log::debug!(target: LOG_TARGET, "Stopping pull request pagination for '{owner}/{repo}' at page {page_number}: {e:#}");
                    break;
                }
            };

            if merged_only {
                count += page.items.iter().filter(|pr| pr.merged_at.is_some()).count() as u64;
            } else {
                count += page.items.len() as u64;
            }

            if page.items.len() < usize::from(PAGE_SIZE) {
                break;
            }

            page_number += 1;
            sleep(PAGE_DELAY).await;
        }

        Ok(count)
    }
}

/// Follower numbers from the profile endpoint
#[derive(Debug, Deserialize)]
struct UserInfo {
    #[serde(default)]
    followers: u64,
    #[serde(default)]
    following: u64,
}

/// Round 70% of the total to the nearest whole count.
const fn estimate_merged_from_total(total: u64) -> u64 {
    (total * MERGED_PR_NUMERATOR + 5) / 10
}

/// Count elements in a JSON array without allocating parsed values.
/// Uses `IgnoredAny` to skip deserialization of element contents, only counting them.
fn count_json_array_elements(json: &[u8]) -> Result<u64> {
    use serde::de::IgnoredAny;

    let array: Vec<IgnoredAny> = serde_json::from_slice(json).into_app_err("malformed JSON while counting array elements")?;

    Ok(array.len() as u64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_count_json_array_elements() {
        assert_eq!(count_json_array_elements(b"[]").unwrap(), 0);
        assert_eq!(count_json_array_elements(br#"[{"sha": "abc"}]"#).unwrap(), 1);
        assert_eq!(count_json_array_elements(br#"[{"sha": "a"}, {"sha": "b"}, {"sha": "c"}]"#).unwrap(), 3);

        let _ = count_json_array_elements(b"[{broken").unwrap_err();
    }

    #[test]
    fn test_page_regex_extracts_last_page() {
        let link = r#"<https://api.github.com/repos/o/r/commits?author=x&per_page=1&page=2>; rel="next", <https://api.github.com/repos/o/r/commits?author=x&per_page=1&page=347>; rel="last""#;
        let captures = PAGE_REGEX.captures(link).unwrap();
        assert_eq!(&captures[1], "347");
    }

    #[test]
    fn test_page_regex_no_last_relation() {
        let link = r#"<https://api.github.com/repos/o/r/commits?page=2>; rel="next""#;
        assert!(PAGE_REGEX.captures(link).is_none());
    }

    #[test]
    fn test_estimate_merged_from_total() {
        assert_eq!(estimate_merged_from_total(0), 0);
        assert_eq!(estimate_merged_from_total(3), 2);
        assert_eq!(estimate_merged_from_total(5), 4);
        assert_eq!(estimate_merged_from_total(10), 7);
        assert_eq!(estimate_merged_from_total(100), 70);
    }

    #[test]
    fn test_user_info_deserialize() {
        let json = r#"{ "login": "octocat", "followers": 12, "following": 3 }"#;
        let user: UserInfo = serde_json::from_str(json).unwrap();
        assert_eq!(user.followers, 12);
        assert_eq!(user.following, 3);

        let user: UserInfo = serde_json::from_str(r#"{ "login": "octocat" }"#).unwrap();
        assert_eq!(user.followers, 0);
        assert_eq!(user.following, 0);
    }

    #[tokio::test]
    async fn test_provider_new_without_token() {
        let provider = Provider::new(None, "https://api.github.com/").unwrap();
        assert_eq!(provider.base_url(), "https://api.github.com");
    }

    #[tokio::test]
    async fn test_provider_new_with_token() {
        let provider = Provider::new(Some("test_token"), "https://api.github.com").unwrap();
        assert_eq!(provider.base_url(), "https://api.github.com");
    }
}
