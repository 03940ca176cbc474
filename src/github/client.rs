use async_trait::async_trait;
use reqwest::{RequestBuilder, Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, instrument};

use super::{ApiError, GitHubApi};
use crate::resource::{Commit, PullRequest, Repository, User};

pub const DEFAULT_API_URL: &str = "https://api.github.com";
pub const DEFAULT_PER_PAGE: u8 = 100;

const USER_AGENT: &str = "github-changelog";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Deserialize)]
struct CommitResponse {
    sha: String,
    commit: CommitDetail,
}

#[derive(Deserialize)]
struct CommitDetail {
    message: String,
}

#[derive(Deserialize)]
struct PullResponse {
    number: u64,
    title: String,
    user: UserResponse,
}

#[derive(Deserialize)]
struct UserResponse {
    login: String,
}

#[derive(Deserialize)]
struct ErrorResponse {
    message: String,
}

impl From<CommitResponse> for Commit {
    fn from(response: CommitResponse) -> Self {
        Commit::new(response.sha, response.commit.message)
    }
}

impl From<PullResponse> for PullRequest {
    fn from(response: PullResponse) -> Self {
        PullRequest::new(response.number, response.title, User::new(response.user.login))
    }
}

/// `GitHubApi` backed by the GitHub REST API v3.
#[derive(Debug, Clone)]
pub struct GitHubClient {
    http: reqwest::Client,
    base_url: Url,
    token: Option<String>,
    per_page: u8,
}

impl GitHubClient {
    /// Build a client for `base_url` (e.g., "https://api.github.com").
    /// `per_page` is clamped to the 1..=100 range GitHub accepts.
    pub fn new(base_url: &str, token: Option<String>, per_page: u8) -> Result<Self, ApiError> {
        let base_url = Url::parse(base_url)
            .ok()
            .filter(|url| !url.cannot_be_a_base())
            .ok_or_else(|| ApiError::InvalidBaseUrl(base_url.to_string()))?;

        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            http,
            base_url,
            token,
            per_page: per_page.clamp(1, DEFAULT_PER_PAGE),
        })
    }

    /// `{base_url}/repos/{owner}/{name}/{segments...}`, each segment
    /// percent-encoded so references like "fix#12" stay one path segment.
    fn url(&self, repository: &Repository, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        // `new` rejects URLs that cannot be a base.
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty()
                .extend(["repos", repository.owner(), repository.name()])
                .extend(segments);
        }
        url
    }

    fn get(&self, repository: &Repository, segments: &[&str]) -> RequestBuilder {
        let request = self
            .http
            .get(self.url(repository, segments))
            .header("Accept", "application/vnd.github+json");

        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    /// Send a lookup request. Missing resources come back as `Ok(None)`.
    async fn fetch_optional<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
    ) -> Result<Option<T>, ApiError> {
        let response = request.send().await?;

        // 422 is what GitHub answers for a SHA-shaped reference that does not exist.
        if matches!(
            response.status(),
            StatusCode::NOT_FOUND | StatusCode::UNPROCESSABLE_ENTITY
        ) {
            debug!(status = response.status().as_u16(), "resource not found");
            return Ok(None);
        }

        decode(response).await.map(Some)
    }
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
    let status = response.status();

    if is_rate_limited(&response) {
        return Err(ApiError::RateLimited);
    }

    let body = response.text().await?;

    if !status.is_success() {
        let message = serde_json::from_str::<ErrorResponse>(&body)
            .map(|error| error.message)
            .unwrap_or(body);
        return Err(ApiError::Status {
            status: status.as_u16(),
            message,
        });
    }

    Ok(serde_json::from_str(&body)?)
}

fn is_rate_limited(response: &Response) -> bool {
    if response.status() == StatusCode::TOO_MANY_REQUESTS {
        return true;
    }

    response.status() == StatusCode::FORBIDDEN
        && response
            .headers()
            .get("X-RateLimit-Remaining")
            .and_then(|value| value.to_str().ok())
            .is_some_and(|remaining| remaining == "0")
}

#[async_trait]
impl GitHubApi for GitHubClient {
    #[instrument(skip(self), fields(repository = %repository))]
    async fn commits(&self, repository: &Repository, sha: &str) -> Result<Vec<Commit>, ApiError> {
        let per_page = self.per_page.to_string();
        let request = self
            .get(repository, &["commits"])
            .query(&[("sha", sha), ("per_page", per_page.as_str())]);

        let page: Vec<CommitResponse> = decode(request.send().await?).await?;
        debug!(commits = page.len(), "received commit page");

        Ok(page.into_iter().map(Commit::from).collect())
    }

    #[instrument(skip(self), fields(repository = %repository))]
    async fn commit(
        &self,
        repository: &Repository,
        reference: &str,
    ) -> Result<Option<Commit>, ApiError> {
        let request = self.get(repository, &["commits", reference]);
        let commit: Option<CommitResponse> = self.fetch_optional(request).await?;

        Ok(commit.map(Commit::from))
    }

    #[instrument(skip(self), fields(repository = %repository))]
    async fn pull_request(
        &self,
        repository: &Repository,
        number: u64,
    ) -> Result<Option<PullRequest>, ApiError> {
        let number = number.to_string();
        let request = self.get(repository, &["pulls", &number]);
        let pull: Option<PullResponse> = self.fetch_optional(request).await?;

        Ok(pull.map(PullRequest::from))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn repository() -> Repository {
        Repository::from_owner_and_name("owner", "repo").unwrap()
    }

    fn commit_json(sha: &str, message: &str) -> serde_json::Value {
        json!({ "sha": sha, "commit": { "message": message } })
    }

    #[test]
    fn test_per_page_is_clamped() {
        let client = GitHubClient::new(DEFAULT_API_URL, None, 0).unwrap();
        assert_eq!(client.per_page, 1);
        let client = GitHubClient::new(DEFAULT_API_URL, None, 250).unwrap();
        assert_eq!(client.per_page, 100);
    }

    #[test]
    fn test_url_keeps_base_path() {
        let client = GitHubClient::new("https://ghe.example.com/api/v3/", None, 30).unwrap();
        assert_eq!(
            client.url(&repository(), &["commits"]).as_str(),
            "https://ghe.example.com/api/v3/repos/owner/repo/commits"
        );

        let client = GitHubClient::new(DEFAULT_API_URL, None, 30).unwrap();
        assert_eq!(
            client.url(&repository(), &["pulls", "42"]).as_str(),
            "https://api.github.com/repos/owner/repo/pulls/42"
        );
    }

    #[test]
    fn test_invalid_base_url() {
        let err = GitHubClient::new("not a url", None, 30).unwrap_err();
        assert!(matches!(err, ApiError::InvalidBaseUrl(_)));
    }

    #[tokio::test]
    async fn test_reference_is_percent_encoded() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/repos/owner/repo/commits/fix%2312"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(commit_json("abc123", "branch fix#12")),
            )
            .expect(1)
            .mount(&mock_server)
            .await;

        Mock::given(method("GET"))
            .and(path("/repos/owner/repo/commits/fix"))
            .respond_with(ResponseTemplate::new(200).set_body_json(commit_json("WRONG", "branch fix")))
            .expect(0)
            .mount(&mock_server)
            .await;

        let client = GitHubClient::new(&mock_server.uri(), None, 100).unwrap();
        let commit = client.commit(&repository(), "fix#12").await.unwrap();
        assert_eq!(commit, Some(Commit::new("abc123", "branch fix#12")));
    }

    #[tokio::test]
    async fn test_commits_requests_page_from_sha() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/repos/owner/repo/commits"))
            .and(query_param("sha", "aaa"))
            .and(query_param("per_page", "2"))
            .and(header("User-Agent", "github-changelog"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                commit_json("aaa", "First"),
                commit_json("bbb", "Merge pull request #7 from owner/feature"),
            ])))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = GitHubClient::new(&mock_server.uri(), None, 2).unwrap();
        let commits = client.commits(&repository(), "aaa").await.unwrap();

        assert_eq!(
            commits,
            vec![
                Commit::new("aaa", "First"),
                Commit::new("bbb", "Merge pull request #7 from owner/feature"),
            ]
        );
    }

    #[tokio::test]
    async fn test_token_is_sent_as_bearer() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/repos/owner/repo/commits"))
            .and(header("Authorization", "Bearer secret-token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client =
            GitHubClient::new(&mock_server.uri(), Some("secret-token".to_string()), 100).unwrap();
        let commits = client.commits(&repository(), "aaa").await.unwrap();
        assert!(commits.is_empty());
    }

    #[tokio::test]
    async fn test_commit_lookup() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/repos/owner/repo/commits/1.0.0"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(commit_json("abc123", "Release 1.0.0")),
            )
            .mount(&mock_server)
            .await;

        let client = GitHubClient::new(&mock_server.uri(), None, 100).unwrap();
        let commit = client.commit(&repository(), "1.0.0").await.unwrap();
        assert_eq!(commit, Some(Commit::new("abc123", "Release 1.0.0")));
    }

    #[tokio::test]
    async fn test_missing_reference_is_none() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/repos/owner/repo/commits/nope"))
            .respond_with(
                ResponseTemplate::new(422)
                    .set_body_json(json!({ "message": "No commit found for SHA: nope" })),
            )
            .mount(&mock_server)
            .await;

        let client = GitHubClient::new(&mock_server.uri(), None, 100).unwrap();
        assert_eq!(client.commit(&repository(), "nope").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_pull_request_lookup() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/repos/owner/repo/pulls/42"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "number": 42,
                "title": "Fix bug",
                "user": { "login": "alice" },
                "state": "closed"
            })))
            .mount(&mock_server)
            .await;

        Mock::given(method("GET"))
            .and(path("/repos/owner/repo/pulls/43"))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({ "message": "Not Found" })))
            .mount(&mock_server)
            .await;

        let client = GitHubClient::new(&mock_server.uri(), None, 100).unwrap();

        let pull = client.pull_request(&repository(), 42).await.unwrap().unwrap();
        assert_eq!(pull, PullRequest::new(42, "Fix bug", User::new("alice")));

        assert_eq!(client.pull_request(&repository(), 43).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_error_status_carries_github_message() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/repos/owner/repo/commits"))
            .respond_with(
                ResponseTemplate::new(409).set_body_json(json!({ "message": "Git Repository is empty." })),
            )
            .mount(&mock_server)
            .await;

        let client = GitHubClient::new(&mock_server.uri(), None, 100).unwrap();
        let err = client.commits(&repository(), "aaa").await.unwrap_err();

        match err {
            ApiError::Status { status, message } => {
                assert_eq!(status, 409);
                assert_eq!(message, "Git Repository is empty.");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_rate_limit_is_detected() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/repos/owner/repo/commits"))
            .respond_with(
                ResponseTemplate::new(403)
                    .insert_header("X-RateLimit-Remaining", "0")
                    .set_body_json(json!({ "message": "API rate limit exceeded" })),
            )
            .mount(&mock_server)
            .await;

        let client = GitHubClient::new(&mock_server.uri(), None, 100).unwrap();
        let err = client.commits(&repository(), "aaa").await.unwrap_err();
        assert!(matches!(err, ApiError::RateLimited));
    }

    #[tokio::test]
    async fn test_malformed_body_is_decode_error() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/repos/owner/repo/commits"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&mock_server)
            .await;

        let client = GitHubClient::new(&mock_server.uri(), None, 100).unwrap();
        let err = client.commits(&repository(), "aaa").await.unwrap_err();
        assert!(matches!(err, ApiError::Decode(_)));
    }
}
