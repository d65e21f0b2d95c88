//! GitHub REST client for release lookup and asset downloads
//!
//! Blocking `ureq` agent with a per-request timeout, optional bearer token and
//! the shared [`RetryPolicy`]. Transport failures, 429 and 5xx responses are
//! retried; other statuses fail immediately.

pub mod release;

use std::io::Read;
use std::time::Duration;

use log::{debug, info};
use regex::Regex;

use crate::error::{InstallerError, Result};
use crate::retry::RetryPolicy;

pub use release::{Asset, Release};

/// Public GitHub API endpoint
pub const DEFAULT_API_BASE: &str = "https://api.github.com";

/// Default per-request timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Settings for every HTTP request made while installing a tool
#[derive(Debug, Clone)]
pub struct DownloadConfig {
    pub token: Option<String>,
    pub timeout: Duration,
    pub retry: RetryPolicy,
    pub api_base: String,
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            token: None,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            retry: RetryPolicy::default(),
            api_base: DEFAULT_API_BASE.to_string(),
        }
    }
}

/// Trim a token read from the environment; blank means no token
pub fn normalize_token(token: Option<String>) -> Option<String> {
    token
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
}

/// Streaming body of a downloaded asset
pub struct AssetBody {
    pub len: Option<u64>,
    pub reader: Box<dyn Read + Send + Sync + 'static>,
}

pub struct GithubClient {
    agent: ureq::Agent,
    config: DownloadConfig,
}

impl GithubClient {
    pub fn new(config: DownloadConfig) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(config.timeout)
            .user_agent(concat!("installer/", env!("CARGO_PKG_VERSION")))
            .build();
        Self { agent, config }
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        self.config.retry
    }

    /// Latest release, or the first release whose tag matches `tag_pattern`
    pub fn release(&self, owner: &str, repo: &str, tag_pattern: Option<&str>) -> Result<Release> {
        match tag_pattern {
            None => self.latest_release(owner, repo),
            Some(pattern) => self.release_matching(owner, repo, pattern),
        }
    }

    pub fn latest_release(&self, owner: &str, repo: &str) -> Result<Release> {
        let url = format!(
            "{}/repos/{owner}/{repo}/releases/latest",
            self.config.api_base.trim_end_matches('/')
        );
        let release: Release = self.get_json(&url)?;
        info!("Latest release of {owner}/{repo} is {}", release.tag_name);
        Ok(release)
    }

    pub fn release_matching(&self, owner: &str, repo: &str, tag_pattern: &str) -> Result<Release> {
        let pattern = Regex::new(tag_pattern).map_err(|e| InstallerError::InvalidPattern {
            pattern: tag_pattern.to_string(),
            reason: e.to_string(),
        })?;
        let url = format!(
            "{}/repos/{owner}/{repo}/releases?per_page=100",
            self.config.api_base.trim_end_matches('/')
        );
        let releases: Vec<Release> = self.get_json(&url)?;
        debug!("Got {} releases of {owner}/{repo}", releases.len());
        releases
            .into_iter()
            .find(|release| pattern.is_match(&release.tag_name))
            .inspect(|release| {
                info!(
                    "Release of {owner}/{repo} matching '{tag_pattern}' is {}",
                    release.tag_name
                )
            })
            .ok_or_else(|| InstallerError::ReleaseNotFound {
                owner: owner.to_string(),
                repo: repo.to_string(),
                tag: tag_pattern.to_string(),
            })
    }

    /// Open the asset body for streaming
    pub fn open_asset(&self, asset: &Asset) -> Result<AssetBody> {
        let response = self.get(&asset.download_url, "application/octet-stream")?;
        let len = response
            .header("Content-Length")
            .and_then(|v| v.parse::<u64>().ok());
        Ok(AssetBody {
            len,
            reader: response.into_reader(),
        })
    }

    fn get_json<T: serde::de::DeserializeOwned>(&self, url: &str) -> Result<T> {
        self.config.retry.run(url, is_retryable, || {
            let response = self.get(url, "application/vnd.github+json")?;
            response
                .into_json::<T>()
                .map_err(|e| InstallerError::ResponseParseFailed {
                    reason: format!("{url}: {e}"),
                })
        })
    }

    fn get(&self, url: &str, accept: &str) -> Result<ureq::Response> {
        debug!("GET {url}");
        let mut request = self.agent.get(url).set("Accept", accept);
        if let Some(token) = &self.config.token {
            request = request.set("Authorization", &format!("Bearer {token}"));
        }
        request.call().map_err(|e| map_ureq_error(url, e))
    }
}

fn map_ureq_error(url: &str, err: ureq::Error) -> InstallerError {
    match err {
        ureq::Error::Status(status, response) => InstallerError::HttpStatus {
            url: url.to_string(),
            status,
            reason: response.status_text().to_string(),
        },
        ureq::Error::Transport(transport) => InstallerError::HttpTransport {
            url: url.to_string(),
            reason: transport.to_string(),
        },
    }
}

/// Transport failures and server-side statuses are worth another attempt
pub fn is_retryable(err: &InstallerError) -> bool {
    match err {
        InstallerError::HttpTransport { .. } => true,
        InstallerError::HttpStatus { status, .. } => *status == 429 || *status >= 500,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Server;

    const LATEST: &str = r#"{
        "tag_name": "v2.0.0",
        "assets": [
            {"name": "tool-linux-x86_64.tar.gz", "browser_download_url": "https://example.invalid/a"},
            {"name": "tool-darwin-arm64.tar.gz", "browser_download_url": "https://example.invalid/b"}
        ]
    }"#;

    const RELEASES: &str = r#"[
        {"tag_name": "nightly", "assets": []},
        {"tag_name": "eza-0.20.1", "assets": [{"name": "eza-0.20.1-aarch64-apple-darwin.tar.gz", "browser_download_url": "https://example.invalid/e"}]},
        {"tag_name": "eza-0.19.0", "assets": []}
    ]"#;

    fn client(server: &Server, token: Option<&str>) -> GithubClient {
        GithubClient::new(DownloadConfig {
            token: token.map(str::to_string),
            api_base: server.url(),
            ..DownloadConfig::default()
        })
    }

    #[test]
    fn test_normalize_token() {
        assert_eq!(normalize_token(Some("abc\n".to_string())), Some("abc".to_string()));
        assert_eq!(normalize_token(Some("  \n".to_string())), None);
        assert_eq!(normalize_token(None), None);
    }

    #[test]
    fn test_latest_release_sends_bearer_token() {
        let mut server = Server::new();
        let mock = server
            .mock("GET", "/repos/owner/tool/releases/latest")
            .match_header("authorization", "Bearer secret")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(LATEST)
            .create();

        let release = client(&server, Some("secret"))
            .latest_release("owner", "tool")
            .unwrap();
        mock.assert();
        assert_eq!(release.tag_name, "v2.0.0");
        assert_eq!(release.assets.len(), 2);
    }

    #[test]
    fn test_latest_release_without_token_omits_header() {
        let mut server = Server::new();
        let mock = server
            .mock("GET", "/repos/owner/tool/releases/latest")
            .match_header("authorization", mockito::Matcher::Missing)
            .with_status(200)
            .with_body(LATEST)
            .create();

        client(&server, None).latest_release("owner", "tool").unwrap();
        mock.assert();
    }

    #[test]
    fn test_release_matching_tag_pattern() {
        let mut server = Server::new();
        server
            .mock("GET", "/repos/cargo-bins/cargo-quickinstall/releases")
            .match_query(mockito::Matcher::Any)
            .with_status(200)
            .with_body(RELEASES)
            .create();

        let release = client(&server, None)
            .release("cargo-bins", "cargo-quickinstall", Some("eza"))
            .unwrap();
        assert_eq!(release.tag_name, "eza-0.20.1");
    }

    #[test]
    fn test_release_matching_no_match() {
        let mut server = Server::new();
        server
            .mock("GET", "/repos/o/r/releases")
            .match_query(mockito::Matcher::Any)
            .with_status(200)
            .with_body(RELEASES)
            .create();

        let err = client(&server, None)
            .release_matching("o", "r", "^ripgrep")
            .unwrap_err();
        assert!(matches!(err, InstallerError::ReleaseNotFound { .. }));
    }

    #[test]
    fn test_not_found_is_surfaced() {
        let mut server = Server::new();
        server
            .mock("GET", "/repos/o/missing/releases/latest")
            .with_status(404)
            .create();

        let err = client(&server, None).latest_release("o", "missing").unwrap_err();
        assert!(matches!(err, InstallerError::HttpStatus { status: 404, .. }));
        assert!(!is_retryable(&err));
    }

    #[test]
    fn test_server_error_is_retried() {
        let mut server = Server::new();
        let failing = server
            .mock("GET", "/repos/o/flaky/releases/latest")
            .with_status(502)
            .expect(3)
            .create();

        let client = GithubClient::new(DownloadConfig {
            api_base: server.url(),
            retry: RetryPolicy::new(3, Duration::ZERO),
            ..DownloadConfig::default()
        });
        let err = client.latest_release("o", "flaky").unwrap_err();
        failing.assert();
        assert!(matches!(err, InstallerError::HttpStatus { status: 502, .. }));
    }

    #[test]
    fn test_open_asset_streams_body() {
        let mut server = Server::new();
        server
            .mock("GET", "/download/tool")
            .match_header("accept", "application/octet-stream")
            .with_status(200)
            .with_body("binary-bytes")
            .create();

        let asset = Asset {
            name: "tool".to_string(),
            download_url: format!("{}/download/tool", server.url()),
        };
        let mut body = client(&server, None).open_asset(&asset).unwrap();
        let mut content = String::new();
        body.reader.read_to_string(&mut content).unwrap();
        assert_eq!(content, "binary-bytes");
        assert_eq!(body.len, Some(12));
    }
}
