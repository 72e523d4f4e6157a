//! GitHub Releases API client

use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use reqwest::{Client, Response, StatusCode, Url};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::GitHubConfig;
use crate::release::error::ReleaseError;

const GITHUB_ACCEPT: &str = "application/vnd.github.v3+json";

/// A GitHub release as returned by the Releases API
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Release {
    /// API URL of the release itself
    pub url: String,
    /// Upload URL template, e.g. `https://uploads.github.com/.../assets{?name,label}`
    pub upload_url: String,
    pub tag_name: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub assets: Vec<ReleaseAsset>,
}

/// A file attached to a release
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ReleaseAsset {
    pub id: u64,
    pub name: String,
    pub browser_download_url: String,
}

/// Request body for creating a release
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewRelease {
    pub tag_name: String,
    pub target_commitish: String,
    pub name: String,
    pub body: String,
    pub draft: bool,
    pub prerelease: bool,
}

/// Client for the GitHub Releases API of one repository owner
pub struct GitHubClient {
    client: Client,
    api_url: String,
}

impl GitHubClient {
    /// Creates a client authenticated with the configured token
    pub fn new(config: &GitHubConfig) -> Result<Self, ReleaseError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(GITHUB_ACCEPT));

        let mut token = HeaderValue::from_str(&format!("token {}", config.token))
            .map_err(|_| ReleaseError::Api {
                status: 0,
                body: "GitHub token contains invalid header characters".to_string(),
            })?;
        token.set_sensitive(true);
        headers.insert(AUTHORIZATION, token);

        let client = Client::builder()
            .user_agent(concat!("cicd-tools/", env!("CARGO_PKG_VERSION")))
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            api_url: config.api_url.clone(),
        })
    }

    /// Look up the release attached to a tag
    ///
    /// # Returns
    /// * `Ok(Some(Release))` - The release
    /// * `Ok(None)` - No release exists for the tag
    /// * `Err(ReleaseError)` - If the request fails
    pub async fn release_by_tag(
        &self,
        repo: &str,
        tag: &str,
    ) -> Result<Option<Release>, ReleaseError> {
        let url = format!("{}/repos/{}/releases/tags/{}", self.api_url, repo, tag);
        debug!("Fetching release: {}", url);

        let response = self.client.get(&url).send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        let response = check_status(response).await?;
        Ok(Some(response.json().await?))
    }

    /// Create a release
    pub async fn create_release(
        &self,
        repo: &str,
        release: &NewRelease,
    ) -> Result<Release, ReleaseError> {
        let url = format!("{}/repos/{}/releases", self.api_url, repo);
        debug!("Creating release {} at {}", release.tag_name, url);

        let response = self.client.post(&url).json(release).send().await?;
        let response = check_status(response).await?;

        Ok(response.json().await?)
    }

    /// Download the contents of a release asset
    pub async fn download_asset(&self, asset: &ReleaseAsset) -> Result<Vec<u8>, ReleaseError> {
        debug!("Downloading {}", asset.browser_download_url);

        let response = self.client.get(&asset.browser_download_url).send().await?;
        let response = check_status(response).await?;

        Ok(response.bytes().await?.to_vec())
    }

    /// Upload a file to a release
    pub async fn upload_asset(
        &self,
        release: &Release,
        name: &str,
        contents: Vec<u8>,
    ) -> Result<(), ReleaseError> {
        let upload_url = release
            .upload_url
            .split('{')
            .next()
            .unwrap_or(&release.upload_url);
        let url = Url::parse_with_params(upload_url, &[("name", name)]).map_err(|e| {
            ReleaseError::Api {
                status: 0,
                body: format!("invalid upload URL '{}': {}", upload_url, e),
            }
        })?;
        debug!("Uploading {} to {}", name, url);

        let response = self
            .client
            .post(url)
            .header(CONTENT_TYPE, "application/octet-stream")
            .body(contents)
            .send()
            .await?;
        check_status(response).await?;

        Ok(())
    }

    /// Delete an asset from a release
    pub async fn delete_asset(
        &self,
        repo: &str,
        asset: &ReleaseAsset,
    ) -> Result<(), ReleaseError> {
        let url = format!("{}/repos/{}/releases/assets/{}", self.api_url, repo, asset.id);
        debug!("Deleting asset {} ({})", asset.name, url);

        let response = self.client.delete(&url).send().await?;
        check_status(response).await?;

        Ok(())
    }

    /// Delete a release by its API URL
    pub async fn delete_release(&self, release: &Release) -> Result<(), ReleaseError> {
        debug!("Deleting release {}", release.url);

        let response = self.client.delete(&release.url).send().await?;
        check_status(response).await?;

        Ok(())
    }
}

/// Turn a 4xx/5xx response into an API error carrying the response body
async fn check_status(response: Response) -> Result<Response, ReleaseError> {
    let status = response.status();
    if !status.is_client_error() && !status.is_server_error() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    warn!("GitHub API returned status {}: {}", status, body);

    Err(ReleaseError::Api {
        status: status.as_u16(),
        body,
    })
}
