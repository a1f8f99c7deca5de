use crate::config::{API_KEY_VAR, SERVER_URL_VAR, Settings};
use crate::error::{SyncError, SyncResult};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::debug;

/// The slice of the Authentik Core API this crate consumes.
#[async_trait]
pub trait GroupApi: Send + Sync {
    /// First page of groups whose name matches `name` exactly, with their
    /// member objects embedded.
    async fn list_groups(&self, name: &str) -> SyncResult<GroupList>;
}

#[derive(Debug, Clone, Deserialize)]
pub struct GroupList {
    pub pagination: Pagination,
    pub results: Vec<AuthentikGroup>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct Pagination {
    pub count: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthentikGroup {
    pub pk: String,
    pub name: String,
    #[serde(default)]
    pub users_obj: Vec<AuthentikUser>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthentikUser {
    pub pk: i64,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    /// Authentik allows nested mappings here, addressed by dot-delimited
    /// attribute paths.
    #[serde(default)]
    pub attributes: Map<String, Value>,
}

#[derive(Debug)]
pub struct AuthentikClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl AuthentikClient {
    /// Builds a client rooted at `<server_url>/api/v3` using the API key as a
    /// bearer credential. Performs no network I/O; invalid credentials only
    /// surface on the first request.
    pub fn new(settings: &Settings) -> SyncResult<Self> {
        if settings.server_url.is_empty() {
            return Err(SyncError::missing_var(SERVER_URL_VAR));
        }
        if settings.api_key.is_empty() {
            return Err(SyncError::missing_var(API_KEY_VAR));
        }

        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .map_err(SyncError::Http)?;

        Ok(Self {
            client,
            base_url: format!("{}/api/v3", settings.server_url.trim_end_matches('/')),
            api_key: settings.api_key.clone(),
        })
    }

    async fn get<T: for<'de> Deserialize<'de>>(&self, path: &str) -> SyncResult<T> {
        let url = format!("{}{}", self.base_url, path);
        debug!(url = %url, "Making Authentik API request");

        let response = self
            .client
            .get(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Accept", "application/json")
            .send()
            .await?;

        match response.status() {
            StatusCode::OK => Ok(response.json::<T>().await?),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(SyncError::Authentication(
                "Invalid Authentik API token".to_string(),
            )),
            status => {
                let body = response.text().await.unwrap_or_default();
                Err(SyncError::Api {
                    status: status.as_u16(),
                    message: body,
                })
            }
        }
    }
}

#[async_trait]
impl GroupApi for AuthentikClient {
    async fn list_groups(&self, name: &str) -> SyncResult<GroupList> {
        let path = format!("/core/groups/?name={}", urlencoding::encode(name));
        self.get(&path).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(server_url: &str, api_key: &str) -> Settings {
        Settings {
            server_url: server_url.to_string(),
            api_key: api_key.to_string(),
            username_attribute: None,
            emu_shortcode: None,
        }
    }

    #[test]
    fn test_construction_requires_server_url() {
        let err = AuthentikClient::new(&settings("", "token")).unwrap_err();
        assert!(matches!(err, SyncError::Config(_)));
        assert!(err.to_string().contains("AUTHENTIK_SERVER_URL"));
    }

    #[test]
    fn test_construction_requires_api_key() {
        let err = AuthentikClient::new(&settings("https://auth.example.com", "")).unwrap_err();
        assert!(matches!(err, SyncError::Config(_)));
        assert!(err.to_string().contains("AUTHENTIK_API_KEY"));
    }

    #[test]
    fn test_construction_does_no_io() {
        // A well-formed but unreachable server and a bogus token must not
        // fail until the first request.
        let client =
            AuthentikClient::new(&settings("https://nonexistent.invalid", "bogus")).unwrap();
        assert_eq!(client.base_url, "https://nonexistent.invalid/api/v3");
    }

    #[test]
    fn test_trailing_slash_is_normalized() {
        let client = AuthentikClient::new(&settings("https://auth.example.com/", "t")).unwrap();
        assert_eq!(client.base_url, "https://auth.example.com/api/v3");
    }
}
