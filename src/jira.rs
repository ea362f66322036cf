//! Avatar update against the issue tracker's REST API
//!
//! `PUT {base}/rest/api/2/user/avatar?username={user}` with a bearer token and
//! a `{"id": n}` body. Only 204 No Content counts as success.

use serde::Serialize;
use std::time::Duration;

use crate::config::{AvatarId, Config};
use crate::error::{Result, RotateError};

const AVATAR_PATH: &str = "/rest/api/2/user/avatar";
const STATUS_NO_CONTENT: u16 = 204;

/// Applies an avatar id to the remote profile
pub trait AvatarService {
    fn apply_avatar(&self, id: AvatarId) -> Result<()>;
}

#[derive(Debug, Serialize)]
struct AvatarSelection {
    id: AvatarId,
}

pub struct JiraClient {
    agent: ureq::Agent,
    base_url: String,
    username: String,
    access_token: String,
}

impl JiraClient {
    pub fn new(config: &Config) -> Self {
        let agent_config = ureq::Agent::config_builder()
            .timeout_global(Some(Duration::from_secs(config.timeout_secs)))
            // Status codes are interpreted here, not raised as transport errors
            .http_status_as_error(false)
            // Redirects come back as-is and count as rejections
            .max_redirects(0)
            .max_redirects_will_error(false)
            .build();

        Self {
            agent: ureq::Agent::new_with_config(agent_config),
            base_url: config.api_base().to_string(),
            username: config.username.clone(),
            access_token: config.access_token.clone(),
        }
    }

    /// Avatar resource without the query string
    pub fn avatar_url(&self) -> String {
        format!("{}{}", self.base_url, AVATAR_PATH)
    }
}

impl AvatarService for JiraClient {
    fn apply_avatar(&self, id: AvatarId) -> Result<()> {
        let url = self.avatar_url();
        let body = serde_json::to_string(&AvatarSelection { id }).map_err(|e| {
            RotateError::Configuration(format!("failed to encode avatar id {}: {}", id, e))
        })?;

        log::info!("Setting avatar {} for {} via {}", id, self.username, url);

        let mut response = self
            .agent
            .put(&url)
            .query("username", &self.username)
            .header("Authorization", &format!("Bearer {}", self.access_token))
            .header("Content-Type", "application/json")
            .send(body.as_bytes())
            .map_err(|source| RotateError::Transport {
                url: url.clone(),
                source,
            })?;

        let status = response.status().as_u16();
        if status != STATUS_NO_CONTENT {
            log::warn!("Avatar update rejected with HTTP {}", status);
            match response.body_mut().read_to_string() {
                Ok(detail) => log::debug!("Rejection body: {}", detail),
                Err(e) => log::debug!("Rejection body unreadable: {}", e),
            }
            return Err(RotateError::Rejected { status });
        }

        log::info!("Avatar {} accepted", id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{UsageOrder, test_config};
    use wiremock::matchers::{body_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(base_url: &str) -> JiraClient {
        let mut config = test_config(&[10, 20, 30], UsageOrder::Sequential);
        config.base_url = base_url.to_string();
        JiraClient::new(&config)
    }

    #[test]
    fn test_avatar_url_strips_trailing_slash() {
        let client = client_for("https://jira.example.com/");
        assert_eq!(client.avatar_url(), "https://jira.example.com/rest/api/2/user/avatar");
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_no_content_is_success() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/rest/api/2/user/avatar"))
            .and(query_param("username", "jdoe"))
            .and(header("Authorization", "Bearer secret-token"))
            .and(header("Content-Type", "application/json"))
            .and(body_json(serde_json::json!({"id": 20})))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server.uri());
        let result = tokio::task::spawn_blocking(move || client.apply_avatar(20))
            .await
            .unwrap();

        assert!(result.is_ok());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_forbidden_is_rejected_with_status() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .respond_with(ResponseTemplate::new(403).set_body_string("not allowed"))
            .mount(&server)
            .await;

        let client = client_for(&server.uri());
        let err = tokio::task::spawn_blocking(move || client.apply_avatar(10))
            .await
            .unwrap()
            .unwrap_err();

        assert!(matches!(err, RotateError::Rejected { status: 403 }));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_ok_with_body_is_still_rejected() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .respond_with(ResponseTemplate::new(200).set_body_string("{}"))
            .mount(&server)
            .await;

        let client = client_for(&server.uri());
        let err = tokio::task::spawn_blocking(move || client.apply_avatar(10))
            .await
            .unwrap()
            .unwrap_err();

        assert!(matches!(err, RotateError::Rejected { status: 200 }));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_redirect_is_rejected_not_followed() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/rest/api/2/user/avatar"))
            .respond_with(ResponseTemplate::new(302).insert_header("Location", "/login"))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(path("/login"))
            .respond_with(ResponseTemplate::new(204))
            .expect(0)
            .mount(&server)
            .await;

        let client = client_for(&server.uri());
        let err = tokio::task::spawn_blocking(move || client.apply_avatar(10))
            .await
            .unwrap()
            .unwrap_err();

        assert!(matches!(err, RotateError::Rejected { status: 302 }));
    }

    #[test]
    fn test_unreachable_service_is_transport_error() {
        // Nothing listens on port 1
        let client = client_for("http://127.0.0.1:1");
        let err = client.apply_avatar(10).unwrap_err();
        assert!(matches!(err, RotateError::Transport { .. }));
        assert_eq!(err.kind(), "TransportError");
    }
}
