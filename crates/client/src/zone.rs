use cfzone_core::{Action, ActionRequest, Credentials, Error, Result, SecurityLevel, Settings, ZoneId};
use serde::Serialize;
use serde_json::Value;

use crate::transport::{ApiRequest, HttpTransport, Method, Transport};

/// `POST /zones/{id}/purge_cache` payload
#[derive(Debug, Serialize)]
struct PurgeCacheRequest {
    purge_everything: bool,
}

/// `PATCH /zones/{id}/settings/*` payload
#[derive(Debug, Serialize)]
struct SettingValue<'a> {
    value: &'a str,
}

/// Client for per-zone administrative calls
pub struct ZoneClient<T = HttpTransport> {
    credentials: Credentials,
    base_url: String,
    transport: T,
}

impl ZoneClient<HttpTransport> {
    /// Create a client backed by reqwest
    pub fn new(settings: &Settings) -> Result<Self> {
        Ok(Self::with_transport(
            settings.credentials.clone(),
            &settings.api_url,
            HttpTransport::new()?,
        ))
    }
}

impl<T: Transport> ZoneClient<T> {
    pub fn with_transport(credentials: Credentials, base_url: &str, transport: T) -> Self {
        Self {
            credentials,
            base_url: base_url.trim_end_matches('/').to_string(),
            transport,
        }
    }

    fn build_request(&self, method: Method, path: &str, body: Option<String>) -> ApiRequest {
        ApiRequest {
            method,
            url: format!("{}{}", self.base_url, path),
            headers: vec![
                ("X-Auth-Email", self.credentials.email.clone()),
                ("X-Auth-Key", self.credentials.api_key.clone()),
                ("Content-Type", "application/json".to_string()),
            ],
            body,
        }
    }

    /// Look up the zone id for `domain`.
    ///
    /// Returns `Ok(None)` when the provider lists no matching zone. Only
    /// `result[0].id` is read from the response.
    pub async fn resolve_zone_id(&self, domain: &str) -> Result<Option<ZoneId>> {
        let request = self.build_request(Method::Get, &format!("/zones?name={}", domain), None);
        let body = self.transport.send(request).await?;

        let response: Value =
            serde_json::from_str(&body).map_err(|e| Error::Decode(e.to_string()))?;

        let zone_id = response
            .get("result")
            .and_then(|r| r.get(0))
            .and_then(|zone| zone.get("id"))
            .and_then(|id| id.as_str())
            .filter(|id| !id.is_empty())
            .map(ZoneId::new);

        if zone_id.is_none() {
            if let Some(message) = response
                .get("errors")
                .and_then(|e| e.get(0))
                .and_then(|e| e.get("message"))
                .and_then(|m| m.as_str())
            {
                tracing::warn!("Zone lookup for {} reported: {}", domain, message);
            }
        }

        Ok(zone_id)
    }

    async fn require_zone_id(&self, domain: &str) -> Result<ZoneId> {
        let zone_id = self
            .resolve_zone_id(domain)
            .await?
            .ok_or_else(|| Error::ZoneNotFound(domain.to_string()))?;
        tracing::debug!("Resolved {} to zone {}", domain, zone_id);
        Ok(zone_id)
    }

    /// Purge everything cached for the zone; returns the raw response body
    pub async fn purge_cache(&self, domain: &str) -> Result<String> {
        let zone_id = self.require_zone_id(domain).await?;

        let payload = serde_json::to_string(&PurgeCacheRequest {
            purge_everything: true,
        })
        .map_err(|e| Error::Marshal(e.to_string()))?;

        let path = format!("/zones/{}/purge_cache", zone_id);
        self.transport
            .send(self.build_request(Method::Post, &path, Some(payload)))
            .await
    }

    /// Set development mode; `mode` is sent as-is
    pub async fn set_development_mode(&self, domain: &str, mode: &str) -> Result<String> {
        let zone_id = self.require_zone_id(domain).await?;
        self.patch_setting(&zone_id, "development_mode", mode).await
    }

    pub async fn set_security_level(&self, domain: &str, level: SecurityLevel) -> Result<String> {
        let zone_id = self.require_zone_id(domain).await?;
        self.patch_setting(&zone_id, "security_level", level.as_api_value())
            .await
    }

    async fn patch_setting(&self, zone_id: &ZoneId, setting: &str, value: &str) -> Result<String> {
        let payload = serde_json::to_string(&SettingValue { value })
            .map_err(|e| Error::Marshal(e.to_string()))?;

        let path = format!("/zones/{}/settings/{}", zone_id, setting);
        self.transport
            .send(self.build_request(Method::Patch, &path, Some(payload)))
            .await
    }

    /// Run one action against its domain.
    ///
    /// Security level tokens are validated before any request is sent.
    pub async fn execute(&self, request: &ActionRequest) -> Result<String> {
        match &request.action {
            Action::PurgeCache => self.purge_cache(&request.domain).await,
            Action::SetSecurityLevel(token) => {
                let level: SecurityLevel = token.parse()?;
                self.set_security_level(&request.domain, level).await
            }
            Action::SetDevelopmentMode(mode) => {
                self.set_development_mode(&request.domain, mode).await
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Records every request and replies from a queue of canned bodies
    #[derive(Default)]
    struct RecordingTransport {
        sent: Mutex<Vec<ApiRequest>>,
        replies: Mutex<VecDeque<Result<String>>>,
    }

    impl RecordingTransport {
        fn replying(replies: Vec<Result<String>>) -> Self {
            Self {
                sent: Mutex::new(Vec::new()),
                replies: Mutex::new(replies.into()),
            }
        }

        fn sent(&self) -> Vec<ApiRequest> {
            self.sent.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Transport for RecordingTransport {
        async fn send(&self, request: ApiRequest) -> Result<String> {
            self.sent.lock().unwrap().push(request);
            self.replies
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(Error::Transport("no canned reply left".to_string())))
        }
    }

    const BASE: &str = "https://api.cloudflare.com/client/v4";
    const ZONE_ABC: &str = r#"{"success":true,"errors":[],"result":[{"id":"abc123","name":"example.com"}]}"#;

    fn client(replies: Vec<Result<String>>) -> ZoneClient<RecordingTransport> {
        ZoneClient::with_transport(
            Credentials::new("ops@example.com", "secret-key"),
            BASE,
            RecordingTransport::replying(replies),
        )
    }

    fn assert_auth_headers(request: &ApiRequest) {
        assert_eq!(request.header("X-Auth-Email"), Some("ops@example.com"));
        assert_eq!(request.header("X-Auth-Key"), Some("secret-key"));
        assert_eq!(request.header("Content-Type"), Some("application/json"));
    }

    #[tokio::test]
    async fn test_resolve_zone_id_issues_one_authenticated_get() {
        for domain in ["example.com", "sub.example.org", "xn--bcher-kva.example"] {
            let client = client(vec![Ok(r#"{"result":[{"id":"zid-1"}]}"#.to_string())]);
            client.resolve_zone_id(domain).await.unwrap();

            let sent = client.transport.sent();
            assert_eq!(sent.len(), 1);
            assert_eq!(sent[0].method, Method::Get);
            assert_eq!(sent[0].url, format!("{}/zones?name={}", BASE, domain));
            assert_eq!(sent[0].body, None);
            assert_auth_headers(&sent[0]);
        }
    }

    #[tokio::test]
    async fn test_resolve_zone_id_returns_first_result() {
        let client = client(vec![Ok(
            r#"{"result":[{"id":"zid-1"},{"id":"zid-2"}]}"#.to_string()
        )]);
        let zone_id = client.resolve_zone_id("example.com").await.unwrap();
        assert_eq!(zone_id, Some(ZoneId::new("zid-1")));
    }

    #[tokio::test]
    async fn test_resolve_zone_id_empty_result_is_not_an_error() {
        let client = client(vec![Ok(r#"{"result":[]}"#.to_string())]);
        let zone_id = client.resolve_zone_id("example.com").await.unwrap();
        assert_eq!(zone_id, None);
    }

    #[tokio::test]
    async fn test_resolve_zone_id_api_error_yields_none() {
        let body = r#"{"success":false,"errors":[{"code":9103,"message":"Unknown X-Auth-Key or X-Auth-Email"}],"result":null}"#;
        let client = client(vec![Ok(body.to_string())]);
        let zone_id = client.resolve_zone_id("example.com").await.unwrap();
        assert_eq!(zone_id, None);
    }

    #[tokio::test]
    async fn test_resolve_zone_id_non_json_is_decode_error() {
        let client = client(vec![Ok("<html>bad gateway</html>".to_string())]);
        let err = client.resolve_zone_id("example.com").await.unwrap_err();
        assert!(matches!(err, Error::Decode(_)));
    }

    #[tokio::test]
    async fn test_purge_cache_posts_purge_everything() {
        let client = client(vec![
            Ok(ZONE_ABC.to_string()),
            Ok(r#"{"success":true,"result":{"id":"abc123"}}"#.to_string()),
        ]);

        let body = client.purge_cache("example.com").await.unwrap();
        assert_eq!(body, r#"{"success":true,"result":{"id":"abc123"}}"#);

        let sent = client.transport.sent();
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[1].method, Method::Post);
        assert_eq!(sent[1].url, format!("{}/zones/abc123/purge_cache", BASE));
        assert_eq!(sent[1].body.as_deref(), Some(r#"{"purge_everything":true}"#));
        assert_auth_headers(&sent[1]);
    }

    #[tokio::test]
    async fn test_set_development_mode_patches_value() {
        let client = client(vec![Ok(ZONE_ABC.to_string()), Ok("{}".to_string())]);

        client
            .set_development_mode("example.com", "on")
            .await
            .unwrap();

        let sent = client.transport.sent();
        assert_eq!(sent[1].method, Method::Patch);
        assert_eq!(
            sent[1].url,
            format!("{}/zones/abc123/settings/development_mode", BASE)
        );
        assert_eq!(sent[1].body.as_deref(), Some(r#"{"value":"on"}"#));
        assert_auth_headers(&sent[1]);
    }

    #[tokio::test]
    async fn test_set_development_mode_passes_value_through() {
        let client = client(vec![Ok(ZONE_ABC.to_string()), Ok("{}".to_string())]);
        client
            .set_development_mode("example.com", "maybe")
            .await
            .unwrap();
        assert_eq!(
            client.transport.sent()[1].body.as_deref(),
            Some(r#"{"value":"maybe"}"#)
        );
    }

    #[tokio::test]
    async fn test_set_security_level_sends_provider_token() {
        let client = client(vec![Ok(ZONE_ABC.to_string()), Ok("{}".to_string())]);

        client
            .set_security_level("example.com", SecurityLevel::UnderAttack)
            .await
            .unwrap();

        let sent = client.transport.sent();
        assert_eq!(sent[1].method, Method::Patch);
        assert_eq!(
            sent[1].url,
            format!("{}/zones/abc123/settings/security_level", BASE)
        );
        assert_eq!(sent[1].body.as_deref(), Some(r#"{"value":"under_attack"}"#));
    }

    #[tokio::test]
    async fn test_execute_maps_attack_token() {
        let client = client(vec![Ok(ZONE_ABC.to_string()), Ok("{}".to_string())]);
        let request = ActionRequest {
            action: Action::SetSecurityLevel("attack".to_string()),
            domain: "example.com".to_string(),
        };

        client.execute(&request).await.unwrap();
        assert_eq!(
            client.transport.sent()[1].body.as_deref(),
            Some(r#"{"value":"under_attack"}"#)
        );
    }

    #[tokio::test]
    async fn test_execute_bogus_security_level_sends_nothing() {
        let client = client(vec![Ok(ZONE_ABC.to_string())]);
        let request = ActionRequest {
            action: Action::SetSecurityLevel("bogus".to_string()),
            domain: "example.com".to_string(),
        };

        let err = client.execute(&request).await.unwrap_err();
        assert!(matches!(err, Error::InvalidSecurityLevel(_)));
        assert!(client.transport.sent().is_empty());
    }

    #[tokio::test]
    async fn test_missing_zone_stops_before_action_request() {
        let client = client(vec![Ok(r#"{"result":[]}"#.to_string())]);

        let err = client.purge_cache("missing.example").await.unwrap_err();
        assert!(matches!(err, Error::ZoneNotFound(ref d) if d == "missing.example"));
        assert_eq!(client.transport.sent().len(), 1);
    }

    #[tokio::test]
    async fn test_lookup_transport_error_propagates() {
        let client = client(vec![Err(Error::Transport("connection refused".to_string()))]);

        let err = client
            .set_development_mode("example.com", "off")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Transport(_)));
        assert_eq!(client.transport.sent().len(), 1);
    }

    #[tokio::test]
    async fn test_action_body_read_error_propagates() {
        let client = client(vec![
            Ok(ZONE_ABC.to_string()),
            Err(Error::BodyRead("connection reset".to_string())),
        ]);

        let err = client.purge_cache("example.com").await.unwrap_err();
        assert!(matches!(err, Error::BodyRead(_)));
    }

    #[test]
    fn test_trailing_slash_on_base_url_is_trimmed() {
        let client = ZoneClient::with_transport(
            Credentials::new("a", "b"),
            "http://localhost:8080/client/v4/",
            RecordingTransport::default(),
        );
        let request = client.build_request(Method::Get, "/zones?name=x", None);
        assert_eq!(request.url, "http://localhost:8080/client/v4/zones?name=x");
    }
}
