//! KLADR API client: endpoint selection, URL building and the
//! request/decode pipeline.

use std::sync::{Arc, OnceLock};

use crate::error::{Error, Result};
use crate::models::{ApiResult, FieldSearchParams, StringSearchParams};
use crate::transport::{HttpTransport, ReqwestTransport};

/// Endpoint served without an API token.
pub const FREE_API_URL: &str = "https://kladr-api.ru/api.php";

/// Endpoint served to token-holding accounts.
pub const PAID_API_URL: &str = "https://kladr-api.com/api.php";

/// Overrides applied on top of the endpoint defaults.
///
/// Fields left `None` keep their default; set fields win.
#[derive(Debug, Clone, Default)]
pub struct ClientConfig {
    /// Base URL of the API endpoint.
    pub url: Option<String>,
}

/// Result-window selection. `Default` asks for the first ten rows.
///
/// A `limit` of zero leaves paging entirely to the server: neither `limit`
/// nor `offset` is transmitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub limit: u32,
    pub offset: u32,
}

impl Page {
    pub fn new(limit: u32, offset: u32) -> Self {
        Self { limit, offset }
    }
}

impl Default for Page {
    fn default() -> Self {
        Self {
            limit: 10,
            offset: 0,
        }
    }
}

/// Client for the KLADR address-lookup API.
///
/// Construction fixes the tier (free or paid endpoint) and the token once;
/// per-call state lives on the stack, so one instance can serve concurrent
/// calls.
pub struct Client {
    token: Option<String>,
    url: String,
    transport: OnceLock<Arc<dyn HttpTransport>>,
}

impl Client {
    /// Create a client.
    ///
    /// Without a token (or with an empty one) requests go to the free
    /// endpoint and never carry a `token` parameter; with a token they go
    /// to the paid endpoint and carry it on every request. `config`
    /// overrides win over both defaults.
    pub fn new(token: Option<&str>, config: ClientConfig) -> Self {
        let token = token.filter(|t| !t.is_empty()).map(str::to_owned);
        let default_url = if token.is_some() {
            PAID_API_URL
        } else {
            FREE_API_URL
        };
        let url = config.url.unwrap_or_else(|| default_url.to_owned());

        Self {
            token,
            url,
            transport: OnceLock::new(),
        }
    }

    /// Create a client with an injected transport instead of the lazily
    /// built `reqwest` default.
    pub fn with_transport(
        token: Option<&str>,
        config: ClientConfig,
        transport: Arc<dyn HttpTransport>,
    ) -> Self {
        let client = Self::new(token, config);
        let _ = client.transport.set(transport);
        client
    }

    /// Base URL requests are issued against.
    pub fn base_url(&self) -> &str {
        &self.url
    }

    /// Whether this client attaches an API token to requests.
    pub fn has_token(&self) -> bool {
        self.token.is_some()
    }

    /// Free-text search across the concatenated address string.
    pub async fn query_string(
        &self,
        query: &str,
        params: &StringSearchParams,
        page: Page,
    ) -> Result<ApiResult> {
        let resolved = params.resolve()?;
        self.execute(query, resolved, page).await
    }

    /// Search scoped to the address field declared by `params.content_type`
    /// (forced to buildings when `params.zip` is set).
    pub async fn query_field(
        &self,
        query: &str,
        params: &FieldSearchParams,
        page: Page,
    ) -> Result<ApiResult> {
        let resolved = params.resolve()?;
        self.execute(query, resolved, page).await
    }

    async fn execute(
        &self,
        query: &str,
        mut params: Vec<(&'static str, String)>,
        page: Page,
    ) -> Result<ApiResult> {
        params.push(("query", query.trim().to_owned()));

        if page.limit > 0 {
            params.push(("limit", page.limit.to_string()));

            if page.offset > 0 {
                params.push(("offset", page.offset.to_string()));
            }
        }

        let url = self.build_url(&params);
        tracing::debug!(url = %url, "querying KLADR API");

        let response = self
            .transport()?
            .get(&url)
            .await
            .map_err(|e| Error::Transport(e.to_string()))?;
        tracing::debug!(status = response.status, "KLADR API responded");

        match response.status {
            400..=499 => return Err(Error::Client(response.reason_or_status())),
            500..=599 => return Err(Error::Server(response.reason_or_status())),
            _ => {}
        }

        Ok(serde_json::from_str(&response.body)?)
    }

    /// Default transport, built on first use. Concurrent first calls may
    /// race the construction; the first result wins and the rest are
    /// dropped.
    fn transport(&self) -> Result<&Arc<dyn HttpTransport>> {
        if let Some(transport) = self.transport.get() {
            return Ok(transport);
        }

        let transport = ReqwestTransport::new().map_err(|e| Error::Configuration(e.to_string()))?;

        Ok(self.transport.get_or_init(|| Arc::new(transport)))
    }

    fn build_url(&self, params: &[(&'static str, String)]) -> String {
        let mut pairs: Vec<String> = params
            .iter()
            .map(|(name, value)| format!("{}={}", name, urlencoding::encode(value)))
            .collect();

        if let Some(token) = &self.token {
            pairs.push(format!("token={}", urlencoding::encode(token)));
        }

        let separator = if self.url.contains('?') { '&' } else { '?' };

        format!("{}{}{}", self.url, separator, pairs.join("&"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ContentType, FieldSearchParams, StringSearchParams};
    use crate::transport::mock::MockTransport;

    fn mock_client(token: Option<&str>, url: &str) -> (Client, Arc<MockTransport>) {
        let transport = Arc::new(MockTransport::new());
        let client = Client::with_transport(
            token,
            ClientConfig {
                url: Some(url.to_owned()),
            },
            transport.clone(),
        );
        (client, transport)
    }

    #[test]
    fn test_client_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Client>();
    }

    #[test]
    fn test_tier_selection() {
        let free = Client::new(None, ClientConfig::default());
        assert_eq!(free.base_url(), FREE_API_URL);
        assert!(!free.has_token());

        let also_free = Client::new(Some(""), ClientConfig::default());
        assert_eq!(also_free.base_url(), FREE_API_URL);
        assert!(!also_free.has_token());

        let paid = Client::new(Some("sekret"), ClientConfig::default());
        assert_eq!(paid.base_url(), PAID_API_URL);
        assert!(paid.has_token());
    }

    #[test]
    fn test_config_url_overrides_tier_default() {
        let client = Client::new(
            Some("sekret"),
            ClientConfig {
                url: Some("https://proxy.local/kladr".to_owned()),
            },
        );
        assert_eq!(client.base_url(), "https://proxy.local/kladr");
    }

    #[test]
    fn test_build_url_insertion_order() {
        let client = Client::new(
            None,
            ClientConfig {
                url: Some("https://host/api.php".to_owned()),
            },
        );
        let url = client.build_url(&[
            ("query", "mos".to_owned()),
            ("limit", "5".to_owned()),
        ]);
        assert_eq!(url, "https://host/api.php?query=mos&limit=5");
    }

    #[test]
    fn test_build_url_joins_existing_query_string_with_ampersand() {
        let client = Client::new(
            None,
            ClientConfig {
                url: Some("https://host/api.php?format=json".to_owned()),
            },
        );
        let url = client.build_url(&[("query", "mos".to_owned())]);
        assert_eq!(url, "https://host/api.php?format=json&query=mos");
    }

    #[test]
    fn test_build_url_appends_token_last() {
        let client = Client::new(
            Some("sek ret"),
            ClientConfig {
                url: Some("https://host/api.php".to_owned()),
            },
        );
        let url = client.build_url(&[("query", "mos".to_owned())]);
        assert_eq!(url, "https://host/api.php?query=mos&token=sek%20ret");
    }

    #[tokio::test]
    async fn test_query_string_wire_format() {
        let (client, transport) = mock_client(None, "https://host/api.php");

        client
            .query_string("mos", &StringSearchParams::default(), Page::new(5, 0))
            .await
            .unwrap();

        let requests = transport.requests();
        assert_eq!(
            requests,
            ["https://host/api.php?oneString=1&query=mos&limit=5"]
        );
    }

    #[tokio::test]
    async fn test_query_text_is_trimmed_and_encoded() {
        let (client, transport) = mock_client(None, "https://host/api.php");

        client
            .query_string("  Москва  ", &StringSearchParams::default(), Page::default())
            .await
            .unwrap();

        let url = transport.requests().remove(0);
        assert!(url.contains("query=%D0%9C%D0%BE%D1%81%D0%BA%D0%B2%D0%B0&"));
        assert!(!url.contains("%20"));
    }

    #[tokio::test]
    async fn test_zero_limit_suppresses_pagination() {
        let (client, transport) = mock_client(None, "https://host/api.php");

        client
            .query_string("mos", &StringSearchParams::default(), Page::new(0, 7))
            .await
            .unwrap();

        let url = transport.requests().remove(0);
        assert!(!url.contains("limit="));
        assert!(!url.contains("offset="));
    }

    #[tokio::test]
    async fn test_offset_requires_limit() {
        let (client, transport) = mock_client(None, "https://host/api.php");

        client
            .query_string("mos", &StringSearchParams::default(), Page::new(10, 20))
            .await
            .unwrap();

        let url = transport.requests().remove(0);
        assert!(url.contains("limit=10&offset=20"));
    }

    #[tokio::test]
    async fn test_token_present_on_every_request() {
        let (client, transport) = mock_client(Some("sekret"), "https://host/api.php");

        client
            .query_string("mos", &StringSearchParams::default(), Page::default())
            .await
            .unwrap();
        client
            .query_field(
                "tver",
                &FieldSearchParams {
                    content_type: Some(ContentType::City),
                    ..Default::default()
                },
                Page::default(),
            )
            .await
            .unwrap();

        for url in transport.requests() {
            assert!(url.ends_with("&token=sekret"));
        }
    }

    #[tokio::test]
    async fn test_tokenless_request_has_no_token_param() {
        let (client, transport) = mock_client(None, "https://host/api.php");

        client
            .query_string("mos", &StringSearchParams::default(), Page::default())
            .await
            .unwrap();

        assert!(!transport.requests().remove(0).contains("token="));
    }

    #[tokio::test]
    async fn test_field_search_validation_fails_before_any_request() {
        let (client, transport) = mock_client(None, "https://host/api.php");

        let err = client
            .query_field("tver", &FieldSearchParams::default(), Page::default())
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Validation { key: "contentType", .. }));
        assert!(transport.requests().is_empty());
    }

    #[tokio::test]
    async fn test_4xx_maps_to_client_error() {
        let (client, transport) = mock_client(None, "https://host/api.php");
        transport.push_status(404, Some("Not Found"), "");

        let err = client
            .query_string("mos", &StringSearchParams::default(), Page::default())
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Client(ref reason) if reason.contains("Not Found")));
    }

    #[tokio::test]
    async fn test_5xx_maps_to_server_error() {
        let (client, transport) = mock_client(None, "https://host/api.php");
        transport.push_status(503, Some("Service Unavailable"), "");

        let err = client
            .query_string("mos", &StringSearchParams::default(), Page::default())
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Server(ref reason) if reason.contains("Service Unavailable")));
    }

    #[tokio::test]
    async fn test_transport_failure_maps_to_transport_error() {
        let (client, transport) = mock_client(None, "https://host/api.php");
        transport.push_error("connection refused");

        let err = client
            .query_string("mos", &StringSearchParams::default(), Page::default())
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Transport(ref message) if message.contains("connection refused")));
    }

    #[tokio::test]
    async fn test_malformed_body_maps_to_decode_error() {
        let (client, transport) = mock_client(None, "https://host/api.php");
        transport.push_status(200, Some("OK"), "searchContext: oops");

        let err = client
            .query_string("mos", &StringSearchParams::default(), Page::default())
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Decode(_)));
    }

    #[tokio::test]
    async fn test_successful_response_is_decoded() {
        let (client, transport) = mock_client(None, "https://host/api.php");
        transport.push_status(
            200,
            Some("OK"),
            r#"{"searchContext":{"oneString":1},"result":[{"id":"7700000000000","name":"Москва"}]}"#,
        );

        let found = client
            .query_string("mos", &StringSearchParams::default(), Page::default())
            .await
            .unwrap();

        assert_eq!(found["result"][0]["id"].as_str(), Some("7700000000000"));
        assert_eq!(found["result"][0]["name"].as_str(), Some("Москва"));
    }

    #[tokio::test]
    async fn test_decode_preserves_key_order_and_big_integers() {
        let (client, transport) = mock_client(None, "https://host/api.php");
        transport.push_status(
            200,
            Some("OK"),
            r#"{"zip":101000,"id":184467440737095516161,"name":"x"}"#,
        );

        let found = client
            .query_string("mos", &StringSearchParams::default(), Page::default())
            .await
            .unwrap();

        assert_eq!(found["id"].to_string(), "184467440737095516161");
        let keys: Vec<&str> = found.as_object().unwrap().keys().map(String::as_str).collect();
        assert_eq!(keys, ["zip", "id", "name"]);
    }

    #[test]
    fn test_page_default_window() {
        assert_eq!(Page::default(), Page::new(10, 0));
    }
}
