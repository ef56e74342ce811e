// Meshery server HTTP client
//
// Wraps `reqwest::Client` with server URL construction, provider-token
// auth, and response status mapping. Endpoint methods live in `system.rs`
// as inherent methods so this module stays focused on transport mechanics.

use reqwest::header::{COOKIE, HeaderMap, HeaderValue};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::error::Error;
use crate::transport::TransportConfig;

/// Raw HTTP client for a Meshery server.
///
/// All methods return decoded payloads; non-success statuses are mapped to
/// [`Error`] before the caller sees the response.
#[derive(Debug, Clone)]
pub struct MesheryClient {
    http: reqwest::Client,
    base_url: Url,
    token: Option<SecretString>,
}

impl MesheryClient {
    /// Create a client from a `TransportConfig`.
    ///
    /// `base_url` is the server root (e.g. `http://localhost:9081`). When a
    /// provider token is given it is sent as the `token` cookie on every
    /// request, and on the operator-events WebSocket upgrade.
    pub fn new(
        base_url: Url,
        token: Option<SecretString>,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        let mut headers = HeaderMap::new();
        if let Some(cookie) = token.as_ref().map(cookie_value) {
            let mut value = HeaderValue::from_str(&cookie).map_err(|e| Error::Authentication {
                message: format!("token is not a valid header value: {e}"),
            })?;
            value.set_sensitive(true);
            headers.insert(COOKIE, value);
        }
        let http = transport.build_client_with_headers(headers)?;
        Ok(Self {
            http,
            base_url,
            token,
        })
    }

    /// Create a client around a pre-built `reqwest::Client`.
    pub fn with_client(http: reqwest::Client, base_url: Url) -> Self {
        Self {
            http,
            base_url,
            token: None,
        }
    }

    /// The server base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// `Cookie` header value for the provider token, if one is configured.
    pub fn cookie_header(&self) -> Option<String> {
        self.token.as_ref().map(cookie_value)
    }

    // ── URL builders ─────────────────────────────────────────────────

    /// Build a full URL for a server API path: `{base}/api/{path}`.
    pub(crate) fn api_url(&self, path: &str) -> Result<Url, Error> {
        let base = self.base_url.as_str().trim_end_matches('/');
        Ok(Url::parse(&format!("{base}/api/{path}"))?)
    }

    /// WebSocket URL for the operator-events stream.
    ///
    /// Mirrors the server scheme: `https` → `wss`, anything else → `ws`.
    pub fn operator_events_url(&self) -> Result<Url, Error> {
        let scheme = if self.base_url.scheme() == "https" {
            "wss"
        } else {
            "ws"
        };
        let host = self
            .base_url
            .host_str()
            .ok_or_else(|| Error::InvalidUrl(url::ParseError::EmptyHost))?;
        let prefix = self.base_url.path().trim_end_matches('/');
        let full = match self.base_url.port() {
            Some(p) => format!("{scheme}://{host}:{p}{prefix}/api/system/operator/events"),
            None => format!("{scheme}://{host}{prefix}/api/system/operator/events"),
        };
        Ok(Url::parse(&full)?)
    }

    // ── Request helpers ──────────────────────────────────────────────

    /// Send a GET request and decode the JSON body.
    pub(crate) async fn get<T: DeserializeOwned>(&self, url: Url) -> Result<T, Error> {
        debug!("GET {}", url);

        let resp = self.http.get(url).send().await?;

        parse_response(resp).await
    }

    /// Send a POST request with JSON body and decode the JSON response.
    pub(crate) async fn post<T: DeserializeOwned>(
        &self,
        url: Url,
        body: &(impl Serialize + Sync),
    ) -> Result<T, Error> {
        debug!("POST {}", url);

        let resp = self.http.post(url).json(body).send().await?;

        parse_response(resp).await
    }
}

fn cookie_value(token: &SecretString) -> String {
    format!("token={}", token.expose_secret())
}

/// Map the HTTP status and decode the body.
///
/// 401 becomes [`Error::Authentication`]; 403 and other non-success
/// statuses become [`Error::Api`] with a short body preview.
async fn parse_response<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, Error> {
    let status = resp.status();

    if status == reqwest::StatusCode::UNAUTHORIZED {
        return Err(Error::Authentication {
            message: "token expired or invalid".into(),
        });
    }

    if status == reqwest::StatusCode::FORBIDDEN {
        return Err(Error::Api {
            status: status.as_u16(),
            message: "insufficient permissions (HTTP 403)".into(),
        });
    }

    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        return Err(Error::Api {
            status: status.as_u16(),
            message: preview(&body).to_owned(),
        });
    }

    let body = resp.text().await?;

    serde_json::from_str(&body).map_err(|e| Error::Deserialization {
        message: format!("{e} (body preview: {:?})", preview(&body)),
        body: body.clone(),
    })
}

/// First 200 bytes of a body, cut on a char boundary.
fn preview(body: &str) -> &str {
    let mut end = body.len().min(200);
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    &body[..end]
}
