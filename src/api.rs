// API client module: a small blocking HTTP client that talks to the mist
// REST service. Every call goes through `ApiClient::send`, which attaches the
// API token and turns non-2xx answers into `MistError`s.

use std::fmt;
use std::str::FromStr;

use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};
use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, InvalidHeaderValue, AUTHORIZATION};
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::error::MistError;

/// Characters that cannot appear raw inside a single path segment.
const SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// Percent-encode one path segment (an id or a name) so it cannot split
/// the path or start a query.
pub fn segment(raw: &str) -> String {
    utf8_percent_encode(raw, SEGMENT).to_string()
}

/// How the API token is attached to outbound requests.
#[derive(Clone, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum AuthScheme {
    /// `Authorization: Bearer <token>`
    #[default]
    Bearer,
    /// `<header>: <token>`
    Header(String),
    /// `?<param>=<token>`
    Query(String),
}

impl FromStr for AuthScheme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("bearer") {
            return Ok(AuthScheme::Bearer);
        }
        match s.split_once(':') {
            Some(("header", name)) if !name.trim().is_empty() => {
                Ok(AuthScheme::Header(name.trim().to_string()))
            }
            Some(("query", param)) if !param.trim().is_empty() => {
                Ok(AuthScheme::Query(param.trim().to_string()))
            }
            _ => Err(format!(
                "unknown auth scheme '{}' (expected bearer, header:<name> or query:<param>)",
                s
            )),
        }
    }
}

impl TryFrom<String> for AuthScheme {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<AuthScheme> for String {
    fn from(scheme: AuthScheme) -> Self {
        scheme.to_string()
    }
}

impl fmt::Display for AuthScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthScheme::Bearer => write!(f, "bearer"),
            AuthScheme::Header(name) => write!(f, "header:{}", name),
            AuthScheme::Query(param) => write!(f, "query:{}", param),
        }
    }
}

/// Holds a reqwest blocking client, the base URL of the service and the
/// API token obtained at login. Cloning is cheap: the underlying connection
/// pool is shared, and the token never changes after it is set.
#[derive(Clone, Debug)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    token: Option<String>,
    scheme: AuthScheme,
}

/// Status plus the raw body of a completed call.
#[derive(Debug)]
pub struct ApiResponse {
    status: StatusCode,
    body: String,
}

impl ApiResponse {
    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn text(&self) -> &str {
        &self.body
    }

    /// Decode the body as JSON. Fails with `MistError::Parse` when the body
    /// is not valid JSON or does not fit `T`.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, MistError> {
        Ok(serde_json::from_str(&self.body)?)
    }
}

impl ApiClient {
    /// Create an unauthenticated client for `base_url`.
    pub fn new(base_url: &str, scheme: AuthScheme) -> Result<Self, MistError> {
        let client = Client::builder().build()?;
        Ok(ApiClient {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: None,
            scheme,
        })
    }

    /// Copy of this client that attaches `token` to every request.
    pub fn with_token(&self, token: &str) -> Self {
        ApiClient {
            token: Some(token.to_string()),
            ..self.clone()
        }
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn auth_headers(&self) -> Result<HeaderMap, MistError> {
        let mut headers = HeaderMap::new();
        let Some(t) = &self.token else {
            return Ok(headers);
        };
        let invalid =
            |_: InvalidHeaderValue| MistError::Auth("token is not a valid header value".into());
        match &self.scheme {
            AuthScheme::Bearer => {
                let val = format!("Bearer {}", t);
                headers.insert(AUTHORIZATION, HeaderValue::from_str(&val).map_err(invalid)?);
            }
            AuthScheme::Header(name) => {
                let name = HeaderName::from_bytes(name.as_bytes())
                    .map_err(|_| MistError::Auth(format!("invalid auth header name '{}'", name)))?;
                headers.insert(name, HeaderValue::from_str(t).map_err(invalid)?);
            }
            AuthScheme::Query(_) => {}
        }
        Ok(headers)
    }

    pub fn get(&self, path: &str) -> Result<ApiResponse, MistError> {
        self.send(Method::GET, path, None)
    }

    /// GET carrying a JSON body, used by endpoints that filter on a payload.
    pub fn get_with(&self, path: &str, body: &Value) -> Result<ApiResponse, MistError> {
        self.send(Method::GET, path, Some(body))
    }

    pub fn post(&self, path: &str, body: Option<&Value>) -> Result<ApiResponse, MistError> {
        self.send(Method::POST, path, body)
    }

    pub fn put(&self, path: &str, body: Option<&Value>) -> Result<ApiResponse, MistError> {
        self.send(Method::PUT, path, body)
    }

    pub fn delete(&self, path: &str) -> Result<ApiResponse, MistError> {
        self.send(Method::DELETE, path, None)
    }

    /// Perform the call and return whatever the server answered, without
    /// looking at the status.
    pub fn execute(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
    ) -> Result<ApiResponse, MistError> {
        let url = self.url(path);
        debug!(%method, %url, "sending request");

        let mut req = self
            .client
            .request(method, &url)
            .headers(self.auth_headers()?);
        if let (AuthScheme::Query(param), Some(t)) = (&self.scheme, &self.token) {
            req = req.query(&[(param.as_str(), t.as_str())]);
        }
        if let Some(body) = body {
            req = req.json(body);
        }

        let res = req.send()?;
        let status = res.status();
        let body = res.text()?;
        debug!(%status, bytes = body.len(), "received response");
        Ok(ApiResponse { status, body })
    }

    /// Like `execute`, but 401/403 become `Auth` errors and any other
    /// non-2xx status becomes a `Server` error.
    pub fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
    ) -> Result<ApiResponse, MistError> {
        let res = self.execute(method, path, body)?;
        let status = res.status();
        if status.is_success() {
            return Ok(res);
        }
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(MistError::Auth(format!("{} - {}", status, res.body)));
        }
        Err(MistError::Server {
            status: status.as_u16(),
            body: res.body,
        })
    }
}
