// API client module: a small blocking HTTP client for the Paperless-ngx REST
// API. Two pieces live here:
// - `CredentialVerifier` / `HttpVerifier`: the one-shot credential checks the
//   account store runs before it accepts a login.
// - `ApiClient`: authenticated calls made on behalf of an `Account` (documents,
//   tags, custom fields and the other objects a document references).

use reqwest::blocking::{Client, RequestBuilder, Response};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use crate::account::Account;
use crate::document::{CustomField, Document, DocumentPatch, NamedObject, Page};

const USER_AGENT: &str = concat!(
    "pngx-cli/",
    env!("CARGO_PKG_VERSION"),
    " (https://github.com/marcelbrueckner/paperless-ngx-cli)"
);

/// Header a reverse proxy uses to pass an already authenticated user
/// (`Remote-User`; header names are stored lowercase).
pub const REMOTE_USER_HEADER: &str = "remote-user";

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with a non-2xx status.
    #[error("{method} {url} failed: {status} - {body}")]
    Status {
        method: &'static str,
        url: String,
        status: StatusCode,
        body: String,
    },

    #[error("Invalid header value: {0}")]
    Header(#[from] reqwest::header::InvalidHeaderValue),

    #[error("Cannot decode response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },
}

impl ApiError {
    /// True when the server was reached and rejected the request.
    pub fn is_rejection(&self) -> bool {
        matches!(self, ApiError::Status { .. })
    }

    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Build the shared reqwest client with our user agent.
pub fn build_http_client() -> Result<Client, ApiError> {
    Ok(Client::builder().user_agent(USER_AGENT).build()?)
}

/// How a profile probe authenticates itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeAuth<'a> {
    None,
    RemoteUser(&'a str),
    Token(&'a str),
}

impl ProbeAuth<'_> {
    /// Header name and value to attach, if any.
    pub fn header(&self) -> Option<(&'static str, String)> {
        match self {
            ProbeAuth::None => None,
            ProbeAuth::RemoteUser(user) => Some((REMOTE_USER_HEADER, (*user).to_string())),
            ProbeAuth::Token(token) => Some((AUTHORIZATION.as_str(), token_header(token))),
        }
    }
}

fn token_header(token: &str) -> String {
    format!("Token {}", token)
}

/// Live credential checks, one blocking call each and no retries.
pub trait CredentialVerifier {
    /// Fetch the user profile of `host`, optionally authenticated.
    fn probe(&self, host: &str, auth: ProbeAuth<'_>) -> Result<(), ApiError>;

    /// Exchange a username and password for an API token.
    fn issue_token(&self, host: &str, user: &str, password: &str) -> Result<String, ApiError>;
}

/// `CredentialVerifier` talking to a real server.
pub struct HttpVerifier {
    client: Client,
}

#[derive(Deserialize)]
struct TokenResponse {
    token: String,
}

impl HttpVerifier {
    pub fn new() -> Result<Self, ApiError> {
        Ok(HttpVerifier {
            client: build_http_client()?,
        })
    }
}

impl CredentialVerifier for HttpVerifier {
    fn probe(&self, host: &str, auth: ProbeAuth<'_>) -> Result<(), ApiError> {
        let url = format!("{}/api/profile/", host);
        let mut req = self.client.get(&url);
        if let Some((name, value)) = auth.header() {
            req = req.header(name, value);
        }
        debug!(%url, "probing profile endpoint");
        check_status("GET", &url, req.send()?)?;
        Ok(())
    }

    fn issue_token(&self, host: &str, user: &str, password: &str) -> Result<String, ApiError> {
        let url = format!("{}/api/token/", host);
        debug!(%url, user, "requesting API token");
        let res = self
            .client
            .post(&url)
            .form(&[("username", user), ("password", password)])
            .send()?;
        let res = check_status("POST", &url, res)?;
        let body: TokenResponse = decode(&url, res)?;
        Ok(body.token)
    }
}

/// Turn a non-2xx response into `ApiError::Status`, keeping the body text.
fn check_status(method: &'static str, url: &str, res: Response) -> Result<Response, ApiError> {
    if res.status().is_success() {
        return Ok(res);
    }
    let status = res.status();
    let body = res.text().unwrap_or_default();
    Err(ApiError::Status {
        method,
        url: url.to_string(),
        status,
        body,
    })
}

fn decode<T: DeserializeOwned>(url: &str, res: Response) -> Result<T, ApiError> {
    let text = res.text()?;
    serde_json::from_str(&text).map_err(|source| ApiError::Decode {
        url: url.to_string(),
        source,
    })
}

/// API client bound to one account: holds the reqwest client, the base URL
/// of the server and the account's credentials.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    token: Option<String>,
    remote_user: Option<String>,
}

impl ApiClient {
    /// Create a client using the account's token, or its user through the
    /// remote user header when no token is stored.
    pub fn for_account(account: &Account) -> Result<Self, ApiError> {
        Ok(ApiClient {
            client: build_http_client()?,
            base_url: account.host.clone(),
            token: account.token.clone(),
            remote_user: account.user.clone(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Authentication headers for this account. A token wins over the
    /// remote user header; with neither, requests go out unauthenticated.
    pub fn auth_headers(&self) -> Result<HeaderMap, ApiError> {
        let mut headers = HeaderMap::new();
        if let Some(t) = &self.token {
            headers.insert(AUTHORIZATION, HeaderValue::from_str(&token_header(t))?);
        } else if let Some(user) = &self.remote_user {
            headers.insert(REMOTE_USER_HEADER, HeaderValue::from_str(user)?);
        }
        Ok(headers)
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api/{}", self.base_url, path)
    }

    fn send(&self, method: &'static str, url: &str, req: RequestBuilder) -> Result<Response, ApiError> {
        debug!(method, %url, "sending request");
        let res = req.headers(self.auth_headers()?).send()?;
        check_status(method, url, res)
    }

    fn get<T: DeserializeOwned>(&self, path: &str, query: &[(&str, String)]) -> Result<T, ApiError> {
        let url = self.url(path);
        let res = self.send("GET", &url, self.client.get(&url).query(query))?;
        decode(&url, res)
    }

    /// Fetch a document as the raw JSON the server returned.
    pub fn document_raw(&self, id: u64) -> Result<serde_json::Value, ApiError> {
        self.get(&format!("documents/{}/", id), &[])
    }

    /// Fetch a document, returning both the typed model and the raw JSON.
    pub fn document(&self, id: u64) -> Result<(Document, serde_json::Value), ApiError> {
        let raw = self.document_raw(id)?;
        let doc = serde_json::from_value(raw.clone()).map_err(|source| ApiError::Decode {
            url: self.url(&format!("documents/{}/", id)),
            source,
        })?;
        Ok((doc, raw))
    }

    /// Send only the fields present in `patch`.
    pub fn update_document(&self, id: u64, patch: &DocumentPatch) -> Result<(), ApiError> {
        let url = self.url(&format!("documents/{}/", id));
        self.send("PATCH", &url, self.client.patch(&url).json(patch))?;
        Ok(())
    }

    pub fn correspondent(&self, id: u64) -> Result<NamedObject, ApiError> {
        self.get(&format!("correspondents/{}/", id), &[])
    }

    pub fn document_type(&self, id: u64) -> Result<NamedObject, ApiError> {
        self.get(&format!("document_types/{}/", id), &[])
    }

    pub fn storage_path(&self, id: u64) -> Result<NamedObject, ApiError> {
        self.get(&format!("storage_paths/{}/", id), &[])
    }

    pub fn tag(&self, id: u64) -> Result<NamedObject, ApiError> {
        self.get(&format!("tags/{}/", id), &[])
    }

    pub fn custom_field(&self, id: u64) -> Result<CustomField, ApiError> {
        self.get(&format!("custom_fields/{}/", id), &[])
    }

    /// Tags whose id is in `ids`, in server order.
    pub fn tags_by_ids(&self, ids: &[u64]) -> Result<Vec<NamedObject>, ApiError> {
        self.list_by_ids("tags/", ids)
    }

    pub fn custom_fields_by_ids(&self, ids: &[u64]) -> Result<Vec<CustomField>, ApiError> {
        self.list_by_ids("custom_fields/", ids)
    }

    /// Case-insensitive exact name lookup.
    pub fn find_tag(&self, name: &str) -> Result<Option<NamedObject>, ApiError> {
        self.find_by_name("tags/", name)
    }

    pub fn find_custom_field(&self, name: &str) -> Result<Option<CustomField>, ApiError> {
        self.find_by_name("custom_fields/", name)
    }

    fn list_by_ids<T: DeserializeOwned>(&self, path: &str, ids: &[u64]) -> Result<Vec<T>, ApiError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let joined = ids.iter().map(u64::to_string).collect::<Vec<_>>().join(",");
        let page: Page<T> = self.get(
            path,
            &[("id__in", joined), ("page_size", ids.len().to_string())],
        )?;
        Ok(page.results)
    }

    fn find_by_name<T: DeserializeOwned>(&self, path: &str, name: &str) -> Result<Option<T>, ApiError> {
        let page: Page<T> = self.get(path, &[("name__iexact", name.to_string())])?;
        Ok(page.results.into_iter().next())
    }
}
