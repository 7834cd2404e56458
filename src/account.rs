// Account value object: one named set of server credentials.
// Also hosts the two input checks shared by the store and the CLI parser:
// host normalisation and alias validation.

use std::fmt;

use url::Url;

use crate::error::ValidationError;

/// Alias of the session-only account built from command-line credentials.
/// It can be looked up and selected but is never written to disk.
pub const ADHOC_ALIAS: &str = "__adhoc__";

/// Alias used by `auth login` when none is given.
pub const DEFAULT_ALIAS: &str = "default";

/// Keys of `[accounts]` that hold settings rather than accounts.
pub const RESERVED_ALIASES: &[&str] = &["current"];

/// Credentials for one Paperless-ngx server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    pub host: String,
    pub user: Option<String>,
    pub token: Option<String>,
    pub alias: String,
}

impl Account {
    pub fn new(host: impl Into<String>, alias: impl Into<String>) -> Self {
        Account {
            host: host.into(),
            user: None,
            token: None,
            alias: alias.into(),
        }
    }

    pub fn with_user(mut self, user: impl Into<String>) -> Self {
        self.user = Some(user.into());
        self
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Whether this is the transient `__adhoc__` account.
    pub fn is_adhoc(&self) -> bool {
        self.alias == ADHOC_ALIAS
    }

    /// Apply a verified login on top of an existing account. The host is
    /// always replaced; user and token only when a new value is supplied.
    pub(crate) fn update(&mut self, host: String, user: Option<String>, token: Option<String>) {
        self.host = host;
        if let Some(user) = user {
            self.user = Some(user);
        }
        if let Some(token) = token {
            self.token = Some(token);
        }
    }
}

impl fmt::Display for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.user {
            Some(user) => write!(f, "{}@{} ({})", user, self.host, self.alias),
            None => write!(f, "{} ({})", self.host, self.alias),
        }
    }
}

/// Normalise a user supplied host: strip trailing slashes, default to
/// `https://` when no scheme is given, then require an absolute http(s) URL.
///
/// The returned string keeps any script path (`https://example.org/paperless`)
/// and never ends with a slash.
pub fn normalize_host(raw: &str) -> Result<String, ValidationError> {
    let trimmed = raw.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        return Err(ValidationError::EmptyHost);
    }

    let host = if trimmed.contains("://") {
        trimmed.to_string()
    } else {
        format!("https://{trimmed}")
    };

    if !(host.starts_with("http://") || host.starts_with("https://")) {
        return Err(ValidationError::UnsupportedScheme(host));
    }

    match Url::parse(&host) {
        Ok(url) if url.has_host() => Ok(host),
        Ok(_) => Err(ValidationError::InvalidUrl {
            url: host,
            reason: "missing host name".to_string(),
        }),
        Err(e) => Err(ValidationError::InvalidUrl {
            url: host,
            reason: e.to_string(),
        }),
    }
}

/// Aliases must start with an ASCII letter and must not shadow a setting
/// key such as `current`. The `__adhoc__` alias is not accepted here; the
/// store lets it through on its own.
pub fn validate_alias(alias: &str) -> Result<(), ValidationError> {
    match alias.chars().next() {
        Some(c) if c.is_ascii_alphabetic() => {}
        _ => return Err(ValidationError::AliasMustStartWithLetter(alias.to_string())),
    }
    if RESERVED_ALIASES.contains(&alias) {
        return Err(ValidationError::ReservedAlias(alias.to_string()));
    }
    Ok(())
}
