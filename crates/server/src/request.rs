use std::collections::BTreeSet;
use std::fmt;

use axum::http::HeaderMap;
use secrecy::{ExposeSecret, SecretString};

/// An inbound password-grant request. Immutable once built.
#[derive(Clone)]
pub struct AuthenticationRequest {
    username: String,
    password: SecretString,
    scopes: BTreeSet<String>,
    client_id: Option<String>,
    nonce: String,
    headers: HeaderMap,
}

impl AuthenticationRequest {
    /// A request with no scopes, no client and a freshly generated nonce.
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: SecretString::from(password.into()),
            scopes: BTreeSet::new(),
            client_id: None,
            nonce: uuid::Uuid::new_v4().to_string(),
            headers: HeaderMap::new(),
        }
    }

    pub fn with_scopes<I, S>(mut self, scopes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.scopes = scopes.into_iter().map(Into::into).collect();
        self
    }

    /// Space-delimited `scope` parameter as sent on the wire.
    pub fn with_scope_string(self, scope: &str) -> Self {
        let scopes = parse_scopes(scope);
        Self { scopes, ..self }
    }

    pub fn with_client_id(mut self, client_id: impl Into<String>) -> Self {
        self.client_id = Some(client_id.into());
        self
    }

    pub fn with_nonce(mut self, nonce: impl Into<String>) -> Self {
        self.nonce = nonce.into();
        self
    }

    pub fn with_headers(mut self, headers: HeaderMap) -> Self {
        self.headers = headers;
        self
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn password(&self) -> &str {
        self.password.expose_secret()
    }

    pub fn scopes(&self) -> &BTreeSet<String> {
        &self.scopes
    }

    pub fn client_id(&self) -> Option<&str> {
        self.client_id.as_deref()
    }

    pub fn nonce(&self) -> &str {
        &self.nonce
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }
}

impl fmt::Debug for AuthenticationRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthenticationRequest")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .field("scopes", &self.scopes)
            .field("client_id", &self.client_id)
            .field("nonce", &self.nonce)
            .finish_non_exhaustive()
    }
}

/// Split a space-delimited scope string. Empty input gives an empty set.
pub fn parse_scopes(scope: &str) -> BTreeSet<String> {
    scope.split_whitespace().map(str::to_string).collect()
}
