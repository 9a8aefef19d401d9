use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

/// Description returned for unknown users, locked accounts and bad passwords alike.
pub const INVALID_CREDENTIALS: &str = "The username/password couple is invalid.";
/// Description returned when the account may not sign in (ineligible or two-factor pending).
pub const SIGN_IN_NOT_ALLOWED: &str = "The specified user is not allowed to sign in.";
/// Description returned for any grant type other than `password`.
pub const UNSUPPORTED_GRANT_TYPE: &str = "The specified grant type is not supported.";

/// OAuth error codes this server can answer with for expected rejections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum OAuthErrorKind {
    InvalidClient,
    InvalidGrant,
    UnsupportedGrantType,
}

impl OAuthErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            OAuthErrorKind::InvalidClient => "invalid_client",
            OAuthErrorKind::InvalidGrant => "invalid_grant",
            OAuthErrorKind::UnsupportedGrantType => "unsupported_grant_type",
        }
    }
}

impl fmt::Display for OAuthErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An expected rejection of a token request.
///
/// These are returned as values, never propagated as hard failures. The
/// description is always one of the fixed texts above so callers cannot tell
/// "no such user" apart from "locked out".
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind}: {description}")]
pub struct AuthenticationError {
    pub kind: OAuthErrorKind,
    pub description: &'static str,
}

impl AuthenticationError {
    pub fn invalid_client() -> Self {
        Self {
            kind: OAuthErrorKind::InvalidClient,
            description: INVALID_CREDENTIALS,
        }
    }

    pub fn invalid_credentials() -> Self {
        Self {
            kind: OAuthErrorKind::InvalidGrant,
            description: INVALID_CREDENTIALS,
        }
    }

    pub fn sign_in_not_allowed() -> Self {
        Self {
            kind: OAuthErrorKind::InvalidGrant,
            description: SIGN_IN_NOT_ALLOWED,
        }
    }

    pub fn unsupported_grant_type() -> Self {
        Self {
            kind: OAuthErrorKind::UnsupportedGrantType,
            description: UNSUPPORTED_GRANT_TYPE,
        }
    }
}

/// Caller misuse of the pipeline. Fails fast instead of becoming an OAuth error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ContractViolation {
    #[error("username must not be empty")]
    EmptyUsername,
    #[error("password must not be empty")]
    EmptyPassword,
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),
    #[error("Password hashing failed: {0}")]
    PasswordHash(String),
    #[error("Failed to gather randomness: {0}")]
    Randomness(String),
    #[error("Username already taken: {0}")]
    DuplicateUsername(String),
    #[error("Account {0} not found")]
    AccountNotFound(i32),
}

/// Problems reading the `X-SubAccount-Id` header.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubAccountHeaderError {
    #[error("X-SubAccount-Id header is missing")]
    Missing,
    #[error("X-SubAccount-Id header is not valid UTF-8")]
    NotUtf8,
    #[error("Invalid X-SubAccount-Id header value {value:?}: {source}")]
    Invalid {
        value: String,
        #[source]
        source: std::num::ParseIntError,
    },
}

/// Failure raised by a claims appender.
#[derive(Debug, Error)]
pub enum AppenderError {
    #[error(transparent)]
    SubAccountHeader(#[from] SubAccountHeaderError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("{0}")]
    Other(String),
}

#[derive(Debug, Error)]
pub enum IssuerError {
    #[error("Failed to encode token: {0}")]
    Encode(#[from] jsonwebtoken::errors::Error),
    #[error("Ticket has no subject claim")]
    MissingSubject,
}

/// Hard failures of the token pipeline.
///
/// Expected credential rejections never end up here; see [`AuthenticationError`].
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Contract violation: {0}")]
    Contract(#[from] ContractViolation),
    #[error("Account store error: {0}")]
    Store(#[from] StoreError),
    #[error("Claims appender '{appender}' failed: {source}")]
    Appender {
        appender: &'static str,
        #[source]
        source: AppenderError,
    },
    #[error("Token issuer error: {0}")]
    Issuer(#[from] IssuerError),
    #[error("Request cancelled")]
    Cancelled,
}

impl PipelineError {
    /// Whether this failure points at the server rather than at the caller.
    pub fn is_internal(&self) -> bool {
        !matches!(self, PipelineError::Contract(_))
    }
}
