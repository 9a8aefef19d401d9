use std::collections::BTreeSet;

use crate::claims::Principal;
use crate::error::AuthenticationError;

/// Grant types the exchange knows how to handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GrantType {
    Password,
}

impl GrantType {
    /// `None` for anything this server does not implement.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "password" => Some(GrantType::Password),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            GrantType::Password => "password",
        }
    }
}

/// A successful exchange, ready for the token issuer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedTicket {
    pub principal: Principal,
    pub granted_scopes: BTreeSet<String>,
    pub resource: String,
}

impl IssuedTicket {
    pub fn new(principal: Principal) -> Self {
        Self {
            granted_scopes: principal.scopes().clone(),
            resource: principal.resource().unwrap_or_default().to_string(),
            principal,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthenticationOutcome {
    Success(IssuedTicket),
    Failure(AuthenticationError),
}

impl AuthenticationOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, AuthenticationOutcome::Success(_))
    }

    pub fn ticket(&self) -> Option<&IssuedTicket> {
        match self {
            AuthenticationOutcome::Success(ticket) => Some(ticket),
            AuthenticationOutcome::Failure(_) => None,
        }
    }

    pub fn error(&self) -> Option<&AuthenticationError> {
        match self {
            AuthenticationOutcome::Success(_) => None,
            AuthenticationOutcome::Failure(error) => Some(error),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_password_grant_is_known() {
        assert_eq!(GrantType::parse("password"), Some(GrantType::Password));
        for other in ["client_credentials", "authorization_code", "refresh_token", "Password", ""] {
            assert_eq!(GrantType::parse(other), None, "{other}");
        }
    }
}
