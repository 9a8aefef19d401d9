//! Serializes issued tickets into signed JWTs.

use jsonwebtoken::{EncodingKey, Header, encode};
use serde::Serialize;
use serde_json::{Map, Value, map::Entry};
use time::OffsetDateTime;
use utoipa::ToSchema;

use crate::claims::{Destination, Principal, claim_types, scopes};
use crate::config::TokenConfig;
use crate::error::IssuerError;
use crate::outcome::IssuedTicket;
use crate::request::AuthenticationRequest;

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id_token: Option<String>,
    pub scope: String,
}

/// Turns a successful ticket into wire tokens.
pub trait TokenIssuer: Send + Sync {
    fn issue(
        &self,
        ticket: &IssuedTicket,
        request: &AuthenticationRequest,
    ) -> Result<TokenResponse, IssuerError>;
}

/// HS256 issuer. Only claims routed to a token end up in it.
pub struct JwtTokenIssuer {
    issuer: String,
    key: EncodingKey,
    lifetime_secs: i64,
}

impl JwtTokenIssuer {
    pub fn new(config: &TokenConfig) -> Self {
        Self {
            issuer: config.issuer.clone(),
            key: EncodingKey::from_secret(config.signing_secret.as_bytes()),
            lifetime_secs: config.access_token_lifetime,
        }
    }

    fn standard_claims(&self, audience: &str, now: i64) -> Map<String, Value> {
        let mut claims = Map::new();
        claims.insert("iss".into(), Value::from(self.issuer.as_str()));
        claims.insert("aud".into(), Value::from(audience));
        claims.insert("iat".into(), Value::from(now));
        claims.insert("exp".into(), Value::from(now + self.lifetime_secs));
        claims
    }

    fn sign(&self, claims: &Map<String, Value>) -> Result<String, IssuerError> {
        Ok(encode(&Header::default(), claims, &self.key)?)
    }
}

/// Claims set by the issuer itself. Principal claims with these types are dropped.
const RESERVED_CLAIMS: [&str; 8] = ["iss", "aud", "iat", "exp", "nbf", "sub", "nonce", "scope"];

/// Merge routed claims into `target`. Repeated claim types become arrays.
fn insert_routed(target: &mut Map<String, Value>, principal: &Principal, destination: Destination) {
    for claim in principal.claims_for(destination) {
        if RESERVED_CLAIMS.iter().any(|reserved| *reserved == claim.claim_type()) {
            continue;
        }
        let value = Value::from(claim.value());
        match target.entry(claim.claim_type()) {
            Entry::Vacant(slot) => {
                slot.insert(value);
            }
            Entry::Occupied(mut slot) => match slot.get_mut() {
                Value::Array(values) => values.push(value),
                existing => {
                    let first = existing.take();
                    *existing = Value::Array(vec![first, value]);
                }
            },
        }
    }
}

impl TokenIssuer for JwtTokenIssuer {
    fn issue(
        &self,
        ticket: &IssuedTicket,
        request: &AuthenticationRequest,
    ) -> Result<TokenResponse, IssuerError> {
        let subject = ticket
            .principal
            .find_first(claim_types::SUBJECT)
            .ok_or(IssuerError::MissingSubject)?
            .value()
            .to_string();
        let now = OffsetDateTime::now_utc().unix_timestamp();
        let scope = ticket
            .granted_scopes
            .iter()
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(" ");

        let mut access = self.standard_claims(&ticket.resource, now);
        insert_routed(&mut access, &ticket.principal, Destination::AccessToken);
        access.insert(claim_types::SUBJECT.into(), Value::from(subject.as_str()));
        access.insert("scope".into(), Value::from(scope.as_str()));

        let id_token = if ticket.granted_scopes.contains(scopes::OPENID) {
            let audience = request.client_id().unwrap_or(&ticket.resource);
            let mut identity = self.standard_claims(audience, now);
            insert_routed(&mut identity, &ticket.principal, Destination::IdentityToken);
            identity.insert(claim_types::SUBJECT.into(), Value::from(subject.as_str()));
            identity.insert("nonce".into(), Value::from(request.nonce()));
            Some(self.sign(&identity)?)
        } else {
            None
        };

        Ok(TokenResponse {
            access_token: self.sign(&access)?,
            token_type: "Bearer".to_string(),
            expires_in: self.lifetime_secs,
            id_token,
            scope,
        })
    }
}
