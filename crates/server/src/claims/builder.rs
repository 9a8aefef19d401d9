use std::collections::BTreeSet;
use std::sync::Arc;

use serde::Deserialize;

use super::{Claim, Destination, Principal, claim_types, scopes};
use crate::account::Account;
use crate::error::PipelineError;
use crate::strategy::AuthenticationStrategy;

/// Resource identifier stamped on every ticket.
pub const RESOURCE_SERVER: &str = "auth-server";

/// Scopes a password-grant ticket may carry.
pub const GRANTABLE_SCOPES: [&str; 3] = [scopes::OPENID, scopes::PROFILE, scopes::ROLES];

/// `{openid, profile, roles} ∩ (requested ∪ {openid})`
pub fn grant_scopes(requested: &BTreeSet<String>) -> BTreeSet<String> {
    GRANTABLE_SCOPES
        .iter()
        .filter(|s| **s == scopes::OPENID || requested.contains(**s))
        .map(|s| s.to_string())
        .collect()
}

/// Which granted scope routes `role` claims into the identity token.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoleDestinationRule {
    /// A scope named after the claim type (`role`). It is not grantable, so
    /// role claims stay access-token only. Matches deployed token contents.
    #[default]
    RoleClaimScope,
    /// The `roles` scope.
    RolesScope,
}

impl RoleDestinationRule {
    fn routes_to_identity(self, principal: &Principal) -> bool {
        match self {
            RoleDestinationRule::RoleClaimScope => principal.has_scope(claim_types::ROLE),
            RoleDestinationRule::RolesScope => principal.has_scope(scopes::ROLES),
        }
    }
}

/// Turns a validated account into a scoped, routed [`Principal`].
pub struct ClaimsTicketBuilder {
    strategy: Arc<dyn AuthenticationStrategy>,
    role_rule: RoleDestinationRule,
}

impl ClaimsTicketBuilder {
    pub fn new(strategy: Arc<dyn AuthenticationStrategy>, role_rule: RoleDestinationRule) -> Self {
        Self {
            strategy,
            role_rule,
        }
    }

    #[tracing::instrument(skip_all, fields(account_id = account.id))]
    pub async fn build(
        &self,
        account: &Account,
        requested: &BTreeSet<String>,
    ) -> Result<Principal, PipelineError> {
        let mut principal = self.strategy.create_user_principal(account).await?;
        principal.set_scopes(grant_scopes(requested));
        principal.set_resource(RESOURCE_SERVER);

        let destinations: Vec<Vec<Destination>> = principal
            .claims()
            .iter()
            .map(|claim| self.destinations_for(claim, &principal))
            .collect();
        for (claim, routed) in principal.claims_mut().zip(destinations) {
            claim.set_destinations(&routed);
        }

        tracing::debug!(scopes = ?principal.scopes(), "Ticket built");
        Ok(principal)
    }

    fn destinations_for(&self, claim: &Claim, principal: &Principal) -> Vec<Destination> {
        if self.strategy.should_exclude_claim(claim) {
            return Vec::new();
        }

        let identity = match claim.claim_type() {
            claim_types::NAME => principal.has_scope(scopes::PROFILE),
            claim_types::EMAIL => principal.has_scope(scopes::EMAIL),
            claim_types::ROLE => self.role_rule.routes_to_identity(principal),
            _ => false,
        };

        if identity {
            vec![Destination::AccessToken, Destination::IdentityToken]
        } else {
            vec![Destination::AccessToken]
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(items: &[&str]) -> BTreeSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn openid_is_always_granted() {
        assert_eq!(grant_scopes(&BTreeSet::new()), set(&["openid"]));
    }

    #[test]
    fn email_is_not_grantable() {
        assert_eq!(
            grant_scopes(&set(&["profile", "email"])),
            set(&["openid", "profile"])
        );
    }

    #[test]
    fn unknown_scopes_are_dropped() {
        assert_eq!(
            grant_scopes(&set(&["roles", "offline_access", "role", "admin"])),
            set(&["openid", "roles"])
        );
    }
}
