use std::collections::BTreeSet;

use super::{Claim, Destination};

/// The claim set for one token request, plus what was granted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Principal {
    claims: Vec<Claim>,
    scopes: BTreeSet<String>,
    resource: Option<String>,
}

impl Principal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a claim unless one with the same type and value is already present.
    ///
    /// Returns whether the claim was added.
    pub fn add_claim(&mut self, claim: Claim) -> bool {
        let duplicate = self
            .claims
            .iter()
            .any(|c| c.claim_type() == claim.claim_type() && c.value() == claim.value());
        if duplicate {
            return false;
        }
        self.claims.push(claim);
        true
    }

    pub fn claims(&self) -> &[Claim] {
        &self.claims
    }

    pub fn claims_mut(&mut self) -> impl Iterator<Item = &mut Claim> {
        self.claims.iter_mut()
    }

    pub fn find_first(&self, claim_type: &str) -> Option<&Claim> {
        self.claims.iter().find(|c| c.is_type(claim_type))
    }

    pub fn has_claim(&self, claim_type: &str) -> bool {
        self.find_first(claim_type).is_some()
    }

    /// Claims routed to the given token, in insertion order.
    pub fn claims_for(&self, destination: Destination) -> impl Iterator<Item = &Claim> {
        self.claims
            .iter()
            .filter(move |c| c.has_destination(destination))
    }

    pub fn scopes(&self) -> &BTreeSet<String> {
        &self.scopes
    }

    pub fn set_scopes(&mut self, scopes: BTreeSet<String>) {
        self.scopes = scopes;
    }

    pub fn has_scope(&self, scope: &str) -> bool {
        self.scopes.contains(scope)
    }

    pub fn resource(&self) -> Option<&str> {
        self.resource.as_deref()
    }

    pub fn set_resource(&mut self, resource: impl Into<String>) {
        self.resource = Some(resource.into());
    }
}
