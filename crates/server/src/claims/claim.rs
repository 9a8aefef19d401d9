/// Claim types emitted by the identity factory and the built-in appenders.
pub mod claim_types {
    pub const SUBJECT: &str = "sub";
    pub const NAME: &str = "name";
    pub const EMAIL: &str = "email";
    pub const ROLE: &str = "role";
    pub const SECURITY_STAMP: &str = "security_stamp";
    pub const SUB_ACCOUNT_ID: &str = "sub_account_id";
}

/// Scope names understood by the ticket builder.
pub mod scopes {
    pub const OPENID: &str = "openid";
    pub const PROFILE: &str = "profile";
    pub const EMAIL: &str = "email";
    pub const ROLES: &str = "roles";
}

/// Token a claim is allowed to appear in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Destination {
    AccessToken,
    IdentityToken,
}

/// A single `(type, value)` claim with its routing.
///
/// A claim without destinations stays on the principal but never leaves the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Claim {
    claim_type: String,
    value: String,
    destinations: Vec<Destination>,
}

impl Claim {
    pub fn new(claim_type: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            claim_type: claim_type.into(),
            value: value.into(),
            destinations: Vec::new(),
        }
    }

    pub fn with_destinations(mut self, destinations: &[Destination]) -> Self {
        self.set_destinations(destinations);
        self
    }

    pub fn claim_type(&self) -> &str {
        &self.claim_type
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn destinations(&self) -> &[Destination] {
        &self.destinations
    }

    pub fn has_destination(&self, destination: Destination) -> bool {
        self.destinations.contains(&destination)
    }

    /// Replace the routing. Duplicates are dropped and the order is normalized.
    pub fn set_destinations(&mut self, destinations: &[Destination]) {
        let mut routed = destinations.to_vec();
        routed.sort();
        routed.dedup();
        self.destinations = routed;
    }

    pub fn is_type(&self, claim_type: &str) -> bool {
        self.claim_type == claim_type
    }
}
