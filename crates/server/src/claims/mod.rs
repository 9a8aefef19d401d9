//! Claims, principals and the ticket builder that scopes them.

mod builder;
mod claim;
mod identity;
mod principal;

pub use builder::{
    ClaimsTicketBuilder, GRANTABLE_SCOPES, RESOURCE_SERVER, RoleDestinationRule, grant_scopes,
};
pub use claim::{Claim, Destination, claim_types, scopes};
pub use identity::{AccountClaimsFactory, ClaimsIdentityFactory};
pub use principal::Principal;
