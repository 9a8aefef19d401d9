//! Post-processing hooks that may add claims before a ticket is issued.

mod pipeline;
mod sub_account;

use async_trait::async_trait;

use crate::claims::Principal;
use crate::error::AppenderError;
use crate::request::AuthenticationRequest;

pub use pipeline::ClaimsAppenderPipeline;
pub use sub_account::{SUBACCOUNT_ID_HEADER, SubAccountClaimsAppender, SubAccountContextResolver};

/// What an appender gets to see: the inbound request and the ticket so far.
pub struct AuthorizationContext<'a> {
    pub request: &'a AuthenticationRequest,
    pub principal: &'a mut Principal,
}

impl<'a> AuthorizationContext<'a> {
    pub fn new(request: &'a AuthenticationRequest, principal: &'a mut Principal) -> Self {
        Self { request, principal }
    }
}

#[async_trait]
pub trait ClaimsAppender: Send + Sync {
    /// Identifies the appender in errors and logs.
    fn name(&self) -> &'static str;

    async fn append_claims(&self, ctx: &mut AuthorizationContext<'_>) -> Result<(), AppenderError>;
}
