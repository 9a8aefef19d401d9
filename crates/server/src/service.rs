use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::Instrument;

use crate::account::AccountStore;
use crate::appender::{AuthorizationContext, ClaimsAppenderPipeline, SubAccountClaimsAppender};
use crate::cancel::until_cancelled;
use crate::claims::{ClaimsTicketBuilder, RoleDestinationRule};
use crate::config::AppConfig;
use crate::error::{AuthenticationError, PipelineError};
use crate::logging::wide_events::{WideEvent, fields};
use crate::outcome::{AuthenticationOutcome, GrantType, IssuedTicket};
use crate::request::AuthenticationRequest;
use crate::strategy::{AuthenticationStrategy, DefaultAuthenticationStrategy};

/// Grant-type dispatch plus the validate, build, append sequence.
pub struct TokenExchangeService {
    strategy: Arc<dyn AuthenticationStrategy>,
    builder: ClaimsTicketBuilder,
    appenders: ClaimsAppenderPipeline,
}

impl TokenExchangeService {
    pub fn new(
        strategy: Arc<dyn AuthenticationStrategy>,
        role_rule: RoleDestinationRule,
        appenders: ClaimsAppenderPipeline,
    ) -> Self {
        Self {
            builder: ClaimsTicketBuilder::new(strategy.clone(), role_rule),
            strategy,
            appenders,
        }
    }

    /// Default strategy over `store`, with the appenders enabled in `config`.
    pub fn from_config(config: &AppConfig, store: Arc<dyn AccountStore>) -> Self {
        let mut appenders = ClaimsAppenderPipeline::new();
        if config.claims.sub_account_appender {
            appenders = appenders.register(Arc::new(SubAccountClaimsAppender));
        }
        tracing::info!(appenders = ?appenders.names(), "Claims appenders registered");

        Self::new(
            Arc::new(DefaultAuthenticationStrategy::new(store)),
            config.claims.role_destination,
            appenders,
        )
    }

    /// Expected rejections come back as [`AuthenticationOutcome::Failure`];
    /// `Err` is reserved for misuse, infrastructure faults, appender faults
    /// and cancellation.
    pub async fn exchange(
        &self,
        grant_type: &str,
        request: &AuthenticationRequest,
        cancel: &CancellationToken,
    ) -> Result<AuthenticationOutcome, PipelineError> {
        let evt = WideEvent::token_exchange();
        evt.add(fields::GRANT_TYPE, grant_type);
        evt.add(fields::USERNAME, request.username());
        evt.add_opt(fields::CLIENT_ID, request.client_id());

        let result = self
            .run(grant_type, request, cancel)
            .instrument(evt.span().clone())
            .await;

        match &result {
            Ok(AuthenticationOutcome::Success(ticket)) => {
                evt.add(fields::OUTCOME, "success");
                evt.add(
                    fields::SCOPES,
                    ticket
                        .granted_scopes
                        .iter()
                        .map(String::as_str)
                        .collect::<Vec<_>>()
                        .join(" "),
                );
                evt.add_u64(fields::CLAIM_COUNT, ticket.principal.claims().len() as u64);
                evt.info("token exchange finished");
            }
            Ok(AuthenticationOutcome::Failure(error)) => {
                evt.add(fields::OUTCOME, "failure");
                evt.add(fields::ERROR, error.kind);
                evt.info("token exchange finished");
            }
            Err(error) => {
                evt.add(fields::OUTCOME, "error");
                evt.add(fields::ERROR, error);
                if error.is_internal() {
                    evt.error("token exchange failed");
                } else {
                    evt.info("token exchange rejected");
                }
            }
        }

        result
    }

    async fn run(
        &self,
        grant_type: &str,
        request: &AuthenticationRequest,
        cancel: &CancellationToken,
    ) -> Result<AuthenticationOutcome, PipelineError> {
        if GrantType::parse(grant_type).is_none() {
            return Ok(AuthenticationOutcome::Failure(
                AuthenticationError::unsupported_grant_type(),
            ));
        }

        let authenticated = until_cancelled(
            cancel,
            self.strategy
                .authenticate(request.username(), request.password()),
        )
        .await?;
        let account = match authenticated {
            Ok(account) => account,
            Err(rejection) => return Ok(AuthenticationOutcome::Failure(rejection)),
        };

        let mut principal =
            until_cancelled(cancel, self.builder.build(&account, request.scopes())).await?;

        let mut ctx = AuthorizationContext::new(request, &mut principal);
        self.appenders.run(&mut ctx, cancel).await?;

        Ok(AuthenticationOutcome::Success(IssuedTicket::new(principal)))
    }
}
