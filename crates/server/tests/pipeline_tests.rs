//! Claims appender pipeline ordering, failure and cancellation.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use auth_server::appender::{
    AuthorizationContext, ClaimsAppender, ClaimsAppenderPipeline, SUBACCOUNT_ID_HEADER,
    SubAccountClaimsAppender,
};
use auth_server::claims::{Claim, Destination, Principal, claim_types};
use auth_server::error::{AppenderError, PipelineError, SubAccountHeaderError};
use auth_server::request::AuthenticationRequest;
use axum::http::{HeaderMap, HeaderValue};
use tokio_util::sync::CancellationToken;

/// Adds `tenant=acme`.
struct TenantAppender;

#[async_trait]
impl ClaimsAppender for TenantAppender {
    fn name(&self) -> &'static str {
        "tenant"
    }

    async fn append_claims(&self, ctx: &mut AuthorizationContext<'_>) -> Result<(), AppenderError> {
        tokio::task::yield_now().await;
        ctx.principal
            .add_claim(Claim::new("tenant", "acme").with_destinations(&[Destination::AccessToken]));
        Ok(())
    }
}

/// Derives `audience_hint` from whatever `tenant` claim is already present.
struct TenantHintAppender;

#[async_trait]
impl ClaimsAppender for TenantHintAppender {
    fn name(&self) -> &'static str {
        "tenant_hint"
    }

    async fn append_claims(&self, ctx: &mut AuthorizationContext<'_>) -> Result<(), AppenderError> {
        let hint = match ctx.principal.find_first("tenant") {
            Some(tenant) => format!("{}-api", tenant.value()),
            None => "none".to_string(),
        };
        ctx.principal.add_claim(Claim::new("audience_hint", hint));
        Ok(())
    }
}

struct FailingAppender;

#[async_trait]
impl ClaimsAppender for FailingAppender {
    fn name(&self) -> &'static str {
        "failing"
    }

    async fn append_claims(&self, _ctx: &mut AuthorizationContext<'_>) -> Result<(), AppenderError> {
        Err(AppenderError::Other("misconfigured".into()))
    }
}

#[derive(Default)]
struct FlagAppender(AtomicBool);

#[async_trait]
impl ClaimsAppender for FlagAppender {
    fn name(&self) -> &'static str {
        "flag"
    }

    async fn append_claims(&self, _ctx: &mut AuthorizationContext<'_>) -> Result<(), AppenderError> {
        self.0.store(true, Ordering::SeqCst);
        Ok(())
    }
}

struct PendingAppender;

#[async_trait]
impl ClaimsAppender for PendingAppender {
    fn name(&self) -> &'static str {
        "pending"
    }

    async fn append_claims(&self, _ctx: &mut AuthorizationContext<'_>) -> Result<(), AppenderError> {
        std::future::pending::<()>().await;
        Ok(())
    }
}

fn request_with_headers(headers: HeaderMap) -> AuthenticationRequest {
    AuthenticationRequest::new("alice", "pw").with_headers(headers)
}

#[tokio::test]
async fn test_later_appender_sees_earlier_claims() {
    let pipeline = ClaimsAppenderPipeline::new()
        .register(Arc::new(TenantAppender))
        .register(Arc::new(TenantHintAppender));
    let request = AuthenticationRequest::new("alice", "pw");
    let mut principal = Principal::new();

    let mut ctx = AuthorizationContext::new(&request, &mut principal);
    pipeline
        .run(&mut ctx, &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(
        principal.find_first("audience_hint").unwrap().value(),
        "acme-api"
    );
    assert_eq!(pipeline.names(), ["tenant", "tenant_hint"]);
}

#[tokio::test]
async fn test_registration_order_matters() {
    let pipeline = ClaimsAppenderPipeline::new()
        .register(Arc::new(TenantHintAppender))
        .register(Arc::new(TenantAppender));
    let request = AuthenticationRequest::new("alice", "pw");
    let mut principal = Principal::new();

    let mut ctx = AuthorizationContext::new(&request, &mut principal);
    pipeline
        .run(&mut ctx, &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(principal.find_first("audience_hint").unwrap().value(), "none");
}

#[tokio::test]
async fn test_failure_aborts_remaining_appenders() {
    let flag = Arc::new(FlagAppender::default());
    let pipeline = ClaimsAppenderPipeline::new()
        .register(Arc::new(FailingAppender))
        .register(flag.clone());
    let request = AuthenticationRequest::new("alice", "pw");
    let mut principal = Principal::new();

    let mut ctx = AuthorizationContext::new(&request, &mut principal);
    let err = pipeline
        .run(&mut ctx, &CancellationToken::new())
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        PipelineError::Appender {
            appender: "failing",
            ..
        }
    ));
    assert!(err.is_internal());
    assert!(!flag.0.load(Ordering::SeqCst));
}

#[tokio::test]
async fn test_cancellation_interrupts_pending_appender() {
    let pipeline = ClaimsAppenderPipeline::new().register(Arc::new(PendingAppender));
    let request = AuthenticationRequest::new("alice", "pw");
    let mut principal = Principal::new();
    let cancel = CancellationToken::new();

    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
        trigger.cancel();
    });

    let mut ctx = AuthorizationContext::new(&request, &mut principal);
    let err = pipeline.run(&mut ctx, &cancel).await.unwrap_err();
    assert!(matches!(err, PipelineError::Cancelled));
}

#[tokio::test]
async fn test_sub_account_claim_added_from_header() {
    let mut headers = HeaderMap::new();
    headers.insert(SUBACCOUNT_ID_HEADER, HeaderValue::from_static("42"));
    let request = request_with_headers(headers);
    let pipeline = ClaimsAppenderPipeline::new().register(Arc::new(SubAccountClaimsAppender));
    let mut principal = Principal::new();

    let mut ctx = AuthorizationContext::new(&request, &mut principal);
    pipeline
        .run(&mut ctx, &CancellationToken::new())
        .await
        .unwrap();

    let claim = principal.find_first(claim_types::SUB_ACCOUNT_ID).unwrap();
    assert_eq!(claim.value(), "42");
    assert_eq!(claim.destinations(), [Destination::AccessToken]);
}

#[tokio::test]
async fn test_sub_account_absent_header_is_noop() {
    let request = AuthenticationRequest::new("alice", "pw");
    let pipeline = ClaimsAppenderPipeline::new().register(Arc::new(SubAccountClaimsAppender));
    let mut principal = Principal::new();

    let mut ctx = AuthorizationContext::new(&request, &mut principal);
    pipeline
        .run(&mut ctx, &CancellationToken::new())
        .await
        .unwrap();

    assert!(principal.claims().is_empty());
}

#[tokio::test]
async fn test_sub_account_bad_header_fails_the_pipeline() {
    let mut headers = HeaderMap::new();
    headers.insert(SUBACCOUNT_ID_HEADER, HeaderValue::from_static("not-a-number"));
    let request = request_with_headers(headers);
    let pipeline = ClaimsAppenderPipeline::new().register(Arc::new(SubAccountClaimsAppender));
    let mut principal = Principal::new();

    let mut ctx = AuthorizationContext::new(&request, &mut principal);
    let err = pipeline
        .run(&mut ctx, &CancellationToken::new())
        .await
        .unwrap_err();

    match err {
        PipelineError::Appender {
            appender: "sub_account",
            source: AppenderError::SubAccountHeader(SubAccountHeaderError::Invalid { value, .. }),
        } => assert_eq!(value, "not-a-number"),
        other => panic!("unexpected error: {other:?}"),
    }
}
