//! Password-grant token endpoint.

use std::fmt;

use axum::{
    Form, Json,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::api::{AUTH_TAG, AppState};
use crate::error::{AuthenticationError, PipelineError};
use crate::issuer::TokenResponse;
use crate::outcome::AuthenticationOutcome;
use crate::request::AuthenticationRequest;

/// `application/x-www-form-urlencoded` body of a token request.
#[derive(Deserialize, ToSchema)]
pub struct TokenForm {
    /// Only `password` is supported
    #[serde(default)]
    pub grant_type: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    /// Space-separated list of requested scopes
    pub scope: Option<String>,
    pub client_id: Option<String>,
    /// Echoed into the ID token; generated when absent
    pub nonce: Option<String>,
}

impl fmt::Debug for TokenForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenForm")
            .field("grant_type", &self.grant_type)
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .field("scope", &self.scope)
            .field("client_id", &self.client_id)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_description: Option<String>,
}

impl ErrorResponse {
    fn response(status: StatusCode, error: &str, description: Option<String>) -> Response {
        (
            status,
            Json(ErrorResponse {
                error: error.to_string(),
                error_description: description,
            }),
        )
            .into_response()
    }
}

impl From<AuthenticationError> for ErrorResponse {
    fn from(err: AuthenticationError) -> Self {
        ErrorResponse {
            error: err.kind.as_str().to_string(),
            error_description: Some(err.description.to_string()),
        }
    }
}

impl From<TokenForm> for AuthenticationRequest {
    fn from(form: TokenForm) -> Self {
        let mut request = AuthenticationRequest::new(form.username, form.password)
            .with_scope_string(form.scope.as_deref().unwrap_or_default());
        if let Some(client_id) = form.client_id {
            request = request.with_client_id(client_id);
        }
        if let Some(nonce) = form.nonce {
            request = request.with_nonce(nonce);
        }
        request
    }
}

#[tracing::instrument(skip(state, headers, form), fields(grant_type = %form.grant_type))]
#[utoipa::path(
    post,
    path = "/auth",
    tag = AUTH_TAG,
    operation_id = "Token Exchange",
    summary = "Exchange a username and password for tokens",
    description = "Resource owner password grant. Send `X-SubAccount-Id` to scope the access token \
                   to a sub-account.",
    request_body(content = TokenForm, content_type = "application/x-www-form-urlencoded"),
    params(
        ("X-SubAccount-Id" = Option<i32>, Header, description = "Sub-account to scope the token to")
    ),
    responses(
        (status = 200, description = "Tokens issued", body = TokenResponse),
        (status = 400, description = "Rejected credentials or unsupported grant", body = ErrorResponse),
        (status = 500, description = "Internal error", body = ErrorResponse)
    )
)]
pub async fn token(
    State(state): State<AppState>,
    headers: HeaderMap,
    Form(form): Form<TokenForm>,
) -> Response {
    tracing::info!(client_id = ?form.client_id, "Auth request");

    let grant_type = form.grant_type.clone();
    let request = AuthenticationRequest::from(form).with_headers(headers);
    let cancel = state.shutdown.child_token();

    let outcome = match state.exchange.exchange(&grant_type, &request, &cancel).await {
        Ok(outcome) => outcome,
        Err(PipelineError::Contract(violation)) => {
            return ErrorResponse::response(
                StatusCode::BAD_REQUEST,
                "invalid_request",
                Some(violation.to_string()),
            );
        }
        Err(e) => {
            tracing::error!(error = %e, "Token exchange failed");
            return ErrorResponse::response(StatusCode::INTERNAL_SERVER_ERROR, "server_error", None);
        }
    };

    let ticket = match outcome {
        AuthenticationOutcome::Success(ticket) => ticket,
        AuthenticationOutcome::Failure(rejection) => {
            return (StatusCode::BAD_REQUEST, Json(ErrorResponse::from(rejection))).into_response();
        }
    };

    match state.issuer.issue(&ticket, &request) {
        Ok(tokens) => (StatusCode::OK, Json(tokens)).into_response(),
        Err(e) => {
            tracing::error!(error = %e, "Failed to issue token");
            ErrorResponse::response(StatusCode::INTERNAL_SERVER_ERROR, "server_error", None)
        }
    }
}
