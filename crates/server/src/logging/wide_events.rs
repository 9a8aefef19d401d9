//! One wide event per token exchange.
//!
//! Attributes are recorded on a single `tracing::Span` as the exchange
//! progresses, then a single summary event is emitted inside that span. A
//! subscriber therefore sees one line per request carrying every attribute,
//! instead of a trail of small events.
//!
//! ```rust,ignore
//! let evt = WideEvent::token_exchange();
//! evt.add(fields::GRANT_TYPE, grant_type);
//! evt.add_opt(fields::CLIENT_ID, request.client_id());
//! evt.info("token exchange finished");
//! ```
//!
//! `tracing` drops `record` calls for fields the span did not declare, so
//! every attribute used here is listed in [`fields`] and declared up front.

use std::fmt::Display;

use tracing::{Level, Span, field};

/// Attribute names declared on the token exchange span.
pub mod fields {
    pub const GRANT_TYPE: &str = "grant_type";
    pub const USERNAME: &str = "username";
    pub const CLIENT_ID: &str = "client_id";
    pub const OUTCOME: &str = "outcome";
    pub const ERROR: &str = "error";
    pub const SCOPES: &str = "scopes";
    pub const CLAIM_COUNT: &str = "claim_count";
}

#[derive(Clone)]
pub struct WideEvent {
    span: Span,
}

impl WideEvent {
    pub fn token_exchange() -> Self {
        let span = tracing::info_span!(
            "token_exchange",
            grant_type = field::Empty,
            username = field::Empty,
            client_id = field::Empty,
            outcome = field::Empty,
            error = field::Empty,
            scopes = field::Empty,
            claim_count = field::Empty,
        );
        WideEvent { span }
    }

    /// The underlying span, for `Instrument::instrument` on the exchange future.
    pub fn span(&self) -> &Span {
        &self.span
    }

    pub fn add<V: Display>(&self, key: &'static str, value: V) {
        self.span.record(key, field::display(value));
    }

    pub fn add_opt<V: Display>(&self, key: &'static str, value: Option<V>) {
        if let Some(v) = value {
            self.add(key, v);
        }
    }

    pub fn add_u64(&self, key: &'static str, value: u64) {
        self.span.record(key, value);
    }

    pub fn emit(&self, message: &str, level: Level) {
        self.span.in_scope(|| match level {
            Level::ERROR => tracing::event!(Level::ERROR, message = %message),
            Level::WARN => tracing::event!(Level::WARN, message = %message),
            Level::INFO => tracing::event!(Level::INFO, message = %message),
            Level::DEBUG => tracing::event!(Level::DEBUG, message = %message),
            Level::TRACE => tracing::event!(Level::TRACE, message = %message),
        });
    }

    pub fn info(&self, message: &str) {
        self.emit(message, Level::INFO)
    }

    pub fn error(&self, message: &str) {
        self.emit(message, Level::ERROR)
    }
}
