//! Password-grant authentication server.
//!
//! Validates a username/password pair against an [`account::AccountStore`],
//! enforces lockout and two-factor gating, and builds a scoped claim set that
//! [`issuer::JwtTokenIssuer`] serializes into signed tokens.
//!
//! The request path is [`service::TokenExchangeService::exchange`]:
//! credential validation, ticket building, then the claims appender pipeline.

pub mod account;
pub mod api;
pub mod appender;
pub mod cancel;
pub mod claims;
pub mod config;
pub mod entity;
pub mod error;
pub mod issuer;
pub mod logging;
pub mod models;
pub mod outcome;
pub mod request;
pub mod service;
pub mod strategy;
pub mod validator;
