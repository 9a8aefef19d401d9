use async_trait::async_trait;
use axum::http::{HeaderMap, HeaderName};

use super::{AuthorizationContext, ClaimsAppender};
use crate::claims::{Claim, Destination, claim_types};
use crate::error::{AppenderError, SubAccountHeaderError};

/// `X-SubAccount-Id`
pub const SUBACCOUNT_ID_HEADER: HeaderName = HeaderName::from_static("x-subaccount-id");

/// Reads the sub-account the caller wants the token scoped to.
pub struct SubAccountContextResolver;

impl SubAccountContextResolver {
    pub fn has_header(headers: &HeaderMap) -> bool {
        headers.contains_key(&SUBACCOUNT_ID_HEADER)
    }

    pub fn parse(headers: &HeaderMap) -> Result<i32, SubAccountHeaderError> {
        let raw = headers
            .get(&SUBACCOUNT_ID_HEADER)
            .ok_or(SubAccountHeaderError::Missing)?
            .to_str()
            .map_err(|_| SubAccountHeaderError::NotUtf8)?;
        raw.trim()
            .parse::<i32>()
            .map_err(|source| SubAccountHeaderError::Invalid {
                value: raw.to_string(),
                source,
            })
    }
}

/// Adds a `sub_account_id` claim when the request names a sub-account.
pub struct SubAccountClaimsAppender;

#[async_trait]
impl ClaimsAppender for SubAccountClaimsAppender {
    fn name(&self) -> &'static str {
        "sub_account"
    }

    async fn append_claims(&self, ctx: &mut AuthorizationContext<'_>) -> Result<(), AppenderError> {
        let headers = ctx.request.headers();
        if !SubAccountContextResolver::has_header(headers) {
            return Ok(());
        }
        let id = SubAccountContextResolver::parse(headers)?;
        ctx.principal.add_claim(
            Claim::new(claim_types::SUB_ACCOUNT_ID, id.to_string())
                .with_destinations(&[Destination::AccessToken]),
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(value: &'static str) -> HeaderMap {
        let mut h = HeaderMap::new();
        h.insert(SUBACCOUNT_ID_HEADER, HeaderValue::from_static(value));
        h
    }

    #[test]
    fn parses_integer_values() {
        assert_eq!(SubAccountContextResolver::parse(&headers("42")), Ok(42));
        assert_eq!(SubAccountContextResolver::parse(&headers(" -7 ")), Ok(-7));
    }

    #[test]
    fn header_lookup_is_case_insensitive() {
        let mut h = HeaderMap::new();
        h.insert(
            HeaderName::from_bytes(b"X-SubAccount-Id").unwrap(),
            HeaderValue::from_static("3"),
        );
        assert!(SubAccountContextResolver::has_header(&h));
        assert_eq!(SubAccountContextResolver::parse(&h), Ok(3));
    }

    #[test]
    fn missing_header() {
        let h = HeaderMap::new();
        assert!(!SubAccountContextResolver::has_header(&h));
        assert_eq!(
            SubAccountContextResolver::parse(&h),
            Err(SubAccountHeaderError::Missing)
        );
    }

    #[test]
    fn non_integer_is_rejected() {
        for bad in ["abc", "", "1.5", "99999999999"] {
            let err = SubAccountContextResolver::parse(&headers(bad)).unwrap_err();
            assert!(
                matches!(err, SubAccountHeaderError::Invalid { ref value, .. } if value == bad),
                "{bad:?} gave {err:?}"
            );
        }
    }

    #[test]
    fn non_utf8_is_rejected() {
        let mut h = HeaderMap::new();
        h.insert(
            SUBACCOUNT_ID_HEADER,
            HeaderValue::from_bytes(&[0xff, 0x31]).unwrap(),
        );
        assert_eq!(
            SubAccountContextResolver::parse(&h),
            Err(SubAccountHeaderError::NotUtf8)
        );
    }
}
