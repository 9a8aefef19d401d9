use auth_server::error::{
    AppenderError, AuthenticationError, ContractViolation, INVALID_CREDENTIALS, IssuerError,
    OAuthErrorKind, PipelineError, SIGN_IN_NOT_ALLOWED, StoreError, SubAccountHeaderError,
    UNSUPPORTED_GRANT_TYPE,
};

#[test]
fn test_oauth_error_kind_wire_names() {
    assert_eq!(OAuthErrorKind::InvalidClient.to_string(), "invalid_client");
    assert_eq!(OAuthErrorKind::InvalidGrant.to_string(), "invalid_grant");
    assert_eq!(
        OAuthErrorKind::UnsupportedGrantType.to_string(),
        "unsupported_grant_type"
    );
    assert_eq!(
        serde_json::to_string(&OAuthErrorKind::InvalidGrant).unwrap(),
        "\"invalid_grant\""
    );
}

#[test]
fn test_rejections_share_fixed_descriptions() {
    // Unknown user and bad password must be indistinguishable by description.
    assert_eq!(
        AuthenticationError::invalid_client().description,
        AuthenticationError::invalid_credentials().description
    );
    assert_eq!(
        AuthenticationError::invalid_credentials().description,
        INVALID_CREDENTIALS
    );
    assert_eq!(
        AuthenticationError::sign_in_not_allowed().description,
        SIGN_IN_NOT_ALLOWED
    );
    assert_eq!(
        AuthenticationError::unsupported_grant_type().description,
        UNSUPPORTED_GRANT_TYPE
    );
}

#[test]
fn test_authentication_error_display() {
    let err = AuthenticationError::invalid_client();
    assert_eq!(
        err.to_string(),
        "invalid_client: The username/password couple is invalid."
    );
}

#[test]
fn test_pipeline_error_display() {
    let err = PipelineError::from(ContractViolation::EmptyUsername);
    assert_eq!(err.to_string(), "Contract violation: username must not be empty");
    assert!(!err.is_internal());

    let err = PipelineError::Appender {
        appender: "sub_account",
        source: AppenderError::from(SubAccountHeaderError::Missing),
    };
    assert!(err.to_string().contains("Claims appender 'sub_account' failed"));
    assert!(err.to_string().contains("X-SubAccount-Id header is missing"));
    assert!(err.is_internal());

    assert_eq!(PipelineError::Cancelled.to_string(), "Request cancelled");
    assert!(PipelineError::Cancelled.is_internal());

    let err = PipelineError::from(StoreError::AccountNotFound(9));
    assert_eq!(err.to_string(), "Account store error: Account 9 not found");

    let err = PipelineError::from(IssuerError::MissingSubject);
    assert_eq!(err.to_string(), "Token issuer error: Ticket has no subject claim");
}

#[test]
fn test_sub_account_parse_error_keeps_source() {
    use std::error::Error;

    let source = "abc".parse::<i32>().unwrap_err();
    let err = SubAccountHeaderError::Invalid {
        value: "abc".into(),
        source,
    };
    assert!(err.to_string().contains("\"abc\""));
    assert!(err.source().is_some());
}
