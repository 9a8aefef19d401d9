use serde::{Deserialize, Serialize};

/// Token endpoint result as seen by a client.
///
/// `is_token_valid` is fixed when the value is built, deserialization included.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "JwtModelFields")]
pub struct JwtModel {
    pub access_token: Option<String>,
    pub error: Option<String>,
    pub error_description: Option<String>,
    #[serde(skip_serializing)]
    is_token_valid: bool,
}

#[derive(Deserialize)]
struct JwtModelFields {
    access_token: Option<String>,
    error: Option<String>,
    error_description: Option<String>,
}

impl From<JwtModelFields> for JwtModel {
    fn from(fields: JwtModelFields) -> Self {
        JwtModel::new(fields.access_token, fields.error, fields.error_description)
    }
}

impl JwtModel {
    pub fn new(
        access_token: Option<String>,
        error: Option<String>,
        error_description: Option<String>,
    ) -> Self {
        let is_token_valid = access_token.as_deref().is_some_and(|t| !t.is_empty())
            && error.as_deref().is_none_or(str::is_empty)
            && error_description.as_deref().is_none_or(str::is_empty);
        Self {
            access_token,
            error,
            error_description,
            is_token_valid,
        }
    }

    pub fn is_token_valid(&self) -> bool {
        self.is_token_valid
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_without_error_is_valid() {
        let model: JwtModel = serde_json::from_str(r#"{"access_token":"abc"}"#).unwrap();
        assert!(model.is_token_valid());
    }

    #[test]
    fn error_response_is_invalid() {
        let model: JwtModel = serde_json::from_str(
            r#"{"error":"invalid_grant","error_description":"The username/password couple is invalid."}"#,
        )
        .unwrap();
        assert!(!model.is_token_valid());
        assert_eq!(model.error.as_deref(), Some("invalid_grant"));
    }

    #[test]
    fn empty_token_is_invalid() {
        assert!(!JwtModel::new(Some(String::new()), None, None).is_token_valid());
        assert!(!JwtModel::new(None, None, None).is_token_valid());
    }

    #[test]
    fn description_alone_makes_token_invalid() {
        let model: JwtModel =
            serde_json::from_str(r#"{"access_token":"abc","error_description":"x"}"#).unwrap();
        assert!(!model.is_token_valid());
    }

    #[test]
    fn empty_error_fields_are_ignored() {
        let model: JwtModel = serde_json::from_str(r#"{"access_token":"abc","error":""}"#).unwrap();
        assert!(model.is_token_valid());
        assert!(
            JwtModel::new(Some("abc".into()), Some(String::new()), Some(String::new()))
                .is_token_valid()
        );
    }

    #[test]
    fn validity_is_not_serialized() {
        let json = serde_json::to_value(JwtModel::new(Some("t".into()), None, None)).unwrap();
        assert!(json.get("is_token_valid").is_none());
    }
}
