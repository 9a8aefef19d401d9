//! OpenAPI/Utoipa configuration.

use crate::api::{AUTH_TAG, health::MISC_TAG};
use utoipa::{
    Modify, OpenApi,
    openapi::security::{Flow, OAuth2, Password, Scopes, SecurityScheme},
};

/// Documents the password flow served by `/api/auth`.
pub struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            let oauth2 = OAuth2::new([Flow::Password(Password::new(
                "/api/auth",
                Scopes::from_iter([
                    ("openid", "Always granted"),
                    ("profile", "Adds the user name to the ID token"),
                    ("roles", "Role membership"),
                ]),
            ))]);
            components.add_security_scheme("OAuth2", SecurityScheme::OAuth2(oauth2));
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Auth Server API",
        version = "1.0.0",
        description = "Password-grant token issuance."
    ),
    tags(
        (name = MISC_TAG, description = "Miscellaneous endpoints"),
        (name = AUTH_TAG, description = "Token endpoints")
    )
)]
pub struct ApiDoc;
