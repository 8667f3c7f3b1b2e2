use crate::core::config::AuthScheme;
use crate::core::errors::ApiError;
use crate::core::kernel::{envelope, RestClient, TokenStore};
use crate::core::types::AuthCredential;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::instrument;

/// Authentication operations and session token lifecycle.
///
/// Login and registration are the only operations that never attach a
/// Bearer token, since none exists yet. On success they persist the issued
/// credential through the token store before returning, so every
/// subsequent call on the same client (or a fresh client sharing the
/// persistent cache) is authenticated. Logout is purely local: backend
/// auth is stateless, so clearing the store is the whole operation.
pub struct AuthApi<R: RestClient> {
    rest: R,
    tokens: Arc<TokenStore>,
    scheme: AuthScheme,
}

impl<R: RestClient> AuthApi<R> {
    pub fn new(rest: &R, tokens: Arc<TokenStore>, scheme: AuthScheme) -> Self
    where
        R: Clone,
    {
        Self {
            rest: rest.clone(),
            tokens,
            scheme,
        }
    }

    pub(crate) fn tokens(&self) -> &Arc<TokenStore> {
        &self.tokens
    }

    /// Register a new user and start a session with the issued credential.
    #[instrument(skip(self, password), fields(email = %email))]
    pub async fn register(
        &self,
        email: &str,
        password: &str,
        full_name: &str,
    ) -> Result<AuthCredential, ApiError> {
        let body = json!({
            "email": email,
            "password": password,
            "full_name": full_name,
        });

        let value = self.rest.post("/auth/register-local", &body, false).await?;
        self.store_credential(value)
    }

    /// Log in using the configured wire convention.
    #[instrument(skip(self, password), fields(email = %email, scheme = ?self.scheme))]
    pub async fn login(&self, email: &str, password: &str) -> Result<AuthCredential, ApiError> {
        let value = match self.scheme {
            AuthScheme::Json => {
                let body = json!({ "email": email, "password": password });
                self.rest.post("/auth/login-local", &body, false).await?
            }
            AuthScheme::OAuth2Form => {
                let fields = [("username", email), ("password", password)];
                self.rest
                    .post_form("/auth/login/access-token", &fields, false)
                    .await?
            }
        };

        self.store_credential(value)
    }

    /// End the session. Purely local; no network call is made.
    pub fn logout(&self) {
        self.tokens.clear();
    }

    /// Verify the stored token against the backend.
    pub async fn test_token(&self) -> Result<Value, ApiError> {
        self.rest.post("/auth/test-token", &Value::Null, true).await
    }

    fn store_credential(&self, value: Value) -> Result<AuthCredential, ApiError> {
        let credential: AuthCredential = envelope::decode(value)?;
        self.tokens.set(&credential.access_token);
        Ok(credential)
    }
}
