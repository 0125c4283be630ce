//! Firebase Authentication over the Identity Toolkit REST API.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::session::{AuthError, IdentityProvider, User};

const SIGN_IN_URL: &str =
    "https://identitytoolkit.googleapis.com/v1/accounts:signInWithPassword";

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SignInRequest<'a> {
    email: &'a str,
    password: &'a str,
    return_secure_token: bool,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SignInResponse {
    local_id: String,
    email: String,
}

#[derive(Deserialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
}

/// Email/password sign-in against a Firebase project.
pub struct FirebaseIdentityProvider {
    client: reqwest::Client,
    api_key: String,
    endpoint: String,
}

impl FirebaseIdentityProvider {
    pub fn new(api_key: impl Into<String>) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: reqwest::Client::builder().build()?,
            api_key: api_key.into(),
            endpoint: SIGN_IN_URL.to_string(),
        })
    }

    /// Point at another sign-in endpoint, e.g. the auth emulator.
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }
}

#[async_trait]
impl IdentityProvider for FirebaseIdentityProvider {
    async fn sign_in(&self, email: &str, password: &str) -> Result<User, AuthError> {
        let response = self
            .client
            .post(&self.endpoint)
            .query(&[("key", self.api_key.as_str())])
            .json(&SignInRequest {
                email,
                password,
                return_secure_token: true,
            })
            .send()
            .await
            .map_err(|e| {
                warn!("Sign-in request failed: {}", e);
                AuthError::Generic
            })?;

        if response.status().is_success() {
            let body: SignInResponse = response.json().await.map_err(|e| {
                warn!("Failed to parse sign-in response: {}", e);
                AuthError::Generic
            })?;
            return Ok(User {
                uid: body.local_id,
                email: body.email,
            });
        }

        let status = response.status();
        let code = response
            .json::<ErrorResponse>()
            .await
            .map(|body| body.error.message)
            .unwrap_or_default();
        debug!("Sign-in rejected with {}: {}", status, code);

        Err(AuthError::from_code(error_code(&code)))
    }

    /// The REST API keeps no server-side session; dropping the local identity
    /// is all sign-out means here.
    async fn sign_out(&self) -> Result<(), AuthError> {
        Ok(())
    }
}

/// Error messages look like `CODE` or `CODE : detail`.
fn error_code(message: &str) -> &str {
    message.split(" : ").next().unwrap_or_default().trim()
}
