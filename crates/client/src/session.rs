//! Session gate: who is signed in, and wiring that to the client.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::client::MarketDataClient;

/// Signed-in identity.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct User {
    pub uid: String,
    pub email: String,
}

/// Classified sign-in failure. The display text is shown to the user as is.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthError {
    #[error("The email address is not valid.")]
    InvalidEmail,

    #[error("No account is registered for this email.")]
    UserNotFound,

    #[error("The password is incorrect.")]
    WrongPassword,

    #[error("The email or password is incorrect.")]
    InvalidCredential,

    #[error("Login failed.")]
    Generic,
}

impl AuthError {
    /// Map an identity provider error code.
    pub fn from_code(code: &str) -> Self {
        match code {
            "INVALID_EMAIL" => Self::InvalidEmail,
            "EMAIL_NOT_FOUND" => Self::UserNotFound,
            "INVALID_PASSWORD" => Self::WrongPassword,
            "INVALID_LOGIN_CREDENTIALS" => Self::InvalidCredential,
            _ => Self::Generic,
        }
    }
}

/// External identity provider.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn sign_in(&self, email: &str, password: &str) -> Result<User, AuthError>;

    async fn sign_out(&self) -> Result<(), AuthError>;
}

/// Current user plus the operations that change it.
///
/// Subscribers see every identity change through a watch channel.
pub struct Session {
    provider: Arc<dyn IdentityProvider>,
    user: watch::Sender<Option<User>>,
    logging_in: AtomicBool,
}

impl Session {
    pub fn new(provider: Arc<dyn IdentityProvider>) -> Self {
        let (user, _) = watch::channel(None);
        Self {
            provider,
            user,
            logging_in: AtomicBool::new(false),
        }
    }

    /// Sign in. Failures are returned to the caller and never retried.
    pub async fn login(&self, email: &str, password: &str) -> Result<User, AuthError> {
        let result = {
            let _pending = LoginGuard::new(&self.logging_in);
            self.provider.sign_in(email.trim(), password).await
        };

        match result {
            Ok(user) => {
                info!("Signed in as {}", user.email);
                self.user.send_replace(Some(user.clone()));
                Ok(user)
            }
            Err(e) => {
                warn!("Sign in failed: {:?}", e);
                Err(e)
            }
        }
    }

    /// Sign out. A provider failure is logged; the local identity is dropped
    /// regardless.
    pub async fn logout(&self) {
        if let Err(e) = self.provider.sign_out().await {
            warn!("Sign out failed: {:?}", e);
        }
        if self.user.send_replace(None).is_some() {
            info!("Signed out");
        }
    }

    pub fn current_user(&self) -> Option<User> {
        self.user.borrow().clone()
    }

    pub fn is_logging_in(&self) -> bool {
        self.logging_in.load(Ordering::SeqCst)
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<User>> {
        self.user.subscribe()
    }
}

/// Raises the logging-in flag until dropped, including when the login future
/// is dropped mid-flight.
struct LoginGuard<'a>(&'a AtomicBool);

impl<'a> LoginGuard<'a> {
    fn new(flag: &'a AtomicBool) -> Self {
        flag.store(true, Ordering::SeqCst);
        Self(flag)
    }
}

impl Drop for LoginGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// Drive `client` from `session`: active while someone is signed in.
///
/// The returned task ends, stopping the client, once the session is dropped.
pub fn bind_session(session: &Session, client: MarketDataClient) -> JoinHandle<()> {
    let mut user = session.subscribe();
    tokio::spawn(async move {
        loop {
            let active = user.borrow_and_update().is_some();
            debug!("Session active: {}", active);
            client.start(active);

            if user.changed().await.is_err() {
                break;
            }
        }
        client.stop();
    })
}
