//! Session lifecycle: created by logging in, checked against the backend whenever a view
//! opens, and destroyed by logging out or by the backend refusing it.

use crate::domain;
use crate::domain::DrivenPortError;
use crate::domain::router::Navigation;
use crate::domain::user::User;
use crate::domain::user::driven_ports::UserReader;
use crate::external_connections::ExternalConnectivity;
use tracing::{error, info, warn};

/// Proof of authentication handed to every view that talks to the backend
#[derive(Clone, PartialEq, Eq)]
pub struct Session {
    token: String,
}

impl Session {
    pub fn new(token: impl Into<String>) -> Session {
        Session {
            token: token.into(),
        }
    }

    pub fn bearer_token(&self) -> &str {
        &self.token
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session").field("token", &"<redacted>").finish()
    }
}

/// Login form contents
#[derive(Clone)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

pub mod driven_ports {
    use super::*;

    /// Keeps the session's token between runs of the client
    #[cfg_attr(test, mockall::automock)]
    pub trait SessionStore {
        fn load(&self) -> Result<Option<Session>, anyhow::Error>;
        fn save(&self, session: &Session) -> Result<(), anyhow::Error>;
        fn clear(&self) -> Result<(), anyhow::Error>;
    }

    pub trait Authenticator {
        /// Exchanges credentials for a new session
        async fn log_in(
            &self,
            credentials: &Credentials,
            ext_cxn: &impl ExternalConnectivity,
        ) -> Result<Session, DrivenPortError>;
    }
}

use driven_ports::{Authenticator, SessionStore};

/// Outcome of checking the stored session against the backend
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Resolved { session: Session, user: User },
    RedirectToLogin,
}

/// Looks up the user behind the stored session. Makes exactly one attempt; any failure at all
/// removes the stored token and sends the user to the login view.
pub async fn resolve_session(
    store: &impl SessionStore,
    ext_cxn: &impl ExternalConnectivity,
    u_reader: &impl UserReader,
) -> Resolution {
    let session = match store.load() {
        Ok(Some(session)) => session,
        Ok(None) => {
            info!("No stored session");
            return redirect_to_login(store);
        }
        Err(err) => {
            warn!("Could not read the stored session: {err:#}");
            return redirect_to_login(store);
        }
    };

    match u_reader.current_user(&session, ext_cxn).await {
        Ok(user) => {
            info!(user_id = user.id, role = user.role.as_str(), "Session resolved");
            Resolution::Resolved { session, user }
        }
        Err(err) => {
            warn!("Session could not be resolved: {err}");
            redirect_to_login(store)
        }
    }
}

fn redirect_to_login(store: &impl SessionStore) -> Resolution {
    if let Err(err) = store.clear() {
        error!("Failed to clear the stored session: {err:#}");
    }

    Resolution::RedirectToLogin
}

/// Creates a session from the given credentials and stores it
pub async fn log_in(
    credentials: &Credentials,
    store: &impl SessionStore,
    ext_cxn: &impl ExternalConnectivity,
    authenticator: &impl Authenticator,
) -> Result<Session, domain::Error> {
    info!("Logging in as {}", credentials.email);
    let session = authenticator
        .log_in(credentials, ext_cxn)
        .await
        .map_err(|err| err.into_error_trying_to("log in"))?;

    store
        .save(&session)
        .map_err(|err| domain::Error::RetrieveFailure {
            action: "store the session".into(),
            cause: err,
        })?;

    Ok(session)
}

/// Destroys the stored session
pub fn log_out(store: &impl SessionStore) -> Navigation {
    info!("Logging out");
    if let Err(err) = store.clear() {
        error!("Failed to clear the stored session: {err:#}");
    }

    Navigation::Login
}
