use crate::domain::router::Navigation;
use crate::domain::{DrivenPortError, RejectionDetail, validation_issues};
use crate::external_connections::ExternalConnectivity;
use derive_more::Display;
use tracing::{info, warn};
use validator::Validate;

/// What a user is allowed to do. Assigned by the backend, never changed by the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Admin,
    Staff,
    Default,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Staff => "staff",
            Self::Default => "default",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: i32,
    pub display_name: String,
    pub email: String,
    pub role: Role,
}

/// Account data submitted from the registration view
#[derive(Clone, Display, Validate)]
#[display("{username} <{email}>")]
pub struct NewAccount {
    #[validate(length(min = 1, max = 50))]
    pub username: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1))]
    pub password: String,
}

impl std::fmt::Debug for NewAccount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NewAccount")
            .field("username", &self.username)
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

pub mod driven_ports {
    use super::*;
    use crate::domain::session::Session;

    pub trait UserReader {
        /// Looks up the user the session belongs to
        async fn current_user(
            &self,
            session: &Session,
            ext_cxn: &impl ExternalConnectivity,
        ) -> Result<User, DrivenPortError>;

        async fn all_users(
            &self,
            session: &Session,
            ext_cxn: &impl ExternalConnectivity,
        ) -> Result<Vec<User>, DrivenPortError>;
    }

    pub trait UserWriter {
        async fn register(
            &self,
            account: &NewAccount,
            ext_cxn: &impl ExternalConnectivity,
        ) -> Result<User, DrivenPortError>;
    }
}

const REGISTRATION_FAILED: &str = "Registration failed";

/// State of the account registration view
#[derive(Debug, Default)]
pub struct RegistrationView {
    error: Option<String>,
}

impl RegistrationView {
    pub fn new() -> RegistrationView {
        RegistrationView::default()
    }

    /// Message explaining why the last submission failed, if it did
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Submits the account to the backend. Returns where to navigate on success; on failure
    /// the view keeps an error message and stays put.
    pub async fn submit(
        &mut self,
        account: &NewAccount,
        ext_cxn: &impl ExternalConnectivity,
        u_writer: &impl driven_ports::UserWriter,
    ) -> Option<Navigation> {
        info!("Registering account {account}");
        if let Err(errors) = account.validate() {
            let detail = RejectionDetail::FieldIssues(validation_issues(&errors));
            warn!("Account failed validation: {detail}");
            self.error = Some(
                detail
                    .summary()
                    .unwrap_or_else(|| REGISTRATION_FAILED.to_owned()),
            );
            return None;
        }

        match u_writer.register(account, ext_cxn).await {
            Ok(user) => {
                info!(user_id = user.id, "Account registered");
                self.error = None;
                Some(Navigation::Login)
            }
            Err(err) => {
                warn!("Registration failed: {err}");
                self.error = Some(registration_message(&err));
                None
            }
        }
    }
}

fn registration_message(err: &DrivenPortError) -> String {
    match err {
        DrivenPortError::Rejected(detail) => detail
            .summary()
            .unwrap_or_else(|| REGISTRATION_FAILED.to_owned()),
        _ => REGISTRATION_FAILED.to_owned(),
    }
}


#[cfg(test)]
pub(crate) mod test_util {
    use super::*;
    use crate::domain::session::Session;
    use crate::domain::test_util::{Connectivity, FakeImplementation};
    use std::sync::{Mutex, RwLock};

    /// Fake backend user table. Each user is paired with the token that authenticates as them.
    pub struct InMemoryUserPersistence {
        pub users: Vec<(User, String)>,
        pub connectivity: Connectivity,
        highest_user_id: i32,
    }

    impl InMemoryUserPersistence {
        pub fn new() -> InMemoryUserPersistence {
            InMemoryUserPersistence {
                users: Vec::new(),
                connectivity: Connectivity::Connected,
                highest_user_id: 0,
            }
        }

        pub fn new_with_users(users: &[User]) -> InMemoryUserPersistence {
            InMemoryUserPersistence {
                users: users
                    .iter()
                    .map(|user| (user.clone(), token_for(user.id)))
                    .collect(),
                connectivity: Connectivity::Connected,
                highest_user_id: users.iter().map(|user| user.id).max().unwrap_or(0),
            }
        }

        pub fn new_locked() -> RwLock<InMemoryUserPersistence> {
            RwLock::new(Self::new())
        }
    }

    /// The token the fake backend hands out for a user
    pub fn token_for(user_id: i32) -> String {
        format!("token-{user_id}")
    }

    pub fn session_for(user_id: i32) -> Session {
        Session::new(token_for(user_id))
    }

    pub fn user_default(id: i32, role: Role) -> User {
        User {
            id,
            display_name: format!("user{id}"),
            email: "jdoe@example.com".to_owned(),
            role,
        }
    }

    pub fn account_default() -> NewAccount {
        NewAccount {
            username: "jdoe".to_owned(),
            email: "jdoe@example.com".to_owned(),
            password: "hunter2".to_owned(),
        }
    }

    impl driven_ports::UserReader for RwLock<InMemoryUserPersistence> {
        async fn current_user(
            &self,
            session: &Session,
            _ext_cxn: &impl ExternalConnectivity,
        ) -> Result<User, DrivenPortError> {
            let persistence = self.read().expect("user persist rw lock poisoned");
            persistence.connectivity.blow_up_if_disconnected()?;

            persistence
                .users
                .iter()
                .find(|(_, token)| token == session.bearer_token())
                .map(|(user, _)| user.clone())
                .ok_or(DrivenPortError::Unauthorized)
        }

        async fn all_users(
            &self,
            _session: &Session,
            _ext_cxn: &impl ExternalConnectivity,
        ) -> Result<Vec<User>, DrivenPortError> {
            let persistence = self.read().expect("user persist rw lock poisoned");
            persistence.connectivity.blow_up_if_disconnected()?;

            Ok(persistence.users.iter().map(|(user, _)| user.clone()).collect())
        }
    }

    impl driven_ports::UserWriter for RwLock<InMemoryUserPersistence> {
        async fn register(
            &self,
            account: &NewAccount,
            _ext_cxn: &impl ExternalConnectivity,
        ) -> Result<User, DrivenPortError> {
            let mut persistence = self.write().expect("user persist rw lock poisoned");
            persistence.connectivity.blow_up_if_disconnected()?;

            let rejection = |message: &str| {
                DrivenPortError::Rejected(RejectionDetail::Message(message.to_owned()))
            };
            if persistence
                .users
                .iter()
                .any(|(user, _)| user.display_name == account.username)
            {
                return Err(rejection("Username already registered"));
            }
            if persistence
                .users
                .iter()
                .any(|(user, _)| user.email == account.email)
            {
                return Err(rejection("Email already registered"));
            }

            persistence.highest_user_id += 1;
            let user = User {
                id: persistence.highest_user_id,
                display_name: account.username.clone(),
                email: account.email.clone(),
                role: Role::Staff,
            };
            persistence.users.push((user.clone(), token_for(user.id)));

            Ok(user)
        }
    }

    pub struct MockUserWriter {
        pub register_result: FakeImplementation<NewAccount, Result<User, DrivenPortError>>,
    }

    impl MockUserWriter {
        pub fn new() -> MockUserWriter {
            MockUserWriter {
                register_result: FakeImplementation::new(),
            }
        }
    }

    impl driven_ports::UserWriter for Mutex<MockUserWriter> {
        async fn register(
            &self,
            account: &NewAccount,
            _ext_cxn: &impl ExternalConnectivity,
        ) -> Result<User, DrivenPortError> {
            let mut locked_self = self.lock().expect("mock user writer mutex poisoned");
            locked_self.register_result.save_arguments(account.clone());

            locked_self.register_result.return_value_result()
        }
    }
}
