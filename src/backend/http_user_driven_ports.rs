use crate::domain;
use crate::domain::DrivenPortError;
use crate::domain::session::{Credentials, Session};
use crate::domain::user::{NewAccount, User};
use crate::dto;
use crate::external_connections::ExternalConnectivity;
use anyhow::{Context, anyhow};
use tracing::debug;

pub struct HttpUserReader;

impl domain::user::driven_ports::UserReader for HttpUserReader {
    #[tracing::instrument(skip_all)]
    async fn current_user(
        &self,
        session: &Session,
        ext_cxn: &impl ExternalConnectivity,
    ) -> Result<User, DrivenPortError> {
        let request = ext_cxn
            .http_client()
            .get(ext_cxn.endpoint("/users/me")?)
            .bearer_auth(session.bearer_token());

        let user: dto::user::UserResponse = super::send(request, "look up the current user")
            .await?
            .json()
            .await
            .context("decoding the current user")?;

        Ok(user.into())
    }

    #[tracing::instrument(skip_all)]
    async fn all_users(
        &self,
        session: &Session,
        ext_cxn: &impl ExternalConnectivity,
    ) -> Result<Vec<User>, DrivenPortError> {
        let request = ext_cxn
            .http_client()
            .get(ext_cxn.endpoint("/users/")?)
            .bearer_auth(session.bearer_token());

        let users: dto::user::UserList = super::send(request, "list users")
            .await?
            .json()
            .await
            .context("decoding the user list")?;

        Ok(users.into())
    }
}

pub struct HttpUserWriter;

impl domain::user::driven_ports::UserWriter for HttpUserWriter {
    #[tracing::instrument(skip_all, fields(username = %account.username))]
    async fn register(
        &self,
        account: &NewAccount,
        ext_cxn: &impl ExternalConnectivity,
    ) -> Result<User, DrivenPortError> {
        let request = ext_cxn
            .http_client()
            .post(ext_cxn.endpoint("/users/register")?)
            .json(&dto::user::RegisterBody::from(account));

        let user: dto::user::UserResponse = super::send(request, "register an account")
            .await?
            .json()
            .await
            .context("decoding the registered user")?;

        Ok(user.into())
    }
}

pub struct HttpAuthenticator;

impl domain::session::driven_ports::Authenticator for HttpAuthenticator {
    #[tracing::instrument(skip_all)]
    async fn log_in(
        &self,
        credentials: &Credentials,
        ext_cxn: &impl ExternalConnectivity,
    ) -> Result<Session, DrivenPortError> {
        let request = ext_cxn
            .http_client()
            .post(ext_cxn.endpoint("/login/access-token")?)
            .form(&dto::user::LoginForm::from(credentials));

        let token: dto::user::TokenResponse = super::send(request, "log in")
            .await?
            .json()
            .await
            .context("decoding the access token")?;

        match token.token_type.as_deref() {
            Some(token_type) if !token_type.eq_ignore_ascii_case("bearer") => {
                return Err(DrivenPortError::CommsFailure(anyhow!(
                    "backend issued an unsupported {token_type} token"
                )));
            }
            _ => {}
        }
        debug!("Received access token");

        Ok(Session::new(token.access_token))
    }
}
