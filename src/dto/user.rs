use crate::domain;
use crate::domain::user::Role;
use serde::{Deserialize, Serialize};

/// DTO for a user returned by the backend
#[derive(Debug, Deserialize)]
pub struct UserResponse {
    pub id: i32,
    #[serde(alias = "username")]
    pub custom_username: Option<String>,
    #[serde(default)]
    pub full_name: Option<String>,
    pub email: String,
    #[serde(default)]
    pub role: Option<String>,
}

fn role_from_wire(role: Option<&str>) -> Role {
    match role.map(str::to_ascii_lowercase).as_deref() {
        Some("admin") => Role::Admin,
        Some("staff") => Role::Staff,
        _ => Role::Default,
    }
}

impl From<UserResponse> for domain::user::User {
    fn from(value: UserResponse) -> Self {
        let display_name = value
            .custom_username
            .or(value.full_name)
            .filter(|name| !name.trim().is_empty())
            .unwrap_or_else(|| value.email.clone());

        domain::user::User {
            id: value.id,
            role: role_from_wire(value.role.as_deref()),
            display_name,
            email: value.email,
        }
    }
}

/// The user listing arrives either as a bare array or wrapped in a page object
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum UserList {
    Plain(Vec<UserResponse>),
    Paged { data: Vec<UserResponse> },
}

impl From<UserList> for Vec<domain::user::User> {
    fn from(value: UserList) -> Self {
        let users = match value {
            UserList::Plain(users) => users,
            UserList::Paged { data } => data,
        };

        users.into_iter().map(domain::user::User::from).collect()
    }
}

/// DTO for registering a new account
#[derive(Serialize)]
pub struct RegisterBody<'a> {
    pub custom_username: &'a str,
    pub email: &'a str,
    pub password: &'a str,
}

impl<'a> From<&'a domain::user::NewAccount> for RegisterBody<'a> {
    fn from(value: &'a domain::user::NewAccount) -> Self {
        RegisterBody {
            custom_username: &value.username,
            email: &value.email,
            password: &value.password,
        }
    }
}

/// Form body for the OAuth2 password login. The backend calls the email the username.
#[derive(Serialize)]
pub struct LoginForm<'a> {
    pub username: &'a str,
    pub password: &'a str,
}

impl<'a> From<&'a domain::session::Credentials> for LoginForm<'a> {
    fn from(value: &'a domain::session::Credentials) -> Self {
        LoginForm {
            username: &value.email,
            password: &value.password,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub token_type: Option<String>,
}
