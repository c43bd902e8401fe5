use crate::cli::render;
use crate::domain;
use crate::domain::board::TaskBoard;
use crate::domain::router::{RouteState, Router};
use crate::domain::session::driven_ports::{Authenticator, SessionStore};
use crate::domain::session::{Credentials, resolve_session};
use crate::domain::todo::driven_ports::{TaskReader, TaskWriter};
use crate::domain::todo::TaskStatus;
use crate::domain::user::driven_ports::{UserReader, UserWriter};
use crate::domain::user::{NewAccount, RegistrationView};
use crate::external_connections::ExternalConnectivity;
use anyhow::Context;
use std::io::Write;
use tracing::{error, info, warn};

/// How a command ended, from the shell's point of view
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Success,
    /// The command ran but the backend or the viewer's permissions got in the way
    Failed,
    /// There is no usable session; the user has to log in again
    LoginRequired,
}

/// Something to do on the task board before showing it
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BoardAction {
    Show,
    Create {
        title: String,
        description: String,
        assignee_id: Option<i32>,
    },
    Toggle(i32),
    Edit {
        task_id: i32,
        title: Option<String>,
        description: Option<String>,
        status: Option<TaskStatus>,
        assignee_id: Option<i32>,
    },
    Delete(i32),
}

fn print(out: &mut impl Write, text: &str) -> Result<(), anyhow::Error> {
    writeln!(out, "{text}").context("writing to stdout")
}

pub async fn register(
    account: &NewAccount,
    ext_cxn: &impl ExternalConnectivity,
    u_writer: &impl UserWriter,
    out: &mut impl Write,
) -> Result<Outcome, anyhow::Error> {
    let mut view = RegistrationView::new();
    let navigation = view.submit(account, ext_cxn, u_writer).await;
    print(out, &render::registration(&view))?;

    match navigation {
        Some(_) => Ok(Outcome::Success),
        None => Ok(Outcome::Failed),
    }
}

pub async fn login(
    credentials: &Credentials,
    store: &impl SessionStore,
    ext_cxn: &impl ExternalConnectivity,
    authenticator: &impl Authenticator,
    out: &mut impl Write,
) -> Result<Outcome, anyhow::Error> {
    match domain::session::log_in(credentials, store, ext_cxn, authenticator).await {
        Ok(_) => {
            print(out, &format!("Logged in as {}.", credentials.email))?;
            Ok(Outcome::Success)
        }
        Err(err) => {
            error!("Login failed: {err}");
            let reason = match err {
                domain::Error::Rejected(detail) => detail.summary(),
                _ => None,
            };
            print(
                out,
                &format!(
                    "Login failed: {}",
                    reason.unwrap_or_else(|| "could not reach the task service".to_owned())
                ),
            )?;
            Ok(Outcome::Failed)
        }
    }
}

pub fn logout(store: &impl SessionStore, out: &mut impl Write) -> Result<Outcome, anyhow::Error> {
    domain::session::log_out(store);
    print(out, "Logged out.")?;

    Ok(Outcome::Success)
}

/// Opens the viewer's task board, applies [action] to it and prints the result
pub async fn board(
    action: BoardAction,
    store: &impl SessionStore,
    ext_cxn: &impl ExternalConnectivity,
    u_reader: &impl UserReader,
    task_read: &impl TaskReader,
    task_write: &impl TaskWriter,
    out: &mut impl Write,
) -> Result<Outcome, anyhow::Error> {
    let mut router = Router::new();
    print(out, &render::route(router.state()))?;
    router.on_resolution(resolve_session(store, ext_cxn, u_reader).await);
    let (session, user, variant) = match router.state() {
        RouteState::Resolved {
            session,
            user,
            variant,
        } => (session.clone(), user.clone(), *variant),
        state => {
            let rendered = render::route(state);
            if !rendered.is_empty() {
                print(out, &rendered)?;
            }
            print(out, render::login_prompt())?;
            return Ok(Outcome::LoginRequired);
        }
    };

    let mut task_board = TaskBoard::new(session, user, variant);
    let load_result = task_board.load(ext_cxn, task_read, u_reader).await;
    if let Err(domain::Error::Unauthorized) = load_result {
        return forced_logout(store, out);
    }

    let action_result = apply(action, &mut task_board, ext_cxn, task_read, task_write).await;
    if let Err(domain::Error::Unauthorized) = action_result {
        return forced_logout(store, out);
    }

    print(out, &render::board(&task_board))?;
    match (load_result, action_result) {
        (Ok(()), Ok(())) => Ok(Outcome::Success),
        _ => Ok(Outcome::Failed),
    }
}

async fn apply(
    action: BoardAction,
    task_board: &mut TaskBoard,
    ext_cxn: &impl ExternalConnectivity,
    task_read: &impl TaskReader,
    task_write: &impl TaskWriter,
) -> Result<(), domain::Error> {
    match action {
        BoardAction::Show => Ok(()),
        BoardAction::Create {
            title,
            description,
            assignee_id,
        } => {
            let draft = task_board.draft_mut();
            draft.title = title;
            draft.description = description;
            if assignee_id.is_some() {
                draft.assignee_id = assignee_id;
            }
            task_board.create_task(ext_cxn, task_read, task_write).await
        }
        BoardAction::Toggle(task_id) => {
            task_board
                .toggle_completion(task_id, ext_cxn, task_read, task_write)
                .await
        }
        BoardAction::Edit {
            task_id,
            title,
            description,
            status,
            assignee_id,
        } => {
            task_board.start_editing(task_id)?;
            if let Some(form) = task_board.editing_mut() {
                if let Some(title) = title {
                    form.title = title;
                }
                if let Some(description) = description {
                    form.description = description;
                }
                if let Some(status) = status {
                    form.status = status;
                }
                if let Some(assignee_id) = assignee_id {
                    form.assignee_id = assignee_id;
                }
            }
            let save_result = task_board.save_edit(ext_cxn, task_read, task_write).await;
            if save_result.is_err() {
                task_board.cancel_editing();
            }
            save_result
        }
        BoardAction::Delete(task_id) => {
            task_board
                .delete_task(task_id, ext_cxn, task_read, task_write)
                .await
        }
    }
}

fn forced_logout(store: &impl SessionStore, out: &mut impl Write) -> Result<Outcome, anyhow::Error> {
    warn!("The backend no longer accepts the session, logging out");
    domain::session::log_out(store);
    print(out, render::login_prompt())?;
    info!("Forced logout complete");

    Ok(Outcome::LoginRequired)
}
