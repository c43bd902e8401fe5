pub mod commands;
pub mod render;

use crate::app_env::Settings;
use crate::backend;
use crate::backend::file_session_store::FileSessionStore;
use crate::backend::http_task_driven_ports::{HttpTaskReader, HttpTaskWriter};
use crate::backend::http_user_driven_ports::{HttpAuthenticator, HttpUserReader, HttpUserWriter};
use crate::domain::session::Credentials;
use crate::domain::todo::TaskStatus;
use crate::domain::user::NewAccount;
use clap::{Parser, Subcommand, ValueEnum};
use commands::{BoardAction, Outcome};
use reqwest::Url;
use std::io::Write;
use std::path::PathBuf;
use tracing::info;

/// Command line client for the multi-role task board
#[derive(Parser, Debug)]
#[command(name = "taskboard", version, about)]
pub struct Cli {
    /// Base URL of the task backend's API, e.g. http://127.0.0.1:8000/api/v1
    #[arg(long, global = true)]
    pub api_url: Option<Url>,

    /// File holding the current session's token
    #[arg(long, global = true)]
    pub session_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Create a new account
    Register {
        #[arg(long)]
        username: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Start a session
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// End the current session
    Logout,
    /// Show the task board for your role
    Board,
    /// Create a task
    Create {
        title: String,
        #[arg(long, default_value = "")]
        description: String,
        /// User to assign the task to (admins only)
        #[arg(long)]
        assignee: Option<i32>,
    },
    /// Flip a task between done and not done
    Toggle { task_id: i32 },
    /// Change a task (admins only)
    Edit {
        task_id: i32,
        #[arg(long)]
        title: Option<String>,
        /// Pass an empty string to remove the description
        #[arg(long)]
        description: Option<String>,
        #[arg(long, value_enum)]
        status: Option<StatusArg>,
        #[arg(long)]
        assignee: Option<i32>,
    },
    /// Delete a task
    Delete { task_id: i32 },
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusArg {
    Pending,
    InProgress,
    Completed,
}

impl From<StatusArg> for TaskStatus {
    fn from(value: StatusArg) -> Self {
        match value {
            StatusArg::Pending => TaskStatus::Pending,
            StatusArg::InProgress => TaskStatus::InProgress,
            StatusArg::Completed => TaskStatus::Completed,
        }
    }
}

impl Cli {
    /// Command line flags win over the environment
    pub fn apply_overrides(&self, settings: &mut Settings) {
        if let Some(api_url) = &self.api_url {
            settings.api_url = api_url.clone();
        }
        if let Some(session_file) = &self.session_file {
            settings.session_file = session_file.clone();
        }
    }
}

impl Command {
    fn board_action(self) -> Option<BoardAction> {
        let action = match self {
            Command::Board => BoardAction::Show,
            Command::Create {
                title,
                description,
                assignee,
            } => BoardAction::Create {
                title,
                description,
                assignee_id: assignee,
            },
            Command::Toggle { task_id } => BoardAction::Toggle(task_id),
            Command::Edit {
                task_id,
                title,
                description,
                status,
                assignee,
            } => BoardAction::Edit {
                task_id,
                title,
                description,
                status: status.map(TaskStatus::from),
                assignee_id: assignee,
            },
            Command::Delete { task_id } => BoardAction::Delete(task_id),
            Command::Register { .. } | Command::Login { .. } | Command::Logout => return None,
        };

        Some(action)
    }
}

/// Runs one command against the real backend, printing views to [out]
pub async fn run(
    command: Command,
    settings: &Settings,
    out: &mut impl Write,
) -> Result<Outcome, anyhow::Error> {
    let ext_cxn = backend::ExternalConnectivity::new(&settings.api_url, settings.request_timeout)?;
    let store = FileSessionStore::new(settings.session_file.clone());
    info!(api_url = %settings.api_url, "Running command");

    match command {
        Command::Register {
            username,
            email,
            password,
        } => {
            let account = NewAccount {
                username,
                email,
                password,
            };
            commands::register(&account, &ext_cxn, &HttpUserWriter, out).await
        }
        Command::Login { email, password } => {
            let credentials = Credentials { email, password };
            commands::login(&credentials, &store, &ext_cxn, &HttpAuthenticator, out).await
        }
        Command::Logout => commands::logout(&store, out),
        board_command => match board_command.board_action() {
            Some(action) => {
                commands::board(
                    action,
                    &store,
                    &ext_cxn,
                    &HttpUserReader,
                    &HttpTaskReader,
                    &HttpTaskWriter,
                    out,
                )
                .await
            }
            None => Ok(Outcome::Failed),
        },
    }
}
