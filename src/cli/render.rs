//! Plain-text renditions of the client's views

use crate::domain::board::TaskBoard;
use crate::domain::router::{RouteState, ViewVariant};
use crate::domain::todo::{Task, TaskStatus};
use crate::domain::user::{RegistrationView, User};

pub const LOADING: &str = "Loading...";

pub fn login_prompt() -> &'static str {
    "Not logged in. Run `taskboard login --email <email> --password <password>` to continue."
}

/// What the home route shows before a board has been loaded. A redirect renders nothing,
/// since the user is already on the way to the login view.
pub fn route(state: &RouteState) -> String {
    match state {
        RouteState::Loading => LOADING.to_owned(),
        RouteState::Redirecting => String::new(),
        RouteState::Resolved { user, variant, .. } => header(*variant, user),
    }
}

fn header(variant: ViewVariant, viewer: &User) -> String {
    match variant.greeting_suffix() {
        Some(suffix) => format!(
            "{}\nWelcome, {} {suffix}",
            variant.heading(),
            viewer.display_name
        ),
        None => format!("{}\nWelcome, {}", variant.heading(), viewer.display_name),
    }
}

fn status_badge(status: TaskStatus) -> String {
    status.as_str().replace('_', " ").to_uppercase()
}

pub fn task_card(task: &Task, board: &TaskBoard) -> String {
    let checkbox = if task.status.is_completed() {
        "[x]"
    } else {
        "[ ]"
    };
    let mut card = format!(
        "{checkbox} {} (#{}) [{}]",
        task.title,
        task.id,
        status_badge(task.status)
    );

    if let Some(description) = task.description.as_deref().filter(|desc| !desc.is_empty()) {
        card.push_str(&format!("\n    {description}"));
    }
    match board.assignee_name(task.assignee_id) {
        Some(name) => {
            card.push_str(&format!("\n    Assigned to: {name} (#{})", task.assignee_id));
        }
        None => {
            card.push_str(&format!("\n    Assigned to: #{}", task.assignee_id));
        }
    }

    card
}

pub fn board(board: &TaskBoard) -> String {
    let mut rendered = header(board.variant(), board.viewer());

    if board.permissions().can_assign && !board.assignees().is_empty() {
        let assignees = board
            .assignees()
            .iter()
            .map(|user| format!("{} (#{})", user.display_name, user.id))
            .collect::<Vec<_>>()
            .join(", ");
        rendered.push_str(&format!("\nAssignees: {assignees}"));
    }

    rendered.push('\n');
    if board.tasks().is_empty() {
        rendered.push_str(&format!("\n{}", board.variant().empty_message()));
    }
    for task in board.tasks() {
        rendered.push_str(&format!("\n{}", task_card(task, board)));
    }

    rendered
}

pub fn registration(view: &RegistrationView) -> String {
    match view.error() {
        Some(error) => format!("Registration failed: {error}"),
        None => "Account created. Log in to see your tasks.".to_owned(),
    }
}
