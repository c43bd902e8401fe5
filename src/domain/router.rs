use crate::domain::session::{Resolution, Session};
use crate::domain::user::{Role, User};

/// Places the client can send the user outside of the task board
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Navigation {
    Login,
}

/// What a task board variant lets its viewer do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Permissions {
    pub can_create: bool,
    /// Choose who a new or edited task belongs to. Without it, new tasks go to the viewer.
    pub can_assign: bool,
    /// Change title, description, status and assignee of an existing task
    pub can_edit: bool,
    pub can_toggle: bool,
    pub can_delete: bool,
}

/// The three flavors of task board
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewVariant {
    Admin,
    Staff,
    Default,
}

impl ViewVariant {
    pub fn for_role(role: Role) -> ViewVariant {
        match role {
            Role::Admin => ViewVariant::Admin,
            Role::Staff => ViewVariant::Staff,
            Role::Default => ViewVariant::Default,
        }
    }

    pub fn permissions(&self) -> Permissions {
        match self {
            Self::Admin => Permissions {
                can_create: true,
                can_assign: true,
                can_edit: true,
                can_toggle: true,
                can_delete: true,
            },
            Self::Staff => Permissions {
                can_create: false,
                can_assign: false,
                can_edit: false,
                can_toggle: true,
                can_delete: false,
            },
            Self::Default => Permissions {
                can_create: true,
                can_assign: false,
                can_edit: false,
                can_toggle: true,
                can_delete: true,
            },
        }
    }

    pub fn heading(&self) -> &'static str {
        match self {
            Self::Admin => "Admin Dashboard",
            Self::Staff => "My Tasks",
            Self::Default => "Task Board",
        }
    }

    /// Shown after the viewer's name in the greeting
    pub fn greeting_suffix(&self) -> Option<&'static str> {
        match self {
            Self::Admin => Some("(Admin)"),
            Self::Staff => Some("(Staff)"),
            Self::Default => None,
        }
    }

    pub fn empty_message(&self) -> &'static str {
        match self {
            Self::Admin => "No tasks found.",
            Self::Staff => "You have no tasks assigned yet.",
            Self::Default => "No tasks yet. Create one above!",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteState {
    Loading,
    Resolved {
        session: Session,
        user: User,
        variant: ViewVariant,
    },
    /// The session is gone; navigation to login is already under way, so nothing renders
    Redirecting,
}

/// Picks the view for the home page once the session resolver is done
#[derive(Debug)]
pub struct Router {
    state: RouteState,
}

impl Router {
    pub fn new() -> Router {
        Router {
            state: RouteState::Loading,
        }
    }

    pub fn state(&self) -> &RouteState {
        &self.state
    }

    /// Moves out of the loading state. Returns where to navigate, if anywhere.
    pub fn on_resolution(&mut self, resolution: Resolution) -> Option<Navigation> {
        match resolution {
            Resolution::Resolved { session, user } => {
                let variant = ViewVariant::for_role(user.role);
                self.state = RouteState::Resolved {
                    session,
                    user,
                    variant,
                };
                None
            }
            Resolution::RedirectToLogin => {
                self.state = RouteState::Redirecting;
                Some(Navigation::Login)
            }
        }
    }
}

impl Default for Router {
    fn default() -> Self {
        Router::new()
    }
}
