//! Wire formats of the task backend's REST API

pub mod error;
pub mod task;
pub mod user;
