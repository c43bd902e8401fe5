pub mod app_env;
pub mod backend;
pub mod cli;
pub mod domain;
pub mod dto;
pub mod external_connections;
pub mod logging;
