pub mod auth;
pub mod commands;
pub mod db;
pub mod error;
pub mod models;
pub mod services;
pub mod stats;
pub mod utils;

pub use error::{CommandError, CommandResult};
pub use services::state::AppState;
