use thiserror::Error;

/// One failure per user intent; nothing here is fatal to the process.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("{field}: {message}")]
    Validation { field: &'static str, message: String },

    #[error("not signed in")]
    Unauthorized,

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error(transparent)]
    Auth(#[from] crate::auth::AuthError),

    #[error("record store: {0}")]
    Store(#[from] rusqlite::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl CommandError {
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        CommandError::Validation {
            field,
            message: message.into(),
        }
    }
}

pub type CommandResult<T> = Result<T, CommandError>;

pub(crate) fn required(field: &'static str, value: &str) -> CommandResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(CommandError::validation(field, "this field is required"));
    }
    Ok(trimmed.to_string())
}
