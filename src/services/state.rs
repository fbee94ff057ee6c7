use anyhow::anyhow;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::auth::Session;
use crate::db::Database;
use crate::error::{CommandError, CommandResult};
use crate::services::storage::FileStore;

/// Explicit application state handed to every command; the session slot is
/// the only mutable piece outside the record store.
pub struct AppState {
    pub db: Arc<Mutex<Database>>,
    pub files: FileStore,
    session: Mutex<Option<Session>>,
}

impl AppState {
    pub fn new(db: Database, files: FileStore) -> Self {
        AppState {
            db: Arc::new(Mutex::new(db)),
            files,
            session: Mutex::new(None),
        }
    }

    pub fn lock_db(&self) -> CommandResult<MutexGuard<'_, Database>> {
        self.db
            .lock()
            .map_err(|_| CommandError::Other(anyhow!("database lock poisoned")))
    }

    pub fn session(&self) -> CommandResult<Session> {
        self.session
            .lock()
            .map_err(|_| CommandError::Other(anyhow!("session lock poisoned")))?
            .clone()
            .ok_or(CommandError::Unauthorized)
    }

    pub fn set_session(&self, session: Session) {
        if let Ok(mut guard) = self.session.lock() {
            *guard = Some(session);
        }
    }

    pub fn clear_session(&self) {
        if let Ok(mut guard) = self.session.lock() {
            *guard = None;
        }
    }
}
