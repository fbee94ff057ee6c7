use serde::Deserialize;
use tracing::info;

use crate::auth::{self, Session, SignUpPayload};
use crate::error::CommandResult;
use crate::services::state::AppState;

#[derive(Debug, Clone, Deserialize)]
pub struct SignInPayload {
    pub email: String,
    pub password: String,
    pub role: String,
}

/// Registration does not start a session; the user signs in afterwards, as
/// the auth view does.
pub async fn sign_up(state: &AppState, payload: SignUpPayload) -> CommandResult<()> {
    let user = {
        let db = state.lock_db()?;
        auth::sign_up(&db, &payload)?
    };
    info!(email = %user.email, role = %user.role, "account created");
    Ok(())
}

pub async fn sign_in(state: &AppState, payload: SignInPayload) -> CommandResult<Session> {
    let session = {
        let db = state.lock_db()?;
        auth::sign_in(&db, &payload.email, &payload.password, &payload.role)?
    };
    state.set_session(session.clone());
    info!(user = %session.user_id, "session started");
    Ok(session)
}

pub async fn sign_out(state: &AppState) -> CommandResult<()> {
    state.clear_session();
    Ok(())
}
