use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use crate::error::{required, CommandError, CommandResult};
use crate::models::{Client, ROLE_ACCOUNTANT};
use crate::services::state::AppState;
use crate::utils::{blank_to_none, now_rfc3339};

use super::scope_for;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ClientPayload {
    pub id: Option<String>,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub tax_id: String,
    pub address: String,
    pub notes: String,
}

pub async fn list_clients(state: &AppState) -> CommandResult<Vec<Client>> {
    let session = state.session()?;
    let db = state.lock_db()?;
    Ok(db.get_clients(scope_for(&session))?)
}

pub async fn save_client(state: &AppState, payload: ClientPayload) -> CommandResult<Client> {
    let session = state.session()?;
    let name = required("name", &payload.name)?;

    let db = state.lock_db()?;
    let now = now_rfc3339();

    let (mut client, created) = match payload.id.as_deref().filter(|id| !id.is_empty()) {
        Some(id) => {
            let existing = db
                .get_client_by_id(id)?
                .ok_or(CommandError::NotFound("client"))?;
            (existing, false)
        }
        None => (
            Client {
                id: Uuid::new_v4().to_string(),
                name: String::new(),
                email: None,
                phone: None,
                tax_id: None,
                address: None,
                notes: None,
                user_id: session.user_id.clone(),
                accountant_id: (session.role == ROLE_ACCOUNTANT).then(|| session.user_id.clone()),
                created_at: now.clone(),
                updated_at: now.clone(),
            },
            true,
        ),
    };

    client.name = name;
    client.email = blank_to_none(&payload.email);
    client.phone = blank_to_none(&payload.phone);
    client.tax_id = blank_to_none(&payload.tax_id);
    client.address = blank_to_none(&payload.address);
    client.notes = blank_to_none(&payload.notes);
    client.updated_at = now;

    db.upsert_client(&client)?;
    if created {
        db.log_activity(&session.user_id, "Client created", "A new client was added")?;
    } else {
        db.log_activity(&session.user_id, "Client updated", "A client was modified")?;
    }
    info!(client = %client.id, created, "client saved");

    Ok(client)
}

pub async fn delete_client(state: &AppState, client_id: &str) -> CommandResult<()> {
    let session = state.session()?;
    let db = state.lock_db()?;
    db.delete_client(client_id)?;
    db.log_activity(&session.user_id, "Client deleted", "A client was removed")?;
    info!(client = %client_id, "client deleted");
    Ok(())
}
