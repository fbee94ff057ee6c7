use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use crate::error::{required, CommandError, CommandResult};
use crate::models::{Supplier, ROLE_ACCOUNTANT};
use crate::services::state::AppState;
use crate::utils::{blank_to_none, now_rfc3339};

use super::scope_for;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SupplierPayload {
    pub id: Option<String>,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub tax_id: String,
    pub address: String,
    pub notes: String,
}

pub async fn list_suppliers(state: &AppState) -> CommandResult<Vec<Supplier>> {
    let session = state.session()?;
    let db = state.lock_db()?;
    Ok(db.get_suppliers(scope_for(&session))?)
}

pub async fn save_supplier(state: &AppState, payload: SupplierPayload) -> CommandResult<Supplier> {
    let session = state.session()?;
    let name = required("name", &payload.name)?;

    let db = state.lock_db()?;
    let now = now_rfc3339();

    let (mut supplier, created) = match payload.id.as_deref().filter(|id| !id.is_empty()) {
        Some(id) => {
            let existing = db
                .get_supplier_by_id(id)?
                .ok_or(CommandError::NotFound("supplier"))?;
            (existing, false)
        }
        None => (
            Supplier {
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

    supplier.name = name;
    supplier.email = blank_to_none(&payload.email);
    supplier.phone = blank_to_none(&payload.phone);
    supplier.tax_id = blank_to_none(&payload.tax_id);
    supplier.address = blank_to_none(&payload.address);
    supplier.notes = blank_to_none(&payload.notes);
    supplier.updated_at = now;

    db.upsert_supplier(&supplier)?;
    if created {
        db.log_activity(&session.user_id, "Supplier created", "A new supplier was added")?;
    } else {
        db.log_activity(&session.user_id, "Supplier updated", "A supplier was modified")?;
    }
    info!(supplier = %supplier.id, created, "supplier saved");

    Ok(supplier)
}

pub async fn delete_supplier(state: &AppState, supplier_id: &str) -> CommandResult<()> {
    let session = state.session()?;
    let db = state.lock_db()?;
    db.delete_supplier(supplier_id)?;
    db.log_activity(&session.user_id, "Supplier deleted", "A supplier was removed")?;
    info!(supplier = %supplier_id, "supplier deleted");
    Ok(())
}
