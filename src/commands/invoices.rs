use serde::Deserialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::{required, CommandError, CommandResult};
use crate::models::{
    client_id_from_ref, supplier_id_from_ref, FileAttachment, Invoice, DIRECTION_ISSUED,
    DIRECTION_RECEIVED, INVOICE_STATUS_PENDING,
};
use crate::services::state::AppState;
use crate::utils::{blank_to_none, normalize_date, now_rfc3339, parse_decimal};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct InvoicePayload {
    pub id: Option<String>,
    pub direction: String,
    pub entity_id: String,
    pub number: String,
    pub date: String,
    pub amount: String,
    pub status: String,
    pub notes: String,
}

#[derive(Debug, Clone)]
pub struct FileUpload {
    pub name: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug)]
pub struct SavedInvoice {
    pub invoice: Invoice,
    /// Set when the record persisted but its attachment upload failed.
    pub attachment_error: Option<String>,
}

pub async fn list_invoices(state: &AppState) -> CommandResult<Vec<Invoice>> {
    let session = state.session()?;
    let db = state.lock_db()?;
    Ok(db.get_invoices(&session.user_id)?)
}

pub async fn save_invoice(
    state: &AppState,
    payload: InvoicePayload,
    file: Option<FileUpload>,
) -> CommandResult<SavedInvoice> {
    let session = state.session()?;

    let direction = required("direction", &payload.direction)?;
    if direction != DIRECTION_ISSUED && direction != DIRECTION_RECEIVED {
        return Err(CommandError::validation(
            "direction",
            "must be issued or received",
        ));
    }
    let entity_id = required("entity", &payload.entity_id)?;

    let amount = match blank_to_none(&payload.amount) {
        None => None,
        Some(raw) => {
            let value = parse_decimal(&raw)
                .map_err(|_| CommandError::validation("amount", "must be a number"))?;
            if !value.is_finite() || value < 0.0 {
                return Err(CommandError::validation(
                    "amount",
                    "must be a non-negative amount",
                ));
            }
            Some(value)
        }
    };

    let status = blank_to_none(&payload.status).unwrap_or_else(|| INVOICE_STATUS_PENDING.to_string());
    let invoice_date = normalize_date(blank_to_none(&payload.date));
    let now = now_rfc3339();

    // Everything the write needs is resolved before the upload so a slow or
    // failing blob store cannot leave the record half-validated.
    let (existing, entity_name) = {
        let db = state.lock_db()?;

        let existing = match payload.id.as_deref().filter(|id| !id.is_empty()) {
            Some(id) => {
                let invoice = db
                    .get_invoice_by_id(id)?
                    .ok_or(CommandError::NotFound("invoice"))?;
                if invoice.user_id != session.user_id {
                    return Err(CommandError::NotFound("invoice"));
                }
                Some(invoice)
            }
            None => None,
        };

        let entity_name = if let Some(client_id) = client_id_from_ref(&entity_id) {
            db.get_client_by_id(client_id)?.map(|c| c.name)
        } else if let Some(supplier_id) = supplier_id_from_ref(&entity_id) {
            db.get_supplier_by_id(supplier_id)?.map(|s| s.name)
        } else {
            None
        };

        (existing, entity_name)
    };

    // Upload first; a failed upload degrades the save instead of aborting it.
    let mut attachment = existing.as_ref().and_then(|i| i.attachment.clone());
    let mut attachment_error = None;
    if let Some(upload) = file {
        match state
            .files
            .store(&session.user_id, &upload.name, &upload.bytes)
            .await
        {
            Ok(stored) => {
                attachment = Some(FileAttachment {
                    url: stored.url,
                    name: stored.name,
                    size: stored.size,
                });
            }
            Err(err) => {
                warn!(error = %err, "attachment upload failed, saving invoice without it");
                attachment_error = Some(err.to_string());
            }
        }
    }

    let created = existing.is_none();
    let invoice = Invoice {
        id: existing
            .as_ref()
            .map(|i| i.id.clone())
            .unwrap_or_else(|| Uuid::new_v4().to_string()),
        direction,
        entity_id,
        entity_name,
        number: blank_to_none(&payload.number),
        invoice_date,
        amount,
        status,
        notes: blank_to_none(&payload.notes),
        attachment,
        user_id: session.user_id.clone(),
        created_at: existing
            .as_ref()
            .map(|i| i.created_at.clone())
            .unwrap_or_else(|| now.clone()),
        updated_at: now,
    };

    {
        let db = state.lock_db()?;
        db.upsert_invoice(&invoice)?;
        if created {
            db.log_activity(&session.user_id, "Invoice created", "A new invoice was added")?;
        } else {
            db.log_activity(&session.user_id, "Invoice updated", "An invoice was modified")?;
        }
    }
    info!(invoice = %invoice.id, created, degraded = attachment_error.is_some(), "invoice saved");

    Ok(SavedInvoice {
        invoice,
        attachment_error,
    })
}

pub async fn delete_invoice(state: &AppState, invoice_id: &str) -> CommandResult<()> {
    let session = state.session()?;
    let db = state.lock_db()?;
    db.delete_invoice(invoice_id, &session.user_id)?;
    db.log_activity(&session.user_id, "Invoice deleted", "An invoice was removed")?;
    info!(invoice = %invoice_id, "invoice deleted");
    Ok(())
}
