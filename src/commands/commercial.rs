use tracing::info;
use uuid::Uuid;

use crate::error::{CommandError, CommandResult};
use crate::models::{CommercialInvoice, ORIGIN_BUDGET};
use crate::services::numbering;
use crate::services::state::AppState;
use crate::utils::{now_rfc3339, today_iso};

pub async fn list_commercial_invoices(state: &AppState) -> CommandResult<Vec<CommercialInvoice>> {
    let session = state.session()?;
    let db = state.lock_db()?;
    Ok(db.get_commercial_invoices(&session.user_id)?)
}

/// Copies the budget's client reference, line items, and total verbatim into
/// a new commercial invoice. Each confirmation creates a new invoice; only
/// the generated number distinguishes repeated generations from one budget.
pub async fn generate_from_budget(
    state: &AppState,
    budget_id: &str,
) -> CommandResult<CommercialInvoice> {
    let session = state.session()?;
    let db = state.lock_db()?;

    let budget = db
        .get_budget_by_id(budget_id)?
        .ok_or(CommandError::NotFound("budget"))?;
    if budget.user_id != session.user_id {
        return Err(CommandError::NotFound("budget"));
    }

    let client_name = db
        .get_client_by_id(&budget.client_id)?
        .map(|c| c.name)
        .unwrap_or_else(|| "Client".to_string());

    let number = numbering::commercial_invoice_number(&db)?;
    let now = now_rfc3339();
    let invoice = CommercialInvoice {
        id: Uuid::new_v4().to_string(),
        number,
        client_id: budget.client_id.clone(),
        client_name,
        invoice_date: today_iso(),
        items: budget.items.clone(),
        total: budget.total,
        origin: ORIGIN_BUDGET.to_string(),
        origin_id: budget.id.clone(),
        origin_number: Some(budget.number.clone()),
        notes: Some(format!("Generated from budget {}", budget.number)),
        user_id: session.user_id.clone(),
        created_at: now.clone(),
        updated_at: now,
    };

    db.add_commercial_invoice(&invoice)?;
    db.log_activity(
        &session.user_id,
        "Commercial invoice created",
        "A commercial invoice was generated from a budget",
    )?;
    info!(invoice = %invoice.id, budget = %budget.id, number = %invoice.number, "commercial invoice generated");

    Ok(invoice)
}
