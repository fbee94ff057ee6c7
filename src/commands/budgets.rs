use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use crate::error::{required, CommandError, CommandResult};
use crate::models::{Budget, BUDGET_STATUS_APPROVED, BUDGET_STATUS_DRAFT};
use crate::services::state::AppState;
use crate::stats::{self, ItemRow};
use crate::utils::{blank_to_none, normalize_date, now_rfc3339, today_iso};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct BudgetPayload {
    pub id: Option<String>,
    pub client_id: String,
    pub number: String,
    pub date: String,
    pub validity: String,
    pub items: Vec<ItemRow>,
    pub status: String,
    pub notes: String,
}

#[derive(Debug)]
pub struct SavedBudget {
    pub budget: Budget,
    /// The approved state is a trigger point: the caller may follow up with
    /// a commercial-invoice generation, but nothing happens automatically.
    pub offer_commercial_invoice: bool,
}

pub async fn list_budgets(state: &AppState) -> CommandResult<Vec<Budget>> {
    let session = state.session()?;
    let db = state.lock_db()?;
    Ok(db.get_budgets(&session.user_id)?)
}

pub async fn save_budget(state: &AppState, payload: BudgetPayload) -> CommandResult<SavedBudget> {
    let session = state.session()?;

    let client_id = required("client", &payload.client_id)?;
    let number = required("number", &payload.number)?;
    let validity_days = payload
        .validity
        .trim()
        .parse::<i64>()
        .map_err(|_| CommandError::validation("validity", "must be a whole number of days"))?;

    // Only fully-valid rows survive into the persisted list; the total is
    // recomputed from them, never taken from the form.
    let items = stats::parse_items(&payload.items);
    let total = stats::line_item_total(&items);

    let status = blank_to_none(&payload.status).unwrap_or_else(|| BUDGET_STATUS_DRAFT.to_string());
    let budget_date = normalize_date(blank_to_none(&payload.date)).unwrap_or_else(today_iso);
    let now = now_rfc3339();

    let db = state.lock_db()?;

    let existing = match payload.id.as_deref().filter(|id| !id.is_empty()) {
        Some(id) => {
            let budget = db
                .get_budget_by_id(id)?
                .ok_or(CommandError::NotFound("budget"))?;
            if budget.user_id != session.user_id {
                return Err(CommandError::NotFound("budget"));
            }
            Some(budget)
        }
        None => None,
    };

    let created = existing.is_none();
    let was_approved = existing
        .as_ref()
        .map(|b| b.status == BUDGET_STATUS_APPROVED)
        .unwrap_or(false);

    let budget = Budget {
        id: existing
            .as_ref()
            .map(|b| b.id.clone())
            .unwrap_or_else(|| Uuid::new_v4().to_string()),
        client_id,
        number,
        budget_date,
        validity_days,
        items,
        total,
        status,
        notes: blank_to_none(&payload.notes),
        user_id: session.user_id.clone(),
        created_at: existing
            .as_ref()
            .map(|b| b.created_at.clone())
            .unwrap_or_else(|| now.clone()),
        updated_at: now,
    };

    db.upsert_budget(&budget)?;
    if created {
        db.log_activity(&session.user_id, "Budget created", "A new budget was created")?;
    } else {
        db.log_activity(&session.user_id, "Budget updated", "A budget was modified")?;
    }

    let offer_commercial_invoice = budget.status == BUDGET_STATUS_APPROVED && !was_approved;
    info!(budget = %budget.id, created, offer_commercial_invoice, "budget saved");

    Ok(SavedBudget {
        budget,
        offer_commercial_invoice,
    })
}

pub async fn delete_budget(state: &AppState, budget_id: &str) -> CommandResult<()> {
    let session = state.session()?;
    let db = state.lock_db()?;
    db.delete_budget(budget_id, &session.user_id)?;
    db.log_activity(&session.user_id, "Budget deleted", "A budget was removed")?;
    info!(budget = %budget_id, "budget deleted");
    Ok(())
}
