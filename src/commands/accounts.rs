use std::collections::BTreeMap;

use crate::error::CommandResult;
use crate::services::state::AppState;
use crate::stats::{self, AccountBalance};

use super::scope_for;

/// Per-client running balances over the session's loaded records.
pub async fn account_overview(state: &AppState) -> CommandResult<BTreeMap<String, AccountBalance>> {
    let session = state.session()?;
    let db = state.lock_db()?;

    let clients = db.get_clients(scope_for(&session))?;
    let invoices = db.get_invoices(&session.user_id)?;

    Ok(stats::account_balances(&clients, &invoices))
}
