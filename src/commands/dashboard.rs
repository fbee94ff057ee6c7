use serde::Serialize;

use crate::error::CommandResult;
use crate::models::ActivityEntry;
use crate::services::state::AppState;
use crate::stats::{self, DashboardCounters};

const RECENT_ACTIVITY_LIMIT: usize = 5;

#[derive(Debug, Serialize)]
pub struct DashboardView {
    pub counters: DashboardCounters,
    pub recent_activity: Vec<ActivityEntry>,
}

pub async fn dashboard(state: &AppState) -> CommandResult<DashboardView> {
    let session = state.session()?;
    let db = state.lock_db()?;

    let invoices = db.get_invoices(&session.user_id)?;
    let recent_activity = db.recent_activity(&session.user_id, RECENT_ACTIVITY_LIMIT)?;

    Ok(DashboardView {
        counters: stats::dashboard_counters(&invoices),
        recent_activity,
    })
}
