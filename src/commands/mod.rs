pub mod accounts;
pub mod budgets;
pub mod clients;
pub mod commercial;
pub mod dashboard;
pub mod invoices;
pub mod session;
pub mod suppliers;

use crate::auth::Session;
use crate::db::RecordScope;
use crate::models::ROLE_ACCOUNTANT;

pub(crate) fn scope_for(session: &Session) -> RecordScope<'_> {
    if session.role == ROLE_ACCOUNTANT {
        RecordScope::Accountant(&session.user_id)
    } else {
        RecordScope::Business(&session.user_id)
    }
}
