use chrono::{Datelike, Local};
use rusqlite::Result as SqlResult;

use crate::db::Database;

pub const COMMERCIAL_INVOICE_PREFIX: &str = "FC";

/// Generated numbers look like `FC-2026-0007`. The sequence comes from an
/// atomic per-year counter in the record store, so two generations can never
/// collide, repeated generation from the same budget included.
pub fn commercial_invoice_number(db: &Database) -> SqlResult<String> {
    let year = Local::now().year();
    let seq = db.next_counter(&format!("commercial_invoice_{}", year))?;
    Ok(format!("{}-{}-{:04}", COMMERCIAL_INVOICE_PREFIX, year, seq))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbers_are_unique_and_increasing() {
        let db = Database::open_in_memory().unwrap();
        let first = commercial_invoice_number(&db).unwrap();
        let second = commercial_invoice_number(&db).unwrap();

        assert!(first.starts_with("FC-"));
        assert_ne!(first, second);
        assert!(first.ends_with("-0001"));
        assert!(second.ends_with("-0002"));
    }
}
