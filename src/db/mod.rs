use rusqlite::{params, Connection, OptionalExtension, Result as SqlResult, Row};
use std::path::PathBuf;

use crate::models::{
    ActivityEntry, Budget, BudgetItem, Client, CommercialInvoice, FileAttachment, Invoice,
    Supplier, User,
};
use crate::utils::now_rfc3339;

/// How a directory read is scoped: business owners see the records they
/// created, accountants see the records assigned to them.
#[derive(Debug, Clone, Copy)]
pub enum RecordScope<'a> {
    Business(&'a str),
    Accountant(&'a str),
}

pub struct Database {
    conn: Connection,
}

impl Database {
    pub fn new(db_path: PathBuf) -> SqlResult<Self> {
        let conn = Connection::open(db_path)?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        let mut db = Database { conn };
        db.run_migrations()?;
        Ok(db)
    }

    pub fn open_in_memory() -> SqlResult<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        let mut db = Database { conn };
        db.run_migrations()?;
        Ok(db)
    }

    fn run_migrations(&mut self) -> SqlResult<()> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS schema_migrations (
                name TEXT PRIMARY KEY,
                applied_at TEXT NOT NULL
            );",
        )?;

        let migrations = vec![
            (
                "001_create_users.sql",
                include_str!(concat!(
                    env!("CARGO_MANIFEST_DIR"),
                    "/migrations/001_create_users.sql"
                )),
            ),
            (
                "002_create_directory.sql",
                include_str!(concat!(
                    env!("CARGO_MANIFEST_DIR"),
                    "/migrations/002_create_directory.sql"
                )),
            ),
            (
                "003_create_billing.sql",
                include_str!(concat!(
                    env!("CARGO_MANIFEST_DIR"),
                    "/migrations/003_create_billing.sql"
                )),
            ),
            (
                "004_create_activity_and_counters.sql",
                include_str!(concat!(
                    env!("CARGO_MANIFEST_DIR"),
                    "/migrations/004_create_activity_and_counters.sql"
                )),
            ),
        ];

        for (name, sql) in migrations {
            let applied: Option<String> = self
                .conn
                .query_row(
                    "SELECT name FROM schema_migrations WHERE name = ?1",
                    params![name],
                    |row| row.get(0),
                )
                .optional()?;

            if applied.is_none() {
                let tx = self.conn.transaction()?;
                tx.execute_batch(sql)?;
                tx.execute(
                    "INSERT INTO schema_migrations (name, applied_at) VALUES (?1, datetime('now'))",
                    params![name],
                )?;
                tx.commit()?;
            }
        }

        Ok(())
    }

    // ---- users ----

    pub fn insert_user(&self, user: &User) -> SqlResult<()> {
        self.conn.execute(
            "INSERT INTO users (id, name, email, password_hash, role, assigned_clients, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                user.id,
                user.name,
                user.email,
                user.password_hash,
                user.role,
                to_json(&user.assigned_clients)?,
                user.created_at,
                user.updated_at
            ],
        )?;
        Ok(())
    }

    pub fn get_user_by_email(&self, email: &str) -> SqlResult<Option<User>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, email, password_hash, role, assigned_clients, created_at, updated_at
             FROM users WHERE email = ?1",
        )?;
        stmt.query_row(params![email], map_user).optional()
    }

    pub fn get_user_by_id(&self, id: &str) -> SqlResult<Option<User>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, email, password_hash, role, assigned_clients, created_at, updated_at
             FROM users WHERE id = ?1",
        )?;
        stmt.query_row(params![id], map_user).optional()
    }

    // ---- clients ----

    pub fn upsert_client(&self, client: &Client) -> SqlResult<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO clients (
                id, name, email, phone, tax_id, address, notes,
                user_id, accountant_id, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
            params![
                client.id,
                client.name,
                client.email,
                client.phone,
                client.tax_id,
                client.address,
                client.notes,
                client.user_id,
                client.accountant_id,
                client.created_at,
                client.updated_at
            ],
        )?;
        Ok(())
    }

    pub fn get_client_by_id(&self, id: &str) -> SqlResult<Option<Client>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, email, phone, tax_id, address, notes,
                    user_id, accountant_id, created_at, updated_at
             FROM clients WHERE id = ?1",
        )?;
        stmt.query_row(params![id], map_client).optional()
    }

    pub fn get_clients(&self, scope: RecordScope) -> SqlResult<Vec<Client>> {
        let (sql, owner) = match scope {
            RecordScope::Business(user_id) => (
                "SELECT id, name, email, phone, tax_id, address, notes,
                        user_id, accountant_id, created_at, updated_at
                 FROM clients WHERE user_id = ?1 ORDER BY name",
                user_id,
            ),
            RecordScope::Accountant(accountant_id) => (
                "SELECT id, name, email, phone, tax_id, address, notes,
                        user_id, accountant_id, created_at, updated_at
                 FROM clients WHERE accountant_id = ?1 ORDER BY name",
                accountant_id,
            ),
        };

        let mut stmt = self.conn.prepare(sql)?;
        let rows = stmt.query_map(params![owner], map_client)?;
        rows.collect()
    }

    pub fn delete_client(&self, id: &str) -> SqlResult<()> {
        // Hard delete; invoices referencing the client are left untouched.
        self.conn
            .execute("DELETE FROM clients WHERE id = ?1", params![id])?;
        Ok(())
    }

    // ---- suppliers ----

    pub fn upsert_supplier(&self, supplier: &Supplier) -> SqlResult<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO suppliers (
                id, name, email, phone, tax_id, address, notes,
                user_id, accountant_id, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
            params![
                supplier.id,
                supplier.name,
                supplier.email,
                supplier.phone,
                supplier.tax_id,
                supplier.address,
                supplier.notes,
                supplier.user_id,
                supplier.accountant_id,
                supplier.created_at,
                supplier.updated_at
            ],
        )?;
        Ok(())
    }

    pub fn get_supplier_by_id(&self, id: &str) -> SqlResult<Option<Supplier>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, email, phone, tax_id, address, notes,
                    user_id, accountant_id, created_at, updated_at
             FROM suppliers WHERE id = ?1",
        )?;
        stmt.query_row(params![id], map_supplier).optional()
    }

    pub fn get_suppliers(&self, scope: RecordScope) -> SqlResult<Vec<Supplier>> {
        let (sql, owner) = match scope {
            RecordScope::Business(user_id) => (
                "SELECT id, name, email, phone, tax_id, address, notes,
                        user_id, accountant_id, created_at, updated_at
                 FROM suppliers WHERE user_id = ?1 ORDER BY name",
                user_id,
            ),
            RecordScope::Accountant(accountant_id) => (
                "SELECT id, name, email, phone, tax_id, address, notes,
                        user_id, accountant_id, created_at, updated_at
                 FROM suppliers WHERE accountant_id = ?1 ORDER BY name",
                accountant_id,
            ),
        };

        let mut stmt = self.conn.prepare(sql)?;
        let rows = stmt.query_map(params![owner], map_supplier)?;
        rows.collect()
    }

    pub fn delete_supplier(&self, id: &str) -> SqlResult<()> {
        self.conn
            .execute("DELETE FROM suppliers WHERE id = ?1", params![id])?;
        Ok(())
    }

    // ---- invoices ----

    pub fn upsert_invoice(&self, invoice: &Invoice) -> SqlResult<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO invoices (
                id, direction, entity_id, entity_name, number, invoice_date, amount,
                status, notes, file_url, file_name, file_size, user_id, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)",
            params![
                invoice.id,
                invoice.direction,
                invoice.entity_id,
                invoice.entity_name,
                invoice.number,
                invoice.invoice_date,
                invoice.amount,
                invoice.status,
                invoice.notes,
                invoice.attachment.as_ref().map(|a| a.url.as_str()),
                invoice.attachment.as_ref().map(|a| a.name.as_str()),
                invoice.attachment.as_ref().map(|a| a.size as i64),
                invoice.user_id,
                invoice.created_at,
                invoice.updated_at
            ],
        )?;
        Ok(())
    }

    pub fn get_invoice_by_id(&self, id: &str) -> SqlResult<Option<Invoice>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, direction, entity_id, entity_name, number, invoice_date, amount,
                    status, notes, file_url, file_name, file_size, user_id, created_at, updated_at
             FROM invoices WHERE id = ?1",
        )?;
        stmt.query_row(params![id], map_invoice).optional()
    }

    pub fn get_invoices(&self, user_id: &str) -> SqlResult<Vec<Invoice>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, direction, entity_id, entity_name, number, invoice_date, amount,
                    status, notes, file_url, file_name, file_size, user_id, created_at, updated_at
             FROM invoices
             WHERE user_id = ?1
             ORDER BY invoice_date DESC",
        )?;
        let rows = stmt.query_map(params![user_id], map_invoice)?;
        rows.collect()
    }

    pub fn delete_invoice(&self, id: &str, user_id: &str) -> SqlResult<()> {
        self.conn.execute(
            "DELETE FROM invoices WHERE id = ?1 AND user_id = ?2",
            params![id, user_id],
        )?;
        Ok(())
    }

    // ---- budgets ----

    pub fn upsert_budget(&self, budget: &Budget) -> SqlResult<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO budgets (
                id, client_id, number, budget_date, validity_days, items, total,
                status, notes, user_id, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
            params![
                budget.id,
                budget.client_id,
                budget.number,
                budget.budget_date,
                budget.validity_days,
                to_json(&budget.items)?,
                budget.total,
                budget.status,
                budget.notes,
                budget.user_id,
                budget.created_at,
                budget.updated_at
            ],
        )?;
        Ok(())
    }

    pub fn get_budget_by_id(&self, id: &str) -> SqlResult<Option<Budget>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, client_id, number, budget_date, validity_days, items, total,
                    status, notes, user_id, created_at, updated_at
             FROM budgets WHERE id = ?1",
        )?;
        stmt.query_row(params![id], map_budget).optional()
    }

    pub fn get_budgets(&self, user_id: &str) -> SqlResult<Vec<Budget>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, client_id, number, budget_date, validity_days, items, total,
                    status, notes, user_id, created_at, updated_at
             FROM budgets
             WHERE user_id = ?1
             ORDER BY budget_date DESC",
        )?;
        let rows = stmt.query_map(params![user_id], map_budget)?;
        rows.collect()
    }

    pub fn delete_budget(&self, id: &str, user_id: &str) -> SqlResult<()> {
        self.conn.execute(
            "DELETE FROM budgets WHERE id = ?1 AND user_id = ?2",
            params![id, user_id],
        )?;
        Ok(())
    }

    // ---- commercial invoices ----

    pub fn add_commercial_invoice(&self, invoice: &CommercialInvoice) -> SqlResult<()> {
        self.conn.execute(
            "INSERT INTO commercial_invoices (
                id, number, client_id, client_name, invoice_date, items, total,
                origin, origin_id, origin_number, notes, user_id, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)",
            params![
                invoice.id,
                invoice.number,
                invoice.client_id,
                invoice.client_name,
                invoice.invoice_date,
                to_json(&invoice.items)?,
                invoice.total,
                invoice.origin,
                invoice.origin_id,
                invoice.origin_number,
                invoice.notes,
                invoice.user_id,
                invoice.created_at,
                invoice.updated_at
            ],
        )?;
        Ok(())
    }

    pub fn get_commercial_invoices(&self, user_id: &str) -> SqlResult<Vec<CommercialInvoice>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, number, client_id, client_name, invoice_date, items, total,
                    origin, origin_id, origin_number, notes, user_id, created_at, updated_at
             FROM commercial_invoices
             WHERE user_id = ?1
             ORDER BY created_at DESC",
        )?;
        let rows = stmt.query_map(params![user_id], map_commercial_invoice)?;
        rows.collect()
    }

    // ---- activity log ----

    pub fn log_activity(&self, user_id: &str, title: &str, detail: &str) -> SqlResult<()> {
        self.conn.execute(
            "INSERT INTO activity_log (id, user_id, title, detail, created_at)
             VALUES (hex(randomblob(16)), ?1, ?2, ?3, ?4)",
            params![user_id, title, detail, now_rfc3339()],
        )?;
        Ok(())
    }

    pub fn recent_activity(&self, user_id: &str, limit: usize) -> SqlResult<Vec<ActivityEntry>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, user_id, title, detail, created_at
             FROM activity_log
             WHERE user_id = ?1
             ORDER BY created_at DESC
             LIMIT ?2",
        )?;
        let rows = stmt.query_map(params![user_id, limit as i64], |row| {
            Ok(ActivityEntry {
                id: row.get(0)?,
                user_id: row.get(1)?,
                title: row.get(2)?,
                detail: row.get(3)?,
                created_at: row.get(4)?,
            })
        })?;
        rows.collect()
    }

    // ---- counters ----

    pub fn next_counter(&self, key: &str) -> SqlResult<i64> {
        self.conn.execute(
            "INSERT INTO counters (key, value) VALUES (?1, 1)
             ON CONFLICT(key) DO UPDATE SET value = value + 1",
            params![key],
        )?;
        self.conn
            .query_row("SELECT value FROM counters WHERE key = ?1", params![key], |row| {
                row.get(0)
            })
    }
}

fn map_user(row: &Row) -> SqlResult<User> {
    let assigned: String = row.get(5)?;
    Ok(User {
        id: row.get(0)?,
        name: row.get(1)?,
        email: row.get(2)?,
        password_hash: row.get(3)?,
        role: row.get(4)?,
        assigned_clients: serde_json::from_str(&assigned).unwrap_or_default(),
        created_at: row.get(6)?,
        updated_at: row.get(7)?,
    })
}

fn map_client(row: &Row) -> SqlResult<Client> {
    Ok(Client {
        id: row.get(0)?,
        name: row.get(1)?,
        email: row.get(2)?,
        phone: row.get(3)?,
        tax_id: row.get(4)?,
        address: row.get(5)?,
        notes: row.get(6)?,
        user_id: row.get(7)?,
        accountant_id: row.get(8)?,
        created_at: row.get(9)?,
        updated_at: row.get(10)?,
    })
}

fn map_supplier(row: &Row) -> SqlResult<Supplier> {
    Ok(Supplier {
        id: row.get(0)?,
        name: row.get(1)?,
        email: row.get(2)?,
        phone: row.get(3)?,
        tax_id: row.get(4)?,
        address: row.get(5)?,
        notes: row.get(6)?,
        user_id: row.get(7)?,
        accountant_id: row.get(8)?,
        created_at: row.get(9)?,
        updated_at: row.get(10)?,
    })
}

fn map_invoice(row: &Row) -> SqlResult<Invoice> {
    let file_url: Option<String> = row.get(9)?;
    let file_name: Option<String> = row.get(10)?;
    let file_size: Option<i64> = row.get(11)?;

    let attachment = file_url.map(|url| FileAttachment {
        url,
        name: file_name.unwrap_or_default(),
        size: file_size.unwrap_or(0) as u64,
    });

    Ok(Invoice {
        id: row.get(0)?,
        direction: row.get(1)?,
        entity_id: row.get(2)?,
        entity_name: row.get(3)?,
        number: row.get(4)?,
        invoice_date: row.get(5)?,
        amount: row.get(6)?,
        status: row.get(7)?,
        notes: row.get(8)?,
        attachment,
        user_id: row.get(12)?,
        created_at: row.get(13)?,
        updated_at: row.get(14)?,
    })
}

fn map_budget(row: &Row) -> SqlResult<Budget> {
    let items: String = row.get(5)?;
    Ok(Budget {
        id: row.get(0)?,
        client_id: row.get(1)?,
        number: row.get(2)?,
        budget_date: row.get(3)?,
        validity_days: row.get(4)?,
        items: from_json(&items),
        total: row.get(6)?,
        status: row.get(7)?,
        notes: row.get(8)?,
        user_id: row.get(9)?,
        created_at: row.get(10)?,
        updated_at: row.get(11)?,
    })
}

fn map_commercial_invoice(row: &Row) -> SqlResult<CommercialInvoice> {
    let items: String = row.get(5)?;
    Ok(CommercialInvoice {
        id: row.get(0)?,
        number: row.get(1)?,
        client_id: row.get(2)?,
        client_name: row.get(3)?,
        invoice_date: row.get(4)?,
        items: from_json(&items),
        total: row.get(6)?,
        origin: row.get(7)?,
        origin_id: row.get(8)?,
        origin_number: row.get(9)?,
        notes: row.get(10)?,
        user_id: row.get(11)?,
        created_at: row.get(12)?,
        updated_at: row.get(13)?,
    })
}

fn to_json<T: serde::Serialize>(value: &T) -> SqlResult<String> {
    serde_json::to_string(value)
        .map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))
}

fn from_json(raw: &str) -> Vec<BudgetItem> {
    serde_json::from_str(raw).unwrap_or_default()
}
