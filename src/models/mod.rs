use serde::{Deserialize, Serialize};

pub const ROLE_BUSINESS: &str = "business";
pub const ROLE_ACCOUNTANT: &str = "accountant";

pub const DIRECTION_ISSUED: &str = "issued";
pub const DIRECTION_RECEIVED: &str = "received";

pub const INVOICE_STATUS_PENDING: &str = "pending";
pub const INVOICE_STATUS_PAID: &str = "paid";
pub const INVOICE_STATUS_OVERDUE: &str = "overdue";

pub const BUDGET_STATUS_DRAFT: &str = "draft";
pub const BUDGET_STATUS_APPROVED: &str = "approved";

pub const ORIGIN_BUDGET: &str = "budget";

const CLIENT_REF_PREFIX: &str = "client_";
const SUPPLIER_REF_PREFIX: &str = "supplier_";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: String,
    pub assigned_clients: Vec<String>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Client {
    pub id: String,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub tax_id: Option<String>,
    pub address: Option<String>,
    pub notes: Option<String>,
    pub user_id: String,
    pub accountant_id: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Supplier {
    pub id: String,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub tax_id: Option<String>,
    pub address: Option<String>,
    pub notes: Option<String>,
    pub user_id: String,
    pub accountant_id: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileAttachment {
    pub url: String,
    pub name: String,
    pub size: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Invoice {
    pub id: String,
    pub direction: String,
    pub entity_id: String,
    pub entity_name: Option<String>,
    pub number: Option<String>,
    pub invoice_date: Option<String>,
    pub amount: Option<f64>,
    pub status: String,
    pub notes: Option<String>,
    pub attachment: Option<FileAttachment>,
    pub user_id: String,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BudgetItem {
    pub description: String,
    pub quantity: f64,
    pub unit_price: f64,
    pub total: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Budget {
    pub id: String,
    pub client_id: String,
    pub number: String,
    pub budget_date: String,
    pub validity_days: i64,
    pub items: Vec<BudgetItem>,
    pub total: f64,
    pub status: String,
    pub notes: Option<String>,
    pub user_id: String,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommercialInvoice {
    pub id: String,
    pub number: String,
    pub client_id: String,
    pub client_name: String,
    pub invoice_date: String,
    pub items: Vec<BudgetItem>,
    pub total: f64,
    pub origin: String,
    pub origin_id: String,
    pub origin_number: Option<String>,
    pub notes: Option<String>,
    pub user_id: String,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityEntry {
    pub id: String,
    pub user_id: String,
    pub title: String,
    pub detail: String,
    pub created_at: String,
}

pub fn client_ref(client_id: &str) -> String {
    format!("{}{}", CLIENT_REF_PREFIX, client_id)
}

pub fn supplier_ref(supplier_id: &str) -> String {
    format!("{}{}", SUPPLIER_REF_PREFIX, supplier_id)
}

pub fn client_id_from_ref(entity_id: &str) -> Option<&str> {
    entity_id.strip_prefix(CLIENT_REF_PREFIX)
}

pub fn supplier_id_from_ref(entity_id: &str) -> Option<&str> {
    entity_id.strip_prefix(SUPPLIER_REF_PREFIX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entity_refs_round_trip() {
        assert_eq!(client_id_from_ref(&client_ref("c1")), Some("c1"));
        assert_eq!(supplier_id_from_ref(&supplier_ref("s1")), Some("s1"));
    }

    #[test]
    fn foreign_refs_do_not_resolve() {
        assert_eq!(client_id_from_ref("supplier_s1"), None);
        assert_eq!(client_id_from_ref("garbage"), None);
        assert_eq!(supplier_id_from_ref("client_c1"), None);
    }
}
