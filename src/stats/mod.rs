//! Pure aggregation over already-loaded records. No I/O, no shared state;
//! callers load the record sequences and render whatever comes back.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::models::{
    client_id_from_ref, BudgetItem, Client, Invoice, DIRECTION_ISSUED, INVOICE_STATUS_OVERDUE,
    INVOICE_STATUS_PAID, INVOICE_STATUS_PENDING,
};
use crate::utils::parse_decimal;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DashboardCounters {
    pub total: usize,
    pub paid: usize,
    pub pending: usize,
    pub overdue: usize,
}

/// Invoices with a status outside the three recognized values count toward
/// `total` but no bucket.
pub fn dashboard_counters(invoices: &[Invoice]) -> DashboardCounters {
    let mut counters = DashboardCounters {
        total: invoices.len(),
        ..DashboardCounters::default()
    };

    for invoice in invoices {
        match invoice.status.as_str() {
            INVOICE_STATUS_PAID => counters.paid += 1,
            INVOICE_STATUS_PENDING => counters.pending += 1,
            INVOICE_STATUS_OVERDUE => counters.overdue += 1,
            _ => {}
        }
    }

    counters
}

#[derive(Debug, Clone, Serialize)]
pub struct AccountBalance {
    pub client_name: String,
    pub total_invoiced: f64,
    pub total_paid: f64,
    pub balance: f64,
}

/// Per-client running balances over issued invoices, keyed by client id.
/// Every known client appears in the output, zero-invoice clients included.
/// Invoices whose entity reference resolves to no known client are skipped,
/// and received invoices never touch a balance.
pub fn account_balances(clients: &[Client], invoices: &[Invoice]) -> BTreeMap<String, AccountBalance> {
    let mut balances: BTreeMap<String, AccountBalance> = clients
        .iter()
        .map(|client| {
            (
                client.id.clone(),
                AccountBalance {
                    client_name: client.name.clone(),
                    total_invoiced: 0.0,
                    total_paid: 0.0,
                    balance: 0.0,
                },
            )
        })
        .collect();

    for invoice in invoices {
        if invoice.direction != DIRECTION_ISSUED {
            continue;
        }
        let Some(client_id) = client_id_from_ref(&invoice.entity_id) else {
            continue;
        };
        let Some(balance) = balances.get_mut(client_id) else {
            continue;
        };

        let amount = invoice.amount.unwrap_or(0.0);
        balance.total_invoiced += amount;
        if invoice.status == INVOICE_STATUS_PAID {
            balance.total_paid += amount;
        }
    }

    for balance in balances.values_mut() {
        balance.balance = balance.total_invoiced - balance.total_paid;
    }

    balances
}

/// One in-progress form row of a budget, numeric fields still raw text.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ItemRow {
    pub description: String,
    pub quantity: String,
    pub unit_price: String,
}

/// A row is valid with a non-blank description, a positive quantity, and a
/// non-negative finite unit price. Anything else is dropped from the
/// persisted item list.
pub fn parse_item(row: &ItemRow) -> Option<BudgetItem> {
    let description = row.description.trim();
    if description.is_empty() {
        return None;
    }

    let quantity = parse_decimal(&row.quantity).ok()?;
    let unit_price = parse_decimal(&row.unit_price).ok()?;
    if !quantity.is_finite() || quantity <= 0.0 {
        return None;
    }
    if !unit_price.is_finite() || unit_price < 0.0 {
        return None;
    }

    Some(BudgetItem {
        description: description.to_string(),
        quantity,
        unit_price,
        total: quantity * unit_price,
    })
}

pub fn parse_items(rows: &[ItemRow]) -> Vec<BudgetItem> {
    rows.iter().filter_map(parse_item).collect()
}

/// Sum over valid items at full float precision; display rounding happens at
/// the rendering edge, never before the sum.
pub fn line_item_total(items: &[BudgetItem]) -> f64 {
    items.iter().map(|item| item.quantity * item.unit_price).sum()
}

/// Live total recomputed while a budget form is being edited; partially
/// valid rows contribute with their missing numerics read as 0.
pub fn draft_total(rows: &[ItemRow]) -> f64 {
    rows.iter()
        .map(|row| {
            let quantity = parse_decimal(&row.quantity).unwrap_or(0.0);
            let unit_price = parse_decimal(&row.unit_price).unwrap_or(0.0);
            quantity * unit_price
        })
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{client_ref, INVOICE_STATUS_PENDING};
    use crate::utils::now_rfc3339;

    fn invoice(direction: &str, entity_id: &str, amount: Option<f64>, status: &str) -> Invoice {
        let now = now_rfc3339();
        Invoice {
            id: uuid::Uuid::new_v4().to_string(),
            direction: direction.to_string(),
            entity_id: entity_id.to_string(),
            entity_name: None,
            number: None,
            invoice_date: None,
            amount,
            status: status.to_string(),
            notes: None,
            attachment: None,
            user_id: "u1".to_string(),
            created_at: now.clone(),
            updated_at: now,
        }
    }

    fn client(id: &str, name: &str) -> Client {
        let now = now_rfc3339();
        Client {
            id: id.to_string(),
            name: name.to_string(),
            email: None,
            phone: None,
            tax_id: None,
            address: None,
            notes: None,
            user_id: "u1".to_string(),
            accountant_id: None,
            created_at: now.clone(),
            updated_at: now,
        }
    }

    fn row(description: &str, quantity: &str, unit_price: &str) -> ItemRow {
        ItemRow {
            description: description.to_string(),
            quantity: quantity.to_string(),
            unit_price: unit_price.to_string(),
        }
    }

    #[test]
    fn counters_over_empty_input_are_zero() {
        assert_eq!(dashboard_counters(&[]), DashboardCounters::default());
    }

    #[test]
    fn counter_buckets_partition_with_uncategorized_remainder() {
        let invoices = vec![
            invoice("issued", "client_c1", Some(10.0), "paid"),
            invoice("issued", "client_c1", Some(10.0), "pending"),
            invoice("received", "supplier_s1", Some(10.0), "overdue"),
            invoice("issued", "client_c1", Some(10.0), "disputed"),
            invoice("issued", "client_c1", Some(10.0), ""),
        ];

        let counters = dashboard_counters(&invoices);
        assert_eq!(counters.total, 5);
        assert_eq!(counters.paid, 1);
        assert_eq!(counters.pending, 1);
        assert_eq!(counters.overdue, 1);

        let uncategorized = counters.total - counters.paid - counters.pending - counters.overdue;
        assert_eq!(uncategorized, 2);
    }

    #[test]
    fn balances_track_issued_and_paid_amounts() {
        let clients = vec![client("c1", "Acme")];
        let invoices = vec![
            invoice("issued", &client_ref("c1"), Some(100.0), INVOICE_STATUS_PAID),
            invoice("issued", &client_ref("c1"), Some(50.0), INVOICE_STATUS_PENDING),
        ];

        let balances = account_balances(&clients, &invoices);
        let acme = &balances["c1"];
        assert_eq!(acme.client_name, "Acme");
        assert_eq!(acme.total_invoiced, 150.0);
        assert_eq!(acme.total_paid, 100.0);
        assert_eq!(acme.balance, 50.0);
    }

    #[test]
    fn every_client_appears_exactly_once() {
        let clients = vec![client("c1", "Acme"), client("c2", "Globex")];
        let invoices = vec![invoice("issued", &client_ref("c1"), Some(75.0), "pending")];

        let balances = account_balances(&clients, &invoices);
        assert_eq!(balances.len(), 2);
        assert_eq!(balances["c2"].total_invoiced, 0.0);
        assert_eq!(balances["c2"].total_paid, 0.0);
        assert_eq!(balances["c2"].balance, 0.0);
    }

    #[test]
    fn balances_are_invariant_under_invoice_reordering() {
        let clients = vec![client("c1", "Acme"), client("c2", "Globex")];
        let mut invoices = vec![
            invoice("issued", &client_ref("c1"), Some(100.0), "paid"),
            invoice("issued", &client_ref("c2"), Some(40.0), "pending"),
            invoice("issued", &client_ref("c1"), Some(60.0), "overdue"),
            invoice("issued", &client_ref("c2"), Some(25.0), "paid"),
        ];

        let forward = account_balances(&clients, &invoices);
        invoices.reverse();
        let backward = account_balances(&clients, &invoices);

        for (id, balance) in &forward {
            assert_eq!(balance.total_invoiced, backward[id].total_invoiced);
            assert_eq!(balance.total_paid, backward[id].total_paid);
            assert_eq!(balance.balance, backward[id].balance);
        }
    }

    #[test]
    fn received_invoices_never_touch_balances() {
        let clients = vec![client("c1", "Acme")];
        let invoices = vec![invoice("received", &client_ref("c1"), Some(500.0), "paid")];

        let balances = account_balances(&clients, &invoices);
        assert_eq!(balances["c1"].total_invoiced, 0.0);
        assert_eq!(balances["c1"].total_paid, 0.0);
        assert_eq!(balances["c1"].balance, 0.0);
    }

    #[test]
    fn unresolved_references_are_skipped() {
        let clients = vec![client("c1", "Acme")];
        let invoices = vec![
            invoice("issued", "client_ghost", Some(10.0), "paid"),
            invoice("issued", "supplier_s1", Some(10.0), "paid"),
            invoice("issued", "", Some(10.0), "paid"),
        ];

        let balances = account_balances(&clients, &invoices);
        assert_eq!(balances["c1"].total_invoiced, 0.0);
    }

    #[test]
    fn missing_amounts_count_as_zero() {
        let clients = vec![client("c1", "Acme")];
        let invoices = vec![
            invoice("issued", &client_ref("c1"), None, "paid"),
            invoice("issued", &client_ref("c1"), Some(30.0), "pending"),
        ];

        let balances = account_balances(&clients, &invoices);
        assert_eq!(balances["c1"].total_invoiced, 30.0);
        assert_eq!(balances["c1"].total_paid, 0.0);
    }

    #[test]
    fn line_item_total_over_valid_rows() {
        let items = parse_items(&[row("A", "2", "10.5"), row("B", "1", "5")]);
        assert_eq!(items.len(), 2);
        assert_eq!(line_item_total(&items), 26.0);
    }

    #[test]
    fn invalid_rows_are_excluded_from_items_and_total() {
        let rows = vec![
            row("", "2", "10"),
            row("Valid", "3", "4"),
            row("Zero qty", "0", "10"),
            row("Negative", "2", "-1"),
            row("Unparsable", "2", "abc"),
        ];

        let items = parse_items(&rows);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].description, "Valid");
        assert_eq!(line_item_total(&items), 12.0);
    }

    #[test]
    fn zero_unit_price_is_valid() {
        let items = parse_items(&[row("Gratis", "1", "0")]);
        assert_eq!(items.len(), 1);
        assert_eq!(line_item_total(&items), 0.0);
    }

    #[test]
    fn draft_total_reads_partial_rows_as_zero() {
        let rows = vec![row("A", "2", "10"), row("", "3", ""), row("B", "x", "5")];
        assert_eq!(draft_total(&rows), 20.0);
    }
}
