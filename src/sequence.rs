//! Year-scoped document numbers such as `ZVK-2025-00003`.
//!
//! Numbers come from the `document_sequences` counter table, bumped inside the
//! caller's transaction. The first number of a (kind, year) pair is seeded
//! from the highest number already present in the document table.

use crate::entities::{document_sequence, invoice, purchase_order, service_request};
use crate::errors::ServiceError;
use once_cell::sync::Lazy;
use regex::Regex;
use sea_orm::{
    sea_query::Expr, ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter,
    QuerySelect, Set,
};
use tracing::debug;

static NUMBER_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?P<prefix>[A-Z]+)-(?P<year>\d{4})-(?P<seq>\d{5,})$")
        .expect("document number pattern is a valid regex")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocumentKind {
    ServiceRequest,
    Invoice,
    PurchaseOrder,
}

impl DocumentKind {
    pub fn prefix(self) -> &'static str {
        match self {
            DocumentKind::ServiceRequest => "ZVK",
            DocumentKind::Invoice => "SCH",
            DocumentKind::PurchaseOrder => "PO",
        }
    }

    /// Key of the counter row in `document_sequences`
    pub fn key(self) -> &'static str {
        match self {
            DocumentKind::ServiceRequest => "service_request",
            DocumentKind::Invoice => "invoice",
            DocumentKind::PurchaseOrder => "purchase_order",
        }
    }
}

pub fn format_number(kind: DocumentKind, year: i32, seq: i64) -> String {
    format!("{}-{:04}-{:05}", kind.prefix(), year, seq)
}

/// Splits a number of the given kind into `(year, seq)`.
pub fn parse_number(kind: DocumentKind, number: &str) -> Option<(i32, i64)> {
    let caps = NUMBER_PATTERN.captures(number)?;
    if &caps["prefix"] != kind.prefix() {
        return None;
    }
    let year = caps["year"].parse().ok()?;
    let seq = caps["seq"].parse().ok()?;
    Some((year, seq))
}

/// Highest sequence already used by documents of `kind` in `year`.
async fn highest_existing<C>(conn: &C, kind: DocumentKind, year: i32) -> Result<i64, ServiceError>
where
    C: ConnectionTrait,
{
    let pattern = format!("{}-{:04}-", kind.prefix(), year);
    let numbers: Vec<String> = match kind {
        DocumentKind::ServiceRequest => {
            service_request::Entity::find()
                .select_only()
                .column(service_request::Column::Number)
                .filter(service_request::Column::Number.starts_with(&pattern))
                .into_tuple()
                .all(conn)
                .await?
        }
        DocumentKind::Invoice => {
            invoice::Entity::find()
                .select_only()
                .column(invoice::Column::Number)
                .filter(invoice::Column::Number.starts_with(&pattern))
                .into_tuple()
                .all(conn)
                .await?
        }
        DocumentKind::PurchaseOrder => {
            purchase_order::Entity::find()
                .select_only()
                .column(purchase_order::Column::Number)
                .filter(purchase_order::Column::Number.starts_with(&pattern))
                .into_tuple()
                .all(conn)
                .await?
        }
    };

    Ok(numbers
        .iter()
        .filter_map(|n| parse_number(kind, n))
        .filter(|(y, _)| *y == year)
        .map(|(_, seq)| seq)
        .max()
        .unwrap_or(0))
}

/// Reserves the next number for `kind` in `year`.
///
/// Must run inside the transaction that inserts the document so that a
/// rollback also releases the number.
pub async fn next_number<C>(conn: &C, kind: DocumentKind, year: i32) -> Result<String, ServiceError>
where
    C: ConnectionTrait,
{
    let current = document_sequence::Entity::find_by_id((kind.key().to_string(), year))
        .lock_exclusive()
        .one(conn)
        .await?;

    let next = match current {
        None => {
            let next = highest_existing(conn, kind, year).await? + 1;
            document_sequence::ActiveModel {
                kind: Set(kind.key().to_string()),
                year: Set(year),
                last_value: Set(next),
            }
            .insert(conn)
            .await?;
            next
        }
        Some(row) => {
            let next = row.last_value + 1;
            let result = document_sequence::Entity::update_many()
                .col_expr(document_sequence::Column::LastValue, Expr::value(next))
                .filter(document_sequence::Column::Kind.eq(kind.key()))
                .filter(document_sequence::Column::Year.eq(year))
                .filter(document_sequence::Column::LastValue.eq(row.last_value))
                .exec(conn)
                .await?;
            if result.rows_affected == 0 {
                return Err(ServiceError::Conflict(format!(
                    "{} number sequence for {} changed concurrently, retry the request",
                    kind.prefix(),
                    year
                )));
            }
            next
        }
    };

    let number = format_number(kind, year, next);
    debug!(number = %number, "Reserved document number");
    Ok(number)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_zero_padded() {
        assert_eq!(
            format_number(DocumentKind::ServiceRequest, 2025, 3),
            "ZVK-2025-00003"
        );
        assert_eq!(format_number(DocumentKind::Invoice, 2024, 12345), "SCH-2024-12345");
        assert_eq!(format_number(DocumentKind::PurchaseOrder, 2025, 1), "PO-2025-00001");
    }

    #[test]
    fn grows_past_five_digits() {
        assert_eq!(
            format_number(DocumentKind::Invoice, 2025, 123456),
            "SCH-2025-123456"
        );
    }

    #[test]
    fn parses_own_prefix_only() {
        assert_eq!(
            parse_number(DocumentKind::ServiceRequest, "ZVK-2025-00042"),
            Some((2025, 42))
        );
        assert_eq!(parse_number(DocumentKind::Invoice, "ZVK-2025-00042"), None);
        assert_eq!(parse_number(DocumentKind::PurchaseOrder, "PO-2025-7"), None);
        assert_eq!(parse_number(DocumentKind::PurchaseOrder, "PO-2025-00007x"), None);
    }

    #[test]
    fn parse_inverts_format() {
        for (kind, year, seq) in [
            (DocumentKind::ServiceRequest, 2025, 1),
            (DocumentKind::Invoice, 1999, 99999),
            (DocumentKind::PurchaseOrder, 2030, 100000),
        ] {
            assert_eq!(parse_number(kind, &format_number(kind, year, seq)), Some((year, seq)));
        }
    }
}
