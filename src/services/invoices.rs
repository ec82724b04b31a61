use crate::{
    auth::AuthUser,
    clock::Clock,
    db::DbPool,
    entities::{
        client,
        invoice::{self, InvoiceKind, InvoiceStatus},
        invoice_item, service_request,
    },
    errors::ServiceError,
    lifecycle::guard_transition,
    money::{self, line_total, recompute, Totals},
    sequence::{next_number, DocumentKind},
    services::{clean_text, validate_not_blank, DocumentDefaults},
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, ModelTrait, QueryFilter,
    QueryOrder, QuerySelect, QueryTrait, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct InvoiceItemInput {
    #[validate(custom = "validate_not_blank", length(max = 1000))]
    pub description: String,
    #[schema(example = "2.5")]
    pub quantity: Decimal,
    #[validate(length(min = 1, max = 16))]
    pub unit: Option<String>,
    #[schema(example = "1500.00")]
    pub unit_price: Decimal,
    pub sort_order: Option<i32>,
}

impl InvoiceItemInput {
    fn check_amounts(&self) -> Result<(), ServiceError> {
        money::validate_quantity(self.quantity)?;
        money::validate_unit_price(self.unit_price)
    }
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateInvoice {
    pub client_id: Uuid,
    pub request_id: Option<Uuid>,
    #[serde(default, rename = "type")]
    pub kind: Option<InvoiceKind>,
    pub issue_date: NaiveDate,
    pub due_date: Option<NaiveDate>,
    #[schema(example = "20")]
    pub vat_rate: Option<Decimal>,
    #[validate(length(max = 5000))]
    pub notes: Option<String>,
    #[validate(length(min = 1))]
    pub items: Vec<InvoiceItemInput>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct SetInvoiceStatus {
    pub status: InvoiceStatus,
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct InvoiceFilter {
    pub client_id: Option<Uuid>,
    pub status: Option<InvoiceStatus>,
}

/// Invoice header with its items in display order
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct InvoiceDetails {
    #[serde(flatten)]
    pub invoice: invoice::Model,
    pub items: Vec<invoice_item::Model>,
}

/// Billing documents: draft editing with full recompute, then sent and paid
#[derive(Clone)]
pub struct InvoiceService {
    db: Arc<DbPool>,
    clock: Arc<dyn Clock>,
    defaults: DocumentDefaults,
}

async fn lock_invoice<C>(conn: &C, id: Uuid) -> Result<invoice::Model, ServiceError>
where
    C: ConnectionTrait,
{
    invoice::Entity::find_by_id(id)
        .lock_exclusive()
        .one(conn)
        .await?
        .ok_or_else(|| ServiceError::not_found("Invoice", id))
}

async fn load_items<C>(conn: &C, invoice_id: Uuid) -> Result<Vec<invoice_item::Model>, ServiceError>
where
    C: ConnectionTrait,
{
    let items = invoice_item::Entity::find()
        .filter(invoice_item::Column::InvoiceId.eq(invoice_id))
        .order_by_asc(invoice_item::Column::SortOrder)
        .order_by_asc(invoice_item::Column::Id)
        .all(conn)
        .await?;
    Ok(items)
}

fn ensure_draft(invoice: &invoice::Model) -> Result<(), ServiceError> {
    if invoice.status != InvoiceStatus::Draft {
        return Err(ServiceError::validation(format!(
            "Items of invoice {} can only be changed while it is a draft (current status: {})",
            invoice.number, invoice.status
        )));
    }
    Ok(())
}

/// Writes freshly derived totals onto the invoice and returns it with its items.
async fn recompute_totals<C>(
    conn: &C,
    invoice: invoice::Model,
    now: chrono::DateTime<chrono::Utc>,
) -> Result<InvoiceDetails, ServiceError>
where
    C: ConnectionTrait,
{
    let items = load_items(conn, invoice.id).await?;
    let Totals {
        subtotal,
        vat_amount,
        total,
    } = recompute(
        items.iter().map(|i| line_total(i.quantity, i.unit_price)),
        invoice.vat_rate,
    );

    let mut active: invoice::ActiveModel = invoice.into();
    active.subtotal = Set(subtotal);
    active.vat_amount = Set(vat_amount);
    active.total = Set(total);
    active.updated_at = Set(now);
    let invoice = active.update(conn).await?;

    Ok(InvoiceDetails { invoice, items })
}

impl InvoiceService {
    pub fn new(db: Arc<DbPool>, clock: Arc<dyn Clock>, defaults: DocumentDefaults) -> Self {
        Self {
            db,
            clock,
            defaults,
        }
    }

    fn item_model(
        &self,
        invoice_id: Uuid,
        input: InvoiceItemInput,
        sort_order: i32,
    ) -> invoice_item::ActiveModel {
        invoice_item::ActiveModel {
            id: Set(Uuid::new_v4()),
            invoice_id: Set(invoice_id),
            description: Set(input.description.trim().to_string()),
            quantity: Set(input.quantity),
            unit: Set(clean_text(input.unit).unwrap_or_else(|| self.defaults.unit.clone())),
            unit_price: Set(input.unit_price),
            total: Set(line_total(input.quantity, input.unit_price)),
            sort_order: Set(input.sort_order.unwrap_or(sort_order)),
        }
    }

    /// Creates a draft invoice with its items and derived totals
    #[instrument(skip(self, actor, input), fields(user_id = %actor.user_id, client_id = %input.client_id))]
    pub async fn create(
        &self,
        actor: &AuthUser,
        input: CreateInvoice,
    ) -> Result<InvoiceDetails, ServiceError> {
        input.validate()?;
        for item in &input.items {
            item.validate()?;
            item.check_amounts()?;
        }
        let vat_rate = input.vat_rate.unwrap_or(self.defaults.vat_rate);
        money::validate_vat_rate(vat_rate)?;
        if let Some(due) = input.due_date {
            if due < input.issue_date {
                return Err(ServiceError::validation(
                    "due_date must not be earlier than issue_date",
                ));
            }
        }

        let now = self.clock.now();
        let txn = self.db.begin().await?;

        client::Entity::find_by_id(input.client_id)
            .one(&txn)
            .await?
            .ok_or_else(|| ServiceError::not_found("Client", input.client_id))?;

        if let Some(request_id) = input.request_id {
            let request = service_request::Entity::find_by_id(request_id)
                .one(&txn)
                .await?
                .ok_or_else(|| ServiceError::not_found("Service request", request_id))?;
            if request.client_id != input.client_id {
                return Err(ServiceError::validation(format!(
                    "Service request {} belongs to another client",
                    request.number
                )));
            }
        }

        let number = next_number(&txn, DocumentKind::Invoice, self.clock.year()).await?;
        let zero = Totals::zero();

        let invoice = invoice::ActiveModel {
            id: Set(Uuid::new_v4()),
            number: Set(number),
            client_id: Set(input.client_id),
            request_id: Set(input.request_id),
            kind: Set(input.kind.unwrap_or_default()),
            status: Set(InvoiceStatus::Draft),
            issue_date: Set(input.issue_date),
            due_date: Set(input.due_date),
            subtotal: Set(zero.subtotal),
            vat_rate: Set(vat_rate),
            vat_amount: Set(zero.vat_amount),
            total: Set(zero.total),
            notes: Set(clean_text(input.notes)),
            created_by: Set(actor.user_id),
            paid_at: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&txn)
        .await?;

        for (index, item) in input.items.into_iter().enumerate() {
            self.item_model(invoice.id, item, index as i32)
                .insert(&txn)
                .await?;
        }

        let details = recompute_totals(&txn, invoice, now).await?;
        txn.commit().await?;

        info!(
            invoice_id = %details.invoice.id,
            number = %details.invoice.number,
            total = %details.invoice.total,
            "Invoice created"
        );
        Ok(details)
    }

    #[instrument(skip(self))]
    pub async fn get(&self, id: Uuid) -> Result<InvoiceDetails, ServiceError> {
        let db = self.db.as_ref();
        let invoice = invoice::Entity::find_by_id(id)
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::not_found("Invoice", id))?;
        let items = load_items(db, id).await?;
        Ok(InvoiceDetails { invoice, items })
    }

    /// Newest issue date first
    #[instrument(skip(self))]
    pub async fn list(&self, filter: InvoiceFilter) -> Result<Vec<invoice::Model>, ServiceError> {
        let invoices = invoice::Entity::find()
            .apply_if(filter.client_id, |q, v| {
                q.filter(invoice::Column::ClientId.eq(v))
            })
            .apply_if(filter.status, |q, v| q.filter(invoice::Column::Status.eq(v)))
            .order_by_desc(invoice::Column::IssueDate)
            .order_by_desc(invoice::Column::CreatedAt)
            .all(self.db.as_ref())
            .await?;
        Ok(invoices)
    }

    /// Appends an item to a draft invoice and recomputes its totals
    #[instrument(skip(self, actor, input), fields(user_id = %actor.user_id))]
    pub async fn add_item(
        &self,
        actor: &AuthUser,
        id: Uuid,
        input: InvoiceItemInput,
    ) -> Result<InvoiceDetails, ServiceError> {
        input.validate()?;
        input.check_amounts()?;

        let now = self.clock.now();
        let txn = self.db.begin().await?;
        let invoice = lock_invoice(&txn, id).await?;
        ensure_draft(&invoice)?;

        let last_sort: Option<i32> = invoice_item::Entity::find()
            .select_only()
            .column_as(invoice_item::Column::SortOrder.max(), "max_sort")
            .filter(invoice_item::Column::InvoiceId.eq(id))
            .into_tuple::<Option<i32>>()
            .one(&txn)
            .await?
            .flatten();
        let next_sort = last_sort.map_or(0, |s| s + 1);

        self.item_model(id, input, next_sort).insert(&txn).await?;

        let details = recompute_totals(&txn, invoice, now).await?;
        txn.commit().await?;

        info!(
            invoice_id = %id,
            items = details.items.len(),
            total = %details.invoice.total,
            "Invoice item added"
        );
        Ok(details)
    }

    /// Removes an item from a draft invoice and recomputes its totals
    #[instrument(skip(self, actor), fields(user_id = %actor.user_id))]
    pub async fn remove_item(
        &self,
        actor: &AuthUser,
        id: Uuid,
        item_id: Uuid,
    ) -> Result<InvoiceDetails, ServiceError> {
        let now = self.clock.now();
        let txn = self.db.begin().await?;
        let invoice = lock_invoice(&txn, id).await?;
        ensure_draft(&invoice)?;

        let item = invoice_item::Entity::find_by_id(item_id)
            .filter(invoice_item::Column::InvoiceId.eq(id))
            .one(&txn)
            .await?
            .ok_or_else(|| ServiceError::not_found("Invoice item", item_id))?;
        item.delete(&txn).await?;

        let details = recompute_totals(&txn, invoice, now).await?;
        txn.commit().await?;

        info!(
            invoice_id = %id,
            item_id = %item_id,
            total = %details.invoice.total,
            "Invoice item removed"
        );
        Ok(details)
    }

    /// Moves the invoice along draft -> sent -> paid (or cancelled)
    #[instrument(skip(self, actor, input), fields(user_id = %actor.user_id, to = %input.status))]
    pub async fn set_status(
        &self,
        actor: &AuthUser,
        id: Uuid,
        input: SetInvoiceStatus,
    ) -> Result<InvoiceDetails, ServiceError> {
        actor.require_manager()?;
        let now = self.clock.now();
        let txn = self.db.begin().await?;
        let invoice = lock_invoice(&txn, id).await?;

        let from = invoice.status;
        let to = input.status;
        guard_transition(from, to)?;

        let mut active: invoice::ActiveModel = invoice.clone().into();
        active.status = Set(to);
        if to == InvoiceStatus::Paid && invoice.paid_at.is_none() {
            active.paid_at = Set(Some(now));
        }
        active.updated_at = Set(now);
        let invoice = active.update(&txn).await?;
        let items = load_items(&txn, id).await?;
        txn.commit().await?;

        info!(
            invoice_id = %invoice.id,
            number = %invoice.number,
            from = %from,
            to = %to,
            "Invoice status changed"
        );
        Ok(InvoiceDetails { invoice, items })
    }
}
