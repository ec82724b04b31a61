use crate::{
    auth::AuthUser,
    clock::Clock,
    db::DbPool,
    entities::{
        equipment_catalog,
        purchase_order::{self, PurchaseOrderStatus},
        purchase_order_item::{self, PoItemType},
        spare_part, vendor,
    },
    errors::ServiceError,
    lifecycle::guard_transition,
    money::{self, line_total},
    sequence::{next_number, DocumentKind},
    services::{clean_text, validate_not_blank, DocumentDefaults},
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use sea_orm::{
    sea_query::Expr, ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter,
    QueryOrder, QuerySelect, QueryTrait, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument, warn};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct PurchaseOrderItemInput {
    #[serde(default)]
    pub item_type: Option<PoItemType>,
    pub catalog_id: Option<Uuid>,
    pub part_id: Option<Uuid>,
    #[validate(custom = "validate_not_blank", length(max = 1000))]
    pub description: String,
    #[validate(range(min = 1))]
    pub quantity: i32,
    #[schema(example = "350.00")]
    pub unit_price: Decimal,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreatePurchaseOrder {
    pub vendor_id: Uuid,
    pub order_date: NaiveDate,
    pub expected_date: Option<NaiveDate>,
    #[validate(length(equal = 3))]
    pub currency: Option<String>,
    #[validate(length(max = 5000))]
    pub notes: Option<String>,
    #[validate(length(min = 1))]
    pub items: Vec<PurchaseOrderItemInput>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct SetPurchaseOrderStatus {
    pub status: PurchaseOrderStatus,
    /// Only used when moving to `received`
    pub received_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PurchaseOrderFilter {
    pub status: Option<PurchaseOrderStatus>,
    pub vendor_id: Option<Uuid>,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct PurchaseOrderDetails {
    #[serde(flatten)]
    pub order: purchase_order::Model,
    pub items: Vec<purchase_order_item::Model>,
}

/// Supplier orders; receiving an order books its part items into stock
#[derive(Clone)]
pub struct PurchaseOrderService {
    db: Arc<DbPool>,
    clock: Arc<dyn Clock>,
    defaults: DocumentDefaults,
}

async fn load_items<C>(
    conn: &C,
    order_id: Uuid,
) -> Result<Vec<purchase_order_item::Model>, ServiceError>
where
    C: ConnectionTrait,
{
    let items = purchase_order_item::Entity::find()
        .filter(purchase_order_item::Column::OrderId.eq(order_id))
        .order_by_asc(purchase_order_item::Column::Id)
        .all(conn)
        .await?;
    Ok(items)
}

/// Adds the quantity of every part line to its spare part's stock
async fn book_receipt<C>(
    conn: &C,
    order: &purchase_order::Model,
    items: &[purchase_order_item::Model],
    now: chrono::DateTime<chrono::Utc>,
) -> Result<(), ServiceError>
where
    C: ConnectionTrait,
{
    for item in items {
        let Some(part_id) = item.part_id.filter(|_| item.item_type == PoItemType::Part) else {
            continue;
        };
        let Some(part) = spare_part::Entity::find_by_id(part_id)
            .lock_exclusive()
            .one(conn)
            .await?
        else {
            warn!(order = %order.number, part_id = %part_id, "Received part no longer exists");
            return Err(ServiceError::not_found("Spare part", part_id));
        };
        if part.quantity.checked_add(item.quantity).is_none() {
            return Err(ServiceError::validation(format!(
                "Receiving {} {} of {} would overflow the stock counter",
                item.quantity, part.unit, part.name
            )));
        }
        spare_part::Entity::update_many()
            .col_expr(
                spare_part::Column::Quantity,
                Expr::col(spare_part::Column::Quantity).add(item.quantity),
            )
            .col_expr(spare_part::Column::UpdatedAt, Expr::value(now))
            .filter(spare_part::Column::Id.eq(part_id))
            .exec(conn)
            .await?;
        info!(
            order = %order.number,
            part_id = %part_id,
            quantity = item.quantity,
            "Stock received from purchase order"
        );
    }
    Ok(())
}

impl PurchaseOrderService {
    pub fn new(db: Arc<DbPool>, clock: Arc<dyn Clock>, defaults: DocumentDefaults) -> Self {
        Self {
            db,
            clock,
            defaults,
        }
    }

    /// Creates a draft order with all of its items
    #[instrument(skip(self, actor, input), fields(user_id = %actor.user_id, vendor_id = %input.vendor_id))]
    pub async fn create(
        &self,
        actor: &AuthUser,
        input: CreatePurchaseOrder,
    ) -> Result<PurchaseOrderDetails, ServiceError> {
        actor.require_manager()?;
        input.validate()?;
        for item in &input.items {
            item.validate()?;
            money::validate_unit_price(item.unit_price)?;
        }
        if let Some(expected) = input.expected_date {
            if expected < input.order_date {
                return Err(ServiceError::validation(
                    "expected_date must not be earlier than order_date",
                ));
            }
        }
        let currency = clean_text(input.currency)
            .map(|c| c.to_uppercase())
            .unwrap_or_else(|| self.defaults.currency.clone());

        let now = self.clock.now();
        let txn = self.db.begin().await?;

        vendor::Entity::find_by_id(input.vendor_id)
            .one(&txn)
            .await?
            .ok_or_else(|| ServiceError::not_found("Vendor", input.vendor_id))?;

        for item in &input.items {
            if let Some(catalog_id) = item.catalog_id {
                equipment_catalog::Entity::find_by_id(catalog_id)
                    .one(&txn)
                    .await?
                    .ok_or_else(|| ServiceError::not_found("Catalog item", catalog_id))?;
            }
            if let Some(part_id) = item.part_id {
                spare_part::Entity::find_by_id(part_id)
                    .one(&txn)
                    .await?
                    .ok_or_else(|| ServiceError::not_found("Spare part", part_id))?;
            }
        }

        let number = next_number(&txn, DocumentKind::PurchaseOrder, self.clock.year()).await?;
        let order_id = Uuid::new_v4();

        let lines: Vec<(PurchaseOrderItemInput, Decimal)> = input
            .items
            .into_iter()
            .map(|item| {
                let total = line_total(Decimal::from(item.quantity), item.unit_price);
                (item, total)
            })
            .collect();
        let total_amount: Decimal = lines.iter().map(|(_, total)| *total).sum();

        let order = purchase_order::ActiveModel {
            id: Set(order_id),
            number: Set(number),
            vendor_id: Set(input.vendor_id),
            status: Set(PurchaseOrderStatus::Draft),
            order_date: Set(input.order_date),
            expected_date: Set(input.expected_date),
            received_date: Set(None),
            total_amount: Set(total_amount),
            currency: Set(currency),
            notes: Set(clean_text(input.notes)),
            created_by: Set(actor.user_id),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&txn)
        .await?;

        for (item, total) in lines {
            purchase_order_item::ActiveModel {
                id: Set(Uuid::new_v4()),
                order_id: Set(order_id),
                item_type: Set(item.item_type.unwrap_or_default()),
                catalog_id: Set(item.catalog_id),
                part_id: Set(item.part_id),
                description: Set(item.description.trim().to_string()),
                quantity: Set(item.quantity),
                unit_price: Set(item.unit_price),
                total: Set(total),
            }
            .insert(&txn)
            .await?;
        }

        let items = load_items(&txn, order_id).await?;
        txn.commit().await?;

        info!(
            order_id = %order.id,
            number = %order.number,
            total = %order.total_amount,
            "Purchase order created"
        );
        Ok(PurchaseOrderDetails { order, items })
    }

    #[instrument(skip(self))]
    pub async fn get(&self, id: Uuid) -> Result<PurchaseOrderDetails, ServiceError> {
        let db = self.db.as_ref();
        let order = purchase_order::Entity::find_by_id(id)
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::not_found("Purchase order", id))?;
        let items = load_items(db, id).await?;
        Ok(PurchaseOrderDetails { order, items })
    }

    /// Newest order date first
    #[instrument(skip(self))]
    pub async fn list(
        &self,
        filter: PurchaseOrderFilter,
    ) -> Result<Vec<purchase_order::Model>, ServiceError> {
        let orders = purchase_order::Entity::find()
            .apply_if(filter.status, |q, v| {
                q.filter(purchase_order::Column::Status.eq(v))
            })
            .apply_if(filter.vendor_id, |q, v| {
                q.filter(purchase_order::Column::VendorId.eq(v))
            })
            .order_by_desc(purchase_order::Column::OrderDate)
            .order_by_desc(purchase_order::Column::CreatedAt)
            .all(self.db.as_ref())
            .await?;
        Ok(orders)
    }

    /// Moves the order along its lifecycle; receiving books stock
    #[instrument(skip(self, actor, input), fields(user_id = %actor.user_id, to = %input.status))]
    pub async fn set_status(
        &self,
        actor: &AuthUser,
        id: Uuid,
        input: SetPurchaseOrderStatus,
    ) -> Result<PurchaseOrderDetails, ServiceError> {
        actor.require_manager()?;
        let now = self.clock.now();
        let txn = self.db.begin().await?;

        let order = purchase_order::Entity::find_by_id(id)
            .lock_exclusive()
            .one(&txn)
            .await?
            .ok_or_else(|| ServiceError::not_found("Purchase order", id))?;

        let from = order.status;
        let to = input.status;
        guard_transition(from, to)?;

        let mut active: purchase_order::ActiveModel = order.into();
        active.status = Set(to);
        if to == PurchaseOrderStatus::Received && input.received_date.is_some() {
            active.received_date = Set(input.received_date);
        }
        active.updated_at = Set(now);
        let order = active.update(&txn).await?;

        let items = load_items(&txn, id).await?;
        if to == PurchaseOrderStatus::Received {
            book_receipt(&txn, &order, &items, now).await?;
        }

        txn.commit().await?;

        info!(
            order_id = %order.id,
            number = %order.number,
            from = %from,
            to = %to,
            "Purchase order status changed"
        );
        Ok(PurchaseOrderDetails { order, items })
    }

    /// Orders placed with one vendor, newest first
    #[instrument(skip(self))]
    pub async fn for_vendor(
        &self,
        vendor_id: Uuid,
    ) -> Result<Vec<purchase_order::Model>, ServiceError> {
        self.list(PurchaseOrderFilter {
            status: None,
            vendor_id: Some(vendor_id),
        })
        .await
    }
}
