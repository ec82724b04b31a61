use crate::{
    auth::AuthUser,
    clock::Clock,
    db::DbPool,
    entities::{equipment_catalog, parts_usage, service_request, spare_part, vendor},
    errors::ServiceError,
    money,
    services::{clean_text, ensure_non_negative, validate_not_blank, DocumentDefaults},
};
use rust_decimal::Decimal;
use sea_orm::{
    sea_query::Expr, ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, EntityTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument, warn};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateSparePart {
    #[validate(custom = "validate_not_blank", length(max = 255))]
    pub name: String,
    #[validate(length(max = 100))]
    pub part_number: Option<String>,
    pub catalog_id: Option<Uuid>,
    pub vendor_id: Option<Uuid>,
    #[serde(default)]
    pub quantity: i32,
    #[serde(default)]
    pub min_quantity: i32,
    #[validate(length(min = 1, max = 16))]
    pub unit: Option<String>,
    #[serde(default)]
    pub cost_price: Decimal,
    #[serde(default)]
    pub sale_price: Decimal,
    #[validate(length(max = 255))]
    pub location: Option<String>,
}

/// Catalog fields only; stock moves through `receive` and `use_part`
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateSparePart {
    #[validate(custom = "validate_not_blank", length(max = 255))]
    pub name: Option<String>,
    #[validate(length(max = 100))]
    pub part_number: Option<String>,
    pub min_quantity: Option<i32>,
    pub cost_price: Option<Decimal>,
    pub sale_price: Option<Decimal>,
    #[validate(length(max = 255))]
    pub location: Option<String>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct ReceiveStock {
    pub quantity: i32,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct UsePart {
    pub request_id: Uuid,
    pub quantity: i32,
    /// Defaults to the part's sale price
    pub unit_price: Option<Decimal>,
    #[validate(length(max = 2000))]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PartFilter {
    /// Matches name or part number
    pub search: Option<String>,
    /// Only parts at or below their reorder threshold
    pub low_stock: Option<bool>,
}

/// Spare part with the derived low-stock flag
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct SparePart {
    #[serde(flatten)]
    pub part: spare_part::Model,
    pub low_stock: bool,
}

impl From<spare_part::Model> for SparePart {
    fn from(part: spare_part::Model) -> Self {
        let low_stock = part.is_low_stock();
        Self { part, low_stock }
    }
}

/// Spare-parts stock and the consumption ledger
#[derive(Clone)]
pub struct InventoryService {
    db: Arc<DbPool>,
    clock: Arc<dyn Clock>,
    defaults: DocumentDefaults,
}

async fn lock_part<C>(conn: &C, id: Uuid) -> Result<spare_part::Model, ServiceError>
where
    C: ConnectionTrait,
{
    spare_part::Entity::find_by_id(id)
        .lock_exclusive()
        .one(conn)
        .await?
        .ok_or_else(|| ServiceError::not_found("Spare part", id))
}

fn insufficient(part: &spare_part::Model) -> ServiceError {
    ServiceError::InsufficientStock {
        part: part.name.clone(),
        available: part.quantity,
        unit: part.unit.clone(),
    }
}

impl InventoryService {
    pub fn new(db: Arc<DbPool>, clock: Arc<dyn Clock>, defaults: DocumentDefaults) -> Self {
        Self {
            db,
            clock,
            defaults,
        }
    }

    #[instrument(skip(self, actor, input), fields(user_id = %actor.user_id))]
    pub async fn create_part(
        &self,
        actor: &AuthUser,
        input: CreateSparePart,
    ) -> Result<SparePart, ServiceError> {
        input.validate()?;
        ensure_non_negative("quantity", input.quantity)?;
        ensure_non_negative("min_quantity", input.min_quantity)?;
        money::validate_unit_price(input.cost_price)?;
        money::validate_unit_price(input.sale_price)?;

        let db = self.db.as_ref();
        if let Some(catalog_id) = input.catalog_id {
            equipment_catalog::Entity::find_by_id(catalog_id)
                .one(db)
                .await?
                .ok_or_else(|| ServiceError::not_found("Catalog item", catalog_id))?;
        }
        if let Some(vendor_id) = input.vendor_id {
            vendor::Entity::find_by_id(vendor_id)
                .one(db)
                .await?
                .ok_or_else(|| ServiceError::not_found("Vendor", vendor_id))?;
        }

        let now = self.clock.now();
        let part = spare_part::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(input.name.trim().to_string()),
            part_number: Set(clean_text(input.part_number)),
            catalog_id: Set(input.catalog_id),
            vendor_id: Set(input.vendor_id),
            quantity: Set(input.quantity),
            min_quantity: Set(input.min_quantity),
            unit: Set(clean_text(input.unit).unwrap_or_else(|| self.defaults.unit.clone())),
            cost_price: Set(input.cost_price),
            sale_price: Set(input.sale_price),
            location: Set(clean_text(input.location)),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(db)
        .await?;

        info!(part_id = %part.id, name = %part.name, quantity = part.quantity, "Spare part created");
        Ok(part.into())
    }

    #[instrument(skip(self, actor, input), fields(user_id = %actor.user_id))]
    pub async fn update_part(
        &self,
        actor: &AuthUser,
        id: Uuid,
        input: UpdateSparePart,
    ) -> Result<SparePart, ServiceError> {
        input.validate()?;
        if let Some(min_quantity) = input.min_quantity {
            ensure_non_negative("min_quantity", min_quantity)?;
        }
        if let Some(price) = input.cost_price {
            money::validate_unit_price(price)?;
        }
        if let Some(price) = input.sale_price {
            money::validate_unit_price(price)?;
        }

        let txn = self.db.begin().await?;
        let part = lock_part(&txn, id).await?;

        let mut active: spare_part::ActiveModel = part.into();
        if let Some(name) = input.name {
            active.name = Set(name.trim().to_string());
        }
        if let Some(part_number) = input.part_number {
            active.part_number = Set(clean_text(Some(part_number)));
        }
        if let Some(min_quantity) = input.min_quantity {
            active.min_quantity = Set(min_quantity);
        }
        if let Some(price) = input.cost_price {
            active.cost_price = Set(price);
        }
        if let Some(price) = input.sale_price {
            active.sale_price = Set(price);
        }
        if let Some(location) = input.location {
            active.location = Set(clean_text(Some(location)));
        }
        active.updated_at = Set(self.clock.now());

        let part = active.update(&txn).await?;
        txn.commit().await?;
        Ok(part.into())
    }

    #[instrument(skip(self))]
    pub async fn get_part(&self, id: Uuid) -> Result<SparePart, ServiceError> {
        spare_part::Entity::find_by_id(id)
            .one(self.db.as_ref())
            .await?
            .map(SparePart::from)
            .ok_or_else(|| ServiceError::not_found("Spare part", id))
    }

    /// Alphabetical by name
    #[instrument(skip(self))]
    pub async fn list_parts(&self, filter: PartFilter) -> Result<Vec<SparePart>, ServiceError> {
        let mut query = spare_part::Entity::find();
        if let Some(search) = clean_text(filter.search) {
            query = query.filter(
                Condition::any()
                    .add(spare_part::Column::Name.contains(&search))
                    .add(spare_part::Column::PartNumber.contains(&search)),
            );
        }
        if filter.low_stock == Some(true) {
            query = query.filter(
                Expr::col(spare_part::Column::Quantity)
                    .lte(Expr::col(spare_part::Column::MinQuantity)),
            );
        }

        let parts = query
            .order_by_asc(spare_part::Column::Name)
            .all(self.db.as_ref())
            .await?;
        Ok(parts.into_iter().map(SparePart::from).collect())
    }

    /// Parts at or below their reorder threshold
    #[instrument(skip(self))]
    pub async fn low_stock(&self) -> Result<Vec<SparePart>, ServiceError> {
        self.list_parts(PartFilter {
            search: None,
            low_stock: Some(true),
        })
        .await
    }

    /// Adds `quantity` units to stock
    #[instrument(skip(self, actor), fields(user_id = %actor.user_id))]
    pub async fn receive(
        &self,
        actor: &AuthUser,
        part_id: Uuid,
        input: ReceiveStock,
    ) -> Result<SparePart, ServiceError> {
        if input.quantity <= 0 {
            return Err(ServiceError::validation(format!(
                "quantity must be greater than zero, got {}",
                input.quantity
            )));
        }

        let now = self.clock.now();
        let txn = self.db.begin().await?;
        let current = lock_part(&txn, part_id).await?;
        if current.quantity.checked_add(input.quantity).is_none() {
            return Err(ServiceError::validation(format!(
                "Receiving {} {} of {} would overflow the stock counter",
                input.quantity, current.unit, current.name
            )));
        }

        spare_part::Entity::update_many()
            .col_expr(
                spare_part::Column::Quantity,
                Expr::col(spare_part::Column::Quantity).add(input.quantity),
            )
            .col_expr(spare_part::Column::UpdatedAt, Expr::value(now))
            .filter(spare_part::Column::Id.eq(part_id))
            .exec(&txn)
            .await?;

        let part = lock_part(&txn, part_id).await?;
        txn.commit().await?;

        info!(
            part_id = %part_id,
            received = input.quantity,
            on_hand = part.quantity,
            "Stock received"
        );
        Ok(part.into())
    }

    /// Consumes stock for a service request and records the usage.
    ///
    /// The decrement is conditional on the stock still covering the quantity,
    /// so concurrent consumers can never drive the part negative.
    #[instrument(skip(self, actor, input), fields(user_id = %actor.user_id, request_id = %input.request_id))]
    pub async fn use_part(
        &self,
        actor: &AuthUser,
        part_id: Uuid,
        input: UsePart,
    ) -> Result<parts_usage::Model, ServiceError> {
        input.validate()?;
        if let Some(price) = input.unit_price {
            money::validate_unit_price(price)?;
        }

        let now = self.clock.now();
        let txn = self.db.begin().await?;
        let part = lock_part(&txn, part_id).await?;

        if input.quantity <= 0 {
            return Err(ServiceError::validation(format!(
                "quantity must be greater than zero, got {}",
                input.quantity
            )));
        }
        if input.quantity > part.quantity {
            return Err(insufficient(&part));
        }

        let request = service_request::Entity::find_by_id(input.request_id)
            .one(&txn)
            .await?
            .ok_or_else(|| ServiceError::not_found("Service request", input.request_id))?;

        let result = spare_part::Entity::update_many()
            .col_expr(
                spare_part::Column::Quantity,
                Expr::col(spare_part::Column::Quantity).sub(input.quantity),
            )
            .col_expr(spare_part::Column::UpdatedAt, Expr::value(now))
            .filter(spare_part::Column::Id.eq(part_id))
            .filter(spare_part::Column::Quantity.gte(input.quantity))
            .exec(&txn)
            .await?;

        if result.rows_affected == 0 {
            let current = lock_part(&txn, part_id).await?;
            warn!(
                part_id = %part_id,
                requested = input.quantity,
                available = current.quantity,
                "Stock changed before decrement"
            );
            return Err(insufficient(&current));
        }

        let usage = parts_usage::ActiveModel {
            id: Set(Uuid::new_v4()),
            part_id: Set(part_id),
            request_id: Set(request.id),
            quantity: Set(input.quantity),
            unit_price: Set(input.unit_price.unwrap_or(part.sale_price)),
            used_by: Set(actor.user_id),
            used_at: Set(now),
            notes: Set(clean_text(input.notes)),
        }
        .insert(&txn)
        .await?;

        txn.commit().await?;

        info!(
            part_id = %part_id,
            request = %request.number,
            quantity = input.quantity,
            remaining = part.quantity - input.quantity,
            "Parts used"
        );
        Ok(usage)
    }

    /// Consumption history of a part, newest first
    #[instrument(skip(self))]
    pub async fn usages(&self, part_id: Uuid) -> Result<Vec<parts_usage::Model>, ServiceError> {
        self.get_part(part_id).await?;
        let usages = parts_usage::Entity::find()
            .filter(parts_usage::Column::PartId.eq(part_id))
            .order_by_desc(parts_usage::Column::UsedAt)
            .all(self.db.as_ref())
            .await?;
        Ok(usages)
    }
}
