use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Warehouse stock item. `quantity` is only changed by the inventory ledger.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[sea_orm(table_name = "spare_parts")]
#[schema(as = SparePartRecord)]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub name: String,
    pub part_number: Option<String>,
    pub catalog_id: Option<Uuid>,
    pub vendor_id: Option<Uuid>,
    pub quantity: i32,
    pub min_quantity: i32,
    pub unit: String,
    #[sea_orm(column_type = "Decimal(Some((14, 2)))")]
    pub cost_price: Decimal,
    #[sea_orm(column_type = "Decimal(Some((14, 2)))")]
    pub sale_price: Decimal,
    pub location: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Model {
    pub fn is_low_stock(&self) -> bool {
        self.quantity <= self.min_quantity
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::equipment_catalog::Entity",
        from = "Column::CatalogId",
        to = "super::equipment_catalog::Column::Id",
        on_delete = "SetNull"
    )]
    CatalogItem,
    #[sea_orm(
        belongs_to = "super::vendor::Entity",
        from = "Column::VendorId",
        to = "super::vendor::Column::Id",
        on_delete = "SetNull"
    )]
    Vendor,
    #[sea_orm(has_many = "super::parts_usage::Entity")]
    Usages,
}

impl Related<super::equipment_catalog::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CatalogItem.def()
    }
}

impl Related<super::vendor::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Vendor.def()
    }
}

impl Related<super::parts_usage::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Usages.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
