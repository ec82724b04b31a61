use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Immutable ledger entry for parts consumed on a service request
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[sea_orm(table_name = "parts_usages")]
#[schema(as = PartsUsage)]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub part_id: Uuid,
    pub request_id: Uuid,
    pub quantity: i32,
    #[sea_orm(column_type = "Decimal(Some((14, 2)))")]
    pub unit_price: Decimal,
    pub used_by: Uuid,
    pub used_at: DateTime<Utc>,
    #[sea_orm(column_type = "Text", nullable)]
    pub notes: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::spare_part::Entity",
        from = "Column::PartId",
        to = "super::spare_part::Column::Id",
        on_delete = "Restrict"
    )]
    SparePart,
    #[sea_orm(
        belongs_to = "super::service_request::Entity",
        from = "Column::RequestId",
        to = "super::service_request::Column::Id",
        on_delete = "Cascade"
    )]
    ServiceRequest,
}

impl Related<super::spare_part::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::SparePart.def()
    }
}

impl Related<super::service_request::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ServiceRequest.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
