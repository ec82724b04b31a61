use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Operational status of an installed unit.
///
/// `InRepair` is driven by the unit's open service requests; only
/// `Decommissioned` is ever set by hand.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    EnumIter,
    DeriveActiveEnum,
    ToSchema,
    strum::Display,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum EquipmentStatus {
    #[sea_orm(string_value = "active")]
    Active,
    #[sea_orm(string_value = "in_repair")]
    InRepair,
    #[sea_orm(string_value = "decommissioned")]
    Decommissioned,
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[sea_orm(table_name = "equipment_units")]
#[schema(as = EquipmentUnit)]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub client_id: Uuid,
    pub catalog_id: Uuid,
    #[sea_orm(unique)]
    pub serial_number: String,
    pub install_date: Option<NaiveDate>,
    pub address: Option<String>,
    pub warranty_until: Option<NaiveDate>,
    pub status: EquipmentStatus,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::client::Entity",
        from = "Column::ClientId",
        to = "super::client::Column::Id",
        on_delete = "Restrict"
    )]
    Client,
    #[sea_orm(
        belongs_to = "super::equipment_catalog::Entity",
        from = "Column::CatalogId",
        to = "super::equipment_catalog::Column::Id",
        on_delete = "Restrict"
    )]
    CatalogItem,
    #[sea_orm(has_many = "super::service_request::Entity")]
    ServiceRequests,
}

impl Related<super::client::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Client.def()
    }
}

impl Related<super::equipment_catalog::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CatalogItem.def()
    }
}

impl Related<super::service_request::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ServiceRequests.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
