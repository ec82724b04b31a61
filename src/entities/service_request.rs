use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
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
pub enum RequestStatus {
    #[sea_orm(string_value = "new")]
    New,
    #[sea_orm(string_value = "assigned")]
    Assigned,
    #[sea_orm(string_value = "in_progress")]
    InProgress,
    #[sea_orm(string_value = "done")]
    Done,
    #[sea_orm(string_value = "closed")]
    Closed,
    #[sea_orm(string_value = "cancelled")]
    Cancelled,
}

impl RequestStatus {
    /// Statuses that keep the linked equipment unit in repair
    pub const OPEN: [RequestStatus; 3] = [
        RequestStatus::New,
        RequestStatus::Assigned,
        RequestStatus::InProgress,
    ];

    pub fn is_open(self) -> bool {
        Self::OPEN.contains(&self)
    }

    /// Work on the request is finished (successfully or not)
    pub fn is_resolved(self) -> bool {
        matches!(
            self,
            RequestStatus::Done | RequestStatus::Closed | RequestStatus::Cancelled
        )
    }
}

#[derive(
    Debug,
    Clone,
    Copy,
    Default,
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
pub enum RequestKind {
    #[default]
    #[sea_orm(string_value = "repair")]
    Repair,
    #[sea_orm(string_value = "maintenance")]
    Maintenance,
    #[sea_orm(string_value = "installation")]
    Installation,
    #[sea_orm(string_value = "other")]
    Other,
}

#[derive(
    Debug,
    Clone,
    Copy,
    Default,
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
pub enum RequestPriority {
    #[sea_orm(string_value = "low")]
    Low,
    #[default]
    #[sea_orm(string_value = "normal")]
    Normal,
    #[sea_orm(string_value = "high")]
    High,
    #[sea_orm(string_value = "critical")]
    Critical,
}

/// A repair or maintenance ticket against one equipment unit
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[sea_orm(table_name = "service_requests")]
#[schema(as = ServiceRequest)]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub number: String,
    pub client_id: Uuid,
    pub equipment_id: Uuid,
    pub engineer_id: Option<Uuid>,
    pub created_by: Uuid,
    #[serde(rename = "type")]
    pub kind: RequestKind,
    pub priority: RequestPriority,
    #[sea_orm(column_type = "Text")]
    pub description: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub resolution: Option<String>,
    pub status: RequestStatus,
    pub created_at: DateTime<Utc>,
    pub assigned_at: Option<DateTime<Utc>>,
    pub started_at: Option<DateTime<Utc>>,
    pub closed_at: Option<DateTime<Utc>>,
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
        belongs_to = "super::equipment_unit::Entity",
        from = "Column::EquipmentId",
        to = "super::equipment_unit::Column::Id",
        on_delete = "Restrict"
    )]
    EquipmentUnit,
    #[sea_orm(has_many = "super::parts_usage::Entity")]
    PartsUsages,
}

impl Related<super::client::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Client.def()
    }
}

impl Related<super::equipment_unit::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::EquipmentUnit.def()
    }
}

impl Related<super::parts_usage::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PartsUsages.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
