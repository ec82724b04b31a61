use crate::{
    auth::AuthUser,
    clock::Clock,
    db::DbPool,
    entities::{
        client,
        equipment_unit::{self, EquipmentStatus},
        parts_usage,
        service_request::{self, RequestKind, RequestPriority, RequestStatus},
        spare_part,
    },
    errors::ServiceError,
    lifecycle::{guard_transition, Lifecycle},
    money::line_total,
    sequence::{next_number, DocumentKind},
    services::{clean_text, validate_not_blank},
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, QueryTrait, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, instrument};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateServiceRequest {
    pub client_id: Uuid,
    pub equipment_id: Uuid,
    #[serde(default, rename = "type")]
    pub kind: Option<RequestKind>,
    #[serde(default)]
    pub priority: Option<RequestPriority>,
    #[validate(custom = "validate_not_blank", length(max = 5000))]
    pub description: String,
}

/// Plain edits; the engineer is changed through assignment only
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateServiceRequest {
    #[serde(default, rename = "type")]
    pub kind: Option<RequestKind>,
    #[serde(default)]
    pub priority: Option<RequestPriority>,
    #[validate(custom = "validate_not_blank", length(max = 5000))]
    pub description: Option<String>,
    #[validate(length(max = 5000))]
    pub resolution: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct SetRequestStatus {
    pub status: RequestStatus,
    #[validate(length(max = 5000))]
    pub resolution: Option<String>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct AssignEngineer {
    pub engineer_id: Uuid,
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct RequestFilter {
    pub status: Option<RequestStatus>,
    pub client_id: Option<Uuid>,
    pub engineer_id: Option<Uuid>,
    pub priority: Option<RequestPriority>,
    #[serde(rename = "type")]
    pub kind: Option<RequestKind>,
}

/// One consumed part on a request, with its line total
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct RequestPartLine {
    pub usage_id: Uuid,
    pub part_id: Uuid,
    pub part_name: String,
    pub part_number: Option<String>,
    pub quantity: i32,
    pub unit_price: Decimal,
    pub total: Decimal,
    pub used_by: Uuid,
    pub used_at: DateTime<Utc>,
    pub notes: Option<String>,
}

/// Repair-ticket lifecycle, coupled to the status of the equipment unit
#[derive(Clone)]
pub struct ServiceRequestService {
    db: Arc<DbPool>,
    clock: Arc<dyn Clock>,
}

async fn lock_request<C>(conn: &C, id: Uuid) -> Result<service_request::Model, ServiceError>
where
    C: ConnectionTrait,
{
    service_request::Entity::find_by_id(id)
        .lock_exclusive()
        .one(conn)
        .await?
        .ok_or_else(|| ServiceError::not_found("Service request", id))
}

/// Puts the unit back into service once its last open request is resolved.
///
/// Units that are not `in_repair` (for example decommissioned ones) are left
/// alone, and so are units that still have another open request.
async fn release_equipment<C>(
    conn: &C,
    request: &service_request::Model,
    now: DateTime<Utc>,
) -> Result<(), ServiceError>
where
    C: ConnectionTrait,
{
    let Some(unit) = equipment_unit::Entity::find_by_id(request.equipment_id)
        .lock_exclusive()
        .one(conn)
        .await?
    else {
        return Ok(());
    };

    if unit.status != EquipmentStatus::InRepair {
        debug!(equipment_id = %unit.id, status = %unit.status, "Equipment not in repair, leaving status");
        return Ok(());
    }

    let still_open = service_request::Entity::find()
        .filter(service_request::Column::EquipmentId.eq(unit.id))
        .filter(service_request::Column::Id.ne(request.id))
        .filter(service_request::Column::Status.is_in(RequestStatus::OPEN))
        .count(conn)
        .await?;

    if still_open > 0 {
        info!(
            equipment_id = %unit.id,
            open_requests = still_open,
            "Equipment stays in repair while other requests are open"
        );
        return Ok(());
    }

    let unit_id = unit.id;
    let mut active: equipment_unit::ActiveModel = unit.into();
    active.status = Set(EquipmentStatus::Active);
    active.updated_at = Set(now);
    active.update(conn).await?;

    info!(equipment_id = %unit_id, "Equipment returned to service");
    Ok(())
}

impl ServiceRequestService {
    pub fn new(db: Arc<DbPool>, clock: Arc<dyn Clock>) -> Self {
        Self { db, clock }
    }

    /// Opens a request and puts the equipment unit into repair
    #[instrument(skip(self, actor, input), fields(user_id = %actor.user_id, equipment_id = %input.equipment_id))]
    pub async fn create(
        &self,
        actor: &AuthUser,
        input: CreateServiceRequest,
    ) -> Result<service_request::Model, ServiceError> {
        input.validate()?;
        let now = self.clock.now();
        let txn = self.db.begin().await?;

        client::Entity::find_by_id(input.client_id)
            .one(&txn)
            .await?
            .ok_or_else(|| ServiceError::not_found("Client", input.client_id))?;

        let unit = equipment_unit::Entity::find_by_id(input.equipment_id)
            .lock_exclusive()
            .one(&txn)
            .await?
            .ok_or_else(|| ServiceError::not_found("Equipment unit", input.equipment_id))?;

        if unit.client_id != input.client_id {
            return Err(ServiceError::validation(format!(
                "Equipment unit {} does not belong to client {}",
                unit.id, input.client_id
            )));
        }
        if unit.status == EquipmentStatus::Decommissioned {
            return Err(ServiceError::validation(format!(
                "Equipment unit {} is decommissioned",
                unit.serial_number
            )));
        }

        let number = next_number(&txn, DocumentKind::ServiceRequest, self.clock.year()).await?;

        let request = service_request::ActiveModel {
            id: Set(Uuid::new_v4()),
            number: Set(number),
            client_id: Set(input.client_id),
            equipment_id: Set(unit.id),
            engineer_id: Set(None),
            created_by: Set(actor.user_id),
            kind: Set(input.kind.unwrap_or_default()),
            priority: Set(input.priority.unwrap_or_default()),
            description: Set(input.description.trim().to_string()),
            resolution: Set(None),
            status: Set(RequestStatus::New),
            created_at: Set(now),
            assigned_at: Set(None),
            started_at: Set(None),
            closed_at: Set(None),
            updated_at: Set(now),
        }
        .insert(&txn)
        .await?;

        if unit.status != EquipmentStatus::InRepair {
            let mut unit: equipment_unit::ActiveModel = unit.into();
            unit.status = Set(EquipmentStatus::InRepair);
            unit.updated_at = Set(now);
            unit.update(&txn).await?;
        }

        txn.commit().await?;

        info!(
            request_id = %request.id,
            number = %request.number,
            "Service request opened, equipment in repair"
        );
        Ok(request)
    }

    #[instrument(skip(self))]
    pub async fn get(&self, id: Uuid) -> Result<service_request::Model, ServiceError> {
        service_request::Entity::find_by_id(id)
            .one(self.db.as_ref())
            .await?
            .ok_or_else(|| ServiceError::not_found("Service request", id))
    }

    /// Newest first
    #[instrument(skip(self))]
    pub async fn list(
        &self,
        filter: RequestFilter,
    ) -> Result<Vec<service_request::Model>, ServiceError> {
        let requests = service_request::Entity::find()
            .apply_if(filter.status, |q, v| {
                q.filter(service_request::Column::Status.eq(v))
            })
            .apply_if(filter.client_id, |q, v| {
                q.filter(service_request::Column::ClientId.eq(v))
            })
            .apply_if(filter.engineer_id, |q, v| {
                q.filter(service_request::Column::EngineerId.eq(v))
            })
            .apply_if(filter.priority, |q, v| {
                q.filter(service_request::Column::Priority.eq(v))
            })
            .apply_if(filter.kind, |q, v| q.filter(service_request::Column::Kind.eq(v)))
            .order_by_desc(service_request::Column::CreatedAt)
            .all(self.db.as_ref())
            .await?;
        Ok(requests)
    }

    #[instrument(skip(self, actor, input), fields(user_id = %actor.user_id))]
    pub async fn update(
        &self,
        actor: &AuthUser,
        id: Uuid,
        input: UpdateServiceRequest,
    ) -> Result<service_request::Model, ServiceError> {
        input.validate()?;
        let txn = self.db.begin().await?;
        let request = lock_request(&txn, id).await?;

        if request.status.is_terminal() {
            return Err(ServiceError::validation(format!(
                "Service request {} is {} and can no longer be edited",
                request.number, request.status
            )));
        }

        let mut active: service_request::ActiveModel = request.into();
        if let Some(kind) = input.kind {
            active.kind = Set(kind);
        }
        if let Some(priority) = input.priority {
            active.priority = Set(priority);
        }
        if let Some(description) = input.description {
            active.description = Set(description.trim().to_string());
        }
        if let Some(resolution) = input.resolution {
            active.resolution = Set(clean_text(Some(resolution)));
        }
        active.updated_at = Set(self.clock.now());

        let updated = active.update(&txn).await?;
        txn.commit().await?;
        Ok(updated)
    }

    /// Moves the request along its lifecycle.
    ///
    /// Stamps `assigned_at`, `started_at` or `closed_at` the first time the
    /// matching state is entered. Resolving the request (done, closed or
    /// cancelled) may return the equipment unit to service.
    #[instrument(skip(self, actor, input), fields(user_id = %actor.user_id, to = %input.status))]
    pub async fn set_status(
        &self,
        actor: &AuthUser,
        id: Uuid,
        input: SetRequestStatus,
    ) -> Result<service_request::Model, ServiceError> {
        input.validate()?;
        let now = self.clock.now();
        let txn = self.db.begin().await?;
        let request = lock_request(&txn, id).await?;

        let from = request.status;
        let to = input.status;
        guard_transition(from, to)?;

        let mut active: service_request::ActiveModel = request.clone().into();
        active.status = Set(to);
        match to {
            RequestStatus::Assigned if request.assigned_at.is_none() => {
                active.assigned_at = Set(Some(now));
            }
            RequestStatus::InProgress if request.started_at.is_none() => {
                active.started_at = Set(Some(now));
            }
            status if status.is_resolved() && request.closed_at.is_none() => {
                active.closed_at = Set(Some(now));
            }
            _ => {}
        }
        if let Some(resolution) = clean_text(input.resolution) {
            active.resolution = Set(Some(resolution));
        }
        active.updated_at = Set(now);

        let updated = active.update(&txn).await?;

        if to.is_resolved() {
            release_equipment(&txn, &updated, now).await?;
        }

        txn.commit().await?;

        info!(
            request_id = %updated.id,
            number = %updated.number,
            from = %from,
            to = %to,
            "Service request status changed"
        );
        Ok(updated)
    }

    /// Sets or replaces the engineer; a `new` request becomes `assigned`
    #[instrument(skip(self, actor, input), fields(user_id = %actor.user_id, engineer_id = %input.engineer_id))]
    pub async fn assign_engineer(
        &self,
        actor: &AuthUser,
        id: Uuid,
        input: AssignEngineer,
    ) -> Result<service_request::Model, ServiceError> {
        actor.require_manager()?;
        let now = self.clock.now();
        let txn = self.db.begin().await?;
        let request = lock_request(&txn, id).await?;

        if request.status.is_terminal() {
            return Err(ServiceError::validation(format!(
                "Cannot assign an engineer to service request {} in status {}",
                request.number, request.status
            )));
        }

        let from = request.status;
        let mut active: service_request::ActiveModel = request.clone().into();
        active.engineer_id = Set(Some(input.engineer_id));
        if from == RequestStatus::New {
            guard_transition(from, RequestStatus::Assigned)?;
            active.status = Set(RequestStatus::Assigned);
            if request.assigned_at.is_none() {
                active.assigned_at = Set(Some(now));
            }
        }
        active.updated_at = Set(now);

        let updated = active.update(&txn).await?;
        txn.commit().await?;

        info!(
            request_id = %updated.id,
            number = %updated.number,
            engineer_id = %input.engineer_id,
            status = %updated.status,
            "Engineer assigned"
        );
        Ok(updated)
    }

    /// Parts consumed on the request, oldest first
    #[instrument(skip(self))]
    pub async fn parts(&self, id: Uuid) -> Result<Vec<RequestPartLine>, ServiceError> {
        self.get(id).await?;

        let rows = parts_usage::Entity::find()
            .filter(parts_usage::Column::RequestId.eq(id))
            .find_also_related(spare_part::Entity)
            .order_by_asc(parts_usage::Column::UsedAt)
            .all(self.db.as_ref())
            .await?;

        Ok(rows
            .into_iter()
            .map(|(usage, part)| {
                let (part_name, part_number) = part
                    .map(|p| (p.name, p.part_number))
                    .unwrap_or_default();
                RequestPartLine {
                    usage_id: usage.id,
                    part_id: usage.part_id,
                    part_name,
                    part_number,
                    quantity: usage.quantity,
                    unit_price: usage.unit_price,
                    total: line_total(Decimal::from(usage.quantity), usage.unit_price),
                    used_by: usage.used_by,
                    used_at: usage.used_at,
                    notes: usage.notes,
                }
            })
            .collect())
    }

    /// Requests raised against one equipment unit, newest first
    #[instrument(skip(self))]
    pub async fn for_equipment(
        &self,
        equipment_id: Uuid,
    ) -> Result<Vec<service_request::Model>, ServiceError> {
        let requests = service_request::Entity::find()
            .filter(service_request::Column::EquipmentId.eq(equipment_id))
            .order_by_desc(service_request::Column::CreatedAt)
            .all(self.db.as_ref())
            .await?;
        Ok(requests)
    }
}
