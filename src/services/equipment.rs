use crate::{
    auth::AuthUser,
    clock::Clock,
    db::DbPool,
    entities::{
        client, equipment_catalog,
        equipment_unit::{self, EquipmentStatus},
    },
    errors::ServiceError,
    money,
    services::{clean_text, validate_not_blank},
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, QueryFilter, QueryOrder, QueryTrait,
    Set,
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{info, instrument};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateCatalogItem {
    #[validate(custom = "validate_not_blank", length(max = 255))]
    pub name: String,
    #[validate(length(max = 255))]
    pub model: Option<String>,
    #[validate(length(max = 255))]
    pub manufacturer: Option<String>,
    #[validate(length(max = 100))]
    pub category: Option<String>,
    pub description: Option<String>,
    pub price: Option<Decimal>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateCatalogItem {
    #[validate(custom = "validate_not_blank", length(max = 255))]
    pub name: Option<String>,
    #[validate(length(max = 255))]
    pub model: Option<String>,
    #[validate(length(max = 255))]
    pub manufacturer: Option<String>,
    #[validate(length(max = 100))]
    pub category: Option<String>,
    pub description: Option<String>,
    pub price: Option<Decimal>,
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct CatalogFilter {
    pub category: Option<String>,
    /// Matches name, model or manufacturer
    pub search: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateEquipmentUnit {
    pub client_id: Uuid,
    pub catalog_id: Uuid,
    #[validate(custom = "validate_not_blank", length(max = 100))]
    pub serial_number: String,
    pub install_date: Option<NaiveDate>,
    pub address: Option<String>,
    pub warranty_until: Option<NaiveDate>,
    pub notes: Option<String>,
}

/// Site details only; status follows service requests and decommissioning
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateEquipmentUnit {
    pub install_date: Option<NaiveDate>,
    pub address: Option<String>,
    pub warranty_until: Option<NaiveDate>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct EquipmentFilter {
    pub client_id: Option<Uuid>,
    pub status: Option<EquipmentStatus>,
}

/// Equipment catalog and installed units
#[derive(Clone)]
pub struct EquipmentService {
    db: Arc<DbPool>,
    clock: Arc<dyn Clock>,
}

impl EquipmentService {
    pub fn new(db: Arc<DbPool>, clock: Arc<dyn Clock>) -> Self {
        Self { db, clock }
    }

    #[instrument(skip(self, actor, input), fields(user_id = %actor.user_id))]
    pub async fn create_catalog_item(
        &self,
        actor: &AuthUser,
        input: CreateCatalogItem,
    ) -> Result<equipment_catalog::Model, ServiceError> {
        actor.require_admin()?;
        input.validate()?;
        if let Some(price) = input.price {
            money::validate_unit_price(price)?;
        }
        let now = self.clock.now();

        let item = equipment_catalog::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(input.name.trim().to_string()),
            model: Set(clean_text(input.model)),
            manufacturer: Set(clean_text(input.manufacturer)),
            category: Set(clean_text(input.category)),
            description: Set(clean_text(input.description)),
            price: Set(input.price),
            is_active: Set(true),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(self.db.as_ref())
        .await?;

        info!(catalog_id = %item.id, name = %item.name, "Catalog item created");
        Ok(item)
    }

    #[instrument(skip(self))]
    pub async fn get_catalog_item(&self, id: Uuid) -> Result<equipment_catalog::Model, ServiceError> {
        equipment_catalog::Entity::find_by_id(id)
            .one(self.db.as_ref())
            .await?
            .ok_or_else(|| ServiceError::not_found("Catalog item", id))
    }

    #[instrument(skip(self, actor, input), fields(user_id = %actor.user_id))]
    pub async fn update_catalog_item(
        &self,
        actor: &AuthUser,
        id: Uuid,
        input: UpdateCatalogItem,
    ) -> Result<equipment_catalog::Model, ServiceError> {
        actor.require_admin()?;
        input.validate()?;
        if let Some(price) = input.price {
            money::validate_unit_price(price)?;
        }
        let existing = self.get_catalog_item(id).await?;

        let mut active: equipment_catalog::ActiveModel = existing.into();
        if let Some(name) = input.name {
            active.name = Set(name.trim().to_string());
        }
        if input.model.is_some() {
            active.model = Set(clean_text(input.model));
        }
        if input.manufacturer.is_some() {
            active.manufacturer = Set(clean_text(input.manufacturer));
        }
        if input.category.is_some() {
            active.category = Set(clean_text(input.category));
        }
        if input.description.is_some() {
            active.description = Set(clean_text(input.description));
        }
        if let Some(price) = input.price {
            active.price = Set(Some(price));
        }
        active.updated_at = Set(self.clock.now());

        Ok(active.update(self.db.as_ref()).await?)
    }

    /// Soft delete: hides the item from the catalog listing
    #[instrument(skip(self, actor), fields(user_id = %actor.user_id))]
    pub async fn deactivate_catalog_item(
        &self,
        actor: &AuthUser,
        id: Uuid,
    ) -> Result<equipment_catalog::Model, ServiceError> {
        actor.require_admin()?;
        let existing = self.get_catalog_item(id).await?;
        let mut active: equipment_catalog::ActiveModel = existing.into();
        active.is_active = Set(false);
        active.updated_at = Set(self.clock.now());
        let item = active.update(self.db.as_ref()).await?;

        info!(catalog_id = %item.id, "Catalog item deactivated");
        Ok(item)
    }

    /// Active items only, alphabetical
    #[instrument(skip(self))]
    pub async fn list_catalog(
        &self,
        filter: CatalogFilter,
    ) -> Result<Vec<equipment_catalog::Model>, ServiceError> {
        let mut query = equipment_catalog::Entity::find()
            .filter(equipment_catalog::Column::IsActive.eq(true))
            .apply_if(clean_text(filter.category), |q, v| {
                q.filter(equipment_catalog::Column::Category.eq(v))
            });
        if let Some(search) = clean_text(filter.search) {
            query = query.filter(
                Condition::any()
                    .add(equipment_catalog::Column::Name.contains(&search))
                    .add(equipment_catalog::Column::Model.contains(&search))
                    .add(equipment_catalog::Column::Manufacturer.contains(&search)),
            );
        }
        Ok(query
            .order_by_asc(equipment_catalog::Column::Name)
            .all(self.db.as_ref())
            .await?)
    }

    /// Registers an installed unit; serial numbers are globally unique
    #[instrument(skip(self, actor, input), fields(user_id = %actor.user_id, serial = %input.serial_number))]
    pub async fn create_unit(
        &self,
        actor: &AuthUser,
        input: CreateEquipmentUnit,
    ) -> Result<equipment_unit::Model, ServiceError> {
        input.validate()?;
        let db = self.db.as_ref();

        client::Entity::find_by_id(input.client_id)
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::not_found("Client", input.client_id))?;
        equipment_catalog::Entity::find_by_id(input.catalog_id)
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::not_found("Catalog item", input.catalog_id))?;

        let serial_number = input.serial_number.trim().to_string();
        let duplicate = equipment_unit::Entity::find()
            .filter(equipment_unit::Column::SerialNumber.eq(serial_number.as_str()))
            .one(db)
            .await?;
        if duplicate.is_some() {
            return Err(ServiceError::Conflict(format!(
                "Equipment with serial number {} already exists",
                serial_number
            )));
        }

        let now = self.clock.now();
        let unit = equipment_unit::ActiveModel {
            id: Set(Uuid::new_v4()),
            client_id: Set(input.client_id),
            catalog_id: Set(input.catalog_id),
            serial_number: Set(serial_number),
            install_date: Set(input.install_date),
            address: Set(clean_text(input.address)),
            warranty_until: Set(input.warranty_until),
            status: Set(EquipmentStatus::Active),
            notes: Set(clean_text(input.notes)),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(db)
        .await?;

        info!(equipment_id = %unit.id, serial = %unit.serial_number, "Equipment unit registered");
        Ok(unit)
    }

    #[instrument(skip(self))]
    pub async fn get_unit(&self, id: Uuid) -> Result<equipment_unit::Model, ServiceError> {
        equipment_unit::Entity::find_by_id(id)
            .one(self.db.as_ref())
            .await?
            .ok_or_else(|| ServiceError::not_found("Equipment unit", id))
    }

    #[instrument(skip(self, actor, input), fields(user_id = %actor.user_id))]
    pub async fn update_unit(
        &self,
        actor: &AuthUser,
        id: Uuid,
        input: UpdateEquipmentUnit,
    ) -> Result<equipment_unit::Model, ServiceError> {
        input.validate()?;
        let existing = self.get_unit(id).await?;

        let mut active: equipment_unit::ActiveModel = existing.into();
        if let Some(date) = input.install_date {
            active.install_date = Set(Some(date));
        }
        if input.address.is_some() {
            active.address = Set(clean_text(input.address));
        }
        if let Some(date) = input.warranty_until {
            active.warranty_until = Set(Some(date));
        }
        if input.notes.is_some() {
            active.notes = Set(clean_text(input.notes));
        }
        active.updated_at = Set(self.clock.now());

        Ok(active.update(self.db.as_ref()).await?)
    }

    #[instrument(skip(self))]
    pub async fn list_units(
        &self,
        filter: EquipmentFilter,
    ) -> Result<Vec<equipment_unit::Model>, ServiceError> {
        Ok(equipment_unit::Entity::find()
            .apply_if(filter.client_id, |q, v| {
                q.filter(equipment_unit::Column::ClientId.eq(v))
            })
            .apply_if(filter.status, |q, v| {
                q.filter(equipment_unit::Column::Status.eq(v))
            })
            .order_by_asc(equipment_unit::Column::SerialNumber)
            .all(self.db.as_ref())
            .await?)
    }

    /// Takes a unit out of service for good
    #[instrument(skip(self, actor), fields(user_id = %actor.user_id))]
    pub async fn decommission_unit(
        &self,
        actor: &AuthUser,
        id: Uuid,
    ) -> Result<equipment_unit::Model, ServiceError> {
        actor.require_manager()?;
        let existing = self.get_unit(id).await?;
        let mut active: equipment_unit::ActiveModel = existing.into();
        active.status = Set(EquipmentStatus::Decommissioned);
        active.updated_at = Set(self.clock.now());
        let unit = active.update(self.db.as_ref()).await?;

        info!(equipment_id = %unit.id, serial = %unit.serial_number, "Equipment decommissioned");
        Ok(unit)
    }
}
