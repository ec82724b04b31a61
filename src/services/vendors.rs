use crate::{
    auth::AuthUser,
    clock::Clock,
    db::DbPool,
    entities::{purchase_order, vendor},
    errors::ServiceError,
    services::{clean_text, validate_not_blank},
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, ModelTrait, PaginatorTrait,
    QueryFilter, QueryOrder, Set, TransactionTrait,
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{info, instrument};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateVendor {
    #[validate(custom = "validate_not_blank", length(max = 255))]
    pub name: String,
    #[validate(length(max = 255))]
    pub contact_person: Option<String>,
    #[validate(length(max = 50))]
    pub phone: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    pub address: Option<String>,
    #[validate(length(max = 20))]
    pub tax_id: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateVendor {
    #[validate(custom = "validate_not_blank", length(max = 255))]
    pub name: Option<String>,
    #[validate(length(max = 255))]
    pub contact_person: Option<String>,
    #[validate(length(max = 50))]
    pub phone: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    pub address: Option<String>,
    #[validate(length(max = 20))]
    pub tax_id: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct VendorFilter {
    /// Matches name or contact person
    pub search: Option<String>,
}

#[derive(Clone)]
pub struct VendorService {
    db: Arc<DbPool>,
    clock: Arc<dyn Clock>,
}

impl VendorService {
    pub fn new(db: Arc<DbPool>, clock: Arc<dyn Clock>) -> Self {
        Self { db, clock }
    }

    #[instrument(skip(self, actor, input), fields(user_id = %actor.user_id))]
    pub async fn create(
        &self,
        actor: &AuthUser,
        input: CreateVendor,
    ) -> Result<vendor::Model, ServiceError> {
        actor.require_manager()?;
        input.validate()?;
        let now = self.clock.now();

        let vendor = vendor::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(input.name.trim().to_string()),
            contact_person: Set(clean_text(input.contact_person)),
            phone: Set(clean_text(input.phone)),
            email: Set(clean_text(input.email)),
            address: Set(clean_text(input.address)),
            tax_id: Set(clean_text(input.tax_id)),
            notes: Set(clean_text(input.notes)),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(self.db.as_ref())
        .await?;

        info!(vendor_id = %vendor.id, name = %vendor.name, "Vendor created");
        Ok(vendor)
    }

    #[instrument(skip(self))]
    pub async fn get(&self, id: Uuid) -> Result<vendor::Model, ServiceError> {
        vendor::Entity::find_by_id(id)
            .one(self.db.as_ref())
            .await?
            .ok_or_else(|| ServiceError::not_found("Vendor", id))
    }

    #[instrument(skip(self, actor, input), fields(user_id = %actor.user_id))]
    pub async fn update(
        &self,
        actor: &AuthUser,
        id: Uuid,
        input: UpdateVendor,
    ) -> Result<vendor::Model, ServiceError> {
        actor.require_manager()?;
        input.validate()?;
        let existing = self.get(id).await?;

        let mut active: vendor::ActiveModel = existing.into();
        if let Some(name) = input.name {
            active.name = Set(name.trim().to_string());
        }
        if input.contact_person.is_some() {
            active.contact_person = Set(clean_text(input.contact_person));
        }
        if input.phone.is_some() {
            active.phone = Set(clean_text(input.phone));
        }
        if input.email.is_some() {
            active.email = Set(clean_text(input.email));
        }
        if input.address.is_some() {
            active.address = Set(clean_text(input.address));
        }
        if input.tax_id.is_some() {
            active.tax_id = Set(clean_text(input.tax_id));
        }
        if input.notes.is_some() {
            active.notes = Set(clean_text(input.notes));
        }
        active.updated_at = Set(self.clock.now());

        Ok(active.update(self.db.as_ref()).await?)
    }

    /// Alphabetical by name
    #[instrument(skip(self))]
    pub async fn list(&self, filter: VendorFilter) -> Result<Vec<vendor::Model>, ServiceError> {
        let mut query = vendor::Entity::find();
        if let Some(search) = clean_text(filter.search) {
            query = query.filter(
                Condition::any()
                    .add(vendor::Column::Name.contains(&search))
                    .add(vendor::Column::ContactPerson.contains(&search)),
            );
        }
        Ok(query
            .order_by_asc(vendor::Column::Name)
            .all(self.db.as_ref())
            .await?)
    }

    /// Vendors referenced by purchase orders cannot be deleted
    #[instrument(skip(self, actor), fields(user_id = %actor.user_id))]
    pub async fn delete(&self, actor: &AuthUser, id: Uuid) -> Result<(), ServiceError> {
        actor.require_manager()?;
        let txn = self.db.begin().await?;

        let vendor = vendor::Entity::find_by_id(id)
            .one(&txn)
            .await?
            .ok_or_else(|| ServiceError::not_found("Vendor", id))?;

        let orders = purchase_order::Entity::find()
            .filter(purchase_order::Column::VendorId.eq(id))
            .count(&txn)
            .await?;
        if orders > 0 {
            return Err(ServiceError::Conflict(format!(
                "Vendor {} has {} purchase order(s) and cannot be deleted",
                vendor.name, orders
            )));
        }

        vendor.delete(&txn).await?;
        txn.commit().await?;

        info!(vendor_id = %id, "Vendor deleted");
        Ok(())
    }
}
