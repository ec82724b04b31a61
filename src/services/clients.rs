use crate::{
    auth::AuthUser,
    clock::Clock,
    db::DbPool,
    entities::{
        client::{self, ClientStatus},
        interaction::{self, InteractionKind},
    },
    errors::ServiceError,
    services::{clean_text, validate_not_blank},
};
use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, QueryFilter, QueryOrder, Set,
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{info, instrument};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateClient {
    #[validate(custom = "validate_not_blank", length(max = 255))]
    pub name: String,
    #[validate(length(min = 10, max = 12))]
    pub tax_id: Option<String>,
    #[validate(length(max = 20))]
    pub registration_number: Option<String>,
    #[validate(length(max = 255))]
    pub contact_person: Option<String>,
    #[validate(length(max = 50))]
    pub phone: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    pub address: Option<String>,
    pub manager_id: Option<Uuid>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateClient {
    #[validate(custom = "validate_not_blank", length(max = 255))]
    pub name: Option<String>,
    #[validate(length(min = 10, max = 12))]
    pub tax_id: Option<String>,
    #[validate(length(max = 20))]
    pub registration_number: Option<String>,
    #[validate(length(max = 255))]
    pub contact_person: Option<String>,
    #[validate(length(max = 50))]
    pub phone: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    pub address: Option<String>,
    pub manager_id: Option<Uuid>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ClientFilter {
    /// Matches name or tax id
    pub search: Option<String>,
    /// Defaults to `active`
    pub status: Option<ClientStatus>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateInteraction {
    #[serde(rename = "type")]
    pub kind: InteractionKind,
    #[validate(custom = "validate_not_blank", length(max = 5000))]
    pub summary: String,
    /// Defaults to now
    pub occurred_at: Option<DateTime<Utc>>,
}

#[derive(Clone)]
pub struct ClientService {
    db: Arc<DbPool>,
    clock: Arc<dyn Clock>,
}

impl ClientService {
    pub fn new(db: Arc<DbPool>, clock: Arc<dyn Clock>) -> Self {
        Self { db, clock }
    }

    #[instrument(skip(self, actor, input), fields(user_id = %actor.user_id))]
    pub async fn create(
        &self,
        actor: &AuthUser,
        input: CreateClient,
    ) -> Result<client::Model, ServiceError> {
        input.validate()?;
        let now = self.clock.now();

        let client = client::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(input.name.trim().to_string()),
            tax_id: Set(clean_text(input.tax_id)),
            registration_number: Set(clean_text(input.registration_number)),
            contact_person: Set(clean_text(input.contact_person)),
            phone: Set(clean_text(input.phone)),
            email: Set(clean_text(input.email)),
            address: Set(clean_text(input.address)),
            manager_id: Set(input.manager_id),
            status: Set(ClientStatus::Active),
            notes: Set(clean_text(input.notes)),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(self.db.as_ref())
        .await?;

        info!(client_id = %client.id, name = %client.name, "Client created");
        Ok(client)
    }

    #[instrument(skip(self))]
    pub async fn get(&self, id: Uuid) -> Result<client::Model, ServiceError> {
        client::Entity::find_by_id(id)
            .one(self.db.as_ref())
            .await?
            .ok_or_else(|| ServiceError::not_found("Client", id))
    }

    #[instrument(skip(self, actor, input), fields(user_id = %actor.user_id))]
    pub async fn update(
        &self,
        actor: &AuthUser,
        id: Uuid,
        input: UpdateClient,
    ) -> Result<client::Model, ServiceError> {
        input.validate()?;
        let existing = self.get(id).await?;

        let mut active: client::ActiveModel = existing.into();
        if let Some(name) = input.name {
            active.name = Set(name.trim().to_string());
        }
        if input.tax_id.is_some() {
            active.tax_id = Set(clean_text(input.tax_id));
        }
        if input.registration_number.is_some() {
            active.registration_number = Set(clean_text(input.registration_number));
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
        if let Some(manager_id) = input.manager_id {
            active.manager_id = Set(Some(manager_id));
        }
        if input.notes.is_some() {
            active.notes = Set(clean_text(input.notes));
        }
        active.updated_at = Set(self.clock.now());

        Ok(active.update(self.db.as_ref()).await?)
    }

    /// Alphabetical by name
    #[instrument(skip(self))]
    pub async fn list(&self, filter: ClientFilter) -> Result<Vec<client::Model>, ServiceError> {
        let status = filter.status.unwrap_or(ClientStatus::Active);
        let mut query = client::Entity::find().filter(client::Column::Status.eq(status));
        if let Some(search) = clean_text(filter.search) {
            query = query.filter(
                Condition::any()
                    .add(client::Column::Name.contains(&search))
                    .add(client::Column::TaxId.contains(&search)),
            );
        }
        Ok(query
            .order_by_asc(client::Column::Name)
            .all(self.db.as_ref())
            .await?)
    }

    /// Soft delete: the client stays on record as `inactive`
    #[instrument(skip(self, actor), fields(user_id = %actor.user_id))]
    pub async fn deactivate(&self, actor: &AuthUser, id: Uuid) -> Result<client::Model, ServiceError> {
        let existing = self.get(id).await?;
        let mut active: client::ActiveModel = existing.into();
        active.status = Set(ClientStatus::Inactive);
        active.updated_at = Set(self.clock.now());
        let client = active.update(self.db.as_ref()).await?;

        info!(client_id = %client.id, "Client deactivated");
        Ok(client)
    }

    #[instrument(skip(self, actor, input), fields(user_id = %actor.user_id))]
    pub async fn add_interaction(
        &self,
        actor: &AuthUser,
        client_id: Uuid,
        input: CreateInteraction,
    ) -> Result<interaction::Model, ServiceError> {
        input.validate()?;
        self.get(client_id).await?;
        let now = self.clock.now();

        let interaction = interaction::ActiveModel {
            id: Set(Uuid::new_v4()),
            client_id: Set(client_id),
            user_id: Set(actor.user_id),
            kind: Set(input.kind),
            summary: Set(input.summary.trim().to_string()),
            occurred_at: Set(input.occurred_at.unwrap_or(now)),
            created_at: Set(now),
        }
        .insert(self.db.as_ref())
        .await?;
        Ok(interaction)
    }

    /// Newest first
    #[instrument(skip(self))]
    pub async fn interactions(&self, client_id: Uuid) -> Result<Vec<interaction::Model>, ServiceError> {
        self.get(client_id).await?;
        Ok(interaction::Entity::find()
            .filter(interaction::Column::ClientId.eq(client_id))
            .order_by_desc(interaction::Column::OccurredAt)
            .all(self.db.as_ref())
            .await?)
    }
}
