use crate::{
    entities::{address, Address, AddressModel, AddressType},
    errors::ServiceError,
    events::{Event, EventSender},
};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseTransaction, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::instrument;
use uuid::Uuid;

/// Shipping address book. A user's first address becomes the default;
/// promoting another address demotes the rest.
#[derive(Clone)]
pub struct AddressService {
    db: Arc<DatabaseConnection>,
    event_sender: Arc<EventSender>,
}

impl AddressService {
    pub fn new(db: Arc<DatabaseConnection>, event_sender: Arc<EventSender>) -> Self {
        Self { db, event_sender }
    }

    /// The user's addresses, default first.
    #[instrument(skip(self))]
    pub async fn list(&self, user_id: Uuid) -> Result<Vec<AddressModel>, ServiceError> {
        let addresses = Address::find()
            .filter(address::Column::UserId.eq(user_id))
            .order_by_desc(address::Column::IsDefault)
            .order_by_desc(address::Column::CreatedAt)
            .all(&*self.db)
            .await?;
        Ok(addresses)
    }

    #[instrument(skip(self, input))]
    pub async fn create(
        &self,
        user_id: Uuid,
        input: AddressInput,
    ) -> Result<AddressModel, ServiceError> {
        let txn = self.db.begin().await?;

        let existing = Address::find()
            .filter(address::Column::UserId.eq(user_id))
            .count(&txn)
            .await?;

        let is_default = if input.is_default.unwrap_or(false) {
            self.clear_default(&txn, user_id).await?;
            true
        } else {
            existing == 0
        };

        let now = Utc::now();
        let row = address::ActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(user_id),
            address_type: Set(input.address_type.unwrap_or_default()),
            street_address: Set(input.street_address),
            apartment: Set(input.apartment),
            city: Set(input.city),
            state: Set(input.state),
            postal_code: Set(input.postal_code),
            is_default: Set(is_default),
            created_at: Set(now),
            updated_at: Set(now),
        };
        let created = row.insert(&txn).await?;

        txn.commit().await?;

        self.event_sender
            .send_or_log(Event::AddressCreated(created.id))
            .await;

        Ok(created)
    }

    #[instrument(skip(self, input))]
    pub async fn update(
        &self,
        user_id: Uuid,
        address_id: Uuid,
        input: UpdateAddressInput,
    ) -> Result<AddressModel, ServiceError> {
        let txn = self.db.begin().await?;

        let existing = self.find_owned(&txn, user_id, address_id).await?;

        let mut active: address::ActiveModel = existing.into();
        if let Some(address_type) = input.address_type {
            active.address_type = Set(address_type);
        }
        if let Some(street_address) = input.street_address {
            active.street_address = Set(street_address);
        }
        if let Some(apartment) = input.apartment {
            active.apartment = Set(apartment);
        }
        if let Some(city) = input.city {
            active.city = Set(city);
        }
        if let Some(state) = input.state {
            active.state = Set(state);
        }
        if let Some(postal_code) = input.postal_code {
            active.postal_code = Set(postal_code);
        }
        active.updated_at = Set(Utc::now());
        let updated = active.update(&txn).await?;

        txn.commit().await?;
        Ok(updated)
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, user_id: Uuid, address_id: Uuid) -> Result<(), ServiceError> {
        let existing = self.find_owned(&*self.db, user_id, address_id).await?;
        Address::delete_by_id(existing.id).exec(&*self.db).await?;
        Ok(())
    }

    /// Promotes one address to default, demoting any other.
    #[instrument(skip(self))]
    pub async fn set_default(
        &self,
        user_id: Uuid,
        address_id: Uuid,
    ) -> Result<AddressModel, ServiceError> {
        let txn = self.db.begin().await?;

        let existing = self.find_owned(&txn, user_id, address_id).await?;
        self.clear_default(&txn, user_id).await?;

        let mut active: address::ActiveModel = existing.into();
        active.is_default = Set(true);
        active.updated_at = Set(Utc::now());
        let updated = active.update(&txn).await?;

        txn.commit().await?;
        Ok(updated)
    }

    async fn clear_default(
        &self,
        txn: &DatabaseTransaction,
        user_id: Uuid,
    ) -> Result<(), ServiceError> {
        Address::update_many()
            .col_expr(address::Column::IsDefault, sea_orm::sea_query::Expr::value(false))
            .filter(address::Column::UserId.eq(user_id))
            .filter(address::Column::IsDefault.eq(true))
            .exec(txn)
            .await?;
        Ok(())
    }

    async fn find_owned<C: sea_orm::ConnectionTrait>(
        &self,
        conn: &C,
        user_id: Uuid,
        address_id: Uuid,
    ) -> Result<AddressModel, ServiceError> {
        Address::find_by_id(address_id)
            .filter(address::Column::UserId.eq(user_id))
            .one(conn)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Address not found".to_string()))
    }
}

#[derive(Debug, Deserialize)]
pub struct AddressInput {
    pub address_type: Option<AddressType>,
    pub street_address: String,
    pub apartment: Option<String>,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    pub is_default: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateAddressInput {
    pub address_type: Option<AddressType>,
    pub street_address: Option<String>,
    /// `Some(None)` clears the apartment line.
    pub apartment: Option<Option<String>>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub postal_code: Option<String>,
}
