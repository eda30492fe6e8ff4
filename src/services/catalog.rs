use crate::{
    entities::{
        product, product_variant, Product, ProductModel, ProductVariant, ProductVariantModel,
    },
    errors::ServiceError,
    events::{Event, EventSender},
    ids,
};
use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;

/// Catalog store: product and variant lifecycle, plus the reads the order
/// flow uses to price items.
#[derive(Clone)]
pub struct ProductCatalogService {
    db: Arc<DatabaseConnection>,
    event_sender: Arc<EventSender>,
}

impl ProductCatalogService {
    pub fn new(db: Arc<DatabaseConnection>, event_sender: Arc<EventSender>) -> Self {
        Self { db, event_sender }
    }

    /// Creates a product (with any variant options) for a seller.
    #[instrument(skip(self, input))]
    pub async fn create_product(
        &self,
        seller_id: Uuid,
        input: CreateProductInput,
    ) -> Result<ProductModel, ServiceError> {
        if input.base_price < Decimal::ZERO {
            return Err(ServiceError::ValidationError(
                "Base price must not be negative".to_string(),
            ));
        }
        if input.stock < 0 {
            return Err(ServiceError::ValidationError(
                "Stock must not be negative".to_string(),
            ));
        }

        let txn = self.db.begin().await?;

        let now = Utc::now();
        let product = product::ActiveModel {
            id: Set(Uuid::new_v4()),
            product_id: Set(ids::generate_product_id()),
            seller_id: Set(seller_id),
            category_id: Set(input.category_id),
            name: Set(input.name),
            description: Set(input.description),
            base_price: Set(input.base_price),
            discount_price: Set(input.discount_price),
            stock: Set(input.stock),
            sold: Set(0),
            is_active: Set(true),
            created_at: Set(now),
            updated_at: Set(now),
        };
        let product = product.insert(&txn).await?;

        for variant in input.variants {
            for option in variant.options.into_iter().filter(|o| !o.is_empty()) {
                let row = product_variant::ActiveModel {
                    id: Set(Uuid::new_v4()),
                    product_id: Set(product.id),
                    name: Set(variant.name.clone()),
                    value: Set(option),
                    price: Set(variant.price.unwrap_or(Decimal::ZERO)),
                    created_at: Set(now),
                };
                row.insert(&txn).await?;
            }
        }

        txn.commit().await?;

        self.event_sender
            .send_or_log(Event::ProductCreated(product.id))
            .await;

        info!("Created product {} ({})", product.product_id, product.id);
        Ok(product)
    }

    /// Partially updates a product owned by the seller. Supplying variants
    /// replaces the existing variant rows wholesale.
    #[instrument(skip(self, input))]
    pub async fn update_product(
        &self,
        seller_id: Uuid,
        product_id: &str,
        input: UpdateProductInput,
    ) -> Result<ProductModel, ServiceError> {
        let txn = self.db.begin().await?;

        let product = self.find_owned(&txn, seller_id, product_id).await?;

        let mut active: product::ActiveModel = product.into();
        if let Some(name) = input.name {
            active.name = Set(name);
        }
        if let Some(description) = input.description {
            active.description = Set(description);
        }
        if let Some(base_price) = input.base_price {
            if base_price < Decimal::ZERO {
                return Err(ServiceError::ValidationError(
                    "Base price must not be negative".to_string(),
                ));
            }
            active.base_price = Set(base_price);
        }
        if let Some(discount_price) = input.discount_price {
            active.discount_price = Set(discount_price);
        }
        if let Some(stock) = input.stock {
            if stock < 0 {
                return Err(ServiceError::ValidationError(
                    "Stock must not be negative".to_string(),
                ));
            }
            active.stock = Set(stock);
        }
        if let Some(category_id) = input.category_id {
            active.category_id = Set(category_id);
        }
        if let Some(is_active) = input.is_active {
            active.is_active = Set(is_active);
        }
        active.updated_at = Set(Utc::now());

        let updated = active.update(&txn).await?;

        if let Some(variants) = input.variants {
            ProductVariant::delete_many()
                .filter(product_variant::Column::ProductId.eq(updated.id))
                .exec(&txn)
                .await?;
            let now = Utc::now();
            for variant in variants {
                for option in variant.options.into_iter().filter(|o| !o.is_empty()) {
                    let row = product_variant::ActiveModel {
                        id: Set(Uuid::new_v4()),
                        product_id: Set(updated.id),
                        name: Set(variant.name.clone()),
                        value: Set(option),
                        price: Set(variant.price.unwrap_or(Decimal::ZERO)),
                        created_at: Set(now),
                    };
                    row.insert(&txn).await?;
                }
            }
        }

        txn.commit().await?;

        self.event_sender
            .send_or_log(Event::ProductUpdated(updated.id))
            .await;

        Ok(updated)
    }

    /// Deletes a product owned by the seller.
    #[instrument(skip(self))]
    pub async fn delete_product(
        &self,
        seller_id: Uuid,
        product_id: &str,
    ) -> Result<(), ServiceError> {
        let product = self.find_owned(&*self.db, seller_id, product_id).await?;
        let id = product.id;

        Product::delete_by_id(id).exec(&*self.db).await?;

        self.event_sender
            .send_or_log(Event::ProductDeleted(id))
            .await;

        info!("Deleted product {}", product_id);
        Ok(())
    }

    /// Product with its variants, by external identifier.
    pub async fn get_product(
        &self,
        product_id: &str,
    ) -> Result<(ProductModel, Vec<ProductVariantModel>), ServiceError> {
        let product = self.find_by_external_id(&*self.db, product_id).await?;
        let variants = ProductVariant::find()
            .filter(product_variant::Column::ProductId.eq(product.id))
            .all(&*self.db)
            .await?;
        Ok((product, variants))
    }

    /// Active products, newest first.
    pub async fn list_products(&self) -> Result<Vec<ProductModel>, ServiceError> {
        let products = Product::find()
            .filter(product::Column::IsActive.eq(true))
            .order_by_desc(product::Column::CreatedAt)
            .all(&*self.db)
            .await?;
        Ok(products)
    }

    /// All products of one seller, newest first.
    pub async fn list_seller_products(
        &self,
        seller_id: Uuid,
    ) -> Result<Vec<ProductModel>, ServiceError> {
        let products = Product::find()
            .filter(product::Column::SellerId.eq(seller_id))
            .order_by_desc(product::Column::CreatedAt)
            .all(&*self.db)
            .await?;
        Ok(products)
    }

    async fn find_by_external_id<C: sea_orm::ConnectionTrait>(
        &self,
        conn: &C,
        product_id: &str,
    ) -> Result<ProductModel, ServiceError> {
        Product::find()
            .filter(product::Column::ProductId.eq(product_id))
            .one(conn)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Product not found".to_string()))
    }

    async fn find_owned<C: sea_orm::ConnectionTrait>(
        &self,
        conn: &C,
        seller_id: Uuid,
        product_id: &str,
    ) -> Result<ProductModel, ServiceError> {
        let product = self.find_by_external_id(conn, product_id).await?;
        if product.seller_id != seller_id {
            return Err(ServiceError::NotFound(
                "Product not found or you do not have permission".to_string(),
            ));
        }
        Ok(product)
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateProductInput {
    pub name: String,
    pub description: String,
    pub base_price: Decimal,
    pub discount_price: Option<Decimal>,
    pub stock: i32,
    pub category_id: Option<Uuid>,
    #[serde(default)]
    pub variants: Vec<VariantInput>,
}

#[derive(Debug, Deserialize)]
pub struct VariantInput {
    pub name: String,
    pub options: Vec<String>,
    pub price: Option<Decimal>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateProductInput {
    pub name: Option<String>,
    pub description: Option<String>,
    pub base_price: Option<Decimal>,
    /// `Some(None)` clears the discount.
    pub discount_price: Option<Option<Decimal>>,
    pub stock: Option<i32>,
    pub category_id: Option<Option<Uuid>>,
    pub is_active: Option<bool>,
    pub variants: Option<Vec<VariantInput>>,
}
