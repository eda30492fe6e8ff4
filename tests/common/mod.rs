// Not every test crate uses every helper.
#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    body::Body,
    http::{Method, Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use marketplace_api::{
    auth::USER_ID_HEADER,
    config::AppConfig,
    db,
    entities::{AddressModel, ProductModel, SellerModel},
    events::{self, EventSender},
    handlers::AppServices,
    services::{
        addresses::AddressInput,
        catalog::{CreateProductInput, VariantInput},
        sellers::RegisterSellerInput,
    },
    AppState,
};
use rust_decimal::Decimal;
use serde_json::Value;
use tokio::sync::mpsc;
use tower::ServiceExt;
use uuid::Uuid;

/// Test harness: application state over a fresh in-memory SQLite database
/// plus the fully wired router.
pub struct TestApp {
    pub state: Arc<AppState>,
    router: Router,
    _event_task: tokio::task::JoinHandle<()>,
}

impl TestApp {
    /// Construct a new test application with fresh database state.
    pub async fn new() -> Self {
        let mut cfg = AppConfig::new("sqlite::memory:", "127.0.0.1", 18_080, "test");
        // A single pooled connection keeps every query on the same
        // in-memory database.
        cfg.db_max_connections = 1;
        cfg.db_min_connections = 1;

        let pool = db::establish_connection_from_app_config(&cfg)
            .await
            .expect("failed to create test database");
        db::run_migrations(&pool)
            .await
            .expect("failed to run migrations in tests");

        let db = Arc::new(pool);
        let (event_tx, event_rx) = mpsc::channel(256);
        let event_sender = EventSender::new(event_tx);
        let event_task = tokio::spawn(events::process_events(event_rx));

        let services = AppServices::new(
            db.clone(),
            Arc::new(event_sender.clone()),
            Arc::new(cfg.clone()),
        );

        let state = Arc::new(AppState {
            db,
            config: cfg,
            event_sender,
            services,
        });

        // Same request-id layering as the production binary, so envelope
        // metadata is present in tests.
        let router = marketplace_api::api_routes()
            .layer(axum::middleware::from_fn(
                marketplace_api::tracing::request_id_middleware,
            ))
            .with_state(state.clone());

        Self {
            state,
            router,
            _event_task: event_task,
        }
    }

    /// Registers a seller profile for the given user.
    pub async fn seed_seller(&self, user_id: Uuid) -> SellerModel {
        self.state
            .services
            .sellers
            .register(
                user_id,
                RegisterSellerInput {
                    business_name: "Test Outfitters".to_string(),
                    business_address: "1 Warehouse Way".to_string(),
                    phone_number: "+15550100".to_string(),
                },
            )
            .await
            .expect("failed to seed seller")
    }

    /// Creates a product without variants.
    pub async fn seed_product(
        &self,
        seller_id: Uuid,
        name: &str,
        base_price: Decimal,
        stock: i32,
    ) -> ProductModel {
        self.seed_product_with_variants(seller_id, name, base_price, stock, Vec::new())
            .await
    }

    pub async fn seed_product_with_variants(
        &self,
        seller_id: Uuid,
        name: &str,
        base_price: Decimal,
        stock: i32,
        variants: Vec<VariantInput>,
    ) -> ProductModel {
        self.state
            .services
            .catalog
            .create_product(
                seller_id,
                CreateProductInput {
                    name: name.to_string(),
                    description: format!("{} description", name),
                    base_price,
                    discount_price: None,
                    stock,
                    category_id: None,
                    variants,
                },
            )
            .await
            .expect("failed to seed product")
    }

    /// Creates a shipping address for the user.
    pub async fn seed_address(&self, user_id: Uuid) -> AddressModel {
        self.state
            .services
            .addresses
            .create(
                user_id,
                AddressInput {
                    address_type: None,
                    street_address: "42 Elm Street".to_string(),
                    apartment: None,
                    city: "Springfield".to_string(),
                    state: "IL".to_string(),
                    postal_code: "62704".to_string(),
                    is_default: None,
                },
            )
            .await
            .expect("failed to seed address")
    }

    /// Issues a request through the router as the given user and decodes
    /// the JSON body.
    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        user: Option<Uuid>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(user) = user {
            builder = builder.header(USER_ID_HEADER, user.to_string());
        }

        let request = match body {
            Some(json) => builder
                .header("content-type", "application/json")
                .body(Body::from(json.to_string()))
                .expect("request builds"),
            None => builder.body(Body::empty()).expect("request builds"),
        };

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("router handles request");

        let status = response.status();
        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("body collects")
            .to_bytes();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).expect("body is JSON")
        };

        (status, value)
    }
}
