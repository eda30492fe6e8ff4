pub mod addresses;
pub mod cart;
pub mod checkout;
pub mod common;
pub mod orders;
pub mod payments;
pub mod products;
pub mod returns;
pub mod sellers;

use crate::config::AppConfig;
use crate::db::DbPool;
use crate::events::EventSender;
use std::sync::Arc;

// Re-export AppState so handler modules can import it as crate::handlers::AppState
pub use crate::AppState;

/// Services layer that encapsulates business logic used by HTTP handlers
#[derive(Clone)]
pub struct AppServices {
    pub catalog: Arc<crate::services::ProductCatalogService>,
    pub cart: Arc<crate::services::CartService>,
    pub checkout: Arc<crate::services::CheckoutService>,
    pub payments: Arc<crate::services::PaymentService>,
    pub payouts: Arc<crate::services::PayoutService>,
    pub order_status: Arc<crate::services::OrderStatusService>,
    pub returns: Arc<crate::services::ReturnService>,
    pub orders: Arc<crate::services::OrderService>,
    pub addresses: Arc<crate::services::AddressService>,
    pub sellers: Arc<crate::services::SellerService>,
}

impl AppServices {
    /// Wires every service over the shared pool, event channel and config.
    pub fn new(
        db_pool: Arc<DbPool>,
        event_sender: Arc<EventSender>,
        config: Arc<AppConfig>,
    ) -> Self {
        let catalog = Arc::new(crate::services::ProductCatalogService::new(
            db_pool.clone(),
            event_sender.clone(),
        ));
        let cart = Arc::new(crate::services::CartService::new(
            db_pool.clone(),
            event_sender.clone(),
        ));
        let payouts = Arc::new(crate::services::PayoutService::new(
            db_pool.clone(),
            event_sender.clone(),
            config,
        ));
        let checkout = Arc::new(crate::services::CheckoutService::new(
            db_pool.clone(),
            event_sender.clone(),
            payouts.clone(),
        ));
        let payments = Arc::new(crate::services::PaymentService::new(
            db_pool.clone(),
            event_sender.clone(),
            payouts.clone(),
        ));
        let order_status = Arc::new(crate::services::OrderStatusService::new(
            db_pool.clone(),
            event_sender.clone(),
        ));
        let returns = Arc::new(crate::services::ReturnService::new(
            db_pool.clone(),
            event_sender.clone(),
        ));
        let orders = Arc::new(crate::services::OrderService::new(db_pool.clone()));
        let addresses = Arc::new(crate::services::AddressService::new(
            db_pool.clone(),
            event_sender.clone(),
        ));
        let sellers = Arc::new(crate::services::SellerService::new(db_pool, event_sender));

        Self {
            catalog,
            cart,
            checkout,
            payments,
            payouts,
            order_status,
            returns,
            orders,
            addresses,
            sellers,
        }
    }
}
