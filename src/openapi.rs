use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// OpenAPI document for the marketplace API. Schemas only; the route
/// surface is small enough that the swagger explorer plus the schema
/// catalog covers documentation needs.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Marketplace API",
        version = "0.1.0",
        description = "Multi-seller e-commerce backend: carts, checkout, order fulfillment, returns and seller payouts.",
        license(name = "MIT")
    ),
    components(
        schemas(
            crate::ApiResponse<serde_json::Value>,
            crate::errors::ErrorResponse,
            crate::services::orders::OrderView,
            crate::services::orders::OrderItemView,
            crate::services::orders::OrderItemDetail,
            crate::services::orders::ProductSummary,
            crate::services::orders::VariantView,
            crate::services::orders::StatusView,
            crate::services::orders::ReturnRequestView,
            crate::services::orders::ReturnStatusView,
            crate::services::payouts::PayoutStats,
            crate::services::sellers::SellerStatus,
            crate::services::sellers::DashboardStats,
            crate::services::sellers::StatsPeriod,
        )
    ),
    tags(
        (name = "cart", description = "Cart mutation and inspection"),
        (name = "checkout", description = "Checkout and payment capture"),
        (name = "orders", description = "Buyer order history"),
        (name = "seller", description = "Seller fulfillment, returns and payouts")
    )
)]
pub struct ApiDoc;

pub fn swagger_ui() -> SwaggerUi {
    SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn openapi_document_generates() {
        let doc = ApiDoc::openapi();
        let json = doc.to_json().expect("document serializes");
        assert!(json.contains("Marketplace API"));
        assert!(json.contains("ErrorResponse"));
    }
}
