pub mod address;
pub mod category;
pub mod order;
pub mod order_item;
pub mod order_item_status;
pub mod order_item_variant;
pub mod payment;
pub mod payout;
pub mod product;
pub mod product_variant;
pub mod refund;
pub mod return_request;
pub mod return_request_status;
pub mod seller;

// Re-export entities
pub use address::{AddressType, Entity as Address, Model as AddressModel};
pub use category::{Entity as Category, Model as CategoryModel};
pub use order::{Entity as Order, Model as OrderModel};
pub use order_item::{Entity as OrderItem, Model as OrderItemModel};
pub use order_item_status::{Entity as OrderItemStatus, ItemStatus, Model as OrderItemStatusModel};
pub use order_item_variant::{Entity as OrderItemVariant, Model as OrderItemVariantModel};
pub use payment::{Entity as Payment, Model as PaymentModel, PaymentMethod};
pub use payout::{Entity as Payout, Model as PayoutModel, PayoutParty};
pub use product::{Entity as Product, Model as ProductModel};
pub use product_variant::{Entity as ProductVariant, Model as ProductVariantModel};
pub use refund::{Entity as Refund, Model as RefundModel};
pub use return_request::{Entity as ReturnRequest, Model as ReturnRequestModel};
pub use return_request_status::{
    Entity as ReturnRequestStatus, Model as ReturnRequestStatusModel, ReturnStatus,
};
pub use seller::{Entity as Seller, Model as SellerModel};
