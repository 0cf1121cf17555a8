use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    entity::orders::PaymentMethod,
    models::{ContactDetails, Order, OrderItem, ShippingAddress},
};

/// Uploaded screenshot of a GCash transfer.
#[derive(Debug, Clone)]
pub struct ProofUpload {
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

/// Everything `order_service::create_order` needs, however it arrived.
#[derive(Debug, Clone)]
pub struct CreateOrderInput {
    pub contact_details: ContactDetails,
    pub shipping_address: ShippingAddress,
    pub payment_method: PaymentMethod,
    pub payment_proof: Option<ProofUpload>,
    pub shipping_cost: Option<f64>,
}

/// Multipart body of `POST /orders/gcash`, described for the OpenAPI document.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GcashCheckoutForm {
    /// JSON-encoded `ShippingAddress`.
    pub shipping_address: String,
    /// JSON-encoded `ContactDetails`.
    pub contact_details: String,
    #[schema(value_type = String, format = Binary)]
    pub payment_proof: Vec<u8>,
    pub shipping_cost: Option<f64>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CodCheckoutRequest {
    #[serde(alias = "contactDetails")]
    pub contact_details: ContactDetails,
    #[serde(default, alias = "shippingAddress")]
    pub shipping_address: ShippingAddress,
    #[serde(default, alias = "shippingCost")]
    pub shipping_cost: Option<f64>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateOrderStatusRequest {
    pub status: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderWithItems {
    pub order: Order,
    pub items: Vec<OrderItem>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderList {
    pub items: Vec<OrderWithItems>,
}
