use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    entity::{
        order_items::Model as OrderItemModel,
        orders::{Model as OrderModel, OrderStatus, PaymentMethod},
        products::Model as ProductModel,
    },
    lifecycle::order_number,
};

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub image: Option<String>,
    pub price: i64,
    pub stock: i32,
    pub rating: f64,
    pub num_reviews: i32,
    pub created_at: DateTime<Utc>,
}

impl From<ProductModel> for Product {
    fn from(model: ProductModel) -> Self {
        Self {
            id: model.id,
            name: model.name,
            description: model.description,
            image: model.image,
            price: model.price,
            stock: model.stock,
            rating: model.rating,
            num_reviews: model.num_reviews,
            created_at: model.created_at.with_timezone(&Utc),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ContactDetails {
    #[serde(default, alias = "fullName")]
    pub full_name: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub email: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ShippingAddress {
    pub street: Option<String>,
    pub barangay: Option<String>,
    pub city: Option<String>,
    pub landmark: Option<String>,
    #[serde(alias = "zipCode")]
    pub zip_code: Option<String>,
}

impl ShippingAddress {
    pub fn one_line(&self) -> String {
        [
            &self.street,
            &self.barangay,
            &self.city,
            &self.zip_code,
        ]
        .into_iter()
        .filter_map(|part| part.as_deref().map(str::trim).filter(|p| !p.is_empty()))
        .collect::<Vec<_>>()
        .join(", ")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PaymentResult {
    pub external_id: String,
    pub status: String,
    pub email: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Order {
    pub id: Uuid,
    pub order_number: String,
    pub user_id: Uuid,
    pub contact_details: ContactDetails,
    pub shipping_address: ShippingAddress,
    pub payment_method: PaymentMethod,
    pub payment_proof_url: Option<String>,
    pub payment_result: Option<PaymentResult>,
    pub subtotal: i64,
    pub shipping_cost: i64,
    pub tax: i64,
    pub total: i64,
    pub status: OrderStatus,
    pub delivered_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<OrderModel> for Order {
    fn from(model: OrderModel) -> Self {
        let payment_result = match (
            model.payment_result_id,
            model.payment_result_status,
            model.payment_result_email,
        ) {
            (Some(external_id), Some(status), email) => Some(PaymentResult {
                external_id,
                status,
                email: email.unwrap_or_default(),
            }),
            _ => None,
        };

        Self {
            id: model.id,
            order_number: order_number(&model.created_at),
            user_id: model.user_id,
            contact_details: ContactDetails {
                full_name: model.contact_full_name,
                phone: model.contact_phone,
                email: model.contact_email,
            },
            shipping_address: ShippingAddress {
                street: model.ship_street,
                barangay: model.ship_barangay,
                city: model.ship_city,
                landmark: model.ship_landmark,
                zip_code: model.ship_zip_code,
            },
            payment_method: model.payment_method,
            payment_proof_url: model.payment_proof_url,
            payment_result,
            subtotal: model.subtotal,
            shipping_cost: model.shipping_cost,
            tax: model.tax,
            total: model.total,
            status: model.status,
            delivered_at: model.delivered_at.map(|dt| dt.with_timezone(&Utc)),
            created_at: model.created_at.with_timezone(&Utc),
            updated_at: model.updated_at.with_timezone(&Utc),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct OrderItem {
    pub id: Uuid,
    pub order_id: Uuid,
    pub product_id: Uuid,
    pub name: String,
    pub image: Option<String>,
    pub quantity: i32,
    pub unit_price: i64,
    pub line_total: i64,
}

impl From<OrderItemModel> for OrderItem {
    fn from(model: OrderItemModel) -> Self {
        Self {
            id: model.id,
            order_id: model.order_id,
            product_id: model.product_id,
            line_total: model.unit_price * i64::from(model.quantity),
            name: model.name,
            image: model.image,
            quantity: model.quantity,
            unit_price: model.unit_price,
        }
    }
}
