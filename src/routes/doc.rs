use utoipa::{
    Modify, OpenApi,
    openapi::{
        self,
        OpenApi as OpenApiSpec,
        security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    },
};
use utoipa_scalar::{Scalar, Servable};

use crate::{
    dto::{
        cart::{AddToCartRequest, Cart, CartItemDto, SetCartQuantityRequest},
        orders::{
            CodCheckoutRequest, GcashCheckoutForm, OrderList, OrderWithItems,
            UpdateOrderStatusRequest,
        },
        products::{InventoryAdjustRequest, ProductList},
    },
    entity::orders::{OrderStatus, PaymentMethod},
    error::ErrorData,
    models::{ContactDetails, Order, OrderItem, PaymentResult, Product, ShippingAddress},
    response::{ApiResponse, Meta},
    routes::{admin, cart, health, orders, params, products},
};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        products::list_products,
        products::get_product,
        cart::get_cart,
        cart::add_to_cart,
        cart::set_quantity,
        cart::remove_from_cart,
        cart::clear_cart,
        orders::create_gcash_order,
        orders::create_cod_order,
        orders::list_my_orders,
        orders::get_order,
        orders::list_all_orders,
        orders::delete_order,
        orders::update_order_status,
        orders::verify_payment,
        admin::list_low_stock,
        admin::adjust_inventory
    ),
    components(
        schemas(
            Product,
            Order,
            OrderItem,
            OrderStatus,
            PaymentMethod,
            ContactDetails,
            ShippingAddress,
            PaymentResult,
            Cart,
            CartItemDto,
            AddToCartRequest,
            SetCartQuantityRequest,
            GcashCheckoutForm,
            CodCheckoutRequest,
            UpdateOrderStatusRequest,
            InventoryAdjustRequest,
            OrderList,
            OrderWithItems,
            ProductList,
            ErrorData,
            params::Pagination,
            params::ProductQuery,
            params::OrderListQuery,
            params::LowStockQuery,
            Meta,
            ApiResponse<Product>,
            ApiResponse<ProductList>,
            ApiResponse<Cart>,
            ApiResponse<Order>,
            ApiResponse<OrderWithItems>,
            ApiResponse<OrderList>,
            ApiResponse<ErrorData>
        )
    ),
    security(
        ("bearer_auth" = [])
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "Products", description = "Catalog endpoints"),
        (name = "Cart", description = "Cart endpoints"),
        (name = "Orders", description = "Checkout and order history"),
        (name = "Admin", description = "Order management and inventory"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}
