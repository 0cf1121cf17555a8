use axum::{
    Json, Router,
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    routing::{get, post, put},
};
use serde::de::DeserializeOwned;
use uuid::Uuid;

use crate::{
    dto::orders::{
        CodCheckoutRequest, CreateOrderInput, GcashCheckoutForm, OrderList, OrderWithItems,
        ProofUpload, UpdateOrderStatusRequest,
    },
    entity::orders::PaymentMethod,
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::{ContactDetails, Order, ShippingAddress},
    response::ApiResponse,
    routes::params::OrderListQuery,
    services::{admin_service, order_service},
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_all_orders))
        .route("/gcash", post(create_gcash_order))
        .route("/cod", post(create_cod_order))
        .route("/my-orders", get(list_my_orders))
        .route("/{id}", get(get_order).delete(delete_order))
        .route("/{id}/status", put(update_order_status))
        .route("/{id}/verify-payment", put(verify_payment))
}

fn parse_json_field<T: DeserializeOwned>(field: &str, raw: &str) -> AppResult<T> {
    serde_json::from_str(raw)
        .map_err(|err| AppError::Validation(format!("Invalid JSON in {field}: {err}")))
}

/// Collects the multipart checkout fields. `shippingAddress` and `contactDetails` arrive as JSON
/// strings; an unparsable `shippingCost` counts as absent.
async fn read_gcash_form(mut multipart: Multipart) -> AppResult<CreateOrderInput> {
    let mut contact_details = ContactDetails::default();
    let mut shipping_address = ShippingAddress::default();
    let mut payment_proof = None;
    let mut shipping_cost = None;

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "contactDetails" => {
                let raw = field.text().await?;
                contact_details = parse_json_field("contactDetails", &raw)?;
            }
            "shippingAddress" => {
                let raw = field.text().await?;
                shipping_address = parse_json_field("shippingAddress", &raw)?;
            }
            "paymentProof" => {
                let file_name = field.file_name().map(str::to_string);
                let content_type = field.content_type().map(str::to_string);
                let bytes = field.bytes().await?;
                payment_proof = Some(ProofUpload {
                    file_name,
                    content_type,
                    bytes: bytes.to_vec(),
                });
            }
            "shippingCost" => {
                let raw = field.text().await?;
                shipping_cost = raw.trim().parse::<f64>().ok();
            }
            other => tracing::debug!(field = other, "ignoring multipart field"),
        }
    }

    Ok(CreateOrderInput {
        contact_details,
        shipping_address,
        payment_method: PaymentMethod::Gcash,
        payment_proof,
        shipping_cost,
    })
}

#[utoipa::path(
    post,
    path = "/api/orders/gcash",
    request_body(content = GcashCheckoutForm, content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Order placed, awaiting payment verification", body = ApiResponse<OrderWithItems>),
        (status = 400, description = "Empty cart, missing proof or insufficient stock"),
        (status = 401, description = "Unauthorized"),
    ),
    security(("bearer_auth" = [])),
    tag = "Orders"
)]
pub async fn create_gcash_order(
    State(state): State<AppState>,
    user: AuthUser,
    multipart: Multipart,
) -> AppResult<(StatusCode, Json<ApiResponse<OrderWithItems>>)> {
    let input = read_gcash_form(multipart).await?;
    let resp = order_service::create_order(&state, &user, input).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

#[utoipa::path(
    post,
    path = "/api/orders/cod",
    request_body = CodCheckoutRequest,
    responses(
        (status = 201, description = "Cash-on-delivery order placed", body = ApiResponse<OrderWithItems>),
        (status = 400, description = "Empty cart or insufficient stock"),
        (status = 401, description = "Unauthorized"),
    ),
    security(("bearer_auth" = [])),
    tag = "Orders"
)]
pub async fn create_cod_order(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CodCheckoutRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<OrderWithItems>>)> {
    let input = CreateOrderInput {
        contact_details: payload.contact_details,
        shipping_address: payload.shipping_address,
        payment_method: PaymentMethod::Cod,
        payment_proof: None,
        shipping_cost: payload.shipping_cost,
    };
    let resp = order_service::create_order(&state, &user, input).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

#[utoipa::path(
    get,
    path = "/api/orders/my-orders",
    params(
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, default 20"),
        ("status" = Option<String>, Query, description = "Filter by status"),
        ("sort_order" = Option<String>, Query, description = "asc or desc, default desc")
    ),
    responses(
        (status = 200, description = "Orders of the current user, newest first", body = ApiResponse<OrderList>),
    ),
    security(("bearer_auth" = [])),
    tag = "Orders"
)]
pub async fn list_my_orders(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<OrderListQuery>,
) -> AppResult<Json<ApiResponse<OrderList>>> {
    let resp = order_service::list_my_orders(&state, &user, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/orders/{id}",
    params(
        ("id" = Uuid, Path, description = "Order ID")
    ),
    responses(
        (status = 200, description = "Order with its items", body = ApiResponse<OrderWithItems>),
        (status = 404, description = "Order not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Orders"
)]
pub async fn get_order(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<OrderWithItems>>> {
    let resp = order_service::get_order(&state, &user, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/orders",
    params(
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, default 20"),
        ("status" = Option<String>, Query, description = "Filter by status"),
        ("sort_order" = Option<String>, Query, description = "asc or desc, default desc")
    ),
    responses(
        (status = 200, description = "All orders (admin only)", body = ApiResponse<OrderList>),
        (status = 403, description = "Forbidden"),
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn list_all_orders(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<OrderListQuery>,
) -> AppResult<Json<ApiResponse<OrderList>>> {
    let resp = admin_service::list_all_orders(&state, &user, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/orders/{id}",
    params(
        ("id" = Uuid, Path, description = "Order ID")
    ),
    responses(
        (status = 200, description = "Order removed (admin only)", body = ApiResponse<serde_json::Value>),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Order not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn delete_order(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = admin_service::delete_order(&state, &user, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    put,
    path = "/api/orders/{id}/status",
    params(
        ("id" = Uuid, Path, description = "Order ID")
    ),
    request_body = UpdateOrderStatusRequest,
    responses(
        (status = 200, description = "Status changed (admin only)", body = ApiResponse<Order>),
        (status = 400, description = "Unknown status"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Order not found or transition not allowed"),
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn update_order_status(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateOrderStatusRequest>,
) -> AppResult<Json<ApiResponse<Order>>> {
    let resp = admin_service::update_order_status(&state, &user, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    put,
    path = "/api/orders/{id}/verify-payment",
    params(
        ("id" = Uuid, Path, description = "Order ID")
    ),
    responses(
        (status = 200, description = "GCash payment verified (admin only)", body = ApiResponse<Order>),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Order not found or not a GCash order"),
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn verify_payment(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<Order>>> {
    let resp = admin_service::verify_gcash_payment(&state, &user, id).await?;
    Ok(Json(resp))
}
