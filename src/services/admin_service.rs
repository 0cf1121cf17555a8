use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Set, TransactionTrait,
};
use uuid::Uuid;

use crate::{
    audit,
    dto::{
        orders::{OrderList, UpdateOrderStatusRequest},
        products::{InventoryAdjustRequest, ProductList},
    },
    entity::{
        order_items::{Column as OrderItemCol, Entity as OrderItems},
        orders::{ActiveModel as OrderActive, Entity as Orders, OrderStatus, PaymentMethod},
        products::{Column as ProdCol, Entity as Products},
    },
    error::{AppError, AppResult},
    lifecycle::check_transition,
    middleware::auth::{AuthUser, ensure_admin},
    models::{Order, Product},
    notify::messages,
    response::{ApiResponse, Meta},
    routes::params::{LowStockQuery, OrderListQuery},
    services::{catalog_service, order_service},
    state::AppState,
};

pub const GCASH_VERIFIED_ID: &str = "gcash_verified";
pub const PAYMENT_VERIFIED: &str = "verified";

pub async fn list_all_orders(
    state: &AppState,
    user: &AuthUser,
    query: OrderListQuery,
) -> AppResult<ApiResponse<OrderList>> {
    ensure_admin(user)?;
    let (items, meta) = order_service::list_orders_where(state, Condition::all(), query).await?;
    Ok(ApiResponse::success("Orders", OrderList { items }, Some(meta)))
}

pub async fn update_order_status(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateOrderStatusRequest,
) -> AppResult<ApiResponse<Order>> {
    ensure_admin(user)?;
    let next: OrderStatus = payload.status.parse().map_err(AppError::Validation)?;

    let existing = order_service::find_order(&state.orm, id).await?;
    let previous = existing.status;
    check_transition(previous, next, state.config.checkout.strict_status_transitions)
        .map_err(AppError::InvalidState)?;

    let now = Utc::now();
    let first_delivery = next == OrderStatus::Delivered && existing.delivered_at.is_none();

    let mut active: OrderActive = existing.into();
    active.status = Set(next);
    if first_delivery {
        active.delivered_at = Set(Some(now.into()));
    }
    active.updated_at = Set(now.into());
    let order = Order::from(active.update(&state.orm).await?);

    tracing::info!(
        order_id = %order.id,
        from = %previous,
        to = %next,
        "order status updated"
    );
    audit::record(
        &state.orm,
        user.user_id,
        "order_status_update",
        "orders",
        serde_json::json!({ "order_id": order.id, "from": previous, "to": next }),
    )
    .await;

    state
        .notifier
        .chat_in_background(messages::status_change_chat(&order, previous, next));

    Ok(ApiResponse::success("Order updated", order, Some(Meta::empty())))
}

/// Manual approval of an uploaded GCash proof.
pub async fn verify_gcash_payment(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<Order>> {
    ensure_admin(user)?;

    let existing = order_service::find_order(&state.orm, id).await?;
    if existing.payment_method != PaymentMethod::Gcash {
        return Err(AppError::InvalidState(
            "Order not found or not a GCash order".into(),
        ));
    }

    let already_verified = existing.status == OrderStatus::Processing
        && existing.payment_result_status.as_deref() == Some(PAYMENT_VERIFIED);
    if already_verified {
        return Ok(ApiResponse::success(
            "Payment already verified",
            Order::from(existing),
            Some(Meta::empty()),
        ));
    }

    let previous = existing.status;
    check_transition(
        previous,
        OrderStatus::Processing,
        state.config.checkout.strict_status_transitions,
    )
    .map_err(AppError::InvalidState)?;

    let email = existing.contact_email.clone();
    let mut active: OrderActive = existing.into();
    active.status = Set(OrderStatus::Processing);
    active.payment_result_id = Set(Some(GCASH_VERIFIED_ID.to_string()));
    active.payment_result_status = Set(Some(PAYMENT_VERIFIED.to_string()));
    active.payment_result_email = Set(Some(email));
    active.updated_at = Set(Utc::now().into());
    let order = Order::from(active.update(&state.orm).await?);

    tracing::info!(order_id = %order.id, from = %previous, "gcash payment verified");
    audit::record(
        &state.orm,
        user.user_id,
        "order_payment_verified",
        "orders",
        serde_json::json!({ "order_id": order.id }),
    )
    .await;

    // The customer email is awaited here, unlike every other notification; the outcome is
    // still only logged.
    let store = &state.config.notify.store_name;
    state
        .notifier
        .send_email(messages::payment_verified_email(store, &order))
        .await;
    state
        .notifier
        .chat_in_background(messages::payment_verified_chat(&order));

    Ok(ApiResponse::success("Payment verified", order, Some(Meta::empty())))
}

/// Hard delete. Stock taken by the order is not given back.
pub async fn delete_order(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    ensure_admin(user)?;

    let txn = state.orm.begin().await?;
    OrderItems::delete_many()
        .filter(OrderItemCol::OrderId.eq(id))
        .exec(&txn)
        .await?;
    let result = Orders::delete_by_id(id).exec(&txn).await?;
    if result.rows_affected == 0 {
        return Err(AppError::not_found("Order"));
    }
    txn.commit().await?;

    tracing::info!(order_id = %id, "order deleted");
    audit::record(
        &state.orm,
        user.user_id,
        "order_delete",
        "orders",
        serde_json::json!({ "order_id": id }),
    )
    .await;

    Ok(ApiResponse::message_only("Order removed"))
}

pub async fn list_low_stock(
    state: &AppState,
    user: &AuthUser,
    query: LowStockQuery,
) -> AppResult<ApiResponse<ProductList>> {
    ensure_admin(user)?;
    let threshold = query.threshold.unwrap_or(5);
    let (page, limit, offset) = query.pagination.normalize();

    let finder = Products::find()
        .filter(ProdCol::Stock.lte(threshold))
        .order_by_asc(ProdCol::Stock)
        .order_by_desc(ProdCol::CreatedAt);

    let total = finder.clone().count(&state.orm).await? as i64;

    let items = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(Product::from)
        .collect();

    let meta = Meta::new(page, limit, total);
    Ok(ApiResponse::success("Low stock", ProductList { items }, Some(meta)))
}

pub async fn adjust_inventory(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: InventoryAdjustRequest,
) -> AppResult<ApiResponse<Product>> {
    ensure_admin(user)?;
    if payload.delta == 0 {
        return Err(AppError::Validation("delta must not be 0".into()));
    }

    catalog_service::adjust_stock(&state.orm, id, payload.delta).await?;
    let updated = catalog_service::get_by_id(&state.orm, id).await?;

    audit::record(
        &state.orm,
        user.user_id,
        "inventory_adjust",
        "products",
        serde_json::json!({ "product_id": id, "delta": payload.delta }),
    )
    .await;

    Ok(ApiResponse::success(
        "Inventory updated",
        Product::from(updated),
        Some(Meta::empty()),
    ))
}
