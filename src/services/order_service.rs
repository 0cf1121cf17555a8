use std::collections::HashMap;

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use uuid::Uuid;

use crate::{
    audit,
    dto::orders::{CreateOrderInput, OrderList, OrderWithItems, ProofUpload},
    entity::{
        cart_items::{Column as CartCol, Entity as CartItems},
        order_items::{ActiveModel as OrderItemActive, Column as OrderItemCol, Entity as OrderItems},
        orders::{
            ActiveModel as OrderActive, Column as OrderCol, Entity as Orders, Model as OrderModel,
            OrderStatus, PaymentMethod,
        },
        products::{Column as ProdCol, Entity as Products},
    },
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::{ContactDetails, Order, OrderItem},
    notify::messages,
    pricing::{self, PricedLine},
    response::{ApiResponse, Meta},
    routes::params::{OrderListQuery, SortOrder},
    services::{cart_service, catalog_service},
    state::AppState,
};

/// One cart line joined with the product as it is priced right now.
#[derive(Debug, Clone)]
struct CartLine {
    product_id: Uuid,
    name: String,
    image: Option<String>,
    unit_price: i64,
    quantity: i32,
}

fn blank(value: &str) -> bool {
    value.trim().is_empty()
}

fn validate_contact(contact: &ContactDetails) -> AppResult<()> {
    if blank(&contact.full_name) || blank(&contact.phone) || blank(&contact.email) {
        return Err(AppError::Validation(
            "Contact details (full name, phone and email) are required".into(),
        ));
    }
    Ok(())
}

fn validate_proof(method: PaymentMethod, proof: Option<&ProofUpload>) -> AppResult<()> {
    if method != PaymentMethod::Gcash {
        return Ok(());
    }
    let proof = match proof {
        Some(p) if !p.bytes.is_empty() => p,
        _ => {
            return Err(AppError::Validation(
                "Payment proof is required for GCash orders".into(),
            ));
        }
    };
    let is_image = proof
        .content_type
        .as_deref()
        .is_some_and(|content_type| content_type.starts_with("image/"));
    if !is_image {
        return Err(AppError::Validation(
            "Payment proof must be an image".into(),
        ));
    }
    Ok(())
}

/// Reads the user's cart with current prices. Fails when there is nothing to buy.
async fn snapshot_cart<C: ConnectionTrait>(conn: &C, user_id: Uuid) -> AppResult<Vec<CartLine>> {
    let rows = CartItems::find()
        .filter(CartCol::UserId.eq(user_id))
        .order_by_asc(CartCol::CreatedAt)
        .all(conn)
        .await?;

    if rows.is_empty() {
        return Err(AppError::Validation("Cart is empty".into()));
    }

    let ids: Vec<Uuid> = rows.iter().map(|row| row.product_id).collect();
    let products: HashMap<Uuid, _> = Products::find()
        .filter(ProdCol::Id.is_in(ids))
        .all(conn)
        .await?
        .into_iter()
        .map(|p| (p.id, p))
        .collect();

    let mut lines = Vec::with_capacity(rows.len());
    for row in rows {
        if row.quantity <= 0 {
            return Err(AppError::Validation("Cart has invalid quantity".into()));
        }
        let product = products.get(&row.product_id).ok_or_else(|| {
            AppError::Validation("A product in your cart is no longer available".into())
        })?;
        if product.stock < row.quantity {
            return Err(AppError::Validation(format!(
                "Insufficient stock for {}",
                product.name
            )));
        }
        lines.push(CartLine {
            product_id: product.id,
            name: product.name.clone(),
            image: product.image.clone(),
            unit_price: product.price,
            quantity: row.quantity,
        });
    }
    Ok(lines)
}

/// Order row, item rows, stock decrements and cart clearing commit together or not at all.
async fn persist_order(
    state: &AppState,
    user_id: Uuid,
    input: &CreateOrderInput,
    proof_url: Option<String>,
) -> AppResult<(OrderModel, Vec<OrderItem>)> {
    let txn = state.orm.begin().await?;
    let lines = snapshot_cart(&txn, user_id).await?;

    let priced: Vec<PricedLine> = lines
        .iter()
        .map(|line| PricedLine {
            unit_price: line.unit_price,
            quantity: line.quantity,
        })
        .collect();
    let totals = pricing::compute_totals(
        &priced,
        input.shipping_cost,
        state.config.checkout.flat_shipping_rate,
    )
    .ok_or_else(|| AppError::Validation("Order total is out of range".into()))?;

    let now = Utc::now();
    let contact = &input.contact_details;
    let address = &input.shipping_address;
    let trimmed = |value: &Option<String>| {
        value
            .as_deref()
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string)
    };

    let order = OrderActive {
        id: Set(Uuid::new_v4()),
        user_id: Set(user_id),
        contact_full_name: Set(contact.full_name.trim().to_string()),
        contact_phone: Set(contact.phone.trim().to_string()),
        contact_email: Set(contact.email.trim().to_string()),
        ship_street: Set(trimmed(&address.street)),
        ship_barangay: Set(trimmed(&address.barangay)),
        ship_city: Set(trimmed(&address.city)),
        ship_landmark: Set(trimmed(&address.landmark)),
        ship_zip_code: Set(trimmed(&address.zip_code)),
        payment_method: Set(input.payment_method),
        payment_proof_url: Set(proof_url),
        payment_result_id: Set(None),
        payment_result_status: Set(None),
        payment_result_email: Set(None),
        subtotal: Set(totals.subtotal),
        shipping_cost: Set(totals.shipping_cost),
        tax: Set(totals.tax),
        total: Set(totals.total),
        status: Set(OrderStatus::initial_for(input.payment_method)),
        delivered_at: Set(None),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    }
    .insert(&txn)
    .await?;

    let mut items = Vec::with_capacity(lines.len());
    for (position, line) in lines.iter().enumerate() {
        let item = OrderItemActive {
            id: Set(Uuid::new_v4()),
            order_id: Set(order.id),
            position: Set(position as i32),
            product_id: Set(line.product_id),
            name: Set(line.name.clone()),
            image: Set(line.image.clone()),
            quantity: Set(line.quantity),
            unit_price: Set(line.unit_price),
            created_at: Set(now.into()),
        }
        .insert(&txn)
        .await?;
        items.push(OrderItem::from(item));

        catalog_service::adjust_stock(&txn, line.product_id, -line.quantity).await?;
    }

    cart_service::clear_in(&txn, user_id).await?;

    txn.commit().await?;
    Ok((order, items))
}

/// Checkout: turns the user's cart into an order. Works for both payment methods; a proof is
/// required (and stored) only for GCash.
pub async fn create_order(
    state: &AppState,
    user: &AuthUser,
    input: CreateOrderInput,
) -> AppResult<ApiResponse<OrderWithItems>> {
    validate_contact(&input.contact_details)?;
    validate_proof(input.payment_method, input.payment_proof.as_ref())?;

    // Written before the transaction opens; removed again if the order does not commit.
    let proof_url = match (input.payment_method, input.payment_proof.as_ref()) {
        (PaymentMethod::Gcash, Some(upload)) => Some(state.proofs.store(upload).await?),
        _ => None,
    };

    let (order, items) = match persist_order(state, user.user_id, &input, proof_url.clone()).await
    {
        Ok(saved) => saved,
        Err(err) => {
            if let Some(uri) = proof_url.as_deref() {
                if let Err(cleanup) = state.proofs.discard(uri).await {
                    tracing::warn!(error = %cleanup, uri, "orphaned payment proof");
                }
            }
            return Err(err);
        }
    };
    let order = Order::from(order);

    tracing::info!(
        order_id = %order.id,
        user_id = %user.user_id,
        total = order.total,
        payment_method = %order.payment_method,
        "order created"
    );

    audit::record(
        &state.orm,
        user.user_id,
        "checkout",
        "orders",
        serde_json::json!({ "order_id": order.id, "total": order.total }),
    )
    .await;

    let store = &state.config.notify.store_name;
    state
        .notifier
        .email_in_background(messages::order_confirmation_email(store, &order, &items));
    state
        .notifier
        .chat_in_background(messages::new_order_chat(&order, &items));

    Ok(ApiResponse::success(
        "Order created",
        OrderWithItems { order, items },
        Some(Meta::empty()),
    ))
}

pub async fn list_my_orders(
    state: &AppState,
    user: &AuthUser,
    query: OrderListQuery,
) -> AppResult<ApiResponse<OrderList>> {
    let condition = Condition::all().add(OrderCol::UserId.eq(user.user_id));
    let (items, meta) = list_orders_where(state, condition, query).await?;
    Ok(ApiResponse::success("Ok", OrderList { items }, Some(meta)))
}

pub async fn get_order(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<OrderWithItems>> {
    let order = find_order(&state.orm, id).await?;
    // Someone else's order is indistinguishable from a missing one.
    if order.user_id != user.user_id && !user.is_admin() {
        return Err(AppError::not_found("Order"));
    }

    let items = load_items(&state.orm, order.id).await?;
    Ok(ApiResponse::success(
        "OK",
        OrderWithItems {
            order: Order::from(order),
            items,
        },
        Some(Meta::empty()),
    ))
}

pub(crate) async fn find_order<C: ConnectionTrait>(conn: &C, id: Uuid) -> AppResult<OrderModel> {
    Orders::find_by_id(id)
        .one(conn)
        .await?
        .ok_or_else(|| AppError::not_found("Order"))
}

pub(crate) async fn load_items<C: ConnectionTrait>(
    conn: &C,
    order_id: Uuid,
) -> AppResult<Vec<OrderItem>> {
    let items = OrderItems::find()
        .filter(OrderItemCol::OrderId.eq(order_id))
        .order_by_asc(OrderItemCol::Position)
        .all(conn)
        .await?
        .into_iter()
        .map(OrderItem::from)
        .collect();
    Ok(items)
}

/// Paged, newest-first listing shared by the customer and admin views.
pub(crate) async fn list_orders_where(
    state: &AppState,
    mut condition: Condition,
    query: OrderListQuery,
) -> AppResult<(Vec<OrderWithItems>, Meta)> {
    let (page, limit, offset) = query.pagination.normalize();

    if let Some(status) = query.status.as_deref().filter(|s| !s.trim().is_empty()) {
        let status: OrderStatus = status.parse().map_err(AppError::Validation)?;
        condition = condition.add(OrderCol::Status.eq(status));
    }

    let mut finder = Orders::find().filter(condition);
    finder = match query.sort_order.unwrap_or(SortOrder::Desc) {
        SortOrder::Asc => finder.order_by_asc(OrderCol::CreatedAt),
        SortOrder::Desc => finder.order_by_desc(OrderCol::CreatedAt),
    };

    let total = finder.clone().count(&state.orm).await? as i64;
    let orders = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?;

    let ids: Vec<Uuid> = orders.iter().map(|o| o.id).collect();
    let mut grouped: HashMap<Uuid, Vec<OrderItem>> = HashMap::new();
    if !ids.is_empty() {
        let items = OrderItems::find()
            .filter(OrderItemCol::OrderId.is_in(ids))
            .order_by_asc(OrderItemCol::Position)
            .all(&state.orm)
            .await?;
        for item in items {
            grouped
                .entry(item.order_id)
                .or_default()
                .push(OrderItem::from(item));
        }
    }

    let list = orders
        .into_iter()
        .map(|order| OrderWithItems {
            items: grouped.remove(&order.id).unwrap_or_default(),
            order: Order::from(order),
        })
        .collect();

    Ok((list, Meta::new(page, limit, total)))
}
