use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder,
    Set,
};
use uuid::Uuid;

use crate::{
    audit,
    dto::cart::{AddToCartRequest, Cart, CartItemDto},
    entity::{
        cart_items::{ActiveModel as CartActive, Column as CartCol, Entity as CartItems, Model as CartItemModel},
        products::Entity as Products,
    },
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::Product,
    response::{ApiResponse, Meta},
    services::catalog_service,
    state::AppState,
};

/// A cart is just the user's rows; an absent cart is an empty one.
pub async fn load_cart<C: ConnectionTrait>(conn: &C, user_id: Uuid) -> AppResult<Cart> {
    let rows = CartItems::find()
        .filter(CartCol::UserId.eq(user_id))
        .order_by_asc(CartCol::CreatedAt)
        .find_also_related(Products)
        .all(conn)
        .await?;

    let items: Vec<CartItemDto> = rows
        .into_iter()
        .filter_map(|(line, product)| {
            let product = Product::from(product?);
            Some(CartItemDto {
                id: line.id,
                line_total: product.price * i64::from(line.quantity),
                product,
                quantity: line.quantity,
            })
        })
        .collect();
    let subtotal = items.iter().map(|item| item.line_total).sum();

    Ok(Cart {
        user_id,
        items,
        subtotal,
    })
}

pub async fn get_or_create(state: &AppState, user: &AuthUser) -> AppResult<ApiResponse<Cart>> {
    let cart = load_cart(&state.orm, user.user_id).await?;
    Ok(ApiResponse::success("OK", cart, Some(Meta::empty())))
}

async fn find_line<C: ConnectionTrait>(
    conn: &C,
    user_id: Uuid,
    product_id: Uuid,
) -> AppResult<Option<CartItemModel>> {
    let line = CartItems::find()
        .filter(
            Condition::all()
                .add(CartCol::UserId.eq(user_id))
                .add(CartCol::ProductId.eq(product_id)),
        )
        .one(conn)
        .await?;
    Ok(line)
}

/// Writes `quantity` for the line, inserting or deleting as needed.
async fn write_line<C: ConnectionTrait>(
    conn: &C,
    user_id: Uuid,
    product_id: Uuid,
    existing: Option<CartItemModel>,
    quantity: i32,
) -> AppResult<()> {
    match existing {
        Some(line) if quantity <= 0 => {
            CartItems::delete_by_id(line.id).exec(conn).await?;
        }
        Some(line) => {
            let mut active: CartActive = line.into();
            active.quantity = Set(quantity);
            active.updated_at = Set(Utc::now().into());
            active.update(conn).await?;
        }
        None if quantity <= 0 => {}
        None => {
            let now = Utc::now();
            CartActive {
                id: Set(Uuid::new_v4()),
                user_id: Set(user_id),
                product_id: Set(product_id),
                quantity: Set(quantity),
                created_at: Set(now.into()),
                updated_at: Set(now.into()),
            }
            .insert(conn)
            .await?;
        }
    }
    Ok(())
}

pub async fn upsert_item(
    state: &AppState,
    user: &AuthUser,
    payload: AddToCartRequest,
) -> AppResult<ApiResponse<Cart>> {
    catalog_service::get_by_id(&state.orm, payload.product_id).await?;

    let existing = find_line(&state.orm, user.user_id, payload.product_id).await?;
    let current = existing.as_ref().map(|line| line.quantity).unwrap_or(0);
    let quantity = current.saturating_add(payload.quantity);
    write_line(&state.orm, user.user_id, payload.product_id, existing, quantity).await?;

    audit::record(
        &state.orm,
        user.user_id,
        "cart_update",
        "cart_items",
        serde_json::json!({ "product_id": payload.product_id, "quantity": quantity.max(0) }),
    )
    .await;

    let cart = load_cart(&state.orm, user.user_id).await?;
    Ok(ApiResponse::success("Cart updated", cart, Some(Meta::empty())))
}

pub async fn set_item_quantity(
    state: &AppState,
    user: &AuthUser,
    product_id: Uuid,
    quantity: i32,
) -> AppResult<ApiResponse<Cart>> {
    let existing = find_line(&state.orm, user.user_id, product_id).await?;
    if quantity > 0 {
        catalog_service::get_by_id(&state.orm, product_id).await?;
    }
    write_line(&state.orm, user.user_id, product_id, existing, quantity).await?;

    let cart = load_cart(&state.orm, user.user_id).await?;
    Ok(ApiResponse::success("Cart updated", cart, Some(Meta::empty())))
}

pub async fn remove_item(
    state: &AppState,
    user: &AuthUser,
    product_id: Uuid,
) -> AppResult<ApiResponse<Cart>> {
    let result = CartItems::delete_many()
        .filter(
            Condition::all()
                .add(CartCol::UserId.eq(user.user_id))
                .add(CartCol::ProductId.eq(product_id)),
        )
        .exec(&state.orm)
        .await?;

    if result.rows_affected == 0 {
        return Err(AppError::not_found("Cart item"));
    }

    audit::record(
        &state.orm,
        user.user_id,
        "cart_remove",
        "cart_items",
        serde_json::json!({ "product_id": product_id }),
    )
    .await;

    let cart = load_cart(&state.orm, user.user_id).await?;
    Ok(ApiResponse::success("Removed from cart", cart, Some(Meta::empty())))
}

pub async fn clear_in<C: ConnectionTrait>(conn: &C, user_id: Uuid) -> AppResult<u64> {
    let result = CartItems::delete_many()
        .filter(CartCol::UserId.eq(user_id))
        .exec(conn)
        .await?;
    Ok(result.rows_affected)
}

pub async fn clear(state: &AppState, user: &AuthUser) -> AppResult<ApiResponse<Cart>> {
    clear_in(&state.orm, user.user_id).await?;
    let cart = load_cart(&state.orm, user.user_id).await?;
    Ok(ApiResponse::success("Cart cleared", cart, Some(Meta::empty())))
}
