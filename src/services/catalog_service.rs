use sea_orm::sea_query::{Expr, Func};
use sea_orm::{
    ColumnTrait, Condition, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect,
};
use uuid::Uuid;

use crate::{
    dto::products::ProductList,
    entity::products::{Column, Entity as Products, Model as ProductModel},
    error::{AppError, AppResult},
    models::Product,
    response::{ApiResponse, Meta},
    routes::params::{ProductQuery, ProductSortBy, SortOrder},
    state::AppState,
};

pub async fn get_by_id<C: ConnectionTrait>(conn: &C, id: Uuid) -> AppResult<ProductModel> {
    Products::find_by_id(id)
        .one(conn)
        .await?
        .ok_or_else(|| AppError::not_found("Product"))
}

/// `stock += delta` as one conditional statement. A decrement only applies while enough stock
/// is left, so concurrent checkouts can never push a product below zero.
pub async fn adjust_stock<C: ConnectionTrait>(conn: &C, id: Uuid, delta: i32) -> AppResult<()> {
    let mut update = Products::update_many()
        .col_expr(Column::Stock, Expr::col(Column::Stock).add(delta))
        .filter(Column::Id.eq(id));
    if delta < 0 {
        let needed = delta
            .checked_neg()
            .ok_or_else(|| AppError::Validation("Stock adjustment is out of range".into()))?;
        update = update.filter(Column::Stock.gte(needed));
    }

    let result = update.exec(conn).await?;
    if result.rows_affected == 1 {
        return Ok(());
    }

    match Products::find_by_id(id).one(conn).await? {
        None => Err(AppError::not_found("Product")),
        Some(product) => {
            tracing::warn!(
                product_id = %id,
                stock = product.stock,
                delta,
                "stock adjustment rejected"
            );
            Err(AppError::Validation(format!(
                "Insufficient stock for {}",
                product.name
            )))
        }
    }
}

pub async fn list_products(
    state: &AppState,
    query: ProductQuery,
) -> AppResult<ApiResponse<ProductList>> {
    let (page, limit, offset) = query.pagination.normalize();
    let mut condition = Condition::all();

    if let Some(search) = query.q.as_ref().map(|s| s.trim()).filter(|s| !s.is_empty()) {
        // ILIKE is Postgres-only.
        let pattern = format!("%{}%", search.to_lowercase());
        condition = condition.add(
            Condition::any()
                .add(Expr::expr(Func::lower(Expr::col(Column::Name))).like(pattern.clone()))
                .add(Expr::expr(Func::lower(Expr::col(Column::Description))).like(pattern)),
        );
    }

    if let Some(min_price) = query.min_price {
        condition = condition.add(Column::Price.gte(min_price));
    }

    if let Some(max_price) = query.max_price {
        condition = condition.add(Column::Price.lte(max_price));
    }

    let sort_by = query.sort_by.unwrap_or(ProductSortBy::CreatedAt);
    let sort_order = query.sort_order.unwrap_or(SortOrder::Desc);
    let sort_col = match sort_by {
        ProductSortBy::CreatedAt => Column::CreatedAt,
        ProductSortBy::Price => Column::Price,
        ProductSortBy::Name => Column::Name,
        ProductSortBy::Rating => Column::Rating,
    };

    let mut finder = Products::find().filter(condition);
    finder = match sort_order {
        SortOrder::Asc => finder.order_by_asc(sort_col),
        SortOrder::Desc => finder.order_by_desc(sort_col),
    };

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
    Ok(ApiResponse::success("Products", ProductList { items }, Some(meta)))
}

pub async fn get_product(state: &AppState, id: Uuid) -> AppResult<ApiResponse<Product>> {
    let product = get_by_id(&state.orm, id).await?;
    Ok(ApiResponse::success("Product", Product::from(product), None))
}
