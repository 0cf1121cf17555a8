mod common;

use common::*;
use skincare_storefront_api::{error::AppError, services::cart_service};
use uuid::Uuid;

#[tokio::test]
async fn adding_accumulates_and_negative_delta_shrinks() -> anyhow::Result<()> {
    let app = test_app().await?;
    let user = customer();
    let serum = create_product(&app.state, "Niacinamide Serum", 690, 25).await?;
    let toner = create_product(&app.state, "Rice Toner", 380, 10).await?;

    add_to_cart(&app.state, &user, serum.id, 2).await?;
    add_to_cart(&app.state, &user, serum.id, 3).await?;
    add_to_cart(&app.state, &user, toner.id, 1).await?;

    let cart = cart_service::load_cart(&app.state.orm, user.user_id).await?;
    assert_eq!(cart.items.len(), 2);
    let serum_line = cart.items.iter().find(|i| i.product.id == serum.id).unwrap();
    assert_eq!(serum_line.quantity, 5);
    assert_eq!(serum_line.line_total, 3450);
    assert_eq!(cart.subtotal, 3450 + 380);

    add_to_cart(&app.state, &user, serum.id, -4).await?;
    let cart = cart_service::load_cart(&app.state.orm, user.user_id).await?;
    let serum_line = cart.items.iter().find(|i| i.product.id == serum.id).unwrap();
    assert_eq!(serum_line.quantity, 1);

    // Going to zero or below drops the line.
    add_to_cart(&app.state, &user, serum.id, -7).await?;
    let cart = cart_service::load_cart(&app.state.orm, user.user_id).await?;
    assert_eq!(cart.items.len(), 1);
    assert_eq!(cart.items[0].product.id, toner.id);
    Ok(())
}

#[tokio::test]
async fn setting_quantity_replaces_or_removes() -> anyhow::Result<()> {
    let app = test_app().await?;
    let user = customer();
    let cream = create_product(&app.state, "Ceramide Cream", 820, 18).await?;

    cart_service::set_item_quantity(&app.state, &user, cream.id, 4).await?;
    let cart = cart_service::load_cart(&app.state.orm, user.user_id).await?;
    assert_eq!(cart.items[0].quantity, 4);

    cart_service::set_item_quantity(&app.state, &user, cream.id, 2).await?;
    let cart = cart_service::load_cart(&app.state.orm, user.user_id).await?;
    assert_eq!(cart.items[0].quantity, 2);

    let resp = cart_service::set_item_quantity(&app.state, &user, cream.id, 0).await?;
    assert!(resp.data.unwrap().items.is_empty());
    Ok(())
}

#[tokio::test]
async fn carts_are_per_user_and_start_empty() -> anyhow::Result<()> {
    let app = test_app().await?;
    let alice = customer();
    let bob = customer();
    let mask = create_product(&app.state, "Sleeping Mask", 150, 9).await?;

    let empty = cart_service::get_or_create(&app.state, &bob).await?.data.unwrap();
    assert!(empty.items.is_empty());
    assert_eq!(empty.subtotal, 0);
    assert_eq!(empty.user_id, bob.user_id);

    add_to_cart(&app.state, &alice, mask.id, 1).await?;
    let bobs = cart_service::load_cart(&app.state.orm, bob.user_id).await?;
    assert!(bobs.items.is_empty());

    let err = cart_service::remove_item(&app.state, &bob, mask.id)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));

    let after = cart_service::remove_item(&app.state, &alice, mask.id)
        .await?
        .data
        .unwrap();
    assert!(after.items.is_empty());
    Ok(())
}

#[tokio::test]
async fn unknown_products_cannot_be_added() -> anyhow::Result<()> {
    let app = test_app().await?;
    let user = customer();

    let err = add_to_cart(&app.state, &user, Uuid::new_v4(), 1)
        .await
        .unwrap_err();
    let err = err.downcast::<AppError>()?;
    assert!(matches!(err, AppError::NotFound(_)));
    Ok(())
}

#[tokio::test]
async fn clearing_empties_the_cart() -> anyhow::Result<()> {
    let app = test_app().await?;
    let user = customer();
    let a = create_product(&app.state, "Aloe Gel", 250, 50).await?;
    let b = create_product(&app.state, "Lip Balm", 120, 50).await?;
    add_to_cart(&app.state, &user, a.id, 1).await?;
    add_to_cart(&app.state, &user, b.id, 2).await?;

    let cleared = cart_service::clear(&app.state, &user).await?.data.unwrap();
    assert!(cleared.items.is_empty());
    assert_eq!(cleared.subtotal, 0);
    Ok(())
}
