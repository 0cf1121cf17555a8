mod common;

use common::*;
use sea_orm::{EntityTrait, PaginatorTrait};
use skincare_storefront_api::{
    entity::{CartItems, OrderItems, Orders, orders::OrderStatus},
    error::AppError,
    services::{cart_service, catalog_service, order_service},
};

#[tokio::test]
async fn gcash_checkout_builds_order_from_cart() -> anyhow::Result<()> {
    let app = test_app().await?;
    let user = customer();
    let serum = create_product(&app.state, "Niacinamide Serum", 300, 10).await?;
    add_to_cart(&app.state, &user, serum.id, 2).await?;

    let resp = order_service::create_order(&app.state, &user, gcash_input(Some(120.0))).await?;
    let created = resp.data.unwrap();

    // 600 is past the free-shipping threshold, so the requested 120 is ignored.
    assert_eq!(created.order.subtotal, 600);
    assert_eq!(created.order.shipping_cost, 0);
    assert_eq!(created.order.tax, 0);
    assert_eq!(created.order.total, 600);
    assert_eq!(created.order.status, OrderStatus::AwaitingPaymentVerification);
    assert_eq!(created.order.contact_details, contact());
    assert!(created.order.payment_result.is_none());

    let proof_url = created.order.payment_proof_url.clone().unwrap();
    assert!(proof_url.starts_with("/uploads/proof-"));
    assert!(app.upload_dir.join(proof_url.trim_start_matches("/uploads/")).exists());

    assert_eq!(created.items.len(), 1);
    assert_eq!(created.items[0].name, "Niacinamide Serum");
    assert_eq!(created.items[0].unit_price, 300);
    assert_eq!(created.items[0].line_total, 600);

    assert_eq!(stock_of(&app.state, serum.id).await?, 8);
    let cart = cart_service::load_cart(&app.state.orm, user.user_id).await?;
    assert!(cart.items.is_empty());

    let _ = tokio::fs::remove_dir_all(&app.upload_dir).await;
    Ok(())
}

#[tokio::test]
async fn small_orders_pay_requested_or_flat_shipping() -> anyhow::Result<()> {
    let app = test_app().await?;
    let toner = create_product(&app.state, "Rice Toner", 200, 10).await?;

    let first = customer();
    add_to_cart(&app.state, &first, toner.id, 1).await?;
    let order = order_service::create_order(&app.state, &first, cod_input(None))
        .await?
        .data
        .unwrap()
        .order;
    assert_eq!(order.shipping_cost, 85);
    assert_eq!(order.total, 285);
    assert_eq!(order.status, OrderStatus::Pending);
    assert!(order.payment_proof_url.is_none());

    let second = customer();
    add_to_cart(&app.state, &second, toner.id, 1).await?;
    let order = order_service::create_order(&app.state, &second, cod_input(Some(49.6)))
        .await?
        .data
        .unwrap()
        .order;
    assert_eq!(order.shipping_cost, 50);
    assert_eq!(order.total, 250);

    let third = customer();
    add_to_cart(&app.state, &third, toner.id, 1).await?;
    let order = order_service::create_order(&app.state, &third, cod_input(Some(-10.0)))
        .await?
        .data
        .unwrap()
        .order;
    assert_eq!(order.shipping_cost, 85);
    Ok(())
}

#[tokio::test]
async fn absurd_shipping_request_falls_back_to_flat_rate() -> anyhow::Result<()> {
    let app = test_app().await?;
    let user = customer();
    let toner = create_product(&app.state, "Rice Toner", 100, 10).await?;
    add_to_cart(&app.state, &user, toner.id, 2).await?;

    let order = order_service::create_order(&app.state, &user, cod_input(Some(1e300)))
        .await?
        .data
        .unwrap()
        .order;
    assert_eq!(order.subtotal, 200);
    assert_eq!(order.shipping_cost, 85);
    assert_eq!(order.total, 285);
    Ok(())
}

#[tokio::test]
async fn failed_gcash_checkout_leaves_no_proof_behind() -> anyhow::Result<()> {
    let app = test_app().await?;
    let user = customer();

    let err = order_service::create_order(&app.state, &user, gcash_input(None))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(ref msg) if msg == "Cart is empty"));

    let mut leftover = 0;
    if let Ok(mut entries) = tokio::fs::read_dir(&app.upload_dir).await {
        while entries.next_entry().await?.is_some() {
            leftover += 1;
        }
    }
    assert_eq!(leftover, 0);
    let _ = tokio::fs::remove_dir_all(&app.upload_dir).await;
    Ok(())
}

#[tokio::test]
async fn empty_cart_is_rejected() -> anyhow::Result<()> {
    let app = test_app().await?;
    let user = customer();

    let err = order_service::create_order(&app.state, &user, cod_input(None))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(ref msg) if msg == "Cart is empty"));
    assert_eq!(Orders::find().count(&app.state.orm).await?, 0);
    Ok(())
}

#[tokio::test]
async fn gcash_requires_a_proof_image() -> anyhow::Result<()> {
    let app = test_app().await?;
    let user = customer();
    let cream = create_product(&app.state, "Ceramide Cream", 820, 5).await?;
    add_to_cart(&app.state, &user, cream.id, 1).await?;

    let mut input = gcash_input(None);
    input.payment_proof = None;
    let err = order_service::create_order(&app.state, &user, input)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));

    let mut input = gcash_input(None);
    if let Some(proof) = input.payment_proof.as_mut() {
        proof.content_type = Some("application/pdf".into());
    }
    let err = order_service::create_order(&app.state, &user, input)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));

    assert_eq!(Orders::find().count(&app.state.orm).await?, 0);
    assert_eq!(stock_of(&app.state, cream.id).await?, 5);
    let cart = cart_service::load_cart(&app.state.orm, user.user_id).await?;
    assert_eq!(cart.items.len(), 1);
    Ok(())
}

#[tokio::test]
async fn missing_contact_details_are_rejected() -> anyhow::Result<()> {
    let app = test_app().await?;
    let user = customer();
    let cream = create_product(&app.state, "Ceramide Cream", 820, 5).await?;
    add_to_cart(&app.state, &user, cream.id, 1).await?;

    let mut input = cod_input(None);
    input.contact_details.phone = "   ".into();
    let err = order_service::create_order(&app.state, &user, input)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));
    assert_eq!(Orders::find().count(&app.state.orm).await?, 0);
    Ok(())
}

#[tokio::test]
async fn insufficient_stock_leaves_everything_untouched() -> anyhow::Result<()> {
    let app = test_app().await?;
    let user = customer();
    let cleanser = create_product(&app.state, "Gel Cleanser", 450, 10).await?;
    let sunscreen = create_product(&app.state, "Mineral Sunscreen", 560, 1).await?;
    add_to_cart(&app.state, &user, cleanser.id, 2).await?;
    add_to_cart(&app.state, &user, sunscreen.id, 3).await?;

    let err = order_service::create_order(&app.state, &user, cod_input(None))
        .await
        .unwrap_err();
    assert!(
        matches!(err, AppError::Validation(ref msg) if msg.contains("Mineral Sunscreen")),
        "unexpected error: {err:?}"
    );

    assert_eq!(Orders::find().count(&app.state.orm).await?, 0);
    assert_eq!(OrderItems::find().count(&app.state.orm).await?, 0);
    assert_eq!(stock_of(&app.state, cleanser.id).await?, 10);
    assert_eq!(stock_of(&app.state, sunscreen.id).await?, 1);
    assert_eq!(CartItems::find().count(&app.state.orm).await?, 2);
    Ok(())
}

#[tokio::test]
async fn conditional_decrement_never_goes_negative() -> anyhow::Result<()> {
    let app = test_app().await?;
    let toner = create_product(&app.state, "Rice Toner", 380, 3).await?;

    let err = catalog_service::adjust_stock(&app.state.orm, toner.id, -4)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));
    assert_eq!(stock_of(&app.state, toner.id).await?, 3);

    catalog_service::adjust_stock(&app.state.orm, toner.id, -3).await?;
    assert_eq!(stock_of(&app.state, toner.id).await?, 0);

    let missing = catalog_service::adjust_stock(&app.state.orm, uuid::Uuid::new_v4(), 1)
        .await
        .unwrap_err();
    assert!(matches!(missing, AppError::NotFound(_)));
    Ok(())
}

// The test pool has a single SQLite connection, so these checkouts interleave at the task
// level but their transactions run one after another. The stock floor under truly parallel
// writers is covered by `conditional_decrement_never_goes_negative` at the statement level.
#[tokio::test]
async fn concurrent_checkouts_consume_stock_exactly() -> anyhow::Result<()> {
    const BUYERS: i32 = 5;
    const QTY: i32 = 2;

    let app = test_app().await?;
    let serum = create_product(&app.state, "Vitamin C Serum", 100, BUYERS * QTY).await?;

    let mut buyers = Vec::new();
    for _ in 0..BUYERS {
        let user = customer();
        add_to_cart(&app.state, &user, serum.id, QTY).await?;
        buyers.push(user);
    }

    let mut handles = Vec::new();
    for user in buyers {
        let state = app.state.clone();
        handles.push(tokio::spawn(async move {
            order_service::create_order(&state, &user, cod_input(None)).await
        }));
    }

    let mut succeeded = 0;
    for handle in handles {
        if handle.await?.is_ok() {
            succeeded += 1;
        }
    }

    assert_eq!(succeeded, BUYERS);
    assert_eq!(stock_of(&app.state, serum.id).await?, 0);
    assert_eq!(Orders::find().count(&app.state.orm).await?, BUYERS as u64);
    Ok(())
}

#[tokio::test]
async fn concurrent_checkouts_cannot_oversell() -> anyhow::Result<()> {
    const BUYERS: i32 = 4;
    const QTY: i32 = 3;

    let app = test_app().await?;
    let mask = create_product(&app.state, "Sleeping Mask", 150, BUYERS * QTY - 1).await?;

    let mut buyers = Vec::new();
    for _ in 0..BUYERS {
        let user = customer();
        add_to_cart(&app.state, &user, mask.id, QTY).await?;
        buyers.push(user);
    }

    let mut handles = Vec::new();
    for user in buyers {
        let state = app.state.clone();
        handles.push(tokio::spawn(async move {
            order_service::create_order(&state, &user, cod_input(None)).await
        }));
    }

    let mut succeeded = 0;
    let mut rejected = 0;
    for handle in handles {
        match handle.await? {
            Ok(_) => succeeded += 1,
            Err(AppError::Validation(_)) => rejected += 1,
            Err(other) => panic!("unexpected error: {other:?}"),
        }
    }

    assert_eq!(succeeded, BUYERS - 1);
    assert_eq!(rejected, 1);
    let left = stock_of(&app.state, mask.id).await?;
    assert_eq!(left, QTY - 1);
    assert!(left >= 0);
    Ok(())
}

#[tokio::test]
async fn checkout_notifies_customer_and_admins() -> anyhow::Result<()> {
    let app = test_app().await?;
    let user = customer();
    let cleanser = create_product(&app.state, "Gel Cleanser", 450, 10).await?;
    add_to_cart(&app.state, &user, cleanser.id, 1).await?;

    let order = order_service::create_order(&app.state, &user, cod_input(None))
        .await?
        .data
        .unwrap()
        .order;

    assert!(wait_for(|| app.emails().len() == 1 && app.chats().len() == 1).await);

    let email = &app.emails()[0];
    assert_eq!(email.to, "maria@example.com");
    assert!(email.subject.contains(&order.order_number));
    assert!(email.html_body.contains("Gel Cleanser"));

    let chat = &app.chats()[0];
    assert!(chat.contains(&order.order_number));
    assert!(chat.contains("Cash on Delivery"));
    Ok(())
}

#[tokio::test]
async fn customers_only_see_their_own_orders() -> anyhow::Result<()> {
    let app = test_app().await?;
    let owner = customer();
    let stranger = customer();
    let cleanser = create_product(&app.state, "Gel Cleanser", 450, 10).await?;

    add_to_cart(&app.state, &owner, cleanser.id, 1).await?;
    let first = order_service::create_order(&app.state, &owner, cod_input(None))
        .await?
        .data
        .unwrap()
        .order;
    tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    add_to_cart(&app.state, &owner, cleanser.id, 2).await?;
    let second = order_service::create_order(&app.state, &owner, cod_input(None))
        .await?
        .data
        .unwrap()
        .order;

    let mine = order_service::list_my_orders(&app.state, &owner, Default::default())
        .await?
        .data
        .unwrap();
    assert_eq!(mine.items.len(), 2);
    // Newest first.
    assert_eq!(mine.items[0].order.id, second.id);
    assert_eq!(mine.items[1].order.id, first.id);
    assert_eq!(mine.items[0].items[0].quantity, 2);

    let theirs = order_service::list_my_orders(&app.state, &stranger, Default::default())
        .await?
        .data
        .unwrap();
    assert!(theirs.items.is_empty());

    let err = order_service::get_order(&app.state, &stranger, first.id)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));

    let as_admin = order_service::get_order(&app.state, &admin(), first.id)
        .await?
        .data
        .unwrap();
    assert_eq!(as_admin.order.id, first.id);
    assert_eq!(as_admin.items.len(), 1);
    Ok(())
}
