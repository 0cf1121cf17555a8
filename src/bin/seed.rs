use chrono::{Duration, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set,
};
use skincare_storefront_api::{
    config::AppConfig,
    db::{create_orm_conn, run_migrations},
    entity::products::{ActiveModel as ProductActive, Column as ProdCol, Entity as Products},
    middleware::auth::{ADMIN_ROLE, issue_token},
};
use uuid::Uuid;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env()?;

    let orm = create_orm_conn(&config.database_url).await?;
    run_migrations(&orm).await?;

    seed_products(&orm).await?;

    // Accounts live in the identity service; these are dev tokens for local testing only.
    let admin_id = Uuid::new_v4();
    let user_id = Uuid::new_v4();
    let admin_token = issue_token(&config.jwt_secret, admin_id, ADMIN_ROLE, Duration::days(7))?;
    let user_token = issue_token(&config.jwt_secret, user_id, "user", Duration::days(7))?;

    println!("Seed completed.");
    println!("Admin {admin_id}: {admin_token}");
    println!("User  {user_id}: {user_token}");
    Ok(())
}

async fn seed_products(orm: &DatabaseConnection) -> anyhow::Result<()> {
    let products = [
        ("Hydrating Gel Cleanser", "Low-pH daily cleanser with centella", 450, 40),
        ("Niacinamide 10% Serum", "Evens tone and refines pores", 690, 25),
        ("Ceramide Barrier Cream", "Rich moisturizer for dry skin", 820, 18),
        ("Mineral Sunscreen SPF 50", "No white cast, reef-friendly", 560, 60),
        ("Rice Toner", "Brightening first-step essence", 380, 4),
    ];

    for (name, description, price, stock) in products {
        let existing = Products::find()
            .filter(ProdCol::Name.eq(name))
            .one(orm)
            .await?;
        if existing.is_some() {
            continue;
        }

        ProductActive {
            id: Set(Uuid::new_v4()),
            name: Set(name.to_string()),
            description: Set(Some(description.to_string())),
            image: Set(None),
            price: Set(price),
            stock: Set(stock),
            rating: Set(0.0),
            num_reviews: Set(0),
            created_at: Set(Utc::now().into()),
        }
        .insert(orm)
        .await?;
        println!("Seeded {name}");
    }

    Ok(())
}
