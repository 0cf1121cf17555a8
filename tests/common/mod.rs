#![allow(dead_code)]

use std::{
    path::PathBuf,
    sync::{Arc, Mutex},
    time::Duration,
};

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{ActiveModelTrait, ConnectOptions, Database, EntityTrait, Set};
use skincare_storefront_api::{
    config::{AppConfig, CheckoutConfig, NotifyConfig},
    db::run_migrations,
    dto::{
        cart::AddToCartRequest,
        orders::{CreateOrderInput, ProofUpload},
    },
    entity::{
        orders::PaymentMethod,
        products::{ActiveModel as ProductActive, Entity as Products, Model as ProductModel},
    },
    middleware::auth::{ADMIN_ROLE, AuthUser},
    models::{ContactDetails, ShippingAddress},
    notify::{ChatNotifier, EmailMessage, Mailer, Notifier, NotifyError},
    services::cart_service,
    state::AppState,
    uploads::LocalProofStore,
};
use uuid::Uuid;

pub const JWT_SECRET: &str = "test-secret";

#[derive(Default)]
pub struct RecordingMailer {
    pub sent: Mutex<Vec<EmailMessage>>,
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, message: &EmailMessage) -> Result<(), NotifyError> {
        self.sent.lock().unwrap().push(message.clone());
        Ok(())
    }
}

#[derive(Default)]
pub struct RecordingChat {
    pub sent: Mutex<Vec<String>>,
}

#[async_trait]
impl ChatNotifier for RecordingChat {
    async fn notify(&self, text: &str) -> Result<(), NotifyError> {
        self.sent.lock().unwrap().push(text.to_string());
        Ok(())
    }
}

pub struct TestApp {
    pub state: AppState,
    pub mailer: Arc<RecordingMailer>,
    pub chat: Arc<RecordingChat>,
    pub upload_dir: PathBuf,
}

impl TestApp {
    pub fn emails(&self) -> Vec<EmailMessage> {
        self.mailer.sent.lock().unwrap().clone()
    }

    pub fn chats(&self) -> Vec<String> {
        self.chat.sent.lock().unwrap().clone()
    }
}

pub async fn test_app() -> anyhow::Result<TestApp> {
    test_app_with(CheckoutConfig::default()).await
}

/// Fresh in-memory SQLite database per call. A single pooled connection keeps the
/// database alive and serializes transactions.
pub async fn test_app_with(checkout: CheckoutConfig) -> anyhow::Result<TestApp> {
    let mut options = ConnectOptions::new("sqlite::memory:");
    options
        .max_connections(1)
        .min_connections(1)
        .sqlx_logging(false);
    let orm = Database::connect(options).await?;
    run_migrations(&orm).await?;

    let upload_dir = std::env::temp_dir().join(format!("storefront-test-{}", Uuid::new_v4()));
    let config = AppConfig {
        database_url: "sqlite::memory:".into(),
        host: "127.0.0.1".into(),
        port: 0,
        jwt_secret: JWT_SECRET.into(),
        upload_dir: upload_dir.clone(),
        max_upload_bytes: 1024 * 1024,
        checkout,
        notify: NotifyConfig::default(),
    };

    let mailer = Arc::new(RecordingMailer::default());
    let chat = Arc::new(RecordingChat::default());
    let notifier = Notifier::new(mailer.clone(), chat.clone(), Duration::from_secs(2));

    let state = AppState {
        orm,
        config: Arc::new(config),
        notifier,
        proofs: Arc::new(LocalProofStore::new(upload_dir.clone())),
    };

    Ok(TestApp {
        state,
        mailer,
        chat,
        upload_dir,
    })
}

pub fn customer() -> AuthUser {
    AuthUser {
        user_id: Uuid::new_v4(),
        role: "user".into(),
    }
}

pub fn admin() -> AuthUser {
    AuthUser {
        user_id: Uuid::new_v4(),
        role: ADMIN_ROLE.into(),
    }
}

pub async fn create_product(
    state: &AppState,
    name: &str,
    price: i64,
    stock: i32,
) -> anyhow::Result<ProductModel> {
    let product = ProductActive {
        id: Set(Uuid::new_v4()),
        name: Set(name.to_string()),
        description: Set(Some(format!("{name} for testing"))),
        image: Set(Some(format!("/images/{}.jpg", name.to_lowercase().replace(' ', "-")))),
        price: Set(price),
        stock: Set(stock),
        rating: Set(4.5),
        num_reviews: Set(12),
        created_at: Set(Utc::now().into()),
    }
    .insert(&state.orm)
    .await?;
    Ok(product)
}

pub async fn stock_of(state: &AppState, product_id: Uuid) -> anyhow::Result<i32> {
    let product = Products::find_by_id(product_id)
        .one(&state.orm)
        .await?
        .ok_or_else(|| anyhow::anyhow!("product {product_id} missing"))?;
    Ok(product.stock)
}

pub async fn add_to_cart(
    state: &AppState,
    user: &AuthUser,
    product_id: Uuid,
    quantity: i32,
) -> anyhow::Result<()> {
    cart_service::upsert_item(
        state,
        user,
        AddToCartRequest {
            product_id,
            quantity,
        },
    )
    .await?;
    Ok(())
}

pub fn contact() -> ContactDetails {
    ContactDetails {
        full_name: "Maria Santos".into(),
        phone: "09171234567".into(),
        email: "maria@example.com".into(),
    }
}

pub fn address() -> ShippingAddress {
    ShippingAddress {
        street: Some("12 Mabini St".into()),
        barangay: Some("Poblacion".into()),
        city: Some("Makati".into()),
        landmark: Some("Near the church".into()),
        zip_code: Some("1210".into()),
    }
}

pub fn proof() -> ProofUpload {
    ProofUpload {
        file_name: Some("receipt.png".into()),
        content_type: Some("image/png".into()),
        bytes: vec![0x89, 0x50, 0x4e, 0x47],
    }
}

pub fn gcash_input(shipping_cost: Option<f64>) -> CreateOrderInput {
    CreateOrderInput {
        contact_details: contact(),
        shipping_address: address(),
        payment_method: PaymentMethod::Gcash,
        payment_proof: Some(proof()),
        shipping_cost,
    }
}

pub fn cod_input(shipping_cost: Option<f64>) -> CreateOrderInput {
    CreateOrderInput {
        contact_details: contact(),
        shipping_address: address(),
        payment_method: PaymentMethod::Cod,
        payment_proof: None,
        shipping_cost,
    }
}

/// Polls until `check` holds; background notifications land a little after the response.
pub async fn wait_for<F: Fn() -> bool>(check: F) -> bool {
    for _ in 0..100 {
        if check() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    check()
}
