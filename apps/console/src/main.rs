//! Promodesk dev console. Wires the discount edit session against either the
//! real HTTP service or the in-memory store and drives one scripted edit.

#![forbid(unsafe_code)]

use std::env;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use url::Url;

use promodesk_application::{
    DiscountEditSession, DiscountGateway, DiscountLoader, SubmitOutcome,
};
use promodesk_core::{AppError, AppResult, DiscountId, NonEmptyString};
use promodesk_domain::{
    CombinesWith, Discount, DiscountConfiguration, DiscountMethod, FieldEdit,
};
use promodesk_infrastructure::{
    ConsoleNavigationBridge, HttpDiscountGateway, InMemoryDiscountStore,
};

#[derive(Debug, Clone)]
struct ConsoleConfig {
    api_base_url: Option<Url>,
    access_token: String,
    discount_id: String,
    usage_limit: String,
}

impl ConsoleConfig {
    fn load() -> AppResult<Self> {
        let api_base_url = env::var("DISCOUNT_API_URL")
            .ok()
            .filter(|value| !value.trim().is_empty())
            .map(|value| {
                Url::parse(value.as_str()).map_err(|error| {
                    AppError::Validation(format!("invalid DISCOUNT_API_URL: {error}"))
                })
            })
            .transpose()?;
        let access_token = env::var("DISCOUNT_API_TOKEN").unwrap_or_default();
        let discount_id =
            env::var("DISCOUNT_ID").unwrap_or_else(|_| "demo-discount".to_owned());
        let usage_limit = env::var("DISCOUNT_USAGE_LIMIT").unwrap_or_else(|_| "10".to_owned());

        Ok(Self {
            api_base_url,
            access_token,
            discount_id,
            usage_limit,
        })
    }
}

#[tokio::main]
async fn main() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = ConsoleConfig::load()?;
    let navigation = Arc::new(ConsoleNavigationBridge::new());

    let (gateway, loader): (Arc<dyn DiscountGateway>, Arc<dyn DiscountLoader>) =
        match &config.api_base_url {
            Some(base_url) => {
                let http_client = reqwest::Client::builder()
                    .timeout(Duration::from_secs(15))
                    .build()
                    .map_err(|error| {
                        AppError::Internal(format!("failed to build HTTP client: {error}"))
                    })?;
                let gateway = Arc::new(HttpDiscountGateway::new(
                    http_client,
                    base_url.clone(),
                    config.access_token.clone(),
                ));
                info!(base_url = %base_url, "using the HTTP discount gateway");
                (gateway.clone(), gateway)
            }
            None => {
                let store = Arc::new(InMemoryDiscountStore::new());
                store.seed(seed_discount(config.discount_id.as_str())?).await;
                info!("no DISCOUNT_API_URL set, using the in-memory discount store");
                (store.clone(), store)
            }
        };

    let discount_id = DiscountId::new(config.discount_id.clone())?;
    let session =
        DiscountEditSession::start(gateway, navigation, loader, discount_id.clone(), Utc::now())
            .await?;
    info!(
        session_id = %session.session_id(),
        discount_id = %discount_id,
        "edit session hydrated"
    );

    session
        .apply(FieldEdit::UsageLimit(config.usage_limit.clone()))
        .await?;
    let dirty = session.is_dirty().await;
    info!(usage_limit = %config.usage_limit, dirty, "usage limit updated");

    match session.submit().await? {
        SubmitOutcome::Saved => info!("discount saved"),
        SubmitOutcome::Rejected(errors) => {
            for error in &errors {
                warn!(message = %error.message, "the service rejected the update");
            }
        }
        SubmitOutcome::Invalid => warn!("local validation failed, nothing was sent"),
        SubmitOutcome::Skipped => info!("nothing to save"),
    }

    Ok(())
}

fn seed_discount(id: &str) -> AppResult<Discount> {
    Discount::new(
        DiscountId::new(id)?,
        "SAVE10",
        DiscountMethod::Code,
        "SAVE10",
        CombinesWith::default(),
        Some(5),
        true,
        Utc::now(),
        None,
        NonEmptyString::new("demo-configuration").ok(),
        DiscountConfiguration {
            customer_tag: String::new(),
            percentage: 10.0,
            collections: Vec::new(),
        },
    )
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
}
