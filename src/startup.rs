//! Application Startup
//!
//! Application building and server initialization.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use axum::{middleware, Router};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use crate::application::services::{
    AuthServiceImpl, CartServiceImpl, ChatServiceImpl, MarketplaceServiceImpl, OrderServiceImpl,
    ProductServiceImpl,
};
use crate::config::Settings;
use crate::infrastructure::images::{ImageProcessor, RemoveBgClient};
use crate::infrastructure::marketplace::ListingSources;
use crate::infrastructure::payments::{PaymentGateway, StripeGateway};
use crate::infrastructure::store::{seed_sample_data, MemoryStore};
use crate::presentation::http::{handlers::health, routes};
use crate::presentation::middleware::{create_cors_layer, create_trace_layer, track_metrics};
use crate::presentation::websocket::Gateway;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<MemoryStore>,
    pub gateway: Arc<Gateway>,
    pub settings: Arc<Settings>,
    /// `None` when no payment secret key is configured
    pub payments: Option<Arc<dyn PaymentGateway>>,
    /// `None` when no marketplace access token is configured
    pub marketplace: Option<ListingSources>,
    /// `None` when no image endpoint is configured
    pub images: Option<Arc<dyn ImageProcessor>>,
}

impl AppState {
    /// Build state with the integrations the settings enable.
    pub fn new(settings: Settings, store: Arc<MemoryStore>) -> Result<Self> {
        let payments: Option<Arc<dyn PaymentGateway>> = match settings.payments.secret_key.as_deref() {
            Some(key) if settings.payments.is_configured() => Some(Arc::new(
                StripeGateway::new(&settings.payments, key).context("Failed to create payment client")?,
            )),
            _ => None,
        };

        let marketplace = ListingSources::from_settings(&settings.marketplace)
            .context("Failed to create marketplace client")?;

        let images: Option<Arc<dyn ImageProcessor>> = match settings.images.endpoint.as_deref() {
            Some(endpoint) if settings.images.is_configured() => Some(Arc::new(
                RemoveBgClient::new(&settings.images, endpoint).context("Failed to create image client")?,
            )),
            _ => None,
        };

        tracing::info!(
            payments = payments.is_some(),
            marketplace = marketplace.is_some(),
            images = images.is_some(),
            "Integrations configured"
        );

        Ok(Self {
            store,
            gateway: Arc::new(Gateway::new()),
            settings: Arc::new(settings),
            payments,
            marketplace,
            images,
        })
    }

    pub fn with_payments(mut self, payments: Arc<dyn PaymentGateway>) -> Self {
        self.payments = Some(payments);
        self
    }

    pub fn with_marketplace(mut self, sources: ListingSources) -> Self {
        self.marketplace = Some(sources);
        self
    }

    pub fn with_images(mut self, images: Arc<dyn ImageProcessor>) -> Self {
        self.images = Some(images);
        self
    }

    pub fn auth_service(&self) -> AuthServiceImpl<MemoryStore, MemoryStore> {
        AuthServiceImpl::new(
            self.store.clone(),
            self.store.clone(),
            self.settings.jwt.clone(),
        )
    }

    pub fn product_service(&self) -> ProductServiceImpl<MemoryStore> {
        ProductServiceImpl::new(self.store.clone())
    }

    pub fn cart_service(&self) -> CartServiceImpl<MemoryStore> {
        CartServiceImpl::new(self.store.clone())
    }

    pub fn order_service(&self) -> OrderServiceImpl<MemoryStore> {
        OrderServiceImpl::new(
            self.store.clone(),
            self.payments.clone(),
            self.settings.payments.currency.clone(),
        )
    }

    pub fn chat_service(&self) -> ChatServiceImpl<MemoryStore> {
        ChatServiceImpl::new(self.store.clone())
    }

    pub fn marketplace_service(&self) -> MarketplaceServiceImpl<MemoryStore> {
        MarketplaceServiceImpl::new(
            self.store.clone(),
            self.marketplace.clone(),
            PathBuf::from(&self.settings.marketplace.snapshot_dir),
        )
    }
}

/// Routes plus the global layers
pub fn build_router(state: AppState) -> Router {
    let cors = create_cors_layer(&state.settings.cors);
    routes::create_router(state)
        .layer(middleware::from_fn(track_metrics))
        .layer(create_trace_layer())
        .layer(cors)
}

/// Application instance
pub struct Application {
    listener: TcpListener,
    router: Router,
    heartbeat: JoinHandle<()>,
}

impl Application {
    /// Build the application from settings
    pub async fn build(settings: Settings) -> Result<Self> {
        health::init_server_start();

        let store = Arc::new(MemoryStore::new());
        if settings.store.seed_sample_data {
            seed_sample_data(&store)
                .await
                .context("Failed to seed sample data")?;
            let counts = store.counts();
            tracing::info!(
                users = counts.users,
                products = counts.products,
                orders = counts.orders,
                "Sample data seeded"
            );
        }

        let heartbeat_interval = Duration::from_secs(settings.websocket.heartbeat_interval_secs);
        let addr = settings.server_addr();

        let state = AppState::new(settings, store)?;
        let heartbeat = state.gateway.spawn_heartbeat(heartbeat_interval);
        let router = build_router(state);

        // Bind to address
        let listener = TcpListener::bind(&addr)
            .await
            .with_context(|| format!("Failed to bind {}", addr))?;
        tracing::info!("Listening on {}", listener.local_addr()?);

        Ok(Self {
            listener,
            router,
            heartbeat,
        })
    }

    /// Run the server until stopped
    pub async fn run_until_stopped(self) -> Result<()> {
        let result = axum::serve(self.listener, self.router)
            .with_graceful_shutdown(shutdown_signal())
            .await;
        self.heartbeat.abort();
        result?;
        Ok(())
    }

    /// Get the bound address
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
