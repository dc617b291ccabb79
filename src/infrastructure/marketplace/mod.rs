//! Marketplace listing sources and snapshot files.
//!
//! A sync fetches the shop's listings from the primary source and falls back
//! to the secondary one on any failure. The result is written to a JSON and a
//! CSV snapshot on disk; imports read the JSON snapshot back.
//!
//! # Sources
//!
//! - [`BrowseListings`]: eBay Browse API item search filtered to the seller
//!   (includes prices)
//! - [`InventoryListings`]: eBay Sell Inventory API inventory items (no
//!   prices)

mod ebay;
mod snapshot;

pub use ebay::{parse_price_cents, BrowseListings, EbayClient, InventoryListings};
pub use snapshot::{read_snapshot, write_snapshot, Snapshot, SnapshotPaths, CSV_FILE, JSON_FILE};

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::MarketplaceSettings;

/// One listing as fetched from the marketplace.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketplaceListing {
    pub item_id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    /// Price in cents; the inventory source has none
    #[serde(default)]
    pub price_cents: Option<i64>,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub quantity: Option<i64>,
    #[serde(default)]
    pub url: Option<String>,
}

/// Errors that can occur while fetching or storing listings.
#[derive(Debug, Error)]
pub enum MarketplaceError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned an error response.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Failed to parse a response.
    #[error("Parse error: {0}")]
    Parse(String),

    /// A setting the source needs is missing.
    #[error("Not configured: {0}")]
    NotConfigured(String),

    /// Primary and fallback both failed.
    #[error("All listing sources failed ({primary}: {primary_error}; {fallback}: {fallback_error})")]
    AllSourcesFailed {
        primary: &'static str,
        primary_error: String,
        fallback: &'static str,
        fallback_error: String,
    },

    #[error("Snapshot I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Snapshot JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Snapshot CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// A place listings can be fetched from.
#[async_trait]
pub trait ListingSource: Send + Sync {
    /// Short name recorded in snapshots and metrics.
    fn name(&self) -> &'static str;

    async fn fetch_listings(&self) -> Result<Vec<MarketplaceListing>, MarketplaceError>;
}

/// Listings plus the name of the source that produced them.
#[derive(Debug, Clone)]
pub struct FetchedListings {
    pub source: &'static str,
    pub listings: Vec<MarketplaceListing>,
}

/// The primary/fallback pair a sync runs against.
#[derive(Clone)]
pub struct ListingSources {
    pub primary: Arc<dyn ListingSource>,
    pub fallback: Arc<dyn ListingSource>,
}

impl ListingSources {
    /// Browse API first, Inventory API as fallback. `None` when no access
    /// token is configured.
    pub fn from_settings(settings: &MarketplaceSettings) -> Result<Option<Self>, MarketplaceError> {
        if !settings.is_configured() {
            return Ok(None);
        }
        let client = EbayClient::new(settings)?;
        Ok(Some(Self {
            primary: Arc::new(BrowseListings(client.clone())),
            fallback: Arc::new(InventoryListings(client)),
        }))
    }

    pub async fn fetch(&self) -> Result<FetchedListings, MarketplaceError> {
        fetch_with_fallback(self.primary.as_ref(), self.fallback.as_ref()).await
    }
}

/// Fetch from `primary`, falling back to `fallback` on any error.
pub async fn fetch_with_fallback(
    primary: &dyn ListingSource,
    fallback: &dyn ListingSource,
) -> Result<FetchedListings, MarketplaceError> {
    let primary_error = match primary.fetch_listings().await {
        Ok(listings) => {
            return Ok(FetchedListings {
                source: primary.name(),
                listings,
            })
        }
        Err(e) => e,
    };

    tracing::warn!(
        source = primary.name(),
        error = %primary_error,
        fallback = fallback.name(),
        "Primary listing source failed, trying fallback"
    );

    match fallback.fetch_listings().await {
        Ok(listings) => Ok(FetchedListings {
            source: fallback.name(),
            listings,
        }),
        Err(fallback_error) => Err(MarketplaceError::AllSourcesFailed {
            primary: primary.name(),
            primary_error: primary_error.to_string(),
            fallback: fallback.name(),
            fallback_error: fallback_error.to_string(),
        }),
    }
}
