//! eBay API client.
//!
//! # API Reference
//!
//! - Base URL: `https://api.ebay.com`
//! - Authentication: OAuth user token via `Authorization: Bearer <token>`
//! - Marketplace: `X-EBAY-C-MARKETPLACE-ID` header (e.g. `EBAY_US`)

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::Url;
use serde::de::DeserializeOwned;
use serde::Deserialize;

use super::{ListingSource, MarketplaceError, MarketplaceListing};
use crate::config::MarketplaceSettings;

const BROWSE_SEARCH_PATH: &str = "/buy/browse/v1/item_summary/search";
const INVENTORY_PATH: &str = "/sell/inventory/v1/inventory_item";

/// Keyword sent with Browse searches; the API rejects a search without one.
const SEARCH_QUERY: &str = "sticker";

/// Upper bound on pages fetched per sync.
const MAX_PAGES: u32 = 50;

/// eBay API client shared by both listing sources.
#[derive(Clone)]
pub struct EbayClient {
    inner: Arc<EbayClientInner>,
}

struct EbayClientInner {
    client: reqwest::Client,
    base_url: String,
    seller_id: Option<String>,
    page_size: u32,
}

impl EbayClient {
    /// Create a new eBay API client.
    ///
    /// # Errors
    ///
    /// Returns `NotConfigured` without an access token, or an error if the
    /// HTTP client fails to build.
    pub fn new(settings: &MarketplaceSettings) -> Result<Self, MarketplaceError> {
        let token = settings
            .access_token
            .as_deref()
            .filter(|t| !t.is_empty())
            .ok_or_else(|| MarketplaceError::NotConfigured("eBay access token".into()))?;

        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", token))
                .map_err(|e| MarketplaceError::Parse(format!("Invalid access token format: {e}")))?,
        );
        headers.insert(
            "X-EBAY-C-MARKETPLACE-ID",
            HeaderValue::from_str(&settings.marketplace_id)
                .map_err(|e| MarketplaceError::Parse(format!("Invalid marketplace id: {e}")))?,
        );

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()?;

        Ok(Self {
            inner: Arc::new(EbayClientInner {
                client,
                base_url: settings.api_base_url.trim_end_matches('/').to_string(),
                seller_id: settings.seller_id.clone().filter(|s| !s.is_empty()),
                page_size: settings.page_size.clamp(1, 200),
            }),
        })
    }

    /// Execute a GET request with query parameters.
    async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<T, MarketplaceError> {
        let url = Url::parse_with_params(&format!("{}{}", self.inner.base_url, path), params)
            .map_err(|e| MarketplaceError::Parse(format!("Invalid URL: {e}")))?;

        let response = self.inner.client.get(url).send().await?;
        let status = response.status();

        if status.is_success() {
            return response
                .json()
                .await
                .map_err(|e| MarketplaceError::Parse(format!("Failed to parse response: {e}")));
        }

        let message = response.text().await.unwrap_or_default();
        Err(MarketplaceError::Api {
            status: status.as_u16(),
            message: error_message(&message),
        })
    }

    /// Active listings of the configured seller, with prices.
    pub async fn search_seller_listings(&self) -> Result<Vec<MarketplaceListing>, MarketplaceError> {
        let seller = self
            .inner
            .seller_id
            .as_deref()
            .ok_or_else(|| MarketplaceError::NotConfigured("eBay seller id".into()))?;

        let limit = self.inner.page_size;
        let mut listings = Vec::new();

        for page in 0..MAX_PAGES {
            let offset = page * limit;
            let response: BrowseSearchResponse = self
                .get(
                    BROWSE_SEARCH_PATH,
                    &[
                        ("q", SEARCH_QUERY.to_string()),
                        ("filter", format!("sellers:{{{}}}", seller)),
                        ("limit", limit.to_string()),
                        ("offset", offset.to_string()),
                    ],
                )
                .await?;

            let received = response.item_summaries.len() as u32;
            listings.extend(response.item_summaries.into_iter().map(ItemSummary::into_listing));

            if received < limit || offset + received >= response.total {
                break;
            }
        }

        tracing::debug!(count = listings.len(), "Fetched listings from Browse API");
        Ok(listings)
    }

    /// Inventory items of the authenticated seller. Inventory items carry no
    /// price.
    pub async fn inventory_items(&self) -> Result<Vec<MarketplaceListing>, MarketplaceError> {
        let limit = self.inner.page_size;
        let mut listings = Vec::new();

        for page in 0..MAX_PAGES {
            let offset = page * limit;
            let response: InventoryResponse = self
                .get(
                    INVENTORY_PATH,
                    &[("limit", limit.to_string()), ("offset", offset.to_string())],
                )
                .await?;

            let received = response.inventory_items.len() as u32;
            listings.extend(response.inventory_items.into_iter().map(InventoryItem::into_listing));

            if received < limit || offset + received >= response.total {
                break;
            }
        }

        tracing::debug!(count = listings.len(), "Fetched listings from Inventory API");
        Ok(listings)
    }
}

/// Primary source: Browse API search.
pub struct BrowseListings(pub EbayClient);

#[async_trait]
impl ListingSource for BrowseListings {
    fn name(&self) -> &'static str {
        "browse"
    }

    async fn fetch_listings(&self) -> Result<Vec<MarketplaceListing>, MarketplaceError> {
        self.0.search_seller_listings().await
    }
}

/// Fallback source: Sell Inventory API.
pub struct InventoryListings(pub EbayClient);

#[async_trait]
impl ListingSource for InventoryListings {
    fn name(&self) -> &'static str {
        "inventory"
    }

    async fn fetch_listings(&self) -> Result<Vec<MarketplaceListing>, MarketplaceError> {
        self.0.inventory_items().await
    }
}

/// Parse a decimal amount such as `"12.99"` into cents.
pub fn parse_price_cents(value: &str) -> Option<i64> {
    let amount: f64 = value.trim().parse().ok()?;
    if !amount.is_finite() || amount < 0.0 {
        return None;
    }
    Some((amount * 100.0).round() as i64)
}

/// Pull the first `errors[].message` out of an eBay error body.
fn error_message(body: &str) -> String {
    serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.errors.into_iter().next())
        .map(|e| e.message)
        .unwrap_or_else(|| body.chars().take(200).collect())
}

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    errors: Vec<ErrorDetail>,
}

#[derive(Deserialize)]
struct ErrorDetail {
    message: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct BrowseSearchResponse {
    #[serde(default)]
    item_summaries: Vec<ItemSummary>,
    #[serde(default)]
    total: u32,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ItemSummary {
    item_id: String,
    #[serde(default)]
    title: String,
    short_description: Option<String>,
    price: Option<Amount>,
    image: Option<Image>,
    item_web_url: Option<String>,
    #[serde(default)]
    estimated_availabilities: Vec<Availability>,
}

impl ItemSummary {
    fn into_listing(self) -> MarketplaceListing {
        MarketplaceListing {
            item_id: self.item_id,
            title: self.title,
            description: self.short_description.unwrap_or_default(),
            price_cents: self.price.as_ref().and_then(|p| parse_price_cents(&p.value)),
            currency: self.price.and_then(|p| p.currency),
            image_url: self.image.and_then(|i| i.image_url),
            quantity: self
                .estimated_availabilities
                .into_iter()
                .find_map(|a| a.estimated_available_quantity),
            url: self.item_web_url,
        }
    }
}

#[derive(Deserialize)]
struct Amount {
    value: String,
    currency: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Image {
    image_url: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Availability {
    estimated_available_quantity: Option<i64>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct InventoryResponse {
    #[serde(default)]
    inventory_items: Vec<InventoryItem>,
    #[serde(default)]
    total: u32,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct InventoryItem {
    sku: String,
    product: Option<InventoryProduct>,
    availability: Option<InventoryAvailability>,
}

impl InventoryItem {
    fn into_listing(self) -> MarketplaceListing {
        let product = self.product.unwrap_or_default();
        MarketplaceListing {
            item_id: self.sku,
            title: product.title,
            description: product.description,
            price_cents: None,
            currency: None,
            image_url: product.image_urls.into_iter().next(),
            quantity: self
                .availability
                .and_then(|a| a.ship_to_location_availability)
                .and_then(|s| s.quantity),
            url: None,
        }
    }
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct InventoryProduct {
    #[serde(default)]
    title: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    image_urls: Vec<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct InventoryAvailability {
    ship_to_location_availability: Option<ShipToLocation>,
}

#[derive(Deserialize)]
struct ShipToLocation {
    quantity: Option<i64>,
}
