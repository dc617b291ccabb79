//! Marketplace Service
//!
//! Sync listings from eBay into the snapshot files and import snapshot items
//! into the catalog.
//!
//! Imports are item by item: each listing either creates a product, updates
//! the product previously imported from it (matched on external id), or is
//! reported as a failure. Nothing is rolled back.

use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::{CategoryRepository, NewProduct, ProductRepository};
use crate::infrastructure::marketplace::{
    read_snapshot, write_snapshot, ListingSources, MarketplaceError, MarketplaceListing, Snapshot,
};
use crate::infrastructure::metrics;
use crate::shared::error::AppError;

/// Outcome of a sync run.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncReport {
    pub source: String,
    pub fetched_at: DateTime<Utc>,
    pub count: usize,
    pub json_path: String,
    pub csv_path: String,
}

/// Latest snapshot contents; empty before the first sync.
#[derive(Debug, Clone, Serialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ListingsView {
    pub fetched_at: Option<DateTime<Utc>>,
    pub source: Option<String>,
    pub listings: Vec<MarketplaceListing>,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ImportFailure {
    pub item_id: String,
    pub error: String,
}

/// Per-item import results.
#[derive(Debug, Clone, Serialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ImportReport {
    pub imported: usize,
    pub updated: usize,
    pub failed: Vec<ImportFailure>,
}

#[derive(Debug, thiserror::Error)]
pub enum MarketplaceServiceError {
    #[error("Marketplace sync is not configured")]
    NotConfigured,

    #[error("No marketplace snapshot yet; run a sync first")]
    NoSnapshot,

    #[error("Category not found")]
    CategoryNotFound,

    #[error(transparent)]
    Marketplace(#[from] MarketplaceError),

    #[error(transparent)]
    Store(#[from] AppError),
}

impl From<MarketplaceServiceError> for AppError {
    fn from(err: MarketplaceServiceError) -> Self {
        match err {
            MarketplaceServiceError::NotConfigured => AppError::Unavailable(err.to_string()),
            MarketplaceServiceError::NoSnapshot | MarketplaceServiceError::CategoryNotFound => {
                AppError::NotFound(err.to_string())
            }
            MarketplaceServiceError::Marketplace(
                e @ (MarketplaceError::Io(_) | MarketplaceError::Json(_) | MarketplaceError::Csv(_)),
            ) => AppError::Internal(e.to_string()),
            MarketplaceServiceError::Marketplace(e) => AppError::Upstream(e.to_string()),
            MarketplaceServiceError::Store(e) => e,
        }
    }
}

/// Marketplace service trait
#[async_trait]
pub trait MarketplaceService: Send + Sync {
    /// Fetch listings (primary, then fallback) and overwrite the snapshots
    async fn sync(&self) -> Result<SyncReport, MarketplaceServiceError>;

    /// Contents of the latest snapshot
    async fn listings(&self) -> Result<ListingsView, MarketplaceServiceError>;

    /// Import snapshot items, optionally only `item_ids`, into `category_id`
    async fn import(
        &self,
        item_ids: Option<Vec<String>>,
        category_id: Option<i64>,
    ) -> Result<ImportReport, MarketplaceServiceError>;
}

/// MarketplaceService implementation
pub struct MarketplaceServiceImpl<R>
where
    R: ProductRepository + CategoryRepository,
{
    repo: Arc<R>,
    sources: Option<ListingSources>,
    snapshot_dir: PathBuf,
}

enum ImportOutcome {
    Created,
    Updated,
}

impl<R> MarketplaceServiceImpl<R>
where
    R: ProductRepository + CategoryRepository,
{
    pub fn new(repo: Arc<R>, sources: Option<ListingSources>, snapshot_dir: impl Into<PathBuf>) -> Self {
        Self {
            repo,
            sources,
            snapshot_dir: snapshot_dir.into(),
        }
    }

    async fn import_one(
        &self,
        listing: &MarketplaceListing,
        category_id: Option<i64>,
    ) -> Result<ImportOutcome, String> {
        let title = listing.title.trim();
        if title.is_empty() {
            return Err("missing title".into());
        }
        let price = listing.price_cents.ok_or("missing price")?;

        let existing = self
            .repo
            .find_by_external_id(&listing.item_id)
            .await
            .map_err(|e| e.to_string())?;

        match existing {
            Some(mut product) => {
                product.title = title.to_string();
                product.description = listing.description.clone();
                product.price = price;
                if let Some(image_url) = &listing.image_url {
                    product.image_url = image_url.clone();
                }
                if category_id.is_some() {
                    product.category_id = category_id;
                }
                self.repo
                    .update_product(&product)
                    .await
                    .map_err(|e| e.to_string())?;
                Ok(ImportOutcome::Updated)
            }
            None => {
                self.repo
                    .create_product(NewProduct {
                        title: title.to_string(),
                        description: listing.description.clone(),
                        image_url: listing.image_url.clone().unwrap_or_default(),
                        price,
                        category_id,
                        external_id: Some(listing.item_id.clone()),
                    })
                    .await
                    .map_err(|e| e.to_string())?;
                Ok(ImportOutcome::Created)
            }
        }
    }
}

#[async_trait]
impl<R> MarketplaceService for MarketplaceServiceImpl<R>
where
    R: ProductRepository + CategoryRepository + 'static,
{
    async fn sync(&self) -> Result<SyncReport, MarketplaceServiceError> {
        let sources = self
            .sources
            .as_ref()
            .ok_or(MarketplaceServiceError::NotConfigured)?;

        let fetched = match sources.fetch().await {
            Ok(fetched) => fetched,
            Err(e) => {
                metrics::record_marketplace_sync("none", "failure");
                tracing::error!(error = %e, "Marketplace sync failed");
                return Err(e.into());
            }
        };

        let snapshot = Snapshot {
            fetched_at: Utc::now(),
            source: fetched.source.to_string(),
            listings: fetched.listings,
        };
        let paths = write_snapshot(&self.snapshot_dir, &snapshot).await?;

        metrics::record_marketplace_sync(fetched.source, "success");
        tracing::info!(source = fetched.source, count = snapshot.listings.len(), "Marketplace sync finished");

        Ok(SyncReport {
            source: snapshot.source,
            fetched_at: snapshot.fetched_at,
            count: snapshot.listings.len(),
            json_path: paths.json.display().to_string(),
            csv_path: paths.csv.display().to_string(),
        })
    }

    async fn listings(&self) -> Result<ListingsView, MarketplaceServiceError> {
        Ok(read_snapshot(&self.snapshot_dir)
            .await?
            .map(|s| ListingsView {
                fetched_at: Some(s.fetched_at),
                source: Some(s.source),
                listings: s.listings,
            })
            .unwrap_or_default())
    }

    async fn import(
        &self,
        item_ids: Option<Vec<String>>,
        category_id: Option<i64>,
    ) -> Result<ImportReport, MarketplaceServiceError> {
        if let Some(id) = category_id {
            self.repo
                .find_category(id)
                .await?
                .ok_or(MarketplaceServiceError::CategoryNotFound)?;
        }

        let snapshot = read_snapshot(&self.snapshot_dir)
            .await?
            .ok_or(MarketplaceServiceError::NoSnapshot)?;

        let wanted: Option<HashSet<String>> = item_ids.as_ref().map(|ids| ids.iter().cloned().collect());
        let mut report = ImportReport::default();

        for listing in snapshot
            .listings
            .iter()
            .filter(|l| wanted.as_ref().map_or(true, |w| w.contains(&l.item_id)))
        {
            match self.import_one(listing, category_id).await {
                Ok(ImportOutcome::Created) => report.imported += 1,
                Ok(ImportOutcome::Updated) => report.updated += 1,
                Err(error) => report.failed.push(ImportFailure {
                    item_id: listing.item_id.clone(),
                    error,
                }),
            }
        }

        if let Some(ids) = item_ids {
            let present: HashSet<&str> = snapshot.listings.iter().map(|l| l.item_id.as_str()).collect();
            let mut reported = HashSet::new();
            for id in ids {
                if !present.contains(id.as_str()) && reported.insert(id.clone()) {
                    report.failed.push(ImportFailure {
                        item_id: id,
                        error: "not found in snapshot".into(),
                    });
                }
            }
        }

        tracing::info!(
            imported = report.imported,
            updated = report.updated,
            failed = report.failed.len(),
            "Marketplace import finished"
        );
        Ok(report)
    }
}
