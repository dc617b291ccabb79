//! JSON and CSV snapshot files.
//!
//! Both files are overwritten in place on every sync.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{MarketplaceError, MarketplaceListing};

pub const JSON_FILE: &str = "ebay_listings.json";
pub const CSV_FILE: &str = "ebay_listings.csv";

/// Contents of the JSON snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub fetched_at: DateTime<Utc>,
    pub source: String,
    pub listings: Vec<MarketplaceListing>,
}

/// Where a snapshot was written.
#[derive(Debug, Clone)]
pub struct SnapshotPaths {
    pub json: PathBuf,
    pub csv: PathBuf,
}

/// Flat CSV row; column order follows field order.
#[derive(Serialize)]
struct CsvRow<'a> {
    item_id: &'a str,
    title: &'a str,
    description: &'a str,
    price_cents: Option<i64>,
    currency: Option<&'a str>,
    image_url: Option<&'a str>,
    quantity: Option<i64>,
    url: Option<&'a str>,
}

impl<'a> From<&'a MarketplaceListing> for CsvRow<'a> {
    fn from(listing: &'a MarketplaceListing) -> Self {
        Self {
            item_id: &listing.item_id,
            title: &listing.title,
            description: &listing.description,
            price_cents: listing.price_cents,
            currency: listing.currency.as_deref(),
            image_url: listing.image_url.as_deref(),
            quantity: listing.quantity,
            url: listing.url.as_deref(),
        }
    }
}

fn encode_csv(listings: &[MarketplaceListing]) -> Result<Vec<u8>, MarketplaceError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    if listings.is_empty() {
        writer.write_record([
            "item_id",
            "title",
            "description",
            "price_cents",
            "currency",
            "image_url",
            "quantity",
            "url",
        ])?;
    }
    for listing in listings {
        writer.serialize(CsvRow::from(listing))?;
    }
    writer
        .into_inner()
        .map_err(|e| MarketplaceError::Io(std::io::Error::other(e.to_string())))
}

/// Write `<dir>/ebay_listings.json` and `<dir>/ebay_listings.csv`, creating
/// the directory if needed.
pub async fn write_snapshot(dir: &Path, snapshot: &Snapshot) -> Result<SnapshotPaths, MarketplaceError> {
    tokio::fs::create_dir_all(dir).await?;

    let paths = SnapshotPaths {
        json: dir.join(JSON_FILE),
        csv: dir.join(CSV_FILE),
    };

    let json = serde_json::to_vec_pretty(snapshot)?;
    tokio::fs::write(&paths.json, json).await?;

    let listings = snapshot.listings.clone();
    let csv = tokio::task::spawn_blocking(move || encode_csv(&listings))
        .await
        .map_err(|e| MarketplaceError::Io(std::io::Error::other(e)))??;
    tokio::fs::write(&paths.csv, csv).await?;

    tracing::info!(
        json = %paths.json.display(),
        csv = %paths.csv.display(),
        listings = snapshot.listings.len(),
        "Wrote marketplace snapshot"
    );

    Ok(paths)
}

/// Read the JSON snapshot; `None` when no sync has written one yet.
pub async fn read_snapshot(dir: &Path) -> Result<Option<Snapshot>, MarketplaceError> {
    match tokio::fs::read(dir.join(JSON_FILE)).await {
        Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}
