//! Sticker pricing domain service.
//!
//! All arithmetic is in integer cents; multipliers and discounts are basis
//! points (10_000 = 100%).

use serde::Serialize;
use serde_json::Value;

use crate::domain::entities::{OptionType, ProductOption};

const BASIS_POINTS: i64 = 10_000;

/// Quantity discount tiers, highest first: (minimum quantity, basis points).
const QUANTITY_TIERS: [(i32, i64); 5] = [
    (1000, 3_000),
    (500, 2_500),
    (250, 2_000),
    (100, 1_500),
    (50, 1_000),
];

/// Price breakdown for one configured line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceQuote {
    pub unit_price: i64,
    pub quantity: i32,
    pub subtotal: i64,
    pub discount_percent: u8,
    pub discount: i64,
    pub total: i64,
}

/// Sum of several quotes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceTotals {
    pub subtotal: i64,
    pub discount: i64,
    pub total: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PricingError {
    #[error("Quantity must be at least 1")]
    InvalidQuantity,

    #[error("Unknown {option_type} option: {value}")]
    UnknownOption { option_type: OptionType, value: String },

    #[error("{option_type} option {value} is out of stock")]
    OutOfStock { option_type: OptionType, value: String },
}

/// Domain service for quoting sticker prices.
pub struct PricingService;

impl PricingService {
    /// Multiplier applied to the base price for a material, in basis points.
    pub fn material_multiplier(material: Option<&str>) -> i64 {
        match material.map(|m| m.trim().to_lowercase()).as_deref() {
            Some("clear") | Some("transparent") => 11_000,
            Some("glitter") => 12_000,
            Some("holographic") => 12_500,
            Some("mirror") | Some("chrome") => 13_000,
            _ => BASIS_POINTS,
        }
    }

    /// Discount on the line subtotal for a quantity, in basis points.
    pub fn quantity_discount(quantity: i32) -> i64 {
        QUANTITY_TIERS
            .iter()
            .find(|(min, _)| quantity >= *min)
            .map(|(_, bp)| *bp)
            .unwrap_or(0)
    }

    /// Match a selection blob against a product's options.
    ///
    /// The selection is an object keyed by option type. Keys that are not
    /// option types (e.g. `customDesignUrl`) and non-string values are
    /// ignored, as is a selection that is not an object.
    pub fn resolve_options<'a>(
        options: &'a [ProductOption],
        selection: &Value,
    ) -> Result<Vec<&'a ProductOption>, PricingError> {
        let Some(map) = selection.as_object() else {
            return Ok(Vec::new());
        };

        let mut selected = Vec::new();
        for (key, value) in map {
            let (Some(option_type), Some(value)) = (OptionType::parse(key), value.as_str()) else {
                continue;
            };

            let option = options
                .iter()
                .find(|o| o.option_type == option_type && o.value.eq_ignore_ascii_case(value))
                .ok_or_else(|| PricingError::UnknownOption {
                    option_type,
                    value: value.to_string(),
                })?;

            if !option.in_stock {
                return Err(PricingError::OutOfStock {
                    option_type,
                    value: option.value.clone(),
                });
            }
            selected.push(option);
        }

        Ok(selected)
    }

    /// Quote a line: base price scaled by the material multiplier, plus
    /// option modifiers, times quantity, minus the quantity discount.
    pub fn quote(
        base_price: i64,
        selected: &[&ProductOption],
        quantity: i32,
    ) -> Result<PriceQuote, PricingError> {
        if quantity < 1 {
            return Err(PricingError::InvalidQuantity);
        }

        let material = selected
            .iter()
            .find(|o| o.option_type == OptionType::Material)
            .map(|o| o.value.as_str());
        let scaled_base = Self::apply_basis_points(base_price.max(0), Self::material_multiplier(material));
        let modifiers: i64 = selected.iter().map(|o| o.price_modifier).sum();
        let unit_price = (scaled_base + modifiers).max(0);

        let subtotal = unit_price * i64::from(quantity);
        let discount_bp = Self::quantity_discount(quantity);
        let discount = Self::apply_basis_points(subtotal, discount_bp);

        Ok(PriceQuote {
            unit_price,
            quantity,
            subtotal,
            discount_percent: (discount_bp / 100) as u8,
            discount,
            total: subtotal - discount,
        })
    }

    /// Resolve a selection and quote it in one step.
    pub fn quote_selection(
        base_price: i64,
        options: &[ProductOption],
        selection: &Value,
        quantity: i32,
    ) -> Result<PriceQuote, PricingError> {
        let selected = Self::resolve_options(options, selection)?;
        Self::quote(base_price, &selected, quantity)
    }

    /// Sum line quotes into cart totals.
    pub fn totals<'a>(quotes: impl IntoIterator<Item = &'a PriceQuote>) -> PriceTotals {
        quotes.into_iter().fold(PriceTotals::default(), |acc, q| PriceTotals {
            subtotal: acc.subtotal + q.subtotal,
            discount: acc.discount + q.discount,
            total: acc.total + q.total,
        })
    }

    /// Round-half-up `amount * bp / 10_000` for non-negative amounts.
    fn apply_basis_points(amount: i64, bp: i64) -> i64 {
        (amount * bp + BASIS_POINTS / 2) / BASIS_POINTS
    }
}
