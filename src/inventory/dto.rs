use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::inventory::repo_types::Product;

/// Request body for creating or fully replacing a product.
#[derive(Debug, Clone, Deserialize)]
pub struct ProductInput {
    pub name: String,
    pub description: String,
    pub category: String,
    pub price: Decimal,
    pub quantity: i64,
}

/// Request body for the stock mutations; the delta must be non-negative.
#[derive(Debug, Deserialize)]
pub struct StockAdjustment {
    pub quantity: i64,
}

/// Query parameters for the low-stock report.
#[derive(Debug, Deserialize)]
pub struct LowStockParams {
    pub threshold: i64,
}

/// Response returned by product mutations.
#[derive(Debug, Serialize)]
pub struct ProductResponse {
    pub message: String,
    pub product: Product,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}
