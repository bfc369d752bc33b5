//! Money calculation utilities using rust_decimal for precision
//!
//! All sums are done in `Decimal`, then converted back to `f64` (2dp,
//! half away from zero) for storage.

use super::error::{OrderError, OrderResult};
use crate::utils::validation::{MAX_AMOUNT, MAX_QUANTITY};
use rust_decimal::prelude::*;
use shared::order::{LineItem, NewOrder};

const DECIMAL_PLACES: u32 = 2;

/// Convert f64 to Decimal for calculation
#[inline]
pub fn to_decimal(value: f64) -> Decimal {
    Decimal::from_f64(value).unwrap_or_default()
}

/// Convert Decimal back to f64 for storage, rounded to 2 decimal places
#[inline]
pub fn to_f64(value: Decimal) -> f64 {
    value
        .round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
        .to_f64()
        .unwrap_or_default()
}

/// Round an f64 money value to 2dp
pub fn round_money(value: f64) -> f64 {
    to_f64(to_decimal(value))
}

/// Sum a sequence of money values exactly
pub fn sum_money(values: impl IntoIterator<Item = f64>) -> f64 {
    to_f64(values.into_iter().map(to_decimal).sum())
}

fn require_money(value: f64, field: &str) -> OrderResult<()> {
    if !value.is_finite() {
        return Err(OrderError::InvalidDetails(format!(
            "{} must be a finite number, got {}",
            field, value
        )));
    }
    if value < 0.0 {
        return Err(OrderError::InvalidDetails(format!(
            "{} must be non-negative, got {}",
            field, value
        )));
    }
    if value > MAX_AMOUNT {
        return Err(OrderError::InvalidDetails(format!(
            "{} exceeds maximum allowed ({}), got {}",
            field, MAX_AMOUNT, value
        )));
    }
    Ok(())
}

/// Validate one line item
pub fn validate_line_item(item: &LineItem) -> OrderResult<()> {
    if item.id.trim().is_empty() {
        return Err(OrderError::InvalidDetails("item id must not be empty".into()));
    }
    if item.name.trim().is_empty() {
        return Err(OrderError::InvalidDetails(format!(
            "item {} has no name",
            item.id
        )));
    }
    require_money(item.unit_price, "unit_price")?;
    if item.quantity == 0 {
        return Err(OrderError::InvalidDetails(format!(
            "quantity must be positive, got {}",
            item.quantity
        )));
    }
    if item.quantity > MAX_QUANTITY {
        return Err(OrderError::InvalidDetails(format!(
            "quantity exceeds maximum allowed ({}), got {}",
            MAX_QUANTITY, item.quantity
        )));
    }
    Ok(())
}

/// Validate the monetary part of a new order
pub fn validate_new_order(input: &NewOrder) -> OrderResult<()> {
    if input.items.is_empty() {
        return Err(OrderError::InvalidDetails(
            "an order needs at least one line item".into(),
        ));
    }
    for item in &input.items {
        validate_line_item(item)?;
    }
    require_money(input.delivery_fee, "delivery_fee")?;
    require_money(input.tip, "tip")?;
    Ok(())
}

/// Σ unit_price × quantity
pub fn calculate_subtotal(items: &[LineItem]) -> f64 {
    let total: Decimal = items
        .iter()
        .map(|item| to_decimal(item.unit_price) * Decimal::from(item.quantity))
        .sum();
    to_f64(total)
}
