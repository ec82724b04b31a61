//! Decimal arithmetic for line items and document totals.
//!
//! All rounding is banker's rounding (`MidpointNearestEven`) to two decimal
//! places. Totals are only ever produced by [`recompute`].

use crate::errors::ServiceError;
use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use serde::Serialize;
use utoipa::ToSchema;

pub const MONEY_SCALE: u32 = 2;
pub const QUANTITY_SCALE: u32 = 3;

pub fn round_money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(MONEY_SCALE, RoundingStrategy::MidpointNearestEven)
}

/// `quantity × unit_price`, rounded to cents.
pub fn line_total(quantity: Decimal, unit_price: Decimal) -> Decimal {
    round_money(quantity * unit_price)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct Totals {
    pub subtotal: Decimal,
    pub vat_amount: Decimal,
    pub total: Decimal,
}

impl Totals {
    pub fn zero() -> Self {
        Self {
            subtotal: round_money(Decimal::ZERO),
            vat_amount: round_money(Decimal::ZERO),
            total: round_money(Decimal::ZERO),
        }
    }
}

/// Derives subtotal, VAT and total from the current line totals.
pub fn recompute<I>(line_totals: I, vat_rate: Decimal) -> Totals
where
    I: IntoIterator<Item = Decimal>,
{
    let subtotal = round_money(line_totals.into_iter().sum::<Decimal>());
    let vat_amount = round_money(subtotal * vat_rate / dec!(100));
    Totals {
        subtotal,
        vat_amount,
        total: subtotal + vat_amount,
    }
}

fn decimal_places(value: Decimal) -> u32 {
    value.normalize().scale()
}

/// Quantities must be positive with at most three decimals.
pub fn validate_quantity(quantity: Decimal) -> Result<(), ServiceError> {
    if quantity <= Decimal::ZERO {
        return Err(ServiceError::validation(format!(
            "quantity must be greater than zero, got {}",
            quantity
        )));
    }
    if decimal_places(quantity) > QUANTITY_SCALE {
        return Err(ServiceError::validation(format!(
            "quantity {} has more than {} decimal places",
            quantity, QUANTITY_SCALE
        )));
    }
    Ok(())
}

pub fn validate_unit_price(price: Decimal) -> Result<(), ServiceError> {
    if price < Decimal::ZERO {
        return Err(ServiceError::validation(format!(
            "unit price must not be negative, got {}",
            price
        )));
    }
    if decimal_places(price) > MONEY_SCALE {
        return Err(ServiceError::validation(format!(
            "unit price {} has more than {} decimal places",
            price, MONEY_SCALE
        )));
    }
    Ok(())
}

pub fn validate_vat_rate(rate: Decimal) -> Result<(), ServiceError> {
    if rate < Decimal::ZERO || rate > dec!(100) {
        return Err(ServiceError::validation(format!(
            "vat rate must be between 0 and 100, got {}",
            rate
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn two_item_invoice_at_twenty_percent() {
        let lines = [
            line_total(dec!(2), dec!(100.00)),
            line_total(dec!(1), dec!(50.00)),
        ];
        let totals = recompute(lines, dec!(20));
        assert_eq!(totals.subtotal, dec!(250.00));
        assert_eq!(totals.vat_amount, dec!(50.00));
        assert_eq!(totals.total, dec!(300.00));
    }

    #[test]
    fn line_total_uses_bankers_rounding() {
        // 0.125 and 0.135 sit exactly on the midpoint
        assert_eq!(line_total(dec!(0.5), dec!(0.25)), dec!(0.12));
        assert_eq!(line_total(dec!(0.5), dec!(0.27)), dec!(0.14));
        assert_eq!(line_total(dec!(1.5), dec!(0.01)), dec!(0.02));
    }

    #[test]
    fn vat_is_rounded_after_summing() {
        let totals = recompute([dec!(0.05), dec!(0.05)], dec!(25));
        assert_eq!(totals.subtotal, dec!(0.10));
        assert_eq!(totals.vat_amount, dec!(0.02));
        assert_eq!(totals.total, dec!(0.12));
    }

    #[test]
    fn empty_item_set_is_all_zero() {
        assert_eq!(recompute(Vec::new(), dec!(20)), Totals::zero());
    }

    #[test]
    fn quantity_rules() {
        assert!(validate_quantity(dec!(1.125)).is_ok());
        assert!(validate_quantity(dec!(2.5000)).is_ok());
        assert_matches!(validate_quantity(dec!(0)), Err(ServiceError::ValidationError(_)));
        assert_matches!(validate_quantity(dec!(-1)), Err(ServiceError::ValidationError(_)));
        assert_matches!(
            validate_quantity(dec!(1.0001)),
            Err(ServiceError::ValidationError(_))
        );
    }

    #[test]
    fn price_and_rate_rules() {
        assert!(validate_unit_price(dec!(0)).is_ok());
        assert!(validate_unit_price(dec!(19.90)).is_ok());
        assert!(validate_unit_price(dec!(-0.01)).is_err());
        assert!(validate_unit_price(dec!(1.001)).is_err());

        assert!(validate_vat_rate(dec!(0)).is_ok());
        assert!(validate_vat_rate(dec!(100)).is_ok());
        assert!(validate_vat_rate(dec!(100.01)).is_err());
    }
}
