//! Booking price calculation using rust_decimal for precision
//!
//! `total = max(0, nights*rate - promoDiscount - voucherDiscount) + sum(addon.qty * addon.price)`
//!
//! At most one promotion (percentage, unit-scoped, window must cover the
//! stay — validated by the caller) and at most one voucher (amount or
//! percentage) apply. Amount vouchers are clamped so the room subtotal never
//! goes negative. Add-ons are charged after the clamp. Amounts are VND, so
//! totals round to whole units.

use rust_decimal::Decimal;
use rust_decimal::prelude::*;
use shared::models::{Promotion, Voucher, VoucherKind};

/// One selected add-on service line
#[derive(Debug, Clone)]
pub struct AddonLine {
    pub service_id: i64,
    pub quantity: i32,
    pub unit_price: Decimal,
}

/// Itemized price quote for a stay
#[derive(Debug, Clone, PartialEq)]
pub struct PriceQuote {
    pub room_subtotal: Decimal,
    pub promo_discount: Decimal,
    pub voucher_discount: Decimal,
    pub addons_total: Decimal,
    pub total: Decimal,
}

const HUNDRED: Decimal = Decimal::from_parts(100, 0, 0, false, 0);

/// Compute the price for a stay.
///
/// `promotion` must already be validated to cover the stay window;
/// `voucher` must already be validated as redeemable.
pub fn quote(
    nightly_rate: Decimal,
    nights: i64,
    promotion: Option<&Promotion>,
    voucher: Option<&Voucher>,
    addons: &[AddonLine],
) -> PriceQuote {
    let room_subtotal = nightly_rate * Decimal::from(nights);

    let promo_discount = promotion
        .map(|p| room_subtotal * p.discount_percent / HUNDRED)
        .unwrap_or(Decimal::ZERO);

    let after_promo = room_subtotal - promo_discount;

    let voucher_discount = match voucher {
        Some(v) => match v.kind() {
            // Amount vouchers clamp at the remaining room price
            Some(VoucherKind::Amount) => v.value.min(after_promo),
            Some(VoucherKind::Percent) => after_promo * v.value / HUNDRED,
            None => Decimal::ZERO,
        },
        None => Decimal::ZERO,
    };

    let addons_total: Decimal = addons
        .iter()
        .map(|a| a.unit_price * Decimal::from(a.quantity))
        .sum();

    let total = (after_promo - voucher_discount).max(Decimal::ZERO) + addons_total;

    PriceQuote {
        room_subtotal,
        promo_discount,
        voucher_discount,
        addons_total,
        total: total.round_dp(0),
    }
}

#[cfg(test)]
mod tests;
