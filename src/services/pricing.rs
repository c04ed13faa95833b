//! Per-branch pricing. Pure and deterministic: every monetary field of a
//! branch's settlement derives from its line items, coupon discount, delivery
//! fee, and tax rate, in a fixed order.

use rust_decimal::Decimal;

use crate::models::cart::CartLineItem;
use crate::models::order::PricingBreakdown;

/// Computes a branch's monetary breakdown.
///
/// Tax applies to the post-discount, post-shipping taxable base, never the
/// raw subtotal:
///
/// ```text
/// subtotal       = Σ unit_price × quantity
/// taxable_amount = (subtotal − discount) + delivery_fee
/// tax_amount     = taxable_amount × tax_rate / 100
/// final_amount   = taxable_amount + tax_amount
/// ```
///
/// The discount must not exceed the subtotal; the coupon validator's contract
/// guarantees it, and this function does not clamp.
pub fn price_branch(
    items: &[&CartLineItem],
    discount: Decimal,
    delivery_fee: Decimal,
    tax_rate: Decimal,
) -> PricingBreakdown {
    let subtotal: Decimal = items.iter().map(|l| l.line_total()).sum();
    debug_assert!(
        discount <= subtotal,
        "coupon validator must never accept a discount above the subtotal"
    );

    let taxable_amount = (subtotal - discount) + delivery_fee;
    let tax_amount = taxable_amount * tax_rate / Decimal::from(100);
    let final_amount = taxable_amount + tax_amount;

    PricingBreakdown {
        subtotal,
        discount,
        shipping: delivery_fee,
        taxable_amount,
        tax_rate,
        tax_amount,
        final_amount,
    }
}
