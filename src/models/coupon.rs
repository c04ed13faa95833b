use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A coupon accepted for one branch of the current checkout.
///
/// Created on successful validation, reset on a failed one. Never carried
/// across branches or checkout sessions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppliedCoupon {
    /// Uppercased at creation.
    pub code: String,
    pub discount: Decimal,
    pub applied: bool,
}

impl AppliedCoupon {
    pub fn accepted(code: &str, discount: Decimal) -> Self {
        Self {
            code: code.trim().to_uppercase(),
            discount,
            applied: true,
        }
    }

    pub fn rejected(code: &str) -> Self {
        Self {
            code: code.trim().to_uppercase(),
            discount: Decimal::ZERO,
            applied: false,
        }
    }
}

/// Per-branch coupon state for one checkout session, keyed by branch id.
///
/// Deliberately not a single shared code string: the same input applied to
/// two branches is validated and stored independently for each.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CouponBook {
    coupons: HashMap<String, AppliedCoupon>,
}

impl CouponBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, branch_id: &str, coupon: AppliedCoupon) {
        self.coupons.insert(branch_id.to_string(), coupon);
    }

    pub fn get(&self, branch_id: &str) -> Option<&AppliedCoupon> {
        self.coupons.get(branch_id)
    }

    /// Discount to apply to the branch; zero when no coupon is applied.
    pub fn discount_for(&self, branch_id: &str) -> Decimal {
        self.coupons
            .get(branch_id)
            .filter(|c| c.applied)
            .map(|c| c.discount)
            .unwrap_or(Decimal::ZERO)
    }

    pub fn clear(&mut self) {
        self.coupons.clear();
    }
}
