use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::cart::VariantRef;

/// The authenticated buyer, passed into settlement explicitly rather than
/// read from ambient session state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Buyer {
    pub id: Uuid,
    pub display_name: String,
}

/// Buyer-global shipping details, validated before any branch is touched.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ShippingInfo {
    #[validate(length(min = 1, message = "Full name is required"))]
    pub full_name: String,
    #[validate(length(min = 1, message = "Phone number is required"))]
    pub phone: String,
    #[validate(length(min = 1, message = "Email is required"))]
    pub email: String,
    #[validate(length(min = 1, message = "Address is required"))]
    pub address_line: String,
    #[validate(length(min = 1, message = "City is required"))]
    pub city: String,
    pub postal_code: Option<String>,
    #[validate(length(min = 1, message = "Country is required"))]
    pub country: String,
}

/// Per-branch monetary breakdown. See [`crate::services::pricing`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricingBreakdown {
    pub subtotal: Decimal,
    pub discount: Decimal,
    pub shipping: Decimal,
    pub taxable_amount: Decimal,
    pub tax_rate: Decimal,
    pub tax_amount: Decimal,
    pub final_amount: Decimal,
}

/// One line of a submitted order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderLine {
    pub product_id: Uuid,
    pub name: String,
    pub unit_price: Decimal,
    pub quantity: u32,
    pub variant: VariantRef,
}

/// Payment details attached to a submission. Fields are populated from the
/// selected provider's config; all empty for cash on delivery.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PaymentDetails {
    pub account_title: Option<String>,
    pub account_number: Option<String>,
    pub instructions: Option<String>,
    pub transaction_id: Option<String>,
}

/// One order per branch, created exactly once per successful settlement
/// attempt and immutable once submitted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderSubmission {
    pub buyer_id: Uuid,
    pub branch_id: String,
    pub seller_name: String,
    pub lines: Vec<OrderLine>,
    pub totals: PricingBreakdown,
    pub currency: String,
    pub shipping: ShippingInfo,
    pub payment_method: String,
    pub payment_details: PaymentDetails,
    pub submitted_at: DateTime<Utc>,
}
