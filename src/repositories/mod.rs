//! Collaborator boundaries consumed by the settlement core.
//!
//! Everything behind these traits lives elsewhere (seller directory, country
//! payment registry, coupon backend, order storage). The core only depends on
//! the contracts below.

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::SettlementError;
use crate::models::order::OrderSubmission;
use crate::models::seller::Seller;

/// A payment method approved for a country, as the registry reports it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistryMethod {
    pub name: String,
    pub enabled: bool,
}

/// Result of validating a coupon code against one branch and its subtotal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CouponValidation {
    pub is_valid: bool,
    /// Zero when invalid; never exceeds the subtotal it was validated against.
    pub discount: Decimal,
    pub message: String,
}

/// Seller lookup by branch id.
#[async_trait]
pub trait SellerDirectory: Send + Sync {
    /// `Ok(None)` when the branch has no seller record; the resolver turns
    /// that into an empty-config context rather than failing the checkout.
    async fn get_seller(&self, branch_id: &str) -> Result<Option<Seller>, SettlementError>;
}

/// Country-level registry of approved payment methods.
#[async_trait]
pub trait PaymentMethodRegistry: Send + Sync {
    async fn get_country_methods(
        &self,
        country: &str,
    ) -> Result<Vec<RegistryMethod>, SettlementError>;
}

/// Coupon validation backend. Validation is strictly per branch: a code's
/// acceptance for one branch says nothing about any other.
#[async_trait]
pub trait CouponService: Send + Sync {
    async fn validate(
        &self,
        code: &str,
        branch_id: &str,
        branch_subtotal: Decimal,
    ) -> Result<CouponValidation, SettlementError>;
}

/// Order storage. One write per branch; writes are independent, there is no
/// cross-branch transaction.
#[async_trait]
pub trait OrderRepository: Send + Sync {
    async fn create_order(&self, submission: &OrderSubmission) -> Result<Uuid, SettlementError>;
}
