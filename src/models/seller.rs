use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use strum::Display;

/// How a payment option is fulfilled.
#[derive(Debug, Clone, Serialize, Deserialize, Display)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PaymentConfigKind {
    /// Bank or wallet transfer; the buyer pays first and submits the
    /// transaction reference with the order.
    AccountTransfer {
        account_title: String,
        account_number: String,
        instructions: Option<String>,
    },
    /// Cash on delivery: no transaction reference required.
    CashOnDelivery,
}

/// A payment option declared by a seller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentConfig {
    pub provider_id: String,
    pub provider_name: String,
    pub enabled: bool,
    pub kind: PaymentConfigKind,
}

impl PaymentConfig {
    /// Case- and space-insensitive cash-on-delivery check on the display name.
    pub fn is_cash_on_delivery(&self) -> bool {
        matches!(self.kind, PaymentConfigKind::CashOnDelivery)
            || crate::models::payment::is_cod_name(&self.provider_name)
    }
}

/// A seller record as the directory returns it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Seller {
    pub branch_id: String,
    pub display_name: String,
    /// Operating country; `None` falls back to the configured default during
    /// registry lookup.
    pub country: Option<String>,
    pub delivery_fee: Decimal,
    /// Percentage, e.g. `10` for 10%.
    pub tax_rate: Decimal,
    pub suspended_until: Option<DateTime<Utc>>,
    pub payment_configs: Vec<PaymentConfig>,
}

/// Where the country used for the registry lookup came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CountrySource {
    Declared,
    /// The seller had no country on record; the configured default was used.
    /// Surfaced so seller tooling can flag the misconfiguration.
    Defaulted,
}

/// Per-branch snapshot assembled at checkout time.
///
/// A read-only derived view: recomputed whenever the cart's branch set or the
/// buyer's registry changes, never persisted. `payment_configs` holds only
/// methods enabled by the seller AND enabled in the country registry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BranchSettlementContext {
    pub branch_id: String,
    pub seller_name: String,
    pub delivery_fee: Decimal,
    pub tax_rate: Decimal,
    pub is_suspended: bool,
    pub suspended_until: Option<DateTime<Utc>>,
    pub country_source: CountrySource,
    pub payment_configs: Vec<PaymentConfig>,
}

impl BranchSettlementContext {
    /// Placeholder for a branch whose seller could not be resolved. Renders
    /// as "no payment methods enabled" rather than failing the checkout.
    pub fn unresolved(branch_id: &str) -> Self {
        Self {
            branch_id: branch_id.to_string(),
            seller_name: branch_id.to_string(),
            delivery_fee: Decimal::ZERO,
            tax_rate: Decimal::ZERO,
            is_suspended: false,
            suspended_until: None,
            country_source: CountrySource::Defaulted,
            payment_configs: Vec::new(),
        }
    }

    /// Looks up a filtered config by provider display name, case-insensitively.
    pub fn config_by_name(&self, provider_name: &str) -> Option<&PaymentConfig> {
        self.payment_configs
            .iter()
            .find(|c| c.provider_name.eq_ignore_ascii_case(provider_name))
    }

    pub fn has_payment_methods(&self) -> bool {
        !self.payment_configs.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(name: &str, kind: PaymentConfigKind) -> PaymentConfig {
        PaymentConfig {
            provider_id: name.to_lowercase(),
            provider_name: name.to_string(),
            enabled: true,
            kind,
        }
    }

    #[test]
    fn cod_detection_by_kind_and_by_name() {
        assert!(config("Cash on Delivery", PaymentConfigKind::CashOnDelivery).is_cash_on_delivery());
        // Name alone is enough even when declared as a transfer by mistake.
        assert!(config(
            "CASH  ON  DELIVERY",
            PaymentConfigKind::AccountTransfer {
                account_title: "t".into(),
                account_number: "n".into(),
                instructions: None,
            }
        )
        .is_cash_on_delivery());
        assert!(!config(
            "EasyPaisa",
            PaymentConfigKind::AccountTransfer {
                account_title: "t".into(),
                account_number: "n".into(),
                instructions: None,
            }
        )
        .is_cash_on_delivery());
    }

    #[test]
    fn unresolved_context_has_no_methods() {
        let ctx = BranchSettlementContext::unresolved("ghost-branch");
        assert!(!ctx.has_payment_methods());
        assert!(!ctx.is_suspended);
        assert_eq!(ctx.seller_name, "ghost-branch");
    }

    #[test]
    fn config_lookup_ignores_case() {
        let mut ctx = BranchSettlementContext::unresolved("b");
        ctx.payment_configs
            .push(config("JazzCash", PaymentConfigKind::CashOnDelivery));
        assert!(ctx.config_by_name("jazzcash").is_some());
        assert!(ctx.config_by_name("JAZZCASH").is_some());
        assert!(ctx.config_by_name("sadapay").is_none());
    }
}
