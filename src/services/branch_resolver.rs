//! Resolves each branch in the cart to a settlement context: seller metadata,
//! suspension state, and the payment methods allowed for both the seller and
//! the buyer's country.

use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{instrument, warn};

use crate::config::AppConfig;
use crate::errors::SettlementError;
use crate::models::cart::Cart;
use crate::models::seller::{BranchSettlementContext, CountrySource, Seller};
use crate::repositories::{PaymentMethodRegistry, RegistryMethod, SellerDirectory};

/// Read-only resolver from `cart → branch id → BranchSettlementContext`.
///
/// The output is a derived view recomputed per pass; nothing is mutated in
/// place and nothing is cached beyond the pass itself.
#[derive(Clone)]
pub struct BranchResolver {
    sellers: Arc<dyn SellerDirectory>,
    registry: Arc<dyn PaymentMethodRegistry>,
    config: Arc<AppConfig>,
}

impl BranchResolver {
    pub fn new(
        sellers: Arc<dyn SellerDirectory>,
        registry: Arc<dyn PaymentMethodRegistry>,
        config: Arc<AppConfig>,
    ) -> Self {
        Self {
            sellers,
            registry,
            config,
        }
    }

    /// Builds the settlement context for every distinct branch in the cart.
    ///
    /// A branch whose seller cannot be found resolves to an empty-config
    /// placeholder ("no payment methods enabled") instead of failing the
    /// whole checkout. Registry fetches are cached per country for the
    /// duration of this one pass only; the registry can change between
    /// checkout sessions.
    #[instrument(skip(self, cart), fields(branches = cart.branch_ids().len()))]
    pub async fn resolve(
        &self,
        cart: &Cart,
    ) -> Result<HashMap<String, BranchSettlementContext>, SettlementError> {
        let mut contexts = HashMap::new();
        let mut registry_cache: HashMap<String, Vec<RegistryMethod>> = HashMap::new();

        for branch_id in cart.branch_ids() {
            let seller = match self.sellers.get_seller(&branch_id).await? {
                Some(seller) => seller,
                None => {
                    warn!(branch_id = %branch_id, "no seller record for branch, resolving with empty payment configs");
                    contexts.insert(
                        branch_id.clone(),
                        BranchSettlementContext::unresolved(&branch_id),
                    );
                    continue;
                }
            };

            let (country, country_source) = match &seller.country {
                Some(country) => (country.clone(), CountrySource::Declared),
                None => {
                    warn!(
                        branch_id = %branch_id,
                        default_country = %self.config.default_seller_country,
                        "seller has no country on record, using the configured default for registry lookup"
                    );
                    (
                        self.config.default_seller_country.clone(),
                        CountrySource::Defaulted,
                    )
                }
            };

            let methods = match registry_cache.get(&country) {
                Some(methods) => methods.clone(),
                None => {
                    let methods = self.registry.get_country_methods(&country).await?;
                    registry_cache.insert(country.clone(), methods.clone());
                    methods
                }
            };

            contexts.insert(branch_id, build_context(seller, &methods, country_source));
        }

        Ok(contexts)
    }
}

/// Applies the two-key join: a payment config survives only when the seller
/// enabled it AND a case-insensitive name match exists in the country
/// registry with that entry itself enabled.
fn build_context(
    seller: Seller,
    country_methods: &[RegistryMethod],
    country_source: CountrySource,
) -> BranchSettlementContext {
    let now = Utc::now();
    let is_suspended = seller.suspended_until.map_or(false, |until| until > now);

    let payment_configs = seller
        .payment_configs
        .into_iter()
        .filter(|config| {
            config.enabled
                && country_methods.iter().any(|m| {
                    m.enabled && m.name.eq_ignore_ascii_case(&config.provider_name)
                })
        })
        .collect();

    BranchSettlementContext {
        branch_id: seller.branch_id,
        seller_name: seller.display_name,
        delivery_fee: seller.delivery_fee,
        tax_rate: seller.tax_rate,
        is_suspended,
        suspended_until: seller.suspended_until,
        country_source,
        payment_configs,
    }
}
