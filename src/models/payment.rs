use serde::{Deserialize, Serialize};

use crate::errors::SettlementError;
use crate::models::seller::BranchSettlementContext;

/// True when a provider display name means cash on delivery, ignoring case
/// and internal whitespace ("Cash On Delivery", "cash on delivery", "COD").
pub fn is_cod_name(provider_name: &str) -> bool {
    let normalized: String = provider_name
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_lowercase();
    normalized == "cashondelivery" || normalized == "cod"
}

/// The buyer's payment selection for one branch.
///
/// A three-state machine: nothing selected, a provider picked, details
/// complete. COD providers complete immediately; anything else needs a
/// non-empty transaction reference. The orchestrator re-validates this state
/// against the branch's current filtered configs at submit time because the
/// selection is buyer-supplied.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum PaymentSelection {
    #[default]
    NoSelection,
    ProviderSelected { provider_name: String },
    DetailsComplete {
        provider_name: String,
        transaction_id: Option<String>,
    },
}

impl PaymentSelection {
    /// Picks a provider. COD needs nothing further and goes straight to
    /// complete; other providers wait for a transaction reference.
    pub fn select_provider(&mut self, provider_name: &str) {
        *self = if is_cod_name(provider_name) {
            PaymentSelection::DetailsComplete {
                provider_name: provider_name.to_string(),
                transaction_id: None,
            }
        } else {
            PaymentSelection::ProviderSelected {
                provider_name: provider_name.to_string(),
            }
        };
    }

    /// Records the transaction reference for a non-COD selection. Blank
    /// references are ignored; the machine stays at provider-selected.
    pub fn set_transaction_reference(&mut self, reference: &str) {
        let reference = reference.trim();
        if reference.is_empty() {
            return;
        }
        let provider_name = match self {
            PaymentSelection::NoSelection => return,
            PaymentSelection::ProviderSelected { provider_name }
            | PaymentSelection::DetailsComplete { provider_name, .. } => provider_name.clone(),
        };
        if is_cod_name(&provider_name) {
            return;
        }
        *self = PaymentSelection::DetailsComplete {
            provider_name,
            transaction_id: Some(reference.to_string()),
        };
    }

    pub fn provider_name(&self) -> Option<&str> {
        match self {
            PaymentSelection::NoSelection => None,
            PaymentSelection::ProviderSelected { provider_name }
            | PaymentSelection::DetailsComplete { provider_name, .. } => Some(provider_name),
        }
    }

    /// Logic-side re-validation against the branch's current filtered
    /// configs. The UI enforcing the same rules earlier does not count.
    pub fn validate_for(
        &self,
        context: &BranchSettlementContext,
    ) -> Result<ValidatedSelection<'_>, SettlementError> {
        let provider_name = self.provider_name().ok_or_else(|| {
            SettlementError::PaymentRequired {
                seller_name: context.seller_name.clone(),
            }
        })?;

        // The seller or the country registry may have disabled the method
        // after the buyer picked it.
        let config = context.config_by_name(provider_name).ok_or_else(|| {
            SettlementError::PaymentConfigMismatch {
                seller_name: context.seller_name.clone(),
                provider_name: provider_name.to_string(),
            }
        })?;

        let transaction_id = match self {
            PaymentSelection::DetailsComplete { transaction_id, .. } => transaction_id.as_deref(),
            _ => None,
        };

        if !config.is_cash_on_delivery()
            && transaction_id.map_or(true, |t| t.trim().is_empty())
        {
            return Err(SettlementError::TransactionIdRequired {
                seller_name: context.seller_name.clone(),
                provider_name: provider_name.to_string(),
            });
        }

        Ok(ValidatedSelection {
            provider_name,
            transaction_id,
        })
    }
}

/// A selection that passed [`PaymentSelection::validate_for`].
#[derive(Debug, Clone, Copy)]
pub struct ValidatedSelection<'a> {
    pub provider_name: &'a str,
    pub transaction_id: Option<&'a str>,
}
