use serde::Serialize;

/// Errors raised while settling a multi-branch checkout.
///
/// Every variant that concerns a single branch carries the seller's display
/// name so the buyer-facing message can point at the offending branch. None of
/// these are retried automatically; recovery is buyer-driven resubmission.
#[derive(Debug, thiserror::Error, Serialize)]
pub enum SettlementError {
    /// Buyer-global shipping info is incomplete. Raised before any branch is
    /// touched.
    #[error("Validation error: {0}")]
    Validation(String),

    /// The seller is currently blocked from receiving orders.
    #[error("{seller_name} is suspended and cannot accept orders right now")]
    SuspendedBranch { seller_name: String },

    /// No payment method was selected for this branch.
    #[error("Please select a payment method for {seller_name}")]
    PaymentRequired { seller_name: String },

    /// The selected payment method is no longer offered by the branch. The
    /// seller or the country registry disabled it mid-checkout.
    #[error("{provider_name} is no longer available for {seller_name}, please choose another payment method")]
    PaymentConfigMismatch {
        seller_name: String,
        provider_name: String,
    },

    /// A non-COD method was selected without a transaction reference.
    #[error("A transaction ID is required for {provider_name} payments to {seller_name}")]
    TransactionIdRequired {
        seller_name: String,
        provider_name: String,
    },

    /// One branch's order-creation call failed at the storage boundary.
    #[error("Order for {seller_name} could not be placed: {message}")]
    SettlementWrite {
        seller_name: String,
        message: String,
    },

    /// A collaborator lookup came back empty where a record was expected.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Configuration could not be loaded or failed validation.
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Other error: {0}")]
    Other(
        #[from]
        #[serde(skip)]
        anyhow::Error,
    ),
}

impl From<validator::ValidationErrors> for SettlementError {
    fn from(err: validator::ValidationErrors) -> Self {
        SettlementError::Validation(err.to_string())
    }
}

impl SettlementError {
    /// The single human-readable message surfaced to the buyer.
    ///
    /// Collaborator plumbing failures are reported generically; everything
    /// buyer-actionable keeps its full message.
    pub fn buyer_message(&self) -> String {
        match self {
            Self::Other(_) | Self::Config(_) => "Something went wrong, please try again".to_string(),
            _ => self.to_string(),
        }
    }

    /// True when the buyer can fix the problem by editing their own input
    /// (shipping fields or payment selection) and resubmitting.
    pub fn is_buyer_recoverable(&self) -> bool {
        matches!(
            self,
            Self::Validation(_)
                | Self::PaymentRequired { .. }
                | Self::PaymentConfigMismatch { .. }
                | Self::TransactionIdRequired { .. }
        )
    }
}
