//! Top-level checkout settlement: partitions the cart per branch, validates
//! shipping and payment state, prices each branch, and submits one order per
//! branch concurrently.

use chrono::Utc;
use futures::future::join_all;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{error, info, instrument};
use uuid::Uuid;
use validator::Validate;

use crate::config::AppConfig;
use crate::errors::SettlementError;
use crate::events::{Event, EventSender};
use crate::models::cart::Cart;
use crate::models::coupon::{AppliedCoupon, CouponBook};
use crate::models::order::{
    Buyer, OrderLine, OrderSubmission, PaymentDetails, PricingBreakdown, ShippingInfo,
};
use crate::models::payment::PaymentSelection;
use crate::models::seller::{BranchSettlementContext, PaymentConfigKind};
use crate::repositories::{CouponService, OrderRepository};
use crate::services::branch_resolver::BranchResolver;
use crate::services::pricing::price_branch;

/// One branch's committed order within a settlement outcome.
#[derive(Debug, Clone)]
pub struct SubmittedOrder {
    pub branch_id: String,
    pub seller_name: String,
    pub order_id: Uuid,
    pub final_amount: Decimal,
}

/// Result of a fully successful settlement: one order per branch.
#[derive(Debug, Clone)]
pub struct SettlementOutcome {
    pub orders: Vec<SubmittedOrder>,
}

/// Per-branch display summary: the resolved context plus current pricing.
/// Recomputed on demand, never stored.
#[derive(Debug, Clone)]
pub struct BranchCheckoutSummary {
    pub context: BranchSettlementContext,
    pub pricing: PricingBreakdown,
}

/// Coordinates a multi-branch checkout end to end.
///
/// Branch submissions are independent external writes with no shared
/// transaction: on a partial failure the committed siblings stay committed,
/// the failing branch's error is surfaced with the seller's name, and the
/// cart is left intact so the buyer can retry without re-entering anything.
#[derive(Clone)]
pub struct SettlementService {
    resolver: BranchResolver,
    coupons: Arc<dyn CouponService>,
    orders: Arc<dyn OrderRepository>,
    events: EventSender,
    config: Arc<AppConfig>,
}

impl SettlementService {
    pub fn new(
        resolver: BranchResolver,
        coupons: Arc<dyn CouponService>,
        orders: Arc<dyn OrderRepository>,
        events: EventSender,
        config: Arc<AppConfig>,
    ) -> Self {
        Self {
            resolver,
            coupons,
            orders,
            events,
            config,
        }
    }

    /// Validates a coupon code against one branch and records the verdict in
    /// the book. A rejection resets that branch's coupon to zero; no other
    /// branch is affected, even for an identical code string.
    #[instrument(skip(self, cart, coupon_book), fields(branch_id = %branch_id))]
    pub async fn apply_coupon(
        &self,
        branch_id: &str,
        code: &str,
        cart: &Cart,
        coupon_book: &mut CouponBook,
    ) -> Result<AppliedCoupon, SettlementError> {
        let subtotal = cart.branch_subtotal(branch_id);
        let verdict = self.coupons.validate(code, branch_id, subtotal).await?;

        let coupon = if verdict.is_valid {
            info!(branch_id = %branch_id, discount = %verdict.discount, "coupon accepted");
            let coupon = AppliedCoupon::accepted(code, verdict.discount);
            self.events
                .send_or_log(Event::CouponApplied {
                    branch_id: branch_id.to_string(),
                    code: coupon.code.clone(),
                    discount: coupon.discount,
                })
                .await;
            coupon
        } else {
            info!(branch_id = %branch_id, message = %verdict.message, "coupon rejected");
            let coupon = AppliedCoupon::rejected(code);
            self.events
                .send_or_log(Event::CouponRejected {
                    branch_id: branch_id.to_string(),
                    code: coupon.code.clone(),
                })
                .await;
            coupon
        };

        coupon_book.record(branch_id, coupon.clone());
        Ok(coupon)
    }

    /// Recomputes the per-branch view for display: resolved contexts plus
    /// pricing under the currently applied coupons. Branches appear in cart
    /// order.
    #[instrument(skip(self, cart, coupon_book))]
    pub async fn checkout_preview(
        &self,
        cart: &Cart,
        coupon_book: &CouponBook,
    ) -> Result<Vec<BranchCheckoutSummary>, SettlementError> {
        let mut contexts = self.resolver.resolve(cart).await?;

        let mut summaries = Vec::new();
        for branch_id in cart.branch_ids() {
            let Some(context) = contexts.remove(&branch_id) else {
                continue;
            };
            let items = cart.items_for_branch(&branch_id);
            let subtotal = cart.branch_subtotal(&branch_id);
            // Same guard as submission: a stale over-large discount must be
            // re-validated before it reaches the pricing calculator.
            let discount = self
                .effective_discount(&branch_id, subtotal, coupon_book)
                .await?;
            let pricing = price_branch(&items, discount, context.delivery_fee, context.tax_rate);
            summaries.push(BranchCheckoutSummary { context, pricing });
        }
        Ok(summaries)
    }

    /// Settles the whole cart: one order per branch, submitted concurrently.
    ///
    /// Shipping info is validated first (buyer-global, fail fast). Each
    /// branch is then validated and priced independently against a freshly
    /// resolved context; a rejected branch does not stop its siblings from
    /// submitting. The orchestrator waits for every dispatched write to
    /// settle and surfaces the first failure in branch order; the cart and
    /// the coupon book are cleared only when every branch committed — an
    /// applied coupon never outlives its checkout.
    #[instrument(skip_all, fields(buyer_id = %buyer.id, branches = cart.branch_ids().len()))]
    pub async fn submit_order(
        &self,
        buyer: &Buyer,
        cart: &mut Cart,
        shipping: &ShippingInfo,
        selections: &HashMap<String, PaymentSelection>,
        coupon_book: &mut CouponBook,
    ) -> Result<SettlementOutcome, SettlementError> {
        if cart.is_empty() {
            return Err(SettlementError::Validation("Your cart is empty".into()));
        }

        shipping.validate()?;

        let branch_ids = cart.branch_ids();
        self.events
            .send_or_log(Event::CheckoutStarted {
                buyer_id: buyer.id,
                branch_count: branch_ids.len(),
            })
            .await;

        let contexts = self.resolver.resolve(cart).await?;

        // Each branch validates and prices independently: a rejection here
        // records the failure but does not stop its siblings. All prepared
        // submissions are assembled before any write is dispatched.
        let mut prepared = Vec::new();
        let mut failures: Vec<(usize, SettlementError)> = Vec::new();
        for (index, branch_id) in branch_ids.iter().enumerate() {
            let context = contexts.get(branch_id).ok_or_else(|| {
                SettlementError::NotFound(format!("No settlement context for branch {}", branch_id))
            })?;
            let selection = selections.get(branch_id).cloned().unwrap_or_default();
            match self
                .prepare_branch(buyer, cart, shipping, context, &selection, coupon_book)
                .await
            {
                Ok(submission) => prepared.push((index, submission)),
                Err(e) => {
                    error!(branch_id = %branch_id, error = %e, "branch rejected before dispatch");
                    failures.push((index, e));
                }
            }
        }

        // Concurrent fan-out: total latency is bounded by the slowest branch.
        // Writes already dispatched are final even if a sibling fails.
        let results = join_all(prepared.iter().map(|(index, submission)| async move {
            (*index, submission, self.orders.create_order(submission).await)
        }))
        .await;

        let mut committed = Vec::new();
        for (index, submission, outcome) in results {
            match outcome {
                Ok(order_id) => {
                    info!(
                        branch_id = %submission.branch_id,
                        order_id = %order_id,
                        amount = %submission.totals.final_amount,
                        "branch order committed"
                    );
                    self.events
                        .send_or_log(Event::OrderSubmitted {
                            buyer_id: buyer.id,
                            branch_id: submission.branch_id.clone(),
                            order_id,
                        })
                        .await;
                    committed.push(SubmittedOrder {
                        branch_id: submission.branch_id.clone(),
                        seller_name: submission.seller_name.clone(),
                        order_id,
                        final_amount: submission.totals.final_amount,
                    });
                }
                Err(e) => {
                    error!(branch_id = %submission.branch_id, error = %e, "branch order failed");
                    failures.push((
                        index,
                        SettlementError::SettlementWrite {
                            seller_name: submission.seller_name.clone(),
                            message: e.buyer_message(),
                        },
                    ));
                }
            }
        }

        // Surface the first failure in branch order as the single buyer-facing
        // error.
        failures.sort_by_key(|(index, _)| *index);
        let first_failure = failures.into_iter().next().map(|(_, e)| e);

        if let Some(failure) = first_failure {
            // Committed siblings stay committed; there is no cross-branch
            // rollback. The cart is kept so the buyer can retry.
            self.events
                .send_or_log(Event::CheckoutFailed {
                    buyer_id: buyer.id,
                    reason: failure.buyer_message(),
                })
                .await;
            return Err(failure);
        }

        cart.clear();
        coupon_book.clear();
        self.events
            .send_or_log(Event::CheckoutCompleted {
                buyer_id: buyer.id,
                order_count: committed.len(),
            })
            .await;
        info!(order_count = committed.len(), "checkout settled across all branches");

        Ok(SettlementOutcome { orders: committed })
    }

    /// Validates one branch and assembles its immutable order submission.
    async fn prepare_branch(
        &self,
        buyer: &Buyer,
        cart: &Cart,
        shipping: &ShippingInfo,
        context: &BranchSettlementContext,
        selection: &PaymentSelection,
        coupon_book: &CouponBook,
    ) -> Result<OrderSubmission, SettlementError> {
        if context.is_suspended {
            return Err(SettlementError::SuspendedBranch {
                seller_name: context.seller_name.clone(),
            });
        }

        let validated = selection.validate_for(context)?;
        let config = context
            .config_by_name(validated.provider_name)
            .ok_or_else(|| SettlementError::PaymentConfigMismatch {
                seller_name: context.seller_name.clone(),
                provider_name: validated.provider_name.to_string(),
            })?;

        let subtotal = cart.branch_subtotal(&context.branch_id);
        let discount = self
            .effective_discount(&context.branch_id, subtotal, coupon_book)
            .await?;

        let items = cart.items_for_branch(&context.branch_id);
        let totals = price_branch(&items, discount, context.delivery_fee, context.tax_rate);

        let payment_details = match &config.kind {
            PaymentConfigKind::AccountTransfer {
                account_title,
                account_number,
                instructions,
            } => PaymentDetails {
                account_title: Some(account_title.clone()),
                account_number: Some(account_number.clone()),
                instructions: instructions.clone(),
                transaction_id: validated.transaction_id.map(str::to_string),
            },
            PaymentConfigKind::CashOnDelivery => PaymentDetails::default(),
        };

        let lines = items
            .iter()
            .map(|item| OrderLine {
                product_id: item.product_id,
                name: item.name.clone(),
                unit_price: item.unit_price,
                quantity: item.quantity,
                variant: item.variant.clone(),
            })
            .collect();

        Ok(OrderSubmission {
            buyer_id: buyer.id,
            branch_id: context.branch_id.clone(),
            seller_name: context.seller_name.clone(),
            lines,
            totals,
            currency: self.config.currency.clone(),
            shipping: shipping.clone(),
            payment_method: config.provider_name.clone(),
            payment_details,
            submitted_at: Utc::now(),
        })
    }

    /// The branch's coupon discount for pricing. A discount that no longer
    /// fits under the subtotal (items removed since it was applied) is
    /// re-validated; the pricing calculator's no-clamp precondition holds
    /// either way.
    async fn effective_discount(
        &self,
        branch_id: &str,
        subtotal: Decimal,
        coupon_book: &CouponBook,
    ) -> Result<Decimal, SettlementError> {
        let discount = coupon_book.discount_for(branch_id);
        if discount <= subtotal {
            return Ok(discount);
        }

        let code = coupon_book
            .get(branch_id)
            .map(|c| c.code.clone())
            .unwrap_or_default();
        let verdict = self.coupons.validate(&code, branch_id, subtotal).await?;
        if verdict.is_valid && verdict.discount <= subtotal {
            Ok(verdict.discount)
        } else {
            Ok(Decimal::ZERO)
        }
    }
}
