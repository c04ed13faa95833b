pub mod cart;
pub mod coupon;
pub mod order;
pub mod payment;
pub mod seller;

pub use cart::{Cart, CartLineItem, VariantRef};
pub use coupon::{AppliedCoupon, CouponBook};
pub use order::{Buyer, OrderLine, OrderSubmission, PaymentDetails, PricingBreakdown, ShippingInfo};
pub use payment::PaymentSelection;
pub use seller::{BranchSettlementContext, CountrySource, PaymentConfig, PaymentConfigKind, Seller};
