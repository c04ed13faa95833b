//! Bazaar settlement engine
//!
//! Converts a multi-seller shopping cart into one committed order per seller
//! ("branch"): per-branch pricing, country-gated payment method resolution,
//! payment selection validation, and concurrent per-branch order submission
//! with partial-failure semantics.
//!
//! The crate owns no HTTP surface or storage. Sellers, the country payment
//! registry, coupon validation, and order persistence are collaborator traits
//! in [`repositories`]; the caller wires real implementations in.
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

pub mod config;
pub mod errors;
pub mod events;
pub mod models;
pub mod repositories;
pub mod services;

pub use config::AppConfig;
pub use errors::SettlementError;
pub use services::settlement::{SettlementOutcome, SettlementService};
