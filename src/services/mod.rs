pub mod branch_resolver;
pub mod pricing;
pub mod settlement;

pub use branch_resolver::BranchResolver;
pub use settlement::SettlementService;
