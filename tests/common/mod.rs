//! In-memory collaborator fakes and fixture builders shared by the
//! integration tests.

use async_trait::async_trait;
use rust_decimal::Decimal;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::sync::Mutex;
use tokio::sync::mpsc;
use uuid::Uuid;

use bazaar_settlement::config::AppConfig;
use bazaar_settlement::errors::SettlementError;
use bazaar_settlement::events::{Event, EventSender};
use bazaar_settlement::models::cart::{CartLineItem, VariantRef};
use bazaar_settlement::models::order::{Buyer, OrderSubmission, ShippingInfo};
use bazaar_settlement::models::seller::{PaymentConfig, PaymentConfigKind, Seller};
use bazaar_settlement::repositories::{
    CouponService, CouponValidation, OrderRepository, PaymentMethodRegistry, RegistryMethod,
    SellerDirectory,
};
use bazaar_settlement::services::branch_resolver::BranchResolver;
use bazaar_settlement::services::settlement::SettlementService;

pub struct InMemorySellerDirectory {
    sellers: HashMap<String, Seller>,
}

#[async_trait]
impl SellerDirectory for InMemorySellerDirectory {
    async fn get_seller(&self, branch_id: &str) -> Result<Option<Seller>, SettlementError> {
        Ok(self.sellers.get(branch_id).cloned())
    }
}

pub struct StaticRegistry {
    by_country: HashMap<String, Vec<RegistryMethod>>,
}

#[async_trait]
impl PaymentMethodRegistry for StaticRegistry {
    async fn get_country_methods(
        &self,
        country: &str,
    ) -> Result<Vec<RegistryMethod>, SettlementError> {
        Ok(self.by_country.get(country).cloned().unwrap_or_default())
    }
}

/// Accepts a coupon only for the exact (code, branch) pairs it was seeded
/// with, and only while the discount fits under the subtotal.
pub struct FakeCouponService {
    accepted: HashMap<(String, String), Decimal>,
}

#[async_trait]
impl CouponService for FakeCouponService {
    async fn validate(
        &self,
        code: &str,
        branch_id: &str,
        branch_subtotal: Decimal,
    ) -> Result<CouponValidation, SettlementError> {
        let key = (code.trim().to_uppercase(), branch_id.to_string());
        match self.accepted.get(&key) {
            Some(discount) if *discount <= branch_subtotal => Ok(CouponValidation {
                is_valid: true,
                discount: *discount,
                message: "Coupon applied".into(),
            }),
            _ => Ok(CouponValidation {
                is_valid: false,
                discount: Decimal::ZERO,
                message: "Coupon is not valid for this seller".into(),
            }),
        }
    }
}

/// Records successful submissions and fails writes for configured branches.
#[derive(Default)]
pub struct RecordingOrderRepository {
    pub orders: Mutex<Vec<OrderSubmission>>,
    pub fail_branches: Mutex<HashSet<String>>,
}

impl RecordingOrderRepository {
    pub fn fail_branch(&self, branch_id: &str) {
        self.fail_branches
            .lock()
            .unwrap()
            .insert(branch_id.to_string());
    }

    pub fn submissions_for(&self, branch_id: &str) -> Vec<OrderSubmission> {
        self.orders
            .lock()
            .unwrap()
            .iter()
            .filter(|o| o.branch_id == branch_id)
            .cloned()
            .collect()
    }
}

#[async_trait]
impl OrderRepository for RecordingOrderRepository {
    async fn create_order(&self, submission: &OrderSubmission) -> Result<Uuid, SettlementError> {
        if self
            .fail_branches
            .lock()
            .unwrap()
            .contains(&submission.branch_id)
        {
            return Err(SettlementError::Other(anyhow::anyhow!(
                "storage write failed"
            )));
        }
        self.orders.lock().unwrap().push(submission.clone());
        Ok(Uuid::new_v4())
    }
}

/// Everything a settlement test needs, wired over in-memory fakes.
pub struct TestHarness {
    pub service: SettlementService,
    pub orders: Arc<RecordingOrderRepository>,
    pub events: mpsc::Receiver<Event>,
}

pub struct TestHarnessBuilder {
    sellers: HashMap<String, Seller>,
    registry: HashMap<String, Vec<RegistryMethod>>,
    coupons: HashMap<(String, String), Decimal>,
}

impl TestHarnessBuilder {
    pub fn new() -> Self {
        Self {
            sellers: HashMap::new(),
            registry: HashMap::new(),
            coupons: HashMap::new(),
        }
    }

    pub fn with_seller(mut self, seller: Seller) -> Self {
        self.sellers.insert(seller.branch_id.clone(), seller);
        self
    }

    pub fn with_registry(mut self, country: &str, methods: &[(&str, bool)]) -> Self {
        self.registry.insert(
            country.to_string(),
            methods
                .iter()
                .map(|(name, enabled)| RegistryMethod {
                    name: (*name).to_string(),
                    enabled: *enabled,
                })
                .collect(),
        );
        self
    }

    pub fn with_coupon(mut self, code: &str, branch_id: &str, discount: Decimal) -> Self {
        self.coupons
            .insert((code.to_uppercase(), branch_id.to_string()), discount);
        self
    }

    pub fn build(self) -> TestHarness {
        // Opt-in log output via RUST_LOG; ignore the error when another test
        // already installed a subscriber.
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .try_init();

        let config = Arc::new(AppConfig::default());
        let (events, rx) = EventSender::channel(64);
        let orders = Arc::new(RecordingOrderRepository::default());

        let resolver = BranchResolver::new(
            Arc::new(InMemorySellerDirectory {
                sellers: self.sellers,
            }),
            Arc::new(StaticRegistry {
                by_country: self.registry,
            }),
            config.clone(),
        );

        let service = SettlementService::new(
            resolver,
            Arc::new(FakeCouponService {
                accepted: self.coupons,
            }),
            orders.clone(),
            events,
            config,
        );

        TestHarness {
            service,
            orders,
            events: rx,
        }
    }
}

// ---- fixtures ----

pub fn transfer_config(name: &str) -> PaymentConfig {
    PaymentConfig {
        provider_id: name.to_lowercase().replace(' ', "-"),
        provider_name: name.to_string(),
        enabled: true,
        kind: PaymentConfigKind::AccountTransfer {
            account_title: "Bazaar Settlement".into(),
            account_number: "PK00-0000-0001".into(),
            instructions: Some(format!("Send via {} and enter the transaction ID", name)),
        },
    }
}

pub fn cod_config() -> PaymentConfig {
    PaymentConfig {
        provider_id: "cod".into(),
        provider_name: "Cash on Delivery".into(),
        enabled: true,
        kind: PaymentConfigKind::CashOnDelivery,
    }
}

pub fn seller(branch_id: &str, delivery_fee: Decimal, tax_rate: Decimal) -> Seller {
    Seller {
        branch_id: branch_id.to_string(),
        display_name: format!("Seller {}", branch_id),
        country: Some("Pakistan".into()),
        delivery_fee,
        tax_rate,
        suspended_until: None,
        payment_configs: vec![transfer_config("JazzCash"), cod_config()],
    }
}

pub fn line(branch_id: &str, price: Decimal, quantity: u32) -> CartLineItem {
    CartLineItem {
        product_id: Uuid::new_v4(),
        branch_id: branch_id.to_string(),
        name: format!("Product for {}", branch_id),
        unit_price: price,
        quantity,
        variant: VariantRef::default(),
        image_url: None,
        metadata: None,
    }
}

pub fn buyer() -> Buyer {
    Buyer {
        id: Uuid::new_v4(),
        display_name: "Amina Khan".into(),
    }
}

pub fn shipping() -> ShippingInfo {
    ShippingInfo {
        full_name: "Amina Khan".into(),
        phone: "+92-300-0000000".into(),
        email: "amina@example.com".into(),
        address_line: "14 Mall Road".into(),
        city: "Lahore".into(),
        postal_code: Some("54000".into()),
        country: "Pakistan".into(),
    }
}

pub fn default_registry() -> Vec<(&'static str, bool)> {
    vec![("JazzCash", true), ("Cash on Delivery", true)]
}
