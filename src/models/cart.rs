use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Variant chosen at add-to-cart time (color/size).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct VariantRef {
    pub color: Option<String>,
    pub size: Option<String>,
}

impl VariantRef {
    pub fn is_empty(&self) -> bool {
        self.color.is_none() && self.size.is_none()
    }
}

/// One line of the buyer's cart. Belongs to exactly one branch.
///
/// The unit price is resolved against the seller's catalog when the line is
/// added and stays fixed until the line is removed; re-adding picks up the
/// current price.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartLineItem {
    pub product_id: Uuid,
    pub branch_id: String,
    pub name: String,
    pub unit_price: Decimal,
    pub quantity: u32,
    #[serde(default)]
    pub variant: VariantRef,
    pub image_url: Option<String>,
    /// Free-form display metadata carried through to the UI untouched.
    pub metadata: Option<serde_json::Value>,
}

impl CartLineItem {
    pub fn line_total(&self) -> Decimal {
        self.unit_price * Decimal::from(self.quantity)
    }
}

/// The buyer's session-scoped cart.
///
/// Items keep insertion order; per-branch views preserve it. The cart is only
/// mutated through [`add_item`](Cart::add_item) / [`remove_item`](Cart::remove_item)
/// and cleared on checkout success or an explicit [`clear`](Cart::clear).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Cart {
    items: Vec<CartLineItem>,
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a line, merging quantity into an existing line when the product,
    /// branch, and variant all match. A merge keeps the existing unit price.
    pub fn add_item(&mut self, item: CartLineItem) {
        debug_assert!(item.quantity >= 1, "cart lines carry at least one unit");
        if let Some(existing) = self.items.iter_mut().find(|l| {
            l.product_id == item.product_id
                && l.branch_id == item.branch_id
                && l.variant == item.variant
        }) {
            existing.quantity += item.quantity;
        } else {
            self.items.push(item);
        }
    }

    /// Removes the line matching product, branch, and variant, if present.
    pub fn remove_item(&mut self, product_id: Uuid, branch_id: &str, variant: &VariantRef) {
        self.items.retain(|l| {
            !(l.product_id == product_id && l.branch_id == branch_id && &l.variant == variant)
        });
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn items(&self) -> &[CartLineItem] {
        &self.items
    }

    /// Distinct branch ids in first-seen order.
    pub fn branch_ids(&self) -> Vec<String> {
        let mut seen = Vec::new();
        for item in &self.items {
            if !seen.iter().any(|b: &String| b == &item.branch_id) {
                seen.push(item.branch_id.clone());
            }
        }
        seen
    }

    /// The branch's lines in cart order.
    pub fn items_for_branch(&self, branch_id: &str) -> Vec<&CartLineItem> {
        self.items
            .iter()
            .filter(|l| l.branch_id == branch_id)
            .collect()
    }

    /// Sum of `unit_price * quantity` over the branch's lines.
    pub fn branch_subtotal(&self, branch_id: &str) -> Decimal {
        self.items
            .iter()
            .filter(|l| l.branch_id == branch_id)
            .map(CartLineItem::line_total)
            .sum()
    }
}
