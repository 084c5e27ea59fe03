use serde::Serialize;

use phytoshop_core::{Money, ProductId};
use phytoshop_products::Product;

/// One (product snapshot, quantity) pairing.
///
/// The quantity is always at least 1; lines that would drop to zero are
/// removed from the cart instead.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CartLine {
    product: Product,
    quantity: u32,
}

impl CartLine {
    pub fn product(&self) -> &Product {
        &self.product
    }

    pub fn product_id(&self) -> &ProductId {
        self.product.id_typed()
    }

    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    /// Snapshot price times quantity.
    pub fn line_total(&self) -> Money {
        self.product.price().times(u64::from(self.quantity))
    }
}

/// Session cart.
///
/// Lines are unique by product id and kept in insertion order. Every
/// operation is total: nothing here returns an error.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    fn position(&self, product_id: &ProductId) -> Option<usize> {
        self.lines.iter().position(|l| l.product_id() == product_id)
    }

    /// Add `quantity` units of `product`.
    ///
    /// An existing line for the same product id grows by `quantity` and keeps
    /// its original snapshot; otherwise a new line is appended. A zero
    /// quantity changes nothing.
    pub fn add_to_cart(&mut self, product: Product, quantity: u32) {
        if quantity == 0 {
            tracing::debug!(product_id = %product.id_typed(), "ignoring add of zero units");
            return;
        }

        match self.position(product.id_typed()) {
            Some(idx) => {
                let line = &mut self.lines[idx];
                line.quantity = line.quantity.saturating_add(quantity);
                tracing::debug!(
                    product_id = %line.product_id(),
                    quantity = line.quantity,
                    "cart line incremented"
                );
            }
            None => {
                tracing::debug!(product_id = %product.id_typed(), quantity, "cart line added");
                self.lines.push(CartLine { product, quantity });
            }
        }
    }

    /// Add a single unit of `product`.
    pub fn add_one(&mut self, product: Product) {
        self.add_to_cart(product, 1);
    }

    /// Remove the line for `product_id`; unknown ids are ignored.
    pub fn remove_from_cart(&mut self, product_id: &ProductId) {
        if let Some(idx) = self.position(product_id) {
            self.lines.remove(idx);
            tracing::debug!(%product_id, "cart line removed");
        }
    }

    /// Replace the quantity of an existing line.
    ///
    /// `new_quantity <= 0` removes the line. Values above `u32::MAX` are
    /// clamped. Unknown ids are ignored.
    pub fn update_quantity(&mut self, product_id: &ProductId, new_quantity: i64) {
        if new_quantity <= 0 {
            self.remove_from_cart(product_id);
            return;
        }

        if let Some(idx) = self.position(product_id) {
            let quantity = u32::try_from(new_quantity).unwrap_or(u32::MAX);
            self.lines[idx].quantity = quantity;
            tracing::debug!(%product_id, quantity, "cart line quantity set");
        }
    }

    pub fn clear_cart(&mut self) {
        tracing::debug!(lines = self.lines.len(), "cart cleared");
        self.lines.clear();
    }

    /// Sum of price times quantity over all lines.
    pub fn total_price(&self) -> Money {
        self.lines.iter().map(CartLine::line_total).sum()
    }

    /// Sum of quantities over all lines (not the line count).
    pub fn total_items(&self) -> u64 {
        self.lines.iter().map(|l| u64::from(l.quantity)).sum()
    }

    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    pub fn line(&self, product_id: &ProductId) -> Option<&CartLine> {
        self.position(product_id).map(|idx| &self.lines[idx])
    }

    pub fn contains(&self, product_id: &ProductId) -> bool {
        self.position(product_id).is_some()
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pid(raw: &str) -> ProductId {
        ProductId::parse(raw).unwrap()
    }

    fn product(id: &str, price: u64) -> Product {
        Product::new(pid(id), format!("Produit {id}"), Money::from_francs(price))
    }

    #[test]
    fn empty_cart_totals_are_zero() {
        let cart = Cart::new();
        assert!(cart.is_empty());
        assert_eq!(cart.total_price(), Money::ZERO);
        assert_eq!(cart.total_items(), 0);
    }

    #[test]
    fn adding_same_product_twice_merges_into_one_line() {
        let mut cart = Cart::new();
        cart.add_one(product("A", 1000));
        cart.add_one(product("A", 1000));

        assert_eq!(cart.line_count(), 1);
        assert_eq!(cart.line(&pid("A")).unwrap().quantity(), 2);
        assert_eq!(cart.total_price(), Money::from_francs(2000));
        assert_eq!(cart.total_items(), 2);
    }

    #[test]
    fn update_quantity_replaces_rather_than_adds() {
        let mut cart = Cart::new();
        cart.add_to_cart(product("A", 1500), 3);
        cart.update_quantity(&pid("A"), 1);

        assert_eq!(cart.line(&pid("A")).unwrap().quantity(), 1);
        assert_eq!(cart.total_price(), Money::from_francs(1500));
    }

    #[test]
    fn remove_leaves_other_lines() {
        let mut cart = Cart::new();
        cart.add_one(product("A", 1000));
        cart.add_to_cart(product("B", 2500), 2);
        cart.remove_from_cart(&pid("A"));

        assert!(!cart.contains(&pid("A")));
        assert_eq!(cart.line_count(), 1);
        assert_eq!(cart.total_price(), Money::from_francs(5000));
        assert_eq!(cart.total_items(), 2);
    }

    #[test]
    fn update_to_zero_or_negative_removes_line() {
        let mut cart = Cart::new();
        cart.add_one(product("A", 1000));
        cart.add_one(product("B", 1000));

        cart.update_quantity(&pid("A"), 0);
        cart.update_quantity(&pid("B"), -4);

        assert!(cart.is_empty());
    }

    #[test]
    fn remove_unknown_id_is_noop() {
        let mut cart = Cart::new();
        cart.add_one(product("A", 1000));
        let before = cart.clone();

        cart.remove_from_cart(&pid("missing"));
        assert_eq!(cart, before);
    }

    #[test]
    fn update_unknown_id_with_positive_quantity_is_noop() {
        let mut cart = Cart::new();
        cart.add_one(product("A", 1000));
        let before = cart.clone();

        cart.update_quantity(&pid("missing"), 5);
        assert_eq!(cart, before);
    }

    #[test]
    fn add_zero_units_is_noop() {
        let mut cart = Cart::new();
        cart.add_to_cart(product("A", 1000), 0);
        assert!(cart.is_empty());

        cart.add_one(product("A", 1000));
        cart.add_to_cart(product("A", 1000), 0);
        assert_eq!(cart.total_items(), 1);
    }

    #[test]
    fn lines_keep_insertion_order() {
        let mut cart = Cart::new();
        cart.add_one(product("C", 10));
        cart.add_one(product("A", 10));
        cart.add_one(product("B", 10));
        cart.add_one(product("A", 10));

        let order: Vec<&str> = cart.lines().iter().map(|l| l.product_id().as_str()).collect();
        assert_eq!(order, ["C", "A", "B"]);
    }

    #[test]
    fn re_adding_keeps_first_snapshot() {
        let mut cart = Cart::new();
        cart.add_one(product("A", 1000));
        cart.add_one(product("A", 9999));

        let line = cart.line(&pid("A")).unwrap();
        assert_eq!(line.product().price(), Money::from_francs(1000));
        assert_eq!(cart.total_price(), Money::from_francs(2000));
    }

    #[test]
    fn clear_resets_totals() {
        let mut cart = Cart::new();
        cart.add_to_cart(product("A", 1000), 4);
        cart.add_to_cart(product("B", 300), 7);
        cart.clear_cart();

        assert!(cart.is_empty());
        assert_eq!(cart.total_items(), 0);
        assert_eq!(cart.total_price(), Money::ZERO);
    }

    #[test]
    fn huge_quantities_saturate_instead_of_panicking() {
        let mut cart = Cart::new();
        cart.add_to_cart(product("A", u64::MAX), u32::MAX);
        cart.add_to_cart(product("A", u64::MAX), u32::MAX);
        assert_eq!(cart.line(&pid("A")).unwrap().quantity(), u32::MAX);
        assert_eq!(cart.total_price(), Money::from_francs(u64::MAX));

        cart.update_quantity(&pid("A"), i64::MAX);
        assert_eq!(cart.line(&pid("A")).unwrap().quantity(), u32::MAX);
    }

    #[cfg(test)]
    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        #[derive(Debug, Clone)]
        enum Op {
            Add(usize, u32),
            Remove(usize),
            Update(usize, i64),
            Clear,
        }

        const IDS: [&str; 4] = ["A", "B", "C", "D"];
        const PRICES: [u64; 4] = [1000, 2500, 750, 12_000];

        fn op() -> impl Strategy<Value = Op> {
            prop_oneof![
                4 => (0..IDS.len(), 0u32..20).prop_map(|(i, q)| Op::Add(i, q)),
                1 => (0..IDS.len()).prop_map(Op::Remove),
                2 => (0..IDS.len(), -5i64..20).prop_map(|(i, q)| Op::Update(i, q)),
                1 => Just(Op::Clear),
            ]
        }

        fn apply(cart: &mut Cart, op: &Op) {
            match *op {
                Op::Add(i, q) => cart.add_to_cart(product(IDS[i], PRICES[i]), q),
                Op::Remove(i) => cart.remove_from_cart(&pid(IDS[i])),
                Op::Update(i, q) => cart.update_quantity(&pid(IDS[i]), q),
                Op::Clear => cart.clear_cart(),
            }
        }

        proptest! {
            #![proptest_config(ProptestConfig {
                cases: 500,
                ..ProptestConfig::default()
            })]

            /// Property: repeated adds of one product sum into a single line.
            #[test]
            fn repeated_adds_sum_quantities(quantities in prop::collection::vec(1u32..50, 1..20)) {
                let mut cart = Cart::new();
                for q in &quantities {
                    cart.add_to_cart(product("A", 1000), *q);
                }

                let expected: u64 = quantities.iter().map(|q| u64::from(*q)).sum();
                prop_assert_eq!(cart.line_count(), 1);
                prop_assert_eq!(u64::from(cart.line(&pid("A")).unwrap().quantity()), expected);
            }

            /// Property: positive update sets the exact quantity.
            #[test]
            fn update_sets_exact_quantity(initial in 1u32..100, next in 1i64..100) {
                let mut cart = Cart::new();
                cart.add_to_cart(product("A", 1000), initial);
                cart.update_quantity(&pid("A"), next);
                prop_assert_eq!(i64::from(cart.line(&pid("A")).unwrap().quantity()), next);
            }

            /// Property: non-positive update removes the line.
            #[test]
            fn non_positive_update_removes(initial in 1u32..100, k in 0i64..1000) {
                let mut cart = Cart::new();
                cart.add_to_cart(product("A", 1000), initial);
                cart.update_quantity(&pid("A"), -k);
                prop_assert!(!cart.contains(&pid("A")));
            }

            /// Property: invariants hold and totals match their definition after any sequence.
            #[test]
            fn invariants_hold_after_any_sequence(ops in prop::collection::vec(op(), 0..60)) {
                let mut cart = Cart::new();
                for op in &ops {
                    apply(&mut cart, op);
                }

                let mut seen = std::collections::HashSet::new();
                for line in cart.lines() {
                    prop_assert!(line.quantity() >= 1);
                    prop_assert!(seen.insert(line.product_id().clone()));
                }

                let price: u64 = cart
                    .lines()
                    .iter()
                    .map(|l| l.product().price().francs() * u64::from(l.quantity()))
                    .sum();
                let items: u64 = cart.lines().iter().map(|l| u64::from(l.quantity())).sum();
                prop_assert_eq!(cart.total_price(), Money::from_francs(price));
                prop_assert_eq!(cart.total_items(), items);
            }

            /// Property: clear always yields zero totals.
            #[test]
            fn clear_always_zeroes(ops in prop::collection::vec(op(), 0..30)) {
                let mut cart = Cart::new();
                for op in &ops {
                    apply(&mut cart, op);
                }
                cart.clear_cart();
                prop_assert_eq!(cart.total_items(), 0);
                prop_assert_eq!(cart.total_price(), Money::ZERO);
            }
        }
    }
}
