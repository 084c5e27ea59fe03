//! Checkout: customer details, price summary, and cart-to-order conversion.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use phytoshop_cart::Cart;
use phytoshop_core::{Aggregate, DomainError, DomainResult, Money, SessionId, UserId};

use crate::order::{Order, OrderCommand, OrderId, OrderLine, PaymentMethod, PlaceOrder};

/// Flat delivery fee applied to every order.
pub const DEFAULT_DELIVERY_FEE: Money = Money::from_francs(2000);

/// City pre-filled on the checkout form.
pub const DEFAULT_CITY: &str = "Kinshasa";

/// Delivery contact entered at checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerInfo {
    pub name: String,
    pub phone: String,
    pub address: String,
    pub city: String,
}

impl CustomerInfo {
    pub fn new(
        name: impl Into<String>,
        phone: impl Into<String>,
        address: impl Into<String>,
        city: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            phone: phone.into(),
            address: address.into(),
            city: city.into(),
        }
    }

    /// Name, phone and address are required; city is free-form.
    pub fn validate(&self) -> DomainResult<()> {
        let missing: Vec<&str> = [
            ("name", &self.name),
            ("phone", &self.phone),
            ("address", &self.address),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(field, _)| field)
        .collect();

        if !missing.is_empty() {
            return Err(DomainError::validation(format!(
                "required checkout fields missing: {}",
                missing.join(", ")
            )));
        }
        Ok(())
    }
}

impl Default for CustomerInfo {
    fn default() -> Self {
        Self::new("", "", "", DEFAULT_CITY)
    }
}

/// Price breakdown shown before the order is placed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutSummary {
    pub subtotal: Money,
    pub delivery_fee: Money,
    pub total: Money,
    pub total_items: u64,
}

impl CheckoutSummary {
    pub fn from_cart(cart: &Cart, delivery_fee: Money) -> Self {
        let subtotal = cart.total_price();
        Self {
            subtotal,
            delivery_fee,
            total: subtotal + delivery_fee,
            total_items: cart.total_items(),
        }
    }
}

/// Everything besides the cart that placing an order needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutRequest {
    pub order_id: OrderId,
    pub session_id: SessionId,
    pub user_id: Option<UserId>,
    pub customer: CustomerInfo,
    pub payment_method: PaymentMethod,
    pub delivery_fee: Money,
    pub occurred_at: DateTime<Utc>,
}

fn order_lines(cart: &Cart) -> Vec<OrderLine> {
    cart.lines()
        .iter()
        .zip(1u32..)
        .map(|(line, line_no)| OrderLine {
            line_no,
            product_id: line.product_id().clone(),
            product_name: line.product().name().to_string(),
            quantity: line.quantity(),
            unit_price: line.product().price(),
        })
        .collect()
}

/// Place an order from the cart contents.
///
/// The cart is cleared only once the order has been accepted; on any error it
/// is left untouched so the shopper can fix the form and retry.
pub fn checkout(cart: &mut Cart, request: CheckoutRequest) -> DomainResult<Order> {
    if cart.is_empty() {
        return Err(DomainError::validation("cart is empty"));
    }

    let command = OrderCommand::PlaceOrder(PlaceOrder {
        order_id: request.order_id,
        session_id: request.session_id,
        user_id: request.user_id,
        customer: request.customer,
        payment_method: request.payment_method,
        lines: order_lines(cart),
        delivery_fee: request.delivery_fee,
        occurred_at: request.occurred_at,
    });

    let mut order = Order::empty(request.order_id);
    order.execute(&command)?;

    tracing::info!(
        order_id = %order.id_typed(),
        total = %order.total_amount(),
        items = order.total_items(),
        "order placed"
    );
    cart.clear_cart();
    Ok(order)
}
