use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use phytoshop_core::{
    Aggregate, AggregateId, AggregateRoot, DomainError, Money, ProductId, SessionId, UserId,
};
use phytoshop_events::Event;

use crate::checkout::CustomerInfo;

/// Order identifier.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderId(pub AggregateId);

impl OrderId {
    pub fn new(id: AggregateId) -> Self {
        Self(id)
    }
}

impl core::fmt::Display for OrderId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// Order status lifecycle.
///
/// `pending → confirmed → preparing → shipped → delivered`; cancellation is
/// possible until the parcel ships.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Confirmed,
    Preparing,
    Shipped,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    /// Display text shown on the tracking screen.
    pub fn label(self) -> &'static str {
        match self {
            OrderStatus::Pending => "En attente",
            OrderStatus::Confirmed => "Confirmée",
            OrderStatus::Preparing => "En préparation",
            OrderStatus::Shipped => "Expédiée",
            OrderStatus::Delivered => "Livrée",
            OrderStatus::Cancelled => "Annulée",
        }
    }

    pub fn is_cancellable(self) -> bool {
        matches!(
            self,
            OrderStatus::Pending | OrderStatus::Confirmed | OrderStatus::Preparing
        )
    }

    pub fn is_final(self) -> bool {
        matches!(self, OrderStatus::Delivered | OrderStatus::Cancelled)
    }
}

/// How the customer pays.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    #[default]
    MobileMoney,
    #[serde(alias = "cash")]
    CashOnDelivery,
    BankTransfer,
}

impl PaymentMethod {
    pub fn label(self) -> &'static str {
        match self {
            PaymentMethod::MobileMoney => "Mobile Money",
            PaymentMethod::CashOnDelivery => "Paiement à la livraison",
            PaymentMethod::BankTransfer => "Virement bancaire",
        }
    }
}

/// Order line: product snapshot name, quantity, unit price at checkout time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLine {
    pub line_no: u32,
    pub product_id: ProductId,
    pub product_name: String,
    pub quantity: u32,
    pub unit_price: Money,
}

impl OrderLine {
    pub fn line_total(&self) -> Money {
        self.unit_price.times(u64::from(self.quantity))
    }
}

/// Aggregate root: Order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    id: OrderId,
    session_id: Option<SessionId>,
    user_id: Option<UserId>,
    customer: Option<CustomerInfo>,
    payment_method: PaymentMethod,
    lines: Vec<OrderLine>,
    delivery_fee: Money,
    status: OrderStatus,
    tracking_code: Option<String>,
    cancel_reason: Option<String>,
    placed_at: Option<DateTime<Utc>>,
    version: u64,
    created: bool,
}

impl Order {
    /// Create an empty, not-yet-placed aggregate instance for rehydration.
    pub fn empty(id: OrderId) -> Self {
        Self {
            id,
            session_id: None,
            user_id: None,
            customer: None,
            payment_method: PaymentMethod::default(),
            lines: Vec::new(),
            delivery_fee: Money::ZERO,
            status: OrderStatus::Pending,
            tracking_code: None,
            cancel_reason: None,
            placed_at: None,
            version: 0,
            created: false,
        }
    }

    pub fn id_typed(&self) -> OrderId {
        self.id
    }

    pub fn session_id(&self) -> Option<SessionId> {
        self.session_id
    }

    pub fn user_id(&self) -> Option<UserId> {
        self.user_id
    }

    pub fn customer(&self) -> Option<&CustomerInfo> {
        self.customer.as_ref()
    }

    pub fn payment_method(&self) -> PaymentMethod {
        self.payment_method
    }

    pub fn lines(&self) -> &[OrderLine] {
        &self.lines
    }

    pub fn delivery_fee(&self) -> Money {
        self.delivery_fee
    }

    pub fn status(&self) -> OrderStatus {
        self.status
    }

    pub fn tracking_code(&self) -> Option<&str> {
        self.tracking_code.as_deref()
    }

    pub fn cancel_reason(&self) -> Option<&str> {
        self.cancel_reason.as_deref()
    }

    pub fn placed_at(&self) -> Option<DateTime<Utc>> {
        self.placed_at
    }

    pub fn is_placed(&self) -> bool {
        self.created
    }

    pub fn subtotal(&self) -> Money {
        self.lines.iter().map(OrderLine::line_total).sum()
    }

    /// Subtotal plus delivery fee.
    pub fn total_amount(&self) -> Money {
        self.subtotal() + self.delivery_fee
    }

    pub fn total_items(&self) -> u64 {
        self.lines.iter().map(|l| u64::from(l.quantity)).sum()
    }
}

impl AggregateRoot for Order {
    type Id = OrderId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn version(&self) -> u64 {
        self.version
    }
}

/// Command: PlaceOrder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaceOrder {
    pub order_id: OrderId,
    pub session_id: SessionId,
    pub user_id: Option<UserId>,
    pub customer: CustomerInfo,
    pub payment_method: PaymentMethod,
    pub lines: Vec<OrderLine>,
    pub delivery_fee: Money,
    pub occurred_at: DateTime<Utc>,
}

/// Command: ConfirmOrder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfirmOrder {
    pub order_id: OrderId,
    pub occurred_at: DateTime<Utc>,
}

/// Command: StartPreparing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StartPreparing {
    pub order_id: OrderId,
    pub occurred_at: DateTime<Utc>,
}

/// Command: ShipOrder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShipOrder {
    pub order_id: OrderId,
    pub tracking_code: String,
    pub occurred_at: DateTime<Utc>,
}

/// Command: DeliverOrder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliverOrder {
    pub order_id: OrderId,
    pub occurred_at: DateTime<Utc>,
}

/// Command: CancelOrder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CancelOrder {
    pub order_id: OrderId,
    pub reason: String,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderCommand {
    PlaceOrder(PlaceOrder),
    ConfirmOrder(ConfirmOrder),
    StartPreparing(StartPreparing),
    ShipOrder(ShipOrder),
    DeliverOrder(DeliverOrder),
    CancelOrder(CancelOrder),
}

impl OrderCommand {
    /// The order this command targets.
    pub fn order_id(&self) -> OrderId {
        match self {
            OrderCommand::PlaceOrder(c) => c.order_id,
            OrderCommand::ConfirmOrder(c) => c.order_id,
            OrderCommand::StartPreparing(c) => c.order_id,
            OrderCommand::ShipOrder(c) => c.order_id,
            OrderCommand::DeliverOrder(c) => c.order_id,
            OrderCommand::CancelOrder(c) => c.order_id,
        }
    }
}

/// Event: OrderPlaced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderPlaced {
    pub order_id: OrderId,
    pub session_id: SessionId,
    pub user_id: Option<UserId>,
    pub customer: CustomerInfo,
    pub payment_method: PaymentMethod,
    pub lines: Vec<OrderLine>,
    pub delivery_fee: Money,
    pub occurred_at: DateTime<Utc>,
}

/// Event: OrderConfirmed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderConfirmed {
    pub order_id: OrderId,
    pub occurred_at: DateTime<Utc>,
}

/// Event: PreparationStarted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreparationStarted {
    pub order_id: OrderId,
    pub occurred_at: DateTime<Utc>,
}

/// Event: OrderShipped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderShipped {
    pub order_id: OrderId,
    pub tracking_code: String,
    pub occurred_at: DateTime<Utc>,
}

/// Event: OrderDelivered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderDelivered {
    pub order_id: OrderId,
    pub occurred_at: DateTime<Utc>,
}

/// Event: OrderCancelled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderCancelled {
    pub order_id: OrderId,
    pub reason: String,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderEvent {
    OrderPlaced(OrderPlaced),
    OrderConfirmed(OrderConfirmed),
    PreparationStarted(PreparationStarted),
    OrderShipped(OrderShipped),
    OrderDelivered(OrderDelivered),
    OrderCancelled(OrderCancelled),
}

impl Event for OrderEvent {
    fn event_type(&self) -> &'static str {
        match self {
            OrderEvent::OrderPlaced(_) => "orders.order.placed",
            OrderEvent::OrderConfirmed(_) => "orders.order.confirmed",
            OrderEvent::PreparationStarted(_) => "orders.order.preparing",
            OrderEvent::OrderShipped(_) => "orders.order.shipped",
            OrderEvent::OrderDelivered(_) => "orders.order.delivered",
            OrderEvent::OrderCancelled(_) => "orders.order.cancelled",
        }
    }

    fn version(&self) -> u32 {
        1
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            OrderEvent::OrderPlaced(e) => e.occurred_at,
            OrderEvent::OrderConfirmed(e) => e.occurred_at,
            OrderEvent::PreparationStarted(e) => e.occurred_at,
            OrderEvent::OrderShipped(e) => e.occurred_at,
            OrderEvent::OrderDelivered(e) => e.occurred_at,
            OrderEvent::OrderCancelled(e) => e.occurred_at,
        }
    }
}

impl Aggregate for Order {
    type Command = OrderCommand;
    type Event = OrderEvent;
    type Error = DomainError;

    fn apply(&mut self, event: &Self::Event) {
        match event {
            OrderEvent::OrderPlaced(e) => {
                self.id = e.order_id;
                self.session_id = Some(e.session_id);
                self.user_id = e.user_id;
                self.customer = Some(e.customer.clone());
                self.payment_method = e.payment_method;
                self.lines = e.lines.clone();
                self.delivery_fee = e.delivery_fee;
                self.status = OrderStatus::Pending;
                self.placed_at = Some(e.occurred_at);
                self.created = true;
            }
            OrderEvent::OrderConfirmed(_) => {
                self.status = OrderStatus::Confirmed;
            }
            OrderEvent::PreparationStarted(_) => {
                self.status = OrderStatus::Preparing;
            }
            OrderEvent::OrderShipped(e) => {
                self.status = OrderStatus::Shipped;
                self.tracking_code = Some(e.tracking_code.clone());
            }
            OrderEvent::OrderDelivered(_) => {
                self.status = OrderStatus::Delivered;
            }
            OrderEvent::OrderCancelled(e) => {
                self.status = OrderStatus::Cancelled;
                self.cancel_reason = Some(e.reason.clone());
            }
        }

        self.version += 1;
    }

    fn handle(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        match command {
            OrderCommand::PlaceOrder(cmd) => self.handle_place(cmd),
            OrderCommand::ConfirmOrder(cmd) => self.handle_confirm(cmd),
            OrderCommand::StartPreparing(cmd) => self.handle_start_preparing(cmd),
            OrderCommand::ShipOrder(cmd) => self.handle_ship(cmd),
            OrderCommand::DeliverOrder(cmd) => self.handle_deliver(cmd),
            OrderCommand::CancelOrder(cmd) => self.handle_cancel(cmd),
        }
    }
}

impl Order {
    fn ensure_placed(&self, order_id: OrderId) -> Result<(), DomainError> {
        if !self.created {
            return Err(DomainError::not_found());
        }
        if self.id != order_id {
            return Err(DomainError::invariant("order_id mismatch"));
        }
        Ok(())
    }

    fn ensure_status(&self, expected: OrderStatus, action: &str) -> Result<(), DomainError> {
        if self.status != expected {
            return Err(DomainError::invariant(format!(
                "cannot {action} an order that is {:?}",
                self.status
            )));
        }
        Ok(())
    }

    fn handle_place(&self, cmd: &PlaceOrder) -> Result<Vec<OrderEvent>, DomainError> {
        if self.created {
            return Err(DomainError::conflict("order already placed"));
        }

        cmd.customer.validate()?;

        if cmd.lines.is_empty() {
            return Err(DomainError::validation("cannot place an order without lines"));
        }

        if cmd.lines.iter().any(|l| l.quantity == 0) {
            return Err(DomainError::validation("line quantity must be positive"));
        }

        Ok(vec![OrderEvent::OrderPlaced(OrderPlaced {
            order_id: cmd.order_id,
            session_id: cmd.session_id,
            user_id: cmd.user_id,
            customer: cmd.customer.clone(),
            payment_method: cmd.payment_method,
            lines: cmd.lines.clone(),
            delivery_fee: cmd.delivery_fee,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_confirm(&self, cmd: &ConfirmOrder) -> Result<Vec<OrderEvent>, DomainError> {
        self.ensure_placed(cmd.order_id)?;
        self.ensure_status(OrderStatus::Pending, "confirm")?;

        Ok(vec![OrderEvent::OrderConfirmed(OrderConfirmed {
            order_id: cmd.order_id,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_start_preparing(&self, cmd: &StartPreparing) -> Result<Vec<OrderEvent>, DomainError> {
        self.ensure_placed(cmd.order_id)?;
        self.ensure_status(OrderStatus::Confirmed, "prepare")?;

        Ok(vec![OrderEvent::PreparationStarted(PreparationStarted {
            order_id: cmd.order_id,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_ship(&self, cmd: &ShipOrder) -> Result<Vec<OrderEvent>, DomainError> {
        self.ensure_placed(cmd.order_id)?;
        self.ensure_status(OrderStatus::Preparing, "ship")?;

        let tracking_code = cmd.tracking_code.trim();
        if tracking_code.is_empty() {
            return Err(DomainError::validation("tracking code cannot be empty"));
        }

        Ok(vec![OrderEvent::OrderShipped(OrderShipped {
            order_id: cmd.order_id,
            tracking_code: tracking_code.to_string(),
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_deliver(&self, cmd: &DeliverOrder) -> Result<Vec<OrderEvent>, DomainError> {
        self.ensure_placed(cmd.order_id)?;
        self.ensure_status(OrderStatus::Shipped, "deliver")?;

        Ok(vec![OrderEvent::OrderDelivered(OrderDelivered {
            order_id: cmd.order_id,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_cancel(&self, cmd: &CancelOrder) -> Result<Vec<OrderEvent>, DomainError> {
        self.ensure_placed(cmd.order_id)?;

        if !self.status.is_cancellable() {
            return Err(DomainError::invariant(format!(
                "cannot cancel an order that is {:?}",
                self.status
            )));
        }

        Ok(vec![OrderEvent::OrderCancelled(OrderCancelled {
            order_id: cmd.order_id,
            reason: cmd.reason.trim().to_string(),
            occurred_at: cmd.occurred_at,
        })])
    }
}
