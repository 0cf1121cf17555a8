//! Order status rules: parsing, the transition table and the display order number.

use std::{fmt, str::FromStr};

use chrono::{DateTime, TimeZone};

use crate::entity::orders::{OrderStatus, PaymentMethod};

impl OrderStatus {
    pub const ALL: [OrderStatus; 6] = [
        OrderStatus::Pending,
        OrderStatus::AwaitingPaymentVerification,
        OrderStatus::Processing,
        OrderStatus::Shipped,
        OrderStatus::Delivered,
        OrderStatus::Cancelled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::AwaitingPaymentVerification => "awaiting_payment_verification",
            OrderStatus::Processing => "processing",
            OrderStatus::Shipped => "shipped",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Cancelled => "cancelled",
        }
    }

    /// Status a freshly created order starts in.
    pub fn initial_for(method: PaymentMethod) -> Self {
        match method {
            PaymentMethod::Gcash => OrderStatus::AwaitingPaymentVerification,
            PaymentMethod::Cod => OrderStatus::Pending,
        }
    }

    /// Statuses reachable from `self` in one step. Staying put is always allowed.
    pub fn next_states(&self) -> &'static [OrderStatus] {
        match self {
            OrderStatus::Pending => &[
                OrderStatus::AwaitingPaymentVerification,
                OrderStatus::Processing,
                OrderStatus::Cancelled,
            ],
            OrderStatus::AwaitingPaymentVerification => {
                &[OrderStatus::Processing, OrderStatus::Cancelled]
            }
            OrderStatus::Processing => &[OrderStatus::Shipped, OrderStatus::Cancelled],
            OrderStatus::Shipped => &[OrderStatus::Delivered],
            OrderStatus::Delivered | OrderStatus::Cancelled => &[],
        }
    }

    pub fn can_transition_to(&self, next: OrderStatus) -> bool {
        *self == next || self.next_states().contains(&next)
    }

    pub fn is_terminal(&self) -> bool {
        self.next_states().is_empty()
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        OrderStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == wanted)
            .ok_or_else(|| format!("Invalid order status '{}'", s.trim()))
    }
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Gcash => "gcash",
            PaymentMethod::Cod => "cod",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            PaymentMethod::Gcash => "GCash",
            PaymentMethod::Cod => "Cash on Delivery",
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether moving an order from `current` to `next` is accepted.
pub fn check_transition(
    current: OrderStatus,
    next: OrderStatus,
    strict: bool,
) -> Result<(), String> {
    if !strict || current.can_transition_to(next) {
        return Ok(());
    }
    Err(format!(
        "Cannot change order status from {current} to {next}"
    ))
}

/// Human-facing order number, `YYYY-MMDD-HHMM`. Not unique; the id is the identity.
pub fn order_number<Tz>(created_at: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: fmt::Display,
{
    created_at
        .with_timezone(&chrono::Utc)
        .format("%Y-%m%d-%H%M")
        .to_string()
}
