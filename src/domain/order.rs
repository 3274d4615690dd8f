use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::errors::DomainError;

/// Order lifecycle: `processed` → `outForDelivery` → `delivered`.
///
/// Cancellation deletes the order instead of adding a fourth state, so it
/// never appears in transition targets. Wire strings are camelCase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum OrderStatus {
    Processed,
    OutForDelivery,
    Delivered,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Processed => "processed",
            OrderStatus::OutForDelivery => "outForDelivery",
            OrderStatus::Delivered => "delivered",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "processed" => Some(OrderStatus::Processed),
            "outForDelivery" => Some(OrderStatus::OutForDelivery),
            "delivered" => Some(OrderStatus::Delivered),
            _ => None,
        }
    }

    /// Validate a transition against the *persisted* status.
    ///
    /// `is_paid` is the merged flag (incoming OR stored) at the time of the
    /// update; `outForDelivery` → `delivered` is only legal once it is true.
    pub fn validate_transition(
        current: OrderStatus,
        target: OrderStatus,
        is_paid: bool,
    ) -> Result<(), DomainError> {
        match current {
            OrderStatus::Processed => {
                if target != OrderStatus::OutForDelivery {
                    return Err(DomainError::BadRequest(format!(
                        "a processed order can only move to outForDelivery, not {}",
                        target.as_str()
                    )));
                }
                Ok(())
            }
            OrderStatus::OutForDelivery => {
                if target != OrderStatus::Delivered {
                    return Err(DomainError::BadRequest(format!(
                        "an outForDelivery order can only move to delivered, not {}",
                        target.as_str()
                    )));
                }
                if !is_paid {
                    return Err(DomainError::BadRequest(
                        "an outForDelivery order can only be delivered once it is paid"
                            .to_string(),
                    ));
                }
                Ok(())
            }
            OrderStatus::Delivered => Err(DomainError::BadRequest(
                "the status of a delivered order cannot be changed".to_string(),
            )),
        }
    }
}

/// Outcome of a cancellation attempt. Not being cancellable is a business
/// result, not a fault.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelOutcome {
    Cancelled,
    NotCancellable,
}

/// Header fields for a new order, written once inside the checkout
/// transaction.
#[derive(Debug, Clone)]
pub struct NewOrderHeader {
    pub user_id: Uuid,
    pub address_id: Uuid,
    pub status: OrderStatus,
    pub is_paid: bool,
}

/// One (product, quantity) pair to be turned into a priced order line. The
/// price is deliberately absent: it is read inside the transaction so the
/// snapshot reflects the price at commit time.
#[derive(Debug, Clone)]
pub struct OrderLineSpec {
    pub product_id: Uuid,
    pub quantity: i32,
}

#[derive(Debug, Clone)]
pub struct OrderLineView {
    pub id: Uuid,
    pub product_id: Uuid,
    pub product_name: String,
    pub quantity: i32,
    /// Frozen at creation: price × quantity × (100 − discount)/100.
    pub total_price: BigDecimal,
}

#[derive(Debug, Clone)]
pub struct OrderView {
    pub id: Uuid,
    pub user_id: Uuid,
    pub address_id: Uuid,
    pub status: OrderStatus,
    pub is_paid: bool,
    pub created_at: DateTime<Utc>,
    pub lines: Vec<OrderLineView>,
}
