//! Orders (bookings) and the booking request sent at checkout.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::address::UserAddress;
use crate::types::{AddressId, OrderId, OrderStatus, PaymentMethod, PaymentStatus, ServiceId};

/// A booked service line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub service_id: ServiceId,
    pub service_name: String,
    pub quantity: u32,
    pub unit_price: Decimal,
    pub total_price: Decimal,
}

/// An order as returned by `/api/orders`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: OrderId,
    pub order_number: String,
    #[serde(default)]
    pub status: OrderStatus,
    #[serde(default)]
    pub payment_status: PaymentStatus,
    #[serde(default)]
    pub payment_method: PaymentMethod,
    #[serde(default)]
    pub items: Vec<OrderItem>,
    #[serde(default)]
    pub subtotal: Decimal,
    #[serde(default)]
    pub discount_amount: Decimal,
    pub final_amount: Decimal,
    #[serde(default)]
    pub coupon_code: Option<String>,
    #[serde(default)]
    pub address: Option<UserAddress>,
    #[serde(default)]
    pub scheduled_date: Option<NaiveDate>,
    #[serde(default)]
    pub time_slot: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Order {
    /// Total number of service units booked.
    #[must_use]
    pub fn total_quantity(&self) -> u32 {
        self.items.iter().map(|item| item.quantity).sum()
    }
}

/// Number of orders in each status, for the order history header.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OrderStatusCounts {
    by_status: [usize; OrderStatus::ALL.len()],
}

impl OrderStatusCounts {
    /// Count orders per status.
    #[must_use]
    pub fn tally(orders: &[Order]) -> Self {
        orders.iter().fold(Self::default(), |mut acc, order| {
            if let Some(count) = acc.by_status.get_mut(order.status as usize) {
                *count += 1;
            }
            acc
        })
    }

    /// Orders in one status.
    #[must_use]
    pub fn get(&self, status: OrderStatus) -> usize {
        self.by_status.get(status as usize).copied().unwrap_or(0)
    }

    /// Statuses with at least one order, in lifecycle order.
    #[must_use]
    pub fn present(&self) -> Vec<(OrderStatus, usize)> {
        OrderStatus::ALL
            .into_iter()
            .map(|status| (status, self.get(status)))
            .filter(|(_, count)| *count > 0)
            .collect()
    }

    /// Orders still being worked on.
    #[must_use]
    pub fn open(&self) -> usize {
        OrderStatus::ALL
            .into_iter()
            .filter(|status| status.is_open())
            .map(|status| self.get(status))
            .sum()
    }

    /// Total orders counted.
    #[must_use]
    pub fn total(&self) -> usize {
        self.by_status.iter().sum()
    }
}

/// Why a booking request was rejected before reaching the backend.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BookingError {
    #[error("Please choose a date that is not in the past")]
    DateInPast,
    #[error("Please choose a time slot")]
    MissingTimeSlot,
    #[error("Notes must be at most {max} characters")]
    NotesTooLong { max: usize },
}

/// Body of `POST /api/orders`.
///
/// The backend turns the session's cart into an order; the request only
/// carries the booking details.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingRequest {
    pub address_id: AddressId,
    pub scheduled_date: NaiveDate,
    pub time_slot: String,
    pub payment_method: PaymentMethod,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl BookingRequest {
    /// Maximum length of customer notes.
    pub const MAX_NOTES_LENGTH: usize = 500;

    /// Check the request against `today` (in the customer's timezone).
    ///
    /// # Errors
    ///
    /// Returns the first problem found.
    pub fn validate(&self, today: NaiveDate) -> Result<(), BookingError> {
        if self.scheduled_date < today {
            return Err(BookingError::DateInPast);
        }
        if self.time_slot.trim().is_empty() {
            return Err(BookingError::MissingTimeSlot);
        }
        if self
            .notes
            .as_ref()
            .is_some_and(|n| n.chars().count() > Self::MAX_NOTES_LENGTH)
        {
            return Err(BookingError::NotesTooLong {
                max: Self::MAX_NOTES_LENGTH,
            });
        }
        Ok(())
    }
}
