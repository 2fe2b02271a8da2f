//! Records exchanged with the backend API.
//!
//! Field names follow the backend's camelCase JSON. Optional columns default
//! to `None` and flags default to the backend's column defaults, so partially
//! populated rows (e.g. from list endpoints) still deserialize.

pub mod address;
pub mod admin;
pub mod cart;
pub mod catalog;
pub mod coupon;
pub mod envelope;
pub mod offer;
pub mod order;
pub mod settings;
pub mod user;

pub use address::{AddressError, AddressInput, UserAddress};
pub use admin::{AdminStats, CategoryInput, CouponInput, ServiceInput};
pub use cart::{Cart, CartItem};
pub use catalog::{Category, Service, ServiceFilter, Subcategory, filter_by_category, search_services};
pub use coupon::{Coupon, CouponValidation};
pub use envelope::ApiEnvelope;
pub use offer::OfferPlan;
pub use order::{BookingError, BookingRequest, Order, OrderItem, OrderStatusCounts};
pub use settings::{ContactMessage, ContactSettings};
pub use user::User;
