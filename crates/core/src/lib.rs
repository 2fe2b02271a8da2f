//! HandyHub Core - Shared domain types.
//!
//! This crate provides the records exchanged with the HandyHub backend API and
//! the small amount of client-side logic the storefront performs on them:
//! - `storefront` - Customer-facing catalog, cart and booking site
//! - `integration-tests` - End-to-end tests against a fake backend
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no HTTP
//! clients. The backend owns every record; these types mirror its JSON.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for IDs, money, emails, and statuses
//! - [`models`] - Catalog, cart, coupon, order, address, offer and settings records

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod models;
pub mod types;

pub use models::*;
pub use types::*;
