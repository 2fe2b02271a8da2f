//! Session-held types for the storefront.

mod session;

pub use session::{CurrentUser, keys as session_keys};
