//! Delivery of written scenes
//!
//! Rasterizing a scene to PNG goes through an external command; delivery
//! wraps it with validation, vault copies and cleanup.

pub mod delivery;
pub mod rasterizer;

pub use delivery::{deliver, expand_home, Delivery, DeliveryReport, DeliveryRequest, VaultCopy, VAULT_ENV};
pub use rasterizer::{Rasterizer, RASTERIZER_ENV};
