//! Core types for Multiship.

pub mod address;
pub mod id;

pub use address::{AddressPayload, ShippingAddress};
pub use id::*;
