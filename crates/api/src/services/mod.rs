//! Business logic services.

pub mod addresses;

pub use addresses::AddressService;
