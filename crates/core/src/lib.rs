//! Multiship Core - Shared types library.
//!
//! This crate provides the types shared by every Multiship component:
//! - `api` - The shipping address REST service
//! - `cli` - Command-line tools for migrations and blob inspection
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no database
//! access, no HTTP. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Typed IDs, the address payload and its response shape
//! - [`codec`] - The versioned encoding of an address payload stored at rest

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod codec;
pub mod types;

pub use codec::{CodecError, decode_payload, encode_payload};
pub use types::*;
