//! Multiship address API library.
//!
//! Stores any number of shipping (or billing) addresses per user and exposes
//! them over a small REST surface. The binary in `main.rs` wires a
//! `PostgreSQL` store into [`routes::build_router`]; tests wire the in-memory
//! store into the same router.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;

pub use routes::build_router;
pub use state::AppState;
