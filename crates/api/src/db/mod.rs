//! Storage for shipping addresses.
//!
//! # Table: `shipping_addresses`
//!
//! | Column | Type | Notes |
//! |---|---|---|
//! | `id` | `SERIAL` | primary key |
//! | `userid` | `INTEGER` | opaque owner tag |
//! | `type` | `TEXT` | category tag, e.g. `shipping` or `billing` |
//! | `userdata` | `TEXT` | versioned payload envelope, see [`multiship_core::codec`] |
//!
//! Handlers never talk to a connection directly. They receive an
//! [`AddressStore`] at startup, which is either [`PgAddressStore`] in
//! production or [`MemoryAddressStore`] in tests.
//!
//! # Migrations
//!
//! Migrations are stored in `crates/api/migrations/` and run via:
//! ```bash
//! cargo run -p multiship-cli -- migrate
//! ```

pub mod addresses;
pub mod memory;

use std::time::Duration;

use async_trait::async_trait;
use multiship_core::{AddressId, UserId};
use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub use addresses::PgAddressStore;
pub use memory::MemoryAddressStore;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// A stored row, with the payload still in its encoded form.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct AddressRow {
    pub id: AddressId,
    pub userid: UserId,
    #[sqlx(rename = "type")]
    pub address_type: String,
    pub userdata: String,
}

/// Fields for a row about to be inserted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAddressRow {
    pub userid: UserId,
    pub address_type: String,
    pub userdata: String,
}

/// Equality filters for listing addresses, combined with AND.
///
/// An empty filter matches every row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AddressFilter {
    pub address_type: Option<String>,
    pub user_id: Option<UserId>,
}

impl AddressFilter {
    /// Returns `true` if the filter constrains nothing.
    #[must_use]
    pub const fn is_unconstrained(&self) -> bool {
        self.address_type.is_none() && self.user_id.is_none()
    }

    /// Returns `true` if `row` satisfies every filter that is set.
    #[must_use]
    pub fn matches(&self, row: &AddressRow) -> bool {
        self.address_type
            .as_deref()
            .is_none_or(|t| t == row.address_type)
            && self.user_id.is_none_or(|u| u == row.userid)
    }
}

/// Data-store capability consumed by the address service.
#[async_trait]
pub trait AddressStore: Send + Sync {
    /// Return every row matching `filter`.
    async fn list(&self, filter: &AddressFilter) -> Result<Vec<AddressRow>, RepositoryError>;

    /// Return the row with the given id, if any.
    async fn find(&self, id: AddressId) -> Result<Option<AddressRow>, RepositoryError>;

    /// Insert a row and return its generated id.
    ///
    /// `Ok(None)` means the store accepted the statement but produced no id.
    async fn insert(&self, row: &NewAddressRow) -> Result<Option<AddressId>, RepositoryError>;

    /// Replace the encoded payload of a row and return the rows affected.
    async fn update_userdata(&self, id: AddressId, userdata: &str) -> Result<u64, RepositoryError>;

    /// Check that the store is reachable.
    async fn ping(&self) -> Result<(), RepositoryError>;
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
/// * `max_connections` - Upper bound on pooled connections
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(
    database_url: &secrecy::SecretString,
    max_connections: u32,
) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(max_connections)
        .min_connections(1)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
