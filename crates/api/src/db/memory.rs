//! In-memory implementation of [`AddressStore`].
//!
//! Rows live in a `BTreeMap` keyed by id, so listings come back in insertion
//! order just like the `PostgreSQL` store. Ids start at 1.

use std::collections::BTreeMap;

use async_trait::async_trait;
use multiship_core::{AddressId, UserId};
use tokio::sync::Mutex;

use super::{AddressFilter, AddressRow, AddressStore, NewAddressRow, RepositoryError};

#[derive(Debug, Default)]
struct Inner {
    rows: BTreeMap<AddressId, AddressRow>,
    last_id: i32,
}

/// Address store that keeps every row in process memory.
#[derive(Debug, Default)]
pub struct MemoryAddressStore {
    inner: Mutex<Inner>,
}

impl MemoryAddressStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a row with an arbitrary, possibly undecodable, `userdata` value.
    ///
    /// Bypasses the payload codec so tests can reproduce rows written by other
    /// tools.
    pub async fn insert_raw(
        &self,
        userid: UserId,
        address_type: &str,
        userdata: &str,
    ) -> AddressId {
        let mut inner = self.inner.lock().await;
        Self::push(&mut inner, userid, address_type, userdata)
    }

    /// Number of stored rows.
    pub async fn len(&self) -> usize {
        self.inner.lock().await.rows.len()
    }

    /// Returns `true` if nothing has been stored.
    pub async fn is_empty(&self) -> bool {
        self.inner.lock().await.rows.is_empty()
    }

    fn push(inner: &mut Inner, userid: UserId, address_type: &str, userdata: &str) -> AddressId {
        inner.last_id += 1;
        let id = AddressId::new(inner.last_id);
        inner.rows.insert(
            id,
            AddressRow {
                id,
                userid,
                address_type: address_type.to_string(),
                userdata: userdata.to_string(),
            },
        );
        id
    }
}

#[async_trait]
impl AddressStore for MemoryAddressStore {
    async fn list(&self, filter: &AddressFilter) -> Result<Vec<AddressRow>, RepositoryError> {
        let inner = self.inner.lock().await;
        Ok(inner
            .rows
            .values()
            .filter(|row| filter.matches(row))
            .cloned()
            .collect())
    }

    async fn find(&self, id: AddressId) -> Result<Option<AddressRow>, RepositoryError> {
        Ok(self.inner.lock().await.rows.get(&id).cloned())
    }

    async fn insert(&self, row: &NewAddressRow) -> Result<Option<AddressId>, RepositoryError> {
        let mut inner = self.inner.lock().await;
        Ok(Some(Self::push(
            &mut inner,
            row.userid,
            &row.address_type,
            &row.userdata,
        )))
    }

    async fn update_userdata(&self, id: AddressId, userdata: &str) -> Result<u64, RepositoryError> {
        let mut inner = self.inner.lock().await;
        match inner.rows.get_mut(&id) {
            Some(row) => {
                userdata.clone_into(&mut row.userdata);
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn ping(&self) -> Result<(), RepositoryError> {
        Ok(())
    }
}
