//! `PostgreSQL` implementation of [`AddressStore`].
//!
//! Every user-supplied value is bound as a query parameter. The only dynamic
//! SQL is the WHERE clause of [`list_query`], and it is assembled from fixed
//! fragments by `QueryBuilder`.

use async_trait::async_trait;
use multiship_core::AddressId;
use sqlx::{PgPool, Postgres, QueryBuilder};

use super::{AddressFilter, AddressRow, AddressStore, NewAddressRow, RepositoryError};

/// Address store backed by a `PostgreSQL` pool.
#[derive(Debug, Clone)]
pub struct PgAddressStore {
    pool: PgPool,
}

impl PgAddressStore {
    /// Create a new store over an existing pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Build the filtered list query.
///
/// Rows come back in id order so that repeated listings are stable.
fn list_query(filter: &AddressFilter) -> QueryBuilder<'_, Postgres> {
    let mut builder =
        QueryBuilder::new("SELECT id, userid, type, userdata FROM shipping_addresses");
    let mut separator = " WHERE ";

    if let Some(address_type) = filter.address_type.as_deref() {
        builder.push(separator).push("type = ").push_bind(address_type);
        separator = " AND ";
    }

    if let Some(user_id) = filter.user_id {
        builder.push(separator).push("userid = ").push_bind(user_id);
    }

    builder.push(" ORDER BY id");
    builder
}

#[async_trait]
impl AddressStore for PgAddressStore {
    async fn list(&self, filter: &AddressFilter) -> Result<Vec<AddressRow>, RepositoryError> {
        let rows = list_query(filter)
            .build_query_as::<AddressRow>()
            .fetch_all(&self.pool)
            .await?;

        Ok(rows)
    }

    async fn find(&self, id: AddressId) -> Result<Option<AddressRow>, RepositoryError> {
        let row = sqlx::query_as::<_, AddressRow>(
            r"
            SELECT id, userid, type, userdata
            FROM shipping_addresses
            WHERE id = $1
            ",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    async fn insert(&self, row: &NewAddressRow) -> Result<Option<AddressId>, RepositoryError> {
        let id = sqlx::query_scalar::<_, AddressId>(
            r"
            INSERT INTO shipping_addresses (userid, type, userdata)
            VALUES ($1, $2, $3)
            RETURNING id
            ",
        )
        .bind(row.userid)
        .bind(&row.address_type)
        .bind(&row.userdata)
        .fetch_optional(&self.pool)
        .await?;

        Ok(id)
    }

    async fn update_userdata(&self, id: AddressId, userdata: &str) -> Result<u64, RepositoryError> {
        let result = sqlx::query(
            r"
            UPDATE shipping_addresses
            SET userdata = $1
            WHERE id = $2
            ",
        )
        .bind(userdata)
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    async fn ping(&self) -> Result<(), RepositoryError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use multiship_core::UserId;

    use super::*;

    const SELECT: &str = "SELECT id, userid, type, userdata FROM shipping_addresses";

    #[test]
    fn test_list_query_without_filters_is_unconstrained() {
        let filter = AddressFilter::default();
        let query = list_query(&filter);
        assert_eq!(query.sql(), format!("{SELECT} ORDER BY id"));
    }

    #[test]
    fn test_list_query_binds_type() {
        let filter = AddressFilter {
            address_type: Some("shipping".to_string()),
            user_id: None,
        };
        let query = list_query(&filter);
        assert_eq!(query.sql(), format!("{SELECT} WHERE type = $1 ORDER BY id"));
    }

    #[test]
    fn test_list_query_binds_user_only() {
        let filter = AddressFilter {
            address_type: None,
            user_id: Some(UserId::new(7)),
        };
        let query = list_query(&filter);
        assert_eq!(query.sql(), format!("{SELECT} WHERE userid = $1 ORDER BY id"));
    }

    #[test]
    fn test_list_query_combines_filters_with_and() {
        let filter = AddressFilter {
            address_type: Some("billing' OR '1'='1".to_string()),
            user_id: Some(UserId::new(7)),
        };
        let query = list_query(&filter);

        assert_eq!(
            query.sql(),
            format!("{SELECT} WHERE type = $1 AND userid = $2 ORDER BY id")
        );
        assert!(!query.sql().contains("'1'='1"));
    }
}
