//! Address resource operations: list, create, and update.
//!
//! The service owns no connection of its own. It is handed an
//! [`AddressStore`] at startup and issues exactly one store operation per
//! request, plus the existence check that precedes an update.

use std::sync::Arc;

use multiship_core::{AddressId, ShippingAddress, decode_payload, encode_payload};
use tracing::instrument;

use crate::db::{AddressFilter, AddressRow, AddressStore, NewAddressRow};
use crate::error::ApiError;
use crate::models::address::FILTER_REQUIRED_MESSAGE;
use crate::models::{NewAddress, UpdateAddressParams};

/// Service implementing the shipping address resource.
#[derive(Clone)]
pub struct AddressService {
    store: Arc<dyn AddressStore>,
    require_list_filter: bool,
}

impl AddressService {
    /// Create a new address service.
    ///
    /// When `require_list_filter` is set, list requests that carry neither a
    /// `user_id` nor a `type` are refused instead of returning every row.
    #[must_use]
    pub fn new(store: Arc<dyn AddressStore>, require_list_filter: bool) -> Self {
        Self {
            store,
            require_list_filter,
        }
    }

    /// Get a reference to the underlying store.
    #[must_use]
    pub fn store(&self) -> &dyn AddressStore {
        self.store.as_ref()
    }

    /// List addresses matching `filter`, decoding each stored payload.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::InvalidParameters` if the filter is empty and the
    /// list policy requires one, `ApiError::Database` if the store fails, and
    /// `ApiError::DataIntegrity` if a stored payload cannot be decoded.
    #[instrument(skip(self))]
    pub async fn list(&self, filter: AddressFilter) -> Result<Vec<ShippingAddress>, ApiError> {
        if self.require_list_filter && filter.is_unconstrained() {
            tracing::warn!("Refusing unfiltered address listing");
            return Err(ApiError::InvalidParameters(
                FILTER_REQUIRED_MESSAGE.to_string(),
            ));
        }

        let rows = self.store.list(&filter).await?;
        tracing::debug!(count = rows.len(), "Listed shipping addresses");

        rows.into_iter().map(to_shipping_address).collect()
    }

    /// Store a new address.
    ///
    /// Multiple addresses of the same type for one user are allowed.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::InsertFailed` if the payload cannot be encoded, the
    /// store fails, or the store reports no generated id.
    #[instrument(skip(self, new), fields(user_id = %new.user_id, address_type = %new.address_type))]
    pub async fn create(&self, new: NewAddress) -> Result<AddressId, ApiError> {
        let userdata =
            encode_payload(&new.payload).map_err(|e| ApiError::InsertFailed(e.to_string()))?;

        let row = NewAddressRow {
            userid: new.user_id,
            address_type: new.address_type,
            userdata,
        };

        let id = self
            .store
            .insert(&row)
            .await
            .map_err(|e| ApiError::InsertFailed(e.to_string()))?
            .ok_or_else(|| ApiError::InsertFailed("store returned no id".to_string()))?;

        tracing::info!(address_id = %id, "Shipping address created");
        Ok(id)
    }

    /// Replace the payload of an existing address.
    ///
    /// The address is looked up before the body is validated, so an unknown id
    /// is reported as not found even when the body is also invalid. Only the
    /// payload changes; the owner and type are left as they were.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::NotFound` if no address has this id,
    /// `ApiError::InvalidParameters` if `userdata` is missing or malformed,
    /// `ApiError::Database` if the lookup fails, and `ApiError::UpdateFailed`
    /// if the write fails or touches no row.
    #[instrument(skip(self, params))]
    pub async fn update(&self, id: AddressId, params: UpdateAddressParams) -> Result<(), ApiError> {
        if self.store.find(id).await?.is_none() {
            return Err(ApiError::NotFound(id));
        }

        let payload = params.into_payload()?;
        let userdata =
            encode_payload(&payload).map_err(|e| ApiError::UpdateFailed(e.to_string()))?;

        // A matched row counts as updated even when the new payload equals the
        // stored one, so zero here means the row vanished after the lookup.
        let affected = self
            .store
            .update_userdata(id, &userdata)
            .await
            .map_err(|e| ApiError::UpdateFailed(e.to_string()))?;

        if affected == 0 {
            return Err(ApiError::UpdateFailed(format!(
                "no row updated for address {id}"
            )));
        }

        tracing::info!(address_id = %id, "Shipping address updated");
        Ok(())
    }
}

fn to_shipping_address(row: AddressRow) -> Result<ShippingAddress, ApiError> {
    let user_data = decode_payload(&row.userdata).map_err(|source| ApiError::DataIntegrity {
        id: row.id,
        source,
    })?;

    Ok(ShippingAddress {
        id: row.id,
        user_id: row.userid,
        address_type: row.address_type,
        user_data,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use multiship_core::{AddressPayload, UserId};
    use serde_json::json;

    use super::*;
    use crate::db::MemoryAddressStore;

    fn service(store: &Arc<MemoryAddressStore>, require_list_filter: bool) -> AddressService {
        AddressService::new(store.clone(), require_list_filter)
    }

    fn new_address(user_id: i32, address_type: &str, city: &str) -> NewAddress {
        NewAddress {
            user_id: UserId::new(user_id),
            address_type: address_type.to_string(),
            payload: AddressPayload {
                shipping_city: Some(city.to_string()),
                ..Default::default()
            },
        }
    }

    #[tokio::test]
    async fn test_create_then_list_round_trips_payload() {
        let store = Arc::new(MemoryAddressStore::new());
        let service = service(&store, false);

        let created = new_address(7, "shipping", "Pune");
        let id = service.create(created.clone()).await.unwrap();

        let listed = service
            .list(AddressFilter {
                address_type: Some("shipping".to_string()),
                user_id: Some(UserId::new(7)),
            })
            .await
            .unwrap();

        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, id);
        assert_eq!(listed[0].user_id, UserId::new(7));
        assert_eq!(listed[0].address_type, "shipping");
        assert_eq!(listed[0].user_data, created.payload);
    }

    #[tokio::test]
    async fn test_update_missing_address_is_not_found() {
        let store = Arc::new(MemoryAddressStore::new());
        let service = service(&store, false);

        let err = service
            .update(AddressId::new(5), UpdateAddressParams::default())
            .await
            .unwrap_err();

        assert!(matches!(err, ApiError::NotFound(id) if id == AddressId::new(5)));
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_update_replaces_whole_payload() {
        let store = Arc::new(MemoryAddressStore::new());
        let service = service(&store, false);

        let mut created = new_address(7, "shipping", "Pune");
        created.payload.shipping_country = Some("IN".to_string());
        let id = service.create(created).await.unwrap();

        service
            .update(
                id,
                UpdateAddressParams {
                    userdata: Some(json!({ "shipping_city": "Mumbai" })),
                },
            )
            .await
            .unwrap();

        let listed = service.list(AddressFilter::default()).await.unwrap();
        assert_eq!(listed[0].user_data.shipping_city.as_deref(), Some("Mumbai"));
        assert!(listed[0].user_data.shipping_country.is_none());
        assert_eq!(listed[0].address_type, "shipping");
    }

    #[tokio::test]
    async fn test_update_with_identical_payload_succeeds() {
        let store = Arc::new(MemoryAddressStore::new());
        let service = service(&store, false);
        let id = service
            .create(new_address(7, "shipping", "Pune"))
            .await
            .unwrap();

        for _ in 0..2 {
            service
                .update(
                    id,
                    UpdateAddressParams {
                        userdata: Some(json!({ "shipping_city": "Pune" })),
                    },
                )
                .await
                .unwrap();
        }
    }

    #[tokio::test]
    async fn test_update_existing_address_without_userdata_is_invalid() {
        let store = Arc::new(MemoryAddressStore::new());
        let service = service(&store, false);
        let id = service
            .create(new_address(7, "shipping", "Pune"))
            .await
            .unwrap();

        let err = service
            .update(id, UpdateAddressParams::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::InvalidParameters(_)));
    }

    #[tokio::test]
    async fn test_list_policy_requires_a_filter() {
        let store = Arc::new(MemoryAddressStore::new());
        let service = service(&store, true);

        let err = service.list(AddressFilter::default()).await.unwrap_err();
        assert!(matches!(err, ApiError::InvalidParameters(m) if m == FILTER_REQUIRED_MESSAGE));

        let rows = service
            .list(AddressFilter {
                address_type: Some("shipping".to_string()),
                user_id: None,
            })
            .await
            .unwrap();
        assert!(rows.is_empty());
    }

    #[tokio::test]
    async fn test_list_reports_undecodable_payload() {
        let store = Arc::new(MemoryAddressStore::new());
        let id = store
            .insert_raw(UserId::new(7), "shipping", "a:1:{s:4:\"city\";}")
            .await;
        let service = service(&store, false);

        let err = service.list(AddressFilter::default()).await.unwrap_err();
        assert!(matches!(err, ApiError::DataIntegrity { id: bad, .. } if bad == id));
    }
}
