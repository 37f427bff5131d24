//! Shipping address route handlers.

use axum::{
    Json,
    extract::{FromRequestParts, Path, Query, State, rejection::QueryRejection},
    http::request::Parts,
};
use multiship_core::{AddressId, ShippingAddress};

use crate::error::{ApiError, Result};
use crate::models::address::{CREATED_MESSAGE, UPDATED_MESSAGE};
use crate::models::{CreateAddressParams, ListAddressParams, MessageResponse, UpdateAddressParams};
use crate::routes::params::RequestParams;
use crate::state::AppState;

/// Extractor for the numeric `{id}` path segment.
///
/// Anything other than a run of ASCII digits that fits in an `i32` is
/// rejected before the handler runs, as if no route had matched.
#[derive(Debug, Clone, Copy)]
pub struct AddressIdPath(pub AddressId);

impl<S> FromRequestParts<S> for AddressIdPath
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|_| ApiError::NoRoute)?;

        parse_address_id(&raw).map(Self).ok_or(ApiError::NoRoute)
    }
}

fn parse_address_id(raw: &str) -> Option<AddressId> {
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    raw.parse().ok()
}

/// `GET /customers/multiple-shipping-address`
///
/// # Errors
///
/// Returns `invalid_params` for a non-numeric `user_id`, and a server error
/// if the store fails or a stored payload cannot be decoded.
pub async fn list_addresses(
    State(state): State<AppState>,
    query: std::result::Result<Query<ListAddressParams>, QueryRejection>,
) -> Result<Json<Vec<ShippingAddress>>> {
    let Query(params) = query.map_err(|e| ApiError::InvalidParameters(e.body_text()))?;
    let filter = params.into_filter()?;

    let addresses = state.addresses().list(filter).await?;
    Ok(Json(addresses))
}

/// `POST /customers/multiple-shipping-address`
///
/// Fields may come from the query string, a form body or a JSON body.
///
/// # Errors
///
/// Returns `invalid_params` if `userid`, `type` or `userdata` is missing, and
/// `insert_failed` if the row could not be stored.
pub async fn create_address(
    State(state): State<AppState>,
    params: RequestParams,
) -> Result<Json<MessageResponse>> {
    let params: CreateAddressParams = params.parse();

    let new = params.validate().inspect_err(|e| {
        tracing::warn!(error = %e, "Rejected shipping address create");
    })?;

    state.addresses().create(new).await?;
    Ok(Json(MessageResponse::new(CREATED_MESSAGE)))
}

/// `PATCH /customers/multiple-shipping-address/{id}`
///
/// # Errors
///
/// Returns `shipping_address_not_found` for an unknown id, `invalid_params`
/// if `userdata` is missing, and `update_failed` if the row was not updated.
pub async fn update_address(
    State(state): State<AppState>,
    AddressIdPath(id): AddressIdPath,
    params: RequestParams,
) -> Result<Json<MessageResponse>> {
    let params: UpdateAddressParams = params.parse();

    state.addresses().update(id, params).await.inspect_err(|e| {
        if matches!(e, ApiError::InvalidParameters(_)) {
            tracing::warn!(address_id = %id, error = %e, "Rejected shipping address update");
        }
    })?;

    Ok(Json(MessageResponse::new(UPDATED_MESSAGE)))
}
