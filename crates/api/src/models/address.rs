//! Request and response shapes for the address endpoints.
//!
//! Request bodies are deserialized into loosely-typed parameter structs first
//! and validated afterwards, so that every failure, including a wrong JSON
//! type, surfaces as `invalid_params` rather than a framework rejection.
//!
//! A parameter counts as empty when it is absent, `null`, `false`, `0`, `""`,
//! `"0"`, `[]`, or `{}`.

use multiship_core::{AddressPayload, UserId};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::db::AddressFilter;
use crate::error::ApiError;

pub const CREATE_REQUIRED_MESSAGE: &str = "User ID, type, and user data are required.";
pub const UPDATE_REQUIRED_MESSAGE: &str = "User data is required.";
pub const FILTER_REQUIRED_MESSAGE: &str = "At least one of user_id or type is required.";

pub const CREATED_MESSAGE: &str = "Shipping address created successfully";
pub const UPDATED_MESSAGE: &str = "Shipping address updated successfully";

/// Query parameters for `GET /customers/multiple-shipping-address`.
#[derive(Debug, Default, Deserialize)]
pub struct ListAddressParams {
    pub user_id: Option<String>,
    #[serde(rename = "type")]
    pub address_type: Option<String>,
}

/// Body of `POST /customers/multiple-shipping-address`.
#[derive(Debug, Default, Deserialize)]
pub struct CreateAddressParams {
    pub userid: Option<Value>,
    #[serde(rename = "type")]
    pub address_type: Option<Value>,
    pub userdata: Option<Value>,
}

/// Body of `PATCH /customers/multiple-shipping-address/{id}`.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateAddressParams {
    pub userdata: Option<Value>,
}

/// A validated create request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAddress {
    pub user_id: UserId,
    pub address_type: String,
    pub payload: AddressPayload,
}

/// Confirmation body for successful writes.
#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    #[must_use]
    pub fn new(message: &str) -> Self {
        Self {
            message: message.to_string(),
        }
    }
}

impl ListAddressParams {
    /// Turn the query parameters into a store filter.
    ///
    /// Empty values and a `user_id` of `0` mean "no filter".
    ///
    /// # Errors
    ///
    /// Returns `ApiError::InvalidParameters` if `user_id` is not numeric.
    pub fn into_filter(self) -> Result<AddressFilter, ApiError> {
        let user_id = match self.user_id.as_deref().map(str::trim) {
            None | Some("" | "0") => None,
            Some(raw) => Some(raw.parse::<UserId>().map_err(|_| {
                ApiError::InvalidParameters("user_id must be numeric.".to_string())
            })?),
        };

        let address_type = self.address_type.filter(|t| !t.is_empty());

        Ok(AddressFilter {
            address_type,
            user_id,
        })
    }
}

impl CreateAddressParams {
    /// Validate a create request.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::InvalidParameters` if any of `userid`, `type` or
    /// `userdata` is empty, or has the wrong shape.
    pub fn validate(self) -> Result<NewAddress, ApiError> {
        let (Some(userid), Some(address_type), Some(userdata)) = (
            non_empty(self.userid),
            non_empty(self.address_type),
            non_empty(self.userdata),
        ) else {
            return Err(ApiError::InvalidParameters(
                CREATE_REQUIRED_MESSAGE.to_string(),
            ));
        };

        let user_id = parse_user_id(&userid)?;

        let Value::String(address_type) = address_type else {
            return Err(ApiError::InvalidParameters(
                "type must be a string.".to_string(),
            ));
        };

        let payload = parse_payload(userdata, CREATE_REQUIRED_MESSAGE)?;

        Ok(NewAddress {
            user_id,
            address_type,
            payload,
        })
    }
}

impl UpdateAddressParams {
    /// Validate the replacement payload of an update request.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::InvalidParameters` if `userdata` is empty or has the
    /// wrong shape.
    pub fn into_payload(self) -> Result<AddressPayload, ApiError> {
        let userdata = non_empty(self.userdata).ok_or_else(|| {
            ApiError::InvalidParameters(UPDATE_REQUIRED_MESSAGE.to_string())
        })?;
        parse_payload(userdata, UPDATE_REQUIRED_MESSAGE)
    }
}

/// Returns `true` if a JSON value counts as empty.
fn is_empty(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f.abs() < f64::EPSILON),
        Value::String(s) => s.is_empty() || s == "0",
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
    }
}

fn non_empty(value: Option<Value>) -> Option<Value> {
    value.filter(|v| !is_empty(v))
}

/// Parse `userid` from a JSON integer or a numeric string.
fn parse_user_id(value: &Value) -> Result<UserId, ApiError> {
    let invalid = || ApiError::InvalidParameters("userid must be an integer.".to_string());

    let id = match value {
        Value::Number(n) => n
            .as_i64()
            .and_then(|n| i32::try_from(n).ok())
            .ok_or_else(invalid)?,
        Value::String(s) => s.trim().parse::<i32>().map_err(|_| invalid())?,
        _ => return Err(invalid()),
    };

    Ok(UserId::new(id))
}

/// Parse `userdata` from a JSON object or a string holding one.
///
/// A string holding an empty object counts as missing, like `{}` itself, and
/// is reported with `required_message`.
fn parse_payload(value: Value, required_message: &str) -> Result<AddressPayload, ApiError> {
    let object = match value {
        Value::Object(_) => value,
        Value::String(raw) => match serde_json::from_str::<Value>(&raw) {
            Ok(decoded @ Value::Object(_)) => {
                if is_empty(&decoded) {
                    return Err(ApiError::InvalidParameters(required_message.to_string()));
                }
                decoded
            }
            _ => return Err(not_an_address()),
        },
        _ => return Err(not_an_address()),
    };

    serde_json::from_value(object)
        .map_err(|e| ApiError::InvalidParameters(format!("userdata is invalid: {e}.")))
}

fn not_an_address() -> ApiError {
    ApiError::InvalidParameters("userdata must be an address object.".to_string())
}
