//! Shipping address payload and response types.

use serde::{Deserialize, Serialize};

use super::id::{AddressId, UserId};

/// The structured address fields describing one shipping destination.
///
/// Every field is optional. A payload is always written and read as a whole:
/// updating an address replaces the stored payload, so fields missing from the
/// new payload are gone afterwards.
///
/// Absent fields serialize as `null` so API consumers always see the full set
/// of keys.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AddressPayload {
    pub reference_field: Option<String>,
    pub shipping_first_name: Option<String>,
    pub shipping_last_name: Option<String>,
    pub shipping_company: Option<String>,
    pub shipping_country: Option<String>,
    pub shipping_address_1: Option<String>,
    pub shipping_address_2: Option<String>,
    pub shipping_city: Option<String>,
    pub shipping_state: Option<String>,
    pub shipping_postcode: Option<String>,
}

/// A stored shipping address as returned by the list endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShippingAddress {
    pub id: AddressId,
    pub user_id: UserId,
    #[serde(rename = "type")]
    pub address_type: String,
    pub user_data: AddressPayload,
}
