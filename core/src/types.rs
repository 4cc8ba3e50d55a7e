//! Resource DTOs for the NPS API.
//!
//! # Design
//! Field names mirror the API's JSON exactly. The API omits or nulls fields
//! freely, so every field defaults when absent; values the API sends as
//! strings (including numbers such as `total` or `latitude`) stay strings.
//! A `null` scalar decodes as its zero value and `null` list elements are
//! dropped.

use serde::{Deserialize, Deserializer, Serialize};

/// Deserializes `null` as the type's default value.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Deserializes a list, treating `null` as empty and dropping `null` elements.
fn null_elements_skipped<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    let items = Option::<Vec<Option<T>>>::deserialize(deserializer)?;
    Ok(items.unwrap_or_default().into_iter().flatten().collect())
}

/// One page of the `/parks` endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Parks {
    #[serde(deserialize_with = "null_as_default")]
    pub total: String,
    #[serde(deserialize_with = "null_as_default")]
    pub limit: String,
    #[serde(deserialize_with = "null_as_default")]
    pub start: String,
    #[serde(deserialize_with = "null_elements_skipped")]
    pub data: Vec<Park>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Park {
    #[serde(deserialize_with = "null_elements_skipped")]
    pub activities: Vec<Activity>,
    #[serde(deserialize_with = "null_elements_skipped")]
    pub addresses: Vec<Address>,
    pub contacts: Option<Contacts>,
    #[serde(deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(deserialize_with = "null_as_default")]
    pub designation: String,
    #[serde(deserialize_with = "null_as_default")]
    pub directions_info: String,
    #[serde(deserialize_with = "null_as_default")]
    pub directions_url: String,
    #[serde(deserialize_with = "null_elements_skipped")]
    pub entrance_fees: Vec<EntranceFee>,
    #[serde(deserialize_with = "null_elements_skipped")]
    pub entrance_passes: Vec<EntrancePass>,
    #[serde(deserialize_with = "null_as_default")]
    pub full_name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(deserialize_with = "null_elements_skipped")]
    pub images: Vec<Image>,
    #[serde(deserialize_with = "null_as_default")]
    pub lat_long: String,
    #[serde(deserialize_with = "null_as_default")]
    pub latitude: String,
    #[serde(deserialize_with = "null_as_default")]
    pub longitude: String,
    #[serde(deserialize_with = "null_elements_skipped")]
    pub multimedia: Vec<Multimedia>,
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(deserialize_with = "null_elements_skipped")]
    pub operating_hours: Vec<OperatingHours>,
    #[serde(deserialize_with = "null_as_default")]
    pub park_code: String,
    #[serde(deserialize_with = "null_as_default")]
    pub relevance_score: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub states: String,
    #[serde(deserialize_with = "null_elements_skipped")]
    pub topics: Vec<Topic>,
    #[serde(deserialize_with = "null_as_default")]
    pub url: String,
    #[serde(deserialize_with = "null_as_default")]
    pub weather_info: String,
}

impl Park {
    /// Two-letter state codes the park spans, e.g. `["ID", "MT", "WY"]`.
    pub fn state_codes(&self) -> Vec<&str> {
        self.states
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Activity {
    #[serde(deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Topic {
    #[serde(deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PhoneNumber {
    #[serde(deserialize_with = "null_as_default")]
    pub phone_number: String,
    #[serde(deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(deserialize_with = "null_as_default")]
    pub extension: String,
    #[serde(rename = "type", deserialize_with = "null_as_default")]
    pub kind: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EmailAddress {
    #[serde(deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(deserialize_with = "null_as_default")]
    pub email_address: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Contacts {
    #[serde(deserialize_with = "null_elements_skipped")]
    pub phone_numbers: Vec<PhoneNumber>,
    #[serde(deserialize_with = "null_elements_skipped")]
    pub email_addresses: Vec<EmailAddress>,
}

/// Opening hours for each day of the week, as free text (e.g. `All Day`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Hours {
    #[serde(deserialize_with = "null_as_default")]
    pub wednesday: String,
    #[serde(deserialize_with = "null_as_default")]
    pub monday: String,
    #[serde(deserialize_with = "null_as_default")]
    pub thursday: String,
    #[serde(deserialize_with = "null_as_default")]
    pub sunday: String,
    #[serde(deserialize_with = "null_as_default")]
    pub tuesday: String,
    #[serde(deserialize_with = "null_as_default")]
    pub friday: String,
    #[serde(deserialize_with = "null_as_default")]
    pub saturday: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Exception {
    pub exception_hours: Option<Hours>,
    #[serde(deserialize_with = "null_as_default")]
    pub start_date: String,
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub end_date: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct OperatingHours {
    #[serde(deserialize_with = "null_elements_skipped")]
    pub exceptions: Vec<Exception>,
    #[serde(deserialize_with = "null_as_default")]
    pub description: String,
    pub standard_hours: Option<Hours>,
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Address {
    #[serde(deserialize_with = "null_as_default")]
    pub postal_code: String,
    #[serde(deserialize_with = "null_as_default")]
    pub city: String,
    #[serde(deserialize_with = "null_as_default")]
    pub state_code: String,
    #[serde(deserialize_with = "null_as_default")]
    pub country_code: String,
    #[serde(deserialize_with = "null_as_default")]
    pub province_territory_code: String,
    #[serde(deserialize_with = "null_as_default")]
    pub line1: String,
    #[serde(deserialize_with = "null_as_default")]
    pub line2: String,
    #[serde(deserialize_with = "null_as_default")]
    pub line3: String,
    #[serde(rename = "type", deserialize_with = "null_as_default")]
    pub kind: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Image {
    #[serde(deserialize_with = "null_as_default")]
    pub credit: String,
    #[serde(deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(deserialize_with = "null_as_default")]
    pub alt_text: String,
    #[serde(deserialize_with = "null_as_default")]
    pub caption: String,
    #[serde(deserialize_with = "null_as_default")]
    pub url: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EntranceFee {
    #[serde(deserialize_with = "null_as_default")]
    pub cost: String,
    #[serde(deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(deserialize_with = "null_as_default")]
    pub title: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EntrancePass {
    #[serde(deserialize_with = "null_as_default")]
    pub cost: String,
    #[serde(deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(deserialize_with = "null_as_default")]
    pub title: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Multimedia {
    #[serde(deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(rename = "type", deserialize_with = "null_as_default")]
    pub kind: String,
    #[serde(deserialize_with = "null_as_default")]
    pub url: String,
}
