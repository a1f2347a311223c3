//! Domain records exchanged with the persistence collaborator.

use {
    chrono::{DateTime, NaiveDate, Utc},
    schemars::JsonSchema,
    serde::{Deserialize, Serialize},
    uuid::Uuid,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub enum PropertyStatus {
    Active,
    Inactive,
    Maintenance,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BookingStatus {
    Pending,
    Confirmed,
    CheckedIn,
    CheckedOut,
    Cancelled,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Property {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub address: String,
    /// Nightly base price
    pub base_price: f64,
    pub max_guests: u32,
    pub bedrooms: u32,
    pub bathrooms: u32,
    pub amenities: Vec<String>,
    pub status: PropertyStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    pub id: Uuid,
    pub property_id: Uuid,
    pub guest_id: Uuid,
    pub check_in_date: NaiveDate,
    pub check_out_date: NaiveDate,
    pub total_price: f64,
    pub status: BookingStatus,
    pub created_at: DateTime<Utc>,
}

impl Booking {
    pub fn nights(&self) -> i64 {
        (self.check_out_date - self.check_in_date).num_days()
    }
}

/// Filter applied by [`crate::store::PropertyStore::search`]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PropertyQuery {
    pub location: Option<String>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub bedrooms: Option<u32>,
    /// Minimum guest capacity
    pub max_guests: Option<u32>,
    pub amenities: Vec<String>,
    pub status: Option<PropertyStatus>,
}

impl PropertyQuery {
    pub fn matches(&self, property: &Property) -> bool {
        if let Some(location) = &self.location {
            if !property
                .address
                .to_lowercase()
                .contains(&location.to_lowercase())
            {
                return false;
            }
        }
        if self.min_price.is_some_and(|min| property.base_price < min) {
            return false;
        }
        if self.max_price.is_some_and(|max| property.base_price > max) {
            return false;
        }
        if self.bedrooms.is_some_and(|n| property.bedrooms != n) {
            return false;
        }
        if self.max_guests.is_some_and(|n| property.max_guests < n) {
            return false;
        }
        if self.status.is_some_and(|s| property.status != s) {
            return false;
        }
        self.amenities.iter().all(|wanted| {
            property
                .amenities
                .iter()
                .any(|have| have.eq_ignore_ascii_case(wanted))
        })
    }
}
