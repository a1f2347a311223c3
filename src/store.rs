//! Persistence collaborator.
//!
//! The dispatcher never talks to storage; server variants reach it through
//! [`PropertyStore`]. [`InMemoryPropertyStore`] backs the binary and the tests.

use {
    crate::models::{Booking, BookingStatus, Property, PropertyQuery, PropertyStatus},
    anyhow::Result,
    async_trait::async_trait,
    chrono::{DateTime, NaiveDate, Utc},
    dashmap::DashMap,
    uuid::Uuid,
};

#[async_trait]
pub trait PropertyStore: Send + Sync {
    /// All properties, ordered by title
    async fn list_properties(&self) -> Result<Vec<Property>>;

    async fn get_property(&self, id: Uuid) -> Result<Option<Property>>;

    /// Properties matching `query`, ordered by title
    async fn search(&self, query: &PropertyQuery) -> Result<Vec<Property>>;

    /// All bookings, ordered by check-in date
    async fn list_bookings(&self) -> Result<Vec<Booking>>;

    async fn bookings_for(&self, property_id: Uuid) -> Result<Vec<Booking>>;
}

#[derive(Debug, Default)]
pub struct InMemoryPropertyStore {
    properties: DashMap<Uuid, Property>,
    bookings: DashMap<Uuid, Booking>,
}

impl InMemoryPropertyStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_property(&self, property: Property) {
        self.properties.insert(property.id, property);
    }

    pub fn insert_booking(&self, booking: Booking) {
        self.bookings.insert(booking.id, booking);
    }

    /// Store seeded with a small fixed portfolio.
    pub fn with_sample_data() -> Self {
        let store = Self::new();
        for property in sample_properties() {
            store.insert_property(property);
        }
        for booking in sample_bookings() {
            store.insert_booking(booking);
        }
        store
    }

    fn sorted_properties(&self, query: Option<&PropertyQuery>) -> Vec<Property> {
        let mut properties: Vec<Property> = self
            .properties
            .iter()
            .filter(|entry| query.map_or(true, |q| q.matches(entry.value())))
            .map(|entry| entry.value().clone())
            .collect();
        properties.sort_by(|a, b| a.title.cmp(&b.title).then(a.id.cmp(&b.id)));
        properties
    }
}

#[async_trait]
impl PropertyStore for InMemoryPropertyStore {
    async fn list_properties(&self) -> Result<Vec<Property>> {
        Ok(self.sorted_properties(None))
    }

    async fn get_property(&self, id: Uuid) -> Result<Option<Property>> {
        Ok(self.properties.get(&id).map(|entry| entry.value().clone()))
    }

    async fn search(&self, query: &PropertyQuery) -> Result<Vec<Property>> {
        Ok(self.sorted_properties(Some(query)))
    }

    async fn list_bookings(&self) -> Result<Vec<Booking>> {
        let mut bookings: Vec<Booking> = self
            .bookings
            .iter()
            .map(|entry| entry.value().clone())
            .collect();
        bookings.sort_by(|a, b| a.check_in_date.cmp(&b.check_in_date).then(a.id.cmp(&b.id)));
        Ok(bookings)
    }

    async fn bookings_for(&self, property_id: Uuid) -> Result<Vec<Booking>> {
        Ok(self
            .list_bookings()
            .await?
            .into_iter()
            .filter(|b| b.property_id == property_id)
            .collect())
    }
}

/// Fixed ids of the sample portfolio, handy for callers and tests
pub const SAMPLE_LOFT_ID: Uuid = Uuid::from_u128(0x6f1c_0000_0000_4000_8000_0000_0000_0001);
pub const SAMPLE_COTTAGE_ID: Uuid = Uuid::from_u128(0x6f1c_0000_0000_4000_8000_0000_0000_0002);
pub const SAMPLE_VILLA_ID: Uuid = Uuid::from_u128(0x6f1c_0000_0000_4000_8000_0000_0000_0003);

fn at(secs: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(secs, 0).unwrap_or_default()
}

fn day(year: i32, month: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, d).unwrap_or_default()
}

fn sample_properties() -> Vec<Property> {
    let amenities = |list: &[&str]| list.iter().map(|a| a.to_string()).collect();
    vec![
        Property {
            id: SAMPLE_LOFT_ID,
            title: "Downtown Loft".to_string(),
            description: "Open-plan loft a short walk from the waterfront".to_string(),
            address: "120 Market St, San Francisco, CA".to_string(),
            base_price: 185.0,
            max_guests: 4,
            bedrooms: 2,
            bathrooms: 1,
            amenities: amenities(&["WiFi", "Kitchen", "Washer"]),
            status: PropertyStatus::Active,
            created_at: at(1_704_067_200),
            updated_at: at(1_717_200_000),
        },
        Property {
            id: SAMPLE_COTTAGE_ID,
            title: "Garden Cottage".to_string(),
            description: "Quiet cottage with a private garden".to_string(),
            address: "8 Elm Rd, Oakland, CA".to_string(),
            base_price: 120.0,
            max_guests: 2,
            bedrooms: 1,
            bathrooms: 1,
            amenities: amenities(&["WiFi", "Parking"]),
            status: PropertyStatus::Active,
            created_at: at(1_706_745_600),
            updated_at: at(1_717_200_000),
        },
        Property {
            id: SAMPLE_VILLA_ID,
            title: "Hillside Villa".to_string(),
            description: "Four-bedroom villa with bay views and a pool".to_string(),
            address: "77 Vista Dr, Sausalito, CA".to_string(),
            base_price: 420.0,
            max_guests: 8,
            bedrooms: 4,
            bathrooms: 3,
            amenities: amenities(&["WiFi", "Pool", "Kitchen", "Parking", "Hot Tub"]),
            status: PropertyStatus::Maintenance,
            created_at: at(1_709_251_200),
            updated_at: at(1_719_792_000),
        },
    ]
}

fn sample_bookings() -> Vec<Booking> {
    vec![
        Booking {
            id: Uuid::from_u128(0xb00c_0000_0000_4000_8000_0000_0000_0001),
            property_id: SAMPLE_LOFT_ID,
            guest_id: Uuid::from_u128(0x9e57_0000_0000_4000_8000_0000_0000_0001),
            check_in_date: day(2024, 6, 3),
            check_out_date: day(2024, 6, 7),
            total_price: 740.0,
            status: BookingStatus::CheckedOut,
            created_at: at(1_714_521_600),
        },
        Booking {
            id: Uuid::from_u128(0xb00c_0000_0000_4000_8000_0000_0000_0002),
            property_id: SAMPLE_COTTAGE_ID,
            guest_id: Uuid::from_u128(0x9e57_0000_0000_4000_8000_0000_0000_0002),
            check_in_date: day(2024, 7, 12),
            check_out_date: day(2024, 7, 14),
            total_price: 240.0,
            status: BookingStatus::Confirmed,
            created_at: at(1_717_200_000),
        },
        Booking {
            id: Uuid::from_u128(0xb00c_0000_0000_4000_8000_0000_0000_0003),
            property_id: SAMPLE_LOFT_ID,
            guest_id: Uuid::from_u128(0x9e57_0000_0000_4000_8000_0000_0000_0003),
            check_in_date: day(2024, 8, 1),
            check_out_date: day(2024, 8, 5),
            total_price: 780.0,
            status: BookingStatus::Cancelled,
            created_at: at(1_719_792_000),
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_sample_data_is_ordered() {
        let store = InMemoryPropertyStore::with_sample_data();
        let titles: Vec<_> = store
            .list_properties()
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.title)
            .collect();
        assert_eq!(titles, vec!["Downtown Loft", "Garden Cottage", "Hillside Villa"]);
        assert_eq!(store.bookings_for(SAMPLE_LOFT_ID).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_search_filters() {
        let store = InMemoryPropertyStore::with_sample_data();
        let query = PropertyQuery {
            max_price: Some(200.0),
            amenities: vec!["wifi".to_string()],
            ..Default::default()
        };
        let found = store.search(&query).await.unwrap();
        assert_eq!(found.len(), 2);

        let query = PropertyQuery {
            location: Some("sausalito".to_string()),
            ..Default::default()
        };
        let found = store.search(&query).await.unwrap();
        assert_eq!(found[0].id, SAMPLE_VILLA_ID);
    }
}
