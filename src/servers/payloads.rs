//! Payload producers shared by the server variants.
//!
//! Everything here is deterministic for a given store state so repeated reads
//! of a resource return identical documents.

use {
    crate::{
        error::{McpError, McpResult},
        models::{Booking, BookingStatus, Property},
        store::PropertyStore,
    },
    chrono::{Datelike, NaiveDate, Weekday},
    serde::Serialize,
    serde_json::{json, Value},
    std::collections::HashMap,
    uuid::Uuid,
};

pub const PROPERTIES_URI: &str = "airbnb://properties";
pub const ANALYTICS_URI: &str = "airbnb://analytics";
pub const BOOKINGS_URI: &str = "airbnb://bookings";
pub const MARKET_DATA_URI: &str = "airbnb://market-data";
pub const PRICING_RULES_URI: &str = "airbnb://pricing-rules";

pub fn internal(err: anyhow::Error) -> McpError {
    McpError::Internal(err.to_string())
}

pub fn parse_property_id(raw: &str) -> McpResult<Uuid> {
    Uuid::parse_str(raw.trim())
        .map_err(|_| McpError::InvalidParams(format!("property_id is not a valid id: '{raw}'")))
}

/// Resolve a property or fail with a caller-facing error.
pub async fn load_property(store: &dyn PropertyStore, raw_id: &str) -> McpResult<Property> {
    let id = parse_property_id(raw_id)?;
    store
        .get_property(id)
        .await
        .map_err(internal)?
        .ok_or_else(|| McpError::InvalidParams(format!("Property not found: {id}")))
}

pub fn parse_date(field: &str, raw: &str) -> McpResult<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|_| McpError::InvalidParams(format!("{field} must be a YYYY-MM-DD date, got '{raw}'")))
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Breakdown of a priced stay
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StayQuote {
    pub property_id: Uuid,
    pub base_price: f64,
    pub dynamic_price: f64,
    pub total_price: f64,
    pub nights: i64,
    pub factors: QuoteFactors,
    pub breakdown: QuoteBreakdown,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteFactors {
    pub seasonal: f64,
    pub demand: f64,
    pub guest_count: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteBreakdown {
    pub base_amount: f64,
    pub seasonal_adjustment: f64,
    pub demand_adjustment: f64,
    pub guest_adjustment: f64,
}

fn seasonal_multiplier(check_in: NaiveDate) -> f64 {
    match check_in.month() {
        6..=8 => 1.25,
        12 => 1.2,
        1 | 2 => 0.9,
        _ => 1.0,
    }
}

fn demand_multiplier(check_in: NaiveDate, nights: i64) -> f64 {
    let weekend_nights = check_in
        .iter_days()
        .take(nights as usize)
        .filter(|d| matches!(d.weekday(), Weekday::Fri | Weekday::Sat))
        .count();
    1.0 + 0.1 * weekend_nights as f64 / nights as f64
}

/// Price a stay at `property`.
///
/// Fails when the dates are inverted or the party exceeds the capacity.
pub fn quote_stay(
    property: &Property,
    check_in: NaiveDate,
    check_out: NaiveDate,
    guest_count: u32,
) -> McpResult<StayQuote> {
    let nights = (check_out - check_in).num_days();
    if nights <= 0 {
        return Err(McpError::InvalidParams(
            "check-out date must be after check-in date".to_string(),
        ));
    }
    if guest_count == 0 || guest_count > property.max_guests {
        return Err(McpError::InvalidParams(format!(
            "guest_count must be between 1 and {}, got {guest_count}",
            property.max_guests
        )));
    }

    let seasonal = seasonal_multiplier(check_in);
    let demand = demand_multiplier(check_in, nights);
    let guests = if guest_count > property.max_guests / 2 { 1.1 } else { 1.0 };

    let base = property.base_price;
    let dynamic_price = round2(base * seasonal * demand * guests);
    let base_amount = base * nights as f64;

    Ok(StayQuote {
        property_id: property.id,
        base_price: base,
        dynamic_price,
        total_price: round2(dynamic_price * nights as f64),
        nights,
        factors: QuoteFactors {
            seasonal,
            demand: round2(demand),
            guest_count: guests,
        },
        breakdown: QuoteBreakdown {
            base_amount: round2(base_amount),
            seasonal_adjustment: round2((seasonal - 1.0) * base_amount),
            demand_adjustment: round2((demand - 1.0) * base_amount),
            guest_adjustment: round2((guests - 1.0) * base_amount),
        },
    })
}

/// Booking-derived performance of one property
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyStats {
    pub bookings: usize,
    pub cancellations: usize,
    pub booked_nights: i64,
    pub revenue: f64,
}

impl PropertyStats {
    /// Share of `period_days` covered by bookings, in percent
    pub fn occupancy_rate(&self, period_days: i64) -> f64 {
        if period_days <= 0 {
            return 0.0;
        }
        round2((self.booked_nights as f64 / period_days as f64 * 100.0).min(100.0))
    }
}

pub fn stats_by_property(bookings: &[Booking]) -> HashMap<Uuid, PropertyStats> {
    let mut stats: HashMap<Uuid, PropertyStats> = HashMap::new();
    for booking in bookings {
        let entry = stats.entry(booking.property_id).or_default();
        if booking.status == BookingStatus::Cancelled {
            entry.cancellations += 1;
            continue;
        }
        entry.bookings += 1;
        entry.booked_nights += booking.nights();
        entry.revenue = round2(entry.revenue + booking.total_price);
    }
    stats
}

pub async fn properties_document(store: &dyn PropertyStore) -> McpResult<Value> {
    let properties = store.list_properties().await.map_err(internal)?;
    Ok(json!({
        "properties": properties,
        "totalCount": properties.len(),
    }))
}

pub async fn bookings_document(store: &dyn PropertyStore) -> McpResult<Value> {
    let bookings = store.list_bookings().await.map_err(internal)?;
    Ok(json!({
        "bookings": bookings,
        "totalCount": bookings.len(),
    }))
}

/// Portfolio overview with the top performers by revenue
pub async fn analytics_document(store: &dyn PropertyStore) -> McpResult<Value> {
    let properties = store.list_properties().await.map_err(internal)?;
    let bookings = store.list_bookings().await.map_err(internal)?;
    let stats = stats_by_property(&bookings);

    let mut performers: Vec<(&Property, PropertyStats)> = properties
        .iter()
        .map(|p| (p, stats.get(&p.id).cloned().unwrap_or_default()))
        .collect();

    // summed in listing order so repeated reads agree to the last bit
    let total_revenue: f64 = performers.iter().map(|(_, s)| s.revenue).sum();
    let booked_nights: i64 = performers.iter().map(|(_, s)| s.booked_nights).sum();
    let average_revenue = if properties.is_empty() {
        0.0
    } else {
        round2(total_revenue / properties.len() as f64)
    };
    performers.sort_by(|a, b| {
        b.1.revenue
            .total_cmp(&a.1.revenue)
            .then_with(|| a.0.title.cmp(&b.0.title))
    });

    let top_performers: Vec<Value> = performers
        .iter()
        .take(3)
        .map(|(property, stats)| {
            json!({
                "propertyId": property.id,
                "title": property.title,
                "revenue": stats.revenue,
                "bookings": stats.bookings,
            })
        })
        .collect();

    Ok(json!({
        "overview": {
            "totalProperties": properties.len(),
            "totalBookings": bookings.len(),
            "bookedNights": booked_nights,
            "totalRevenue": round2(total_revenue),
            "averageRevenue": average_revenue,
        },
        "topPerformers": top_performers,
    }))
}

pub fn market_data_document() -> Value {
    json!({
        "marketConditions": {
            "averagePrice": 175.0,
            "occupancyRate": 74.2,
            "competitorCount": 24,
            "demandLevel": "High"
        },
        "competitorAnalysis": [
            { "propertyType": "Apartment", "averagePrice": 165, "count": 12 },
            { "propertyType": "House", "averagePrice": 220, "count": 8 },
            { "propertyType": "Condo", "averagePrice": 185, "count": 4 }
        ],
        "seasonalTrends": [
            { "month": "Jan", "demand": 0.8, "priceMultiplier": 0.9 },
            { "month": "Feb", "demand": 0.85, "priceMultiplier": 0.9 },
            { "month": "Mar", "demand": 1.0, "priceMultiplier": 1.0 },
            { "month": "Jun", "demand": 1.3, "priceMultiplier": 1.25 },
            { "month": "Dec", "demand": 1.2, "priceMultiplier": 1.2 }
        ]
    })
}

pub fn pricing_rules_document() -> Value {
    json!({
        "rules": [
            {
                "name": "Seasonal Adjustment",
                "description": "Summer stays x1.25, December x1.2, January and February x0.9",
                "active": true
            },
            {
                "name": "Weekend Demand",
                "description": "Up to +10% scaled by the share of Friday and Saturday nights",
                "active": true
            },
            {
                "name": "Large Party",
                "description": "+10% when the party exceeds half the property's capacity",
                "active": true
            }
        ],
        "baseRules": {
            "minimumPrice": 50.0,
            "maximumDiscount": 0.3,
            "advanceBookingDiscount": 0.1
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{InMemoryPropertyStore, SAMPLE_COTTAGE_ID, SAMPLE_LOFT_ID};

    async fn loft() -> Property {
        let store = InMemoryPropertyStore::with_sample_data();
        store.get_property(SAMPLE_LOFT_ID).await.unwrap().unwrap()
    }

    #[tokio::test]
    async fn test_quote_midweek_off_season() {
        let property = loft().await;
        // Mon 2025-03-03 .. Wed 2025-03-05
        let quote = quote_stay(
            &property,
            parse_date("check_in", "2025-03-03").unwrap(),
            parse_date("check_out", "2025-03-05").unwrap(),
            2,
        )
        .unwrap();
        assert_eq!(quote.nights, 2);
        assert_eq!(quote.dynamic_price, 185.0);
        assert_eq!(quote.total_price, 370.0);
    }

    #[tokio::test]
    async fn test_quote_rejects_bad_input() {
        let property = loft().await;
        let day = parse_date("d", "2025-03-03").unwrap();
        assert!(quote_stay(&property, day, day, 2).is_err());

        let later = parse_date("d", "2025-03-04").unwrap();
        let err = quote_stay(&property, day, later, 9).unwrap_err();
        assert_eq!(err.error_code(), -32602);
    }

    #[test]
    fn test_parse_helpers() {
        assert!(parse_date("check_in", "03/04/2025").is_err());
        assert!(parse_property_id("not-a-uuid").is_err());
        assert_eq!(
            parse_property_id(&SAMPLE_COTTAGE_ID.to_string()).unwrap(),
            SAMPLE_COTTAGE_ID
        );
    }

    #[tokio::test]
    async fn test_stats_skip_cancellations() {
        let store = InMemoryPropertyStore::with_sample_data();
        let stats = stats_by_property(&store.list_bookings().await.unwrap());
        let loft = &stats[&SAMPLE_LOFT_ID];
        assert_eq!(loft.bookings, 1);
        assert_eq!(loft.cancellations, 1);
        assert_eq!(loft.booked_nights, 4);
        assert_eq!(loft.revenue, 740.0);
    }
}
