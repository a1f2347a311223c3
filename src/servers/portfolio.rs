//! Portfolio server
//!
//! Dashboard-facing variant: four portfolio resources and six tools covering
//! listing optimization, dynamic pricing, market analysis, guest messaging,
//! property search and performance analytics.

use {
    super::{
        payloads::{
            self, ANALYTICS_URI, MARKET_DATA_URI, PRICING_RULES_URI, PROPERTIES_URI,
        },
        ServerContext,
    },
    crate::{
        content::ResourceContents,
        error::{McpError, McpResult},
        handler::ServerHooks,
        models::{Property, PropertyQuery, PropertyStatus},
        protocol::{Request, ResourceDescriptor, Response},
        registry::Registry,
        router::ToolRouter,
    },
    anyhow::Result,
    async_trait::async_trait,
    rand::Rng,
    schemars::JsonSchema,
    serde::{Deserialize, Serialize},
    serde_json::{json, Map, Value},
    std::sync::Arc,
};

/// Market-wide nightly average used for competitor comparisons
const MARKET_AVERAGE_PRICE: f64 = 175.0;

const STANDARD_AMENITIES: &[&str] = &[
    "WiFi",
    "Kitchen",
    "Washer",
    "Parking",
    "Air Conditioning",
    "Workspace",
];

const ESCALATION_KEYWORDS: &[&str] = &["refund", "broken", "dirty", "unsafe", "cancel"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum OptimizationGoal {
    Occupancy,
    Revenue,
    Reviews,
    Visibility,
}

/// Input for `optimize_property`
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct OptimizePropertyInput {
    /// Id of the property to optimize
    pub property_id: String,
    /// What the optimization should favour
    #[serde(default)]
    pub optimization_goals: Vec<OptimizationGoal>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceRecommendation {
    pub current_price: f64,
    pub recommended_price: f64,
    pub reasoning: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyOptimization {
    pub property_id: String,
    pub optimized_title: String,
    pub optimized_description: String,
    pub suggested_amenities: Vec<String>,
    pub pricing_recommendation: PriceRecommendation,
    pub focus_areas: Vec<OptimizationGoal>,
}

/// Input for `calculate_dynamic_pricing`
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct DynamicPricingInput {
    pub property_id: String,
    /// Check-in date, YYYY-MM-DD
    pub check_in_date: String,
    /// Check-out date, YYYY-MM-DD
    pub check_out_date: String,
    /// Number of guests, defaults to 1
    pub guest_count: Option<u32>,
    /// Compare the quote against the market average
    pub include_competitors: Option<bool>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompetitorComparison {
    pub market_average: f64,
    pub difference_percent: f64,
    pub position: &'static str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DynamicPricing {
    #[serde(flatten)]
    pub quote: payloads::StayQuote,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub competitors: Option<CompetitorComparison>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum PropertyType {
    Apartment,
    House,
    Condo,
    Studio,
}

/// Input for `analyze_market_conditions`
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct MarketConditionsInput {
    /// City, neighbourhood or address fragment
    pub location: String,
    pub property_type: Option<PropertyType>,
    /// Search radius in kilometres, defaults to 5
    pub radius_km: Option<f64>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketConditions {
    pub location: String,
    pub radius_km: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub property_type: Option<PropertyType>,
    pub comparable_listings: usize,
    pub average_price: f64,
    pub market_average_price: f64,
    pub demand_level: &'static str,
    pub recommendations: Vec<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Tone {
    #[default]
    Professional,
    Friendly,
    Apologetic,
    Informative,
}

impl Tone {
    fn greetings(self) -> &'static [&'static str] {
        match self {
            Tone::Professional => &["Dear Guest,", "Good day,", "Thank you for reaching out,"],
            Tone::Friendly => &["Hi there!", "Hello!", "Hey, thanks for your message!"],
            Tone::Apologetic => &[
                "We sincerely apologize,",
                "We're very sorry for the inconvenience,",
            ],
            Tone::Informative => &["Hello,", "Thanks for your question,"],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum MessageType {
    Inquiry,
    Booking,
    Complaint,
    Checkin,
    Checkout,
}

/// Input for `generate_guest_response`
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct GuestResponseInput {
    /// The guest's message
    pub guest_message: String,
    pub tone: Option<Tone>,
    pub message_type: Option<MessageType>,
    /// Property the conversation is about
    pub property_id: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GuestResponse {
    pub response: String,
    pub tone: Tone,
    pub suggested_actions: Vec<String>,
    pub escalation_required: bool,
}

#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
pub struct SearchFilters {
    pub location: Option<String>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub bedrooms: Option<u32>,
    /// Minimum guest capacity
    pub guests: Option<u32>,
    #[serde(default)]
    pub amenities: Vec<String>,
    pub status: Option<PropertyStatus>,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum SortBy {
    #[default]
    Price,
    Revenue,
    Occupancy,
}

/// Input for `search_properties`
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct SearchPropertiesInput {
    pub filters: Option<SearchFilters>,
    pub sort_by: Option<SortBy>,
    /// Maximum number of results, 1 to 100, defaults to 10
    pub limit: Option<u32>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResults {
    pub properties: Vec<Property>,
    pub count: usize,
    pub total_matches: usize,
    pub sort_by: SortBy,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, JsonSchema)]
pub enum TimePeriod {
    #[serde(rename = "7d")]
    Week,
    #[default]
    #[serde(rename = "30d")]
    Month,
    #[serde(rename = "90d")]
    Quarter,
    #[serde(rename = "1y")]
    Year,
}

impl TimePeriod {
    fn days(self) -> i64 {
        match self {
            TimePeriod::Week => 7,
            TimePeriod::Month => 30,
            TimePeriod::Quarter => 90,
            TimePeriod::Year => 365,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    Occupancy,
    Revenue,
    Bookings,
    Cancellations,
    AverageNightlyRate,
}

impl Metric {
    const ALL: [Metric; 5] = [
        Metric::Occupancy,
        Metric::Revenue,
        Metric::Bookings,
        Metric::Cancellations,
        Metric::AverageNightlyRate,
    ];

    fn key(self) -> &'static str {
        match self {
            Metric::Occupancy => "occupancy",
            Metric::Revenue => "revenue",
            Metric::Bookings => "bookings",
            Metric::Cancellations => "cancellations",
            Metric::AverageNightlyRate => "average_nightly_rate",
        }
    }
}

/// Input for `get_performance_analytics`
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct PerformanceAnalyticsInput {
    /// Limit the report to one property; the whole portfolio otherwise
    pub property_id: Option<String>,
    pub time_period: Option<TimePeriod>,
    pub metrics: Option<Vec<Metric>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceReport {
    pub property_id: Option<String>,
    pub time_period: TimePeriod,
    pub period_days: i64,
    pub metrics: Map<String, Value>,
}

async fn optimize_property(
    input: OptimizePropertyInput,
    ctx: Arc<ServerContext>,
) -> McpResult<PropertyOptimization> {
    let property = payloads::load_property(ctx.store.as_ref(), &input.property_id).await?;

    let suggested_amenities = STANDARD_AMENITIES
        .iter()
        .filter(|amenity| {
            !property
                .amenities
                .iter()
                .any(|have| have.eq_ignore_ascii_case(amenity))
        })
        .map(|amenity| amenity.to_string())
        .collect();

    let goals = &input.optimization_goals;
    let (factor, reasoning) = if goals.contains(&OptimizationGoal::Occupancy) {
        (0.95, "A modest discount lifts occupancy in a competitive market")
    } else if goals.contains(&OptimizationGoal::Revenue) {
        (1.08, "Demand supports a higher nightly rate")
    } else {
        (1.0, "Current rate is in line with comparable listings")
    };

    let prompt = format!(
        "{}\nRewrite the listing description for: {}",
        property.title, property.description
    );
    let optimized_description = ctx.text.generate(&prompt).await.map_err(payloads::internal)?;

    Ok(PropertyOptimization {
        property_id: property.id.to_string(),
        optimized_title: format!("{} | {} BR, sleeps {}", property.title, property.bedrooms, property.max_guests),
        optimized_description,
        suggested_amenities,
        pricing_recommendation: PriceRecommendation {
            current_price: property.base_price,
            recommended_price: (property.base_price * factor * 100.0).round() / 100.0,
            reasoning: reasoning.to_string(),
        },
        focus_areas: input.optimization_goals,
    })
}

async fn calculate_dynamic_pricing(
    input: DynamicPricingInput,
    ctx: Arc<ServerContext>,
) -> McpResult<DynamicPricing> {
    let property = payloads::load_property(ctx.store.as_ref(), &input.property_id).await?;
    let check_in = payloads::parse_date("check_in_date", &input.check_in_date)?;
    let check_out = payloads::parse_date("check_out_date", &input.check_out_date)?;
    let quote = payloads::quote_stay(&property, check_in, check_out, input.guest_count.unwrap_or(1))?;

    let competitors = input.include_competitors.unwrap_or(false).then(|| {
        let difference = (quote.dynamic_price - MARKET_AVERAGE_PRICE) / MARKET_AVERAGE_PRICE * 100.0;
        CompetitorComparison {
            market_average: MARKET_AVERAGE_PRICE,
            difference_percent: (difference * 100.0).round() / 100.0,
            position: if difference > 5.0 {
                "above market"
            } else if difference < -5.0 {
                "below market"
            } else {
                "at market"
            },
        }
    });

    Ok(DynamicPricing { quote, competitors })
}

async fn analyze_market_conditions(
    input: MarketConditionsInput,
    ctx: Arc<ServerContext>,
) -> McpResult<MarketConditions> {
    let radius_km = input.radius_km.unwrap_or(5.0);
    if !(radius_km > 0.0) {
        return Err(McpError::InvalidParams(format!(
            "radius_km must be positive, got {radius_km}"
        )));
    }
    if input.location.trim().is_empty() {
        return Err(McpError::InvalidParams("location must not be empty".to_string()));
    }

    let query = PropertyQuery {
        location: Some(input.location.clone()),
        ..Default::default()
    };
    let comparables = ctx.store.search(&query).await.map_err(payloads::internal)?;
    let average_price = if comparables.is_empty() {
        MARKET_AVERAGE_PRICE
    } else {
        let total: f64 = comparables.iter().map(|p| p.base_price).sum();
        (total / comparables.len() as f64 * 100.0).round() / 100.0
    };

    let demand_level = match comparables.len() {
        0 => "Unknown",
        1 => "High",
        2..=4 => "Moderate",
        _ => "Saturated",
    };

    let mut recommendations = Vec::new();
    if average_price > MARKET_AVERAGE_PRICE {
        recommendations.push("Local rates sit above the market; emphasise premium amenities".to_string());
    } else {
        recommendations.push("Local rates sit at or below the market; room to raise weekend prices".to_string());
    }
    if comparables.is_empty() {
        recommendations.push(format!("No managed listings near {}; expansion opportunity", input.location));
    }

    Ok(MarketConditions {
        location: input.location,
        radius_km,
        property_type: input.property_type,
        comparable_listings: comparables.len(),
        average_price,
        market_average_price: MARKET_AVERAGE_PRICE,
        demand_level,
        recommendations,
    })
}

async fn generate_guest_response(
    input: GuestResponseInput,
    ctx: Arc<ServerContext>,
) -> McpResult<GuestResponse> {
    if input.guest_message.trim().is_empty() {
        return Err(McpError::InvalidParams("guest_message must not be empty".to_string()));
    }

    let property = match &input.property_id {
        Some(id) => Some(payloads::load_property(ctx.store.as_ref(), id).await?),
        None => None,
    };

    let tone = input.tone.unwrap_or_default();
    let subject = property
        .as_ref()
        .map_or_else(|| "your stay".to_string(), |p| p.title.clone());
    let prompt = format!("{subject}\nReply in a {tone:?} tone to: {}", input.guest_message);
    let body = ctx.text.generate(&prompt).await.map_err(payloads::internal)?;

    let greetings = tone.greetings();
    let greeting = greetings[rand::rng().random_range(0..greetings.len())];

    let lowered = input.guest_message.to_lowercase();
    let escalation_required = input.message_type == Some(MessageType::Complaint)
        || ESCALATION_KEYWORDS.iter().any(|k| lowered.contains(k));

    let mut suggested_actions = vec!["Follow up within 24 hours".to_string()];
    match input.message_type {
        Some(MessageType::Checkin) => suggested_actions.push("Send check-in instructions".to_string()),
        Some(MessageType::Checkout) => suggested_actions.push("Request a review".to_string()),
        Some(MessageType::Booking) => suggested_actions.push("Confirm booking details".to_string()),
        _ => {}
    }
    if escalation_required {
        suggested_actions.push("Escalate to the property manager".to_string());
    }

    Ok(GuestResponse {
        response: format!("{greeting} {body}"),
        tone,
        suggested_actions,
        escalation_required,
    })
}

async fn search_properties(
    input: SearchPropertiesInput,
    ctx: Arc<ServerContext>,
) -> McpResult<SearchResults> {
    let limit = input.limit.unwrap_or(10);
    if !(1..=100).contains(&limit) {
        return Err(McpError::InvalidParams(format!(
            "limit must be between 1 and 100, got {limit}"
        )));
    }

    let filters = input.filters.unwrap_or_default();
    let query = PropertyQuery {
        location: filters.location,
        min_price: filters.min_price,
        max_price: filters.max_price,
        bedrooms: filters.bedrooms,
        max_guests: filters.guests,
        amenities: filters.amenities,
        status: filters.status,
    };
    let mut properties = ctx.store.search(&query).await.map_err(payloads::internal)?;

    let sort_by = input.sort_by.unwrap_or_default();
    match sort_by {
        SortBy::Price => properties.sort_by(|a, b| a.base_price.total_cmp(&b.base_price)),
        SortBy::Revenue | SortBy::Occupancy => {
            let bookings = ctx.store.list_bookings().await.map_err(payloads::internal)?;
            let stats = payloads::stats_by_property(&bookings);
            let score = |p: &Property| {
                stats.get(&p.id).map_or(0.0, |s| match sort_by {
                    SortBy::Revenue => s.revenue,
                    _ => s.booked_nights as f64,
                })
            };
            properties.sort_by(|a, b| score(b).total_cmp(&score(a)));
        }
    }

    let total_matches = properties.len();
    properties.truncate(limit as usize);

    Ok(SearchResults {
        count: properties.len(),
        properties,
        total_matches,
        sort_by,
    })
}

async fn get_performance_analytics(
    input: PerformanceAnalyticsInput,
    ctx: Arc<ServerContext>,
) -> McpResult<PerformanceReport> {
    let time_period = input.time_period.unwrap_or_default();
    let period_days = time_period.days();

    let (bookings, property_count) = match &input.property_id {
        Some(raw) => {
            let property = payloads::load_property(ctx.store.as_ref(), raw).await?;
            let bookings = ctx
                .store
                .bookings_for(property.id)
                .await
                .map_err(payloads::internal)?;
            (bookings, 1)
        }
        None => {
            let properties = ctx.store.list_properties().await.map_err(payloads::internal)?;
            let bookings = ctx.store.list_bookings().await.map_err(payloads::internal)?;
            (bookings, properties.len().max(1))
        }
    };

    let totals = payloads::stats_by_property(&bookings).into_values().fold(
        payloads::PropertyStats::default(),
        |mut acc, s| {
            acc.bookings += s.bookings;
            acc.cancellations += s.cancellations;
            acc.booked_nights += s.booked_nights;
            acc.revenue += s.revenue;
            acc
        },
    );

    let requested = input.metrics.unwrap_or_else(|| Metric::ALL.to_vec());
    let mut metrics = Map::new();
    for metric in requested {
        let value = match metric {
            Metric::Occupancy => json!(totals.occupancy_rate(period_days * property_count as i64)),
            Metric::Revenue => json!((totals.revenue * 100.0).round() / 100.0),
            Metric::Bookings => json!(totals.bookings),
            Metric::Cancellations => json!(totals.cancellations),
            Metric::AverageNightlyRate => {
                if totals.booked_nights == 0 {
                    json!(0.0)
                } else {
                    json!((totals.revenue / totals.booked_nights as f64 * 100.0).round() / 100.0)
                }
            }
        };
        metrics.insert(metric.key().to_string(), value);
    }

    Ok(PerformanceReport {
        property_id: input.property_id,
        time_period,
        period_days,
        metrics,
    })
}

/// Dashboard server with the full tool suite
pub struct PortfolioServer {
    registry: Registry,
    tools: ToolRouter<ServerContext>,
}

impl PortfolioServer {
    pub fn new(context: ServerContext) -> Self {
        let mut tools = ToolRouter::new(Arc::new(context));
        let mut registry = Registry::builder();

        registry
            .resource(
                ResourceDescriptor::new(PROPERTIES_URI, "Property Portfolio")
                    .with_description("All managed properties with details and status")
                    .with_mime_type("application/json")
                    .with_metadata(json!({
                        "schema": "property-list",
                        "capabilities": ["read", "search", "filter"]
                    })),
            )
            .resource(
                ResourceDescriptor::new(ANALYTICS_URI, "Portfolio Analytics")
                    .with_description("Occupancy, revenue and top performers across the portfolio")
                    .with_mime_type("application/json")
                    .with_metadata(json!({
                        "schema": "analytics-overview",
                        "capabilities": ["read"]
                    })),
            )
            .resource(
                ResourceDescriptor::new(MARKET_DATA_URI, "Market Data")
                    .with_description("Market conditions, competitor pricing and seasonal trends")
                    .with_mime_type("application/json")
                    .with_metadata(json!({
                        "schema": "market-data",
                        "capabilities": ["read"]
                    })),
            )
            .resource(
                ResourceDescriptor::new(PRICING_RULES_URI, "Pricing Rules")
                    .with_description("Rules applied by dynamic pricing")
                    .with_mime_type("application/json")
                    .with_metadata(json!({
                        "schema": "pricing-rules",
                        "capabilities": ["read"]
                    })),
            );

        registry
            .tool(tools.register_tool(
                "optimize_property",
                "Suggest listing copy, amenities and a nightly rate for a property",
                optimize_property,
            ))
            .tool(tools.register_tool(
                "calculate_dynamic_pricing",
                "Price a stay from season, weekend demand and party size",
                calculate_dynamic_pricing,
            ))
            .tool(tools.register_tool(
                "analyze_market_conditions",
                "Compare managed listings in a location against the market",
                analyze_market_conditions,
            ))
            .tool(tools.register_tool(
                "generate_guest_response",
                "Draft a reply to a guest message in the requested tone",
                generate_guest_response,
            ))
            .tool(tools.register_tool(
                "search_properties",
                "Search the portfolio with optional filters, sorting and a result limit",
                search_properties,
            ))
            .tool(tools.register_tool(
                "get_performance_analytics",
                "Booking metrics for one property or the whole portfolio",
                get_performance_analytics,
            ));

        Self {
            registry: registry.build(),
            tools,
        }
    }

    pub fn with_sample_data() -> Self {
        Self::new(ServerContext::sample())
    }
}

#[async_trait]
impl ServerHooks for PortfolioServer {
    fn registry(&self) -> &Registry {
        &self.registry
    }

    async fn read_resource_content(
        &self,
        request: &Request,
        resource: &ResourceDescriptor,
    ) -> Result<Response> {
        let store = self.tools.context().store.as_ref();
        let document = match resource.uri.as_str() {
            PROPERTIES_URI => payloads::properties_document(store).await?,
            ANALYTICS_URI => payloads::analytics_document(store).await?,
            MARKET_DATA_URI => payloads::market_data_document(),
            PRICING_RULES_URI => payloads::pricing_rules_document(),
            other => return Err(McpError::UnknownResource(other.to_string()).into()),
        };
        let contents = ResourceContents::json(resource, &document)?;
        Ok(Response::success(request.id.clone(), contents.into_value()?))
    }

    async fn call_tool(&self, request: &Request) -> Result<Response> {
        Ok(self.tools.respond(request).await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{SAMPLE_COTTAGE_ID, SAMPLE_LOFT_ID, SAMPLE_VILLA_ID};

    fn ctx() -> Arc<ServerContext> {
        Arc::new(ServerContext::sample())
    }

    #[tokio::test]
    async fn test_registry_lists_every_tool_in_order() {
        let server = PortfolioServer::with_sample_data();
        let names: Vec<_> = server
            .registry()
            .list_tools()
            .into_iter()
            .map(|t| t.name)
            .collect();
        assert_eq!(
            names,
            vec![
                "optimize_property",
                "calculate_dynamic_pricing",
                "analyze_market_conditions",
                "generate_guest_response",
                "search_properties",
                "get_performance_analytics",
            ]
        );
        assert_eq!(server.registry().resource_count(), 4);
    }

    #[tokio::test]
    async fn test_search_sorts_by_price_and_limits() {
        let input = SearchPropertiesInput {
            filters: None,
            sort_by: None,
            limit: Some(2),
        };
        let results = search_properties(input, ctx()).await.unwrap();
        assert_eq!(results.total_matches, 3);
        assert_eq!(results.count, 2);
        assert_eq!(results.properties[0].id, SAMPLE_COTTAGE_ID);
        assert_eq!(results.properties[1].id, SAMPLE_LOFT_ID);
    }

    #[tokio::test]
    async fn test_search_rejects_out_of_range_limit() {
        let input = SearchPropertiesInput {
            filters: None,
            sort_by: Some(SortBy::Revenue),
            limit: Some(0),
        };
        let err = search_properties(input, ctx()).await.unwrap_err();
        assert!(matches!(err, McpError::InvalidParams(_)));
    }

    #[tokio::test]
    async fn test_pricing_with_competitors() {
        let input = DynamicPricingInput {
            property_id: SAMPLE_VILLA_ID.to_string(),
            check_in_date: "2025-03-03".to_string(),
            check_out_date: "2025-03-05".to_string(),
            guest_count: Some(2),
            include_competitors: Some(true),
        };
        let pricing = calculate_dynamic_pricing(input, ctx()).await.unwrap();
        assert_eq!(pricing.quote.dynamic_price, 420.0);
        let competitors = pricing.competitors.unwrap();
        assert_eq!(competitors.position, "above market");
    }

    #[tokio::test]
    async fn test_guest_response_escalates_complaints() {
        let input = GuestResponseInput {
            guest_message: "The shower is broken".to_string(),
            tone: Some(Tone::Apologetic),
            message_type: None,
            property_id: Some(SAMPLE_LOFT_ID.to_string()),
        };
        let reply = generate_guest_response(input, ctx()).await.unwrap();
        assert!(reply.escalation_required);
        assert!(Tone::Apologetic
            .greetings()
            .iter()
            .any(|g| reply.response.starts_with(g)));
    }

    #[tokio::test]
    async fn test_unknown_property_is_invalid_params() {
        let input = OptimizePropertyInput {
            property_id: uuid::Uuid::nil().to_string(),
            optimization_goals: vec![],
        };
        let err = optimize_property(input, ctx()).await.unwrap_err();
        assert_eq!(err.error_code(), -32602);
    }

    #[tokio::test]
    async fn test_performance_analytics_selected_metrics() {
        let input = PerformanceAnalyticsInput {
            property_id: Some(SAMPLE_LOFT_ID.to_string()),
            time_period: Some(TimePeriod::Week),
            metrics: Some(vec![Metric::Bookings, Metric::Occupancy]),
        };
        let report = get_performance_analytics(input, ctx()).await.unwrap();
        assert_eq!(report.period_days, 7);
        assert_eq!(report.metrics.len(), 2);
        assert_eq!(report.metrics["bookings"], json!(1));
        assert_eq!(report.metrics["occupancy"], json!(57.14));
    }
}
