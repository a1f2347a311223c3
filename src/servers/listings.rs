//! Listings server
//!
//! Smaller variant for listing management: properties, bookings and
//! analytics resources with search, pricing and insight tools.

use {
    super::{
        payloads::{self, ANALYTICS_URI, BOOKINGS_URI, PROPERTIES_URI},
        ServerContext,
    },
    crate::{
        content::ResourceContents,
        error::{McpError, McpResult},
        handler::ServerHooks,
        models::{Property, PropertyQuery},
        protocol::{Request, ResourceDescriptor, Response},
        registry::Registry,
        router::ToolRouter,
    },
    anyhow::Result,
    async_trait::async_trait,
    schemars::JsonSchema,
    serde::{Deserialize, Serialize},
    serde_json::json,
    std::sync::Arc,
};

/// Input for `search_properties`
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct ListingSearchInput {
    pub location: Option<String>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    /// Minimum guest capacity
    pub guests: Option<u32>,
    #[serde(default)]
    pub amenities: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct ListingSearchResults {
    pub properties: Vec<Property>,
    pub count: usize,
}

/// Input for `optimize_pricing`
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct OptimizePricingInput {
    pub property_id: String,
    /// Check-in date, YYYY-MM-DD
    pub check_in: String,
    /// Check-out date, YYYY-MM-DD
    pub check_out: String,
    pub guest_count: Option<u32>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PricingRecommendation {
    #[serde(flatten)]
    pub quote: payloads::StayQuote,
    pub recommendation: String,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum TimeRange {
    Week,
    #[default]
    Month,
    Quarter,
    Year,
}

impl TimeRange {
    fn days(self) -> i64 {
        match self {
            TimeRange::Week => 7,
            TimeRange::Month => 30,
            TimeRange::Quarter => 90,
            TimeRange::Year => 365,
        }
    }
}

/// Input for `generate_property_insights`
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct PropertyInsightsInput {
    pub property_id: String,
    pub time_range: Option<TimeRange>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyInsights {
    pub property_id: String,
    pub title: String,
    pub time_range: TimeRange,
    pub occupancy_rate: f64,
    pub stats: payloads::PropertyStats,
    pub summary: String,
}

async fn search_properties(
    input: ListingSearchInput,
    ctx: Arc<ServerContext>,
) -> McpResult<ListingSearchResults> {
    if let (Some(min), Some(max)) = (input.min_price, input.max_price) {
        if min > max {
            return Err(McpError::InvalidParams(format!(
                "min_price ({min}) must not exceed max_price ({max})"
            )));
        }
    }

    let query = PropertyQuery {
        location: input.location,
        min_price: input.min_price,
        max_price: input.max_price,
        max_guests: input.guests,
        amenities: input.amenities,
        ..Default::default()
    };
    let properties = ctx.store.search(&query).await.map_err(payloads::internal)?;

    Ok(ListingSearchResults {
        count: properties.len(),
        properties,
    })
}

async fn optimize_pricing(
    input: OptimizePricingInput,
    ctx: Arc<ServerContext>,
) -> McpResult<PricingRecommendation> {
    let property = payloads::load_property(ctx.store.as_ref(), &input.property_id).await?;
    let check_in = payloads::parse_date("check_in", &input.check_in)?;
    let check_out = payloads::parse_date("check_out", &input.check_out)?;
    let quote = payloads::quote_stay(&property, check_in, check_out, input.guest_count.unwrap_or(1))?;

    let recommendation = if quote.dynamic_price > quote.base_price {
        format!(
            "Charge {:.2} per night; demand for these dates supports a premium over the {:.2} base rate",
            quote.dynamic_price, quote.base_price
        )
    } else {
        format!("Keep the base rate of {:.2} per night", quote.base_price)
    };

    Ok(PricingRecommendation {
        quote,
        recommendation,
    })
}

async fn generate_property_insights(
    input: PropertyInsightsInput,
    ctx: Arc<ServerContext>,
) -> McpResult<PropertyInsights> {
    let property = payloads::load_property(ctx.store.as_ref(), &input.property_id).await?;
    let bookings = ctx
        .store
        .bookings_for(property.id)
        .await
        .map_err(payloads::internal)?;
    let stats = payloads::stats_by_property(&bookings)
        .remove(&property.id)
        .unwrap_or_default();

    let time_range = input.time_range.unwrap_or_default();
    let occupancy_rate = stats.occupancy_rate(time_range.days());

    let prompt = format!(
        "{}\n{} bookings, {} cancellations, {:.2} revenue, {occupancy_rate}% occupancy over the last {:?}",
        property.title, stats.bookings, stats.cancellations, stats.revenue, time_range
    );
    let summary = ctx.text.generate(&prompt).await.map_err(payloads::internal)?;

    Ok(PropertyInsights {
        property_id: property.id.to_string(),
        title: property.title,
        time_range,
        occupancy_rate,
        stats,
        summary,
    })
}

/// Listing-management server
pub struct ListingsServer {
    registry: Registry,
    tools: ToolRouter<ServerContext>,
}

impl ListingsServer {
    pub fn new(context: ServerContext) -> Self {
        let mut tools = ToolRouter::new(Arc::new(context));
        let mut registry = Registry::builder();

        registry
            .resource(
                ResourceDescriptor::new(PROPERTIES_URI, "Properties")
                    .with_description("Managed property listings")
                    .with_mime_type("application/json"),
            )
            .resource(
                ResourceDescriptor::new(BOOKINGS_URI, "Bookings")
                    .with_description("Bookings across all properties, by check-in date")
                    .with_mime_type("application/json"),
            )
            .resource(
                ResourceDescriptor::new(ANALYTICS_URI, "Analytics")
                    .with_description("Revenue and occupancy overview")
                    .with_mime_type("application/json"),
            );

        registry
            .tool(tools.register_tool(
                "search_properties",
                "Find listings by location, price range, capacity and amenities",
                search_properties,
            ))
            .tool(tools.register_tool(
                "optimize_pricing",
                "Recommend a nightly rate for a stay",
                optimize_pricing,
            ))
            .tool(tools.register_tool(
                "generate_property_insights",
                "Summarise booking performance for a property",
                generate_property_insights,
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
impl ServerHooks for ListingsServer {
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
            BOOKINGS_URI => payloads::bookings_document(store).await?,
            ANALYTICS_URI => payloads::analytics_document(store).await?,
            other => return Err(McpError::UnknownResource(other.to_string()).into()),
        };
        let contents = ResourceContents::json(resource, &document)?;
        Ok(Response::success(request.id.clone(), contents.into_value()?))
    }

    async fn call_tool(&self, request: &Request) -> Result<Response> {
        Ok(self.tools.respond(request).await)
    }
}
