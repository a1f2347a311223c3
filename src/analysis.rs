//! Composite analysis
//!
//! Fans several `tools/call` requests out against one dispatcher and folds the
//! successful results into a single report. A failing component is logged and
//! left out of the report.

use {
    crate::{
        dispatcher::Dispatcher,
        handler::ServerHooks,
        logging,
        protocol::{Method, Params, Request},
    },
    chrono::{DateTime, Days, Utc},
    futures_util::future::join_all,
    serde::{Deserialize, Serialize},
    serde_json::{json, Map, Value},
    tracing::{info, warn},
};

const DEFAULT_LOCATION: &str = "San Francisco, CA";
const DEFAULT_PROPERTY_TYPE: &str = "apartment";
const DEFAULT_TIME_PERIOD: &str = "30d";

/// Body of `POST /analyze`
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AnalysisRequest {
    pub property_id: Option<String>,
    pub location: Option<String>,
    pub property_type: Option<String>,
    pub include_property_optimization: bool,
    pub include_pricing_analysis: bool,
    pub include_market_analysis: bool,
    pub include_analytics: bool,
    pub optimization_goals: Option<Vec<String>>,
    pub check_in_date: Option<String>,
    pub check_out_date: Option<String>,
    pub guest_count: Option<u32>,
    pub time_period: Option<String>,
    pub metrics: Option<Vec<String>>,
}

impl Default for AnalysisRequest {
    fn default() -> Self {
        Self {
            property_id: None,
            location: None,
            property_type: None,
            include_property_optimization: true,
            include_pricing_analysis: true,
            include_market_analysis: true,
            include_analytics: true,
            optimization_goals: None,
            check_in_date: None,
            check_out_date: None,
            guest_count: None,
            time_period: None,
            metrics: None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisReport {
    pub analysis_id: String,
    pub timestamp: DateTime<Utc>,
    pub results: Map<String, Value>,
    pub summary: String,
}

fn date_from_today(today: DateTime<Utc>, days: u64) -> String {
    today
        .date_naive()
        .checked_add_days(Days::new(days))
        .unwrap_or_else(|| today.date_naive())
        .format("%Y-%m-%d")
        .to_string()
}

fn tool_call(analysis_id: &str, key: &str, tool: &str, arguments: Value) -> Request {
    let mut params = Params::new();
    params.insert("name".to_string(), Value::String(tool.to_string()));
    params.insert("arguments".to_string(), arguments);
    Request::new(format!("{analysis_id}-{key}"), Method::TOOLS_CALL, params)
}

impl AnalysisRequest {
    /// Tool calls to issue, keyed by their slot in the report
    fn component_calls(&self, analysis_id: &str, now: DateTime<Utc>) -> Vec<(&'static str, Request)> {
        let mut calls = Vec::new();

        if let Some(property_id) = &self.property_id {
            if self.include_property_optimization {
                let goals = self
                    .optimization_goals
                    .clone()
                    .unwrap_or_else(|| vec!["occupancy".to_string(), "revenue".to_string()]);
                calls.push((
                    "property_optimization",
                    tool_call(
                        analysis_id,
                        "optimization",
                        "optimize_property",
                        json!({ "property_id": property_id, "optimization_goals": goals }),
                    ),
                ));
            }
            if self.include_pricing_analysis {
                let check_in = self
                    .check_in_date
                    .clone()
                    .unwrap_or_else(|| date_from_today(now, 7));
                let check_out = self
                    .check_out_date
                    .clone()
                    .unwrap_or_else(|| date_from_today(now, 14));
                calls.push((
                    "pricing_analysis",
                    tool_call(
                        analysis_id,
                        "pricing",
                        "calculate_dynamic_pricing",
                        json!({
                            "property_id": property_id,
                            "check_in_date": check_in,
                            "check_out_date": check_out,
                            "guest_count": self.guest_count.unwrap_or(2),
                            "include_competitors": true
                        }),
                    ),
                ));
            }
        }

        if self.include_market_analysis {
            calls.push((
                "market_analysis",
                tool_call(
                    analysis_id,
                    "market",
                    "analyze_market_conditions",
                    json!({
                        "location": self.location.as_deref().unwrap_or(DEFAULT_LOCATION),
                        "property_type": self.property_type.as_deref().unwrap_or(DEFAULT_PROPERTY_TYPE)
                    }),
                ),
            ));
        }

        if self.include_analytics {
            let mut arguments = json!({
                "time_period": self.time_period.as_deref().unwrap_or(DEFAULT_TIME_PERIOD),
                "metrics": self.metrics.clone().unwrap_or_else(|| {
                    vec!["occupancy".to_string(), "revenue".to_string(), "bookings".to_string()]
                })
            });
            if let (Some(property_id), Some(object)) = (&self.property_id, arguments.as_object_mut()) {
                object.insert("property_id".to_string(), json!(property_id));
            }
            calls.push((
                "analytics",
                tool_call(analysis_id, "analytics", "get_performance_analytics", arguments),
            ));
        }

        calls
    }
}

/// Run every requested component concurrently on `dispatcher`.
pub async fn run_analysis<H: ServerHooks + 'static>(
    dispatcher: &Dispatcher<H>,
    request: &AnalysisRequest,
) -> AnalysisReport {
    let analysis_id = logging::generate_request_id();
    let timestamp = Utc::now();
    let calls = request.component_calls(&analysis_id, timestamp);

    let (keys, requests): (Vec<_>, Vec<_>) = calls.into_iter().unzip();
    let responses = join_all(requests.into_iter().map(|req| dispatcher.handle(req))).await;

    let mut results = Map::new();
    for (key, response) in keys.into_iter().zip(responses) {
        match response.into_outcome() {
            Ok(value) => {
                results.insert(key.to_string(), value);
            }
            Err(error) => {
                warn!(
                    analysis_id = %analysis_id,
                    component = key,
                    code = error.code,
                    error = %error.message,
                    "Analysis component failed"
                );
            }
        }
    }

    info!(
        analysis_id = %analysis_id,
        components = results.len(),
        event = "analysis_complete",
        "Analysis complete"
    );

    AnalysisReport {
        summary: format!("Completed MCP analysis with {} components", results.len()),
        analysis_id,
        timestamp,
        results,
    }
}
