use async_trait::async_trait;
use reqwest::{Method, Request, Url};
use serde_json::Value;
use tracing::debug;

use super::{GoogleConfig, number_at};
use crate::error::ProviderError;
use crate::fetch::auth::UrlParam;
use crate::fetch::{BasicClient, HttpClient, Retry, RetryPolicy, fetch_json};
use crate::services::routing_api::{TransitRouter, TransitStep};
use crate::trips::TripRecord;

const NAME: &str = "google";

/// Public transport directions from the Google Directions API.
pub struct GoogleTransitRouter<C> {
    client: C,
    base_url: String,
    /// Directions `mode` parameter, normally `transit`.
    mode: String,
}

impl GoogleTransitRouter<Retry<UrlParam<BasicClient>>> {
    pub fn from_config(config: &GoogleConfig, retry: RetryPolicy, mode: &str) -> anyhow::Result<Self> {
        let client = UrlParam {
            inner: BasicClient::new()?,
            param_name: "key".to_string(),
            key: config.api_key.clone(),
        };
        Ok(Self::new(
            Retry {
                inner: client,
                policy: retry,
            },
            &config.base_url,
            mode,
        ))
    }
}

impl<C: HttpClient> GoogleTransitRouter<C> {
    pub fn new(client: C, base_url: &str, mode: &str) -> Self {
        Self {
            client,
            base_url: base_url.to_string(),
            mode: mode.to_string(),
        }
    }

    fn request(&self, trip: &TripRecord) -> Result<Request, ProviderError> {
        let origin = format!("{},{}", trip.pickup_lat, trip.pickup_lon);
        let destination = format!("{},{}", trip.dropoff_lat, trip.dropoff_lon);
        let url = Url::parse_with_params(
            &self.base_url,
            &[
                ("origin", origin.as_str()),
                ("destination", destination.as_str()),
                ("mode", self.mode.as_str()),
            ],
        )
        .map_err(|e| ProviderError::query(NAME, format!("bad endpoint: {e}")))?;
        Ok(Request::new(Method::GET, url))
    }
}

/// Flattens the first leg of the first route into steps.
///
/// A ridden step is typed by its vehicle (`BUS`, `SUBWAY`, ...); any other
/// step by its travel mode (`WALKING`, ...).
pub fn parse_steps(body: &Value) -> Result<Vec<TransitStep>, ProviderError> {
    let status = body.get("status").and_then(Value::as_str).unwrap_or("");
    if status != "OK" {
        let message = body
            .get("error_message")
            .and_then(Value::as_str)
            .unwrap_or("no transit route");
        return Err(ProviderError::logical(NAME, status, message));
    }

    let steps = body
        .pointer("/routes/0/legs/0/steps")
        .and_then(Value::as_array)
        .ok_or_else(|| ProviderError::query(NAME, "response has no route steps"))?;

    steps
        .iter()
        .map(|step| -> Result<TransitStep, ProviderError> {
            let travel_type = step
                .pointer("/transit_details/line/vehicle/type")
                .or_else(|| step.get("travel_mode"))
                .and_then(Value::as_str)
                .ok_or_else(|| ProviderError::query(NAME, "step has no travel mode"))?;
            Ok(TransitStep {
                distance_m: number_at(step, "/distance/value", NAME)?,
                duration_s: number_at(step, "/duration/value", NAME)?,
                travel_type: travel_type.to_string(),
            })
        })
        .collect()
}

#[async_trait]
impl<C: HttpClient> TransitRouter for GoogleTransitRouter<C> {
    fn name(&self) -> &str {
        NAME
    }

    async fn directions(&self, trip: &TripRecord) -> Result<Vec<TransitStep>, ProviderError> {
        let req = self.request(trip)?;
        debug!(mode = %self.mode, "Querying transit directions");
        let body = fetch_json(&self.client, req, NAME).await?;
        parse_steps(&body)
    }
}
