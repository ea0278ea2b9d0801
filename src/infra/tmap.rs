use async_trait::async_trait;
use chrono::{FixedOffset, NaiveDateTime, TimeZone};
use reqwest::header::{ACCEPT, CONTENT_TYPE, HeaderValue};
use reqwest::{Method, Request, Url};
use serde_json::{Value, json};
use tracing::debug;

use super::TmapConfig;
use crate::error::ProviderError;
use crate::fetch::auth::ApiKey;
use crate::fetch::{BasicClient, HttpClient, Retry, RetryPolicy, fetch_json};
use crate::services::routing_api::{RouteMeasure, TaxiRouter};
use crate::trips::TripRecord;

const NAME: &str = "tmap";

/// Departure-time-aware driving prediction from the TMAP routes API.
pub struct TmapRouter<C> {
    client: C,
    base_url: String,
    /// Offset the departure instant is rendered in.
    local_offset: FixedOffset,
}

impl TmapRouter<Retry<ApiKey<BasicClient>>> {
    pub fn from_config(
        config: &TmapConfig,
        retry: RetryPolicy,
        local_offset: FixedOffset,
    ) -> anyhow::Result<Self> {
        let client = ApiKey::new(BasicClient::new()?, "appKey", &config.app_key)?;
        Ok(Self::new(
            Retry {
                inner: client,
                policy: retry,
            },
            &config.base_url,
            local_offset,
        ))
    }
}

impl<C: HttpClient> TmapRouter<C> {
    pub fn new(client: C, base_url: &str, local_offset: FixedOffset) -> Self {
        Self {
            client,
            base_url: base_url.to_string(),
            local_offset,
        }
    }

    fn request(&self, trip: &TripRecord) -> Result<Request, ProviderError> {
        let url = Url::parse(&self.base_url)
            .map_err(|e| ProviderError::query(NAME, format!("bad endpoint: {e}")))?;
        let payload = prediction_payload(trip, self.local_offset);
        let body = serde_json::to_vec(&payload)
            .map_err(|e| ProviderError::query(NAME, format!("encoding payload: {e}")))?;

        let mut req = Request::new(Method::POST, url);
        let headers = req.headers_mut();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        *req.body_mut() = Some(body.into());
        Ok(req)
    }
}

/// Renders a naive UTC instant as `YYYY-MM-DDTHH:MM:SS+hhmm` in `offset`.
pub fn prediction_time(instant: NaiveDateTime, offset: FixedOffset) -> String {
    offset
        .from_utc_datetime(&instant)
        .format("%Y-%m-%dT%H:%M:%S%z")
        .to_string()
}

/// Request body for a departure-time prediction from pickup to dropoff.
pub fn prediction_payload(trip: &TripRecord, offset: FixedOffset) -> Value {
    json!({
        "routesInfo": {
            "departure": {
                "name": "pickup",
                "lon": trip.pickup_lon.to_string(),
                "lat": trip.pickup_lat.to_string(),
                "depSearchFlag": "05"
            },
            "destination": {
                "name": "dropoff",
                "lon": trip.dropoff_lon.to_string(),
                "lat": trip.dropoff_lat.to_string(),
                "rpFlag": "16",
                "destSearchFlag": "03"
            },
            "predictionType": "departure",
            "predictionTime": prediction_time(trip.pickup_time, offset),
            "searchOption": "00",
            "tollgateCarType": "car",
            "trafficInfo": "N"
        }
    })
}

/// Reads the first feature's totals. Absent totals count as zero.
pub fn parse_properties(body: &Value) -> Result<RouteMeasure, ProviderError> {
    let props = body
        .pointer("/features/0/properties")
        .ok_or_else(|| ProviderError::query(NAME, "response has no route features"))?;
    let field = |name: &str| props.get(name).and_then(Value::as_f64).unwrap_or(0.0);

    Ok(RouteMeasure {
        distance_m: field("totalDistance"),
        duration_s: field("totalTime"),
        fare: field("taxiFare"),
    })
}

#[async_trait]
impl<C: HttpClient> TaxiRouter for TmapRouter<C> {
    fn name(&self) -> &str {
        NAME
    }

    async fn route(&self, trip: &TripRecord) -> Result<RouteMeasure, ProviderError> {
        let req = self.request(trip)?;
        debug!(departure = %trip.pickup_time, "Querying tmap route prediction");
        let body = fetch_json(&self.client, req, NAME).await?;
        parse_properties(&body)
    }
}
