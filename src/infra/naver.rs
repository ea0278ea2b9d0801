use async_trait::async_trait;
use reqwest::{Method, Request, Url};
use serde_json::Value;
use tracing::debug;

use super::{NaverConfig, number_at};
use crate::error::ProviderError;
use crate::fetch::auth::ApiKey;
use crate::fetch::{BasicClient, HttpClient, Retry, RetryPolicy, fetch_json};
use crate::services::routing_api::{RouteMeasure, TaxiRouter};
use crate::trips::TripRecord;

const NAME: &str = "naver";

/// Driving directions from the Naver map-direction API.
pub struct NaverRouter<C> {
    client: C,
    base_url: String,
}

impl NaverRouter<Retry<ApiKey<ApiKey<BasicClient>>>> {
    pub fn from_config(config: &NaverConfig, retry: RetryPolicy) -> anyhow::Result<Self> {
        let client = ApiKey::new(BasicClient::new()?, "X-NCP-APIGW-API-KEY-ID", &config.client_id)?;
        let client = ApiKey::new(client, "X-NCP-APIGW-API-KEY", &config.client_secret)?;
        Ok(Self::new(
            Retry {
                inner: client,
                policy: retry,
            },
            &config.base_url,
        ))
    }
}

impl<C: HttpClient> NaverRouter<C> {
    pub fn new(client: C, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.to_string(),
        }
    }

    fn request(&self, trip: &TripRecord) -> Result<Request, ProviderError> {
        let start = format!("{},{}", trip.pickup_lon, trip.pickup_lat);
        let goal = format!("{},{}", trip.dropoff_lon, trip.dropoff_lat);
        let url = Url::parse_with_params(&self.base_url, &[("start", start), ("goal", goal)])
            .map_err(|e| ProviderError::query(NAME, format!("bad endpoint: {e}")))?;
        Ok(Request::new(Method::GET, url))
    }
}

/// Extracts the optimal route summary. `code != 0` means no route.
pub fn parse_summary(body: &Value) -> Result<RouteMeasure, ProviderError> {
    let code = body.get("code").and_then(Value::as_i64).unwrap_or(1);
    if code != 0 {
        let message = body
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or("no route");
        return Err(ProviderError::logical(NAME, code, message));
    }

    let summary = body
        .pointer("/route/traoptimal/0/summary")
        .ok_or_else(|| ProviderError::query(NAME, "response has no route summary"))?;

    Ok(RouteMeasure {
        distance_m: number_at(summary, "/distance", NAME)?,
        // milliseconds on the wire
        duration_s: number_at(summary, "/duration", NAME)? / 1000.0,
        fare: number_at(summary, "/taxiFare", NAME)?,
    })
}

#[async_trait]
impl<C: HttpClient> TaxiRouter for NaverRouter<C> {
    fn name(&self) -> &str {
        NAME
    }

    async fn route(&self, trip: &TripRecord) -> Result<RouteMeasure, ProviderError> {
        let req = self.request(trip)?;
        debug!(url = %req.url(), "Querying naver driving route");
        let body = fetch_json(&self.client, req, NAME).await?;
        parse_summary(&body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::testing::Scripted;
    use crate::trips::tests::{at, trip};
    use serde_json::json;

    fn router(server: &Scripted) -> NaverRouter<ApiKey<ApiKey<Scripted>>> {
        let client = ApiKey::new(server.clone(), "X-NCP-APIGW-API-KEY-ID", "id-123").unwrap();
        let client = ApiKey::new(client, "X-NCP-APIGW-API-KEY", "secret-456").unwrap();
        NaverRouter::new(client, "http://localhost/driving")
    }

    #[tokio::test]
    async fn test_route_sends_both_credentials() {
        let body = json!({
            "code": 0,
            "route": { "traoptimal": [ { "summary": {
                "distance": 5000, "duration": 600_000, "taxiFare": 7600
            } } ] }
        })
        .to_string();
        let server = Scripted::new(&[(200, body.as_str())]);
        let m = router(&server)
            .route(&trip(at(8, 0, 0), at(8, 1, 0), at(8, 2, 0)))
            .await
            .unwrap();

        assert_eq!(m.distance_m, 5000.0);
        assert_eq!(m.duration_s, 600.0);
        assert_eq!(m.fare, 7600.0);
        let (url, headers) = server.request(0);
        assert_eq!(url.path(), "/driving");
        assert_eq!(headers["X-NCP-APIGW-API-KEY-ID"], "id-123");
        assert_eq!(headers["X-NCP-APIGW-API-KEY"], "secret-456");
    }

    #[tokio::test]
    async fn test_route_error_status_is_query_failure() {
        let server = Scripted::new(&[(401, "unauthorized")]);
        let err = router(&server)
            .route(&trip(at(8, 0, 0), at(8, 1, 0), at(8, 2, 0)))
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::Query { .. }));
    }

    #[test]
    fn test_parse_success() {
        let body = json!({
            "code": 0,
            "message": "길찾기를 성공하였습니다.",
            "route": { "traoptimal": [ { "summary": {
                "distance": 7320,
                "duration": 1_260_000,
                "taxiFare": 10400,
                "tollFare": 0
            } } ] }
        });
        let m = parse_summary(&body).unwrap();
        assert_eq!(m.distance_m, 7320.0);
        assert_eq!(m.duration_s, 1260.0);
        assert_eq!(m.fare, 10400.0);
    }

    #[test]
    fn test_nonzero_code_is_logical_failure() {
        let body = json!({ "code": 1, "message": "출발지와 도착지가 동일합니다." });
        match parse_summary(&body).unwrap_err() {
            ProviderError::Logical { code, .. } => assert_eq!(code, "1"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_missing_code_is_logical_failure() {
        assert!(matches!(
            parse_summary(&json!({})),
            Err(ProviderError::Logical { .. })
        ));
    }

    #[test]
    fn test_truncated_summary_is_query_failure() {
        let body = json!({ "code": 0, "route": { "traoptimal": [ { "summary": { "distance": 10 } } ] } });
        assert!(matches!(parse_summary(&body), Err(ProviderError::Query { .. })));
    }

    #[test]
    fn test_request_puts_lon_first() {
        let router = NaverRouter::new(BasicClient::new().unwrap(), "http://localhost/driving");
        let trip = crate::trips::tests::trip(
            crate::trips::tests::at(8, 0, 0),
            crate::trips::tests::at(8, 1, 0),
            crate::trips::tests::at(8, 2, 0),
        );
        let req = router.request(&trip).unwrap();
        let pairs: Vec<(String, String)> = req.url().query_pairs().into_owned().collect();
        assert_eq!(pairs[0], ("start".to_string(), "127,37.5".to_string()));
        assert_eq!(pairs[1], ("goal".to_string(), "127.05,37.55".to_string()));
    }
}
