//! Provider credentials and the HTTP clients for the three routing services.
//!
//! [`ProvidersConfig`] carries the injected credentials and endpoints.
//! [`NaverRouter`] and [`TmapRouter`] implement
//! [`TaxiRouter`](crate::services::routing_api::TaxiRouter);
//! [`GoogleTransitRouter`] implements
//! [`TransitRouter`](crate::services::routing_api::TransitRouter).

mod config;
pub mod google;
pub mod naver;
pub mod tmap;

pub use config::{GoogleConfig, NaverConfig, ProvidersConfig, TmapConfig};
pub use google::GoogleTransitRouter;
pub use naver::NaverRouter;
pub use tmap::TmapRouter;

use crate::error::ProviderError;
use serde_json::Value;

/// Reads a required number at a JSON pointer.
pub(crate) fn number_at(body: &Value, pointer: &str, provider: &str) -> Result<f64, ProviderError> {
    body.pointer(pointer)
        .and_then(Value::as_f64)
        .ok_or_else(|| ProviderError::query(provider, format!("response has no number at {pointer}")))
}
