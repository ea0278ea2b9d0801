use anyhow::{Context, Result};
use serde::Deserialize;

pub const NAVER_DEFAULT_URL: &str =
    "https://naveropenapi.apigw.ntruss.com/map-direction/v1/driving";
pub const TMAP_DEFAULT_URL: &str = "https://apis.openapi.sk.com/tmap/routes/prediction?version=1&resCoordType=WGS84GEO&reqCoordType=WGS84GEO&sort=index&callback=function";
pub const GOOGLE_DEFAULT_URL: &str = "https://maps.googleapis.com/maps/api/directions/json";

#[derive(Clone, Deserialize)]
pub struct NaverConfig {
    pub client_id: String,
    pub client_secret: String,
    #[serde(default = "naver_url")]
    pub base_url: String,
}

#[derive(Clone, Deserialize)]
pub struct TmapConfig {
    pub app_key: String,
    #[serde(default = "tmap_url")]
    pub base_url: String,
}

#[derive(Clone, Deserialize)]
pub struct GoogleConfig {
    pub api_key: String,
    #[serde(default = "google_url")]
    pub base_url: String,
}

fn naver_url() -> String {
    NAVER_DEFAULT_URL.to_string()
}

fn tmap_url() -> String {
    TMAP_DEFAULT_URL.to_string()
}

fn google_url() -> String {
    GOOGLE_DEFAULT_URL.to_string()
}

/// Credentials and endpoints for the routing providers.
///
/// A provider without an entry cannot be evaluated. Stored as JSON on disk:
/// ```json
/// {
///   "naver": { "client_id": "...", "client_secret": "..." },
///   "tmap": { "app_key": "..." },
///   "google": { "api_key": "...", "base_url": "http://localhost:8080/directions" }
/// }
/// ```
#[derive(Clone, Default, Deserialize)]
pub struct ProvidersConfig {
    pub naver: Option<NaverConfig>,
    pub tmap: Option<TmapConfig>,
    pub google: Option<GoogleConfig>,
}

impl ProvidersConfig {
    /// Loads the config from a JSON file at `path`.
    pub fn load(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading provider config '{path}'"))?;
        let config = serde_json::from_str(&content)
            .with_context(|| format!("parsing provider config '{path}'"))?;
        Ok(config)
    }

    /// Reads `NAVER_CLIENT_ID`/`NAVER_CLIENT_SECRET`, `TMAP_APP_KEY` and
    /// `GOOGLE_MAPS_API_KEY`. Unset variables leave that provider out.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Self {
        let naver = match (get("NAVER_CLIENT_ID"), get("NAVER_CLIENT_SECRET")) {
            (Some(client_id), Some(client_secret)) => Some(NaverConfig {
                client_id,
                client_secret,
                base_url: naver_url(),
            }),
            _ => None,
        };
        let tmap = get("TMAP_APP_KEY").map(|app_key| TmapConfig {
            app_key,
            base_url: tmap_url(),
        });
        let google = get("GOOGLE_MAPS_API_KEY").map(|api_key| GoogleConfig {
            api_key,
            base_url: google_url(),
        });
        Self { naver, tmap, google }
    }

    /// Fills providers missing from `self` with those from `other`.
    pub fn or(self, other: ProvidersConfig) -> Self {
        Self {
            naver: self.naver.or(other.naver),
            tmap: self.tmap.or(other.tmap),
            google: self.google.or(other.google),
        }
    }
}
