use crate::fetch::client::HttpClient;
use async_trait::async_trait;

/// Adds a credential to the query string of every request.
///
/// The Google directions endpoint takes its API key this way, as `key=...`,
/// next to the origin and destination parameters.
pub struct UrlParam<C> {
    pub inner: C,
    pub param_name: String,
    pub key: String,
}

#[async_trait]
impl<C: HttpClient> HttpClient for UrlParam<C> {
    async fn execute(&self, mut req: reqwest::Request) -> reqwest::Result<reqwest::Response> {
        req.url_mut()
            .query_pairs_mut()
            .append_pair(&self.param_name, &self.key);
        self.inner.execute(req).await
    }
}
