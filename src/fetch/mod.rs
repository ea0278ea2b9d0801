mod basic;
mod client;
mod retry;
pub mod auth;

pub use basic::BasicClient;
pub use client::HttpClient;
pub use retry::{Retry, RetryPolicy, is_transient_status};

use crate::error::ProviderError;

/// Sends `req` and decodes a JSON body.
///
/// Transport failures, non-success statuses and undecodable bodies all map
/// to [`ProviderError::Query`].
pub async fn fetch_json<C: HttpClient + ?Sized>(
    client: &C,
    req: reqwest::Request,
    provider: &str,
) -> Result<serde_json::Value, ProviderError> {
    let resp = client
        .execute(req)
        .await
        .map_err(|e| ProviderError::query(provider, format!("request failed: {e}")))?;

    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        return Err(ProviderError::query(
            provider,
            format!("status {status}: {body}"),
        ));
    }

    resp.json()
        .await
        .map_err(|e| ProviderError::query(provider, format!("invalid JSON body: {e}")))
}

#[cfg(test)]
pub(crate) mod testing {
    use super::HttpClient;
    use async_trait::async_trait;
    use reqwest::header::HeaderMap;
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};

    /// Answers with canned `(status, body)` pairs in order and records the
    /// URL and headers of every request it receives. Clones share state.
    #[derive(Clone, Default)]
    pub(crate) struct Scripted {
        replies: Arc<Mutex<VecDeque<(u16, String)>>>,
        seen: Arc<Mutex<Vec<(reqwest::Url, HeaderMap)>>>,
    }

    impl Scripted {
        pub(crate) fn new(replies: &[(u16, &str)]) -> Self {
            let replies = replies
                .iter()
                .map(|(status, body)| (*status, body.to_string()))
                .collect();
            Self {
                replies: Arc::new(Mutex::new(replies)),
                ..Default::default()
            }
        }

        pub(crate) fn calls(&self) -> usize {
            self.seen.lock().unwrap().len()
        }

        pub(crate) fn request(&self, n: usize) -> (reqwest::Url, HeaderMap) {
            self.seen.lock().unwrap()[n].clone()
        }
    }

    #[async_trait]
    impl HttpClient for Scripted {
        async fn execute(&self, req: reqwest::Request) -> reqwest::Result<reqwest::Response> {
            self.seen
                .lock()
                .unwrap()
                .push((req.url().clone(), req.headers().clone()));
            let (status, body) = self
                .replies
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or((500, String::new()));
            let resp = http::Response::builder().status(status).body(body).unwrap();
            Ok(reqwest::Response::from(resp))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::Scripted;
    use super::*;
    use reqwest::{Method, Request, Url};

    fn get() -> Request {
        Request::new(Method::GET, Url::parse("http://localhost/route").unwrap())
    }

    #[tokio::test]
    async fn test_fetch_json_decodes_body() {
        let client = Scripted::new(&[(200, r#"{"code": 0}"#)]);
        let body = fetch_json(&client, get(), "naver").await.unwrap();
        assert_eq!(body["code"], 0);
    }

    #[tokio::test]
    async fn test_error_status_is_query_failure() {
        let client = Scripted::new(&[(404, "not found")]);
        match fetch_json(&client, get(), "naver").await.unwrap_err() {
            ProviderError::Query { provider, message } => {
                assert_eq!(provider, "naver");
                assert!(message.contains("404"));
                assert!(message.contains("not found"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_non_json_body_is_query_failure() {
        let client = Scripted::new(&[(200, "<html>")]);
        assert!(matches!(
            fetch_json(&client, get(), "tmap").await,
            Err(ProviderError::Query { .. })
        ));
    }
}
