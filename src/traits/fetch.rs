//! Fetch trait: the transport capability every navigation step runs on.

use async_trait::async_trait;
use serde_json::Value;

use crate::error::Result;

/// Retrieve raw payloads from a BIGSdb service.
///
/// [`BigsdbClient`](crate::BigsdbClient) is the HTTP implementation. Model
/// code only depends on this trait, so tests can substitute an in-memory
/// transport.
///
/// URLs are usually absolute links taken from earlier responses; relative
/// URLs are resolved against [`Fetch::root_url`].
#[async_trait]
pub trait Fetch: Send + Sync {
    /// Root URL of the service; its response is the resource index.
    fn root_url(&self) -> &str;

    /// GET a URL and decode the body as JSON.
    ///
    /// # Errors
    ///
    /// Returns [`BigsdbError::Api`](crate::BigsdbError::Api) carrying the
    /// status code on a non-2xx response.
    async fn fetch_json(&self, url: &str) -> Result<Value>;

    /// GET a URL and return the body as text (FASTA, tab-separated tables).
    async fn fetch_text(&self, url: &str) -> Result<String>;

    /// POST a JSON payload and decode the JSON response.
    async fn post_json(&self, url: &str, payload: &Value) -> Result<Value>;
}

#[cfg(test)]
pub(crate) mod fake {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use super::*;
    use crate::error::BigsdbError;

    /// In-memory transport serving canned bodies keyed on URL.
    #[derive(Default)]
    pub(crate) struct FakeFetch {
        root: String,
        json: HashMap<String, Value>,
        text: HashMap<String, String>,
        pub(crate) requests: Mutex<Vec<String>>,
        pub(crate) posted: Mutex<Vec<(String, Value)>>,
    }

    impl FakeFetch {
        pub(crate) fn new(root: &str) -> Self {
            Self {
                root: root.to_string(),
                ..Self::default()
            }
        }

        pub(crate) fn with_json(mut self, url: &str, body: Value) -> Self {
            self.json.insert(url.to_string(), body);
            self
        }

        pub(crate) fn with_text(mut self, url: &str, body: &str) -> Self {
            self.text.insert(url.to_string(), body.to_string());
            self
        }

        pub(crate) fn requested(&self) -> Vec<String> {
            self.requests.lock().unwrap().clone()
        }

        fn not_found(url: &str) -> BigsdbError {
            BigsdbError::Api {
                message: format!("no fixture for {url}"),
                status_code: Some(404),
            }
        }
    }

    #[async_trait]
    impl Fetch for FakeFetch {
        fn root_url(&self) -> &str {
            &self.root
        }

        async fn fetch_json(&self, url: &str) -> Result<Value> {
            self.requests.lock().unwrap().push(url.to_string());
            self.json.get(url).cloned().ok_or_else(|| Self::not_found(url))
        }

        async fn fetch_text(&self, url: &str) -> Result<String> {
            self.requests.lock().unwrap().push(url.to_string());
            self.text.get(url).cloned().ok_or_else(|| Self::not_found(url))
        }

        async fn post_json(&self, url: &str, payload: &Value) -> Result<Value> {
            self.posted
                .lock()
                .unwrap()
                .push((url.to_string(), payload.clone()));
            self.json.get(url).cloned().ok_or_else(|| Self::not_found(url))
        }
    }
}
