use reqwest::{Client, StatusCode};
use shared::config::SourceConfig;
use tracing::debug;
use volume::{Batch, EventSource, RequestType, SourceError};

/// Search-API client feeding the session over HTTP.
pub struct HttpEventSource {
    client: Client,
    search_url: String,
    appkey: String,
}

impl HttpEventSource {
    pub fn new(config: &SourceConfig) -> Self {
        Self {
            client: Client::new(),
            search_url: search_url(&config.api_base_url),
            appkey: config.appkey.clone(),
        }
    }

    async fn search(
        &self,
        query: &str,
        since: Option<&str>,
        request_type: RequestType,
    ) -> Result<Batch, SourceError> {
        let mut params = vec![("q", query), ("appkey", self.appkey.as_str())];
        if let Some(since) = since {
            params.push(("since", since));
        }
        debug!(%request_type, ?since, "Searching");

        let response = self
            .client
            .get(&self.search_url)
            .query(&params)
            .send()
            .await
            .map_err(|e| transient(e, request_type))?;

        let status = response.status();
        if !status.is_success() {
            return Err(status_error(status, request_type));
        }

        response
            .json::<Batch>()
            .await
            .map_err(|e| SourceError::new(format!("malformed response: {e}"), request_type))
    }
}

impl EventSource for HttpEventSource {
    async fn fetch_initial(&self, query: &str) -> Result<Batch, SourceError> {
        self.search(query, None, RequestType::Initial).await
    }

    async fn poll_updates(&self, query: &str, since: Option<&str>) -> Result<Batch, SourceError> {
        self.search(query, since, RequestType::Live).await
    }
}

fn search_url(api_base_url: &str) -> String {
    format!("{}/search", api_base_url.trim_end_matches('/'))
}

/// Connection trouble is worth retrying on the next poll.
fn transient(err: reqwest::Error, request_type: RequestType) -> SourceError {
    SourceError::new(err.to_string(), request_type).with_critical(false)
}

/// Server-side failures are transient; anything else (a rejected appkey, a bad
/// query) won't fix itself and stays unflagged.
fn status_error(status: StatusCode, request_type: RequestType) -> SourceError {
    let err = SourceError::new(format!("search returned {status}"), request_type);
    if status.is_server_error() {
        err.with_critical(false)
    } else {
        err
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_url_tolerates_trailing_slash() {
        assert_eq!(search_url("https://api.test/v1/"), "https://api.test/v1/search");
        assert_eq!(search_url("https://api.test/v1"), "https://api.test/v1/search");
    }

    #[test]
    fn live_server_errors_are_not_critical() {
        let err = status_error(StatusCode::BAD_GATEWAY, RequestType::Live);
        assert!(!err.is_critical());
        let err = status_error(StatusCode::FORBIDDEN, RequestType::Live);
        assert!(err.is_critical());
    }

    #[test]
    fn search_response_parses_into_batch() {
        let body = r#"{
            "entries": [
                {
                    "verbs": ["http://activitystrea.ms/schema/1.0/post"],
                    "object": { "published": "2024-03-04T15:29:00Z" }
                }
            ],
            "nextSince": "abc"
        }"#;
        let batch: Batch = serde_json::from_str(body).unwrap();
        assert_eq!(batch.entries.len(), 1);
        assert!(batch.entries[0].is_post());
        assert_eq!(batch.next_since.as_deref(), Some("abc"));
    }
}
