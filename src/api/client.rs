use crate::api::errors::ApiError;
use crate::api::models::DeliveryStatus;
use crate::user_agent::generate_user_agent;
use futures::stream::{Stream, StreamExt};
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use std::pin::Pin;

/// Thin HTTP client over the Crosspost backend.
pub struct ApiClient {
    base_url: String,
    access_token: Option<String>,
    client: Client,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Self {
        let client = Client::builder()
            .user_agent(generate_user_agent())
            .build()
            .expect("Failed to create HTTP client");

        Self {
            base_url: base_url.to_string(),
            access_token: None,
            client,
        }
    }

    pub fn set_access_token(&mut self, token: String) {
        self.access_token = Some(token);
    }

    fn with_auth(&self, request: RequestBuilder, use_auth: bool) -> Result<RequestBuilder, ApiError> {
        if !use_auth {
            return Ok(request);
        }
        match &self.access_token {
            Some(token) => Ok(request.bearer_auth(token)),
            None => Err(ApiError::Unauthorized(
                "Authorization required but no token is set.".into(),
            )),
        }
    }

    pub async fn get<T>(&self, endpoint: &str, use_auth: bool) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
    {
        let full_url = format!("{}/{}", self.base_url, endpoint);
        let request = self.with_auth(self.client.get(&full_url), use_auth)?;
        decode(request.send().await).await
    }

    pub async fn post<T>(
        &self,
        endpoint: &str,
        body: serde_json::Value,
        use_auth: bool,
    ) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
    {
        let full_url = format!("{}/{}", self.base_url, endpoint);
        let request = self.with_auth(self.client.post(&full_url).json(&body), use_auth)?;
        decode(request.send().await).await
    }

    /// POSTs to an absolute URL. The publishing webhook lives on its own
    /// host, outside `base_url`.
    pub async fn post_absolute<T>(&self, url: &str, body: serde_json::Value) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
    {
        decode(self.client.post(url).json(&body).send().await).await
    }

    /// Streams delivery events for a post as Server-Sent Events.
    pub async fn stream_sse(
        &self,
        endpoint: &str,
    ) -> Result<Pin<Box<dyn Stream<Item = Result<DeliveryStatus, ApiError>> + Send>>, ApiError>
    {
        let full_url = format!("{}/{}", self.base_url, endpoint);
        let request = self.with_auth(self.client.get(&full_url), true)?;

        let response = request
            .send()
            .await
            .map_err(|e| ApiError::Unexpected(e.to_string()))?;

        if !response.status().is_success() {
            return Err(error_for_status(response).await);
        }

        let stream = response
            .bytes_stream()
            .map(|chunk_result| match chunk_result {
                Ok(chunk) => {
                    let text = String::from_utf8_lossy(&chunk);
                    parse_sse_events(&text)
                }
                Err(e) => vec![Err(ApiError::Unexpected(format!("Stream error: {}", e)))],
            })
            .flat_map(futures::stream::iter);

        Ok(Box::pin(stream))
    }
}

async fn decode<T>(response: Result<Response, reqwest::Error>) -> Result<T, ApiError>
where
    T: DeserializeOwned,
{
    match response {
        Ok(resp) if resp.status().is_success() => resp
            .json::<T>()
            .await
            .map_err(|e| ApiError::DecodeError(e.to_string())),
        Ok(resp) => Err(error_for_status(resp).await),
        Err(e) => Err(ApiError::Unexpected(e.to_string())),
    }
}

async fn error_for_status(response: Response) -> ApiError {
    let status = response.status().as_u16();
    if status == 429 {
        return ApiError::RateLimited;
    }

    let message = response
        .text()
        .await
        .unwrap_or_else(|_| "Unexpected Error".to_string());

    match status {
        400 => ApiError::BadRequest(message),
        401 => ApiError::Unauthorized(message),
        404 => ApiError::NotFound(message),
        422 => ApiError::InvalidInput(message),
        500 => ApiError::ServerError(message),
        _ => ApiError::Unexpected(message),
    }
}

/// Parses `data:` lines of an SSE chunk into delivery events.
fn parse_sse_events(text: &str) -> Vec<Result<DeliveryStatus, ApiError>> {
    let mut events = Vec::new();

    for line in text.lines() {
        let line = line.trim();

        if let Some(data) = line.strip_prefix("data: ") {
            if data.trim().is_empty() {
                continue;
            }

            match serde_json::from_str::<DeliveryStatus>(data) {
                Ok(event) => events.push(Ok(event)),
                Err(e) => {
                    // The server reports stream-level problems as a bare
                    // error object instead of an event.
                    if let Ok(error_obj) = serde_json::from_str::<serde_json::Value>(data) {
                        if let Some(error_msg) = error_obj.get("error").and_then(|v| v.as_str()) {
                            events.push(Err(ApiError::NotFound(error_msg.to_string())));
                            continue;
                        }
                    }
                    events.push(Err(ApiError::DecodeError(format!(
                        "Failed to parse delivery event: {}",
                        e
                    ))));
                }
            }
        }
    }

    events
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_sse_events_reads_delivery_lines() {
        let chunk = concat!(
            "event: delivery\n",
            "data: {\"postId\":\"post-1\",\"status\":\"publishing\"}\n",
            "\n",
            "data: {\"postId\":\"post-1\",\"status\":\"published\",\"successCount\":2}\n",
        );

        let events = parse_sse_events(chunk);
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].as_ref().unwrap().status, "publishing");
        assert_eq!(events[1].as_ref().unwrap().success_count, 2);
    }

    #[test]
    fn test_parse_sse_events_surfaces_error_objects() {
        let events = parse_sse_events("data: {\"error\":\"post not found\"}\n");
        assert_eq!(events.len(), 1);
        assert!(matches!(events[0], Err(ApiError::NotFound(ref msg)) if msg == "post not found"));
    }

    #[test]
    fn test_parse_sse_events_skips_blank_data() {
        assert!(parse_sse_events("data: \n\n").is_empty());
    }
}
