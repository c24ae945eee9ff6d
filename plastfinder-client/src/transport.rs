//! HTTP transport for the search stream.

use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};
use bytes::Bytes;
use futures::{Stream, StreamExt};
use plastfinder_core::SearchCriteria;
use plastfinder_streaming::{
    consume, SearchController, SearchUpdate, StreamError, StreamResult,
};
use serde::Deserialize;
use std::pin::Pin;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use url::Url;

/// Response body as a byte stream.
pub type ByteStream = Pin<Box<dyn Stream<Item = StreamResult<Bytes>> + Send>>;

#[derive(Deserialize)]
struct ErrorBody {
    error: String,
}

/// Client for the search endpoint.
#[derive(Debug, Clone)]
pub struct SearchClient {
    http: reqwest::Client,
    endpoint: Url,
    idle_timeout: Duration,
}

impl SearchClient {
    /// Create a client from configuration.
    pub fn new(config: &ClientConfig) -> ClientResult<Self> {
        let endpoint = Url::parse(&config.endpoint).map_err(|e| {
            ClientError::config(format!("invalid endpoint {:?}: {e}", config.endpoint))
        })?;
        let http = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self {
            http,
            endpoint,
            idle_timeout: config.idle_timeout,
        })
    }

    /// The endpoint searches are posted to.
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Post the criteria and return the response body.
    ///
    /// Fails with [`StreamError::Transport`] if the request is rejected or
    /// the status is not a success.
    pub async fn open(&self, criteria: &SearchCriteria) -> StreamResult<ByteStream> {
        let response = self
            .http
            .post(self.endpoint.clone())
            .json(criteria)
            .send()
            .await
            .map_err(|e| StreamError::transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = match serde_json::from_str::<ErrorBody>(&body) {
                Ok(parsed) => format!("HTTP {}: {}", status.as_u16(), parsed.error),
                Err(_) => format!("HTTP {}", status.as_u16()),
            };
            return Err(StreamError::transport(message));
        }

        let body = response
            .bytes_stream()
            .map(|chunk| chunk.map_err(|e| StreamError::transport(e.to_string())));
        Ok(Box::pin(body))
    }

    /// Run one search into `controller`, reporting every transition.
    ///
    /// The controller is reset for the new criteria first. Records that
    /// arrived before a transport failure stay in the controller.
    pub async fn search<F>(
        &self,
        controller: &mut SearchController,
        criteria: SearchCriteria,
        cancel: &CancellationToken,
        mut on_update: F,
    ) -> StreamResult<()>
    where
        F: FnMut(&SearchController, &SearchUpdate),
    {
        let update = controller.begin(criteria.clone());
        on_update(controller, &update);

        let opened = tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(StreamError::Cancelled),
            opened = self.open(&criteria) => opened,
        };

        let body = match opened {
            Ok(body) => body,
            Err(e) => {
                let update = if e.is_cancelled() {
                    controller.cancel()
                } else {
                    tracing::warn!(error = %e, "Search request failed");
                    controller.fail(&e)
                };
                if let Some(update) = update {
                    on_update(controller, &update);
                }
                return Err(e);
            }
        };

        consume(controller, body, cancel, self.idle_timeout, &mut on_update).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_endpoint() {
        let config = ClientConfig::default().with_endpoint("not a url");
        assert!(matches!(SearchClient::new(&config), Err(ClientError::Config(_))));
    }
}
