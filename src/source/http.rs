//! HTTP transport for the sensor's event stream.

use std::io;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use futures_util::stream::{BoxStream, StreamExt, TryStreamExt};
use reqwest::header::{ACCEPT, CACHE_CONTROL};
use reqwest::Client;
use tokio_util::io::StreamReader;

use super::ingest::Connector;
use crate::error::IngestError;

/// Body of an open event-stream response, readable as bytes.
pub type HttpBody = StreamReader<BoxStream<'static, io::Result<Bytes>>, Bytes>;

/// Opens the event stream with an HTTP GET.
#[derive(Debug, Clone)]
pub struct HttpConnector {
    client: Client,
    url: String,
}

impl HttpConnector {
    /// Create a connector for `url`.
    ///
    /// `connect_timeout` bounds connection establishment only; the body is
    /// a long-lived stream and has no overall deadline.
    pub fn new(url: impl Into<String>, connect_timeout: Duration) -> Result<Self, IngestError> {
        let client = Client::builder()
            .connect_timeout(connect_timeout)
            .build()
            .map_err(|e| IngestError::Connection(e.to_string()))?;

        Ok(Self {
            client,
            url: url.into(),
        })
    }

    /// Create a connector that reuses an existing client.
    pub fn with_client(client: Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }

    /// Stream URL.
    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl Connector for HttpConnector {
    type Reader = HttpBody;

    async fn connect(&self) -> Result<HttpBody, IngestError> {
        let response = self
            .client
            .get(&self.url)
            .header(ACCEPT, "text/event-stream")
            .header(CACHE_CONTROL, "no-cache")
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(IngestError::Http(format!(
                "stream returned status {}",
                response.status()
            )));
        }

        let body = response.bytes_stream().map_err(io::Error::other).boxed();
        Ok(StreamReader::new(body))
    }

    fn describe(&self) -> &str {
        &self.url
    }
}
