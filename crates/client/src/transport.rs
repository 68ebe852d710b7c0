//! Access to the sync API

use async_trait::async_trait;
use brandsheet_common::{
    errors::ErrorResponse,
    sync::{SheetSnapshot, WriteAck, WriteRequest},
};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::ClientError;

/// The two sync endpoints as seen by the data store
#[async_trait]
pub trait SyncTransport: Send + Sync {
    /// Records of `sheet`, or of the first sheet when `None`
    async fn fetch(&self, sheet: Option<&str>) -> Result<SheetSnapshot, ClientError>;

    /// Apply one write
    async fn submit(&self, request: &WriteRequest) -> Result<(), ClientError>;
}

/// [`SyncTransport`] over HTTP
#[derive(Clone)]
pub struct HttpSyncTransport {
    client: reqwest::Client,
    base_url: String,
}

impl HttpSyncTransport {
    /// Talk to the gateway at `base_url` (e.g. `http://localhost:8080`)
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn sync_url(&self) -> String {
        format!("{}/sync", self.base_url)
    }
}

#[async_trait]
impl SyncTransport for HttpSyncTransport {
    async fn fetch(&self, sheet: Option<&str>) -> Result<SheetSnapshot, ClientError> {
        let mut request = self.client.get(self.sync_url());
        if let Some(sheet) = sheet {
            request = request.query(&[("sheet", sheet)]);
        }

        let snapshot: SheetSnapshot = decode(request.send().await?).await?;
        debug!(sheet = %snapshot.sheet, records = snapshot.data.len(), "Fetched sheet");
        Ok(snapshot)
    }

    async fn submit(&self, request: &WriteRequest) -> Result<(), ClientError> {
        let response = self.client.post(self.sync_url()).json(request).send().await?;
        let ack: WriteAck = decode(response).await?;

        if !ack.success {
            return Err(ClientError::Api {
                status: 200,
                message: "Write was not acknowledged".to_string(),
            });
        }
        Ok(())
    }
}

async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ClientError> {
    let status = response.status();
    let body = response.text().await?;
    decode_body(status, &body)
}

/// Error bodies carry `{ error }`; anything else is passed on verbatim
fn decode_body<T: DeserializeOwned>(status: StatusCode, body: &str) -> Result<T, ClientError> {
    if !status.is_success() {
        let message = serde_json::from_str::<ErrorResponse>(body)
            .map(|e| e.error)
            .unwrap_or_else(|_| body.to_string());
        return Err(ClientError::Api {
            status: status.as_u16(),
            message,
        });
    }

    Ok(serde_json::from_str(body)?)
}
