use crate::error::{Result, RokuError};
use crate::types::DeviceId;
use bytes::Bytes;
use reqwest::{Client, Method, StatusCode};
use std::sync::OnceLock;

/// Low-level HTTP session to one device
///
/// The HTTP client is created on the first request and reused afterwards.
pub struct Connection {
    id: DeviceId,
    client: OnceLock<Client>,
}

impl Connection {
    /// Create a connection; nothing is sent until the first request
    pub fn new(id: DeviceId) -> Self {
        Self {
            id,
            client: OnceLock::new(),
        }
    }

    /// Create a connection that uses an existing HTTP client
    pub fn with_client(id: DeviceId, client: Client) -> Self {
        Self {
            id,
            client: OnceLock::from(client),
        }
    }

    /// Identity of the device this connection talks to
    pub fn id(&self) -> &DeviceId {
        &self.id
    }

    fn client(&self) -> &Client {
        self.client.get_or_init(|| {
            tracing::debug!("Creating HTTP session for {}", self.id);
            Client::new()
        })
    }

    fn url(&self, path: &str) -> String {
        format!("http://{}:{}{}", self.id.host, self.id.port, path)
    }

    /// Send a GET request and return the body
    pub async fn get(&self, path: &str) -> Result<Bytes> {
        self.call(Method::GET, path, &[]).await
    }

    /// Send a POST request with `params` in the query string and return the body
    pub async fn post(&self, path: &str, params: &[(&str, &str)]) -> Result<Bytes> {
        self.call(Method::POST, path, params).await
    }

    async fn call(&self, method: Method, path: &str, params: &[(&str, &str)]) -> Result<Bytes> {
        tracing::debug!("{} {}", method, path);

        let mut request = self.client().request(method, self.url(path));
        if !params.is_empty() {
            request = request.query(params);
        }

        let response = request.send().await?;
        let status = response.status();
        let body = response.bytes().await?;

        if status != StatusCode::OK {
            tracing::debug!("{} answered {} for {}", self.id, status, path);
            return Err(RokuError::Protocol {
                status: status.as_u16(),
                body,
            });
        }

        Ok(body)
    }
}
