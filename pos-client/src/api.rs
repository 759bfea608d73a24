use std::time::Duration;

use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ClientError, ClientResult};
use crate::models::{CreatedEnvelope, DataEnvelope, NewStockRequest, StockRequest};

#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
    #[serde(rename = "branchid", skip_serializing_if = "Option::is_none")]
    pub branch_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct LoginResponse {
    #[serde(default)]
    token: Option<String>,
}

#[derive(Debug, Serialize)]
struct StatusUpdate<'a> {
    status: &'a str,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: String,
}

/// Thin typed wrapper over the POS REST backend.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    pub fn with_client(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn with_timeout(base_url: impl Into<String>, timeout: Option<Duration>) -> ClientResult<Self> {
        let base_url = base_url.into();
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(|source| ClientError::Transport {
            url: base_url.clone(),
            source,
        })?;
        Ok(Self::with_client(client, base_url))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Exchange credentials (and optionally a branch) for a session token.
    pub async fn login(&self, request: &LoginRequest) -> ClientResult<String> {
        let url = self.url("/login");
        let response = self
            .client
            .post(&url)
            .json(request)
            .send()
            .await
            .map_err(|source| ClientError::Transport {
                url: url.clone(),
                source,
            })?;

        if !response.status().is_success() {
            return Err(backend_error(response).await);
        }

        let body: LoginResponse = response.json().await.map_err(|err| ClientError::Decode {
            url: url.clone(),
            message: err.to_string(),
        })?;
        debug!(url, branch = request.branch_id.as_deref(), "login accepted");
        body.token
            .filter(|token| !token.trim().is_empty())
            .ok_or(ClientError::MissingToken)
    }

    /// `GET` a list endpoint with the session's bearer token.
    pub async fn list<T>(&self, token: &str, path: &str, query: &[(&str, &str)]) -> ClientResult<Vec<T>>
    where
        T: DeserializeOwned,
    {
        let url = self.url(path);
        let response = self
            .client
            .get(&url)
            .bearer_auth(token)
            .query(query)
            .send()
            .await
            .map_err(|source| ClientError::Transport {
                url: url.clone(),
                source,
            })?;

        let response = authorized(response).await?;
        let envelope: DataEnvelope<T> =
            response.json().await.map_err(|err| ClientError::Decode {
                url: url.clone(),
                message: err.to_string(),
            })?;
        Ok(envelope.into_items())
    }

    /// `POST /requests`; the backend answers with the stored request.
    pub async fn create_request(
        &self,
        token: &str,
        request: &NewStockRequest,
    ) -> ClientResult<StockRequest> {
        let url = self.url("/requests");
        let response = self
            .client
            .post(&url)
            .bearer_auth(token)
            .json(request)
            .send()
            .await
            .map_err(|source| ClientError::Transport {
                url: url.clone(),
                source,
            })?;

        let response = authorized(response).await?;
        let created: CreatedEnvelope<StockRequest> =
            response.json().await.map_err(|err| ClientError::Decode {
                url: url.clone(),
                message: err.to_string(),
            })?;
        debug!(request_id = %created.new.request_id, "stock request created");
        Ok(created.new)
    }

    /// `PUT /requests/{id}` with a new status. Only the status is sent.
    pub async fn update_request_status(
        &self,
        token: &str,
        request_id: &str,
        status: &str,
    ) -> ClientResult<()> {
        let url = self.url(&format!("/requests/{request_id}"));
        let response = self
            .client
            .put(&url)
            .bearer_auth(token)
            .json(&StatusUpdate { status })
            .send()
            .await
            .map_err(|source| ClientError::Transport {
                url: url.clone(),
                source,
            })?;

        authorized(response).await?;
        Ok(())
    }
}

async fn authorized(response: Response) -> ClientResult<Response> {
    let status = response.status();
    if status == StatusCode::UNAUTHORIZED {
        return Err(ClientError::Unauthorized);
    }
    if !status.is_success() {
        return Err(backend_error(response).await);
    }
    Ok(response)
}

async fn backend_error(response: Response) -> ClientError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorResponse>(&body)
        .map(|parsed| parsed.error)
        .unwrap_or_else(|_| {
            if body.trim().is_empty() {
                status
                    .canonical_reason()
                    .unwrap_or("unexpected status")
                    .to_string()
            } else {
                body
            }
        });
    ClientError::Backend {
        status: status.as_u16(),
        message,
    }
}
