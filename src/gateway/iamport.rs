//! Iamport REST client.

use async_trait::async_trait;
use chrono::Utc;
use reqwest::{Client, Response, Url};
use serde::{Deserialize, de::DeserializeOwned};
use tokio::sync::RwLock;

use super::{CancelRequest, GatewayError, GatewayPayment, PaymentGateway};

/// Tokens are refreshed this many seconds before the gateway says they expire.
const TOKEN_EXPIRY_MARGIN_SECS: i64 = 60;

#[derive(Debug, Clone)]
pub struct IamportConfig {
    /// e.g. `"https://api.iamport.kr"`.
    pub base_url: String,
    pub api_key: String,
    pub api_secret: String,
}

#[derive(Debug)]
pub struct IamportClient {
    config: IamportConfig,
    http: Client,
    token: RwLock<Option<AccessToken>>,
}

#[derive(Debug, Clone)]
struct AccessToken {
    value: String,
    expires_at: i64,
}

impl IamportClient {
    pub fn new(config: IamportConfig) -> Self {
        Self {
            config,
            http: Client::new(),
            token: RwLock::new(None),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url.trim_end_matches('/'), path)
    }

    /// `/payments/{imp_uid}` with the id pushed as one encoded path segment.
    fn payment_url(&self, imp_uid: &str) -> Result<Url, GatewayError> {
        let mut url = Url::parse(&self.url("/payments"))
            .map_err(|err| GatewayError::InvalidUrl(err.to_string()))?;
        url.path_segments_mut()
            .map_err(|_| GatewayError::InvalidUrl(self.config.base_url.clone()))?
            .push(imp_uid);
        Ok(url)
    }

    async fn access_token(&self) -> Result<String, GatewayError> {
        let now = Utc::now().timestamp();
        if let Some(token) = self.token.read().await.as_ref() {
            if token.expires_at - TOKEN_EXPIRY_MARGIN_SECS > now {
                return Ok(token.value.clone());
            }
        }

        let body = serde_json::json!({
            "imp_key": self.config.api_key,
            "imp_secret": self.config.api_secret,
        });
        let response = self
            .http
            .post(self.url("/users/getToken"))
            .json(&body)
            .send()
            .await?;

        let token: TokenData = decode(response)
            .await
            .map_err(|err| GatewayError::Auth(err.to_string()))?
            .ok_or_else(|| GatewayError::Auth("empty token response".into()))?;

        tracing::debug!(expires_at = token.expired_at, "refreshed gateway access token");
        let access = AccessToken {
            value: token.access_token,
            expires_at: token.expired_at,
        };
        *self.token.write().await = Some(access.clone());
        Ok(access.value)
    }
}

#[async_trait]
impl PaymentGateway for IamportClient {
    async fn find_payment(&self, imp_uid: &str) -> Result<Option<GatewayPayment>, GatewayError> {
        let token = self.access_token().await?;
        let response = self
            .http
            .get(self.payment_url(imp_uid)?)
            .header("Authorization", token)
            .send()
            .await?;

        decode(response).await
    }

    async fn cancel_payment(
        &self,
        request: CancelRequest,
    ) -> Result<Option<GatewayPayment>, GatewayError> {
        let token = self.access_token().await?;
        let response = self
            .http
            .post(self.url("/payments/cancel"))
            .header("Authorization", token)
            .json(&request)
            .send()
            .await?;

        decode(response).await
    }
}

/// Every Iamport answer is wrapped as `{ code, message, response }`; `code != 0` is a rejection.
#[derive(Debug, Deserialize)]
struct Envelope<T> {
    code: i64,
    #[serde(default)]
    message: Option<String>,
    response: Option<T>,
}

#[derive(Debug, Deserialize)]
struct TokenData {
    access_token: String,
    expired_at: i64,
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<Option<T>, GatewayError> {
    if !response.status().is_success() {
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        return Err(GatewayError::Status { status, body });
    }

    let envelope: Envelope<T> = response.json().await?;
    if envelope.code != 0 {
        return Err(GatewayError::Rejected {
            code: envelope.code,
            message: envelope.message.unwrap_or_default(),
        });
    }
    Ok(envelope.response)
}
