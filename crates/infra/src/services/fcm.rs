use super::{aggregate_status, TransportConfigError};
use crate::config::FcmConfig;
use crate::system::ISys;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use nudge_domain::{DeliveryStatus, NotificationPayload};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};
use tracing::{error, warn};

// https://firebase.google.com/docs/cloud-messaging/send-message#rest

const TOKEN_ENDPOINT: &str = "https://oauth2.googleapis.com/token";
const FCM_SCOPE: &str = "https://www.googleapis.com/auth/firebase.messaging";
const FCM_API_BASE_URL: &str = "https://fcm.googleapis.com/v1/projects";
/// Lifetime requested for the signed service account assertion
const ASSERTION_LIFETIME_SECS: i64 = 60 * 60;
/// Cached access tokens are renewed this long before they expire
const TOKEN_EXPIRY_MARGIN_SECS: i64 = 60;

#[derive(Debug, Clone, PartialEq)]
pub struct FcmSendResult {
    pub status: DeliveryStatus,
    pub sent: usize,
    pub failed: usize,
    /// Tokens FCM no longer recognizes, they should not be used again
    pub invalid_tokens: Vec<String>,
}

#[async_trait::async_trait]
pub trait IFcmTransport: Send + Sync {
    fn ensure_configured(&self) -> Result<(), TransportConfigError>;
    async fn send(&self, tokens: &[String], payload: &NotificationPayload) -> FcmSendResult;
}

#[derive(Debug, Serialize)]
struct ServiceAccountClaims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Debug, Deserialize)]
struct AccessTokenResponse {
    access_token: String,
    // Specified in seconds
    expires_in: i64,
}

#[derive(Debug, Clone)]
struct CachedAccessToken {
    token: String,
    expires_at: i64,
}

#[derive(Debug, Serialize)]
struct SendMessageRequest<'a> {
    message: FcmMessage<'a>,
}

#[derive(Debug, Serialize)]
struct FcmMessage<'a> {
    token: &'a str,
    notification: FcmNotification<'a>,
    data: HashMap<&'static str, String>,
    android: AndroidConfig<'a>,
    webpush: WebpushConfig<'a>,
}

#[derive(Debug, Serialize)]
struct FcmNotification<'a> {
    title: &'a str,
    body: &'a str,
}

#[derive(Debug, Serialize)]
struct AndroidConfig<'a> {
    collapse_key: &'a str,
}

#[derive(Debug, Serialize)]
struct WebpushConfig<'a> {
    fcm_options: WebpushFcmOptions<'a>,
}

#[derive(Debug, Serialize)]
struct WebpushFcmOptions<'a> {
    link: &'a str,
}

#[derive(Debug, Deserialize)]
struct FcmErrorResponse {
    error: FcmErrorBody,
}

#[derive(Debug, Deserialize)]
struct FcmErrorBody {
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    details: Vec<FcmErrorDetail>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FcmErrorDetail {
    #[serde(default)]
    error_code: Option<String>,
}

enum TokenOutcome {
    Sent,
    Invalid,
    Rejected,
    Errored,
}

/// Whether an FCM error response means the registration token is dead
fn is_invalid_token_response(status: StatusCode, body: &str) -> bool {
    if status == StatusCode::NOT_FOUND {
        return true;
    }
    match serde_json::from_str::<FcmErrorResponse>(body) {
        Ok(res) => {
            res.error.status.as_deref() == Some("UNREGISTERED")
                || res
                    .error
                    .details
                    .iter()
                    .any(|d| d.error_code.as_deref() == Some("UNREGISTERED"))
        }
        Err(_) => false,
    }
}

/// FCM HTTP v1 API authenticated with a service account
pub struct HttpFcmTransport {
    client: Client,
    config: Option<FcmConfig>,
    sys: Arc<dyn ISys>,
    access_token: Mutex<Option<CachedAccessToken>>,
}

impl HttpFcmTransport {
    pub fn new(config: Option<FcmConfig>, sys: Arc<dyn ISys>) -> Self {
        Self {
            client: Client::new(),
            config,
            sys,
            access_token: Mutex::new(None),
        }
    }

    async fn get_access_token(&self, config: &FcmConfig) -> anyhow::Result<String> {
        let now = self.sys.get_timestamp_millis() / 1000;
        let cached = self
            .access_token
            .lock()
            .unwrap()
            .as_ref()
            .filter(|cached| cached.expires_at - TOKEN_EXPIRY_MARGIN_SECS > now)
            .map(|cached| cached.token.clone());
        if let Some(token) = cached {
            return Ok(token);
        }

        let claims = ServiceAccountClaims {
            iss: &config.client_email,
            scope: FCM_SCOPE,
            aud: TOKEN_ENDPOINT,
            iat: now,
            exp: now + ASSERTION_LIFETIME_SECS,
        };
        let key = EncodingKey::from_rsa_pem(config.private_key.as_bytes())?;
        let assertion = encode(&Header::new(Algorithm::RS256), &claims, &key)?;

        let params = [
            ("grant_type", "urn:ietf:params:oauth:grant-type:jwt-bearer"),
            ("assertion", assertion.as_str()),
        ];
        let res = self
            .client
            .post(TOKEN_ENDPOINT)
            .form(&params)
            .send()
            .await?
            .error_for_status()?
            .json::<AccessTokenResponse>()
            .await?;

        *self.access_token.lock().unwrap() = Some(CachedAccessToken {
            token: res.access_token.clone(),
            expires_at: now + res.expires_in,
        });
        Ok(res.access_token)
    }

    async fn send_one(
        &self,
        config: &FcmConfig,
        access_token: &str,
        token: &str,
        payload: &NotificationPayload,
    ) -> TokenOutcome {
        let mut data = HashMap::new();
        data.insert("url", payload.url.clone());
        data.insert("tag", payload.tag.clone());
        data.insert("notificationId", payload.notification_id.to_string());
        let body = SendMessageRequest {
            message: FcmMessage {
                token,
                notification: FcmNotification {
                    title: &payload.title,
                    body: &payload.body,
                },
                data,
                android: AndroidConfig {
                    collapse_key: &payload.tag,
                },
                webpush: WebpushConfig {
                    fcm_options: WebpushFcmOptions { link: &payload.url },
                },
            },
        };

        match self
            .client
            .post(&format!(
                "{}/{}/messages:send",
                FCM_API_BASE_URL, config.project_id
            ))
            .header("authorization", format!("Bearer {}", access_token))
            .json(&body)
            .send()
            .await
        {
            Ok(res) if res.status().is_success() => TokenOutcome::Sent,
            Ok(res) => {
                let status = res.status();
                let text = res.text().await.unwrap_or_default();
                if is_invalid_token_response(status, &text) {
                    warn!("FCM token is no longer registered");
                    TokenOutcome::Invalid
                } else if status.is_server_error() {
                    error!(
                        "[Unexpected Response] FCM responded with status: {}. Body: {}",
                        status, text
                    );
                    TokenOutcome::Errored
                } else {
                    error!(
                        "[Rejected] FCM responded with status: {}. Body: {}",
                        status, text
                    );
                    TokenOutcome::Rejected
                }
            }
            Err(e) => {
                error!("[Network Error] FCM send error. Error message: {:?}", e);
                TokenOutcome::Errored
            }
        }
    }
}

#[async_trait::async_trait]
impl IFcmTransport for HttpFcmTransport {
    fn ensure_configured(&self) -> Result<(), TransportConfigError> {
        self.config
            .as_ref()
            .map(|_| ())
            .ok_or(TransportConfigError::Fcm)
    }

    async fn send(&self, tokens: &[String], payload: &NotificationPayload) -> FcmSendResult {
        let config = match &self.config {
            Some(config) => config,
            None => {
                return FcmSendResult {
                    status: DeliveryStatus::Skipped,
                    sent: 0,
                    failed: 0,
                    invalid_tokens: vec![],
                }
            }
        };
        let access_token = match self.get_access_token(config).await {
            Ok(token) => token,
            Err(e) => {
                error!("Unable to get FCM access token. Error message: {:?}", e);
                return FcmSendResult {
                    status: DeliveryStatus::Error,
                    sent: 0,
                    failed: tokens.len(),
                    invalid_tokens: vec![],
                };
            }
        };

        let (mut sent, mut rejected, mut errored) = (0, 0, 0);
        let mut invalid_tokens = vec![];
        for token in tokens {
            match self.send_one(config, &access_token, token, payload).await {
                TokenOutcome::Sent => sent += 1,
                TokenOutcome::Invalid => {
                    invalid_tokens.push(token.clone());
                    rejected += 1;
                }
                TokenOutcome::Rejected => rejected += 1,
                TokenOutcome::Errored => errored += 1,
            }
        }

        FcmSendResult {
            status: aggregate_status(sent, rejected, errored),
            sent,
            failed: rejected + errored,
            invalid_tokens,
        }
    }
}

/// Records messages instead of sending them. Tokens marked invalid are
/// reported as such on every send.
pub struct InMemoryFcmTransport {
    configured: bool,
    invalid_tokens: Mutex<Vec<String>>,
    sent: Mutex<Vec<(String, NotificationPayload)>>,
}

impl InMemoryFcmTransport {
    pub fn new() -> Self {
        Self {
            configured: true,
            invalid_tokens: Mutex::new(vec![]),
            sent: Mutex::new(vec![]),
        }
    }

    pub fn unconfigured() -> Self {
        Self {
            configured: false,
            ..Self::new()
        }
    }

    pub fn mark_invalid(&self, token: &str) {
        self.invalid_tokens.lock().unwrap().push(token.to_string());
    }

    /// Every successful delivery as (token, payload)
    pub fn deliveries(&self) -> Vec<(String, NotificationPayload)> {
        self.sent.lock().unwrap().clone()
    }
}

impl Default for InMemoryFcmTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl IFcmTransport for InMemoryFcmTransport {
    fn ensure_configured(&self) -> Result<(), TransportConfigError> {
        if self.configured {
            Ok(())
        } else {
            Err(TransportConfigError::Fcm)
        }
    }

    async fn send(&self, tokens: &[String], payload: &NotificationPayload) -> FcmSendResult {
        let known_invalid = self.invalid_tokens.lock().unwrap().clone();
        let mut sent = self.sent.lock().unwrap();
        let mut invalid_tokens = vec![];
        for token in tokens {
            if known_invalid.contains(token) {
                invalid_tokens.push(token.clone());
            } else {
                sent.push((token.clone(), payload.clone()));
            }
        }
        let delivered = tokens.len() - invalid_tokens.len();
        FcmSendResult {
            status: aggregate_status(delivered, invalid_tokens.len(), 0),
            sent: delivered,
            failed: invalid_tokens.len(),
            invalid_tokens,
        }
    }
}
