use super::{aggregate_status, TransportConfigError};
use crate::config::VapidConfig;
use nudge_domain::{DeliveryStatus, NotificationPayload, PushSubscription};
use std::sync::Mutex;
use tracing::{error, warn};
use web_push::{
    ContentEncoding, HyperWebPushClient, SubscriptionInfo, VapidSignatureBuilder, WebPushClient,
    WebPushError, WebPushMessageBuilder,
};

/// Seconds a push service keeps an undelivered message around
const PUSH_TTL_SECONDS: u32 = 60 * 60;

#[derive(Debug, Clone, PartialEq)]
pub struct WebPushResult {
    pub status: DeliveryStatus,
    /// Endpoints the push service reported as gone, they should not be used again
    pub stale_endpoints: Vec<String>,
}

#[async_trait::async_trait]
pub trait IWebPushTransport: Send + Sync {
    fn ensure_configured(&self) -> Result<(), TransportConfigError>;
    async fn send(
        &self,
        subscriptions: &[PushSubscription],
        payload: &NotificationPayload,
    ) -> WebPushResult;
}

#[derive(Debug, PartialEq)]
enum PushOutcome {
    Stale,
    Rejected,
    Errored,
}

/// Web push signed with VAPID, payloads encrypted with aes128gcm
pub struct VapidWebPushTransport {
    client: HyperWebPushClient,
    config: Option<VapidConfig>,
}

impl VapidWebPushTransport {
    pub fn new(config: Option<VapidConfig>) -> Self {
        Self {
            client: HyperWebPushClient::new(),
            config,
        }
    }

    async fn send_one(
        &self,
        config: &VapidConfig,
        subscription: &PushSubscription,
        payload: &[u8],
    ) -> Result<(), WebPushError> {
        let info = SubscriptionInfo::new(
            &subscription.endpoint,
            &subscription.p256dh,
            &subscription.auth,
        );

        let mut signature = VapidSignatureBuilder::from_base64(
            &config.private_key,
            web_push::URL_SAFE_NO_PAD,
            &info,
        )?;
        signature.add_claim("sub", config.subject.as_str());
        let signature = signature.build()?;

        let mut builder = WebPushMessageBuilder::new(&info);
        builder.set_payload(ContentEncoding::Aes128Gcm, payload);
        builder.set_ttl(PUSH_TTL_SECONDS);
        builder.set_vapid_signature(signature);
        let message = builder.build()?;

        self.client.send(message).await
    }
}

fn classify(error: &WebPushError) -> PushOutcome {
    match error {
        WebPushError::EndpointNotValid | WebPushError::EndpointNotFound => PushOutcome::Stale,
        WebPushError::Unspecified
        | WebPushError::ServerError(_)
        | WebPushError::TlsError
        | WebPushError::IoError
        | WebPushError::InvalidResponse => PushOutcome::Errored,
        _ => PushOutcome::Rejected,
    }
}

#[async_trait::async_trait]
impl IWebPushTransport for VapidWebPushTransport {
    fn ensure_configured(&self) -> Result<(), TransportConfigError> {
        self.config
            .as_ref()
            .map(|_| ())
            .ok_or(TransportConfigError::WebPush)
    }

    async fn send(
        &self,
        subscriptions: &[PushSubscription],
        payload: &NotificationPayload,
    ) -> WebPushResult {
        let config = match &self.config {
            Some(config) => config,
            None => {
                return WebPushResult {
                    status: DeliveryStatus::Skipped,
                    stale_endpoints: vec![],
                }
            }
        };
        let body = match serde_json::to_vec(payload) {
            Ok(body) => body,
            Err(e) => {
                error!("Unable to serialize web push payload. Error message: {:?}", e);
                return WebPushResult {
                    status: DeliveryStatus::Error,
                    stale_endpoints: vec![],
                };
            }
        };

        let (mut sent, mut rejected, mut errored) = (0, 0, 0);
        let mut stale_endpoints = vec![];
        for subscription in subscriptions {
            match self.send_one(config, subscription, &body).await {
                Ok(()) => sent += 1,
                Err(e) => match classify(&e) {
                    PushOutcome::Stale => {
                        warn!("Push endpoint is gone: {}", subscription.endpoint);
                        stale_endpoints.push(subscription.endpoint.clone());
                        rejected += 1;
                    }
                    PushOutcome::Errored => {
                        error!(
                            "[Network Error] Web push to {} failed. Error message: {:?}",
                            subscription.endpoint, e
                        );
                        errored += 1;
                    }
                    PushOutcome::Rejected => {
                        error!(
                            "[Rejected] Web push to {} failed. Error message: {:?}",
                            subscription.endpoint, e
                        );
                        rejected += 1;
                    }
                },
            }
        }

        WebPushResult {
            status: aggregate_status(sent, rejected, errored),
            stale_endpoints,
        }
    }
}

/// Records pushes instead of sending them. Endpoints marked stale are
/// reported as such on every send.
pub struct InMemoryWebPushTransport {
    configured: bool,
    stale_endpoints: Mutex<Vec<String>>,
    sent: Mutex<Vec<(PushSubscription, NotificationPayload)>>,
}

impl InMemoryWebPushTransport {
    pub fn new() -> Self {
        Self {
            configured: true,
            stale_endpoints: Mutex::new(vec![]),
            sent: Mutex::new(vec![]),
        }
    }

    pub fn unconfigured() -> Self {
        Self {
            configured: false,
            ..Self::new()
        }
    }

    pub fn mark_stale(&self, endpoint: &str) {
        self.stale_endpoints.lock().unwrap().push(endpoint.to_string());
    }

    /// Every successful delivery as (subscription, payload)
    pub fn deliveries(&self) -> Vec<(PushSubscription, NotificationPayload)> {
        self.sent.lock().unwrap().clone()
    }
}

impl Default for InMemoryWebPushTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl IWebPushTransport for InMemoryWebPushTransport {
    fn ensure_configured(&self) -> Result<(), TransportConfigError> {
        if self.configured {
            Ok(())
        } else {
            Err(TransportConfigError::WebPush)
        }
    }

    async fn send(
        &self,
        subscriptions: &[PushSubscription],
        payload: &NotificationPayload,
    ) -> WebPushResult {
        let stale = self.stale_endpoints.lock().unwrap().clone();
        let mut sent = self.sent.lock().unwrap();
        let mut stale_endpoints = vec![];
        for subscription in subscriptions {
            if stale.contains(&subscription.endpoint) {
                stale_endpoints.push(subscription.endpoint.clone());
            } else {
                sent.push((subscription.clone(), payload.clone()));
            }
        }
        let delivered = subscriptions.len() - stale_endpoints.len();
        WebPushResult {
            status: aggregate_status(delivered, stale_endpoints.len(), 0),
            stale_endpoints,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nudge_domain::ID;
    use std::time::Duration;

    // A P-256 key pair and a browser subscription that encrypts with it
    const VAPID_PRIVATE_KEY: &str = "IQ9Ur0ykXoHS9gzfYX0aBjy9lvdrjx_PFUXmie9YRcY";
    const CLIENT_P256DH: &str =
        "BH1HTeKM7-NwaLGHEqxeu2IamQaVVLkcsFHPIHmsCnqxcBHPQBprF41bEMOr3O1hUQ2jU1opNEm1F_lZV_sxMP8";
    const CLIENT_AUTH: &str = "sBXU5_tIYz-5w7G2B25BEw";

    fn subscription(endpoint: &str) -> PushSubscription {
        PushSubscription {
            endpoint: endpoint.into(),
            user_id: ID::default(),
            p256dh: "key".into(),
            auth: "auth".into(),
        }
    }

    fn payload() -> NotificationPayload {
        NotificationPayload {
            title: "Take pills".into(),
            body: "Now".into(),
            url: "http://localhost:3000/reminders/1".into(),
            tag: "occurrence|1|2026-01-10T10:00:00.000Z|push".into(),
            notification_id: 1,
        }
    }

    #[test]
    fn requires_vapid_configuration() {
        assert_eq!(
            VapidWebPushTransport::new(None).ensure_configured(),
            Err(TransportConfigError::WebPush)
        );
    }

    #[tokio::test]
    async fn reports_stale_endpoints() {
        let transport = InMemoryWebPushTransport::new();
        transport.mark_stale("https://push/gone");

        let result = transport
            .send(
                &[subscription("https://push/ok"), subscription("https://push/gone")],
                &payload(),
            )
            .await;
        assert_eq!(result.status, DeliveryStatus::Sent);
        assert_eq!(result.stale_endpoints, vec!["https://push/gone".to_string()]);
        assert_eq!(transport.deliveries().len(), 1);

        let result = transport
            .send(&[subscription("https://push/gone")], &payload())
            .await;
        assert_eq!(result.status, DeliveryStatus::Failed);
    }

    fn vapid_transport(private_key: &str) -> VapidWebPushTransport {
        VapidWebPushTransport::new(Some(VapidConfig {
            private_key: private_key.into(),
            subject: "mailto:ops@nudge.example.com".into(),
        }))
    }

    fn browser_subscription(endpoint: &str) -> PushSubscription {
        PushSubscription {
            endpoint: endpoint.into(),
            user_id: ID::default(),
            p256dh: CLIENT_P256DH.into(),
            auth: CLIENT_AUTH.into(),
        }
    }

    #[tokio::test]
    async fn unreachable_push_service_is_an_error() {
        // Nothing listens on port 1, so the signed and encrypted message
        // fails at the connection
        let result = vapid_transport(VAPID_PRIVATE_KEY)
            .send(&[browser_subscription("http://127.0.0.1:1/push")], &payload())
            .await;
        assert_eq!(result.status, DeliveryStatus::Error);
        assert!(result.stale_endpoints.is_empty());
    }

    #[tokio::test]
    async fn malformed_vapid_key_is_rejected() {
        let result = vapid_transport("not base64!")
            .send(&[browser_subscription("http://127.0.0.1:1/push")], &payload())
            .await;
        assert_eq!(result.status, DeliveryStatus::Failed);
        assert!(result.stale_endpoints.is_empty());
    }

    #[test]
    fn classifies_push_service_errors() {
        assert_eq!(classify(&WebPushError::EndpointNotValid), PushOutcome::Stale);
        assert_eq!(classify(&WebPushError::EndpointNotFound), PushOutcome::Stale);
        assert_eq!(classify(&WebPushError::Unspecified), PushOutcome::Errored);
        assert_eq!(
            classify(&WebPushError::ServerError(Some(Duration::from_secs(30)))),
            PushOutcome::Errored
        );
        assert_eq!(classify(&WebPushError::IoError), PushOutcome::Errored);
        assert_eq!(classify(&WebPushError::Unauthorized), PushOutcome::Rejected);
        assert_eq!(
            classify(&WebPushError::BadRequest(Some("bad ttl".into()))),
            PushOutcome::Rejected
        );
        assert_eq!(classify(&WebPushError::PayloadTooLarge), PushOutcome::Rejected);
        assert_eq!(classify(&WebPushError::InvalidCryptoKeys), PushOutcome::Rejected);
    }
}
