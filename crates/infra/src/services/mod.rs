pub mod calendar_busy;
pub mod email;
pub mod fcm;
pub mod google_calendar;
pub mod web_push;

use nudge_domain::DeliveryStatus;
use std::sync::Arc;
use thiserror::Error;

/// A transport that is asked to deliver without the credentials it needs
#[derive(Debug, Error, Clone, PartialEq)]
pub enum TransportConfigError {
    #[error("Email delivery is not configured, EMAIL_API_KEY and EMAIL_FROM must be set")]
    Email,
    #[error("Web push is not configured, VAPID_PRIVATE_KEY and VAPID_SUBJECT must be set")]
    WebPush,
    #[error("FCM is not configured, FCM_PROJECT_ID, FCM_CLIENT_EMAIL and FCM_PRIVATE_KEY must be set")]
    Fcm,
}

/// Delivery collaborators of the dispatcher
#[derive(Clone)]
pub struct Services {
    pub email: Arc<dyn email::IEmailTransport>,
    pub web_push: Arc<dyn web_push::IWebPushTransport>,
    pub fcm: Arc<dyn fcm::IFcmTransport>,
    pub calendar_busy: Arc<dyn calendar_busy::ICalendarBusyLookup>,
}

impl Services {
    /// Fails with the first transport that lacks configuration
    pub fn ensure_configured(&self) -> Result<(), TransportConfigError> {
        self.email.ensure_configured()?;
        self.web_push.ensure_configured()?;
        self.fcm.ensure_configured()?;
        Ok(())
    }
}

/// Aggregated outcome of a fan out to several recipients of one channel
fn aggregate_status(sent: usize, rejected: usize, errored: usize) -> DeliveryStatus {
    if sent > 0 {
        DeliveryStatus::Sent
    } else if rejected == 0 && errored > 0 {
        DeliveryStatus::Error
    } else if rejected > 0 {
        DeliveryStatus::Failed
    } else {
        DeliveryStatus::Skipped
    }
}
