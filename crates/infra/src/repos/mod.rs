mod calendar_connection;
mod delivery_log;
mod fcm_token;
mod freebusy_cache;
mod occurrence;
mod push_subscription;
mod reminder;
mod shared;
mod user;

pub use calendar_connection::ICalendarConnectionRepo;
use calendar_connection::{InMemoryCalendarConnectionRepo, PostgresCalendarConnectionRepo};
pub use delivery_log::IDeliveryLogRepo;
use delivery_log::{InMemoryDeliveryLogRepo, PostgresDeliveryLogRepo};
pub use fcm_token::IFcmTokenRepo;
use fcm_token::{InMemoryFcmTokenRepo, PostgresFcmTokenRepo};
pub use freebusy_cache::IFreeBusyCacheRepo;
use freebusy_cache::{InMemoryFreeBusyCacheRepo, PostgresFreeBusyCacheRepo};
pub use occurrence::IOccurrenceRepo;
use occurrence::{InMemoryOccurrenceRepo, PostgresOccurrenceRepo};
pub use push_subscription::IPushSubscriptionRepo;
use push_subscription::{InMemoryPushSubscriptionRepo, PostgresPushSubscriptionRepo};
pub use reminder::IReminderRepo;
use reminder::{InMemoryReminderRepo, PostgresReminderRepo};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tracing::info;
pub use user::IUserRepo;
use user::{InMemoryUserRepo, PostgresUserRepo};

#[derive(Clone)]
pub struct Repos {
    pub occurrences: Arc<dyn IOccurrenceRepo>,
    pub reminders: Arc<dyn IReminderRepo>,
    pub users: Arc<dyn IUserRepo>,
    pub push_subscriptions: Arc<dyn IPushSubscriptionRepo>,
    pub fcm_tokens: Arc<dyn IFcmTokenRepo>,
    pub delivery_logs: Arc<dyn IDeliveryLogRepo>,
    pub freebusy_cache: Arc<dyn IFreeBusyCacheRepo>,
    pub calendar_connections: Arc<dyn ICalendarConnectionRepo>,
}

impl Repos {
    pub async fn create_postgres(connection_string: &str) -> anyhow::Result<Self> {
        info!("DB CHECKING CONNECTION ...");
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect(connection_string)
            .await?;
        info!("DB CHECKING CONNECTION ... [done]");

        Ok(Self {
            occurrences: Arc::new(PostgresOccurrenceRepo::new(pool.clone())),
            reminders: Arc::new(PostgresReminderRepo::new(pool.clone())),
            users: Arc::new(PostgresUserRepo::new(pool.clone())),
            push_subscriptions: Arc::new(PostgresPushSubscriptionRepo::new(pool.clone())),
            fcm_tokens: Arc::new(PostgresFcmTokenRepo::new(pool.clone())),
            delivery_logs: Arc::new(PostgresDeliveryLogRepo::new(pool.clone())),
            freebusy_cache: Arc::new(PostgresFreeBusyCacheRepo::new(pool.clone())),
            calendar_connections: Arc::new(PostgresCalendarConnectionRepo::new(pool)),
        })
    }

    pub fn create_inmemory() -> Self {
        Self {
            occurrences: Arc::new(InMemoryOccurrenceRepo::new()),
            reminders: Arc::new(InMemoryReminderRepo::new()),
            users: Arc::new(InMemoryUserRepo::new()),
            push_subscriptions: Arc::new(InMemoryPushSubscriptionRepo::new()),
            fcm_tokens: Arc::new(InMemoryFcmTokenRepo::new()),
            delivery_logs: Arc::new(InMemoryDeliveryLogRepo::new()),
            freebusy_cache: Arc::new(InMemoryFreeBusyCacheRepo::new()),
            calendar_connections: Arc::new(InMemoryCalendarConnectionRepo::new()),
        }
    }
}
