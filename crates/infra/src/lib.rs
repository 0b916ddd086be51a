mod config;
mod repos;
mod services;
mod system;

pub use config::{Config, EmailConfig, FcmConfig, VapidConfig};
pub use repos::{
    ICalendarConnectionRepo, IDeliveryLogRepo, IFcmTokenRepo, IFreeBusyCacheRepo,
    IOccurrenceRepo, IPushSubscriptionRepo, IReminderRepo, IUserRepo, Repos,
};
pub use services::calendar_busy::{FreeBusyCacheService, ICalendarBusyLookup};
pub use services::email::{EmailMessage, HttpEmailTransport, IEmailTransport, InMemoryEmailTransport};
pub use services::fcm::{FcmSendResult, HttpFcmTransport, IFcmTransport, InMemoryFcmTransport};
pub use services::google_calendar::{
    GoogleFreeBusyProvider, IFreeBusyProvider, InMemoryFreeBusyProvider,
};
pub use services::web_push::{
    IWebPushTransport, InMemoryWebPushTransport, VapidWebPushTransport, WebPushResult,
};
pub use services::{Services, TransportConfigError};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
pub use system::{ISys, RealSys, StaticTimeSys};
use tracing::warn;

const PSQL_CONNECTION_STRING: &str = "DATABASE_URL";

#[derive(Clone)]
pub struct NudgeContext {
    pub repos: Repos,
    pub config: Config,
    pub sys: Arc<dyn ISys>,
    pub services: Services,
}

impl NudgeContext {
    /// Context with the production transports configured by `config`
    pub fn create(repos: Repos, config: Config) -> Self {
        let sys: Arc<dyn ISys> = Arc::new(RealSys {});
        let provider = Arc::new(GoogleFreeBusyProvider::new(
            repos.calendar_connections.clone(),
        ));
        let services = Services {
            email: Arc::new(HttpEmailTransport::new(config.email.clone())),
            web_push: Arc::new(VapidWebPushTransport::new(config.vapid.clone())),
            fcm: Arc::new(HttpFcmTransport::new(config.fcm.clone(), sys.clone())),
            calendar_busy: Arc::new(FreeBusyCacheService::new(
                repos.freebusy_cache.clone(),
                provider,
            )),
        };
        Self {
            repos,
            config,
            sys,
            services,
        }
    }

    /// In-memory repositories with recording transports that never leave
    /// the process
    pub fn create_inmemory() -> Self {
        let repos = Repos::create_inmemory();
        let services = Services {
            email: Arc::new(InMemoryEmailTransport::new()),
            web_push: Arc::new(InMemoryWebPushTransport::new()),
            fcm: Arc::new(InMemoryFcmTransport::new()),
            calendar_busy: Arc::new(FreeBusyCacheService::new(
                repos.freebusy_cache.clone(),
                Arc::new(InMemoryFreeBusyProvider::new()),
            )),
        };
        Self {
            repos,
            config: Config::new(),
            sys: Arc::new(RealSys {}),
            services,
        }
    }
}

/// Will setup the infrastructure context given the environment
pub async fn setup_context() -> anyhow::Result<NudgeContext> {
    let config = Config::new();
    match get_psql_connection_string() {
        Some(connection_string) => {
            let repos = Repos::create_postgres(&connection_string).await?;
            Ok(NudgeContext::create(repos, config))
        }
        None => {
            warn!(
                "{} is not set, falling back to inmemory repositories. Nothing will be persisted.",
                PSQL_CONNECTION_STRING
            );
            Ok(NudgeContext::create(Repos::create_inmemory(), config))
        }
    }
}

fn get_psql_connection_string() -> Option<String> {
    std::env::var(PSQL_CONNECTION_STRING)
        .ok()
        .filter(|connection_string| !connection_string.trim().is_empty())
}

/// Applies the embedded migrations, a no-op without a database
pub async fn run_migration() -> anyhow::Result<()> {
    let connection_string = match get_psql_connection_string() {
        Some(connection_string) => connection_string,
        None => return Ok(()),
    };
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&connection_string)
        .await?;

    sqlx::migrate!().run(&pool).await?;
    Ok(())
}
