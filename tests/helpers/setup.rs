use chrono_tz::Tz;
use nudge_api::Application;
use nudge_infra::{
    Config, InMemoryEmailTransport, InMemoryFcmTransport, InMemoryWebPushTransport, NudgeContext,
};
use std::sync::Arc;

pub const CRON_SECRET: &str = "test-cron-secret";

pub struct TestApp {
    pub config: Config,
    /// Shares repositories with the running server
    pub ctx: NudgeContext,
    pub address: String,
    pub email: Arc<InMemoryEmailTransport>,
    pub web_push: Arc<InMemoryWebPushTransport>,
    pub fcm: Arc<InMemoryFcmTransport>,
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("{}/api/v1{}", self.address, path)
    }
}

// Launch the application as a background task
pub async fn spawn_app() -> TestApp {
    spawn_app_with(|_| {}).await
}

/// Like `spawn_app`, `customize` may adjust the context before the server starts
pub async fn spawn_app_with<F>(customize: F) -> TestApp
where
    F: FnOnce(&mut NudgeContext),
{
    let mut ctx = NudgeContext::create_inmemory();
    ctx.config.port = 0; // Random port
    ctx.config.cron_secret = CRON_SECRET.into();
    ctx.config.default_timezone = Tz::UTC;
    ctx.config.run_internal_scheduler = false;

    let email = Arc::new(InMemoryEmailTransport::new());
    let web_push = Arc::new(InMemoryWebPushTransport::new());
    let fcm = Arc::new(InMemoryFcmTransport::new());
    ctx.services.email = email.clone();
    ctx.services.web_push = web_push.clone();
    ctx.services.fcm = fcm.clone();
    customize(&mut ctx);

    let config = ctx.config.clone();
    let application = Application::new(ctx.clone())
        .await
        .expect("Failed to build application.");

    let address = format!("http://localhost:{}", application.port());
    let _ = actix_web::rt::spawn(async move {
        application
            .start()
            .await
            .expect("Expected application to start");
    });

    TestApp {
        config,
        ctx,
        address,
        email,
        web_push,
        fcm,
    }
}
