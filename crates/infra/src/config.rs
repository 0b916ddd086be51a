use chrono_tz::Tz;
use nudge_utils::create_random_secret;
use tracing::{info, warn};

const DEFAULT_PORT: usize = 5000;
const DEFAULT_APP_BASE_URL: &str = "http://localhost:3000";
const DEFAULT_EMAIL_API_URL: &str = "https://api.resend.com/emails";

/// Credentials for the HTTP email API
#[derive(Debug, Clone, PartialEq)]
pub struct EmailConfig {
    pub api_key: String,
    pub from: String,
    pub api_url: String,
}

/// VAPID identity used to sign web push requests
#[derive(Debug, Clone, PartialEq)]
pub struct VapidConfig {
    /// Base64 url encoded private key
    pub private_key: String,
    /// Contact of the sender, usually a `mailto:` url
    pub subject: String,
}

/// Service account used for the FCM HTTP v1 API
#[derive(Debug, Clone, PartialEq)]
pub struct FcmConfig {
    pub project_id: String,
    pub client_email: String,
    /// PEM encoded RSA key
    pub private_key: String,
}

#[derive(Debug, Clone)]
pub struct Config {
    /// Port for the application to run on
    pub port: usize,
    /// Secret the external scheduler has to present to trigger a dispatch pass
    pub cron_secret: String,
    /// Base url of the web app, notifications deep link into it
    pub app_base_url: String,
    /// Zone used to evaluate time windows of reminders that do not specify one
    pub default_timezone: Tz,
    /// Whether this process triggers dispatch passes itself every minute
    pub run_internal_scheduler: bool,
    pub email: Option<EmailConfig>,
    pub vapid: Option<VapidConfig>,
    pub fcm: Option<FcmConfig>,
}

impl Config {
    pub fn new() -> Self {
        let cron_secret = match std::env::var("CRON_SECRET") {
            Ok(secret) => secret,
            Err(_) => {
                info!("Did not find CRON_SECRET environment variable. Going to create one.");
                let secret = create_random_secret(32);
                info!("Secret for triggering dispatch was generated and set to: {}", secret);
                secret
            }
        };

        let port = match std::env::var("PORT") {
            Ok(port) => match port.parse::<usize>() {
                Ok(port) => port,
                Err(_) => {
                    warn!(
                        "The given PORT: {} is not valid, falling back to the default port: {}.",
                        port, DEFAULT_PORT
                    );
                    DEFAULT_PORT
                }
            },
            Err(_) => DEFAULT_PORT,
        };

        let app_base_url = std::env::var("APP_BASE_URL").unwrap_or_else(|_| {
            info!(
                "Did not find APP_BASE_URL environment variable, using: {}",
                DEFAULT_APP_BASE_URL
            );
            DEFAULT_APP_BASE_URL.to_string()
        });

        let default_timezone = match std::env::var("DEFAULT_TIMEZONE") {
            Ok(tz) => match tz.parse::<Tz>() {
                Ok(tz) => tz,
                Err(_) => {
                    warn!(
                        "The given DEFAULT_TIMEZONE: {} is not a known timezone, falling back to UTC.",
                        tz
                    );
                    Tz::UTC
                }
            },
            Err(_) => Tz::UTC,
        };

        let run_internal_scheduler = std::env::var("RUN_INTERNAL_SCHEDULER")
            .map(|flag| matches!(flag.to_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);

        Self {
            port,
            cron_secret,
            app_base_url,
            default_timezone,
            run_internal_scheduler,
            email: email_config_from_env(),
            vapid: vapid_config_from_env(),
            fcm: fcm_config_from_env(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn email_config_from_env() -> Option<EmailConfig> {
    match (non_empty_var("EMAIL_API_KEY"), non_empty_var("EMAIL_FROM")) {
        (Some(api_key), Some(from)) => Some(EmailConfig {
            api_key,
            from,
            api_url: non_empty_var("EMAIL_API_URL")
                .unwrap_or_else(|| DEFAULT_EMAIL_API_URL.to_string()),
        }),
        _ => {
            warn!("EMAIL_API_KEY or EMAIL_FROM is not set, email delivery is not configured");
            None
        }
    }
}

fn vapid_config_from_env() -> Option<VapidConfig> {
    match (non_empty_var("VAPID_PRIVATE_KEY"), non_empty_var("VAPID_SUBJECT")) {
        (Some(private_key), Some(subject)) => Some(VapidConfig {
            private_key,
            subject,
        }),
        _ => {
            warn!("VAPID_PRIVATE_KEY or VAPID_SUBJECT is not set, web push is not configured");
            None
        }
    }
}

fn fcm_config_from_env() -> Option<FcmConfig> {
    match (
        non_empty_var("FCM_PROJECT_ID"),
        non_empty_var("FCM_CLIENT_EMAIL"),
        non_empty_var("FCM_PRIVATE_KEY"),
    ) {
        (Some(project_id), Some(client_email), Some(private_key)) => Some(FcmConfig {
            project_id,
            client_email,
            // Keys pasted into env files usually carry escaped newlines
            private_key: private_key.replace("\\n", "\n"),
        }),
        _ => {
            warn!("FCM_PROJECT_ID, FCM_CLIENT_EMAIL or FCM_PRIVATE_KEY is not set, FCM is not configured");
            None
        }
    }
}
