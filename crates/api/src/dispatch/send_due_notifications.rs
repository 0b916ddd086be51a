use crate::error::NudgeError;
use crate::shared::{
    auth::protect_cron_route,
    usecase::{execute, UseCase},
};
use actix_web::{web, HttpRequest, HttpResponse};
use nudge_api_structs::send_due_notifications::APIResponse;
use nudge_domain::{
    build_cron_window, date::format_timestamp, evaluate_reminder_context, parse_context_settings,
    ContextDecision, DeliveryChannel, DeliveryReservation, DeliveryStatus, EvaluationInput,
    NotificationContent, NotificationJob, Occurrence, OccurrenceStatus, Reminder, RetryState,
    DEFAULT_GRACE_MINUTES, DEFAULT_LOOKAHEAD_MINUTES, ID, OCCURRENCE_ENTITY,
};
use nudge_infra::{EmailMessage, NudgeContext, TransportConfigError};
use std::collections::HashSet;
use tracing::{debug, info, info_span, warn, Instrument};

pub async fn send_due_notifications_controller(
    http_req: HttpRequest,
    ctx: web::Data<NudgeContext>,
) -> Result<HttpResponse, NudgeError> {
    protect_cron_route(&http_req, &ctx)?;

    execute(SendDueNotificationsUseCase, &ctx)
        .await
        .map(|res| {
            HttpResponse::Ok().json(APIResponse {
                processed: res.processed,
            })
        })
        .map_err(|e| match e {
            UseCaseError::MissingTransportConfig(e) => NudgeError::Misconfigured(e.to_string()),
            UseCaseError::StorageError(_) => NudgeError::InternalError,
        })
}

/// One dispatch pass over every due occurrence
#[derive(Debug)]
pub struct SendDueNotificationsUseCase;

#[derive(Debug, PartialEq)]
pub struct SendDueNotificationsResponse {
    pub processed: usize,
}

#[derive(Debug)]
pub enum UseCaseError {
    MissingTransportConfig(TransportConfigError),
    StorageError(anyhow::Error),
}

impl From<anyhow::Error> for UseCaseError {
    fn from(e: anyhow::Error) -> Self {
        Self::StorageError(e)
    }
}

#[async_trait::async_trait(?Send)]
impl UseCase for SendDueNotificationsUseCase {
    type Response = SendDueNotificationsResponse;

    type Errors = UseCaseError;

    const NAME: &'static str = "SendDueNotifications";

    async fn execute(&mut self, ctx: &NudgeContext) -> Result<Self::Response, Self::Errors> {
        ctx.services
            .ensure_configured()
            .map_err(UseCaseError::MissingTransportConfig)?;

        let now = ctx.sys.get_timestamp_millis();
        let window = build_cron_window(now, DEFAULT_GRACE_MINUTES, DEFAULT_LOOKAHEAD_MINUTES);
        let span = info_span!(
            "dispatch_pass",
            window_start = %format_timestamp(window.window_start),
            window_end = %format_timestamp(window.window_end),
        );

        self.run(ctx, now).instrument(span).await
    }
}

impl SendDueNotificationsUseCase {
    async fn run(
        &self,
        ctx: &NudgeContext,
        now: i64,
    ) -> Result<SendDueNotificationsResponse, UseCaseError> {
        let occurrences = ctx.repos.occurrences.find_due(now).await?;
        info!("Found {} due occurrences", occurrences.len());

        let mut emitted = HashSet::new();
        for occurrence in &occurrences {
            self.process_occurrence(occurrence, now, &mut emitted, ctx)
                .await?;
        }

        Ok(SendDueNotificationsResponse {
            processed: occurrences.len(),
        })
    }

    async fn process_occurrence(
        &self,
        occurrence: &Occurrence,
        now: i64,
        emitted: &mut HashSet<String>,
        ctx: &NudgeContext,
    ) -> Result<(), UseCaseError> {
        let reminder = match ctx.repos.reminders.find(&occurrence.reminder_id).await? {
            Some(reminder) if reminder.is_active => reminder,
            _ => {
                debug!(
                    "Skipping occurrence {} without an active reminder",
                    occurrence.id
                );
                return Ok(());
            }
        };
        let owner_id = match &reminder.owner_id {
            Some(owner_id) => owner_id.clone(),
            None => {
                debug!("Skipping occurrence {} of an ownerless reminder", occurrence.id);
                return Ok(());
            }
        };

        let effective_at = occurrence.effective_due_at();
        let raw_settings = ctx
            .repos
            .reminders
            .find_context_settings(&reminder.id)
            .await?;
        let settings = parse_context_settings(raw_settings.as_ref());

        let is_calendar_busy = if settings.calendar_busy.enabled {
            match ctx
                .services
                .calendar_busy
                .is_busy_at(&owner_id, effective_at, now)
                .await
            {
                Ok(busy) => busy,
                Err(e) => {
                    warn!(
                        "Unable to look up calendar of user {}, treating it as free: {:?}",
                        owner_id, e
                    );
                    false
                }
            }
        } else {
            false
        };

        let timezone = settings.timezone.unwrap_or(ctx.config.default_timezone);
        let local_now = match nudge_domain::date::to_local(now, &timezone) {
            Some(local_now) => local_now,
            None => {
                warn!("Unable to express {} in timezone {}", now, timezone);
                return Ok(());
            }
        };

        let decision = evaluate_reminder_context(&EvaluationInput {
            now: local_now,
            reminder_due_at: effective_at,
            settings: &settings,
            is_calendar_busy,
        });

        match decision {
            ContextDecision::SkipForNow { reason } => {
                debug!(
                    "Holding back occurrence {} due at {}: {}",
                    occurrence.id,
                    format_timestamp(effective_at),
                    reason.as_str()
                );
                Ok(())
            }
            ContextDecision::AutoSnooze {
                new_scheduled_at,
                reason,
            } => {
                ctx.repos
                    .occurrences
                    .update_snooze(&occurrence.id, new_scheduled_at, OccurrenceStatus::Snoozed)
                    .await?;
                info!(
                    "Snoozed occurrence {} due at {} until {}: {}",
                    occurrence.id,
                    format_timestamp(effective_at),
                    format_timestamp(new_scheduled_at),
                    reason.as_str()
                );
                Ok(())
            }
            ContextDecision::SendNow => {
                let content = NotificationContent::for_occurrence(
                    &reminder,
                    occurrence,
                    settings.category.as_deref(),
                    &ctx.config.app_base_url,
                );
                let target = Target {
                    occurrence,
                    reminder: &reminder,
                    owner_id: &owner_id,
                    effective_at,
                    content: &content,
                };
                self.send_email(&target, emitted, ctx).await?;
                self.send_web_push(&target, emitted, ctx).await?;
                self.send_fcm(&target, emitted, ctx).await
            }
        }
    }

    async fn send_email(
        &self,
        target: &Target<'_>,
        emitted: &mut HashSet<String>,
        ctx: &NudgeContext,
    ) -> Result<(), UseCaseError> {
        let to = match ctx.repos.users.find_email(target.owner_id).await? {
            Some(to) => to,
            None => return Ok(()),
        };
        let (_, reservation) = match self
            .reserve(target, DeliveryChannel::Email, emitted, ctx)
            .await?
        {
            Some(reserved) => reserved,
            None => return Ok(()),
        };

        let message = EmailMessage {
            to,
            subject: target.content.email_subject(),
            html: target.content.render_email_html(),
        };
        let status = ctx.services.email.send(&message).await;
        self.finalize(&reservation, status, ctx).await
    }

    async fn send_web_push(
        &self,
        target: &Target<'_>,
        emitted: &mut HashSet<String>,
        ctx: &NudgeContext,
    ) -> Result<(), UseCaseError> {
        let subscriptions = ctx
            .repos
            .push_subscriptions
            .find_by_user(target.owner_id)
            .await?;
        if subscriptions.is_empty() {
            return Ok(());
        }
        let (job_key, reservation) = match self
            .reserve(target, DeliveryChannel::Push, emitted, ctx)
            .await?
        {
            Some(reserved) => reserved,
            None => return Ok(()),
        };

        let res = ctx
            .services
            .web_push
            .send(&subscriptions, &target.content.payload(&job_key))
            .await;
        self.finalize(&reservation, res.status, ctx).await?;

        if !res.stale_endpoints.is_empty() {
            match ctx
                .repos
                .push_subscriptions
                .delete_by_endpoints(&res.stale_endpoints)
                .await
            {
                Ok(deleted) => info!("Removed {} stale push subscriptions", deleted),
                Err(e) => warn!("Unable to remove stale push subscriptions: {:?}", e),
            }
        }
        Ok(())
    }

    async fn send_fcm(
        &self,
        target: &Target<'_>,
        emitted: &mut HashSet<String>,
        ctx: &NudgeContext,
    ) -> Result<(), UseCaseError> {
        let tokens = ctx
            .repos
            .fcm_tokens
            .find_by_user(target.owner_id)
            .await?
            .into_iter()
            .map(|token| token.token)
            .collect::<Vec<_>>();
        if tokens.is_empty() {
            return Ok(());
        }
        let (job_key, reservation) = match self
            .reserve(target, DeliveryChannel::Fcm, emitted, ctx)
            .await?
        {
            Some(reserved) => reserved,
            None => return Ok(()),
        };

        let res = ctx
            .services
            .fcm
            .send(&tokens, &target.content.payload(&job_key))
            .await;
        debug!(
            "FCM accepted {} and refused {} messages for reminder {}",
            res.sent, res.failed, target.reminder.id
        );
        self.finalize(&reservation, res.status, ctx).await?;

        if !res.invalid_tokens.is_empty() {
            match ctx
                .repos
                .fcm_tokens
                .delete_by_tokens(&res.invalid_tokens)
                .await
            {
                Ok(deleted) => info!("Removed {} invalid FCM tokens", deleted),
                Err(e) => warn!("Unable to remove invalid FCM tokens: {:?}", e),
            }
        }
        Ok(())
    }

    /// Claims the job key of `channel`, `None` when it was already emitted
    /// during this pass or is pending or sent according to the delivery log
    async fn reserve(
        &self,
        target: &Target<'_>,
        channel: DeliveryChannel,
        emitted: &mut HashSet<String>,
        ctx: &NudgeContext,
    ) -> Result<Option<(String, DeliveryReservation)>, UseCaseError> {
        let job_key = NotificationJob {
            entity_type: OCCURRENCE_ENTITY,
            entity_id: &target.occurrence.id,
            occurrence_at: target.effective_at,
            channel,
        }
        .key();
        if !emitted.insert(job_key.clone()) {
            return Ok(None);
        }

        let now = ctx.sys.get_timestamp_millis();
        let reservation = ctx
            .repos
            .delivery_logs
            .reserve(&target.occurrence.id, channel, &job_key, now)
            .await?;
        if reservation.is_none() {
            debug!("Job {} is already delivered or in flight", job_key);
        }
        Ok(reservation.map(|reservation| (job_key, reservation)))
    }

    async fn finalize(
        &self,
        reservation: &DeliveryReservation,
        status: DeliveryStatus,
        ctx: &NudgeContext,
    ) -> Result<(), UseCaseError> {
        let now = ctx.sys.get_timestamp_millis();
        let retry = if status.is_failure() {
            let retry = RetryState::after_failure(reservation.retry_count, now);
            warn!(
                "Delivery {} ended {}, attempt {} failed",
                reservation.log_id,
                status.as_str(),
                retry.retry_count
            );
            Some(retry)
        } else {
            None
        };
        ctx.repos
            .delivery_logs
            .finalize(&reservation.log_id, status, retry, now)
            .await?;
        Ok(())
    }
}

/// Occurrence that passed evaluation, with everything channels need
struct Target<'a> {
    occurrence: &'a Occurrence,
    reminder: &'a Reminder,
    owner_id: &'a ID,
    effective_at: i64,
    content: &'a NotificationContent,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::prelude::*;
    use chrono_tz::Tz;
    use nudge_domain::{
        date::MINUTE_MILLIS, FcmToken, PushSubscription, RawBusyInterval, User,
        RESERVATION_LEASE_MINUTES,
    };
    use nudge_infra::{
        FreeBusyCacheService, InMemoryEmailTransport, InMemoryFcmTransport,
        InMemoryFreeBusyProvider, InMemoryWebPushTransport, StaticTimeSys,
    };
    use serde_json::json;
    use std::sync::Arc;

    const ENDPOINT: &str = "https://push.example.com/sub/1";
    const TOKEN: &str = "fcm-token-1";

    struct TestContext {
        ctx: NudgeContext,
        sys: Arc<StaticTimeSys>,
        email: Arc<InMemoryEmailTransport>,
        web_push: Arc<InMemoryWebPushTransport>,
        fcm: Arc<InMemoryFcmTransport>,
        provider: Arc<InMemoryFreeBusyProvider>,
    }

    /// Monday 2 March 2026 at noon UTC
    fn noon() -> i64 {
        Utc.with_ymd_and_hms(2026, 3, 2, 12, 0, 0)
            .unwrap()
            .timestamp_millis()
    }

    fn setup() -> TestContext {
        let mut ctx = NudgeContext::create_inmemory();
        ctx.config.default_timezone = Tz::UTC;
        ctx.config.app_base_url = "https://nudge.example.com".into();

        let sys = Arc::new(StaticTimeSys::new(noon()));
        let email = Arc::new(InMemoryEmailTransport::new());
        let web_push = Arc::new(InMemoryWebPushTransport::new());
        let fcm = Arc::new(InMemoryFcmTransport::new());
        let provider = Arc::new(InMemoryFreeBusyProvider::new());
        ctx.sys = sys.clone();
        ctx.services.email = email.clone();
        ctx.services.web_push = web_push.clone();
        ctx.services.fcm = fcm.clone();
        ctx.services.calendar_busy = Arc::new(FreeBusyCacheService::new(
            ctx.repos.freebusy_cache.clone(),
            provider.clone(),
        ));

        TestContext {
            ctx,
            sys,
            email,
            web_push,
            fcm,
            provider,
        }
    }

    /// A reminder whose owner can be reached on every channel, with one
    /// occurrence that became due five minutes ago
    async fn insert_due_reminder(
        ctx: &NudgeContext,
        settings: Option<serde_json::Value>,
    ) -> (User, Occurrence) {
        let user = User::new(Some("kari@example.com".into()));
        ctx.repos.users.insert(&user).await.unwrap();
        ctx.repos
            .push_subscriptions
            .upsert(&PushSubscription {
                endpoint: ENDPOINT.into(),
                user_id: user.id.clone(),
                p256dh: "p256dh".into(),
                auth: "auth".into(),
            })
            .await
            .unwrap();
        ctx.repos
            .fcm_tokens
            .upsert(&FcmToken {
                token: TOKEN.into(),
                user_id: user.id.clone(),
                platform: Some("android".into()),
            })
            .await
            .unwrap();

        let reminder = Reminder::new(user.id.clone(), "Vitamin D");
        ctx.repos.reminders.insert(&reminder).await.unwrap();
        if let Some(settings) = settings {
            ctx.repos
                .reminders
                .set_context_settings(&reminder.id, &settings)
                .await
                .unwrap();
        }

        let occurrence = Occurrence::new(reminder.id.clone(), noon() - 5 * MINUTE_MILLIS);
        ctx.repos.occurrences.insert(&occurrence).await.unwrap();
        (user, occurrence)
    }

    async fn run(ctx: &NudgeContext) -> SendDueNotificationsResponse {
        SendDueNotificationsUseCase.execute(ctx).await.unwrap()
    }

    async fn log_statuses(
        ctx: &NudgeContext,
        occurrence: &Occurrence,
    ) -> Vec<(DeliveryChannel, DeliveryStatus)> {
        let mut statuses = ctx
            .repos
            .delivery_logs
            .find_by_occurrence(&occurrence.id)
            .await
            .unwrap()
            .into_iter()
            .map(|log| (log.channel, log.status))
            .collect::<Vec<_>>();
        statuses.sort_by_key(|(channel, _)| channel.as_str());
        statuses
    }

    #[actix_web::test]
    async fn sends_every_channel_once() {
        let t = setup();
        let (_, occurrence) = insert_due_reminder(&t.ctx, None).await;

        assert_eq!(run(&t.ctx).await.processed, 1);
        assert_eq!(t.email.messages().len(), 1);
        assert_eq!(t.email.messages()[0].to, "kari@example.com");
        assert_eq!(t.email.messages()[0].subject, "Reminder: Vitamin D");
        assert_eq!(t.web_push.deliveries().len(), 1);
        assert_eq!(t.fcm.deliveries().len(), 1);
        assert_eq!(
            log_statuses(&t.ctx, &occurrence).await,
            vec![
                (DeliveryChannel::Email, DeliveryStatus::Sent),
                (DeliveryChannel::Fcm, DeliveryStatus::Sent),
                (DeliveryChannel::Push, DeliveryStatus::Sent),
            ]
        );

        let (_, payload) = &t.web_push.deliveries()[0];
        assert!(payload.url.starts_with("https://nudge.example.com/reminders/"));
        assert!(payload.tag.ends_with("|push"));

        // The occurrence is still open and due, but nothing is sent again
        t.sys.set_timestamp_millis(noon() + MINUTE_MILLIS);
        assert_eq!(run(&t.ctx).await.processed, 1);
        assert_eq!(t.email.messages().len(), 1);
        assert_eq!(t.web_push.deliveries().len(), 1);
        assert_eq!(t.fcm.deliveries().len(), 1);
    }

    #[actix_web::test]
    async fn prunes_stale_recipients() {
        let t = setup();
        let (user, occurrence) = insert_due_reminder(&t.ctx, None).await;
        t.web_push.mark_stale(ENDPOINT);
        t.fcm.mark_invalid(TOKEN);

        run(&t.ctx).await;

        assert!(t
            .ctx
            .repos
            .push_subscriptions
            .find_by_user(&user.id)
            .await
            .unwrap()
            .is_empty());
        assert!(t
            .ctx
            .repos
            .fcm_tokens
            .find_by_user(&user.id)
            .await
            .unwrap()
            .is_empty());
        assert_eq!(
            log_statuses(&t.ctx, &occurrence).await,
            vec![
                (DeliveryChannel::Email, DeliveryStatus::Sent),
                (DeliveryChannel::Fcm, DeliveryStatus::Failed),
                (DeliveryChannel::Push, DeliveryStatus::Failed),
            ]
        );
    }

    #[actix_web::test]
    async fn snoozes_while_calendar_is_busy() {
        let t = setup();
        let (user, occurrence) = insert_due_reminder(
            &t.ctx,
            Some(json!({ "calendarBusy": { "enabled": true, "snoozeMinutes": 30 } })),
        )
        .await;
        t.provider.add_busy(
            &user.id,
            RawBusyInterval::new("2026-03-02T11:00:00Z", "2026-03-02T13:00:00Z"),
        );

        assert_eq!(run(&t.ctx).await.processed, 1);

        let snoozed = t
            .ctx
            .repos
            .occurrences
            .find(&occurrence.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(snoozed.status, OccurrenceStatus::Snoozed);
        assert_eq!(snoozed.snoozed_until, Some(noon() + 30 * MINUTE_MILLIS));
        assert!(t.email.messages().is_empty());
        assert!(t.web_push.deliveries().is_empty());
        assert!(log_statuses(&t.ctx, &occurrence).await.is_empty());

        // Due again after the snooze, with fresh job keys. The cached
        // calendar is stale by now and the refresh fails, so the user is free.
        t.sys.set_timestamp_millis(noon() + 31 * MINUTE_MILLIS);
        t.provider.set_failing(true);
        run(&t.ctx).await;
        assert_eq!(t.email.messages().len(), 1);
        assert_eq!(log_statuses(&t.ctx, &occurrence).await.len(), 3);
    }

    #[actix_web::test]
    async fn calendar_errors_count_as_free() {
        let t = setup();
        insert_due_reminder(&t.ctx, Some(json!({ "calendarBusy": { "enabled": true } }))).await;
        t.provider.set_failing(true);

        run(&t.ctx).await;
        assert_eq!(t.email.messages().len(), 1);
    }

    #[actix_web::test]
    async fn holds_back_outside_time_window() {
        let t = setup();
        let (_, occurrence) = insert_due_reminder(
            &t.ctx,
            Some(json!({ "timeWindow": { "enabled": true, "startHour": 18, "endHour": 22 } })),
        )
        .await;

        assert_eq!(run(&t.ctx).await.processed, 1);

        let stored = t
            .ctx
            .repos
            .occurrences
            .find(&occurrence.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored, occurrence);
        assert!(t.email.messages().is_empty());
        assert!(log_statuses(&t.ctx, &occurrence).await.is_empty());
    }

    #[actix_web::test]
    async fn evaluates_time_window_in_reminder_timezone() {
        let t = setup();
        // Noon UTC is 21:00 in Tokyo, outside of a 08 - 20 window
        insert_due_reminder(
            &t.ctx,
            Some(json!({
                "timezone": "Asia/Tokyo",
                "timeWindow": { "enabled": true, "startHour": 8, "endHour": 20 }
            })),
        )
        .await;

        run(&t.ctx).await;
        assert!(t.email.messages().is_empty());
    }

    #[actix_web::test]
    async fn counts_but_skips_unusable_reminders() {
        let t = setup();
        let user = User::new(Some("kari@example.com".into()));
        t.ctx.repos.users.insert(&user).await.unwrap();

        let mut inactive = Reminder::new(user.id.clone(), "Inactive");
        inactive.is_active = false;
        let mut ownerless = Reminder::new(user.id.clone(), "Ownerless");
        ownerless.owner_id = None;
        for reminder in &[&inactive, &ownerless] {
            t.ctx.repos.reminders.insert(reminder).await.unwrap();
        }
        let due = noon() - MINUTE_MILLIS;
        for reminder_id in vec![inactive.id.clone(), ownerless.id.clone(), ID::default()] {
            t.ctx
                .repos
                .occurrences
                .insert(&Occurrence::new(reminder_id, due))
                .await
                .unwrap();
        }

        assert_eq!(run(&t.ctx).await.processed, 3);
        assert!(t.email.messages().is_empty());
    }

    #[actix_web::test]
    async fn aborts_without_transport_configuration() {
        let mut t = setup();
        let (_, occurrence) = insert_due_reminder(&t.ctx, None).await;
        t.ctx.services.web_push = Arc::new(InMemoryWebPushTransport::unconfigured());

        let res = SendDueNotificationsUseCase.execute(&t.ctx).await;
        assert!(matches!(
            res,
            Err(UseCaseError::MissingTransportConfig(TransportConfigError::WebPush))
        ));
        assert!(t.email.messages().is_empty());
        assert!(log_statuses(&t.ctx, &occurrence).await.is_empty());
    }

    #[actix_web::test]
    async fn retries_failed_email_on_next_pass() {
        let t = setup();
        let (_, occurrence) = insert_due_reminder(&t.ctx, None).await;
        t.email.set_outcome(DeliveryStatus::Failed);

        run(&t.ctx).await;
        let email_log = |logs: Vec<nudge_domain::DeliveryLogEntry>| {
            logs.into_iter()
                .find(|log| log.channel == DeliveryChannel::Email)
                .unwrap()
        };
        let failed = email_log(
            t.ctx
                .repos
                .delivery_logs
                .find_by_occurrence(&occurrence.id)
                .await
                .unwrap(),
        );
        assert_eq!(failed.status, DeliveryStatus::Failed);
        assert_eq!(failed.retry_count, 1);
        assert_eq!(failed.next_retry_at, Some(noon() + MINUTE_MILLIS));

        t.email.set_outcome(DeliveryStatus::Sent);
        t.sys.set_timestamp_millis(noon() + MINUTE_MILLIS);
        run(&t.ctx).await;

        let sent = email_log(
            t.ctx
                .repos
                .delivery_logs
                .find_by_occurrence(&occurrence.id)
                .await
                .unwrap(),
        );
        assert_eq!(t.email.messages().len(), 2);
        assert_eq!(sent.status, DeliveryStatus::Sent);
        assert_eq!(sent.retry_count, 1);
        assert_eq!(sent.next_retry_at, None);
        // Push channels succeeded the first time and are left alone
        assert_eq!(t.web_push.deliveries().len(), 1);
    }

    #[actix_web::test]
    async fn takes_over_abandoned_reservations() {
        let t = setup();
        let (_, occurrence) = insert_due_reminder(&t.ctx, None).await;

        // A previous pass reserved the email and died before finalizing
        let job_key = NotificationJob {
            entity_type: OCCURRENCE_ENTITY,
            entity_id: &occurrence.id,
            occurrence_at: occurrence.effective_due_at(),
            channel: DeliveryChannel::Email,
        }
        .key();
        t.ctx
            .repos
            .delivery_logs
            .reserve(&occurrence.id, DeliveryChannel::Email, &job_key, noon())
            .await
            .unwrap()
            .unwrap();

        t.sys.set_timestamp_millis(noon() + MINUTE_MILLIS);
        run(&t.ctx).await;
        assert!(t.email.messages().is_empty());
        assert_eq!(t.web_push.deliveries().len(), 1);

        t.sys
            .set_timestamp_millis(noon() + RESERVATION_LEASE_MINUTES * MINUTE_MILLIS);
        run(&t.ctx).await;
        assert_eq!(t.email.messages().len(), 1);
        assert_eq!(
            log_statuses(&t.ctx, &occurrence).await,
            vec![
                (DeliveryChannel::Email, DeliveryStatus::Sent),
                (DeliveryChannel::Fcm, DeliveryStatus::Sent),
                (DeliveryChannel::Push, DeliveryStatus::Sent),
            ]
        );
    }
}
