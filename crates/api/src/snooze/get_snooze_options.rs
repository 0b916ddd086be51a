use crate::error::NudgeError;
use crate::shared::usecase::{execute, UseCase};
use actix_web::{web, HttpResponse};
use chrono_tz::Tz;
use nudge_api_structs::get_snooze_options::{APIResponse, QueryParams};
use nudge_domain::{date::to_local, get_smart_snooze_options, SnoozeOption, SnoozeOptionsInput};
use nudge_infra::NudgeContext;

pub async fn get_snooze_options_controller(
    query_params: web::Query<QueryParams>,
    ctx: web::Data<NudgeContext>,
) -> Result<HttpResponse, NudgeError> {
    let query = query_params.into_inner();
    let usecase = GetSnoozeOptionsUseCase {
        due_ts: query.due_ts,
        category: query.category,
        timezone: query.timezone,
    };

    execute(usecase, &ctx)
        .await
        .map(|options| HttpResponse::Ok().json(APIResponse::new(options)))
        .map_err(|e| match e {
            UseCaseErrors::InvalidTimezone(tz) => NudgeError::BadClientData(format!(
                "The provided timezone: {} is not a valid IANA timezone",
                tz
            )),
            UseCaseErrors::InvalidClock => NudgeError::InternalError,
        })
}

#[derive(Debug)]
pub struct GetSnoozeOptionsUseCase {
    pub due_ts: Option<i64>,
    pub category: Option<String>,
    pub timezone: Option<String>,
}

#[derive(Debug, PartialEq)]
pub enum UseCaseErrors {
    InvalidTimezone(String),
    InvalidClock,
}

#[async_trait::async_trait(?Send)]
impl UseCase for GetSnoozeOptionsUseCase {
    type Response = Vec<SnoozeOption>;

    type Errors = UseCaseErrors;

    const NAME: &'static str = "GetSnoozeOptions";

    async fn execute(&mut self, ctx: &NudgeContext) -> Result<Self::Response, Self::Errors> {
        let tz = match &self.timezone {
            Some(tz) if !tz.trim().is_empty() => tz
                .trim()
                .parse::<Tz>()
                .map_err(|_| UseCaseErrors::InvalidTimezone(tz.clone()))?,
            _ => ctx.config.default_timezone,
        };
        let now = to_local(ctx.sys.get_timestamp_millis(), &tz)
            .ok_or(UseCaseErrors::InvalidClock)?;

        Ok(get_smart_snooze_options(&SnoozeOptionsInput {
            now,
            category: self.category.as_deref(),
            due_at: self.due_ts,
        }))
    }
}
