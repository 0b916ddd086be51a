use crate::error::NudgeError;
use actix_web::HttpRequest;
use nudge_infra::NudgeContext;

const CRON_SECRET_HEADER: &str = "x-cron-secret";

fn parse_authtoken_header(token_header_value: &str) -> &str {
    let value = token_header_value.trim();
    match value.get(..7) {
        Some(scheme) if scheme.eq_ignore_ascii_case("bearer ") => value[7..].trim(),
        _ => value,
    }
}

fn header_value<'a>(req: &'a HttpRequest, name: &str) -> Result<Option<&'a str>, NudgeError> {
    match req.headers().get(name) {
        Some(value) => value
            .to_str()
            .map(Some)
            .map_err(|_| NudgeError::Unauthorized(format!("Malformed {} header provided", name))),
        None => Ok(None),
    }
}

/// Compares without exiting at the first differing byte
fn secrets_match(provided: &str, expected: &str) -> bool {
    let provided = provided.as_bytes();
    let expected = expected.as_bytes();
    if provided.len() != expected.len() {
        return false;
    }
    provided
        .iter()
        .zip(expected)
        .fold(0u8, |diff, (a, b)| diff | (a ^ b))
        == 0
}

/// Only the scheduler that knows `CRON_SECRET` may trigger dispatch passes.
/// The secret is accepted as a bearer token or in the `x-cron-secret` header.
pub fn protect_cron_route(req: &HttpRequest, ctx: &NudgeContext) -> Result<(), NudgeError> {
    let provided = match header_value(req, "authorization")? {
        Some(token) => parse_authtoken_header(token),
        None => match header_value(req, CRON_SECRET_HEADER)? {
            Some(secret) => secret.trim(),
            None => {
                return Err(NudgeError::Unauthorized(
                    "Unable to find the cron secret in the authorization header".into(),
                ))
            }
        },
    };

    if secrets_match(provided, &ctx.config.cron_secret) {
        Ok(())
    } else {
        Err(NudgeError::Unauthorized("Invalid cron secret provided".into()))
    }
}
