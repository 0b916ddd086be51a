mod get_snooze_options;

use actix_web::web;
use get_snooze_options::get_snooze_options_controller;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/snooze-options", web::get().to(get_snooze_options_controller));
}
