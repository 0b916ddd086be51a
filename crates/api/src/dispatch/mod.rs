mod send_due_notifications;

use actix_web::web;
use send_due_notifications::send_due_notifications_controller;

pub use send_due_notifications::SendDueNotificationsUseCase;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route(
        "/cron/notifications",
        web::post().to(send_due_notifications_controller),
    );
}
