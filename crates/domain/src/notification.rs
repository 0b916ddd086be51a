use crate::{
    job_key::job_key_to_notification_id, occurrence::Occurrence, reminder::Reminder,
    smart_snooze::is_medication_category,
};
use serde::Serialize;

/// What a household member sees for a due occurrence, shared by every channel
#[derive(Debug, Clone, PartialEq)]
pub struct NotificationContent {
    pub title: String,
    pub body: String,
    /// Deep link into the app
    pub url: String,
}

impl NotificationContent {
    pub fn for_occurrence(
        reminder: &Reminder,
        occurrence: &Occurrence,
        category: Option<&str>,
        app_base_url: &str,
    ) -> Self {
        let body = match reminder.notes.as_deref().map(str::trim) {
            Some(notes) if !notes.is_empty() => notes.to_string(),
            _ if category.map(is_medication_category).unwrap_or(false) => {
                format!("It is time to take {}.", reminder.title)
            }
            _ => format!("{} is due now.", reminder.title),
        };

        Self {
            title: reminder.title.clone(),
            body,
            url: format!(
                "{}/reminders/{}?occurrence={}",
                app_base_url.trim_end_matches('/'),
                reminder.id,
                occurrence.id
            ),
        }
    }

    /// Channel specific payload, `job_key` identifies the attempt
    pub fn payload(&self, job_key: &str) -> NotificationPayload {
        NotificationPayload {
            title: self.title.clone(),
            body: self.body.clone(),
            url: self.url.clone(),
            tag: job_key.to_string(),
            notification_id: job_key_to_notification_id(job_key),
        }
    }

    pub fn email_subject(&self) -> String {
        format!("Reminder: {}", self.title)
    }

    pub fn render_email_html(&self) -> String {
        format!(
            "<div style=\"font-family: sans-serif\">\
             <h2>{title}</h2>\
             <p>{body}</p>\
             <p><a href=\"{url}\">Open reminder</a></p>\
             </div>",
            title = escape_html(&self.title),
            body = escape_html(&self.body),
            url = escape_html(&self.url),
        )
    }
}

/// Json body of a web push message, also the source of FCM message fields
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationPayload {
    pub title: String,
    pub body: String,
    pub url: String,
    /// Lets the platform collapse repeated attempts of the same job
    pub tag: String,
    pub notification_id: i32,
}

fn escape_html(s: &str) -> String {
    let mut escaped = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            c => escaped.push(c),
        }
    }
    escaped
}
