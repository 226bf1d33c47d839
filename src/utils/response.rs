use rocket::request::FlashMessage;
use rocket::response::{Flash, Redirect};
use serde::Serialize;

/// -----------------------------
/// Transient notification
/// -----------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationLevel {
    Success,
    Info,
    Warning,
    Error,
}

impl NotificationLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            NotificationLevel::Success => "success",
            NotificationLevel::Info => "info",
            NotificationLevel::Warning => "warning",
            NotificationLevel::Error => "error",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Notification {
    pub level: NotificationLevel,
    pub message: String,
}

impl Notification {
    pub fn success(message: impl Into<String>) -> Self {
        Notification {
            level: NotificationLevel::Success,
            message: message.into(),
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Notification {
            level: NotificationLevel::Info,
            message: message.into(),
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Notification {
            level: NotificationLevel::Warning,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Notification {
            level: NotificationLevel::Error,
            message: message.into(),
        }
    }

    /// Carry the notification across a redirect; it is shown once and dropped.
    pub fn redirect(self, to: impl Into<String>) -> Flash<Redirect> {
        Flash::new(Redirect::to(to.into()), self.level.as_str(), self.message)
    }
}

/// -----------------------------
/// Flash rendered by templates
/// -----------------------------
#[derive(Debug, Clone, Serialize)]
pub struct FlashView {
    pub kind: String,
    pub message: String,
}

impl From<FlashMessage<'_>> for FlashView {
    fn from(flash: FlashMessage<'_>) -> Self {
        FlashView {
            kind: flash.kind().to_string(),
            message: flash.message().to_string(),
        }
    }
}

impl From<Notification> for FlashView {
    fn from(notification: Notification) -> Self {
        FlashView {
            kind: notification.level.as_str().to_string(),
            message: notification.message,
        }
    }
}
