use serde::Serialize;
use tokio::sync::mpsc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationLevel {
    Info,
    Success,
    Error,
}

/// One toast. The UI layer drains the receiver; this crate only
/// guarantees ordering: producers invalidate their caches before
/// emitting the success notification, so a subscriber never renders
/// "success" next to stale data.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Notification {
    pub level: NotificationLevel,
    pub message: String,
}

#[derive(Clone)]
pub struct Notifier {
    tx: mpsc::UnboundedSender<Notification>,
}

impl Notifier {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<Notification>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    pub fn info(&self, message: impl Into<String>) {
        self.push(NotificationLevel::Info, message.into());
    }

    pub fn success(&self, message: impl Into<String>) {
        self.push(NotificationLevel::Success, message.into());
    }

    pub fn error(&self, message: impl Into<String>) {
        self.push(NotificationLevel::Error, message.into());
    }

    fn push(&self, level: NotificationLevel, message: String) {
        let notification = Notification { level, message };
        if self.tx.send(notification).is_err() {
            // nobody is listening anymore; the message only matters to
            // a live UI
            tracing::debug!("notification dropped, receiver closed");
        }
    }
}
