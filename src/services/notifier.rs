use tokio::sync::mpsc::{self, UnboundedSender};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Requested,
    Approved,
    Rejected,
    Cancelled,
}

#[derive(Debug, Clone)]
pub struct LeaveNotification {
    pub recipient: Option<String>,
    pub subject: String,
    pub body: String,
    pub kind: NotificationKind,
}

/// Fire-and-forget hand-off to the notification collaborator. Dispatch never
/// blocks the calling request, and a delivery failure never propagates back
/// into the transaction that triggered it.
#[derive(Clone)]
pub struct Notifier {
    tx: UnboundedSender<LeaveNotification>,
}

impl Notifier {
    /// Start the delivery worker and return a cloneable handle to it.
    pub fn spawn() -> Self {
        let (tx, mut rx) = mpsc::unbounded_channel::<LeaveNotification>();

        tokio::spawn(async move {
            while let Some(notification) = rx.recv().await {
                // Delivery itself (SES / calendar) lives outside this
                // service; the worker records the hand-off.
                log::info!(
                    "Notification dispatched: kind={:?} to={} subject={}",
                    notification.kind,
                    notification.recipient.as_deref().unwrap_or("<unknown>"),
                    notification.subject
                );
            }
        });

        Self { tx }
    }

    pub fn dispatch(&self, notification: LeaveNotification) {
        if let Err(err) = self.tx.send(notification) {
            log::error!("Failed to dispatch notification: {}", err);
        }
    }
}
