use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Mutex;
use tokio::runtime::Handle;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;

use super::reminders::{Notifier, NotifyError};

#[derive(Debug, Clone, PartialEq)]
pub struct Alert {
    pub id: String,
    pub title: String,
    pub body: String,
    pub fire_at: DateTime<Utc>,
}

/// In-process alerts backed by tokio timers. Alerts only fire while the runtime is alive.
pub struct TokioNotifier {
    handle: Handle,
    timers: Mutex<HashMap<String, JoinHandle<()>>>,
    alerts: Option<UnboundedSender<Alert>>,
}

impl TokioNotifier {
    pub fn new(handle: Handle) -> Self {
        Self {
            handle,
            timers: Mutex::new(HashMap::new()),
            alerts: None,
        }
    }

    pub fn current() -> Result<Self, NotifyError> {
        let handle = Handle::try_current().map_err(|_| NotifyError::RuntimeUnavailable)?;
        Ok(Self::new(handle))
    }

    /// Also deliver fired alerts on the returned channel.
    pub fn with_channel(mut self) -> (Self, UnboundedReceiver<Alert>) {
        let (tx, rx) = mpsc::unbounded_channel();
        self.alerts = Some(tx);
        (self, rx)
    }

    pub fn pending(&self) -> usize {
        self.timers
            .lock()
            .map(|timers| timers.values().filter(|timer| !timer.is_finished()).count())
            .unwrap_or(0)
    }
}

impl Notifier for TokioNotifier {
    fn register(&self, id: &str, fire_at: DateTime<Utc>, title: &str, body: &str) -> Result<(), NotifyError> {
        let delay = (fire_at - Utc::now()).to_std().unwrap_or_default();
        let alert = Alert {
            id: id.to_string(),
            title: title.to_string(),
            body: body.to_string(),
            fire_at,
        };
        let sender = self.alerts.clone();

        let mut timers = self.timers.lock().map_err(|_| NotifyError::Poisoned)?;
        let timer = self.handle.spawn(async move {
            tokio::time::sleep(delay).await;
            tracing::info!("{}: {} ({})", alert.title, alert.body, alert.id);
            if let Some(sender) = sender {
                sender.send(alert).ok();
            }
        });

        timers.retain(|_, timer| !timer.is_finished());
        if let Some(previous) = timers.insert(id.to_string(), timer) {
            previous.abort();
        }
        Ok(())
    }

    fn cancel(&self, ids: &[String]) -> Result<(), NotifyError> {
        let mut timers = self.timers.lock().map_err(|_| NotifyError::Poisoned)?;
        for id in ids {
            if let Some(timer) = timers.remove(id) {
                timer.abort();
                tracing::debug!("Cancelled alert {}", id);
            }
        }
        Ok(())
    }
}

impl Drop for TokioNotifier {
    fn drop(&mut self) {
        if let Ok(timers) = self.timers.get_mut() {
            for timer in timers.values() {
                timer.abort();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use std::time::Duration as StdDuration;

    #[tokio::test]
    async fn fires_alert_when_due() {
        let (notifier, mut alerts) = TokioNotifier::current().unwrap().with_channel();
        let fire_at = Utc::now() + Duration::milliseconds(20);

        notifier.register("a_300", fire_at, "Reminder", "Appointment: Standup").unwrap();

        let alert = tokio::time::timeout(StdDuration::from_secs(2), alerts.recv())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(alert.id, "a_300");
        assert_eq!(alert.body, "Appointment: Standup");
        assert_eq!(alert.fire_at, fire_at);
    }

    #[tokio::test]
    async fn cancelled_alert_never_fires() {
        let (notifier, mut alerts) = TokioNotifier::current().unwrap().with_channel();
        notifier
            .register("a_300", Utc::now() + Duration::milliseconds(100), "Reminder", "body")
            .unwrap();

        notifier.cancel(&["a_300".to_string(), "unknown".to_string()]).unwrap();

        let received = tokio::time::timeout(StdDuration::from_millis(300), alerts.recv()).await;
        assert!(received.is_err());
        assert_eq!(notifier.pending(), 0);
    }

    #[tokio::test]
    async fn re_registering_replaces_the_timer() {
        let (notifier, mut alerts) = TokioNotifier::current().unwrap().with_channel();
        let soon = Utc::now() + Duration::milliseconds(20);
        notifier.register("a_60", soon, "Reminder", "first").unwrap();
        notifier.register("a_60", soon, "Reminder", "second").unwrap();

        let alert = tokio::time::timeout(StdDuration::from_secs(2), alerts.recv())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(alert.body, "second");
        let extra = tokio::time::timeout(StdDuration::from_millis(100), alerts.recv()).await;
        assert!(extra.is_err());
    }

    #[tokio::test]
    async fn poisoned_registry_starts_no_timer() {
        let (notifier, mut alerts) = TokioNotifier::current().unwrap().with_channel();
        let _ = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _guard = notifier.timers.lock().unwrap();
            panic!("poison the registry");
        }));

        let result = notifier.register("a_60", Utc::now() + Duration::milliseconds(20), "Reminder", "body");

        assert!(matches!(result, Err(NotifyError::Poisoned)));
        let received = tokio::time::timeout(StdDuration::from_millis(200), alerts.recv()).await;
        assert!(received.is_err());
    }

    #[test]
    fn current_without_runtime_is_an_error() {
        assert!(matches!(TokioNotifier::current(), Err(NotifyError::RuntimeUnavailable)));
    }
}
