//! One-shot alarms on the tokio timer.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::debug;

use vaultlink_protocols::{AlarmScheduler, HostError};

struct Armed {
    deadline: Instant,
    task: JoinHandle<()>,
}

type AlarmTable = Arc<Mutex<HashMap<String, Armed>>>;

/// Alarm scheduler that sends the alarm name on a channel when it fires.
///
/// Creating an alarm that already exists replaces it.
pub struct TimerAlarms {
    armed: AlarmTable,
    fired: mpsc::UnboundedSender<String>,
}

impl TimerAlarms {
    /// The scheduler and the receiving end of fired alarm names.
    pub fn new() -> (Self, mpsc::UnboundedReceiver<String>) {
        let (fired, rx) = mpsc::unbounded_channel();
        (
            Self {
                armed: Arc::new(Mutex::new(HashMap::new())),
                fired,
            },
            rx,
        )
    }

    /// Time left before `name` fires.
    pub fn remaining(&self, name: &str) -> Option<Duration> {
        self.armed
            .lock()
            .get(name)
            .map(|a| a.deadline.saturating_duration_since(Instant::now()))
    }

    pub fn is_armed(&self, name: &str) -> bool {
        self.armed.lock().contains_key(name)
    }
}

#[async_trait]
impl AlarmScheduler for TimerAlarms {
    async fn create(&self, name: &str, delay_minutes: u32) -> Result<(), HostError> {
        let delay = Duration::from_secs(u64::from(delay_minutes) * 60);
        let deadline = Instant::now() + delay;

        let table = self.armed.clone();
        let fired = self.fired.clone();
        let alarm = name.to_string();
        let task = tokio::spawn(async move {
            tokio::time::sleep_until(deadline).await;
            {
                let mut table = table.lock();
                if table.get(&alarm).is_some_and(|a| a.deadline == deadline) {
                    table.remove(&alarm);
                }
            }
            debug!(alarm = %alarm, "Alarm fired");
            let _ = fired.send(alarm);
        });

        if let Some(previous) = self
            .armed
            .lock()
            .insert(name.to_string(), Armed { deadline, task })
        {
            previous.task.abort();
        }
        Ok(())
    }

    async fn clear(&self, name: &str) -> Result<bool, HostError> {
        match self.armed.lock().remove(name) {
            Some(armed) => {
                armed.task.abort();
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_alarm_fires_after_delay() {
        let (alarms, mut rx) = TimerAlarms::new();
        alarms.create("lock", 2).await.unwrap();
        assert_eq!(alarms.remaining("lock"), Some(Duration::from_secs(120)));

        tokio::time::advance(Duration::from_secs(119)).await;
        assert!(rx.try_recv().is_err());

        assert_eq!(rx.recv().await.as_deref(), Some("lock"));
        assert!(!alarms.is_armed("lock"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_create_replaces_existing() {
        let (alarms, mut rx) = TimerAlarms::new();
        alarms.create("lock", 1).await.unwrap();
        tokio::time::advance(Duration::from_secs(50)).await;
        alarms.create("lock", 1).await.unwrap();
        assert_eq!(alarms.remaining("lock"), Some(Duration::from_secs(60)));

        tokio::time::advance(Duration::from_secs(30)).await;
        tokio::task::yield_now().await;
        assert!(rx.try_recv().is_err());

        assert_eq!(rx.recv().await.as_deref(), Some("lock"));
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_clear() {
        let (alarms, mut rx) = TimerAlarms::new();
        alarms.create("lock", 1).await.unwrap();
        assert!(alarms.clear("lock").await.unwrap());
        assert!(!alarms.clear("lock").await.unwrap());

        tokio::time::advance(Duration::from_secs(120)).await;
        tokio::task::yield_now().await;
        assert!(rx.try_recv().is_err());
    }
}
