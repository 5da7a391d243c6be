use super::notifier::INotifier;
use crate::config::Config;
use std::{sync::Arc, time::Duration};
use study_planner_domain::Reminder;
use tokio::{
    sync::{
        mpsc::{self, error::SendTimeoutError},
        watch, Mutex,
    },
    task::JoinHandle,
    time::{sleep, timeout},
};
use tracing::{debug, error, info, info_span, warn, Instrument};

#[derive(Debug, Clone)]
pub struct DispatchPolicy {
    pub workers: usize,
    pub queue_capacity: usize,
    /// Bound on a single send attempt and on waiting for queue capacity
    pub send_timeout: Duration,
    pub max_attempts: u32,
    pub retry_backoff: Duration,
}

impl From<&Config> for DispatchPolicy {
    fn from(config: &Config) -> Self {
        Self {
            workers: config.reminder_workers,
            queue_capacity: config.reminder_queue_capacity,
            send_timeout: config.reminder_send_timeout,
            max_attempts: config.reminder_max_attempts,
            retry_backoff: config.reminder_retry_backoff,
        }
    }
}

/// Sends `Reminder`s on a pool of workers fed by a bounded queue, so that a
/// slow mail relay never holds up the due-date scanner.
///
/// `shutdown` stops accepting new reminders, lets the workers drain what is
/// already queued and waits for them to finish.
#[derive(Clone)]
pub struct ReminderDispatcher {
    sender: mpsc::Sender<Reminder>,
    enqueue_timeout: Duration,
    shutdown: Arc<watch::Sender<bool>>,
    workers: Arc<std::sync::Mutex<Vec<JoinHandle<()>>>>,
}

impl ReminderDispatcher {
    /// Spawns the workers, must be called within a tokio runtime
    pub fn start(notifier: Arc<dyn INotifier>, policy: DispatchPolicy) -> Self {
        let (sender, receiver) = mpsc::channel(policy.queue_capacity.max(1));
        let receiver = Arc::new(Mutex::new(receiver));
        let (shutdown, shutdown_receiver) = watch::channel(false);

        let workers = (0..policy.workers.max(1))
            .map(|worker_id| {
                let worker = run_worker(
                    receiver.clone(),
                    shutdown_receiver.clone(),
                    notifier.clone(),
                    policy.clone(),
                );
                tokio::spawn(worker.instrument(info_span!("reminder_worker", worker_id)))
            })
            .collect();

        Self {
            sender,
            enqueue_timeout: policy.send_timeout,
            shutdown: Arc::new(shutdown),
            workers: Arc::new(std::sync::Mutex::new(workers)),
        }
    }

    /// Waits at most the send timeout for room in the queue. Returns false
    /// when the reminder was dropped.
    pub async fn enqueue(&self, reminder: Reminder) -> bool {
        if *self.shutdown.borrow() {
            error!(
                "Reminder dispatcher is shut down, dropping reminder for: {}",
                reminder.reference
            );
            return false;
        }

        match self.sender.send_timeout(reminder, self.enqueue_timeout).await {
            Ok(()) => true,
            Err(SendTimeoutError::Timeout(reminder)) => {
                error!(
                    "Reminder queue is full, dropping reminder for: {}",
                    reminder.reference
                );
                false
            }
            Err(SendTimeoutError::Closed(reminder)) => {
                error!(
                    "Reminder queue is closed, dropping reminder for: {}",
                    reminder.reference
                );
                false
            }
        }
    }

    pub async fn shutdown(&self) {
        let _ = self.shutdown.send(true);
        let workers = match self.workers.lock() {
            Ok(mut workers) => std::mem::take(&mut *workers),
            Err(_) => Vec::new(),
        };
        info!("Waiting for {} reminder workers to finish", workers.len());

        for res in futures::future::join_all(workers).await {
            if let Err(e) = res {
                error!("Reminder worker failed: {:?}", e);
            }
        }
    }
}

async fn run_worker(
    receiver: Arc<Mutex<mpsc::Receiver<Reminder>>>,
    mut shutdown: watch::Receiver<bool>,
    notifier: Arc<dyn INotifier>,
    policy: DispatchPolicy,
) {
    loop {
        let reminder = {
            let mut receiver = receiver.lock().await;
            if *shutdown.borrow() {
                match receiver.try_recv() {
                    Ok(reminder) => reminder,
                    Err(_) => break,
                }
            } else {
                tokio::select! {
                    reminder = receiver.recv() => match reminder {
                        Some(reminder) => reminder,
                        None => break,
                    },
                    changed = shutdown.changed() => {
                        if changed.is_err() {
                            break;
                        }
                        continue;
                    }
                }
            }
        };

        deliver(notifier.as_ref(), &reminder, &policy).await;
    }
    debug!("Reminder worker stopped");
}

/// Sends with a timeout per attempt and exponential backoff between attempts
async fn deliver(notifier: &dyn INotifier, reminder: &Reminder, policy: &DispatchPolicy) -> bool {
    let max_attempts = policy.max_attempts.max(1);
    let mut backoff = policy.retry_backoff;

    for attempt in 1..=max_attempts {
        let send = notifier.send(&reminder.to, &reminder.subject, &reminder.html_body);
        match timeout(policy.send_timeout, send).await {
            Ok(true) => {
                debug!("Reminder for {} sent", reminder.reference);
                return true;
            }
            Ok(false) => warn!(
                "Attempt {} of {} to send reminder for {} failed",
                attempt, max_attempts, reminder.reference
            ),
            Err(_) => warn!(
                "Attempt {} of {} to send reminder for {} timed out",
                attempt, max_attempts, reminder.reference
            ),
        }

        if attempt < max_attempts {
            sleep(backoff).await;
            backoff *= 2;
        }
    }

    error!(
        "Giving up on reminder for {} after {} attempts",
        reminder.reference, max_attempts
    );
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::notifier::InMemoryNotifier;

    fn policy(max_attempts: u32) -> DispatchPolicy {
        DispatchPolicy {
            workers: 2,
            queue_capacity: 16,
            send_timeout: Duration::from_millis(200),
            max_attempts,
            retry_backoff: Duration::from_millis(1),
        }
    }

    fn reminder(i: usize) -> Reminder {
        Reminder {
            to: format!("user{}@example.com", i),
            subject: "Assignment Due Soon - Student Dashboard".into(),
            html_body: "<p>Hello</p>".into(),
            reference: i.to_string(),
        }
    }

    struct SlowNotifier {}

    #[async_trait::async_trait]
    impl INotifier for SlowNotifier {
        async fn send(&self, _to: &str, _subject: &str, _html_body: &str) -> bool {
            sleep(Duration::from_secs(60)).await;
            true
        }
    }

    #[tokio::test]
    async fn shutdown_drains_the_queue() {
        let notifier = Arc::new(InMemoryNotifier::new());
        let dispatcher = ReminderDispatcher::start(notifier.clone(), policy(1));

        for i in 0..10 {
            assert!(dispatcher.enqueue(reminder(i)).await);
        }
        dispatcher.shutdown().await;

        assert_eq!(notifier.sent().len(), 10);
        assert!(!dispatcher.enqueue(reminder(11)).await);
    }

    #[tokio::test]
    async fn failed_sends_are_not_retried_by_default() {
        let notifier = Arc::new(InMemoryNotifier::new());
        notifier.fail_next(1);
        let dispatcher = ReminderDispatcher::start(notifier.clone(), policy(1));

        assert!(dispatcher.enqueue(reminder(0)).await);
        dispatcher.shutdown().await;
        assert!(notifier.sent().is_empty());
    }

    #[tokio::test]
    async fn failed_sends_are_retried_up_to_max_attempts() {
        let notifier = Arc::new(InMemoryNotifier::new());
        notifier.fail_next(2);
        let dispatcher = ReminderDispatcher::start(notifier.clone(), policy(3));

        assert!(dispatcher.enqueue(reminder(0)).await);
        dispatcher.shutdown().await;
        assert_eq!(notifier.sent().len(), 1);
    }

    #[tokio::test]
    async fn slow_sends_time_out() {
        let notifier = SlowNotifier {};
        let started = tokio::time::Instant::now();
        assert!(!deliver(&notifier, &reminder(0), &policy(2)).await);
        assert!(started.elapsed() < Duration::from_secs(5));
    }
}
