use std::{fmt::Display, str::FromStr, time::Duration};
use study_planner_domain::DEFAULT_TIMEZONE;
use tracing::{info, warn};

/// A year, far below the range where `chrono::Duration::hours` overflows
const MAX_NOTIFICATION_WINDOW_HOURS: i64 = 24 * 366;

#[derive(Debug, Clone)]
pub struct Config {
    /// How often the due-date scanner runs
    pub scan_interval: Duration,
    /// How far ahead of now a deadline has to be to trigger a reminder.
    /// Deadlines inside `(now, now + notification_window)` are reminded about.
    pub notification_window: chrono::Duration,
    /// Number of users fetched per page while enumerating users in a scan
    pub users_page_size: usize,
    /// Maximum number of records per collection and user handled in one scan
    pub deadlines_per_user_limit: usize,
    /// Number of workers sending reminders
    pub reminder_workers: usize,
    /// Number of reminders that can wait for a worker
    pub reminder_queue_capacity: usize,
    /// Upper bound on a single send attempt
    pub reminder_send_timeout: Duration,
    /// Send attempts per reminder, 1 means no retries
    pub reminder_max_attempts: u32,
    /// Delay before the first retry, doubled for every following one
    pub reminder_retry_backoff: Duration,
    /// Endpoint of the mail relay reminders are posted to. Reminders are
    /// only logged when this is not set.
    pub mailer_url: Option<String>,
    pub mailer_api_key: Option<String>,
    pub mailer_from: String,
    pub default_timezone: String,
}

fn env_or<T>(key: &str, default: T) -> T
where
    T: FromStr + Display,
{
    match std::env::var(key) {
        Ok(raw) => match raw.parse::<T>() {
            Ok(value) => value,
            Err(_) => {
                warn!(
                    "The given {}: {} is not valid, falling back to the default: {}.",
                    key, raw, default
                );
                default
            }
        },
        Err(_) => default,
    }
}

fn notification_window(hours: i64) -> chrono::Duration {
    let clamped = hours.max(1).min(MAX_NOTIFICATION_WINDOW_HOURS);
    if clamped != hours {
        warn!(
            "The given NOTIFICATION_WINDOW_HOURS: {} is out of range, using: {}.",
            hours, clamped
        );
    }
    chrono::Duration::hours(clamped)
}

fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|value| !value.trim().is_empty())
}

impl Config {
    pub fn new() -> Self {
        let mailer_url = optional_env("MAILER_URL");
        if mailer_url.is_none() {
            info!("Did not find MAILER_URL environment variable. Reminders will only be logged.");
        }

        Self {
            scan_interval: Duration::from_secs(env_or("SCAN_INTERVAL_SECS", 60 * 60)),
            notification_window: notification_window(env_or("NOTIFICATION_WINDOW_HOURS", 24)),
            users_page_size: env_or("USERS_PAGE_SIZE", 500_usize).max(1),
            deadlines_per_user_limit: env_or("DEADLINES_PER_USER_LIMIT", 100_usize).max(1),
            reminder_workers: env_or("REMINDER_WORKERS", 4_usize).max(1),
            reminder_queue_capacity: env_or("REMINDER_QUEUE_CAPACITY", 1024_usize).max(1),
            reminder_send_timeout: Duration::from_secs(env_or("REMINDER_SEND_TIMEOUT_SECS", 10)),
            reminder_max_attempts: env_or("REMINDER_MAX_ATTEMPTS", 1_u32).max(1),
            reminder_retry_backoff: Duration::from_millis(env_or(
                "REMINDER_RETRY_BACKOFF_MILLIS",
                500,
            )),
            mailer_url,
            mailer_api_key: optional_env("MAILER_API_KEY"),
            mailer_from: optional_env("MAILER_FROM")
                .unwrap_or_else(|| "noreply@studyplanner.app".into()),
            default_timezone: optional_env("DEFAULT_TIMEZONE")
                .unwrap_or_else(|| DEFAULT_TIMEZONE.into()),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn notification_window_is_kept_in_range() {
        assert_eq!(notification_window(24), chrono::Duration::hours(24));
        assert_eq!(notification_window(0), chrono::Duration::hours(1));
        assert_eq!(notification_window(-5), chrono::Duration::hours(1));
        assert_eq!(
            notification_window(i64::MAX),
            chrono::Duration::hours(MAX_NOTIFICATION_WINDOW_HOURS)
        );
    }
}
