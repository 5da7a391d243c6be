mod notifier;
mod reminders;

pub use notifier::{INotifier, InMemoryNotifier, LogNotifier, SentMessage, WebhookNotifier};
pub use reminders::{DispatchPolicy, ReminderDispatcher};
