pub mod get_notifications;
pub mod get_unread_count;
pub mod mark_all_notifications_read;
pub mod set_notification_read;
