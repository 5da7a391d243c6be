pub mod get_timezones;
pub mod update_user_timezone;
