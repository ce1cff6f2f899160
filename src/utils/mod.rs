pub mod cron_helper;
pub mod time;

pub use time::{iso_date, schedule_date};
