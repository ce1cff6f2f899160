//! Pipeline stages between the schedule source and the mailbox

pub mod eligibility;
pub mod notifier;
pub mod report;

pub use eligibility::{filter_hour_window, EligibilityFilter};
pub use notifier::{Notifier, SendGridNotifier};
pub use report::{build_report, format_csv, report_filename, FlightRow};
