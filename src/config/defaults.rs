/// Configuration default values
///
/// This module contains all the default values for configuration options,
/// making them easily changeable in one central location.

// Airport operations API
pub const DEFAULT_API_BASE_URL: &str = "https://api.betterairport.com";

// Email provider
pub const DEFAULT_SENDGRID_BASE_URL: &str = "https://api.sendgrid.com";
pub const DEFAULT_FROM_NAME: &str = "Spot Saver";

// Scheduling
// Daily at 15:00 in the configured time zone (sec min hour dom mon dow)
pub const DEFAULT_CRON: &str = "0 0 15 * * *";
pub const DEFAULT_TIMEZONE: &str = "America/Los_Angeles";
pub const DEFAULT_DAY_OFFSET: i64 = 2;

// Eligibility
pub const DEFAULT_ELIGIBILITY_FIELD: &str = "VQ";
pub const DEFAULT_ELIGIBILITY_MARKERS: [&str; 2] = ["VQ-5", "VQ-5 VQ-3"];

// Report
pub const DEFAULT_REPORT_LABEL: &str = "SEA";
pub const DEFAULT_ELIGIBLE_ONLY: bool = true;
pub const DEFAULT_SEND_EMPTY: bool = false;

// HTTP
pub const DEFAULT_HTTP_TIMEOUT_SECONDS: u64 = 30;

// Loading
pub const DEFAULT_CONFIG_FILE: &str = "spot-saver.toml";
pub const ENV_PREFIX: &str = "SPOT_SAVER";
