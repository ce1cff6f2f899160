use chrono_tz::Tz;
use config::{Environment, File, FileFormat};
use serde::Deserialize;
use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info};

pub mod defaults;
pub mod delimited;

use defaults::*;

use crate::errors::{AppError, AppResult};
use crate::models::{Airport, Credential, Recipient};
use crate::utils::cron_helper;

/// Variable names used by the timer-function deployment, mapped
/// onto the equivalent configuration keys
const LEGACY_ENV_KEYS: [(&str, &str); 10] = [
    ("BetterAirportsApiUser", "api.user"),
    ("BetterAirportsApiKey", "api.key"),
    ("sendGridApiKey", "email.sendgrid_api_key"),
    ("fromAddress", "email.from_address"),
    ("fromName", "email.from_name"),
    ("toAddressList", "email.to_addresses"),
    ("toNameList", "email.to_names"),
    ("ccAddressList", "email.cc_addresses"),
    ("ccNameList", "email.cc_names"),
    ("airportList", "airports"),
];

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub email: EmailConfig,
    /// Empty means a single run without airport scoping
    #[serde(default, deserialize_with = "delimited::airports")]
    pub airports: Vec<Airport>,
    #[serde(default)]
    pub schedule: ScheduleConfig,
    #[serde(default)]
    pub eligibility: EligibilityConfig,
    #[serde(default)]
    pub report: ReportConfig,
    #[serde(default)]
    pub http: HttpConfig,
}

#[derive(Clone, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_api_base_url")]
    pub base_url: String,
    #[serde(default)]
    pub user: String,
    #[serde(default)]
    pub key: String,
}

#[derive(Clone, Deserialize)]
pub struct EmailConfig {
    #[serde(default)]
    pub sendgrid_api_key: String,
    #[serde(default = "default_sendgrid_base_url")]
    pub sendgrid_base_url: String,
    #[serde(default)]
    pub from_address: String,
    #[serde(default = "default_from_name")]
    pub from_name: String,
    /// Comma-delimited, position-paired with `to_names`
    #[serde(default)]
    pub to_addresses: String,
    #[serde(default)]
    pub to_names: String,
    #[serde(default)]
    pub cc_addresses: String,
    #[serde(default)]
    pub cc_names: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScheduleConfig {
    /// `sec min hour day-of-month month day-of-week [year]`
    #[serde(default = "default_cron")]
    pub cron: String,
    /// IANA zone used for "today" and for cron evaluation
    #[serde(default = "default_timezone")]
    pub timezone: String,
    /// Days added to today to get the schedule date
    #[serde(default = "default_day_offset")]
    pub day_offset: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EligibilityConfig {
    #[serde(default = "default_eligibility_field")]
    pub field_name: String,
    /// Any exact match makes a flight eligible
    #[serde(
        default = "default_eligibility_markers",
        deserialize_with = "delimited::string_list"
    )]
    pub markers: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReportConfig {
    /// Attach only eligible flights; `false` attaches the whole schedule
    #[serde(default = "default_eligible_only")]
    pub eligible_only: bool,
    /// Send even when there is nothing to report
    #[serde(default = "default_send_empty")]
    pub send_empty: bool,
    /// Airport label used in subject/filename when no airport list is set
    #[serde(default = "default_report_label")]
    pub label: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HttpConfig {
    #[serde(default = "default_http_timeout_seconds")]
    pub timeout_seconds: u64,
}

fn default_api_base_url() -> String {
    DEFAULT_API_BASE_URL.to_string()
}

fn default_sendgrid_base_url() -> String {
    DEFAULT_SENDGRID_BASE_URL.to_string()
}

fn default_from_name() -> String {
    DEFAULT_FROM_NAME.to_string()
}

fn default_cron() -> String {
    DEFAULT_CRON.to_string()
}

fn default_timezone() -> String {
    DEFAULT_TIMEZONE.to_string()
}

fn default_day_offset() -> i64 {
    DEFAULT_DAY_OFFSET
}

fn default_eligibility_field() -> String {
    DEFAULT_ELIGIBILITY_FIELD.to_string()
}

fn default_eligibility_markers() -> Vec<String> {
    DEFAULT_ELIGIBILITY_MARKERS
        .iter()
        .map(|m| m.to_string())
        .collect()
}

fn default_eligible_only() -> bool {
    DEFAULT_ELIGIBLE_ONLY
}

fn default_send_empty() -> bool {
    DEFAULT_SEND_EMPTY
}

fn default_report_label() -> String {
    DEFAULT_REPORT_LABEL.to_string()
}

fn default_http_timeout_seconds() -> u64 {
    DEFAULT_HTTP_TIMEOUT_SECONDS
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_api_base_url(),
            user: String::new(),
            key: String::new(),
        }
    }
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            sendgrid_api_key: String::new(),
            sendgrid_base_url: default_sendgrid_base_url(),
            from_address: String::new(),
            from_name: default_from_name(),
            to_addresses: String::new(),
            to_names: String::new(),
            cc_addresses: String::new(),
            cc_names: String::new(),
        }
    }
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            cron: default_cron(),
            timezone: default_timezone(),
            day_offset: default_day_offset(),
        }
    }
}

impl Default for EligibilityConfig {
    fn default() -> Self {
        Self {
            field_name: default_eligibility_field(),
            markers: default_eligibility_markers(),
        }
    }
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            eligible_only: default_eligible_only(),
            send_empty: default_send_empty(),
            label: default_report_label(),
        }
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: default_http_timeout_seconds(),
        }
    }
}

impl fmt::Debug for ApiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiConfig")
            .field("base_url", &self.base_url)
            .field("user", &self.user)
            .field("key", &"<redacted>")
            .finish()
    }
}

impl fmt::Debug for EmailConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EmailConfig")
            .field("sendgrid_api_key", &"<redacted>")
            .field("sendgrid_base_url", &self.sendgrid_base_url)
            .field("from_address", &self.from_address)
            .field("from_name", &self.from_name)
            .field("to_addresses", &self.to_addresses)
            .field("cc_addresses", &self.cc_addresses)
            .finish()
    }
}

impl ApiConfig {
    pub fn credential(&self) -> Credential {
        Credential::new(self.user.clone(), self.key.clone())
    }
}

impl EmailConfig {
    pub fn to_recipients(&self) -> Vec<Recipient> {
        Recipient::zip_delimited(&self.to_addresses, &self.to_names)
    }

    pub fn cc_recipients(&self) -> Vec<Recipient> {
        Recipient::zip_delimited(&self.cc_addresses, &self.cc_names)
    }

    pub fn sender(&self) -> Recipient {
        Recipient::new(self.from_address.clone(), Some(self.from_name.clone()))
    }
}

impl ScheduleConfig {
    pub fn tz(&self) -> AppResult<Tz> {
        self.timezone.parse::<Tz>().map_err(|e| {
            AppError::configuration(format!(
                "schedule.timezone '{}' is not a valid IANA zone: {e}",
                self.timezone
            ))
        })
    }
}

impl HttpConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

impl Config {
    /// Load from the optional TOML file and the process environment
    pub fn load(config_file: Option<&Path>) -> AppResult<Self> {
        let env: HashMap<String, String> = std::env::vars().collect();
        Self::load_with_env(config_file, env)
    }

    /// Load from the optional TOML file and an explicit variable map
    pub fn load_with_env(
        config_file: Option<&Path>,
        env: HashMap<String, String>,
    ) -> AppResult<Self> {
        let file_path = config_file.unwrap_or_else(|| Path::new(DEFAULT_CONFIG_FILE));
        if file_path.exists() {
            info!("Reading configuration file: {}", file_path.display());
        } else {
            debug!(
                "Configuration file {} not found, using environment only",
                file_path.display()
            );
        }

        let mut builder = config::Config::builder()
            .add_source(File::from(file_path).format(FileFormat::Toml).required(false))
            .add_source(Self::environment(env.clone()));

        for (legacy, key) in LEGACY_ENV_KEYS {
            if let Some(value) = env.get(legacy) {
                debug!("Using legacy variable {} for {}", legacy, key);
                builder = builder
                    .set_override(key, value.clone())
                    .map_err(|e| AppError::configuration(e.to_string()))?;
            }
        }

        Self::build(builder)
    }

    /// Parse a TOML document, without consulting the environment
    pub fn from_toml_str(contents: &str) -> AppResult<Self> {
        let builder =
            config::Config::builder().add_source(File::from_str(contents, FileFormat::Toml));
        Self::build(builder)
    }

    fn environment(env: HashMap<String, String>) -> Environment {
        Environment::with_prefix(ENV_PREFIX)
            .prefix_separator("_")
            .separator("__")
            .source(Some(env))
    }

    fn build(
        builder: config::ConfigBuilder<config::builder::DefaultState>,
    ) -> AppResult<Self> {
        let config: Config = builder
            .build()
            .and_then(|c| c.try_deserialize())
            .map_err(|e| AppError::configuration(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject configurations that cannot produce a run
    pub fn validate(&self) -> AppResult<()> {
        let mut problems = Vec::new();

        if self.api.user.trim().is_empty() {
            problems.push("api.user must be set".to_string());
        }
        if self.api.key.trim().is_empty() {
            problems.push("api.key must be set".to_string());
        }
        if self.email.sendgrid_api_key.trim().is_empty() {
            problems.push("email.sendgrid_api_key must be set".to_string());
        }
        if self.email.from_address.trim().is_empty() {
            problems.push("email.from_address must be set".to_string());
        }
        if self.email.to_recipients().is_empty() {
            problems.push("email.to_addresses needs at least one address".to_string());
        }
        if let Err(e) = self.schedule.tz() {
            problems.push(e.to_string());
        }
        if let Err(e) = cron_helper::parse_schedule(&self.schedule.cron) {
            problems.push(e);
        }
        if self.eligibility.field_name.trim().is_empty() {
            problems.push("eligibility.field_name must not be empty".to_string());
        }
        if self.eligibility.markers.is_empty() {
            problems.push("eligibility.markers needs at least one value".to_string());
        }
        if self.http.timeout_seconds == 0 {
            problems.push("http.timeout_seconds must be greater than zero".to_string());
        }
        for airport in &self.airports {
            if airport.code.trim().is_empty() {
                problems.push("airport code must not be empty".to_string());
            }
            if airport.max_hour > 23 || airport.min_hour > airport.max_hour {
                problems.push(format!(
                    "airport {} has invalid hour window {}-{}",
                    airport.code, airport.min_hour, airport.max_hour
                ));
            }
        }

        if problems.is_empty() {
            Ok(())
        } else {
            Err(AppError::configuration(problems.join("; ")))
        }
    }
}
