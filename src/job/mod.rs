//! Job orchestration
//!
//! [`JobRunner`] performs one run: for every configured airport (or once,
//! unscoped, when none are configured) it authenticates, fetches the
//! schedule, filters it and mails the CSV report. Airports are isolated from
//! each other; a failure is recorded in the [`RunSummary`] and the next
//! airport is still attempted.

pub mod scheduler;

pub use scheduler::JobScheduler;

use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;
use std::fmt;
use std::sync::Arc;
use tracing::{error, info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::config::{Config, ReportConfig};
use crate::errors::{AppError, AppResult};
use crate::models::{Airport, Credential, DeliveryReceipt, Recipient, ReportEmail};
use crate::services::{build_report, filter_hour_window, EligibilityFilter, Notifier};
use crate::sources::{Authenticator, ScheduleFetcher, ScheduleRequest};
use crate::utils::{iso_date, schedule_date};

const GENERATED_AT_FORMAT: &str = "%Y-%m-%d %H:%M:%S %Z";

/// What happened to one airport during a run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AirportOutcome {
    Sent(DeliveryReceipt),
    /// Nothing eligible and `report.send_empty` is off
    SkippedEmpty,
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AirportReport {
    pub airport: String,
    pub fetched: usize,
    pub eligible: usize,
    pub outcome: AirportOutcome,
}

#[derive(Debug, Clone)]
pub struct RunSummary {
    pub run_id: Uuid,
    pub date: NaiveDate,
    pub airports: Vec<AirportReport>,
}

impl RunSummary {
    pub fn has_failures(&self) -> bool {
        self.airports
            .iter()
            .any(|a| matches!(a.outcome, AirportOutcome::Failed(_)))
    }

    pub fn failures(&self) -> impl Iterator<Item = &AirportReport> {
        self.airports
            .iter()
            .filter(|a| matches!(a.outcome, AirportOutcome::Failed(_)))
    }

    pub fn sent(&self) -> usize {
        self.airports
            .iter()
            .filter(|a| matches!(a.outcome, AirportOutcome::Sent(_)))
            .count()
    }

    /// Convert into an error naming every failed airport
    pub fn into_result(self) -> AppResult<Self> {
        if !self.has_failures() {
            return Ok(self);
        }
        let failed: Vec<String> = self
            .failures()
            .map(|a| match &a.outcome {
                AirportOutcome::Failed(message) => format!("{}: {}", a.airport, message),
                _ => a.airport.clone(),
            })
            .collect();
        Err(AppError::internal(format!(
            "run {} for {} failed for {} airport(s): {}",
            self.run_id,
            iso_date(self.date),
            failed.len(),
            failed.join("; ")
        )))
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} airport(s) for {}: {} sent, {} skipped, {} failed",
            self.airports.len(),
            iso_date(self.date),
            self.sent(),
            self.airports
                .iter()
                .filter(|a| a.outcome == AirportOutcome::SkippedEmpty)
                .count(),
            self.failures().count()
        )
    }
}

pub fn report_subject(count: usize, label: &str, date: NaiveDate) -> String {
    format!("{count} {label} Spot Saver Flights for {}", iso_date(date))
}

pub fn report_body(count: usize, label: &str, date: NaiveDate, generated_at: &str) -> String {
    format!(
        "The attached file contains {count} flights that are eligible for {label} Spot Saver on {}.\n\
         This file was generated at {generated_at}, by spot-saver - Version {}",
        iso_date(date),
        env!("CARGO_PKG_VERSION")
    )
}

pub struct JobRunner {
    authenticator: Arc<dyn Authenticator>,
    fetcher: Arc<dyn ScheduleFetcher>,
    notifier: Arc<dyn Notifier>,
    filter: EligibilityFilter,
    credential: Credential,
    airports: Vec<Airport>,
    to: Vec<Recipient>,
    cc: Vec<Recipient>,
    report: ReportConfig,
    tz: Tz,
    day_offset: i64,
}

impl JobRunner {
    pub fn new(
        config: &Config,
        authenticator: Arc<dyn Authenticator>,
        fetcher: Arc<dyn ScheduleFetcher>,
        notifier: Arc<dyn Notifier>,
    ) -> AppResult<Self> {
        Ok(Self {
            authenticator,
            fetcher,
            notifier,
            filter: EligibilityFilter::from_config(&config.eligibility),
            credential: config.api.credential(),
            airports: config.airports.clone(),
            to: config.email.to_recipients(),
            cc: config.email.cc_recipients(),
            report: config.report.clone(),
            tz: config.schedule.tz()?,
            day_offset: config.schedule.day_offset,
        })
    }

    pub fn timezone(&self) -> Tz {
        self.tz
    }

    /// Schedule date for a run started at `now`: the local date plus the offset
    pub fn target_date(&self, now: DateTime<Utc>) -> AppResult<NaiveDate> {
        schedule_date(&now.with_timezone(&self.tz), self.day_offset).ok_or_else(|| {
            AppError::internal(format!(
                "day offset {} from {} is out of range",
                self.day_offset, now
            ))
        })
    }

    /// Run every airport for `date` and collect the outcomes
    pub async fn run(&self, date: NaiveDate) -> RunSummary {
        let run_id = Uuid::new_v4();
        let span = info_span!("run", run_id = %run_id, date = %iso_date(date));
        async move {
            info!(
                "Starting Spot Saver run for {} ({} airport(s))",
                iso_date(date),
                self.airports.len().max(1)
            );

            let scopes: Vec<Option<&Airport>> = if self.airports.is_empty() {
                vec![None]
            } else {
                self.airports.iter().map(Some).collect()
            };

            let mut airports = Vec::with_capacity(scopes.len());
            for airport in scopes {
                let label = self.label(airport).to_string();
                let mut report = AirportReport {
                    airport: label.clone(),
                    fetched: 0,
                    eligible: 0,
                    outcome: AirportOutcome::SkippedEmpty,
                };

                let result = self
                    .run_airport(date, airport, &mut report)
                    .instrument(info_span!("airport", code = %label))
                    .await;

                report.outcome = match result {
                    Ok(outcome) => outcome,
                    Err(e) => {
                        error!("Spot Saver run for {} failed: {}", label, e);
                        AirportOutcome::Failed(e.to_string())
                    }
                };
                airports.push(report);
            }

            let summary = RunSummary {
                run_id,
                date,
                airports,
            };
            if summary.has_failures() {
                warn!("Run finished with failures: {}", summary);
            } else {
                info!("Run finished: {}", summary);
            }
            summary
        }
        .instrument(span)
        .await
    }

    fn label<'a>(&'a self, airport: Option<&'a Airport>) -> &'a str {
        airport.map_or(self.report.label.as_str(), |a| a.code.as_str())
    }

    async fn run_airport(
        &self,
        date: NaiveDate,
        airport: Option<&Airport>,
        report: &mut AirportReport,
    ) -> AppResult<AirportOutcome> {
        let token = self.authenticator.authenticate(&self.credential).await?;

        let request = ScheduleRequest::new(date, airport.map(|a| a.code.clone()));
        let flights = self.fetcher.fetch_schedule(&token, &request).await?;
        report.fetched = flights.len();
        info!("{} flights retrieved for {}", flights.len(), iso_date(date));

        let flights = if self.report.eligible_only {
            self.filter.filter_eligible(flights)
        } else {
            flights
        };
        let flights = match airport {
            Some(airport) => filter_hour_window(flights, airport),
            None => flights,
        };
        report.eligible = flights.len();
        info!("{} are eligible", flights.len());

        if flights.is_empty() && !self.report.send_empty {
            info!("No eligible flights for {}, skipping email", report.airport);
            return Ok(AirportOutcome::SkippedEmpty);
        }

        let label = self.label(airport);
        let attachment = build_report(&flights, date, label)?;
        let generated_at = Utc::now()
            .with_timezone(&self.tz)
            .format(GENERATED_AT_FORMAT)
            .to_string();
        let email = ReportEmail {
            to: self.to.clone(),
            cc: self.cc.clone(),
            subject: report_subject(flights.len(), label, date),
            body: report_body(flights.len(), label, date, &generated_at),
            report: attachment,
        };

        let receipt = self.notifier.send_report(&email).await?;
        info!(
            "Sent {} to {} recipient(s), status {}",
            email.report.filename,
            email.to.len(),
            receipt.status
        );
        Ok(AirportOutcome::Sent(receipt))
    }
}
