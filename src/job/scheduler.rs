use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use cron::Schedule;
use std::future::Future;
use tracing::{error, info, warn};

use super::JobRunner;
use crate::errors::{AppError, AppResult};
use crate::utils::cron_helper;

/// Cron-driven loop around a [`JobRunner`]
pub struct JobScheduler {
    runner: JobRunner,
    schedule: Schedule,
    cron_expression: String,
    tz: Tz,
}

impl JobScheduler {
    pub fn new(runner: JobRunner, cron_expression: &str) -> AppResult<Self> {
        let schedule = cron_helper::parse_schedule(cron_expression).map_err(AppError::configuration)?;
        let tz = runner.timezone();
        Ok(Self {
            runner,
            schedule,
            cron_expression: cron_expression.to_string(),
            tz,
        })
    }

    pub fn next_run_after(&self, now: DateTime<Utc>) -> Option<DateTime<Tz>> {
        cron_helper::next_fire_time(&self.schedule, &now.with_timezone(&self.tz))
    }

    /// Run until Ctrl-C
    pub async fn start(self) -> AppResult<()> {
        self.run_until(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!("Failed to listen for shutdown signal: {}", e);
                std::future::pending::<()>().await;
            }
        })
        .await
    }

    /// Run until `shutdown` completes
    ///
    /// Shutdown is only observed while waiting for the next fire time. A run
    /// that is already in progress finishes before the loop stops.
    pub async fn run_until<F>(self, shutdown: F) -> AppResult<()>
    where
        F: Future<Output = ()>,
    {
        info!(
            "Starting scheduler with cron '{}' in {}",
            self.cron_expression, self.tz
        );
        tokio::pin!(shutdown);

        loop {
            let now = Utc::now();
            let next = self.next_run_after(now).ok_or_else(|| {
                AppError::configuration(format!(
                    "cron expression '{}' has no upcoming fire time",
                    self.cron_expression
                ))
            })?;
            info!("Next Spot Saver run at {}", next);

            let wait = (next.with_timezone(&Utc) - now)
                .to_std()
                .unwrap_or_default();

            tokio::select! {
                _ = tokio::time::sleep(wait) => {
                    self.run_once().await;
                }
                _ = &mut shutdown => {
                    info!("Shutdown requested, stopping scheduler");
                    return Ok(());
                }
            }
        }
    }

    async fn run_once(&self) {
        let date = match self.runner.target_date(Utc::now()) {
            Ok(date) => date,
            Err(e) => {
                error!("Could not determine schedule date: {}", e);
                return;
            }
        };

        let summary = self.runner.run(date).await;
        if let Err(e) = summary.into_result() {
            warn!("Scheduled run failed, will retry at next fire time: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::errors::SourceError;
    use crate::services::notifier::MockNotifier;
    use crate::sources::traits::{MockAuthenticator, MockScheduleFetcher};
    use chrono::{TimeZone, Timelike};
    use std::sync::Arc;

    fn runner(timezone: &str) -> JobRunner {
        let mut auth = MockAuthenticator::new();
        auth.expect_authenticate().never();
        runner_with(timezone, auth)
    }

    fn runner_with(timezone: &str, auth: MockAuthenticator) -> JobRunner {
        let config = Config::from_toml_str(&format!(
            r#"
            [api]
            user = "svc"
            key = "k3y"

            [email]
            sendgrid_api_key = "SG.test"
            from_address = "spotsaver@example.com"
            to_addresses = "ops@example.com"

            [schedule]
            timezone = "{timezone}"
            "#
        ))
        .unwrap();

        JobRunner::new(
            &config,
            Arc::new(auth),
            Arc::new(MockScheduleFetcher::new()),
            Arc::new(MockNotifier::new()),
        )
        .unwrap()
    }

    #[test]
    fn test_rejects_invalid_cron() {
        let err = JobScheduler::new(runner("UTC"), "not a cron").err().unwrap();
        assert!(err.to_string().contains("Invalid cron expression"));
    }

    #[test]
    fn test_next_run_is_evaluated_in_configured_zone() {
        let scheduler = JobScheduler::new(runner("America/Los_Angeles"), "0 0 15 * * *").unwrap();
        let now = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
        let next = scheduler.next_run_after(now).unwrap();
        assert_eq!(next.hour(), 15);
        // 15:00 PDT
        assert_eq!(next.with_timezone(&Utc), Utc.with_ymd_and_hms(2024, 6, 1, 22, 0, 0).unwrap());
    }

    #[tokio::test]
    async fn test_shutdown_before_first_fire_time() {
        let scheduler = JobScheduler::new(runner("UTC"), "0 0 0 1 1 * 2099").unwrap();
        scheduler.run_until(async {}).await.unwrap();
    }

    #[tokio::test]
    async fn test_runs_on_each_fire_time_until_shutdown() {
        let mut auth = MockAuthenticator::new();
        auth.expect_authenticate()
            .times(1..=2)
            .returning(|_| Err(SourceError::authentication(Some(503), "unavailable")));

        let scheduler = JobScheduler::new(runner_with("UTC", auth), "* * * * * *").unwrap();
        scheduler
            .run_until(tokio::time::sleep(std::time::Duration::from_millis(1500)))
            .await
            .unwrap();
    }
}
