// ── Campaign trigger ──
//
// Mautic only runs campaign events when its console is kicked. We rebuild
// segment membership and campaign audiences once, then run the trigger
// command until it reports an empty queue or the attempts run out.

use std::future::Future;
use std::time::Duration;

use serde::Serialize;
use tracing::{info, warn};

use climasync_api::{Console, ConsoleOutput};

use crate::error::CoreError;
use crate::settings::ConsoleConfig;

pub const SEGMENTS_UPDATE: &str = "mautic:segments:update";
pub const CAMPAIGNS_UPDATE: &str = "mautic:campaigns:update";
pub const CAMPAIGNS_TRIGGER: &str = "mautic:campaigns:trigger";

/// Something that can run a Mautic console command.
pub trait ConsoleRunner {
    fn execute(&self, command: &str) -> impl Future<Output = Result<ConsoleOutput, CoreError>> + Send;
}

impl ConsoleRunner for Console {
    async fn execute(&self, command: &str) -> Result<ConsoleOutput, CoreError> {
        Ok(self.run(command).await?)
    }
}

/// Console launcher described by `config`.
pub fn console(config: &ConsoleConfig) -> Console {
    Console::new(config.program.clone(), config.args.clone())
}

/// Bounded retry for the trigger command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub delay: Duration,
    /// Output text meaning nothing is left to trigger.
    pub sentinel: String,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from(&ConsoleConfig::default())
    }
}

impl From<&ConsoleConfig> for RetryPolicy {
    fn from(config: &ConsoleConfig) -> Self {
        Self {
            max_attempts: config.max_attempts,
            delay: config.delay,
            sentinel: config.sentinel.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TriggerReport {
    /// Trigger runs performed.
    pub attempts: u32,
    /// Whether the sentinel was seen.
    pub drained: bool,
    /// Console invocations that failed (including the update steps).
    pub failures: u32,
}

async fn run_logged<C: ConsoleRunner + Sync>(console: &C, command: &str) -> Option<String> {
    match console.execute(command).await {
        Ok(output) => {
            info!(command, "console command finished");
            Some(output.stdout)
        }
        Err(e) => {
            warn!(command, error = %e, "console command failed");
            None
        }
    }
}

/// Refresh segments and campaigns, then trigger with bounded retries.
///
/// Always completes; failures are logged and counted.
pub async fn trigger_campaigns<C>(console: &C, policy: &RetryPolicy) -> TriggerReport
where
    C: ConsoleRunner + Sync,
{
    let mut report = TriggerReport::default();

    info!("updating segments");
    if run_logged(console, SEGMENTS_UPDATE).await.is_none() {
        report.failures += 1;
    }
    info!("updating campaigns");
    if run_logged(console, CAMPAIGNS_UPDATE).await.is_none() {
        report.failures += 1;
    }

    for attempt in 1..=policy.max_attempts {
        info!(attempt, max = policy.max_attempts, "triggering campaigns");
        report.attempts = attempt;

        match run_logged(console, CAMPAIGNS_TRIGGER).await {
            Some(out) if out.contains(&policy.sentinel) => {
                info!("no campaigns left to trigger");
                report.drained = true;
                break;
            }
            Some(_) => {}
            None => report.failures += 1,
        }

        if attempt < policy.max_attempts {
            info!(delay_secs = policy.delay.as_secs(), "waiting before next attempt");
            tokio::time::sleep(policy.delay).await;
        }
    }

    info!(attempts = report.attempts, drained = report.drained, "campaign trigger finished");
    report
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Mutex;

    use pretty_assertions::assert_eq;
    use tokio::time::Instant;

    use super::*;

    /// Records commands; trigger output is taken from a script.
    struct Scripted {
        calls: Mutex<Vec<String>>,
        trigger_outputs: Mutex<Vec<Result<String, ()>>>,
    }

    impl Scripted {
        fn new(outputs: Vec<Result<&str, ()>>) -> Self {
            Self {
                calls: Mutex::new(Vec::new()),
                trigger_outputs: Mutex::new(
                    outputs.into_iter().rev().map(|o| o.map(str::to_owned)).collect(),
                ),
            }
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl ConsoleRunner for Scripted {
        async fn execute(&self, command: &str) -> Result<ConsoleOutput, CoreError> {
            self.calls.lock().unwrap().push(command.to_owned());
            let next = if command == CAMPAIGNS_TRIGGER {
                self.trigger_outputs
                    .lock()
                    .unwrap()
                    .pop()
                    .unwrap_or_else(|| Ok(String::new()))
            } else {
                Ok("done".to_owned())
            };
            next.map(|stdout| ConsoleOutput {
                code: Some(0),
                stdout,
                stderr: String::new(),
            })
            .map_err(|()| CoreError::Console {
                command: command.to_owned(),
                message: "exit 1".into(),
            })
        }
    }

    fn policy() -> RetryPolicy {
        RetryPolicy {
            max_attempts: 3,
            delay: Duration::from_secs(10),
            sentinel: "No campaigns to trigger".into(),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn exhausts_attempts_with_delays_between() {
        let console = Scripted::new(vec![Ok("1 triggered"), Ok("2 triggered"), Ok("busy")]);
        let started = Instant::now();

        let report = trigger_campaigns(&console, &policy()).await;

        assert_eq!(
            console.calls(),
            vec![
                SEGMENTS_UPDATE,
                CAMPAIGNS_UPDATE,
                CAMPAIGNS_TRIGGER,
                CAMPAIGNS_TRIGGER,
                CAMPAIGNS_TRIGGER
            ]
        );
        assert_eq!(report.attempts, 3);
        assert!(!report.drained);
        // two sleeps, none after the last attempt
        assert_eq!(started.elapsed(), Duration::from_secs(20));
    }

    #[tokio::test(start_paused = true)]
    async fn stops_at_sentinel() {
        let console = Scripted::new(vec![Ok("triggered 4"), Ok("No campaigns to trigger")]);
        let started = Instant::now();

        let report = trigger_campaigns(&console, &policy()).await;

        assert_eq!(report.attempts, 2);
        assert!(report.drained);
        assert_eq!(started.elapsed(), Duration::from_secs(10));
    }

    #[tokio::test(start_paused = true)]
    async fn failed_runs_are_retried_and_counted() {
        let console = Scripted::new(vec![Err(()), Ok("No campaigns to trigger")]);

        let report = trigger_campaigns(&console, &policy()).await;

        assert_eq!(report.attempts, 2);
        assert_eq!(report.failures, 1);
        assert!(report.drained);
    }

    #[test]
    fn policy_from_console_config() {
        let p = RetryPolicy::default();
        assert_eq!(p.max_attempts, 3);
        assert_eq!(p.delay, Duration::from_secs(10));
        assert_eq!(p.sentinel, "No campaigns to trigger");
    }
}
