//! Scheduled Jobs
//!
//! Background maintenance run on a fixed interval.

use chrono::{DateTime, Utc};
use std::time::Duration;
use tokio::time::interval;

use crate::session::SessionStore;

// =========================================================================
// Expired Session Sweep
// =========================================================================

/// Drop sessions idle past their TTL so the map doesn't grow without bound
pub async fn purge_expired_sessions(sessions: &SessionStore) -> usize {
    let purged = sessions.purge_expired().await;

    if purged > 0 {
        tracing::info!(sessions_purged = purged, "Purged expired sessions");
    }

    purged
}

/// Configuration for job scheduler
#[derive(Debug, Clone)]
pub struct JobSchedulerConfig {
    /// Interval for the expired session sweep (default: 1 minute)
    pub session_sweep_interval: Duration,
}

impl Default for JobSchedulerConfig {
    fn default() -> Self {
        Self {
            session_sweep_interval: Duration::from_secs(60),
        }
    }
}

/// Job Scheduler - runs periodic maintenance tasks
pub struct JobScheduler {
    sessions: SessionStore,
    config: JobSchedulerConfig,
}

impl JobScheduler {
    pub fn new(sessions: SessionStore) -> Self {
        Self {
            sessions,
            config: JobSchedulerConfig::default(),
        }
    }

    pub fn with_config(sessions: SessionStore, config: JobSchedulerConfig) -> Self {
        Self { sessions, config }
    }

    /// Start the job scheduler in the background
    /// Returns a handle that can be used to abort the scheduler
    pub fn start(self) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            self.run().await;
        })
    }

    async fn run(&self) {
        tracing::info!(
            interval_secs = self.config.session_sweep_interval.as_secs(),
            "Job scheduler started"
        );

        let mut sweep_interval = interval(self.config.session_sweep_interval);

        loop {
            sweep_interval.tick().await;
            purge_expired_sessions(&self.sessions).await;
        }
    }

    /// Run all maintenance jobs once (for manual trigger or testing)
    pub async fn run_all_once(&self) -> MaintenanceReport {
        MaintenanceReport {
            sessions_purged: purge_expired_sessions(&self.sessions).await,
            completed_at: Utc::now(),
        }
    }
}

/// Report from running maintenance jobs
#[derive(Debug, Clone, Default)]
pub struct MaintenanceReport {
    pub sessions_purged: usize,
    pub completed_at: DateTime<Utc>,
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::SessionId;

    #[test]
    fn test_job_scheduler_config_default() {
        let config = JobSchedulerConfig::default();
        assert_eq!(config.session_sweep_interval, Duration::from_secs(60));
    }

    #[test]
    fn test_maintenance_report_default() {
        let report = MaintenanceReport::default();
        assert_eq!(report.sessions_purged, 0);
    }

    #[tokio::test]
    async fn test_run_all_once_purges_expired() {
        let sessions = SessionStore::new(Duration::from_millis(10));
        sessions.update(SessionId::generate(), |data| data.pin_attempts = 1).await;
        sessions.update(SessionId::generate(), |data| data.pin_attempts = 2).await;

        tokio::time::sleep(Duration::from_millis(30)).await;

        let scheduler = JobScheduler::new(sessions.clone());
        let report = scheduler.run_all_once().await;
        assert_eq!(report.sessions_purged, 2);
        assert!(sessions.is_empty().await);
    }

    #[tokio::test]
    async fn test_live_sessions_survive_sweep() {
        let sessions = SessionStore::new(Duration::from_secs(60));
        sessions.update(SessionId::generate(), |data| data.pin_attempts = 1).await;

        let scheduler = JobScheduler::with_config(
            sessions.clone(),
            JobSchedulerConfig {
                session_sweep_interval: Duration::from_millis(5),
            },
        );
        let handle = scheduler.start();
        tokio::time::sleep(Duration::from_millis(30)).await;
        handle.abort();

        assert_eq!(sessions.len().await, 1);
    }
}
