use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::debug;

use crate::errors::{AppError, AppResult};

/// Server-wide limit on how often an upload may start.
///
/// The check and the update of the last admission time happen under one
/// lock, so two concurrent requests can never both pass for the same slot.
/// Admission is recorded before any processing, so attempts that later fail
/// validation still consume the slot.
#[derive(Debug)]
pub struct AdmissionGate {
    min_delay: Duration,
    last_accepted: Mutex<Option<Instant>>,
}

impl AdmissionGate {
    pub fn new(min_delay: Duration) -> Self {
        Self {
            min_delay,
            last_accepted: Mutex::new(None),
        }
    }

    pub async fn try_admit(&self) -> AppResult<()> {
        let mut last_accepted = self.last_accepted.lock().await;
        let now = Instant::now();

        if let Some(previous) = *last_accepted {
            let elapsed = now.saturating_duration_since(previous);
            if elapsed < self.min_delay {
                let retry_after = self.min_delay - elapsed;
                debug!("Rejecting upload, next slot in {:?}", retry_after);
                return Err(AppError::RateLimited { retry_after });
            }
        }

        *last_accepted = Some(now);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_first_request_is_admitted() {
        let gate = AdmissionGate::new(Duration::from_secs(5));
        assert!(gate.try_admit().await.is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn test_rejects_within_delay() {
        let gate = AdmissionGate::new(Duration::from_secs(5));
        gate.try_admit().await.unwrap();

        tokio::time::advance(Duration::from_secs(2)).await;
        match gate.try_admit().await {
            Err(AppError::RateLimited { retry_after }) => {
                assert_eq!(retry_after, Duration::from_secs(3));
            }
            other => panic!("expected RateLimited, got {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_rejection_does_not_reset_window() {
        let gate = AdmissionGate::new(Duration::from_secs(5));
        gate.try_admit().await.unwrap();

        tokio::time::advance(Duration::from_secs(4)).await;
        assert!(gate.try_admit().await.is_err());

        tokio::time::advance(Duration::from_secs(1)).await;
        assert!(gate.try_admit().await.is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_delay_admits_everything() {
        let gate = AdmissionGate::new(Duration::ZERO);
        for _ in 0..3 {
            assert!(gate.try_admit().await.is_ok());
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_requests_admit_exactly_one() {
        let gate = std::sync::Arc::new(AdmissionGate::new(Duration::from_secs(60)));
        let mut handles = Vec::new();
        for _ in 0..16 {
            let gate = gate.clone();
            handles.push(tokio::spawn(async move { gate.try_admit().await.is_ok() }));
        }

        let mut admitted = 0;
        for handle in handles {
            if handle.await.unwrap() {
                admitted += 1;
            }
        }
        assert_eq!(admitted, 1);
    }
}
