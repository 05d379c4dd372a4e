//! Long-running video job tracking.
//!
//! A job moves `Submitted → Polling → Ready | Failed`. Polls are spaced with
//! exponential backoff and stop after a fixed number of attempts.

use std::future::Future;
use std::time::Duration;

use auditros_core::config::VideoPollSettings;
use auditros_core::generation::GenerationError;

/// Backoff policy for operation polling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VideoPollPolicy {
    pub initial_interval: Duration,
    pub max_interval: Duration,
    pub max_attempts: u32,
}

impl Default for VideoPollPolicy {
    fn default() -> Self {
        Self::from(&VideoPollSettings::default())
    }
}

impl From<&VideoPollSettings> for VideoPollPolicy {
    fn from(settings: &VideoPollSettings) -> Self {
        Self {
            initial_interval: Duration::from_secs(settings.initial_interval_secs),
            max_interval: Duration::from_secs(settings.max_interval_secs),
            max_attempts: settings.max_attempts,
        }
    }
}

impl VideoPollPolicy {
    /// Wait before poll number `attempt` (1-based): the initial interval
    /// doubled per previous attempt, capped at `max_interval`.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(16);
        self.initial_interval
            .saturating_mul(1u32 << exponent)
            .min(self.max_interval)
    }
}

/// What one poll of the operation reported.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OperationStatus {
    Pending,
    Done { uri: String },
    Error { message: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VideoJobState {
    Submitted { operation: String },
    Polling { operation: String, attempt: u32 },
    Ready { uri: String },
    Failed { reason: String },
}

impl VideoJobState {
    pub fn submitted(operation: impl Into<String>) -> Self {
        Self::Submitted {
            operation: operation.into(),
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Ready { .. } | Self::Failed { .. })
    }

    /// Applies a poll result. Terminal states ignore further input.
    pub fn advance(self, status: OperationStatus) -> Self {
        let (operation, attempt) = match self {
            Self::Submitted { operation } => (operation, 0),
            Self::Polling { operation, attempt } => (operation, attempt),
            terminal => return terminal,
        };

        match status {
            OperationStatus::Pending => Self::Polling {
                operation,
                attempt: attempt + 1,
            },
            OperationStatus::Done { uri } => Self::Ready { uri },
            OperationStatus::Error { message } => Self::Failed { reason: message },
        }
    }

    /// Polls already made.
    fn attempts(&self) -> u32 {
        match self {
            Self::Polling { attempt, .. } => *attempt,
            _ => 0,
        }
    }
}

/// Drives a submitted job to a terminal state.
///
/// `poll` is called with the operation name and reports its status. Returns
/// the media URI, `VideoFailed` when the job reports an error, or
/// `VideoTimedOut` once `max_attempts` polls came back pending.
pub async fn drive_video_job<F, Fut>(
    operation: String,
    policy: VideoPollPolicy,
    mut poll: F,
) -> Result<String, GenerationError>
where
    F: FnMut(String) -> Fut,
    Fut: Future<Output = Result<OperationStatus, GenerationError>>,
{
    let mut state = VideoJobState::submitted(operation);

    loop {
        let operation = match &state {
            VideoJobState::Ready { uri } => return Ok(uri.clone()),
            VideoJobState::Failed { reason } => {
                return Err(GenerationError::VideoFailed(reason.clone()));
            }
            VideoJobState::Submitted { operation } | VideoJobState::Polling { operation, .. } => {
                operation.clone()
            }
        };

        let attempt = state.attempts() + 1;
        if attempt > policy.max_attempts {
            tracing::warn!(
                "[VideoJob] {} still pending after {} polls",
                operation,
                policy.max_attempts
            );
            return Err(GenerationError::VideoTimedOut {
                attempts: policy.max_attempts,
            });
        }

        tokio::time::sleep(policy.delay_for(attempt)).await;
        tracing::debug!("[VideoJob] Poll {} for {}", attempt, operation);

        let status = poll(operation).await?;
        state = state.advance(status);
    }
}
