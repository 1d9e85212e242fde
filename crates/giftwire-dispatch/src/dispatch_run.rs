use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use tokio::time::sleep;
use tracing::{info, warn};

use giftwire_core::{chunk_message, write_text_atomic};
use giftwire_roster::ResolvedAssignment;

use crate::dispatch_outbound::{DmSendError, DmSendErrorKind, DmTransport};
use crate::message_template::render_announcement;

/// Terminal state of one assignment's delivery attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryStatus {
    Sent,
    Blocked,
    NotFound,
    Error,
}

impl DeliveryStatus {
    pub fn is_success(self) -> bool {
        matches!(self, Self::Sent)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Sent => "sent",
            Self::Blocked => "blocked",
            Self::NotFound => "not_found",
            Self::Error => "error",
        }
    }
}

/// One line of the delivery log: what happened for one assignment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryOutcome {
    pub status: DeliveryStatus,
    pub message: String,
}

#[derive(Debug, Clone)]
pub struct DispatchRunConfig {
    /// When set, resolution and composition run but nothing is transmitted;
    /// every assignment yields a synthesized success outcome.
    pub dry_run: bool,
    pub chunk_size_limit: usize,
    pub inter_chunk_delay_ms: u64,
    pub inter_recipient_delay_ms: u64,
    pub delivery_log_path: PathBuf,
}

impl Default for DispatchRunConfig {
    fn default() -> Self {
        Self {
            dry_run: false,
            chunk_size_limit: 1900,
            inter_chunk_delay_ms: 600,
            inter_recipient_delay_ms: 1200,
            delivery_log_path: PathBuf::from("dm_log.txt"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchRunReport {
    pub outcomes: Vec<DeliveryOutcome>,
    pub success_count: usize,
    pub fail_count: usize,
}

/// Sequential delivery loop.
///
/// Assignments are processed strictly in order, one at a time; the pacing
/// delays are the throttle that keeps the run inside the platform's abuse
/// limits, so parallel sends are a correctness bug here, not an
/// optimization opportunity.
pub struct DispatchRunner<T: DmTransport> {
    config: DispatchRunConfig,
    transport: T,
}

impl<T: DmTransport> DispatchRunner<T> {
    pub fn new(config: DispatchRunConfig, transport: T) -> Result<Self> {
        if config.chunk_size_limit == 0 {
            bail!("dispatch chunk size limit must be greater than 0");
        }
        Ok(Self { config, transport })
    }

    /// Delivers one assignment. Never returns an error: every failure mode
    /// becomes a classified outcome so one refused DM cannot stop the run.
    pub async fn deliver_one(&self, assignment: &ResolvedAssignment) -> DeliveryOutcome {
        let display = assignment.giver.display_name();
        let user_id = &assignment.giver.user_id;
        if self.config.dry_run {
            return DeliveryOutcome {
                status: DeliveryStatus::Sent,
                message: format!("DRY_RUN would DM {display} -> {}", assignment.target_name),
            };
        }
        match self.transmit(assignment).await {
            Ok(()) => DeliveryOutcome {
                status: DeliveryStatus::Sent,
                message: format!("Sent to {display} ({user_id})"),
            },
            Err(DmSendError { kind, detail, .. }) => {
                let (status, message) = match kind {
                    DmSendErrorKind::Blocked => (
                        DeliveryStatus::Blocked,
                        format!("DM blocked for {display} ({user_id})"),
                    ),
                    DmSendErrorKind::NotFound => (
                        DeliveryStatus::NotFound,
                        format!("User not found ({display}, id={user_id})"),
                    ),
                    DmSendErrorKind::Other => (
                        DeliveryStatus::Error,
                        format!("Error for {display} ({user_id}): {detail}"),
                    ),
                };
                DeliveryOutcome { status, message }
            }
        }
    }

    async fn transmit(&self, assignment: &ResolvedAssignment) -> Result<(), DmSendError> {
        let text = render_announcement(
            assignment.giver.display_name(),
            &assignment.target_name,
        );
        let chunks = chunk_message(&text, self.config.chunk_size_limit);
        let channel_id = self.transport.open_dm_channel(&assignment.giver.user_id).await?;
        let mut sent_any = false;
        for chunk in &chunks {
            // The chunker can emit an empty first chunk for pathological
            // input; the platform rejects empty message bodies.
            if chunk.is_empty() {
                continue;
            }
            if sent_any {
                sleep(Duration::from_millis(self.config.inter_chunk_delay_ms)).await;
            }
            self.transport.send_chunk(&channel_id, chunk).await?;
            sent_any = true;
        }
        Ok(())
    }

    /// Processes assignments strictly in order, waits the inter-recipient
    /// delay after every outcome regardless of success, then persists the
    /// ordered log and reports aggregate counts.
    pub async fn run(&self, assignments: &[ResolvedAssignment]) -> Result<DispatchRunReport> {
        let mut outcomes: Vec<DeliveryOutcome> = Vec::with_capacity(assignments.len());
        let mut success_count = 0usize;
        let mut fail_count = 0usize;
        for assignment in assignments {
            let outcome = self.deliver_one(assignment).await;
            if outcome.status.is_success() {
                success_count += 1;
                info!(status = outcome.status.as_str(), "{}", outcome.message);
            } else {
                fail_count += 1;
                warn!(status = outcome.status.as_str(), "{}", outcome.message);
            }
            outcomes.push(outcome);
            sleep(Duration::from_millis(self.config.inter_recipient_delay_ms)).await;
        }

        let log_text = outcomes
            .iter()
            .map(|outcome| outcome.message.as_str())
            .collect::<Vec<_>>()
            .join("\n");
        write_text_atomic(&self.config.delivery_log_path, &log_text)
            .context("failed to persist delivery log")?;
        info!(
            success = success_count,
            fail = fail_count,
            log = %self.config.delivery_log_path.display(),
            "dispatch complete"
        );
        Ok(DispatchRunReport {
            outcomes,
            success_count,
            fail_count,
        })
    }
}
