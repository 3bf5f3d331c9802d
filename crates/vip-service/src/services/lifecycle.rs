//! Lifecycle scheduler - arms and executes the day 10/20/30/58 checkpoints
//!
//! Checkpoints are held only as in-process timers; the durable input is the
//! member's `joined_at`, from which [`rearm_all`](LifecycleScheduler::rearm_all)
//! recomputes the remaining offsets on every process start. A checkpoint
//! resolves the member row and the affiliate figures at fire time, never from
//! a snapshot captured when it was armed.

use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

use vip_core::entities::{
    pending_checkpoints, AffiliateInfo, CheckpointKind, LookupOutcome, ScheduledCheckpoint,
    MONTH_ONE_TARGET, MONTH_TWO_TARGET,
};
use vip_core::value_objects::ParticipantId;
use vip_core::{MessageFormat, Recipient};

use super::context::ServiceContext;
use super::error::ServiceResult;

/// Schedules and executes per-member lifecycle checkpoints
pub struct LifecycleScheduler {
    ctx: Arc<ServiceContext>,
}

impl LifecycleScheduler {
    pub fn new(ctx: Arc<ServiceContext>) -> Arc<Self> {
        Arc::new(Self { ctx })
    }

    /// Arm the checkpoints still ahead for a member admitted at `joined_at`.
    ///
    /// Offsets already strictly in the past are skipped, so re-arming after
    /// downtime never fires stale checkpoints retroactively. Returns the
    /// checkpoints that were armed.
    pub fn arm(
        self: &Arc<Self>,
        participant_id: ParticipantId,
        joined_at: DateTime<Utc>,
    ) -> Vec<ScheduledCheckpoint> {
        let pending = pending_checkpoints(participant_id, joined_at, Utc::now());
        for checkpoint in &pending {
            let this = Arc::clone(self);
            let cp = *checkpoint;
            tokio::spawn(async move {
                let delay = (cp.fire_at - Utc::now()).to_std().unwrap_or_default();
                tokio::time::sleep(delay).await;
                if let Err(e) = this.run_checkpoint(cp.participant_id, cp.kind).await {
                    warn!(
                        participant_id = %cp.participant_id,
                        checkpoint = %cp.kind,
                        error = %e,
                        "checkpoint execution failed"
                    );
                }
            });
        }
        debug!(
            participant_id = %participant_id,
            armed = pending.len(),
            "checkpoints armed"
        );
        pending
    }

    /// Re-arm checkpoints for every measurable active member.
    ///
    /// Called once at startup. Returns the total number of checkpoints armed.
    #[instrument(skip(self))]
    pub async fn rearm_all(self: &Arc<Self>) -> ServiceResult<usize> {
        let members = self.ctx.member_repo().list_active().await?;
        let mut armed = 0;
        for member in &members {
            if !member.is_measurable() {
                continue;
            }
            if let Some(joined_at) = member.joined_at {
                armed += self.arm(member.participant_id, joined_at).len();
            }
        }
        info!(members = members.len(), checkpoints = armed, "scheduler re-armed");
        Ok(armed)
    }

    /// Execute one checkpoint against the current state of the world.
    ///
    /// No-ops when the member has left, was removed, or is unmeasured
    /// (bypass admission). A transient lookup failure skips the checkpoint
    /// silently; the next one retries naturally.
    #[instrument(skip(self), fields(participant_id = %participant_id, checkpoint = %kind))]
    pub async fn run_checkpoint(
        &self,
        participant_id: ParticipantId,
        kind: CheckpointKind,
    ) -> ServiceResult<()> {
        let lock = self.ctx.participant_lock(participant_id);
        let _guard = lock.lock().await;

        let Some(mut member) = self.ctx.member_repo().find(participant_id).await? else {
            debug!("member row gone, checkpoint dropped");
            return Ok(());
        };
        if !member.is_measurable() {
            debug!("member inactive or unmeasured, checkpoint dropped");
            return Ok(());
        }
        // is_measurable guarantees the linkage is present
        let Some(account) = member.external_account_id.clone() else {
            return Ok(());
        };

        let outcome = match self.ctx.lookup().fetch_detail(&account).await {
            Ok(outcome) => outcome,
            Err(e) if e.is_transient() => {
                warn!(error = %e, "lookup unavailable, checkpoint skipped");
                return Ok(());
            }
            Err(e) => return Err(e.into()),
        };
        let info = match outcome {
            LookupOutcome::Found(info) => info,
            LookupOutcome::NotFound => {
                warn!(account_id = %account, "account no longer recognized, checkpoint skipped");
                return Ok(());
            }
        };

        let recipient = Recipient::Participant(participant_id);
        match kind {
            CheckpointKind::Day10 | CheckpointKind::Day20 => {
                let text = progress_text(kind, &info);
                self.notify(recipient, &text).await;
            }
            CheckpointKind::Day30 => {
                let text = if info.monthly_volume < MONTH_ONE_TARGET {
                    month_one_warning(&info)
                } else {
                    month_one_passed(&info)
                };
                self.notify(recipient, &text).await;
            }
            CheckpointKind::Day58 => {
                if info.monthly_volume < MONTH_TWO_TARGET {
                    // The warning is best-effort; the expulsion is not
                    self.notify(recipient, &final_warning(&info)).await;
                    self.ctx
                        .gateway()
                        .ban_member(self.ctx.settings().group_id, participant_id)
                        .await?;
                    member.remove(Utc::now());
                    self.ctx.member_repo().upsert(&member).await?;
                    info!(
                        volume = info.monthly_volume,
                        "member removed at day-58 checkpoint"
                    );
                } else {
                    self.notify(recipient, &final_passed(&info)).await;
                }
            }
        }
        Ok(())
    }

    async fn notify(&self, recipient: Recipient, text: &str) {
        if let Err(e) = self
            .ctx
            .gateway()
            .send_message(recipient, text, MessageFormat::Plain)
            .await
        {
            warn!(error = %e, "checkpoint notification undeliverable");
        }
    }
}

fn progress_text(kind: CheckpointKind, info: &AffiliateInfo) -> String {
    format!(
        "Day {} check-in: your trading volume this month is ${:.2}. \
         The month-one target is ${:.0}.",
        kind.offset_days(),
        info.monthly_volume,
        MONTH_ONE_TARGET
    )
}

fn month_one_warning(info: &AffiliateInfo) -> String {
    format!(
        "Day 30 review: your volume of ${:.2} is below the ${:.0} month-one target. \
         Reach ${:.0} during month two to keep your seat.",
        info.monthly_volume, MONTH_ONE_TARGET, MONTH_TWO_TARGET
    )
}

fn month_one_passed(info: &AffiliateInfo) -> String {
    format!(
        "Day 30 review passed: ${:.2} traded this month. \
         Keep it up - the month-two target is ${:.0}.",
        info.monthly_volume, MONTH_TWO_TARGET
    )
}

fn final_warning(info: &AffiliateInfo) -> String {
    format!(
        "Day 58 review: your volume of ${:.2} is below the ${:.0} requirement, \
         so your membership is being ended. You are welcome to re-apply once \
         your volume recovers.",
        info.monthly_volume, MONTH_TWO_TARGET
    )
}

fn final_passed(info: &AffiliateInfo) -> String {
    format!(
        "Day 58 review passed with ${:.2} traded this month. \
         Your membership is confirmed.",
        info.monthly_volume
    )
}
