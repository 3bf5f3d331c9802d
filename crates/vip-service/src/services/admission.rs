//! Admission controller - the interactive verification flow
//!
//! A join request creates (or refreshes) the member row and prompts for the
//! affiliate account id. A private text is then interpreted as either the
//! bypass code or an account id to verify. Approval into the group is the
//! point of no return: it happens before any state mutation, and a failed
//! approval aborts the admission entirely.

use chrono::Utc;
use std::sync::Arc;
use tracing::{info, instrument, warn};

use vip_core::entities::{AffiliateInfo, LookupOutcome, Member, MemberState, TrackedAccount, TrackedSource};
use vip_core::value_objects::{AccountId, ParticipantId};
use vip_core::{MessageFormat, Recipient};

use super::context::ServiceContext;
use super::error::ServiceResult;
use super::lifecycle::LifecycleScheduler;

const PROMPT_TEXT: &str = "Your join request was received. Reply here with the \
     numeric UID of your exchange account so we can verify it.";

const START_TEXT: &str = "Welcome! Request to join the group, then send me the \
     numeric UID of your exchange account to get verified.";

const NO_REQUEST_TEXT: &str = "I don't have a join request from you yet. Request \
     to join the group first, then send your UID here.";

const ALREADY_VERIFIED_TEXT: &str = "You are already verified and inside the group.";

const FORMAT_TEXT: &str = "That doesn't look like a UID. Please send the numeric \
     UID of your exchange account.";

const TRANSIENT_TEXT: &str = "Verification is temporarily unavailable. Please try \
     again in a few minutes.";

const REJECTED_TEXT: &str = "This UID is not eligible for the group. Make sure you \
     signed up through our referral link, then send the UID again.";

const WELCOME_DM_TEXT: &str = "You're verified - welcome aboard! Your join request \
     has been approved.";

const GROUP_WELCOME_TEXT: &str = "A new verified member just joined. Welcome!";

/// Handles join requests and verification submissions
pub struct AdmissionController {
    ctx: Arc<ServiceContext>,
    scheduler: Arc<LifecycleScheduler>,
}

impl AdmissionController {
    pub fn new(ctx: Arc<ServiceContext>, scheduler: Arc<LifecycleScheduler>) -> Self {
        Self { ctx, scheduler }
    }

    /// A participant asked to join the gated group.
    ///
    /// Records the request (idempotently) and prompts for the account id.
    /// The prompt must reach the participant or the flow is stuck, so a
    /// delivery failure propagates.
    #[instrument(skip(self), fields(participant_id = %participant_id))]
    pub async fn on_join_requested(&self, participant_id: ParticipantId) -> ServiceResult<()> {
        let lock = self.ctx.participant_lock(participant_id);
        let _guard = lock.lock().await;

        let now = Utc::now();
        let member = match self.ctx.member_repo().find(participant_id).await? {
            Some(mut member) => {
                member.record_request(now);
                member
            }
            None => Member::requested(participant_id, now),
        };
        self.ctx.member_repo().upsert(&member).await?;
        info!("join request recorded");

        self.ctx
            .gateway()
            .send_message(
                Recipient::Participant(participant_id),
                PROMPT_TEXT,
                MessageFormat::Plain,
            )
            .await?;
        Ok(())
    }

    /// A participant sent the bot a private text message.
    #[instrument(skip(self, text), fields(participant_id = %participant_id))]
    pub async fn on_private_text(
        &self,
        participant_id: ParticipantId,
        text: &str,
    ) -> ServiceResult<()> {
        let text = text.trim();
        if text == "/start" {
            return self.reply(participant_id, START_TEXT).await;
        }

        let lock = self.ctx.participant_lock(participant_id);
        let _guard = lock.lock().await;

        let Some(member) = self.ctx.member_repo().find(participant_id).await? else {
            return self.reply(participant_id, NO_REQUEST_TEXT).await;
        };
        // Re-submissions after admission are acknowledged, never re-processed
        if member.state() == MemberState::Active {
            return self.reply(participant_id, ALREADY_VERIFIED_TEXT).await;
        }

        if text == self.ctx.settings().bypass_code {
            info!("bypass code accepted");
            return self.admit(member, None, None).await;
        }

        let account = match AccountId::parse(text) {
            Ok(account) => account,
            Err(_) => {
                // Local format error: no lookup, no state change
                return self.reply(participant_id, FORMAT_TEXT).await;
            }
        };

        match self.ctx.lookup().fetch_detail(&account).await {
            Ok(LookupOutcome::Found(info))
                if info.tier == self.ctx.settings().qualifying_tier =>
            {
                self.admit(member, Some(account), Some(info)).await
            }
            // Unrecognized accounts and non-qualifying tiers get the same
            // answer; the distinction is an upstream implementation detail
            Ok(_) => self.reply(participant_id, REJECTED_TEXT).await,
            Err(e) if e.is_transient() => {
                warn!(error = %e, "verification lookup unavailable");
                self.reply(participant_id, TRANSIENT_TEXT).await
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Admit a verified (or bypassed) participant.
    ///
    /// Order matters: the join request is approved first and a failure there
    /// aborts with no state change. Welcome messages are best-effort.
    async fn admit(
        &self,
        mut member: Member,
        account: Option<AccountId>,
        info: Option<AffiliateInfo>,
    ) -> ServiceResult<()> {
        let participant_id = member.participant_id;
        let group_id = self.ctx.settings().group_id;

        self.ctx
            .gateway()
            .approve_join_request(group_id, participant_id)
            .await?;

        let now = Utc::now();
        member.admit(account.clone(), now);
        self.ctx.member_repo().upsert(&member).await?;
        info!(
            measurable = member.is_measurable(),
            volume = info.as_ref().map(|i| i.monthly_volume),
            "participant admitted"
        );

        if let Err(e) = self
            .ctx
            .gateway()
            .send_message(
                Recipient::Participant(participant_id),
                WELCOME_DM_TEXT,
                MessageFormat::Plain,
            )
            .await
        {
            warn!(error = %e, "welcome message undeliverable");
        }
        if let Err(e) = self
            .ctx
            .gateway()
            .send_message(
                Recipient::Group(group_id),
                GROUP_WELCOME_TEXT,
                MessageFormat::Plain,
            )
            .await
        {
            warn!(error = %e, "group announcement undeliverable");
        }

        if let Some(account) = account {
            let tracked = TrackedAccount::new(account, TrackedSource::Member, now);
            if let Err(e) = self.ctx.tracked_repo().add(&tracked).await {
                warn!(error = %e, "tracked-account registration failed");
            }
        }

        self.scheduler.arm(participant_id, now);
        Ok(())
    }

    async fn reply(&self, participant_id: ParticipantId, text: &str) -> ServiceResult<()> {
        self.ctx
            .gateway()
            .send_message(
                Recipient::Participant(participant_id),
                text,
                MessageFormat::Plain,
            )
            .await?;
        Ok(())
    }
}
