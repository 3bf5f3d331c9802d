//! Admin commands - operator interface over private messages
//!
//! Commands are only honored from configured admin ids; anything else falls
//! through to the admission flow untouched.

use chrono::Utc;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{info, instrument};

use vip_core::entities::{TrackedAccount, TrackedSource};
use vip_core::value_objects::{AccountId, ParticipantId};
use vip_core::{MessageFormat, Recipient};

use super::context::ServiceContext;
use super::error::ServiceResult;

const TRACK_USAGE_TEXT: &str = "Usage: /track <numeric account id>";

/// Handles operator commands sent as private text
pub struct AdminCommands {
    ctx: Arc<ServiceContext>,
}

impl AdminCommands {
    pub fn new(ctx: Arc<ServiceContext>) -> Self {
        Self { ctx }
    }

    /// Try to interpret `text` as an admin command.
    ///
    /// Returns `Ok(true)` when the message was consumed (including usage
    /// errors), `Ok(false)` when it is not an admin command and should fall
    /// through to the admission flow.
    #[instrument(skip(self, text), fields(participant_id = %participant_id))]
    pub async fn try_handle(
        &self,
        participant_id: ParticipantId,
        text: &str,
    ) -> ServiceResult<bool> {
        if !self.ctx.is_admin(participant_id) {
            return Ok(false);
        }
        let text = text.trim();

        if let Some(arg) = text.strip_prefix("/track") {
            if !arg.is_empty() && !arg.starts_with(' ') {
                // Some other command sharing the prefix
                return Ok(false);
            }
            self.track(participant_id, arg.trim()).await?;
            return Ok(true);
        }
        if text == "/stats" {
            self.stats(participant_id).await?;
            return Ok(true);
        }
        Ok(false)
    }

    async fn track(&self, admin: ParticipantId, arg: &str) -> ServiceResult<()> {
        let account = match AccountId::parse(arg) {
            Ok(account) => account,
            Err(_) => return self.reply(admin, TRACK_USAGE_TEXT).await,
        };
        let tracked = TrackedAccount::new(account.clone(), TrackedSource::Manual, Utc::now());
        self.ctx.tracked_repo().add(&tracked).await?;
        info!(account_id = %account, "account tracked by admin");
        self.reply(admin, &format!("Now tracking account {account}."))
            .await
    }

    async fn stats(&self, admin: ParticipantId) -> ServiceResult<()> {
        let active = self.ctx.member_repo().count_active().await?;
        let tracked = self.ctx.tracked_repo().list().await?;

        let mut union: HashSet<String> = self
            .ctx
            .member_repo()
            .list_active()
            .await?
            .into_iter()
            .filter_map(|m| m.external_account_id)
            .map(|a| a.as_str().to_string())
            .collect();
        for account in &tracked {
            union.insert(account.account_id.as_str().to_string());
        }

        let text = format!(
            "Active members: {active}\nTracked accounts: {}\nAccounts in scope: {}",
            tracked.len(),
            union.len()
        );
        self.reply(admin, &text).await
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
