//! In-memory fakes of the port traits, shared across service tests

use async_trait::async_trait;
use chrono::Weekday;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use vip_core::entities::{LookupOutcome, Member, TrackedAccount};
use vip_core::error::DomainError;
use vip_core::traits::{
    AffiliateLookup, MemberRepository, MessageFormat, MessagingGateway, MetaRepository, Recipient,
    RepoResult, TrackedAccountRepository,
};
use vip_core::value_objects::{AccountId, GroupId, ParticipantId};

use crate::services::{GateSettings, ServiceContext};

/// In-memory membership store
#[derive(Default)]
pub struct InMemoryMembers {
    rows: Mutex<HashMap<i64, Member>>,
}

impl InMemoryMembers {
    pub fn with(members: Vec<Member>) -> Self {
        let rows = members
            .into_iter()
            .map(|m| (m.participant_id.into_inner(), m))
            .collect();
        Self {
            rows: Mutex::new(rows),
        }
    }
}

#[async_trait]
impl MemberRepository for InMemoryMembers {
    async fn find(&self, id: ParticipantId) -> RepoResult<Option<Member>> {
        Ok(self.rows.lock().unwrap().get(&id.into_inner()).cloned())
    }

    async fn upsert(&self, member: &Member) -> RepoResult<()> {
        self.rows
            .lock()
            .unwrap()
            .insert(member.participant_id.into_inner(), member.clone());
        Ok(())
    }

    async fn list_active(&self) -> RepoResult<Vec<Member>> {
        let mut active: Vec<Member> = self
            .rows
            .lock()
            .unwrap()
            .values()
            .filter(|m| m.membership_active)
            .cloned()
            .collect();
        active.sort_by_key(|m| m.participant_id);
        Ok(active)
    }

    async fn count_active(&self) -> RepoResult<i64> {
        Ok(self.list_active().await?.len() as i64)
    }
}

/// In-memory tracked account table
#[derive(Default)]
pub struct InMemoryTracked {
    rows: Mutex<HashMap<String, TrackedAccount>>,
}

#[async_trait]
impl TrackedAccountRepository for InMemoryTracked {
    async fn add(&self, account: &TrackedAccount) -> RepoResult<()> {
        self.rows
            .lock()
            .unwrap()
            .entry(account.account_id.as_str().to_string())
            .or_insert_with(|| account.clone());
        Ok(())
    }

    async fn list(&self) -> RepoResult<Vec<TrackedAccount>> {
        let mut all: Vec<TrackedAccount> = self.rows.lock().unwrap().values().cloned().collect();
        all.sort_by(|a, b| a.account_id.as_str().cmp(b.account_id.as_str()));
        Ok(all)
    }

    async fn count(&self) -> RepoResult<i64> {
        Ok(self.rows.lock().unwrap().len() as i64)
    }
}

/// In-memory meta table
#[derive(Default)]
pub struct InMemoryMeta {
    rows: Mutex<HashMap<String, String>>,
}

#[async_trait]
impl MetaRepository for InMemoryMeta {
    async fn get(&self, key: &str) -> RepoResult<Option<String>> {
        Ok(self.rows.lock().unwrap().get(key).cloned())
    }

    async fn put(&self, key: &str, value: &str) -> RepoResult<()> {
        self.rows
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Scripted affiliate lookup keyed by account id.
///
/// Each account has a queue of responses; the last response is repeated once
/// the queue is down to one entry, so steady-state answers need a single
/// script line.
#[derive(Default)]
pub struct ScriptedLookup {
    scripts: Mutex<HashMap<String, Vec<Result<LookupOutcome, DomainError>>>>,
    calls: AtomicUsize,
}

impl ScriptedLookup {
    pub fn script(&self, account_id: &str, response: Result<LookupOutcome, DomainError>) {
        self.scripts
            .lock()
            .unwrap()
            .entry(account_id.to_string())
            .or_default()
            .push(response);
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AffiliateLookup for ScriptedLookup {
    async fn fetch_detail(&self, account_id: &AccountId) -> Result<LookupOutcome, DomainError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let mut scripts = self.scripts.lock().unwrap();
        let queue = scripts
            .get_mut(account_id.as_str())
            .unwrap_or_else(|| panic!("no script for account {account_id}"));
        let response = if queue.len() > 1 {
            queue.remove(0)
        } else {
            clone_response(&queue[0])
        };
        response
    }
}

fn clone_response(
    response: &Result<LookupOutcome, DomainError>,
) -> Result<LookupOutcome, DomainError> {
    match response {
        Ok(outcome) => Ok(outcome.clone()),
        Err(DomainError::LookupFailed(msg)) => Err(DomainError::LookupFailed(msg.clone())),
        Err(e) => Err(DomainError::InternalError(e.to_string())),
    }
}

/// Recording messaging gateway with switchable failure injection
#[derive(Default)]
pub struct RecordingGateway {
    pub sent: Mutex<Vec<(Recipient, String)>>,
    pub approved: Mutex<Vec<ParticipantId>>,
    pub banned: Mutex<Vec<ParticipantId>>,
    pub fail_approve: std::sync::atomic::AtomicBool,
    pub fail_sends: std::sync::atomic::AtomicBool,
}

impl RecordingGateway {
    pub fn messages_to(&self, recipient: Recipient) -> Vec<String> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .filter(|(r, _)| *r == recipient)
            .map(|(_, text)| text.clone())
            .collect()
    }

    pub fn ban_count(&self) -> usize {
        self.banned.lock().unwrap().len()
    }
}

#[async_trait]
impl MessagingGateway for RecordingGateway {
    async fn send_message(
        &self,
        recipient: Recipient,
        text: &str,
        _format: MessageFormat,
    ) -> Result<(), DomainError> {
        if self.fail_sends.load(Ordering::SeqCst) {
            return Err(DomainError::DeliveryFailed("send rejected".into()));
        }
        self.sent
            .lock()
            .unwrap()
            .push((recipient, text.to_string()));
        Ok(())
    }

    async fn approve_join_request(
        &self,
        _group: GroupId,
        participant: ParticipantId,
    ) -> Result<(), DomainError> {
        if self.fail_approve.load(Ordering::SeqCst) {
            return Err(DomainError::DeliveryFailed("approve rejected".into()));
        }
        self.approved.lock().unwrap().push(participant);
        Ok(())
    }

    async fn ban_member(
        &self,
        _group: GroupId,
        participant: ParticipantId,
    ) -> Result<(), DomainError> {
        self.banned.lock().unwrap().push(participant);
        Ok(())
    }
}

/// Default settings used by service tests
pub fn test_settings() -> GateSettings {
    GateSettings {
        group_id: GroupId::new(900),
        bypass_code: "00000000010101010".to_string(),
        qualifying_tier: "2".to_string(),
        admin_ids: vec![ParticipantId::new(1), ParticipantId::new(2)],
        weekly_weekday: Weekday::Sun,
        weekly_hour: 21,
        monthly_day: 1,
        lookup_concurrency: 4,
    }
}

/// Assemble a service context over the given fakes
pub fn test_context(
    members: Arc<InMemoryMembers>,
    tracked: Arc<InMemoryTracked>,
    meta: Arc<InMemoryMeta>,
    lookup: Arc<ScriptedLookup>,
    gateway: Arc<RecordingGateway>,
) -> Arc<ServiceContext> {
    Arc::new(ServiceContext::new(
        members,
        tracked,
        meta,
        lookup,
        gateway,
        test_settings(),
    ))
}
