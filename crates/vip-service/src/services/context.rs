//! Service context - dependency container for services
//!
//! Holds the repositories, the (cached) affiliate lookup, the messaging
//! gateway and the engine settings, plus the per-participant locks that
//! serialize concurrent mutations of the same member row (an admission
//! racing a day-58 expulsion check must not lose updates).

use chrono::Weekday;
use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

use vip_common::config::AppConfig;
use vip_core::traits::{
    AffiliateLookup, MemberRepository, MessagingGateway, MetaRepository, TrackedAccountRepository,
};
use vip_core::value_objects::{GroupId, ParticipantId};

/// Engine settings derived from the application configuration
#[derive(Debug, Clone)]
pub struct GateSettings {
    /// The gated group
    pub group_id: GroupId,
    /// Secret code admitting a participant without verification
    pub bypass_code: String,
    /// The single tier value that qualifies for admission
    pub qualifying_tier: String,
    /// Admin command senders and fleet-report recipients
    pub admin_ids: Vec<ParticipantId>,
    /// Weekly nudge recurrence (UTC)
    pub weekly_weekday: Weekday,
    pub weekly_hour: u32,
    /// Day of month the fleet report executes
    pub monthly_day: u32,
    /// Bound on concurrent affiliate lookups in batch jobs
    pub lookup_concurrency: usize,
}

impl From<&AppConfig> for GateSettings {
    fn from(config: &AppConfig) -> Self {
        Self {
            group_id: GroupId::new(config.gateway.group_id),
            bypass_code: config.admission.bypass_code.clone(),
            qualifying_tier: config.affiliate.qualifying_tier.clone(),
            admin_ids: config
                .gateway
                .admin_ids
                .iter()
                .copied()
                .map(ParticipantId::new)
                .collect(),
            weekly_weekday: config.reports.weekly_weekday,
            weekly_hour: config.reports.weekly_hour,
            monthly_day: config.reports.monthly_day,
            lookup_concurrency: config.reports.lookup_concurrency.max(1),
        }
    }
}

/// Service context containing all dependencies
#[derive(Clone)]
pub struct ServiceContext {
    member_repo: Arc<dyn MemberRepository>,
    tracked_repo: Arc<dyn TrackedAccountRepository>,
    meta_repo: Arc<dyn MetaRepository>,
    lookup: Arc<dyn AffiliateLookup>,
    gateway: Arc<dyn MessagingGateway>,
    settings: GateSettings,
    locks: Arc<DashMap<ParticipantId, Arc<Mutex<()>>>>,
}

impl ServiceContext {
    /// Create a new service context with all dependencies
    pub fn new(
        member_repo: Arc<dyn MemberRepository>,
        tracked_repo: Arc<dyn TrackedAccountRepository>,
        meta_repo: Arc<dyn MetaRepository>,
        lookup: Arc<dyn AffiliateLookup>,
        gateway: Arc<dyn MessagingGateway>,
        settings: GateSettings,
    ) -> Self {
        Self {
            member_repo,
            tracked_repo,
            meta_repo,
            lookup,
            gateway,
            settings,
            locks: Arc::new(DashMap::new()),
        }
    }

    /// Get the member repository
    pub fn member_repo(&self) -> &dyn MemberRepository {
        self.member_repo.as_ref()
    }

    /// Get the tracked account repository
    pub fn tracked_repo(&self) -> &dyn TrackedAccountRepository {
        self.tracked_repo.as_ref()
    }

    /// Get the meta repository
    pub fn meta_repo(&self) -> &dyn MetaRepository {
        self.meta_repo.as_ref()
    }

    /// Get the (cache-backed) affiliate lookup
    pub fn lookup(&self) -> &dyn AffiliateLookup {
        self.lookup.as_ref()
    }

    /// Get the messaging gateway
    pub fn gateway(&self) -> &dyn MessagingGateway {
        self.gateway.as_ref()
    }

    /// Get the engine settings
    pub fn settings(&self) -> &GateSettings {
        &self.settings
    }

    /// Per-participant mutex; hold it across any read-modify-write of a
    /// member row. Cross-participant operations run fully in parallel.
    pub fn participant_lock(&self, id: ParticipantId) -> Arc<Mutex<()>> {
        self.locks
            .entry(id)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// Whether a participant may issue admin commands
    pub fn is_admin(&self, id: ParticipantId) -> bool {
        self.settings.admin_ids.contains(&id)
    }
}

impl std::fmt::Debug for ServiceContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceContext")
            .field("settings", &self.settings)
            .field("repositories", &"...")
            .finish()
    }
}
