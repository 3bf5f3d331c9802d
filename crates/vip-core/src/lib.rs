//! # vip-core
//!
//! Domain layer containing entities, value objects, repository traits, and inbound events.
//! This crate has zero dependencies on infrastructure (database, HTTP client, etc.).

pub mod entities;
pub mod error;
pub mod events;
pub mod traits;
pub mod value_objects;

// Re-export commonly used types at crate root
pub use entities::{
    AffiliateInfo, CacheEntry, CheckpointKind, LookupOutcome, Member, MemberState,
    ScheduledCheckpoint, TrackedAccount, TrackedSource, pending_checkpoints, MONTH_ONE_TARGET,
    MONTH_TWO_TARGET,
};
pub use error::DomainError;
pub use events::GatewayEvent;
pub use traits::{
    AffiliateLookup, LookupCacheRepository, MemberRepository, MessagingGateway, MetaRepository,
    MessageFormat, Recipient, RepoResult, TrackedAccountRepository,
};
pub use value_objects::{AccountId, AccountIdParseError, GroupId, ParticipantId};
