//! Domain entities

mod affiliate;
mod checkpoint;
mod member;
mod tracked_account;

pub use affiliate::{AffiliateInfo, CacheEntry, LookupOutcome};
pub use checkpoint::{
    pending_checkpoints, CheckpointKind, ScheduledCheckpoint, MONTH_ONE_TARGET, MONTH_TWO_TARGET,
};
pub use member::{Member, MemberState};
pub use tracked_account::{TrackedAccount, TrackedSource};
