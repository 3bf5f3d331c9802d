//! Port traits - interfaces the engine needs from its collaborators
//!
//! The domain layer defines what it needs; infrastructure crates provide
//! the implementations.

mod affiliate;
mod gateway;
mod repositories;

pub use affiliate::AffiliateLookup;
pub use gateway::{MessageFormat, MessagingGateway, Recipient};
pub use repositories::{
    LookupCacheRepository, MemberRepository, MetaRepository, RepoResult,
    TrackedAccountRepository,
};
