//! Database models (SQLx `FromRow` structs)

mod lookup_cache;
mod member;
mod tracked_account;

pub use lookup_cache::CacheEntryModel;
pub use member::MemberModel;
pub use tracked_account::TrackedAccountModel;
