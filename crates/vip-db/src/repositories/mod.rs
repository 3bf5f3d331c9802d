//! PostgreSQL repository implementations

mod error;
mod lookup_cache;
mod member;
mod meta;
mod tracked_account;

pub use error::map_db_error;
pub use lookup_cache::PgLookupCacheRepository;
pub use member::PgMemberRepository;
pub use meta::PgMetaRepository;
pub use tracked_account::PgTrackedAccountRepository;
