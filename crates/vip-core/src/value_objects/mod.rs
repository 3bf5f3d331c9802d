//! Value objects - small immutable identifier types

mod ids;

pub use ids::{AccountId, AccountIdParseError, GroupId, ParticipantId};
