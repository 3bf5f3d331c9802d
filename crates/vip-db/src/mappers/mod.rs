//! Model → entity mappers
//!
//! Stored values are validated at write time, so a mapping failure here means
//! a corrupt row; it surfaces as a database error rather than panicking.

use vip_core::entities::{CacheEntry, Member, TrackedAccount, TrackedSource};
use vip_core::error::DomainError;
use vip_core::value_objects::{AccountId, ParticipantId};

use crate::models::{CacheEntryModel, MemberModel, TrackedAccountModel};

/// Map a members row to the domain entity
pub fn member_from_model(model: MemberModel) -> Result<Member, DomainError> {
    Ok(Member {
        participant_id: ParticipantId::new(model.participant_id),
        external_account_id: model
            .external_account_id
            .as_deref()
            .map(parse_stored_account)
            .transpose()?,
        requested_at: model.requested_at,
        joined_at: model.joined_at,
        membership_active: model.membership_active,
        updated_at: model.updated_at,
    })
}

/// Map a tracked_accounts row to the domain entity
pub fn tracked_account_from_model(model: TrackedAccountModel) -> Result<TrackedAccount, DomainError> {
    Ok(TrackedAccount {
        account_id: parse_stored_account(&model.account_id)?,
        source: TrackedSource::from_tag(&model.source),
        added_at: model.added_at,
    })
}

/// Map a lookup_cache row to the domain entity
pub fn cache_entry_from_model(model: CacheEntryModel) -> Result<CacheEntry, DomainError> {
    let payload = serde_json::from_value(model.payload)
        .map_err(|e| DomainError::DatabaseError(format!("corrupt cache payload: {e}")))?;
    Ok(CacheEntry {
        account_id: parse_stored_account(&model.account_id)?,
        payload,
        fetched_at: model.fetched_at,
    })
}

fn parse_stored_account(raw: &str) -> Result<AccountId, DomainError> {
    AccountId::parse(raw)
        .map_err(|_| DomainError::DatabaseError(format!("corrupt account id in store: {raw}")))
}
