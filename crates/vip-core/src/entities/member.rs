//! Member entity - one row per participant who ever requested access
//!
//! Rows are never deleted: removal flips `membership_active` off and the
//! record is retained for audit. `joined_at` is the birth of the measurement
//! window (admission time, not request time) and drives every scheduler
//! offset, so it must be durable and is stamped exactly once per admission
//! cycle.

use chrono::{DateTime, Utc};

use crate::value_objects::{AccountId, ParticipantId};

/// Participant record in the membership store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Member {
    pub participant_id: ParticipantId,
    /// Affiliate account linkage; `None` means "admitted via bypass, unmeasured"
    pub external_account_id: Option<AccountId>,
    /// When the participant last asked to join
    pub requested_at: Option<DateTime<Utc>>,
    /// Admission time; set on verification/bypass, immutable until re-admission
    pub joined_at: Option<DateTime<Utc>>,
    /// True while inside the gated group
    pub membership_active: bool,
    pub updated_at: DateTime<Utc>,
}

/// Derived lifecycle state of a member row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemberState {
    /// Requested access, not yet verified
    Requested,
    /// Verified and inside the group
    Active,
    /// Expelled (or otherwise deactivated); row retained for audit
    Removed,
}

impl Member {
    /// Create a new member row for a fresh join request
    pub fn requested(participant_id: ParticipantId, now: DateTime<Utc>) -> Self {
        Self {
            participant_id,
            external_account_id: None,
            requested_at: Some(now),
            joined_at: None,
            membership_active: false,
            updated_at: now,
        }
    }

    /// Derive lifecycle state from the stored flags
    pub fn state(&self) -> MemberState {
        if self.membership_active {
            MemberState::Active
        } else if self.joined_at.is_some() {
            MemberState::Removed
        } else {
            MemberState::Requested
        }
    }

    /// Record a (re-)join request; clears nothing but the request timestamp
    pub fn record_request(&mut self, now: DateTime<Utc>) {
        self.requested_at = Some(now);
        self.updated_at = now;
    }

    /// Admit into the group, starting a new measurement window at `now`.
    ///
    /// `account` is `None` for bypass-code admissions. Re-admission after a
    /// removal resets the account linkage.
    pub fn admit(&mut self, account: Option<AccountId>, now: DateTime<Utc>) {
        self.external_account_id = account;
        self.joined_at = Some(now);
        self.membership_active = true;
        self.updated_at = now;
    }

    /// Expel from the group; the row (and `joined_at`) is retained
    pub fn remove(&mut self, now: DateTime<Utc>) {
        self.membership_active = false;
        self.updated_at = now;
    }

    /// Whole days elapsed since admission, if admitted
    pub fn days_since_joined(&self, now: DateTime<Utc>) -> Option<i64> {
        self.joined_at.map(|j| (now - j).num_days())
    }

    /// True for admitted members whose activity can be measured
    #[inline]
    pub fn is_measurable(&self) -> bool {
        self.membership_active && self.external_account_id.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn pid() -> ParticipantId {
        ParticipantId::new(100)
    }

    #[test]
    fn test_requested_member_state() {
        let now = Utc::now();
        let member = Member::requested(pid(), now);
        assert_eq!(member.state(), MemberState::Requested);
        assert!(!member.membership_active);
        assert!(member.joined_at.is_none());
        assert_eq!(member.requested_at, Some(now));
    }

    #[test]
    fn test_admission_stamps_window() {
        let now = Utc::now();
        let mut member = Member::requested(pid(), now - Duration::minutes(5));
        let account = AccountId::parse("555").unwrap();
        member.admit(Some(account.clone()), now);

        assert_eq!(member.state(), MemberState::Active);
        assert_eq!(member.joined_at, Some(now));
        assert_eq!(member.external_account_id, Some(account));
        assert!(member.is_measurable());
    }

    #[test]
    fn test_bypass_admission_is_unmeasured() {
        let now = Utc::now();
        let mut member = Member::requested(pid(), now);
        member.admit(None, now);

        assert_eq!(member.state(), MemberState::Active);
        assert!(!member.is_measurable());
    }

    #[test]
    fn test_removal_retains_row() {
        let now = Utc::now();
        let mut member = Member::requested(pid(), now);
        member.admit(Some(AccountId::parse("555").unwrap()), now);
        member.remove(now + Duration::days(58));

        assert_eq!(member.state(), MemberState::Removed);
        assert!(!member.membership_active);
        // Audit fields survive removal
        assert_eq!(member.joined_at, Some(now));
        assert!(member.external_account_id.is_some());
    }

    #[test]
    fn test_readmission_resets_linkage() {
        let t0 = Utc::now();
        let mut member = Member::requested(pid(), t0);
        member.admit(Some(AccountId::parse("111").unwrap()), t0);
        member.remove(t0 + Duration::days(58));

        let t1 = t0 + Duration::days(90);
        member.record_request(t1);
        member.admit(Some(AccountId::parse("222").unwrap()), t1);

        assert_eq!(member.state(), MemberState::Active);
        assert_eq!(member.joined_at, Some(t1));
        assert_eq!(member.external_account_id, Some(AccountId::parse("222").unwrap()));
    }

    #[test]
    fn test_days_since_joined() {
        let t0 = Utc::now();
        let mut member = Member::requested(pid(), t0);
        assert_eq!(member.days_since_joined(t0), None);

        member.admit(None, t0);
        assert_eq!(member.days_since_joined(t0 + Duration::days(15)), Some(15));
    }
}
