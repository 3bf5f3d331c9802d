//! Lifecycle checkpoints - fixed-offset evaluations of a member's activity
//!
//! Checkpoints are never persisted. They are recomputed from the durable
//! `joined_at` on every process start, which makes the scheduler idempotent
//! under restart: offsets strictly in the past are dropped, not fired
//! retroactively, so downtime never produces a burst of stale notifications.

use chrono::{DateTime, Duration, Utc};

use crate::value_objects::ParticipantId;

/// Month-1 trading volume target (evaluated at day 30)
pub const MONTH_ONE_TARGET: f64 = 25_000.0;

/// Month-2 trading volume target (evaluated at day 58; below it ⇒ expulsion)
pub const MONTH_TWO_TARGET: f64 = 50_000.0;

/// The four one-shot checkpoints of a membership
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CheckpointKind {
    Day10,
    Day20,
    Day30,
    Day58,
}

impl CheckpointKind {
    /// All checkpoints in firing order
    pub const ALL: [CheckpointKind; 4] = [Self::Day10, Self::Day20, Self::Day30, Self::Day58];

    /// Offset from admission, in days
    pub fn offset_days(self) -> i64 {
        match self {
            Self::Day10 => 10,
            Self::Day20 => 20,
            Self::Day30 => 30,
            Self::Day58 => 58,
        }
    }
}

impl std::fmt::Display for CheckpointKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "day{}", self.offset_days())
    }
}

/// One armed checkpoint: `(participant, kind)` resolved against the
/// membership store at fire time, never a captured snapshot of the world
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduledCheckpoint {
    pub participant_id: ParticipantId,
    pub kind: CheckpointKind,
    pub fire_at: DateTime<Utc>,
}

/// Compute the checkpoints still ahead of `now` for a member admitted at
/// `joined_at`. Checkpoints strictly in the past are skipped.
pub fn pending_checkpoints(
    participant_id: ParticipantId,
    joined_at: DateTime<Utc>,
    now: DateTime<Utc>,
) -> Vec<ScheduledCheckpoint> {
    CheckpointKind::ALL
        .into_iter()
        .filter_map(|kind| {
            let fire_at = joined_at + Duration::days(kind.offset_days());
            (fire_at >= now).then_some(ScheduledCheckpoint {
                participant_id,
                kind,
                fire_at,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pid() -> ParticipantId {
        ParticipantId::new(7)
    }

    fn kinds(cps: &[ScheduledCheckpoint]) -> Vec<CheckpointKind> {
        cps.iter().map(|c| c.kind).collect()
    }

    #[test]
    fn test_fresh_admission_arms_all_four() {
        let now = Utc::now();
        let pending = pending_checkpoints(pid(), now, now);
        assert_eq!(kinds(&pending), CheckpointKind::ALL.to_vec());
        assert_eq!(pending[0].fire_at, now + Duration::days(10));
        assert_eq!(pending[3].fire_at, now + Duration::days(58));
    }

    #[test]
    fn test_restart_at_day_15_skips_day_10() {
        let now = Utc::now();
        let joined_at = now - Duration::days(15);
        let pending = pending_checkpoints(pid(), joined_at, now);
        assert_eq!(
            kinds(&pending),
            vec![CheckpointKind::Day20, CheckpointKind::Day30, CheckpointKind::Day58]
        );
    }

    #[test]
    fn test_exactly_due_checkpoint_still_arms() {
        let now = Utc::now();
        let joined_at = now - Duration::days(10);
        let pending = pending_checkpoints(pid(), joined_at, now);
        // fire_at == now is not strictly past
        assert_eq!(pending[0].kind, CheckpointKind::Day10);
    }

    #[test]
    fn test_all_past_arms_nothing() {
        let now = Utc::now();
        let joined_at = now - Duration::days(90);
        assert!(pending_checkpoints(pid(), joined_at, now).is_empty());
    }

    #[test]
    fn test_offsets() {
        assert_eq!(CheckpointKind::Day10.offset_days(), 10);
        assert_eq!(CheckpointKind::Day20.offset_days(), 20);
        assert_eq!(CheckpointKind::Day30.offset_days(), 30);
        assert_eq!(CheckpointKind::Day58.offset_days(), 58);
        assert_eq!(CheckpointKind::Day58.to_string(), "day58");
    }
}
