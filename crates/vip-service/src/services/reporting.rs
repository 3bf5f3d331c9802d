//! Reporting aggregator - weekly member nudges and the monthly fleet report
//!
//! Both reports are driven by a coarse clock loop. The weekly nudge is
//! at-most-once per ISO week via an in-memory latch (a restart may repeat
//! it within the hour, which is acceptable for a reminder). The monthly
//! fleet report is guarded by a durable cursor in the meta table, so it is
//! at-most-once per calendar month across restarts.

use chrono::{DateTime, Datelike, Timelike, Utc};
use futures::stream::{self, StreamExt};
use parking_lot::Mutex;
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

use vip_core::entities::{AffiliateInfo, LookupOutcome, MONTH_ONE_TARGET, MONTH_TWO_TARGET};
use vip_core::value_objects::AccountId;
use vip_core::{MessageFormat, Recipient};

use super::context::ServiceContext;
use super::error::ServiceResult;

/// Meta key holding the last period ("YYYY-MM") a fleet report was sent for
pub const REPORT_CURSOR_KEY: &str = "report_cursor";

/// How often the clock loop wakes up to evaluate recurrences
const TICK_INTERVAL: Duration = Duration::from_secs(300);

/// Fleet-wide aggregate over member accounts and the tracked-account union
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FleetSummary {
    /// Members currently inside the group (measurable or not)
    pub active_members: i64,
    /// Member accounts at or above the month-one volume target
    pub month_one_hitters: usize,
    /// Member accounts at or above the month-two volume target
    pub month_two_hitters: usize,
    /// Summed monthly volume over member accounts
    pub member_volume: f64,
    /// Distinct accounts in the member/tracked union
    pub union_size: usize,
    /// Summed monthly volume over the union
    pub union_volume: f64,
    /// Summed lifetime commission over the union
    pub union_commission: f64,
}

impl FleetSummary {
    /// Render the report text for a given period
    pub fn render(&self, period: &str) -> String {
        format!(
            "Fleet report for {period}\n\
             Active members: {}\n\
             Members >= ${:.0}: {}\n\
             Members >= ${:.0}: {}\n\
             Member volume: ${:.2}\n\
             Accounts in scope: {}\n\
             Total volume: ${:.2}\n\
             Total commission: ${:.2}",
            self.active_members,
            MONTH_ONE_TARGET,
            self.month_one_hitters,
            MONTH_TWO_TARGET,
            self.month_two_hitters,
            self.member_volume,
            self.union_size,
            self.union_volume,
            self.union_commission,
        )
    }
}

/// Runs the weekly nudge and monthly fleet report recurrences
pub struct ReportingAggregator {
    ctx: Arc<ServiceContext>,
    last_weekly: Mutex<Option<String>>,
}

impl ReportingAggregator {
    pub fn new(ctx: Arc<ServiceContext>) -> Arc<Self> {
        Arc::new(Self {
            ctx,
            last_weekly: Mutex::new(None),
        })
    }

    /// Clock loop; runs until the process exits
    pub async fn run_forever(self: Arc<Self>) {
        let mut ticker = tokio::time::interval(TICK_INTERVAL);
        loop {
            ticker.tick().await;
            let now = Utc::now();
            if let Err(e) = self.run_weekly_if_due(now).await {
                warn!(error = %e, "weekly nudge run failed");
            }
            match self.run_monthly_if_due(now).await {
                Ok(true) => info!("monthly fleet report sent"),
                Ok(false) => {}
                Err(e) => warn!(error = %e, "monthly report run failed"),
            }
        }
    }

    /// Run the weekly nudge when the configured weekday/hour is reached,
    /// at most once per ISO week. Returns whether a run happened.
    pub async fn run_weekly_if_due(&self, now: DateTime<Utc>) -> ServiceResult<bool> {
        let settings = self.ctx.settings();
        if now.weekday() != settings.weekly_weekday || now.hour() != settings.weekly_hour {
            return Ok(false);
        }
        let week = format!("{}-W{:02}", now.iso_week().year(), now.iso_week().week());
        {
            let mut latch = self.last_weekly.lock();
            if latch.as_deref() == Some(week.as_str()) {
                return Ok(false);
            }
            *latch = Some(week);
        }
        let nudged = self.run_weekly(now).await?;
        info!(nudged, "weekly nudges sent");
        Ok(true)
    }

    /// Nudge every measurable member past day 30 with their current volume.
    ///
    /// Failures (lookup or delivery) skip that member only. Returns the
    /// number of nudges delivered.
    #[instrument(skip(self, now))]
    pub async fn run_weekly(&self, now: DateTime<Utc>) -> ServiceResult<usize> {
        let members = self.ctx.member_repo().list_active().await?;
        let due: Vec<_> = members
            .into_iter()
            .filter(|m| m.is_measurable() && m.days_since_joined(now).unwrap_or(0) >= 30)
            .collect();

        let sent = AtomicUsize::new(0);
        let concurrency = self.ctx.settings().lookup_concurrency;
        stream::iter(due)
            .for_each_concurrent(concurrency, |member| {
                let sent = &sent;
                async move {
                    let Some(account) = member.external_account_id.clone() else {
                        return;
                    };
                    let info = match self.ctx.lookup().fetch_detail(&account).await {
                        Ok(LookupOutcome::Found(info)) => info,
                        Ok(LookupOutcome::NotFound) => {
                            debug!(account_id = %account, "account unrecognized, nudge skipped");
                            return;
                        }
                        Err(e) => {
                            warn!(account_id = %account, error = %e, "nudge lookup failed");
                            return;
                        }
                    };
                    let text = nudge_text(&info);
                    match self
                        .ctx
                        .gateway()
                        .send_message(
                            Recipient::Participant(member.participant_id),
                            &text,
                            MessageFormat::Plain,
                        )
                        .await
                    {
                        Ok(()) => {
                            sent.fetch_add(1, Ordering::SeqCst);
                        }
                        Err(e) => {
                            warn!(
                                participant_id = %member.participant_id,
                                error = %e,
                                "nudge undeliverable"
                            );
                        }
                    }
                }
            })
            .await;
        Ok(sent.load(Ordering::SeqCst))
    }

    /// Run the monthly fleet report when the configured day of month is
    /// reached and no report was sent for this period yet. Returns whether
    /// a report was sent.
    #[instrument(skip(self, now))]
    pub async fn run_monthly_if_due(&self, now: DateTime<Utc>) -> ServiceResult<bool> {
        if now.day() != self.ctx.settings().monthly_day {
            return Ok(false);
        }
        let period = now.format("%Y-%m").to_string();
        if self.ctx.meta_repo().get(REPORT_CURSOR_KEY).await?.as_deref() == Some(period.as_str()) {
            return Ok(false);
        }

        let summary = self.fleet_summary().await?;
        let text = summary.render(&period);
        for admin in &self.ctx.settings().admin_ids {
            if let Err(e) = self
                .ctx
                .gateway()
                .send_message(Recipient::Participant(*admin), &text, MessageFormat::Plain)
                .await
            {
                warn!(admin = %admin, error = %e, "fleet report undeliverable");
            }
        }
        // Advance the cursor even if some deliveries failed; a partial send
        // must not repeat the whole report every tick
        self.ctx.meta_repo().put(REPORT_CURSOR_KEY, &period).await?;
        Ok(true)
    }

    /// Aggregate the current figures over member accounts and the union of
    /// member and tracked accounts.
    #[instrument(skip(self))]
    pub async fn fleet_summary(&self) -> ServiceResult<FleetSummary> {
        let members = self.ctx.member_repo().list_active().await?;
        let active_members = members.len() as i64;

        let member_accounts: HashSet<String> = members
            .iter()
            .filter_map(|m| m.external_account_id.as_ref())
            .map(|a| a.as_str().to_string())
            .collect();

        let mut union: Vec<AccountId> = Vec::new();
        let mut seen: HashSet<String> = HashSet::new();
        for member in &members {
            if let Some(account) = &member.external_account_id {
                if seen.insert(account.as_str().to_string()) {
                    union.push(account.clone());
                }
            }
        }
        for tracked in self.ctx.tracked_repo().list().await? {
            if seen.insert(tracked.account_id.as_str().to_string()) {
                union.push(tracked.account_id);
            }
        }

        let concurrency = self.ctx.settings().lookup_concurrency;
        let results: Vec<(AccountId, Option<AffiliateInfo>)> = stream::iter(union.clone())
            .map(|account| async move {
                let info = match self.ctx.lookup().fetch_detail(&account).await {
                    Ok(LookupOutcome::Found(info)) => Some(info),
                    Ok(LookupOutcome::NotFound) => None,
                    Err(e) => {
                        warn!(account_id = %account, error = %e, "fleet lookup failed");
                        None
                    }
                };
                (account, info)
            })
            .buffer_unordered(concurrency)
            .collect()
            .await;

        let mut summary = FleetSummary {
            active_members,
            union_size: union.len(),
            ..FleetSummary::default()
        };
        for (account, info) in results {
            let Some(info) = info else { continue };
            summary.union_volume += info.monthly_volume;
            summary.union_commission += info.total_commission;
            if member_accounts.contains(account.as_str()) {
                summary.member_volume += info.monthly_volume;
                if info.monthly_volume >= MONTH_ONE_TARGET {
                    summary.month_one_hitters += 1;
                }
                if info.monthly_volume >= MONTH_TWO_TARGET {
                    summary.month_two_hitters += 1;
                }
            }
        }
        Ok(summary)
    }
}

fn nudge_text(info: &AffiliateInfo) -> String {
    format!(
        "Weekly check-in: your trading volume this month is ${:.2}. \
         The monthly requirement to keep your seat is ${:.0}.",
        info.monthly_volume, MONTH_TWO_TARGET
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{
        test_context, InMemoryMembers, InMemoryMeta, InMemoryTracked, RecordingGateway,
        ScriptedLookup,
    };
    use chrono::{Duration as ChronoDuration, TimeZone};
    use vip_core::entities::{Member, TrackedAccount, TrackedSource};
    use vip_core::traits::{MetaRepository, TrackedAccountRepository};
    use vip_core::value_objects::ParticipantId;

    fn found(volume: f64, commission: f64) -> LookupOutcome {
        LookupOutcome::Found(AffiliateInfo {
            monthly_volume: volume,
            total_commission: commission,
            tier: "2".to_string(),
        })
    }

    fn admitted_member(id: i64, account: &str, days_ago: i64) -> Member {
        let joined = Utc::now() - ChronoDuration::days(days_ago);
        let mut member = Member::requested(ParticipantId::new(id), joined);
        member.admit(Some(AccountId::parse(account).unwrap()), joined);
        member
    }

    struct Rig {
        tracked: Arc<InMemoryTracked>,
        meta: Arc<InMemoryMeta>,
        lookup: Arc<ScriptedLookup>,
        gateway: Arc<RecordingGateway>,
        aggregator: Arc<ReportingAggregator>,
    }

    fn rig(members: Vec<Member>) -> Rig {
        let tracked = Arc::new(InMemoryTracked::default());
        let meta = Arc::new(InMemoryMeta::default());
        let lookup = Arc::new(ScriptedLookup::default());
        let gateway = Arc::new(RecordingGateway::default());
        let ctx = test_context(
            Arc::new(InMemoryMembers::with(members)),
            Arc::clone(&tracked),
            Arc::clone(&meta),
            Arc::clone(&lookup),
            Arc::clone(&gateway),
        );
        let aggregator = ReportingAggregator::new(ctx);
        Rig {
            tracked,
            meta,
            lookup,
            gateway,
            aggregator,
        }
    }

    // 2025-06-01 is a Sunday and the first of the month
    fn first_sunday() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 21, 10, 0).unwrap()
    }

    #[tokio::test]
    async fn test_weekly_nudges_only_measurable_members_past_day_30() {
        let mut bypass = Member::requested(ParticipantId::new(3), Utc::now());
        bypass.admit(None, Utc::now() - ChronoDuration::days(40));
        let r = rig(vec![
            admitted_member(1, "111", 40),
            admitted_member(2, "222", 5),
            bypass,
        ]);
        r.lookup.script("111", Ok(found(12_000.0, 3.0)));

        let sent = r.aggregator.run_weekly(Utc::now()).await.unwrap();
        assert_eq!(sent, 1);
        assert_eq!(r.lookup.call_count(), 1);
        let dms = r
            .gateway
            .messages_to(Recipient::Participant(ParticipantId::new(1)));
        assert!(dms[0].contains("12000.00"));
    }

    #[tokio::test]
    async fn test_weekly_skips_failed_lookup_and_continues() {
        let r = rig(vec![
            admitted_member(1, "111", 40),
            admitted_member(2, "222", 40),
        ]);
        r.lookup.script(
            "111",
            Err(vip_core::DomainError::LookupFailed("503".into())),
        );
        r.lookup.script("222", Ok(found(60_000.0, 9.0)));

        let sent = r.aggregator.run_weekly(Utc::now()).await.unwrap();
        assert_eq!(sent, 1);
    }

    #[tokio::test]
    async fn test_weekly_latch_fires_once_per_week() {
        let r = rig(vec![]);
        let now = first_sunday();
        assert!(r.aggregator.run_weekly_if_due(now).await.unwrap());
        assert!(!r.aggregator.run_weekly_if_due(now).await.unwrap());
        // A different hour on the same day does not match either
        let later = Utc.with_ymd_and_hms(2025, 6, 1, 22, 0, 0).unwrap();
        assert!(!r.aggregator.run_weekly_if_due(later).await.unwrap());
    }

    #[tokio::test]
    async fn test_weekly_not_due_on_other_weekday() {
        let r = rig(vec![]);
        let monday = Utc.with_ymd_and_hms(2025, 6, 2, 21, 0, 0).unwrap();
        assert!(!r.aggregator.run_weekly_if_due(monday).await.unwrap());
    }

    #[tokio::test]
    async fn test_monthly_report_sent_once_per_period() {
        let r = rig(vec![admitted_member(1, "111", 40)]);
        r.lookup.script("111", Ok(found(30_000.0, 4.5)));
        let now = first_sunday();

        assert!(r.aggregator.run_monthly_if_due(now).await.unwrap());
        // One report per configured admin
        assert_eq!(r.gateway.sent.lock().unwrap().len(), 2);
        assert_eq!(
            r.meta.get(REPORT_CURSOR_KEY).await.unwrap().as_deref(),
            Some("2025-06")
        );

        // Same period: the durable cursor suppresses the rerun
        assert!(!r.aggregator.run_monthly_if_due(now).await.unwrap());
        assert_eq!(r.gateway.sent.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_monthly_not_due_on_other_days() {
        let r = rig(vec![]);
        let mid_month = Utc.with_ymd_and_hms(2025, 6, 15, 12, 0, 0).unwrap();
        assert!(!r.aggregator.run_monthly_if_due(mid_month).await.unwrap());
        assert!(r.gateway.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_fleet_summary_deduplicates_union() {
        let r = rig(vec![admitted_member(1, "111", 40)]);
        // The member's account is also tracked manually, plus one extra
        r.tracked
            .add(&TrackedAccount::new(
                AccountId::parse("111").unwrap(),
                TrackedSource::Manual,
                Utc::now(),
            ))
            .await
            .unwrap();
        r.tracked
            .add(&TrackedAccount::new(
                AccountId::parse("222").unwrap(),
                TrackedSource::Manual,
                Utc::now(),
            ))
            .await
            .unwrap();
        r.lookup.script("111", Ok(found(60_000.0, 10.0)));
        r.lookup.script("222", Ok(found(5_000.0, 1.0)));

        let summary = r.aggregator.fleet_summary().await.unwrap();
        assert_eq!(summary.union_size, 2);
        // Each distinct account looked up exactly once
        assert_eq!(r.lookup.call_count(), 2);
        assert_eq!(summary.active_members, 1);
        assert_eq!(summary.month_one_hitters, 1);
        assert_eq!(summary.month_two_hitters, 1);
        assert!((summary.member_volume - 60_000.0).abs() < f64::EPSILON);
        assert!((summary.union_volume - 65_000.0).abs() < f64::EPSILON);
        assert!((summary.union_commission - 11.0).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn test_fleet_summary_ignores_unresolvable_accounts() {
        let r = rig(vec![admitted_member(1, "111", 40)]);
        r.lookup.script("111", Ok(LookupOutcome::NotFound));

        let summary = r.aggregator.fleet_summary().await.unwrap();
        assert_eq!(summary.union_size, 1);
        assert_eq!(summary.month_one_hitters, 0);
        assert!((summary.union_volume).abs() < f64::EPSILON);
    }

    #[test]
    fn test_render_uses_ascii_comparisons() {
        let summary = FleetSummary {
            active_members: 3,
            month_one_hitters: 2,
            month_two_hitters: 1,
            member_volume: 80_000.0,
            union_size: 5,
            union_volume: 95_000.0,
            union_commission: 42.5,
        };
        let text = summary.render("2025-06");
        assert!(text.contains("2025-06"));
        assert!(text.contains(">= $25000: 2"));
        assert!(text.contains(">= $50000: 1"));
    }
}
