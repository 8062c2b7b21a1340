use time::macros::format_description;
use time::OffsetDateTime;
use tracing::debug;

use crate::error::ApiError;
use crate::store::{Stat, StatCounters, Store};

use super::dto::{GlobalReport, StatReport, SummaryResponse, SyncResult, SyncStatus, TopUser};

/// Time window for a per-user summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Period {
    None,
    Today,
    Month,
}

impl Period {
    /// Anything other than the two recognized values means no filtering.
    pub fn parse(raw: Option<&str>) -> Self {
        match raw {
            Some("today") => Self::Today,
            Some("month") => Self::Month,
            _ => Self::None,
        }
    }

    /// String comparison against the reference day, by design: `today` is an
    /// exact match, `month` a `YYYY-MM` prefix match. A `date` that does not
    /// follow the `YYYY-MM-DD` convention silently fails to match.
    pub fn matches(&self, date: &str, today: &str) -> bool {
        match self {
            Self::None => true,
            Self::Today => date == today,
            Self::Month => match today.get(..7) {
                Some(month_prefix) => date.starts_with(month_prefix),
                None => false,
            },
        }
    }
}

fn utc_today() -> String {
    let format = format_description!("[year]-[month]-[day]");
    OffsetDateTime::now_utc().format(&format).unwrap_or_default()
}

/// Apply a batch of counter reports to the ledger, one upsert per report,
/// in input order. Outcomes mirror the input order; an item that fails does
/// not stop the items after it, and nothing already written is rolled back.
pub async fn reconcile(store: &dyn Store, reports: Vec<StatReport>) -> Vec<SyncResult> {
    let mut results = Vec::with_capacity(reports.len());
    for report in reports {
        let stat_id = report.stat_id.clone();
        match apply_report(store, report).await {
            Ok(status) => results.push(SyncResult {
                stat_id,
                status,
                message: None,
            }),
            Err(e) => {
                debug!(stat_id = %stat_id, error = %e, "stat report rejected");
                results.push(SyncResult {
                    stat_id,
                    status: SyncStatus::Error,
                    message: Some(e.to_string()),
                });
            }
        }
    }
    results
}

async fn apply_report(store: &dyn Store, report: StatReport) -> anyhow::Result<SyncStatus> {
    if store.find_user(&report.user_id).await?.is_none() {
        anyhow::bail!("User not found");
    }

    let now = OffsetDateTime::now_utc();
    match store.find_stat(&report.stat_id).await? {
        Some(_) => {
            // Last writer wins: counters are replaced wholesale, the stored
            // date and user_id are not re-validated against the report.
            store
                .update_stat_counters(&report.stat_id, &report.counters, now)
                .await?;
            Ok(SyncStatus::Updated)
        }
        None => {
            store
                .insert_stat(&Stat {
                    stat_id: report.stat_id,
                    user_id: report.user_id,
                    date: report.date,
                    counters: report.counters,
                    sync_timestamp: now,
                })
                .await?;
            Ok(SyncStatus::Created)
        }
    }
}

/// Window filter + element-wise sum over one user's ledger rows.
fn summarize_rows(rows: Vec<Stat>, period: Period, today: &str) -> SummaryResponse {
    let details: Vec<Stat> = rows
        .into_iter()
        .filter(|s| period.matches(&s.date, today))
        .collect();
    let mut summary = StatCounters::default();
    for stat in &details {
        summary.add(&stat.counters);
    }
    SummaryResponse { summary, details }
}

pub async fn summarize(
    store: &dyn Store,
    user_id: &str,
    period: Period,
) -> Result<SummaryResponse, ApiError> {
    if store.find_user(user_id).await?.is_none() {
        return Err(ApiError::NotFound("User not found".into()));
    }
    let rows = store.stats_for_user(user_id).await?;
    Ok(summarize_rows(rows, period, &utc_today()))
}

/// Administrative rollup: user count, ledger-wide totals and the top-10
/// leaderboard by `images_processed`. A ranked user whose identity record is
/// gone is dropped, so the list may hold fewer than ten entries.
pub async fn global_report(store: &dyn Store) -> Result<GlobalReport, ApiError> {
    let user_count = store.count_users().await?;
    let global_stats = store.total_counters().await?;

    let ranked = store.top_users_by_images(10).await?;
    let mut top_users = Vec::with_capacity(ranked.len());
    for (user_id, images_processed) in ranked {
        if let Some(user) = store.find_user(&user_id).await? {
            top_users.push(TopUser {
                user_id,
                username: user.username,
                email: user.email,
                full_name: user.full_name,
                images_processed,
            });
        }
    }

    Ok(GlobalReport {
        user_count,
        global_stats,
        top_users,
    })
}
