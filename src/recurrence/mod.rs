//! Background worker that turns fixed-expense templates into dated entries.

use std::sync::Arc;
use std::time::Duration;

use time::{Date, OffsetDateTime};
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, warn};

use crate::ledger::service::day_bounds;
use crate::store::{Entry, LedgerStore, NewEntry};

/// Marker prepended to the description of a materialized clone.
pub const RECURRENCE_PREFIX: &str = "[recurring]";

/// Daily recurrence worker.
///
/// Spawned once at startup; the `last_run` date inside the loop keeps the
/// sweep to at most one execution per calendar day, so two sweeps can never
/// run concurrently. The interval only decides how quickly a new day is
/// noticed.
pub struct Materializer {
    ledger: Arc<dyn LedgerStore>,
    tick: Duration,
    shutdown: Arc<Notify>,
}

impl Materializer {
    pub fn new(ledger: Arc<dyn LedgerStore>, tick: Duration) -> Self {
        Self {
            ledger,
            tick,
            shutdown: Arc::new(Notify::new()),
        }
    }

    /// Handle for requesting graceful shutdown of the worker.
    pub fn shutdown_handle(&self) -> Arc<Notify> {
        self.shutdown.clone()
    }

    pub fn start(self) -> JoinHandle<()> {
        tokio::spawn(async move {
            info!("recurrence worker started");

            let mut interval = tokio::time::interval(self.tick);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
            let mut last_run: Option<Date> = None;

            loop {
                tokio::select! {
                    _ = self.shutdown.notified() => {
                        info!("recurrence worker received shutdown signal");
                        break;
                    }
                    _ = interval.tick() => {
                        let today = OffsetDateTime::now_utc().date();
                        if last_run == Some(today) {
                            continue;
                        }
                        match materialize_day(self.ledger.as_ref(), today).await {
                            Ok(count) => {
                                info!(day = %today, count, "recurrence sweep finished");
                                last_run = Some(today);
                            }
                            // Nobody awaits this result; log and let the
                            // next tick retry the whole day.
                            Err(e) => error!(error = %e, "recurrence sweep failed"),
                        }
                    }
                }
            }

            info!("recurrence worker stopped");
        })
    }
}

/// One sweep: clone every active template, across all owners, whose
/// recurrence day equals today's day-of-month. Returns how many clones were
/// written. A failure on one template is logged and skipped; the sweep
/// continues with the rest.
pub async fn materialize_day(ledger: &dyn LedgerStore, today: Date) -> anyhow::Result<usize> {
    let templates = ledger.recurring_on_day(today.day()).await?;
    if templates.is_empty() {
        debug!(day = %today, "no recurring entries due today");
        return Ok(0);
    }

    let (start, end) = day_bounds(today);
    let mut materialized = 0;
    for template in &templates {
        match materialize_one(ledger, template, start, end).await {
            Ok(true) => materialized += 1,
            Ok(false) => debug!(template = %template.id, "already materialized today"),
            Err(e) => warn!(template = %template.id, error = %e, "skipping recurring entry"),
        }
    }
    Ok(materialized)
}

/// Writes the clone for one template unless one already exists inside
/// today's window. Returns whether a clone was written.
async fn materialize_one(
    ledger: &dyn LedgerStore,
    template: &Entry,
    start: OffsetDateTime,
    end: OffsetDateTime,
) -> anyhow::Result<bool> {
    if ledger.was_materialized(template.id, start, end).await? {
        return Ok(false);
    }
    ledger
        .insert_entry(recurrence_instance(template, OffsetDateTime::now_utc()))
        .await?;
    Ok(true)
}

/// Builds the dated clone of a template: same amount, kind and owner, the
/// description marked, the recurrence day dropped so the clone never recurs
/// itself, and the template id recorded for the per-day dedupe check.
pub fn recurrence_instance(template: &Entry, now: OffsetDateTime) -> NewEntry {
    let description = match &template.description {
        Some(d) => format!("{RECURRENCE_PREFIX} {d}"),
        None => RECURRENCE_PREFIX.to_string(),
    };
    NewEntry {
        owner: template.owner,
        amount: template.amount,
        description: Some(description),
        kind: template.kind,
        recurrence_day: None,
        source_entry: Some(template.id),
        created_at: now,
    }
}
