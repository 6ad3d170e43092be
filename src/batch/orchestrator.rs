use crate::audit::{AuditRecord, AuditStatus, SiteAuditor};
use crate::batch::table::{ProspectRow, ProspectTable};
use crate::config::BatchConfig;
use crate::Result;
use futures::future::join_all;

/// How a batch selects and schedules prospects
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchOptions {
    /// Audits launched together per group
    pub concurrency: usize,
    /// Leave rows with a completed audit alone
    pub skip_audited: bool,
    /// Only rows whose current priority is listed; empty means all
    pub priority_filter: Vec<u8>,
}

impl Default for BatchOptions {
    fn default() -> Self {
        BatchConfig::default().into()
    }
}

impl From<BatchConfig> for BatchOptions {
    fn from(config: BatchConfig) -> Self {
        Self {
            concurrency: config.concurrency,
            skip_audited: config.skip_audited,
            priority_filter: config.priority_filter,
        }
    }
}

/// Outcome of a batch run
#[derive(Debug, Clone, Default)]
pub struct BatchSummary {
    /// Rows audited to completion
    pub audited: usize,
    /// Rows whose audit errored or ended in `audit-error`
    pub failed: usize,
    /// Table checkpoints written
    pub flushes: usize,
    pub results: Vec<AuditRecord>,
}

/// True when `row` should be audited in this run
pub fn is_candidate(row: &ProspectRow, options: &BatchOptions) -> bool {
    if !row.has_url() {
        return false;
    }
    if options.skip_audited && row.is_audited() {
        return false;
    }
    options.priority_filter.is_empty()
        || row
            .priority
            .is_some_and(|p| options.priority_filter.contains(&p))
}

/// Audits the selected rows of `table` in groups of `concurrency`
///
/// Every audit of a group settles before the next group starts; one failure
/// never cancels its siblings. The table is flushed after each group, so an
/// interrupted run resumes where it stopped when `skip_audited` is set.
pub async fn run_batch(
    table: &mut ProspectTable,
    auditor: &dyn SiteAuditor,
    options: &BatchOptions,
) -> Result<BatchSummary> {
    let candidates: Vec<usize> = table
        .rows
        .iter()
        .enumerate()
        .filter(|(_, row)| is_candidate(row, options))
        .map(|(idx, _)| idx)
        .collect();

    let group_size = options.concurrency.max(1);
    tracing::info!(
        "Batch: {} of {} prospects selected, groups of {}",
        candidates.len(),
        table.rows.len(),
        group_size
    );

    let mut summary = BatchSummary::default();

    for (group_no, group) in candidates.chunks(group_size).enumerate() {
        let tasks = group.iter().map(|&idx| {
            let url = table.rows[idx].url.trim().to_string();
            let population = table.rows[idx].population;
            async move { (idx, auditor.audit_prospect(&url, population).await) }
        });
        let outcomes = join_all(tasks).await;

        for (idx, outcome) in outcomes {
            let row = &mut table.rows[idx];
            match outcome {
                Ok(record) => {
                    row.apply_audit(&record);
                    match record.status {
                        AuditStatus::Completed => summary.audited += 1,
                        AuditStatus::AuditError => summary.failed += 1,
                    }
                    summary.results.push(record);
                }
                Err(e) => {
                    tracing::warn!("Audit of {} failed: {}", row.url, e);
                    row.mark_failed(&e.to_string());
                    summary.failed += 1;
                }
            }
        }

        table.flush()?;
        summary.flushes += 1;
        tracing::info!(
            "Group {} done: {} audited, {} failed so far",
            group_no + 1,
            summary.audited,
            summary.failed
        );
    }

    Ok(summary)
}
