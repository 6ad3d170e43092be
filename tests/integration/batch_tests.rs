//! Integration tests for the batch orchestrator and the CSV prospect table

mod common;

use common::ScriptedAuditor;
use sitewarden::batch::{
    read_rows, run_batch, BatchOptions, CsvTableSink, ProspectRow, ProspectTable,
};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn prospect(i: usize) -> ProspectRow {
    ProspectRow {
        id: format!("P{:03}", i),
        name: format!("Commune {}", i),
        url: format!("https://commune-{}.fr/", i),
        city: "Exempleville".to_string(),
        population: Some(1_000 * i as u64),
        ..Default::default()
    }
}

fn already_audited(i: usize) -> ProspectRow {
    ProspectRow {
        audit_status: "completed".to_string(),
        audit_date: "2026-01-05 10:00:00".to_string(),
        accessibility_score: Some(90),
        privacy_score: Some(85),
        priority: Some(1),
        ..prospect(i)
    }
}

/// Writes a 10-row table whose rows 0, 3, 6 and 9 are already audited
fn write_table(dir: &Path) -> PathBuf {
    let path = dir.join("prospects.csv");
    let rows = (0..10)
        .map(|i| if i % 3 == 0 { already_audited(i) } else { prospect(i) })
        .collect();
    ProspectTable::new(rows, Box::new(CsvTableSink::new(&path)))
        .flush()
        .unwrap();
    path
}

fn options(concurrency: usize) -> BatchOptions {
    BatchOptions {
        concurrency,
        skip_audited: true,
        priority_filter: Vec::new(),
    }
}

#[tokio::test]
async fn test_batch_audits_pending_rows_in_groups() {
    let dir = TempDir::new().unwrap();
    let path = write_table(dir.path());
    let mut table = ProspectTable::load_csv(&path).unwrap();
    let auditor = ScriptedAuditor::default();

    let summary = run_batch(&mut table, &auditor, &options(3)).await.unwrap();

    assert_eq!(summary.audited, 6);
    assert_eq!(summary.failed, 0);
    assert_eq!(summary.flushes, 2);
    assert_eq!(summary.results.len(), 6);

    let called: HashSet<String> = auditor.calls().into_iter().collect();
    assert_eq!(called.len(), 6);
    assert!(!called.contains("https://commune-0.fr/"));
    assert!(!called.contains("https://commune-9.fr/"));

    let rows = read_rows(&path).unwrap();
    assert_eq!(rows.len(), 10);
    assert!(rows.iter().all(|r| r.audit_status == "completed"));

    // rows audited earlier keep their columns
    assert_eq!(rows[3].priority, Some(1));
    assert_eq!(rows[3].audit_date, "2026-01-05 10:00:00");

    let fresh = &rows[1];
    assert_eq!(fresh.id, "P001");
    assert_eq!(fresh.population, Some(1_000));
    assert_eq!(fresh.accessibility_score, Some(70));
    assert_eq!(fresh.privacy_score, Some(60));
    assert_eq!(fresh.performance_score, Some(80));
    assert_eq!(fresh.seo_score, Some(90));
    assert_eq!(fresh.priority, Some(4));
    assert_eq!(fresh.problems, "no consent banner");
    assert!(!fresh.audit_date.is_empty());
}

#[tokio::test]
async fn test_rerun_skips_audited_rows() {
    let dir = TempDir::new().unwrap();
    let path = write_table(dir.path());

    let mut table = ProspectTable::load_csv(&path).unwrap();
    run_batch(&mut table, &ScriptedAuditor::default(), &options(3))
        .await
        .unwrap();

    let before = std::fs::read_to_string(&path).unwrap();
    let mut table = ProspectTable::load_csv(&path).unwrap();
    let auditor = ScriptedAuditor::default();
    let summary = run_batch(&mut table, &auditor, &options(3)).await.unwrap();

    assert_eq!(summary.audited, 0);
    assert_eq!(summary.flushes, 0);
    assert!(auditor.calls().is_empty());
    assert_eq!(std::fs::read_to_string(&path).unwrap(), before);
}

#[tokio::test]
async fn test_failures_do_not_stop_the_group() {
    let dir = TempDir::new().unwrap();
    let path = write_table(dir.path());
    let mut table = ProspectTable::load_csv(&path).unwrap();

    let auditor = ScriptedAuditor {
        failing: HashSet::from(["https://commune-2.fr/".to_string()]),
        unreachable: HashSet::from(["https://commune-4.fr/".to_string()]),
        ..Default::default()
    };

    let summary = run_batch(&mut table, &auditor, &options(3)).await.unwrap();

    assert_eq!(auditor.calls().len(), 6);
    assert_eq!(summary.audited, 4);
    assert_eq!(summary.failed, 2);
    // the erroring audit produced no record
    assert_eq!(summary.results.len(), 5);

    let rows = read_rows(&path).unwrap();
    assert_eq!(rows[2].audit_status, "audit-error");
    assert!(rows[2].problems.contains("browser crashed"));
    assert_eq!(rows[4].audit_status, "audit-error");
    assert_eq!(rows[4].priority, None);
    assert_eq!(rows[5].audit_status, "completed");

    // failed rows are picked up again on the next run
    let mut table = ProspectTable::load_csv(&path).unwrap();
    let retry = ScriptedAuditor::default();
    let summary = run_batch(&mut table, &retry, &options(3)).await.unwrap();
    assert_eq!(summary.audited, 2);
    assert_eq!(summary.flushes, 1);
}

#[tokio::test]
async fn test_failed_reaudit_clears_previous_scores() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("prospects.csv");
    let mut table = ProspectTable::new(
        vec![already_audited(1)],
        Box::new(CsvTableSink::new(&path)),
    );
    let auditor = ScriptedAuditor {
        failing: HashSet::from(["https://commune-1.fr/".to_string()]),
        ..Default::default()
    };
    let options = BatchOptions {
        skip_audited: false,
        ..options(3)
    };

    let summary = run_batch(&mut table, &auditor, &options).await.unwrap();
    assert_eq!(summary.failed, 1);

    let row = &read_rows(&path).unwrap()[0];
    assert_eq!(row.audit_status, "audit-error");
    assert_eq!(row.accessibility_score, None);
    assert_eq!(row.privacy_score, None);
    assert_eq!(row.priority, None);
    assert_ne!(row.audit_date, "2026-01-05 10:00:00");
}

#[tokio::test]
async fn test_priority_filter_and_missing_urls() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("prospects.csv");

    let rows = vec![
        ProspectRow {
            priority: Some(5),
            ..already_audited(1)
        },
        ProspectRow {
            priority: Some(2),
            ..already_audited(2)
        },
        ProspectRow {
            url: "  ".to_string(),
            priority: Some(5),
            ..prospect(3)
        },
        ProspectRow {
            priority: Some(5),
            ..prospect(4)
        },
    ];
    let mut table = ProspectTable::new(rows, Box::new(CsvTableSink::new(&path)));
    let auditor = ScriptedAuditor::default();
    let options = BatchOptions {
        concurrency: 10,
        skip_audited: false,
        priority_filter: vec![5],
    };

    let summary = run_batch(&mut table, &auditor, &options).await.unwrap();

    assert_eq!(summary.audited, 2);
    assert_eq!(summary.flushes, 1);
    assert_eq!(
        auditor.calls(),
        vec!["https://commune-1.fr/".to_string(), "https://commune-4.fr/".to_string()]
    );
    assert_eq!(table.rows[1].priority, Some(2));
    assert_eq!(read_rows(&path).unwrap().len(), 4);
}

#[test]
fn test_csv_table_tolerates_sparse_columns() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("minimal.csv");
    std::fs::write(
        &path,
        "id,name,url,population,priority\nA1,Mairie,https://mairie.fr/,not-a-number,\nA2,Autre,,12000,3\n",
    )
    .unwrap();

    let rows = read_rows(&path).unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].url, "https://mairie.fr/");
    assert_eq!(rows[0].population, None);
    assert_eq!(rows[0].priority, None);
    assert!(!rows[1].has_url());
    assert_eq!(rows[1].population, Some(12_000));
    assert_eq!(rows[1].priority, Some(3));
    assert_eq!(rows[1].audit_status, "");
}
