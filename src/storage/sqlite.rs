//! SQLite storage implementation
//!
//! This module provides a SQLite-based implementation of the Storage trait.

use crate::classify::{Category, Characteristics};
use crate::crawler::{CrawlError, CrawledPage};
use crate::state::{CrawlJob, CrawlStatus};
use crate::storage::schema::initialize_schema;
use crate::storage::traits::{Storage, StorageError, StorageResult};
use crate::storage::{JobRecord, PageRecord};
use crate::WardenError;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::collections::HashMap;
use std::path::Path;

const PAGE_COLUMNS: &str = "id, job_id, url, normalized_url, depth, http_status, title, category, \
     confidence, has_form, has_table, has_multimedia, has_documents, has_authentication, \
     selected_for_audit, screenshot_url, crawled_at";

const JOB_COLUMNS: &str = "id, seed_url, status, config_hash, max_depth, max_pages, delay_ms, \
     discovered, crawled, error_message, created_at, started_at, finished_at";

/// SQLite storage backend
pub struct SqliteStorage {
    conn: Connection,
}

impl SqliteStorage {
    /// Opens or creates the database file and applies the schema
    pub fn new(path: &Path) -> Result<Self, WardenError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA foreign_keys = ON;
            PRAGMA temp_store = MEMORY;
        ",
        )?;

        initialize_schema(&conn)?;

        Ok(Self { conn })
    }

    /// Creates an in-memory database
    pub fn new_in_memory() -> Result<Self, WardenError> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        initialize_schema(&conn)?;
        Ok(Self { conn })
    }

    fn query_pages(&self, sql: &str, job_id: i64) -> StorageResult<Vec<PageRecord>> {
        let mut stmt = self.conn.prepare(sql)?;
        let pages = stmt
            .query_map(params![job_id], row_to_page)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(pages)
    }
}

fn timestamp(value: Option<DateTime<Utc>>) -> Option<String> {
    value.map(|t| t.to_rfc3339())
}

fn row_to_job(row: &Row<'_>) -> rusqlite::Result<JobRecord> {
    Ok(JobRecord {
        id: row.get(0)?,
        seed_url: row.get(1)?,
        status: CrawlStatus::from_db_string(&row.get::<_, String>(2)?)
            .unwrap_or(CrawlStatus::Failed),
        config_hash: row.get(3)?,
        max_depth: row.get(4)?,
        max_pages: row.get(5)?,
        delay_ms: row.get::<_, i64>(6)? as u64,
        discovered: row.get(7)?,
        crawled: row.get(8)?,
        error_message: row.get(9)?,
        created_at: row.get(10)?,
        started_at: row.get(11)?,
        finished_at: row.get(12)?,
    })
}

fn row_to_page(row: &Row<'_>) -> rusqlite::Result<PageRecord> {
    let category: String = row.get(7)?;
    Ok(PageRecord {
        id: row.get(0)?,
        job_id: row.get(1)?,
        page: CrawledPage {
            url: row.get(2)?,
            normalized_url: row.get(3)?,
            depth: row.get(4)?,
            http_status: row.get(5)?,
            title: row.get(6)?,
            category: Category::parse(&category).unwrap_or(Category::Other),
            confidence: row.get::<_, f64>(8)? as f32,
            characteristics: Characteristics {
                has_form: row.get(9)?,
                has_table: row.get(10)?,
                has_multimedia: row.get(11)?,
                has_documents: row.get(12)?,
                has_authentication: row.get(13)?,
            },
            selected_for_audit: row.get(14)?,
            screenshot_url: row.get(15)?,
        },
        crawled_at: row.get(16)?,
    })
}

impl Storage for SqliteStorage {
    // ===== Job Management =====

    fn create_job(&mut self, job: &CrawlJob, config_hash: &str) -> StorageResult<i64> {
        let now = Utc::now().to_rfc3339();
        self.conn.execute(
            "INSERT INTO crawl_jobs (seed_url, status, config_hash, max_depth, max_pages, delay_ms, \
             discovered, crawled, error_message, created_at, started_at, finished_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
            params![
                job.seed_url,
                job.status.to_db_string(),
                config_hash,
                job.config.max_depth,
                job.config.max_pages,
                job.config.delay_ms as i64,
                job.discovered,
                job.crawled,
                job.error,
                now,
                timestamp(job.started_at),
                timestamp(job.finished_at),
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn update_job(&mut self, job: &CrawlJob) -> StorageResult<()> {
        let job_id = job.id.ok_or(StorageError::UnsavedJob)?;
        let updated = self.conn.execute(
            "UPDATE crawl_jobs SET status = ?1, discovered = ?2, crawled = ?3, error_message = ?4, \
             started_at = ?5, finished_at = ?6 WHERE id = ?7",
            params![
                job.status.to_db_string(),
                job.discovered,
                job.crawled,
                job.error,
                timestamp(job.started_at),
                timestamp(job.finished_at),
                job_id,
            ],
        )?;

        if updated == 0 {
            return Err(StorageError::JobNotFound(job_id));
        }
        Ok(())
    }

    fn get_job(&self, job_id: i64) -> StorageResult<JobRecord> {
        self.conn
            .query_row(
                &format!("SELECT {} FROM crawl_jobs WHERE id = ?1", JOB_COLUMNS),
                params![job_id],
                row_to_job,
            )
            .optional()?
            .ok_or(StorageError::JobNotFound(job_id))
    }

    fn get_latest_job(&self) -> StorageResult<Option<JobRecord>> {
        let job = self
            .conn
            .query_row(
                &format!("SELECT {} FROM crawl_jobs ORDER BY id DESC LIMIT 1", JOB_COLUMNS),
                [],
                row_to_job,
            )
            .optional()?;
        Ok(job)
    }

    // ===== Page Management =====

    fn insert_page(&mut self, job_id: i64, page: &CrawledPage) -> StorageResult<i64> {
        let now = Utc::now().to_rfc3339();
        let traits = &page.characteristics;
        self.conn.execute(
            "INSERT INTO crawled_pages (job_id, url, normalized_url, depth, http_status, title, \
             category, confidence, has_form, has_table, has_multimedia, has_documents, \
             has_authentication, selected_for_audit, screenshot_url, crawled_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16) \
             ON CONFLICT(job_id, normalized_url) DO NOTHING",
            params![
                job_id,
                page.url,
                page.normalized_url,
                page.depth,
                page.http_status,
                page.title,
                page.category.as_str(),
                page.confidence as f64,
                traits.has_form,
                traits.has_table,
                traits.has_multimedia,
                traits.has_documents,
                traits.has_authentication,
                page.selected_for_audit,
                page.screenshot_url,
                now,
            ],
        )?;

        let id = self.conn.query_row(
            "SELECT id FROM crawled_pages WHERE job_id = ?1 AND normalized_url = ?2",
            params![job_id, page.normalized_url],
            |row| row.get(0),
        )?;
        Ok(id)
    }

    fn get_pages(&self, job_id: i64) -> StorageResult<Vec<PageRecord>> {
        self.query_pages(
            &format!(
                "SELECT {} FROM crawled_pages WHERE job_id = ?1 ORDER BY id",
                PAGE_COLUMNS
            ),
            job_id,
        )
    }

    fn get_pages_selected_for_audit(&self, job_id: i64) -> StorageResult<Vec<PageRecord>> {
        self.query_pages(
            &format!(
                "SELECT {} FROM crawled_pages WHERE job_id = ?1 AND selected_for_audit = 1 ORDER BY id",
                PAGE_COLUMNS
            ),
            job_id,
        )
    }

    fn update_page_category(&mut self, page_id: i64, category: Category) -> StorageResult<()> {
        let updated = self.conn.execute(
            "UPDATE crawled_pages SET category = ?1 WHERE id = ?2",
            params![category.as_str(), page_id],
        )?;
        if updated == 0 {
            return Err(StorageError::PageNotFound(page_id));
        }
        Ok(())
    }

    fn set_selected_for_audit(&mut self, page_id: i64, selected: bool) -> StorageResult<()> {
        let updated = self.conn.execute(
            "UPDATE crawled_pages SET selected_for_audit = ?1 WHERE id = ?2",
            params![selected, page_id],
        )?;
        if updated == 0 {
            return Err(StorageError::PageNotFound(page_id));
        }
        Ok(())
    }

    // ===== Error Tracking =====

    fn insert_error(&mut self, job_id: i64, error: &CrawlError) -> StorageResult<()> {
        let now = Utc::now().to_rfc3339();
        self.conn.execute(
            "INSERT INTO crawl_errors (job_id, url, depth, message, occurred_at) VALUES (?1, ?2, ?3, ?4, ?5)",
            params![job_id, error.url, error.depth, error.message, now],
        )?;
        Ok(())
    }

    fn get_errors(&self, job_id: i64) -> StorageResult<Vec<CrawlError>> {
        let mut stmt = self
            .conn
            .prepare("SELECT url, depth, message FROM crawl_errors WHERE job_id = ?1 ORDER BY id")?;
        let errors = stmt
            .query_map(params![job_id], |row| {
                Ok(CrawlError {
                    url: row.get(0)?,
                    depth: row.get(1)?,
                    message: row.get(2)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(errors)
    }

    // ===== Statistics =====

    fn count_pages(&self, job_id: i64) -> StorageResult<u64> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM crawled_pages WHERE job_id = ?1",
            params![job_id],
            |row| row.get(0),
        )?;
        Ok(count as u64)
    }

    fn get_category_breakdown(&self, job_id: i64) -> StorageResult<HashMap<Category, u64>> {
        let mut stmt = self.conn.prepare(
            "SELECT category, COUNT(*) FROM crawled_pages WHERE job_id = ?1 GROUP BY category",
        )?;

        let mut breakdown = HashMap::new();
        let rows = stmt.query_map(params![job_id], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?))
        })?;

        for row in rows {
            let (category, count) = row?;
            let category = Category::parse(&category).unwrap_or(Category::Other);
            *breakdown.entry(category).or_insert(0) += count as u64;
        }

        Ok(breakdown)
    }

    fn get_depth_breakdown(&self, job_id: i64) -> StorageResult<HashMap<u32, u64>> {
        let mut stmt = self.conn.prepare(
            "SELECT depth, COUNT(*) FROM crawled_pages WHERE job_id = ?1 GROUP BY depth",
        )?;

        let breakdown = stmt
            .query_map(params![job_id], |row| {
                Ok((row.get::<_, u32>(0)?, row.get::<_, i64>(1)? as u64))
            })?
            .collect::<Result<HashMap<_, _>, _>>()?;

        Ok(breakdown)
    }
}
