//! Database schema definitions
//!
//! This module contains all SQL schema definitions for the SiteWarden crawl database.

/// SQL schema for the database
pub const SCHEMA_SQL: &str = r#"
-- One row per crawl of a target site
CREATE TABLE IF NOT EXISTS crawl_jobs (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    seed_url TEXT NOT NULL,
    status TEXT NOT NULL,
    config_hash TEXT NOT NULL,
    max_depth INTEGER NOT NULL,
    max_pages INTEGER NOT NULL,
    delay_ms INTEGER NOT NULL,
    discovered INTEGER NOT NULL DEFAULT 0,
    crawled INTEGER NOT NULL DEFAULT 0,
    error_message TEXT,
    created_at TEXT NOT NULL,
    started_at TEXT,
    finished_at TEXT
);

-- Pages fetched and classified during a job
CREATE TABLE IF NOT EXISTS crawled_pages (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    job_id INTEGER NOT NULL REFERENCES crawl_jobs(id),
    url TEXT NOT NULL,
    normalized_url TEXT NOT NULL,
    depth INTEGER NOT NULL,
    http_status INTEGER NOT NULL,
    title TEXT,
    category TEXT NOT NULL,
    confidence REAL NOT NULL,
    has_form INTEGER NOT NULL DEFAULT 0,
    has_table INTEGER NOT NULL DEFAULT 0,
    has_multimedia INTEGER NOT NULL DEFAULT 0,
    has_documents INTEGER NOT NULL DEFAULT 0,
    has_authentication INTEGER NOT NULL DEFAULT 0,
    selected_for_audit INTEGER NOT NULL DEFAULT 0,
    screenshot_url TEXT,
    crawled_at TEXT NOT NULL,
    UNIQUE(job_id, normalized_url)
);

CREATE INDEX IF NOT EXISTS idx_crawled_pages_job ON crawled_pages(job_id);
CREATE INDEX IF NOT EXISTS idx_crawled_pages_category ON crawled_pages(category);

-- URLs that could not be crawled
CREATE TABLE IF NOT EXISTS crawl_errors (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    job_id INTEGER NOT NULL REFERENCES crawl_jobs(id),
    url TEXT NOT NULL,
    depth INTEGER NOT NULL,
    message TEXT NOT NULL,
    occurred_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_crawl_errors_job ON crawl_errors(job_id);
"#;

/// Initializes the database schema
pub fn initialize_schema(conn: &rusqlite::Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(SCHEMA_SQL)?;
    Ok(())
}
