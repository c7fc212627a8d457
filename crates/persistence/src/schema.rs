//! Database schema definitions

/// SQL to create all tables
/// NOTE: Dates are stored as ISO-8601 TEXT (YYYY-MM-DD) so BETWEEN filters sort correctly
pub const CREATE_TABLES: &str = r#"
-- Festival calendar (static reference data)
CREATE TABLE IF NOT EXISTS festivals (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    start_date TEXT NOT NULL,
    end_date TEXT NOT NULL,
    CHECK (start_date <= end_date)
);

-- One row per simulated day
CREATE TABLE IF NOT EXISTS daily_sales (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    date TEXT NOT NULL UNIQUE,
    total_revenue REAL NOT NULL DEFAULT 0,
    total_orders INTEGER NOT NULL DEFAULT 0,
    new_customer_revenue REAL NOT NULL DEFAULT 0,
    repeat_customer_revenue REAL NOT NULL DEFAULT 0
);

-- One row per (date, platform)
CREATE TABLE IF NOT EXISTS social_metrics (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    date TEXT NOT NULL,
    platform TEXT NOT NULL,
    impressions INTEGER NOT NULL DEFAULT 0,
    clicks INTEGER NOT NULL DEFAULT 0,
    likes INTEGER NOT NULL DEFAULT 0,
    shares INTEGER NOT NULL DEFAULT 0,
    comments INTEGER NOT NULL DEFAULT 0,
    sentiment_score REAL NOT NULL DEFAULT 0,
    UNIQUE (date, platform)
);

-- Cross-table metrics, one row per simulated day
CREATE TABLE IF NOT EXISTS derived_metrics (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    date TEXT NOT NULL UNIQUE REFERENCES daily_sales(date),
    total_engagement INTEGER NOT NULL DEFAULT 0,
    engagement_rate REAL NOT NULL DEFAULT 0,
    social_buzz_index REAL NOT NULL DEFAULT 0,
    baseline_sales_estimated REAL NOT NULL DEFAULT 0,
    sales_uplift_pct REAL NOT NULL DEFAULT 0
);

-- ========== INDEXES ==========

CREATE INDEX IF NOT EXISTS idx_social_date ON social_metrics(date);
CREATE INDEX IF NOT EXISTS idx_social_platform ON social_metrics(platform)
"#;
