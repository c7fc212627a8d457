//! Dataset repository — the four generated tables and the reseed transaction

use crate::{DateRange, DbResult};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Sqlite, SqlitePool, Transaction};
use tracing::debug;

/// A named promotional window, inclusive on both ends
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct FestivalRecord {
    pub id: Option<i64>,
    pub name: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

/// Revenue for one simulated day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct DailySalesRecord {
    pub date: NaiveDate,
    pub total_revenue: f64,
    pub total_orders: i64,
    pub new_customer_revenue: f64,
    pub repeat_customer_revenue: f64,
}

/// Engagement for one (date, platform) pair
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct SocialMetricRecord {
    pub date: NaiveDate,
    pub platform: String,
    pub impressions: i64,
    pub clicks: i64,
    pub likes: i64,
    pub shares: i64,
    pub comments: i64,
    pub sentiment_score: f64,
}

/// Cross-table metrics for one simulated day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct DerivedMetricRecord {
    pub date: NaiveDate,
    pub total_engagement: i64,
    pub engagement_rate: f64,
    pub social_buzz_index: f64,
    pub baseline_sales_estimated: f64,
    pub sales_uplift_pct: f64,
}

/// Row counts across the dataset tables
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableCounts {
    pub festivals: i64,
    pub daily_sales: i64,
    pub social_metrics: i64,
    pub derived_metrics: i64,
}

/// Tables written by a reseed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Table {
    Festivals,
    DailySales,
    SocialMetrics,
    DerivedMetrics,
}

impl Table {
    /// Dependents first, so foreign keys never dangle mid-clear
    pub const CLEAR_ORDER: [Table; 4] = [
        Table::DerivedMetrics,
        Table::SocialMetrics,
        Table::DailySales,
        Table::Festivals,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Table::Festivals => "festivals",
            Table::DailySales => "daily_sales",
            Table::SocialMetrics => "social_metrics",
            Table::DerivedMetrics => "derived_metrics",
        }
    }
}

/// Clear-then-rewrite transaction for a full reseed.
///
/// Nothing is visible to readers until [`ReseedTransaction::commit`]; dropping
/// the value on any error path rolls the whole reseed back.
pub struct ReseedTransaction {
    tx: Transaction<'static, Sqlite>,
}

impl ReseedTransaction {
    /// Delete every row from `tables`, in the order given
    pub async fn clear(&mut self, tables: &[Table]) -> DbResult<u64> {
        let mut deleted = 0u64;
        for table in tables {
            let result = sqlx::query(&format!("DELETE FROM {}", table.name()))
                .execute(&mut *self.tx)
                .await?;
            debug!(
                table = table.name(),
                rows = result.rows_affected(),
                "Cleared table"
            );
            deleted += result.rows_affected();
        }
        Ok(deleted)
    }

    pub async fn insert_festivals(&mut self, festivals: &[FestivalRecord]) -> DbResult<usize> {
        for festival in festivals {
            sqlx::query("INSERT INTO festivals (name, start_date, end_date) VALUES (?1, ?2, ?3)")
                .bind(&festival.name)
                .bind(festival.start_date)
                .bind(festival.end_date)
                .execute(&mut *self.tx)
                .await?;
        }
        Ok(festivals.len())
    }

    pub async fn insert_daily_sales(&mut self, rows: &[DailySalesRecord]) -> DbResult<usize> {
        for row in rows {
            sqlx::query(
                r#"INSERT INTO daily_sales
                    (date, total_revenue, total_orders,
                     new_customer_revenue, repeat_customer_revenue)
                   VALUES (?1, ?2, ?3, ?4, ?5)"#,
            )
            .bind(row.date)
            .bind(row.total_revenue)
            .bind(row.total_orders)
            .bind(row.new_customer_revenue)
            .bind(row.repeat_customer_revenue)
            .execute(&mut *self.tx)
            .await?;
        }
        Ok(rows.len())
    }

    pub async fn insert_social_metrics(&mut self, rows: &[SocialMetricRecord]) -> DbResult<usize> {
        for row in rows {
            sqlx::query(
                r#"INSERT INTO social_metrics
                    (date, platform, impressions, clicks, likes, shares, comments, sentiment_score)
                   VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)"#,
            )
            .bind(row.date)
            .bind(&row.platform)
            .bind(row.impressions)
            .bind(row.clicks)
            .bind(row.likes)
            .bind(row.shares)
            .bind(row.comments)
            .bind(row.sentiment_score)
            .execute(&mut *self.tx)
            .await?;
        }
        Ok(rows.len())
    }

    pub async fn insert_derived_metrics(
        &mut self,
        rows: &[DerivedMetricRecord],
    ) -> DbResult<usize> {
        for row in rows {
            sqlx::query(
                r#"INSERT INTO derived_metrics
                    (date, total_engagement, engagement_rate, social_buzz_index,
                     baseline_sales_estimated, sales_uplift_pct)
                   VALUES (?1, ?2, ?3, ?4, ?5, ?6)"#,
            )
            .bind(row.date)
            .bind(row.total_engagement)
            .bind(row.engagement_rate)
            .bind(row.social_buzz_index)
            .bind(row.baseline_sales_estimated)
            .bind(row.sales_uplift_pct)
            .execute(&mut *self.tx)
            .await?;
        }
        Ok(rows.len())
    }

    pub async fn commit(self) -> DbResult<()> {
        self.tx.commit().await?;
        Ok(())
    }
}

/// Repository for the generated dataset
pub struct DatasetRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> DatasetRepository<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Open the transaction a full reseed runs in
    pub async fn begin_reseed(&self) -> DbResult<ReseedTransaction> {
        let tx = self.pool.begin().await?;
        Ok(ReseedTransaction { tx })
    }

    pub async fn festivals(&self) -> DbResult<Vec<FestivalRecord>> {
        let records = sqlx::query_as::<_, FestivalRecord>(
            "SELECT id, name, start_date, end_date FROM festivals ORDER BY start_date, id",
        )
        .fetch_all(self.pool)
        .await?;

        Ok(records)
    }

    pub async fn daily_sales(&self, range: Option<DateRange>) -> DbResult<Vec<DailySalesRecord>> {
        let (start, end) = bounds(range);
        let records = sqlx::query_as::<_, DailySalesRecord>(
            r#"SELECT date, total_revenue, total_orders,
                      new_customer_revenue, repeat_customer_revenue
               FROM daily_sales
               WHERE (?1 IS NULL OR date BETWEEN ?1 AND ?2)
               ORDER BY date"#,
        )
        .bind(start)
        .bind(end)
        .fetch_all(self.pool)
        .await?;

        Ok(records)
    }

    pub async fn social_metrics(
        &self,
        range: Option<DateRange>,
    ) -> DbResult<Vec<SocialMetricRecord>> {
        let (start, end) = bounds(range);
        let records = sqlx::query_as::<_, SocialMetricRecord>(
            r#"SELECT date, platform, impressions, clicks, likes, shares, comments, sentiment_score
               FROM social_metrics
               WHERE (?1 IS NULL OR date BETWEEN ?1 AND ?2)
               ORDER BY date, id"#,
        )
        .bind(start)
        .bind(end)
        .fetch_all(self.pool)
        .await?;

        Ok(records)
    }

    pub async fn derived_metrics(
        &self,
        range: Option<DateRange>,
    ) -> DbResult<Vec<DerivedMetricRecord>> {
        let (start, end) = bounds(range);
        let records = sqlx::query_as::<_, DerivedMetricRecord>(
            r#"SELECT date, total_engagement, engagement_rate, social_buzz_index,
                      baseline_sales_estimated, sales_uplift_pct
               FROM derived_metrics
               WHERE (?1 IS NULL OR date BETWEEN ?1 AND ?2)
               ORDER BY date"#,
        )
        .bind(start)
        .bind(end)
        .fetch_all(self.pool)
        .await?;

        Ok(records)
    }

    pub async fn table_counts(&self) -> DbResult<TableCounts> {
        let mut counts = TableCounts::default();
        for table in Table::CLEAR_ORDER {
            let (n,): (i64,) = sqlx::query_as(&format!("SELECT COUNT(*) FROM {}", table.name()))
                .fetch_one(self.pool)
                .await?;
            match table {
                Table::Festivals => counts.festivals = n,
                Table::DailySales => counts.daily_sales = n,
                Table::SocialMetrics => counts.social_metrics = n,
                Table::DerivedMetrics => counts.derived_metrics = n,
            }
        }
        Ok(counts)
    }
}

/// Bind values for the optional `BETWEEN` filter; `(NULL, NULL)` disables it
pub(crate) fn bounds(range: Option<DateRange>) -> (Option<NaiveDate>, Option<NaiveDate>) {
    match range {
        Some(r) => (Some(r.start), Some(r.end)),
        None => (None, None),
    }
}
