//! Analytics repository — read-only projections over the generated dataset

use crate::repository::dataset::bounds;
use crate::{DateRange, DbResult};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};

/// Sales joined with the day's derived metrics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct SalesDerivedRow {
    pub date: NaiveDate,
    pub total_revenue: f64,
    pub social_buzz_index: f64,
    pub sales_uplift_pct: f64,
    pub baseline_sales_estimated: f64,
}

/// Per-platform aggregate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct PlatformBreakdown {
    pub platform: String,
    pub impressions: i64,
    pub clicks: i64,
    pub likes: i64,
    pub sentiment_score: f64,
}

/// Raw sales sums; `None` when no rows matched
#[derive(Debug, Clone, Default, PartialEq, FromRow)]
pub struct SalesTotals {
    pub total_revenue: Option<f64>,
    pub total_orders: Option<i64>,
    pub new_customer_revenue: Option<f64>,
    pub repeat_customer_revenue: Option<f64>,
}

/// Raw derived-metric aggregates; `None` when no rows matched
#[derive(Debug, Clone, Default, PartialEq, FromRow)]
pub struct DerivedTotals {
    pub avg_uplift_pct: Option<f64>,
    pub total_engagement: Option<i64>,
}

/// Repository for the read side of the dashboard
pub struct AnalyticsRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> AnalyticsRepository<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Sales joined to derived metrics on date, ordered by date
    pub async fn sales_with_derived(
        &self,
        range: Option<DateRange>,
    ) -> DbResult<Vec<SalesDerivedRow>> {
        let (start, end) = bounds(range);
        let rows = sqlx::query_as::<_, SalesDerivedRow>(
            r#"
            SELECT s.date, s.total_revenue,
                   d.social_buzz_index, d.sales_uplift_pct, d.baseline_sales_estimated
            FROM daily_sales s
            JOIN derived_metrics d ON d.date = s.date
            WHERE (?1 IS NULL OR s.date BETWEEN ?1 AND ?2)
            ORDER BY s.date
            "#,
        )
        .bind(start)
        .bind(end)
        .fetch_all(self.pool)
        .await?;

        Ok(rows)
    }

    /// Social metrics grouped by platform, ordered by platform name
    pub async fn social_breakdown(
        &self,
        range: Option<DateRange>,
    ) -> DbResult<Vec<PlatformBreakdown>> {
        let (start, end) = bounds(range);
        let rows = sqlx::query_as::<_, PlatformBreakdown>(
            r#"
            SELECT platform,
                   SUM(impressions) AS impressions,
                   SUM(clicks) AS clicks,
                   SUM(likes) AS likes,
                   AVG(sentiment_score) AS sentiment_score
            FROM social_metrics
            WHERE (?1 IS NULL OR date BETWEEN ?1 AND ?2)
            GROUP BY platform
            ORDER BY platform
            "#,
        )
        .bind(start)
        .bind(end)
        .fetch_all(self.pool)
        .await?;

        Ok(rows)
    }

    pub async fn sales_totals(&self, range: Option<DateRange>) -> DbResult<SalesTotals> {
        let (start, end) = bounds(range);
        let totals = sqlx::query_as::<_, SalesTotals>(
            r#"
            SELECT SUM(total_revenue) AS total_revenue,
                   SUM(total_orders) AS total_orders,
                   SUM(new_customer_revenue) AS new_customer_revenue,
                   SUM(repeat_customer_revenue) AS repeat_customer_revenue
            FROM daily_sales
            WHERE (?1 IS NULL OR date BETWEEN ?1 AND ?2)
            "#,
        )
        .bind(start)
        .bind(end)
        .fetch_one(self.pool)
        .await?;

        Ok(totals)
    }

    pub async fn derived_totals(&self, range: Option<DateRange>) -> DbResult<DerivedTotals> {
        let (start, end) = bounds(range);
        let totals = sqlx::query_as::<_, DerivedTotals>(
            r#"
            SELECT AVG(sales_uplift_pct) AS avg_uplift_pct,
                   SUM(total_engagement) AS total_engagement
            FROM derived_metrics
            WHERE (?1 IS NULL OR date BETWEEN ?1 AND ?2)
            "#,
        )
        .bind(start)
        .bind(end)
        .fetch_one(self.pool)
        .await?;

        Ok(totals)
    }
}
