//! Analytics — read-only views over the seeded dataset
//!
//! Thin projections for the dashboard: timeline, headline summary, platform
//! breakdown, lagged buzz-vs-sales pairs and the counterfactual comparison.

use chrono::NaiveDate;
use persistence::repository::{AnalyticsRepository, PlatformBreakdown, SalesDerivedRow};
use persistence::{DateRange, DbError, SqlitePool};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::derived::percent_of;

pub const DEFAULT_LAG_DAYS: usize = 3;

#[derive(Error, Debug)]
pub enum AnalyticsError {
    #[error("Date range required")]
    MissingRange,

    #[error("Invalid date range: {start} is after {end}")]
    InvalidRange { start: NaiveDate, end: NaiveDate },

    #[error(transparent)]
    Db(#[from] DbError),
}

/// Build an optional range: applied only when both ends are given
pub fn optional_range(
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
) -> Result<Option<DateRange>, AnalyticsError> {
    match (start, end) {
        (Some(start), Some(end)) => DateRange::new(start, end)
            .map(Some)
            .ok_or(AnalyticsError::InvalidRange { start, end }),
        _ => Ok(None),
    }
}

/// Build a mandatory range
pub fn required_range(
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
) -> Result<DateRange, AnalyticsError> {
    optional_range(start, end)?.ok_or(AnalyticsError::MissingRange)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelinePoint {
    pub date: NaiveDate,
    pub sales: f64,
    pub social_buzz: f64,
    pub uplift: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub total_revenue: f64,
    pub total_orders: i64,
    pub new_vs_repeat_ratio: f64,
    pub avg_uplift_pct: f64,
    pub total_engagement: i64,
}

/// Revenue on `date` paired with the buzz index `lag` rows earlier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LagPoint {
    pub date: NaiveDate,
    pub total_revenue: f64,
    pub shifted_buzz: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CounterfactualPoint {
    pub date: NaiveDate,
    pub actual_sales: f64,
    pub baseline_sales: f64,
    pub difference: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CounterfactualSummary {
    pub total_actual: f64,
    pub total_baseline: f64,
    pub net_impact_value: f64,
    pub net_impact_pct: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CounterfactualReport {
    pub chart_data: Vec<CounterfactualPoint>,
    pub summary: CounterfactualSummary,
}

/// Shift the buzz series forward by `lag` rows and drop the rows left without a value.
///
/// `rows` must be sorted by date; the shift is by position, not calendar distance.
pub fn lag_shift(rows: &[SalesDerivedRow], lag: usize) -> Vec<LagPoint> {
    rows.iter()
        .skip(lag)
        .zip(rows.iter())
        .map(|(current, earlier)| LagPoint {
            date: current.date,
            total_revenue: current.total_revenue,
            shifted_buzz: earlier.social_buzz_index,
        })
        .collect()
}

/// Actual vs. baseline per day plus the net impact over the whole slice
pub fn counterfactual_report(rows: &[SalesDerivedRow]) -> CounterfactualReport {
    let chart_data: Vec<CounterfactualPoint> = rows
        .iter()
        .map(|r| CounterfactualPoint {
            date: r.date,
            actual_sales: r.total_revenue,
            baseline_sales: r.baseline_sales_estimated,
            difference: r.total_revenue - r.baseline_sales_estimated,
        })
        .collect();

    let total_actual: f64 = rows.iter().map(|r| r.total_revenue).sum();
    let total_baseline: f64 = rows.iter().map(|r| r.baseline_sales_estimated).sum();
    let net_impact_value = total_actual - total_baseline;

    CounterfactualReport {
        chart_data,
        summary: CounterfactualSummary {
            total_actual,
            total_baseline,
            net_impact_value,
            net_impact_pct: percent_of(net_impact_value, total_baseline),
        },
    }
}

/// Query facade over a pool
pub struct Analytics<'a> {
    repo: AnalyticsRepository<'a>,
}

impl<'a> Analytics<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self {
            repo: AnalyticsRepository::new(pool),
        }
    }

    pub async fn timeline(
        &self,
        range: Option<DateRange>,
    ) -> Result<Vec<TimelinePoint>, AnalyticsError> {
        let rows = self.repo.sales_with_derived(range).await?;
        Ok(rows
            .into_iter()
            .map(|r| TimelinePoint {
                date: r.date,
                sales: r.total_revenue,
                social_buzz: r.social_buzz_index,
                uplift: r.sales_uplift_pct,
            })
            .collect())
    }

    pub async fn summary(&self, range: Option<DateRange>) -> Result<Summary, AnalyticsError> {
        let sales = self.repo.sales_totals(range).await?;
        let derived = self.repo.derived_totals(range).await?;

        let total_revenue = sales.total_revenue.unwrap_or_default();
        let new_revenue = sales.new_customer_revenue.unwrap_or_default();

        Ok(Summary {
            total_revenue,
            total_orders: sales.total_orders.unwrap_or_default(),
            new_vs_repeat_ratio: if total_revenue > 0.0 {
                new_revenue / total_revenue
            } else {
                0.0
            },
            avg_uplift_pct: derived.avg_uplift_pct.unwrap_or_default(),
            total_engagement: derived.total_engagement.unwrap_or_default(),
        })
    }

    pub async fn social_breakdown(
        &self,
        range: Option<DateRange>,
    ) -> Result<Vec<PlatformBreakdown>, AnalyticsError> {
        Ok(self.repo.social_breakdown(range).await?)
    }

    pub async fn lag_analysis(
        &self,
        lag: usize,
        range: Option<DateRange>,
    ) -> Result<Vec<LagPoint>, AnalyticsError> {
        let rows = self.repo.sales_with_derived(range).await?;
        Ok(lag_shift(&rows, lag))
    }

    pub async fn counterfactual(
        &self,
        range: DateRange,
    ) -> Result<CounterfactualReport, AnalyticsError> {
        let rows = self.repo.sales_with_derived(Some(range)).await?;
        Ok(counterfactual_report(&rows))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn row(day: u32, revenue: f64, buzz: f64, baseline: f64) -> SalesDerivedRow {
        SalesDerivedRow {
            date: ymd(2023, 4, day),
            total_revenue: revenue,
            social_buzz_index: buzz,
            sales_uplift_pct: 0.0,
            baseline_sales_estimated: baseline,
        }
    }

    #[test]
    fn test_lag_shift_pairs_earlier_buzz() {
        let rows: Vec<_> = (1..=6)
            .map(|d| row(d, 1000.0 * d as f64, d as f64, 1000.0))
            .collect();
        let shifted = lag_shift(&rows, 3);

        assert_eq!(shifted.len(), 3);
        assert_eq!(shifted[0].date, ymd(2023, 4, 4));
        assert_eq!(shifted[0].total_revenue, 4000.0);
        assert_eq!(shifted[0].shifted_buzz, 1.0);
        assert_eq!(shifted[2].shifted_buzz, 3.0);
    }

    #[test]
    fn test_lag_shift_edges() {
        let rows: Vec<_> = (1..=2).map(|d| row(d, 1.0, d as f64, 1.0)).collect();
        assert!(lag_shift(&rows, 3).is_empty());
        let same_day = lag_shift(&rows, 0);
        assert_eq!(same_day.len(), 2);
        assert_eq!(same_day[1].shifted_buzz, 2.0);
    }

    #[test]
    fn test_counterfactual_summary_identities() {
        let rows = vec![
            row(1, 30_000.0, 0.0, 20_000.0),
            row(2, 15_000.0, 0.0, 18_000.0),
        ];
        let report = counterfactual_report(&rows);

        assert_eq!(report.chart_data.len(), 2);
        assert_eq!(report.chart_data[1].difference, -3_000.0);
        let s = &report.summary;
        assert_eq!(s.total_actual, 45_000.0);
        assert_eq!(s.total_baseline, 38_000.0);
        assert_eq!(s.net_impact_value, s.total_actual - s.total_baseline);
        assert_eq!(
            s.net_impact_pct,
            s.net_impact_value / s.total_baseline * 100.0
        );
    }

    #[test]
    fn test_counterfactual_empty_slice_is_zero() {
        let report = counterfactual_report(&[]);
        assert!(report.chart_data.is_empty());
        assert_eq!(report.summary.net_impact_value, 0.0);
        assert_eq!(report.summary.net_impact_pct, 0.0);
    }

    #[test]
    fn test_range_builders() {
        let (a, b) = (ymd(2023, 1, 1), ymd(2023, 1, 31));
        assert_eq!(optional_range(Some(a), None).unwrap(), None);
        assert!(optional_range(Some(a), Some(b)).unwrap().is_some());
        assert!(matches!(
            optional_range(Some(b), Some(a)),
            Err(AnalyticsError::InvalidRange { .. })
        ));
        assert!(matches!(
            required_range(None, Some(b)),
            Err(AnalyticsError::MissingRange)
        ));
        assert_eq!(required_range(Some(a), Some(b)).unwrap().days(), 31);
    }
}
