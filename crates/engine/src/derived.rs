//! Derived metrics composer
//!
//! Pure: all variance comes in through the day's sales draw and social rows.

use persistence::repository::{DerivedMetricRecord, SocialMetricRecord};

use crate::rounding::round2;
use crate::sales::SalesDraw;

/// Engagement that maps to one buzz-index point is `BUZZ_ENGAGEMENT_UNIT / BUZZ_SCALE`
pub const BUZZ_ENGAGEMENT_UNIT: f64 = 5_000.0;
pub const BUZZ_SCALE: f64 = 10.0;

/// Clicks, likes, shares and comments for one row
pub fn engagement(row: &SocialMetricRecord) -> i64 {
    row.clicks + row.likes + row.shares + row.comments
}

/// Linear display scale for engagement, not a normalized index
pub fn buzz_index(total_engagement: i64) -> f64 {
    total_engagement as f64 / BUZZ_ENGAGEMENT_UNIT * BUZZ_SCALE
}

/// `numerator / denominator * 100`, or 0 when the denominator is not positive
pub fn percent_of(numerator: f64, denominator: f64) -> f64 {
    if denominator > 0.0 {
        numerator / denominator * 100.0
    } else {
        0.0
    }
}

/// Compose the derived row for the day `sales` was generated for from that day's social rows
pub fn compose_derived(sales: &SalesDraw, social: &[SocialMetricRecord]) -> DerivedMetricRecord {
    let total_engagement: i64 = social.iter().map(engagement).sum();
    let total_impressions: i64 = social.iter().map(|r| r.impressions).sum();

    let engagement_rate = percent_of(total_engagement as f64, total_impressions as f64);
    let uplift = percent_of(sales.revenue - sales.baseline, sales.baseline);

    DerivedMetricRecord {
        date: sales.record.date,
        total_engagement,
        engagement_rate: round2(engagement_rate),
        social_buzz_index: round2(buzz_index(total_engagement)),
        baseline_sales_estimated: round2(sales.baseline),
        sales_uplift_pct: round2(uplift),
    }
}
