//! Daily sales generator

use chrono::NaiveDate;
use persistence::repository::DailySalesRecord;
use rand::Rng;
use rust_decimal::prelude::ToPrimitive;

use crate::effects::SalesEffect;
use crate::rounding::split_cents;

pub const NOISE_AMPLITUDE: f64 = 2_000.0;
pub const REVENUE_FLOOR: f64 = 5_000.0;
pub const AVG_ORDER_VALUE_MIN: f64 = 40.0;
pub const AVG_ORDER_VALUE_MAX: f64 = 60.0;
pub const FESTIVAL_NEW_CUSTOMER_SHARE: f64 = 0.6;
pub const REGULAR_NEW_CUSTOMER_SHARE: f64 = 0.3;

/// One generated day of sales, with the unrounded inputs the derived metrics need
#[derive(Debug, Clone, PartialEq)]
pub struct SalesDraw {
    pub record: DailySalesRecord,
    /// Revenue before rounding
    pub revenue: f64,
    /// Trend plus noise: what revenue would have been without the festival multiplier
    pub baseline: f64,
}

/// Generate the sales row for `date` from its trend value and festival effect.
///
/// Draws noise and then the average order value from `rng`.
pub fn generate_daily_sales(
    date: NaiveDate,
    base: f64,
    effect: &SalesEffect,
    rng: &mut impl Rng,
) -> SalesDraw {
    let noise = rng.gen_range(-NOISE_AMPLITUDE..=NOISE_AMPLITUDE);
    let baseline = base + noise;
    let revenue = (baseline * effect.multiplier).max(REVENUE_FLOOR);

    let avg_order_value = rng.gen_range(AVG_ORDER_VALUE_MIN..=AVG_ORDER_VALUE_MAX);
    let total_orders = (revenue / avg_order_value).floor() as i64;

    let share = if effect.is_festival {
        FESTIVAL_NEW_CUSTOMER_SHARE
    } else {
        REGULAR_NEW_CUSTOMER_SHARE
    };
    let (total, new, repeat) = split_cents(revenue, share);

    SalesDraw {
        record: DailySalesRecord {
            date,
            total_revenue: total.to_f64().unwrap_or(revenue),
            total_orders,
            new_customer_revenue: new.to_f64().unwrap_or_default(),
            repeat_customer_revenue: repeat.to_f64().unwrap_or_default(),
        },
        revenue,
        baseline,
    }
}
