//! Social signal generator — one engagement row per platform per day

use chrono::NaiveDate;
use persistence::repository::SocialMetricRecord;
use rand::Rng;

use crate::calendar::Platform;
use crate::rounding::round2;

pub const IMPRESSIONS_MIN: f64 = 5_000.0;
pub const IMPRESSIONS_MAX: f64 = 10_000.0;
pub const CLICK_RATE_MIN: f64 = 0.02;
pub const CLICK_RATE_MAX: f64 = 0.05;
pub const LIKE_RATE_MIN: f64 = 0.05;
pub const LIKE_RATE_MAX: f64 = 0.10;
pub const SHARE_PER_LIKE: f64 = 0.1;
pub const COMMENT_PER_LIKE: f64 = 0.05;
/// Above this social multiplier the day counts as festival buzz for sentiment
pub const BUZZ_SENTIMENT_THRESHOLD: f64 = 1.5;

/// Engagement for a single platform on `date`.
///
/// Draws, in order: base impressions, click rate, like rate, sentiment.
pub fn generate_platform_metric(
    date: NaiveDate,
    platform: Platform,
    social_multiplier: f64,
    rng: &mut impl Rng,
) -> SocialMetricRecord {
    let base = rng.gen_range(IMPRESSIONS_MIN..=IMPRESSIONS_MAX);
    let click_rate = rng.gen_range(CLICK_RATE_MIN..=CLICK_RATE_MAX);
    let like_rate = rng.gen_range(LIKE_RATE_MIN..=LIKE_RATE_MAX);

    let impressions = (base * social_multiplier * platform.weight()).floor() as i64;
    let clicks = (impressions as f64 * click_rate).floor() as i64;
    let likes = (impressions as f64 * like_rate).floor() as i64;
    let shares = (likes as f64 * SHARE_PER_LIKE).floor() as i64;
    let comments = (likes as f64 * COMMENT_PER_LIKE).floor() as i64;

    // Festival buzz skews positive
    let sentiment = if social_multiplier > BUZZ_SENTIMENT_THRESHOLD {
        rng.gen_range(0.6..=0.9)
    } else {
        rng.gen_range(0.3..=0.7)
    };

    SocialMetricRecord {
        date,
        platform: platform.to_string(),
        impressions,
        clicks,
        likes,
        shares,
        comments,
        sentiment_score: round2(sentiment),
    }
}

/// Exactly one row per platform, in [`Platform::ALL`] order
pub fn generate_social_metrics(
    date: NaiveDate,
    social_multiplier: f64,
    rng: &mut impl Rng,
) -> Vec<SocialMetricRecord> {
    Platform::ALL
        .iter()
        .map(|platform| generate_platform_metric(date, *platform, social_multiplier, rng))
        .collect()
}
