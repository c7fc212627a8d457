//! Festival effect model
//!
//! Maps a calendar date to the multipliers applied to sales and to social
//! impressions. Social attention leads the event: it ramps up ten days ahead
//! and sustains through it, while sales spike only during the window and dip
//! briefly afterwards.
//!
//! The two policies resolve overlapping festivals differently. Sales take the
//! first festival (in calendar order) with a matching rule; social takes the
//! last one that touched the date.

use chrono::NaiveDate;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::calendar::Festival;

pub const PRE_BUZZ_DAYS: i64 = 7;
pub const PRE_BUZZ_MULTIPLIER: f64 = 1.1;
pub const COOLDOWN_DAYS: i64 = 3;
pub const COOLDOWN_MULTIPLIER: f64 = 0.8;
pub const FESTIVAL_MULTIPLIER_MIN: f64 = 2.5;
pub const FESTIVAL_MULTIPLIER_MAX: f64 = 4.0;

pub const SOCIAL_RAMP_DAYS: i64 = 10;
pub const SOCIAL_RAMP_BASE: f64 = 3.0;
pub const SOCIAL_SUSTAIN_MULTIPLIER: f64 = 2.5;

/// Phase of the sales cycle a date falls in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SalesPhase {
    PreBuzz,
    During,
    Cooldown,
    Normal,
}

/// Sales-side effect for one date
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SalesEffect {
    pub multiplier: f64,
    pub is_festival: bool,
    pub phase: SalesPhase,
}

impl SalesEffect {
    pub const NEUTRAL: SalesEffect = SalesEffect {
        multiplier: 1.0,
        is_festival: false,
        phase: SalesPhase::Normal,
    };
}

/// Sales multiplier for `date`: first matching rule of the first matching festival wins.
///
/// Draws from `rng` only when the date is inside a festival window.
pub fn sales_effect(date: NaiveDate, festivals: &[Festival], rng: &mut impl Rng) -> SalesEffect {
    for festival in festivals {
        let days_before = festival.days_until_start(date);
        if 0 < days_before && days_before <= PRE_BUZZ_DAYS {
            return SalesEffect {
                multiplier: PRE_BUZZ_MULTIPLIER,
                is_festival: false,
                phase: SalesPhase::PreBuzz,
            };
        }

        if festival.contains(date) {
            return SalesEffect {
                multiplier: rng.gen_range(FESTIVAL_MULTIPLIER_MIN..=FESTIVAL_MULTIPLIER_MAX),
                is_festival: true,
                phase: SalesPhase::During,
            };
        }

        let days_after = festival.days_since_end(date);
        if 0 < days_after && days_after <= COOLDOWN_DAYS {
            return SalesEffect {
                multiplier: COOLDOWN_MULTIPLIER,
                is_festival: false,
                phase: SalesPhase::Cooldown,
            };
        }
    }

    SalesEffect::NEUTRAL
}

/// Social multiplier for `date`: every festival is evaluated and the last one that applies wins.
///
/// Ramp-up runs from 3.0 ten days out to 5.0 on the first festival day; the
/// rest of the window sustains at 2.5.
pub fn social_multiplier(date: NaiveDate, festivals: &[Festival]) -> f64 {
    let mut multiplier = 1.0;

    for festival in festivals {
        let days_until = festival.days_until_start(date);
        if (0..=SOCIAL_RAMP_DAYS).contains(&days_until) {
            multiplier = SOCIAL_RAMP_BASE + (SOCIAL_RAMP_DAYS - days_until) as f64 / 5.0;
        } else if festival.contains(date) {
            multiplier = SOCIAL_SUSTAIN_MULTIPLIER;
        }
    }

    multiplier
}
