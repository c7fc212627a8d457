//! Festival calendar, platform weights and the simulation window

use chrono::NaiveDate;
use persistence::repository::FestivalRecord;
use persistence::DateRange;
use serde::{Deserialize, Serialize};

/// A promotional window, closed on both ends
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Festival {
    pub name: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

impl Festival {
    pub fn new(name: impl Into<String>, start_date: NaiveDate, end_date: NaiveDate) -> Self {
        debug_assert!(start_date <= end_date, "festival ends before it starts");
        Self {
            name: name.into(),
            start_date,
            end_date,
        }
    }

    pub fn window(&self) -> DateRange {
        DateRange {
            start: self.start_date,
            end: self.end_date,
        }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.window().contains(date)
    }

    /// Days from `date` to the first festival day (negative once it has started)
    pub fn days_until_start(&self, date: NaiveDate) -> i64 {
        (self.start_date - date).num_days()
    }

    /// Days from the last festival day to `date` (negative before it ends)
    pub fn days_since_end(&self, date: NaiveDate) -> i64 {
        (date - self.end_date).num_days()
    }

    pub fn to_record(&self) -> FestivalRecord {
        FestivalRecord {
            id: None,
            name: self.name.clone(),
            start_date: self.start_date,
            end_date: self.end_date,
        }
    }
}

/// Social platforms, in generation order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Platform {
    Instagram,
    Facebook,
    Twitter,
}

impl Platform {
    pub const ALL: [Platform; 3] = [Platform::Instagram, Platform::Facebook, Platform::Twitter];

    /// Share of the base impression volume each platform receives
    pub fn weight(&self) -> f64 {
        match self {
            Platform::Instagram => 1.0,
            Platform::Facebook => 0.7,
            Platform::Twitter => 0.5,
        }
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Platform::Instagram => write!(f, "Instagram"),
            Platform::Facebook => write!(f, "Facebook"),
            Platform::Twitter => write!(f, "Twitter"),
        }
    }
}

/// Window and calendar a dataset is generated for
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulationConfig {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    /// Scanned in order; order decides tie-breaks between overlapping windows
    pub festivals: Vec<Festival>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            start_date: ymd(2023, 1, 1),
            end_date: ymd(2023, 12, 31),
            festivals: default_festivals(),
        }
    }
}

impl SimulationConfig {
    /// Number of days in the window, inclusive
    pub fn total_days(&self) -> usize {
        match DateRange::new(self.start_date, self.end_date) {
            Some(range) => range.days() as usize,
            None => 0,
        }
    }

    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.start_date
            .iter_days()
            .take_while(move |d| *d <= self.end_date)
    }
}

/// The 2023 festival season
pub fn default_festivals() -> Vec<Festival> {
    vec![
        Festival::new("Republic Day Sale", ymd(2023, 1, 20), ymd(2023, 1, 26)),
        Festival::new("Summer Splash", ymd(2023, 5, 10), ymd(2023, 5, 15)),
        Festival::new("Freedom Sale", ymd(2023, 8, 10), ymd(2023, 8, 15)),
        Festival::new("Diwali Dhamaka", ymd(2023, 11, 1), ymd(2023, 11, 10)),
        Festival::new("Christmas Carnival", ymd(2023, 12, 20), ymd(2023, 12, 25)),
    ]
}

fn ymd(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("static calendar date is valid")
}
