//! Seeding pipeline — generate a full window in one pass, then replace storage atomically

use async_trait::async_trait;
use persistence::repository::{
    DailySalesRecord, DatasetRepository, DerivedMetricRecord, FestivalRecord, SocialMetricRecord,
    Table,
};
use persistence::{Database, DbError};
use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, error, info};

use crate::calendar::SimulationConfig;
use crate::derived::compose_derived;
use crate::effects::{sales_effect, social_multiplier};
use crate::sales::generate_daily_sales;
use crate::social::generate_social_metrics;
use crate::trend::base_curve;

#[derive(Error, Debug)]
pub enum SeedError {
    #[error("Storage error during seeding: {0}")]
    Storage(#[from] DbError),

    #[error("Seeding failed: {0}")]
    Sink(String),
}

/// Every record produced for one simulation window
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GeneratedDataset {
    pub festivals: Vec<FestivalRecord>,
    pub daily_sales: Vec<DailySalesRecord>,
    pub social_metrics: Vec<SocialMetricRecord>,
    pub derived_metrics: Vec<DerivedMetricRecord>,
}

/// Row counts written by a reseed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedSummary {
    pub festivals: usize,
    pub days: usize,
    pub social_metrics: usize,
    pub derived_metrics: usize,
}

impl GeneratedDataset {
    pub fn summary(&self) -> SeedSummary {
        SeedSummary {
            festivals: self.festivals.len(),
            days: self.daily_sales.len(),
            social_metrics: self.social_metrics.len(),
            derived_metrics: self.derived_metrics.len(),
        }
    }
}

/// Generate the whole window in a single sequential pass.
///
/// Each day evaluates both festival multipliers, then sales, then social,
/// then composes the derived row from that day's outputs alone. Given the
/// same `rng` state the result is identical.
pub fn generate_dataset(config: &SimulationConfig, rng: &mut impl Rng) -> GeneratedDataset {
    let total_days = config.total_days();
    let trend = base_curve(total_days);

    let mut dataset = GeneratedDataset {
        festivals: config.festivals.iter().map(|f| f.to_record()).collect(),
        daily_sales: Vec::with_capacity(total_days),
        social_metrics: Vec::with_capacity(total_days * 3),
        derived_metrics: Vec::with_capacity(total_days),
    };

    for (date, base) in config.dates().zip(trend) {
        let effect = sales_effect(date, &config.festivals, rng);
        let social_mult = social_multiplier(date, &config.festivals);

        let sales = generate_daily_sales(date, base, &effect, rng);
        let social = generate_social_metrics(date, social_mult, rng);
        let derived = compose_derived(&sales, &social);

        if effect.is_festival {
            debug!(
                %date,
                multiplier = effect.multiplier,
                revenue = sales.record.total_revenue,
                "Festival day"
            );
        }

        dataset.daily_sales.push(sales.record);
        dataset.social_metrics.extend(social);
        dataset.derived_metrics.push(derived);
    }

    dataset
}

/// Storage that can atomically swap in a freshly generated dataset
#[async_trait]
pub trait DatasetSink: Send + Sync {
    /// Clear the existing dataset and write `dataset` in its place, all or nothing
    async fn replace_dataset(&self, dataset: &GeneratedDataset) -> Result<(), SeedError>;
}

#[async_trait]
impl DatasetSink for Database {
    async fn replace_dataset(&self, dataset: &GeneratedDataset) -> Result<(), SeedError> {
        let repo = DatasetRepository::new(self.pool());
        // Any early return drops `tx`, which rolls the reseed back
        let mut tx = repo.begin_reseed().await?;

        let deleted = tx.clear(&Table::CLEAR_ORDER).await?;
        info!(rows = deleted, "Cleared existing dataset");

        tx.insert_festivals(&dataset.festivals).await?;
        tx.insert_daily_sales(&dataset.daily_sales).await?;
        tx.insert_social_metrics(&dataset.social_metrics).await?;
        tx.insert_derived_metrics(&dataset.derived_metrics).await?;

        tx.commit().await?;
        Ok(())
    }
}

/// Regenerate the full dataset for `config` and replace whatever `sink` holds
pub async fn seed_all_data(
    sink: &impl DatasetSink,
    config: &SimulationConfig,
    rng: &mut (impl Rng + Send),
) -> Result<SeedSummary, SeedError> {
    info!(
        start = %config.start_date,
        end = %config.end_date,
        festivals = config.festivals.len(),
        "Starting data seeding pipeline"
    );

    let dataset = generate_dataset(config, rng);
    let summary = dataset.summary();

    if let Err(e) = sink.replace_dataset(&dataset).await {
        error!("Seeding failed, previous dataset kept: {}", e);
        return Err(e);
    }

    info!(
        days = summary.days,
        social_rows = summary.social_metrics,
        "Data seeding complete"
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::{default_festivals, Festival};
    use chrono::NaiveDate;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashMap;
    use std::sync::Mutex;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    /// Sink that records the last dataset, or fails on demand
    #[derive(Default)]
    struct MemorySink {
        stored: Mutex<Option<GeneratedDataset>>,
        fail: bool,
    }

    #[async_trait]
    impl DatasetSink for MemorySink {
        async fn replace_dataset(&self, dataset: &GeneratedDataset) -> Result<(), SeedError> {
            if self.fail {
                return Err(SeedError::Sink("disk full".to_string()));
            }
            *self.stored.lock().unwrap() = Some(dataset.clone());
            Ok(())
        }
    }

    #[test]
    fn test_full_year_row_counts() {
        let mut rng = StdRng::seed_from_u64(42);
        let dataset = generate_dataset(&SimulationConfig::default(), &mut rng);
        assert_eq!(dataset.festivals.len(), 5);
        assert_eq!(dataset.daily_sales.len(), 365);
        assert_eq!(dataset.derived_metrics.len(), 365);
        assert_eq!(dataset.social_metrics.len(), 365 * 3);

        let mut per_day: HashMap<NaiveDate, usize> = HashMap::new();
        for row in &dataset.social_metrics {
            *per_day.entry(row.date).or_default() += 1;
        }
        assert_eq!(per_day.len(), 365);
        assert!(per_day.values().all(|n| *n == 3));
    }

    #[test]
    fn test_same_seed_same_dataset() {
        let config = SimulationConfig::default();
        let a = generate_dataset(&config, &mut StdRng::seed_from_u64(9));
        let b = generate_dataset(&config, &mut StdRng::seed_from_u64(9));
        assert_eq!(a, b);

        let c = generate_dataset(&config, &mut StdRng::seed_from_u64(10));
        assert_ne!(a.daily_sales, c.daily_sales);
    }

    #[test]
    fn test_derived_engagement_matches_social_rows() {
        let mut rng = StdRng::seed_from_u64(3);
        let dataset = generate_dataset(&SimulationConfig::default(), &mut rng);
        for (day, derived) in dataset.derived_metrics.iter().enumerate() {
            let rows = &dataset.social_metrics[day * 3..day * 3 + 3];
            assert!(rows.iter().all(|r| r.date == derived.date));
            let expected: i64 = rows
                .iter()
                .map(|r| r.clicks + r.likes + r.shares + r.comments)
                .sum();
            assert_eq!(derived.total_engagement, expected);
        }
    }

    #[test]
    fn test_festival_days_spike_and_skew_new_customers() {
        let mut rng = StdRng::seed_from_u64(5);
        let dataset = generate_dataset(&SimulationConfig::default(), &mut rng);
        let idx = dataset
            .daily_sales
            .iter()
            .position(|s| s.date == ymd(2023, 11, 5))
            .unwrap();
        let sales = &dataset.daily_sales[idx];
        let derived = &dataset.derived_metrics[idx];

        let ratio = sales.new_customer_revenue / sales.total_revenue;
        assert!((ratio - 0.6).abs() < 1e-4);
        // Multiplier in [2.5, 4.0] shows up as 150%..300% uplift
        assert!((149.99..=300.01).contains(&derived.sales_uplift_pct));
    }

    #[test]
    fn test_social_leads_sales_before_festival() {
        let mut rng = StdRng::seed_from_u64(8);
        let dataset = generate_dataset(&SimulationConfig::default(), &mut rng);
        let derived = &dataset.derived_metrics;
        let find = |d: NaiveDate| derived.iter().find(|r| r.date == d).unwrap();

        // Eight days before Diwali sales are untouched but buzz is already ramping
        assert_eq!(find(ymd(2023, 10, 24)).sales_uplift_pct, 0.0);

        let mean_buzz = |start: NaiveDate| -> f64 {
            let total: f64 = start
                .iter_days()
                .take(10)
                .map(|d| find(d).social_buzz_index)
                .sum();
            total / 10.0
        };
        let ramp = mean_buzz(ymd(2023, 10, 22));
        let quiet = mean_buzz(ymd(2023, 3, 1));
        assert!(ramp > quiet * 2.0, "ramp {ramp} vs quiet {quiet}");
    }

    #[test]
    fn test_every_day_respects_floor_and_split() {
        let mut rng = StdRng::seed_from_u64(77);
        let dataset = generate_dataset(&SimulationConfig::default(), &mut rng);
        for row in &dataset.daily_sales {
            assert!(row.total_revenue >= 5_000.0);
            let gap = row.new_customer_revenue + row.repeat_customer_revenue - row.total_revenue;
            assert!(gap.abs() <= 0.01);
        }
    }

    #[test]
    fn test_short_window_with_custom_calendar() {
        let config = SimulationConfig {
            start_date: ymd(2024, 2, 1),
            end_date: ymd(2024, 2, 10),
            festivals: vec![Festival::new("Flash", ymd(2024, 2, 5), ymd(2024, 2, 6))],
        };
        let dataset = generate_dataset(&config, &mut StdRng::seed_from_u64(1));
        assert_eq!(dataset.daily_sales.len(), 10);
        assert_eq!(dataset.daily_sales[0].date, ymd(2024, 2, 1));
        assert_eq!(dataset.daily_sales[9].date, ymd(2024, 2, 10));
    }

    #[tokio::test]
    async fn test_seed_hands_dataset_to_sink() {
        let sink = MemorySink::default();
        let config = SimulationConfig {
            festivals: default_festivals(),
            ..Default::default()
        };
        let summary = seed_all_data(&sink, &config, &mut StdRng::seed_from_u64(1))
            .await
            .unwrap();

        assert_eq!(summary.days, 365);
        assert_eq!(summary.social_metrics, 1095);
        let stored = sink.stored.lock().unwrap().clone().unwrap();
        assert_eq!(stored.summary(), summary);
    }

    #[tokio::test]
    async fn test_seed_propagates_sink_failure() {
        let sink = MemorySink {
            fail: true,
            ..Default::default()
        };
        let config = SimulationConfig::default();
        let err = seed_all_data(&sink, &config, &mut StdRng::seed_from_u64(1))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("disk full"));
        assert!(sink.stored.lock().unwrap().is_none());
    }
}
